//! Staging of user-selected documents ahead of submission.
//!
//! Only PDFs are accepted; a selection with no PDFs is rejected wholesale and
//! the currently staged set is left untouched.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::IntakeError;

/// A user-selected document held client-side pending submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Filename as it will appear in the multipart upload.
    pub name: String,
    /// Local path the file contents are read from at submission time.
    pub path: PathBuf,
}

impl StagedFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { name, path }
    }
}

/// Returns true when the declared media type or the filename extension
/// identifies a PDF.
fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if mime_guess::from_path(path)
        .first()
        .map(|m| m == mime_guess::mime::APPLICATION_PDF)
        .unwrap_or(false)
    {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Holds the staged file set and gates submission on it being non-empty.
#[derive(Debug, Default)]
pub struct FileIntake {
    staged: Vec<StagedFile>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters `candidates` to PDFs and replaces the staged set with the
    /// result. A selection containing no PDFs is rejected as a whole: the
    /// staged set is left unchanged and `IntakeError::NoPdfSelected` is
    /// returned for user-visible reporting.
    pub fn submit_selection<I, P>(&mut self, candidates: I) -> Result<&[StagedFile], IntakeError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let pdfs: Vec<StagedFile> = candidates
            .into_iter()
            .filter(|c| {
                let keep = is_pdf(c);
                if !keep {
                    debug!("Dropping non-PDF candidate: {}", c.as_ref().display());
                }
                keep
            })
            .map(StagedFile::from_path)
            .collect();

        if pdfs.is_empty() {
            warn!("Selection contained no PDF files; staged set unchanged");
            return Err(IntakeError::NoPdfSelected);
        }

        self.staged = pdfs;
        Ok(&self.staged)
    }

    /// Removes the file at `index`, reindexing the remainder. Indices are not
    /// stable across removals; callers re-derive them from `staged()`.
    pub fn remove(&mut self, index: usize) -> Option<StagedFile> {
        if index < self.staged.len() {
            Some(self.staged.remove(index))
        } else {
            None
        }
    }

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Submit-enablement: strictly "at least one file staged".
    pub fn can_submit(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Discards the staged set, e.g. after a completed run.
    pub fn clear(&mut self) {
        self.staged.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_by_extension() {
        assert!(is_pdf("statement.pdf"));
        assert!(is_pdf("STATEMENT.PDF"));
        assert!(!is_pdf("statement.docx"));
        assert!(!is_pdf("statement"));
    }

    #[test]
    fn test_selection_filters_to_pdfs() {
        let mut intake = FileIntake::new();
        let staged = intake
            .submit_selection(["a.pdf", "b.txt", "c.pdf", "notes.md"])
            .unwrap();
        let names: Vec<&str> = staged.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
        assert!(intake.can_submit());
    }

    #[test]
    fn test_empty_selection_rejected_and_staged_unchanged() {
        let mut intake = FileIntake::new();
        intake.submit_selection(["keep.pdf"]).unwrap();

        let err = intake.submit_selection(["a.txt", "b.docx"]).unwrap_err();
        assert!(matches!(err, IntakeError::NoPdfSelected));
        assert_eq!(intake.staged().len(), 1);
        assert_eq!(intake.staged()[0].name, "keep.pdf");
    }

    #[test]
    fn test_selection_replaces_previous_set() {
        let mut intake = FileIntake::new();
        intake.submit_selection(["old.pdf"]).unwrap();
        intake.submit_selection(["new1.pdf", "new2.pdf"]).unwrap();
        assert_eq!(intake.staged().len(), 2);
        assert_eq!(intake.staged()[0].name, "new1.pdf");
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let mut intake = FileIntake::new();
        intake
            .submit_selection(["a.pdf", "b.pdf", "c.pdf"])
            .unwrap();

        let removed = intake.remove(1).unwrap();
        assert_eq!(removed.name, "b.pdf");

        let names: Vec<&str> = intake.staged().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut intake = FileIntake::new();
        intake.submit_selection(["a.pdf"]).unwrap();
        assert!(intake.remove(5).is_none());
        assert_eq!(intake.staged().len(), 1);
    }

    #[test]
    fn test_clear_disables_submit() {
        let mut intake = FileIntake::new();
        intake.submit_selection(["a.pdf"]).unwrap();
        intake.clear();
        assert!(!intake.can_submit());
        assert!(intake.staged().is_empty());
    }
}
