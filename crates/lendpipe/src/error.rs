use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LendpipeError {
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Underwrite error: {0}")]
    Underwrite(#[from] UnderwriteError),

    #[error("Status stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("No PDF files in selection")]
    NoPdfSelected,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read staged file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse upload response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Status stream rejected ({status})")]
    Rejected { status: u16 },

    #[error("Status stream connection failed: {0}")]
    Connect(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum UnderwriteError {
    #[error("Server responded with {status}: {status_text}")]
    Rejected { status: u16, status_text: String },

    #[error("Underwrite request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse underwrite response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, LendpipeError>;
