use thiserror::Error;

use super::runner::PipelineState;
use crate::error::{UnderwriteError, UploadError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Analysis failed: {0}")]
    Underwrite(#[from] UnderwriteError),

    #[error("A run is already active ({0})")]
    RunActive(PipelineState),
}
