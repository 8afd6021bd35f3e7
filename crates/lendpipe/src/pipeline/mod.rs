pub mod error;
pub mod runner;

pub use error::PipelineError;
pub use runner::{Orchestrator, PipelineState, RunOptions, UnderwriteBackend, UploadBackend};
