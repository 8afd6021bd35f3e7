pub mod client;
pub mod config;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod report;
pub mod stream;

pub use client::{
    AnalysisResult, Decision, DocumentSummary, DocumentTypes, LoanRecommendation,
    UnderwriteClient, UnderwriteRequest, UploadClient, UploadResult,
};
pub use config::ServiceConfig;
pub use error::{
    IntakeError, LendpipeError, Result, StreamError, UnderwriteError, UploadError,
};
pub use intake::{FileIntake, StagedFile};
pub use pipeline::{Orchestrator, PipelineError, PipelineState, RunOptions};
pub use report::{build_report, AnalysisReport, DecisionCard, FinancialSummary};
pub use stream::{StatusEntry, StatusEvent, StatusLog, StatusStreamClient, StepStatus};
