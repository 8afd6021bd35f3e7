//! The pipeline state machine.
//!
//! One run is one upload followed by one underwrite request, with the status
//! feed open in between for user feedback. The feed is observational: the
//! run's outcome is decided exclusively by the two request/response calls,
//! so a silent feed can never stall or fail a run.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use super::error::PipelineError;
use crate::client::types::{AnalysisResult, UploadResult};
use crate::client::{UnderwriteClient, UploadClient};
use crate::config::ServiceConfig;
use crate::error::{UnderwriteError, UploadError};
use crate::intake::StagedFile;
use crate::stream::{StatusEntry, StatusEvent, StatusStreamClient};

/// Where the single active run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Uploading,
    Streaming,
    Underwriting,
    Complete,
    Failed,
}

impl PipelineState {
    /// True while a run holds the pipeline; `run` rejects re-entry.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PipelineState::Uploading | PipelineState::Streaming | PipelineState::Underwriting
        )
    }

    /// True in the re-entrant states a new run may start from.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Uploading => write!(f, "uploading"),
            PipelineState::Streaming => write!(f, "streaming"),
            PipelineState::Underwriting => write!(f, "underwriting"),
            PipelineState::Complete => write!(f, "complete"),
            PipelineState::Failed => write!(f, "failed"),
        }
    }
}

/// Per-run parameters forwarded to both services.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub provider: String,
    pub debug: bool,
}

impl RunOptions {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            debug: false,
        }
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Submission seam of the upload service.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    async fn submit(
        &self,
        files: &[StagedFile],
        provider: &str,
        debug: bool,
    ) -> Result<UploadResult, UploadError>;
}

#[async_trait]
impl UploadBackend for UploadClient {
    async fn submit(
        &self,
        files: &[StagedFile],
        provider: &str,
        debug: bool,
    ) -> Result<UploadResult, UploadError> {
        UploadClient::submit(self, files, provider, debug).await
    }
}

/// Decision seam of the underwrite service.
#[async_trait]
pub trait UnderwriteBackend: Send + Sync {
    async fn underwrite(
        &self,
        upload: &UploadResult,
        provider: &str,
        debug: bool,
    ) -> Result<AnalysisResult, UnderwriteError>;
}

#[async_trait]
impl UnderwriteBackend for UnderwriteClient {
    async fn underwrite(
        &self,
        upload: &UploadResult,
        provider: &str,
        debug: bool,
    ) -> Result<AnalysisResult, UnderwriteError> {
        UnderwriteClient::underwrite(self, upload, provider, debug).await
    }
}

/// Sequences upload → stream → underwrite and owns the run state.
///
/// The orchestrator is the only holder of the stream handle and the run
/// flag; everything else is stateless with respect to the run, so an
/// `Arc<Orchestrator>` can be shared with whatever drives the UI.
pub struct Orchestrator {
    upload: Arc<dyn UploadBackend>,
    underwrite: Arc<dyn UnderwriteBackend>,
    status: StatusStreamClient,
    state: Mutex<PipelineState>,
}

impl Orchestrator {
    /// Production constructor — builds the HTTP clients from config.
    pub fn from_config(config: &ServiceConfig) -> crate::error::Result<Self> {
        let http = crate::client::build_http_client(config.request_timeout)?;
        // The stream connection must outlive any request timeout.
        let stream_http = reqwest::Client::new();

        Ok(Self {
            upload: Arc::new(UploadClient::new(http.clone(), config)),
            underwrite: Arc::new(UnderwriteClient::new(http, config)),
            status: StatusStreamClient::new(stream_http, config),
            state: Mutex::new(PipelineState::Idle),
        })
    }

    /// Test constructor — inject specific backends and feed.
    #[cfg(test)]
    pub(crate) fn new(
        upload: Arc<dyn UploadBackend>,
        underwrite: Arc<dyn UnderwriteBackend>,
        status: StatusStreamClient,
    ) -> Self {
        Self {
            upload,
            underwrite,
            status,
            state: Mutex::new(PipelineState::Idle),
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock().expect("pipeline state lock poisoned")
    }

    fn set_state(&self, next: PipelineState) {
        *self.state.lock().expect("pipeline state lock poisoned") = next;
    }

    /// Subscribes to live status events of the current run.
    pub fn status_events(&self) -> tokio::sync::broadcast::Receiver<StatusEvent> {
        self.status.subscribe()
    }

    /// Current rendering of the status log, newest step first.
    pub fn status_log(&self) -> Vec<StatusEntry> {
        self.status.snapshot()
    }

    /// Runs one full upload → underwrite cycle.
    ///
    /// Rejects re-entry while a run is active. Residual state of a finished
    /// run (log contents, terminal state) is discarded on the next run.
    pub async fn run(
        &self,
        files: &[StagedFile],
        options: &RunOptions,
    ) -> Result<AnalysisResult, PipelineError> {
        {
            let mut state = self.state.lock().expect("pipeline state lock poisoned");
            if state.is_active() {
                return Err(PipelineError::RunActive(*state));
            }
            *state = PipelineState::Uploading;
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id, provider = %options.provider);

        async {
            let upload = match self
                .upload
                .submit(files, &options.provider, options.debug)
                .await
            {
                Ok(upload) => upload,
                Err(e) => {
                    // Stream never opened, underwrite never issued.
                    self.set_state(PipelineState::Failed);
                    return Err(PipelineError::Upload(e));
                }
            };

            self.set_state(PipelineState::Streaming);
            if let Err(e) = self.status.open().await {
                // Advisory feed only: degrade to "no live status" and keep going.
                warn!("Status feed unavailable for this run: {e}");
            }

            // Not gated on any stream event.
            self.set_state(PipelineState::Underwriting);
            let outcome = self
                .underwrite
                .underwrite(&upload, &options.provider, options.debug)
                .await;

            self.status.close();

            match outcome {
                Ok(analysis) => {
                    self.set_state(PipelineState::Complete);
                    Ok(analysis)
                }
                Err(e) => {
                    self.set_state(PipelineState::Failed);
                    Err(PipelineError::Underwrite(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StepStatus;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct StubUpload {
        fail: bool,
        hold: Option<Arc<Notify>>,
    }

    impl StubUpload {
        fn ok() -> Self {
            Self {
                fail: false,
                hold: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                hold: None,
            }
        }

        fn held(notify: Arc<Notify>) -> Self {
            Self {
                fail: false,
                hold: Some(notify),
            }
        }
    }

    #[async_trait]
    impl UploadBackend for StubUpload {
        async fn submit(
            &self,
            _files: &[StagedFile],
            _provider: &str,
            _debug: bool,
        ) -> Result<UploadResult, UploadError> {
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            if self.fail {
                Err(UploadError::Rejected {
                    status: 400,
                    message: "No valid PDF files uploaded".to_string(),
                })
            } else {
                Ok(UploadResult::default())
            }
        }
    }

    struct StubUnderwrite {
        fail: bool,
        called: AtomicBool,
    }

    impl StubUnderwrite {
        fn ok() -> Self {
            Self {
                fail: false,
                called: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl UnderwriteBackend for StubUnderwrite {
        async fn underwrite(
            &self,
            _upload: &UploadResult,
            _provider: &str,
            _debug: bool,
        ) -> Result<AnalysisResult, UnderwriteError> {
            self.called.store(true, Ordering::SeqCst);
            // Let the scripted feed drain before the run tears it down.
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail {
                Err(UnderwriteError::Rejected {
                    status: 502,
                    status_text: "Bad Gateway".to_string(),
                })
            } else {
                Ok(AnalysisResult::default())
            }
        }
    }

    fn scripted_feed() -> StatusStreamClient {
        StatusStreamClient::scripted(
            vec![
                StatusEvent::new("start", StepStatus::Processing, "Received underwrite request"),
                StatusEvent::new("complete", StepStatus::Success, "All analyses complete"),
            ],
            &ServiceConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_happy_path_completes_and_closes_stream() {
        let orchestrator = Orchestrator::new(
            Arc::new(StubUpload::ok()),
            Arc::new(StubUnderwrite::ok()),
            scripted_feed(),
        );

        let result = orchestrator
            .run(&[], &RunOptions::new("openai"))
            .await;

        assert!(result.is_ok());
        assert_eq!(orchestrator.state(), PipelineState::Complete);
        assert!(!orchestrator.status.is_open());
        // The feed was actually followed during the run.
        let log = orchestrator.status_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].step, "complete");
    }

    #[tokio::test]
    async fn test_underwrite_failure_fails_run_and_closes_stream() {
        let orchestrator = Orchestrator::new(
            Arc::new(StubUpload::ok()),
            Arc::new(StubUnderwrite::failing()),
            scripted_feed(),
        );

        let err = orchestrator
            .run(&[], &RunOptions::new("openai"))
            .await
            .unwrap_err();

        assert_eq!(orchestrator.state(), PipelineState::Failed);
        assert!(!orchestrator.status.is_open());
        // The surfaced message embeds the underwrite failure detail.
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[tokio::test]
    async fn test_upload_failure_never_opens_stream_or_underwrites() {
        let underwrite = Arc::new(StubUnderwrite::ok());
        let orchestrator = Orchestrator::new(
            Arc::new(StubUpload::failing()),
            Arc::clone(&underwrite) as Arc<dyn UnderwriteBackend>,
            scripted_feed(),
        );

        let err = orchestrator
            .run(&[], &RunOptions::new("openai"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Upload(_)));
        assert_eq!(orchestrator.state(), PipelineState::Failed);
        assert!(!underwrite.called.load(Ordering::SeqCst));
        assert!(orchestrator.status_log().is_empty());
    }

    #[tokio::test]
    async fn test_active_run_rejects_reentry() {
        let gate = Arc::new(Notify::new());
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(StubUpload::held(Arc::clone(&gate))),
            Arc::new(StubUnderwrite::ok()),
            scripted_feed(),
        ));

        let first = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.run(&[], &RunOptions::new("openai")).await })
        };

        // Wait until the first run holds the pipeline.
        for _ in 0..100 {
            if orchestrator.state() == PipelineState::Uploading {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let err = orchestrator
            .run(&[], &RunOptions::new("openai"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::RunActive(PipelineState::Uploading)));

        gate.notify_one();
        let result = first.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(orchestrator.state(), PipelineState::Complete);
    }

    #[tokio::test]
    async fn test_terminal_states_allow_resubmission() {
        let orchestrator = Orchestrator::new(
            Arc::new(StubUpload::ok()),
            Arc::new(StubUnderwrite::ok()),
            scripted_feed(),
        );

        orchestrator
            .run(&[], &RunOptions::new("openai"))
            .await
            .unwrap();
        assert!(orchestrator.state().is_terminal());

        // Re-entrant from Complete; prior residue is replaced, not appended.
        orchestrator
            .run(&[], &RunOptions::new("gemini"))
            .await
            .unwrap();
        assert_eq!(orchestrator.state(), PipelineState::Complete);
        assert_eq!(orchestrator.status_log().len(), 2);
    }

    #[test]
    fn test_state_predicates() {
        assert!(PipelineState::Uploading.is_active());
        assert!(PipelineState::Streaming.is_active());
        assert!(PipelineState::Underwriting.is_active());
        assert!(!PipelineState::Idle.is_active());
        assert!(PipelineState::Complete.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Uploading.is_terminal());
    }

    #[test]
    fn test_run_options_builder() {
        let options = RunOptions::new("anthropic").debug(true);
        assert_eq!(options.provider, "anthropic");
        assert!(options.debug);
    }
}
