//! The dependent credit-decision request issued after a successful upload.

use log::info;

use crate::client::types::{AnalysisResult, UnderwriteRequest, UploadResult};
use crate::config::ServiceConfig;
use crate::error::UnderwriteError;

/// Client for `POST /underwrite`.
///
/// Issued exactly once per pipeline run, with identifiers and classification
/// data from the upload response. No retry.
#[derive(Clone)]
pub struct UnderwriteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UnderwriteClient {
    pub fn new(http: reqwest::Client, config: &ServiceConfig) -> Self {
        Self {
            http,
            endpoint: config.underwrite_url(),
        }
    }

    /// Requests the credit decision for a completed upload and awaits the
    /// full analysis payload.
    pub async fn underwrite(
        &self,
        upload: &UploadResult,
        provider: &str,
        debug: bool,
    ) -> Result<AnalysisResult, UnderwriteError> {
        let request = UnderwriteRequest::from_upload(upload, provider, debug);

        info!(
            "Requesting underwrite for {} file(s) (provider: {})",
            request.file_paths.len(),
            provider
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            return Err(UnderwriteError::Rejected {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| UnderwriteError::InvalidResponse(e.to_string()))
    }
}
