//! Multipart submission of staged documents to the upload service.

use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};

use crate::client::sanitize_error_body;
use crate::client::types::{ErrorBody, UploadResult};
use crate::config::ServiceConfig;
use crate::error::UploadError;
use crate::intake::StagedFile;

/// Client for `POST /upload`.
///
/// One pipeline run makes exactly one call: every staged file travels in a
/// single multipart request together with the `provider` and `debug` scalars.
/// There is no retry; failures surface to the orchestrator.
#[derive(Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
    clear_endpoint: String,
}

impl UploadClient {
    pub fn new(http: reqwest::Client, config: &ServiceConfig) -> Self {
        Self {
            http,
            endpoint: config.upload_url(),
            clear_endpoint: config.clear_uploads_url(),
        }
    }

    /// Submits the staged files as one atomic multipart request and parses
    /// the classification response.
    ///
    /// A non-success status maps to [`UploadError::Rejected`] carrying the
    /// server's `error` field when the body parses, else a generic status
    /// message. Missing response sub-fields decode to empty defaults;
    /// downstream consumers treat them as "nothing of that class".
    pub async fn submit(
        &self,
        files: &[StagedFile],
        provider: &str,
        debug: bool,
    ) -> Result<UploadResult, UploadError> {
        let mut form = Form::new()
            .text("provider", provider.to_string())
            .text("debug", debug.to_string());

        for file in files {
            let contents =
                tokio::fs::read(&file.path)
                    .await
                    .map_err(|source| UploadError::ReadFile {
                        path: file.path.clone(),
                        source,
                    })?;
            debug!("Attaching {} ({} bytes)", file.name, contents.len());
            let part = Part::bytes(contents)
                .file_name(file.name.clone())
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }

        info!(
            "Uploading {} file(s) to {} (provider: {})",
            files.len(),
            self.endpoint,
            provider
        );

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("upload failed with status {}", status.as_u16()));
            warn!(
                "Upload rejected ({}): {}",
                status.as_u16(),
                sanitize_error_body(&body)
            );
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<UploadResult>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }

    /// Asks the server to discard its upload staging area.
    pub async fn clear_uploads(&self) -> Result<(), UploadError> {
        let response = self.http.post(&self.clear_endpoint).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("clear-uploads failed with status {}", status.as_u16()));
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client_for(base: &str) -> UploadClient {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        UploadClient::new(http, &ServiceConfig::new(base))
    }

    #[tokio::test]
    async fn test_submit_transport_failure() {
        // 192.0.2.1 (TEST-NET-1, RFC 5737) is guaranteed non-routable.
        let client = client_for("http://192.0.2.1:1");
        let files = vec![];
        let err = client.submit(&files, "openai", false).await.unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }

    #[tokio::test]
    async fn test_clear_uploads_transport_failure() {
        let client = client_for("http://192.0.2.1:1");
        let err = client.clear_uploads().await.unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }

    #[tokio::test]
    async fn test_submit_unreadable_file() {
        let client = client_for("http://localhost:8080");
        let files = vec![StagedFile::from_path("/nonexistent/statement.pdf")];
        let err = client.submit(&files, "openai", false).await.unwrap_err();
        match err {
            UploadError::ReadFile { path, .. } => {
                assert_eq!(path, std::path::PathBuf::from("/nonexistent/statement.pdf"));
            }
            other => panic!("Expected ReadFile, got {other:?}"),
        }
    }
}
