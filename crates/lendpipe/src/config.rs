use std::time::Duration;

/// Capacity of the rendered status log; oldest entries are evicted beyond it.
pub const STATUS_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the underwriting service, without a trailing slash.
    pub base_url: String,
    /// Timeout for the upload and underwrite requests. The status stream is
    /// long-lived and never carries a timeout.
    pub request_timeout: Duration,
    /// Bound on the rendered status log.
    pub status_log_capacity: usize,
    /// Buffer of the status broadcast channel.
    pub status_channel_capacity: usize,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    pub fn status_url(&self) -> String {
        format!("{}/status", self.base_url)
    }

    pub fn underwrite_url(&self) -> String {
        format!("{}/underwrite", self.base_url)
    }

    pub fn clear_uploads_url(&self) -> String {
        format!("{}/clear-uploads", self.base_url)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            // Underwriting runs model-driven analysis server-side; allow it time.
            request_timeout: Duration::from_secs(600),
            status_log_capacity: STATUS_LOG_CAPACITY,
            status_channel_capacity: 100,
        }
    }
}
