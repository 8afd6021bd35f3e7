//! HTTP clients for the upload and underwrite services.

pub mod types;
pub mod underwrite;
pub mod upload;

pub use types::{
    AnalysisBasis, AnalysisResult, BankStatementAnalysis, ClosingBalances, Continuity,
    DailyBalances, DatedBalance, Decision, DocumentAnalysis, DocumentSummary, DocumentTypes,
    KeyMetrics, LoanRecommendation, MonthlyBalance, MonthlyCashflow, MonthlyFinancials,
    NsfInformation, StatementPeriod, TaxReturnAnalysis, UnderwriteRequest, UploadResult,
};
pub use underwrite::UnderwriteClient;
pub use upload::UploadClient;

use std::time::Duration;

use crate::error::UploadError;

/// Builds the shared client for the two request/response endpoints.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, UploadError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Maximum length of a server error body quoted in messages and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates an error body so a misbehaving server cannot flood messages.
pub(crate) fn sanitize_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_short_body_unchanged() {
        assert_eq!(sanitize_error_body("oops"), "oops");
    }

    #[test]
    fn test_sanitize_long_body_truncated() {
        let body = "x".repeat(500);
        let sanitized = sanitize_error_body(&body);
        assert!(sanitized.ends_with("... (truncated)"));
        assert!(sanitized.len() < body.len());
    }
}
