//! Wire types for the upload and underwrite services.
//!
//! The server is free to omit any sub-field; everything here decodes
//! tolerantly and defaults to zero/empty so downstream rendering never has to
//! special-case a partial payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─── Upload service ─────────────────────────────────────────────────────────

/// Synchronous response of `POST /upload`.
///
/// `merged_files` maps a document class (`bank_statements`, `tax_returns`) to
/// the server-side path of the merged per-class PDF; the client passes it
/// through to the underwrite request untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResult {
    /// Server-side paths of the uploaded files, in submission order.
    #[serde(default)]
    pub original_files: Vec<String>,
    /// Document class → merged file path.
    #[serde(default)]
    pub merged_files: BTreeMap<String, String>,
    /// Classification outcome of the upload.
    #[serde(default)]
    pub summary: DocumentSummary,
}

/// Classification summary returned with an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Number of files accepted by the server.
    #[serde(default)]
    pub total_files: u64,
    /// Whether the upload contained bank statements.
    #[serde(default)]
    pub bank_statements: bool,
    /// Whether the upload contained tax returns.
    #[serde(default)]
    pub tax_returns: bool,
}

/// Error body the services attach to non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

// ─── Underwrite service ─────────────────────────────────────────────────────

/// Request body of `POST /underwrite`.
#[derive(Debug, Clone, Serialize)]
pub struct UnderwriteRequest {
    pub file_paths: Vec<String>,
    pub merged_files: BTreeMap<String, String>,
    pub document_types: DocumentTypes,
    pub provider: String,
    pub debug: bool,
}

impl UnderwriteRequest {
    /// Builds the request from an upload outcome. Only the two class flags of
    /// the summary are projected into `document_types`.
    pub fn from_upload(upload: &UploadResult, provider: &str, debug: bool) -> Self {
        Self {
            file_paths: upload.original_files.clone(),
            merged_files: upload.merged_files.clone(),
            document_types: DocumentTypes {
                bank_statements: upload.summary.bank_statements,
                tax_returns: upload.summary.tax_returns,
            },
            provider: provider.to_string(),
            debug,
        }
    }
}

/// Reduced classification projection sent to the underwrite service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentTypes {
    #[serde(default)]
    pub bank_statements: bool,
    #[serde(default)]
    pub tax_returns: bool,
}

// ─── Analysis payload ───────────────────────────────────────────────────────

/// Final payload of a successful underwrite run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub loan_recommendations: Vec<LoanRecommendation>,
    #[serde(default)]
    pub analysis: DocumentAnalysis,
}

/// Per-document-type financial extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_statements: Option<BankStatementAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_returns: Option<TaxReturnAnalysis>,
}

/// One product decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanRecommendation {
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub approval_decision: Decision,
    /// Confidence in [0, 1].
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub max_loan_amount: f64,
    #[serde(default)]
    pub max_monthly_payment_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<String>,
    #[serde(default)]
    pub mitigating_factors: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub conditions_if_approved: Vec<String>,
    #[serde(default)]
    pub key_metrics: KeyMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_based_on: Option<AnalysisBasis>,
}

/// Credit decision category.
///
/// The service has been observed emitting strings, booleans, and omitting the
/// field entirely. Strings keep their category (unrecognized ones are carried
/// verbatim), `true`/`false` coerce to approved/declined, and any other JSON
/// shape is `Unknown` rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "String")]
pub enum Decision {
    Approved,
    Declined,
    ManualReview,
    Other(String),
    Unknown,
}

impl Decision {
    /// Canonical wire label, e.g. `"MANUAL_REVIEW"`.
    pub fn label(&self) -> &str {
        match self {
            Decision::Approved => "APPROVED",
            Decision::Declined => "DECLINED",
            Decision::ManualReview => "MANUAL_REVIEW",
            Decision::Other(s) => s,
            Decision::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable label with underscores spaced out.
    pub fn display_label(&self) -> String {
        self.label().replace('_', " ")
    }
}

impl Default for Decision {
    fn default() -> Self {
        Decision::Unknown
    }
}

impl From<serde_json::Value> for Decision {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => match s.as_str() {
                "APPROVED" => Decision::Approved,
                "DECLINED" => Decision::Declined,
                "MANUAL_REVIEW" => Decision::ManualReview,
                _ => Decision::Other(s),
            },
            serde_json::Value::Bool(true) => Decision::Approved,
            serde_json::Value::Bool(false) => Decision::Declined,
            _ => Decision::Unknown,
        }
    }
}

impl From<Decision> for String {
    fn from(decision: Decision) -> Self {
        decision.label().to_string()
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Metrics backing a recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyMetrics {
    #[serde(default)]
    pub payment_coverage_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_daily_balance_trend: Option<String>,
    #[serde(default)]
    pub lowest_monthly_balance: f64,
    #[serde(default)]
    pub highest_nsf_month_count: u32,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(default)]
    pub net_cashflow: f64,
}

/// Which document classes the decision was computed from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisBasis {
    #[serde(default)]
    pub used_bank_statements: bool,
    #[serde(default)]
    pub used_tax_returns: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankStatementAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuity: Option<Continuity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_balances: Option<DailyBalances>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsf_information: Option<NsfInformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_balances: Option<ClosingBalances>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_financials: Option<MonthlyFinancials>,
}

impl BankStatementAnalysis {
    /// True when no extraction section is present at all.
    pub fn is_empty(&self) -> bool {
        self.continuity.is_none()
            && self.daily_balances.is_none()
            && self.nsf_information.is_none()
            && self.closing_balances.is_none()
            && self.monthly_financials.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Continuity {
    #[serde(default)]
    pub continuous: bool,
    #[serde(default)]
    pub missing_periods: Vec<String>,
    #[serde(default)]
    pub statement_periods: Vec<StatementPeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementPeriod {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyBalances {
    #[serde(default)]
    pub balances: Vec<DatedBalance>,
    #[serde(default)]
    pub average_balance: f64,
    #[serde(default)]
    pub min_balance: f64,
    #[serde(default)]
    pub max_balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatedBalance {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NsfInformation {
    #[serde(default)]
    pub incident_count: u32,
    #[serde(default)]
    pub total_fees: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClosingBalances {
    #[serde(default)]
    pub monthly_balances: Vec<MonthlyBalance>,
    #[serde(default)]
    pub average_closing_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyBalance {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyFinancials {
    #[serde(default)]
    pub monthly_data: Vec<MonthlyCashflow>,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(default)]
    pub net_cashflow: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyCashflow {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub expenses: f64,
    #[serde(default)]
    pub net_cashflow: f64,
}

/// Tax-return section; the service currently reports a status stub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxReturnAnalysis {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}
