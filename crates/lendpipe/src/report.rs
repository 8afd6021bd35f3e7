//! View models derived from a finished analysis.
//!
//! Pure, stateless transformation: whatever the service left out is
//! substituted with zero/empty/`"N/A"` defaults here, so rendering never
//! branches on missing data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::types::{AnalysisResult, DatedBalance, Decision, LoanRecommendation};

/// Rationale shown when the service sent none.
const NO_ANALYSIS_TEXT: &str = "No detailed analysis available";

/// Length of the rationale excerpt on the decision card.
const EXCERPT_CHARS: usize = 200;

/// Everything a results view needs, fully defaulted.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub decisions: Vec<DecisionCard>,
    /// Present only when bank-statement extraction carried any data.
    pub financial: Option<FinancialSummary>,
}

impl AnalysisReport {
    pub fn has_decisions(&self) -> bool {
        !self.decisions.is_empty()
    }
}

/// One product decision, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionCard {
    pub product_type: String,
    pub product_name: String,
    pub decision: Decision,
    /// Decision label with underscores spaced out, e.g. "MANUAL REVIEW".
    pub decision_label: String,
    /// Rounded percentage clamped to [0, 100].
    pub confidence_percent: u8,
    pub max_loan_amount: f64,
    pub max_monthly_payment_amount: f64,
    pub detailed_analysis: String,
    pub risk_factors: Vec<String>,
    pub mitigating_factors: Vec<String>,
    pub conditions_if_approved: Vec<String>,
}

impl DecisionCard {
    fn from_recommendation(rec: &LoanRecommendation) -> Self {
        Self {
            product_type: rec.product_type.clone(),
            product_name: rec.product_name.clone(),
            decision: rec.approval_decision.clone(),
            decision_label: rec.approval_decision.display_label(),
            confidence_percent: confidence_percent(rec.confidence_score),
            max_loan_amount: rec.max_loan_amount,
            max_monthly_payment_amount: rec.max_monthly_payment_amount,
            detailed_analysis: rec
                .detailed_analysis
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_ANALYSIS_TEXT.to_string()),
            risk_factors: rec.risk_factors.clone(),
            mitigating_factors: rec.mitigating_factors.clone(),
            conditions_if_approved: rec.conditions_if_approved.clone(),
        }
    }

    /// Rationale shortened for the summary card.
    pub fn summary_excerpt(&self) -> String {
        let mut chars = self.detailed_analysis.char_indices();
        match chars.nth(EXCERPT_CHARS) {
            Some((cut, _)) => format!("{}...", &self.detailed_analysis[..cut]),
            None => self.detailed_analysis.clone(),
        }
    }

    /// Conditions apply to approved and review outcomes only.
    pub fn conditions_apply(&self) -> bool {
        matches!(self.decision, Decision::Approved | Decision::ManualReview)
    }
}

/// Banking-activity summary, defaulted field by field.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub lowest_monthly_balance: f64,
    pub average_daily_balance_trend: String,
    pub payment_coverage_ratio: f64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_cashflow: f64,
    pub nsf_incident_count: u32,
    pub nsf_total_fees: f64,
    pub highest_nsf_month_count: u32,
    pub daily_balances: Vec<DatedBalance>,
}

/// Builds the full report from an analysis payload.
pub fn build_report(result: &AnalysisResult) -> AnalysisReport {
    let decisions = result
        .loan_recommendations
        .iter()
        .map(DecisionCard::from_recommendation)
        .collect();

    let financial = result
        .analysis
        .bank_statements
        .as_ref()
        .filter(|bank| !bank.is_empty())
        .map(|bank| {
            // Key metrics ride on the first recommendation.
            let metrics = result
                .loan_recommendations
                .first()
                .map(|rec| rec.key_metrics.clone())
                .unwrap_or_default();
            let financials = bank.monthly_financials.clone().unwrap_or_default();
            let nsf = bank.nsf_information.clone().unwrap_or_default();

            FinancialSummary {
                lowest_monthly_balance: metrics.lowest_monthly_balance,
                average_daily_balance_trend: metrics
                    .average_daily_balance_trend
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
                payment_coverage_ratio: metrics.payment_coverage_ratio,
                total_revenue: financials.total_revenue,
                total_expenses: financials.total_expenses,
                net_cashflow: financials.net_cashflow,
                nsf_incident_count: nsf.incident_count,
                nsf_total_fees: nsf.total_fees,
                highest_nsf_month_count: metrics.highest_nsf_month_count,
                daily_balances: bank
                    .daily_balances
                    .clone()
                    .map(|d| d.balances)
                    .unwrap_or_default(),
            }
        });

    AnalysisReport {
        generated_at: Utc::now(),
        decisions,
        financial,
    }
}

fn confidence_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}
