//! Shared helpers for integration tests.

#![allow(dead_code)]

use lendpipe::stream::{StatusEvent, StepStatus};

/// A captured underwrite response in the service's full shape.
pub const MASTER_RESPONSE: &str = include_str!("../fixtures/master_response.json");

/// Builds a status event the way the backend emits them.
pub fn status_event(step: &str, status: StepStatus, details: &str) -> StatusEvent {
    StatusEvent::new(step, status, details)
}

/// The step sequence a bank-statement run typically pushes.
pub fn bank_run_events() -> Vec<StatusEvent> {
    vec![
        status_event("start", StepStatus::Processing, "Received underwrite request"),
        status_event("llm_setup", StepStatus::Processing, "Initializing openai LLM"),
        status_event("llm_setup", StepStatus::Complete, "LLM initialized successfully"),
        status_event("bank_analysis", StepStatus::Processing, "Analyzing bank statements"),
        status_event("continuity", StepStatus::Complete, "Statements are contiguous"),
        status_event("daily_balances", StepStatus::Processing, "Analyzing daily balances"),
        status_event("daily_balances", StepStatus::Complete, "Daily balance analysis complete"),
        status_event("nsf", StepStatus::Processing, "Checking for NSF incidents"),
        status_event("nsf", StepStatus::Complete, "NSF analysis complete"),
        status_event("complete", StepStatus::Success, "All analyses complete"),
    ]
}
