//! Bounded, keyed log of status events.
//!
//! The feed repeats itself: a step usually announces `Processing` and later
//! `Complete` (or `Error`) under the same key. Rendering wants one row per
//! step, updated in place, newest steps first, with the tail evicted past a
//! fixed capacity. That is a bounded ordered map keyed by step identity, not
//! a list.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{StatusEvent, StepStatus};

/// One rendered row of the status log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub step: String,
    pub status: StepStatus,
    pub details: String,
    /// When the first event for this step arrived.
    pub received_at: DateTime<Utc>,
    /// When the latest event for this step arrived.
    pub updated_at: DateTime<Utc>,
}

/// Insertion-ordered, capacity-bounded map of step → latest event.
#[derive(Debug)]
pub struct StatusLog {
    capacity: usize,
    entries: HashMap<String, StatusEntry>,
    /// Step keys, newest first.
    order: VecDeque<String>,
    /// Step of the most recently applied event.
    latest_step: Option<String>,
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            latest_step: None,
        }
    }

    /// Applies one event: same-key events collapse in place (last write
    /// wins, position unchanged); a new key is prepended, evicting the
    /// oldest entry once the log is full.
    pub fn apply(&mut self, event: StatusEvent) {
        let now = Utc::now();
        self.latest_step = Some(event.step.clone());

        if let Some(entry) = self.entries.get_mut(&event.step) {
            entry.status = event.status;
            entry.details = event.details;
            entry.updated_at = now;
            return;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_back() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_front(event.step.clone());
        self.entries.insert(
            event.step.clone(),
            StatusEntry {
                step: event.step,
                status: event.status,
                details: event.details,
                received_at: now,
                updated_at: now,
            },
        );
    }

    /// Entries newest-first.
    pub fn entries(&self) -> Vec<StatusEntry> {
        self.order
            .iter()
            .filter_map(|step| self.entries.get(step).cloned())
            .collect()
    }

    pub fn get(&self, step: &str) -> Option<&StatusEntry> {
        self.entries.get(step)
    }

    /// The most recently updated entry, i.e. the "current status" headline.
    pub fn latest(&self) -> Option<&StatusEntry> {
        self.latest_step
            .as_deref()
            .and_then(|step| self.entries.get(step))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.latest_step = None;
    }
}
