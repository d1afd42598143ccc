//! Test double for [`AuditSink`] that keeps every event for assertions.

use std::sync::Mutex;

use crate::audit::{AuditEvent, AuditOutcome, AuditPhase, AuditSink};

/// Records audit events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .expect("audit sink mutex poisoned")
            .clone()
    }

    /// Phase and outcome of each recorded event.
    #[must_use]
    pub fn phases(&self) -> Vec<(AuditPhase, Option<AuditOutcome>)> {
        self.events()
            .iter()
            .map(|event| (event.phase, event.outcome))
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events
            .lock()
            .expect("audit sink mutex poisoned")
            .push(event.clone());
    }
}
