//! Annotator audit trail.
//!
//! Logged actions are bracketed by a START event before the handler runs and
//! a FINISH event afterwards. [`AuditBracket`] owns the FINISH half: it is
//! emitted exactly once, with a `success` or `failure` outcome, even when the
//! handler unwinds.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Tracing target for audit events.
pub const AUDIT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::audit");

/// Position of an event within the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditPhase {
    /// Emitted before the handler runs.
    Start,
    /// Emitted after the handler returns or unwinds.
    Finish,
}

impl AuditPhase {
    /// Canonical string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Finish => "FINISH",
        }
    }
}

/// How the bracketed handler ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The handler returned a result.
    Success,
    /// The handler returned an error or unwound.
    Failure,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    /// Collection field of the request, if supplied.
    pub collection: Option<Value>,
    /// Document field of the request, if supplied.
    pub document: Option<Value>,
    /// Bracket position.
    pub phase: AuditPhase,
    /// Outcome, present on FINISH events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AuditOutcome>,
    /// Action name.
    pub action: String,
    /// Arguments the handler was called with.
    pub arguments: Vec<Value>,
}

/// Destination for audit events.
///
/// Sinks must not fail the request: storage problems are the sink's own to
/// report.
pub trait AuditSink: Send + Sync {
    /// Appends an event.
    fn record(&self, event: &AuditEvent);
}

impl<T> AuditSink for Arc<T>
where
    T: AuditSink + ?Sized,
{
    fn record(&self, event: &AuditEvent) {
        (**self).record(event);
    }
}

/// Sink that writes audit events as structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let arguments = serde_json::to_string(&event.arguments)
            .unwrap_or_else(|error| format!("<unserialisable: {error}>"));
        info!(
            target: AUDIT_TARGET,
            phase = event.phase.as_str(),
            outcome = ?event.outcome,
            action = %event.action,
            collection = ?event.collection,
            document = ?event.document,
            arguments = %arguments,
            "annotator action"
        );
    }
}

/// Scoped START/FINISH pair around one handler invocation.
pub(crate) struct AuditBracket<'a> {
    sink: &'a dyn AuditSink,
    event: AuditEvent,
    finished: bool,
}

impl<'a> AuditBracket<'a> {
    /// Emits the START event and arms the FINISH event.
    pub(crate) fn open(
        sink: &'a dyn AuditSink,
        collection: Option<Value>,
        document: Option<Value>,
        action: &str,
        arguments: Vec<Value>,
    ) -> Self {
        let event = AuditEvent {
            collection,
            document,
            phase: AuditPhase::Start,
            outcome: None,
            action: action.to_owned(),
            arguments,
        };
        sink.record(&event);
        Self {
            sink,
            event,
            finished: false,
        }
    }

    /// Emits the FINISH event with `outcome`.
    pub(crate) fn finish(mut self, outcome: AuditOutcome) {
        self.emit_finish(outcome);
    }

    fn emit_finish(&mut self, outcome: AuditOutcome) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.event.phase = AuditPhase::Finish;
        self.event.outcome = Some(outcome);
        self.sink.record(&self.event);
    }
}

impl Drop for AuditBracket<'_> {
    fn drop(&mut self) {
        self.emit_finish(AuditOutcome::Failure);
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Mutex;

    use serde_json::json;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl Recorder {
        fn phases(&self) -> Vec<(AuditPhase, Option<AuditOutcome>)> {
            self.events
                .lock()
                .expect("recorder mutex poisoned")
                .iter()
                .map(|event| (event.phase, event.outcome))
                .collect()
        }
    }

    impl AuditSink for Recorder {
        fn record(&self, event: &AuditEvent) {
            self.events
                .lock()
                .expect("recorder mutex poisoned")
                .push(event.clone());
        }
    }

    fn open(sink: &Recorder) -> AuditBracket<'_> {
        AuditBracket::open(
            sink,
            Some(json!("/news/")),
            Some(json!("doc-1")),
            "createSpan",
            vec![json!("/news/"), json!("doc-1")],
        )
    }

    #[test]
    fn finish_emits_single_success_event() {
        let sink = Recorder::default();
        open(&sink).finish(AuditOutcome::Success);
        assert_eq!(
            sink.phases(),
            vec![
                (AuditPhase::Start, None),
                (AuditPhase::Finish, Some(AuditOutcome::Success)),
            ]
        );
    }

    #[test]
    fn dropping_an_open_bracket_records_failure() {
        let sink = Recorder::default();
        drop(open(&sink));
        assert_eq!(
            sink.phases(),
            vec![
                (AuditPhase::Start, None),
                (AuditPhase::Finish, Some(AuditOutcome::Failure)),
            ]
        );
    }

    #[test]
    fn unwinding_handler_still_finishes() {
        let sink = Recorder::default();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _bracket = open(&sink);
            panic!("handler blew up");
        }));
        assert!(result.is_err());
        assert_eq!(
            sink.phases().last(),
            Some(&(AuditPhase::Finish, Some(AuditOutcome::Failure)))
        );
    }

    #[test]
    fn events_serialise_with_uppercase_phase() {
        let event = AuditEvent {
            collection: None,
            document: None,
            phase: AuditPhase::Start,
            outcome: None,
            action: "getDocument".to_owned(),
            arguments: Vec::new(),
        };
        let value = serde_json::to_value(&event).expect("serialise");
        assert_eq!(value.get("phase"), Some(&json!("START")));
        assert!(value.get("outcome").is_none());
    }

    /// Collects formatted log output for inspection.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().expect("capture mutex poisoned").clone();
            String::from_utf8(bytes)
                .expect("utf8 log output")
                .lines()
                .map(|line| serde_json::from_str(line).expect("json log line"))
                .collect()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("capture mutex poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn tracing_sink_writes_one_record_per_phase() {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            open_with(&TracingAuditSink).finish(AuditOutcome::Success);
        });

        let lines = log.lines();
        let phases: Vec<_> = lines.iter().map(|line| line["phase"].clone()).collect();
        assert_eq!(phases, vec![json!("START"), json!("FINISH")]);
        for line in &lines {
            assert_eq!(line["target"], json!(AUDIT_TARGET));
            assert_eq!(line["action"], json!("logAnnotatorAction"));
            assert_eq!(line["arguments"], json!(r#"["note"]"#));
        }
    }

    fn open_with(sink: &dyn AuditSink) -> AuditBracket<'_> {
        AuditBracket::open(sink, None, None, "logAnnotatorAction", vec![json!("note")])
    }
}
