use tokio::sync::mpsc;

use crate::types::{EvaluationResult, ProgressEvent, ResultRow};

/// Terminal state of one batch run as observed by the stream consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchTerminal {
    Running,
    Complete,
    Failed,
}

/// Serializes pipeline state transitions into an ordered event sequence.
///
/// Enforces the state machine `running → running(c increasing) → complete |
/// error`: the first of complete/error is terminal and anything emitted
/// afterwards is dropped. A closed receiver (the consumer went away) is
/// tolerated silently; progress is advisory.
pub struct ProgressEmitter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    state: BatchTerminal,
}

impl ProgressEmitter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                state: BatchTerminal::Running,
            },
            rx,
        )
    }

    pub fn state(&self) -> BatchTerminal {
        self.state
    }

    /// Emit a progress snapshot. `current` counts completed units and is
    /// monotonically non-decreasing over a run.
    pub fn progress(&mut self, current: usize, total: usize, message: impl Into<String>) {
        if self.state != BatchTerminal::Running {
            return;
        }
        self.send(ProgressEvent::Progress {
            current,
            total,
            message: message.into(),
        });
    }

    /// Emit the terminal `complete` event carrying the full ordered result
    /// sequence exactly once.
    pub fn complete(&mut self, results: &[EvaluationResult]) {
        if self.state != BatchTerminal::Running {
            return;
        }
        self.state = BatchTerminal::Complete;
        self.send(ProgressEvent::Complete {
            results: results.iter().map(ResultRow::from).collect(),
        });
    }

    /// Emit the terminal `error` event. No further events follow.
    pub fn error(&mut self, message: impl Into<String>) {
        if self.state != BatchTerminal::Running {
            return;
        }
        self.state = BatchTerminal::Failed;
        self.send(ProgressEvent::Error {
            message: message.into(),
        });
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Render one event as a self-contained, newline-terminated JSON line for
/// the NDJSON transport.
pub fn ndjson_line(event: &ProgressEvent) -> String {
    let mut line = serde_json::to_string(event).unwrap_or_else(|_| {
        r#"{"status":"error","message":"event serialization failed"}"#.to_string()
    });
    line.push('\n');
    line
}
