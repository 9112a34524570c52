// Progress stream emitter: wire shapes of the NDJSON protocol and the
// terminal state machine (nothing follows complete or error).

use safesign_core::stream::{ndjson_line, BatchTerminal, ProgressEmitter};
use safesign_core::types::{EvalOutcome, EvaluationResult, ProgressEvent, ResultRow};

fn sample_result() -> EvaluationResult {
    EvaluationResult {
        ordinal: 2,
        clause_text: "Article 2 (Wage) wage includes all overtime pay as a comprehensive wage."
            .into(),
        risk_score: 8.0,
        is_toxic: true,
        reason: "comprehensive wage can hide unpaid overtime".into(),
        context_used: "=== [Relevant Statutes] ===\nLabor Standards Act art. 56".into(),
        suggestion: "**Suggested redraft**: overtime paid separately.".into(),
        outcome: EvalOutcome::Success,
        error_detail: String::new(),
    }
}

fn drain(mut rx: tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// =============================================================================
// Wire shapes: each event is one self-contained, parsable JSON line
// =============================================================================

#[test]
fn test_progress_line_shape() {
    let line = ndjson_line(&ProgressEvent::Progress {
        current: 1,
        total: 3,
        message: "clause 1 evaluated".into(),
    });

    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);

    let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(v["status"], "progress");
    assert_eq!(v["current"], 1);
    assert_eq!(v["total"], 3);
    assert_eq!(v["message"], "clause 1 evaluated");
}

#[test]
fn test_complete_line_carries_result_rows() {
    let line = ndjson_line(&ProgressEvent::Complete {
        results: vec![ResultRow::from(&sample_result())],
    });

    let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(v["status"], "complete");
    let row = &v["results"][0];
    assert_eq!(row["id"], 2);
    assert!(row["clause"].as_str().unwrap().starts_with("Article 2"));
    assert_eq!(row["is_toxic"], true);
    assert_eq!(row["score"], 8.0);
    assert_eq!(row["outcome"], "success");
    assert!(row["suggestion"].as_str().unwrap().contains("redraft"));
}

#[test]
fn test_error_line_shape() {
    let line = ndjson_line(&ProgressEvent::Error {
        message: "analysis setup failed: no model API key".into(),
    });

    let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(v["status"], "error");
    assert!(v["message"].as_str().unwrap().contains("no model API key"));
}

#[test]
fn test_result_row_maps_every_field() {
    let result = sample_result();
    let row = ResultRow::from(&result);

    assert_eq!(row.id, result.ordinal);
    assert_eq!(row.clause, result.clause_text);
    assert_eq!(row.is_toxic, result.is_toxic);
    assert_eq!(row.score, result.risk_score);
    assert_eq!(row.reason, result.reason);
    assert_eq!(row.context, result.context_used);
    assert_eq!(row.suggestion, result.suggestion);
    assert_eq!(row.outcome, result.outcome);
    assert_eq!(row.error, result.error_detail);
}

// =============================================================================
// Terminal state machine: first of complete/error wins, nothing follows
// =============================================================================

#[test]
fn test_events_after_complete_are_dropped() {
    let (mut emitter, rx) = ProgressEmitter::new();
    emitter.progress(1, 2, "clause 1 evaluated");
    emitter.complete(&[sample_result()]);
    emitter.progress(2, 2, "late progress");
    emitter.error("late error");

    let events = drain(rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ProgressEvent::Progress { .. }));
    assert!(matches!(events[1], ProgressEvent::Complete { .. }));
    assert_eq!(emitter.state(), BatchTerminal::Complete);
}

#[test]
fn test_events_after_error_are_dropped() {
    let (mut emitter, rx) = ProgressEmitter::new();
    emitter.error("backends unreachable");
    emitter.progress(1, 2, "late progress");
    emitter.complete(&[]);

    let events = drain(rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProgressEvent::Error { .. }));
    assert_eq!(emitter.state(), BatchTerminal::Failed);
}

#[test]
fn test_emitter_starts_running() {
    let (emitter, _rx) = ProgressEmitter::new();
    assert_eq!(emitter.state(), BatchTerminal::Running);
}

#[test]
fn test_closed_receiver_is_tolerated() {
    let (mut emitter, rx) = ProgressEmitter::new();
    drop(rx);
    // Sends into a closed channel must be silent no-ops.
    emitter.progress(1, 1, "clause 1 evaluated");
    emitter.complete(&[]);
    assert_eq!(emitter.state(), BatchTerminal::Complete);
}

// =============================================================================
// Line-by-line consumption: a mixed sequence parses independently
// =============================================================================

#[test]
fn test_event_sequence_parses_line_by_line() {
    let (mut emitter, rx) = ProgressEmitter::new();
    emitter.progress(1, 2, "clause 1 evaluated");
    emitter.progress(2, 2, "clause 2 evaluated");
    emitter.complete(&[sample_result()]);

    let body: String = drain(rx).iter().map(ndjson_line).collect();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["status"].is_string());
    }
    let last: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
    assert_eq!(last["status"], "complete");
}
