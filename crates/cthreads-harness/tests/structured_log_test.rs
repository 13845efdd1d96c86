//! Integration test: harness JSONL logs.
//!
//! Run: cargo test -p cthreads-harness --test structured_log_test

use cthreads_core::ThreadError;
use cthreads_harness::structured_log::{
    LogEmitter, LogEntry, LogLevel, Outcome, Primitive, validate_log_file, validate_log_line,
};

#[test]
fn emitter_writes_valid_jsonl() {
    let dir = std::env::temp_dir().join(format!("cthreads_log_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let log_path = dir.join("run.jsonl");

    {
        let mut emitter = LogEmitter::to_file(&log_path, "run-integ").unwrap();
        emitter.emit(LogLevel::Info, "suite_start").unwrap();
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Error, "property_result")
                    .with_property(Primitive::Semaphore, "semaphore_count")
                    .with_outcome(Outcome::Error)
                    .with_error(ThreadError::WaitFailed(4))
                    .with_duration_ms(12),
            )
            .unwrap();
        emitter.emit(LogLevel::Info, "suite_end").unwrap();
        emitter.flush().unwrap();
    }

    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 3);
    assert!(errors.is_empty(), "emitter output should validate: {errors:?}");

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[0]["trace_id"], "run-integ::0001");
    assert_eq!(lines[1]["trace_id"], "run-integ::0002");
    assert_eq!(lines[1]["error_kind"], "wait_failed");
    assert_eq!(lines[1]["code"], 4);
    assert_eq!(lines[2]["trace_id"], "run-integ::0003");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn minimal_line_validates() {
    let line = r#"{"timestamp":"2026-01-01T00:00:00.000Z","trace_id":"r::0001","level":"debug","event":"x"}"#;
    let entry = validate_log_line(line, 1).unwrap();
    assert_eq!(entry.level, LogLevel::Debug);
    assert!(entry.outcome.is_none());
}

#[test]
fn missing_required_fields_are_each_reported() {
    let errors = validate_log_line(r#"{"level":"info"}"#, 7).unwrap_err();
    for field in ["timestamp", "trace_id", "event"] {
        assert!(
            errors.iter().any(|e| e.field == field),
            "missing {field} not reported"
        );
    }
    assert!(errors[0].to_string().starts_with("line 7:"));
}

#[test]
fn non_object_and_garbage_are_rejected() {
    let errors = validate_log_line("[1,2,3]", 1).unwrap_err();
    assert_eq!(errors[0].field, "<root>");
    let errors = validate_log_line("{not json", 2).unwrap_err();
    assert_eq!(errors[0].field, "<json>");
}

#[test]
fn blank_trace_id_and_unknown_primitive_are_rejected() {
    let line = r#"{"timestamp":"t","trace_id":"  ","level":"info","event":"e","primitive":"spinlock","property":"p"}"#;
    let errors = validate_log_line(line, 1).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "trace_id"));
    assert!(errors.iter().any(|e| e.field == "primitive"));
}

#[test]
fn buffer_emitter_output_is_readable() {
    let (mut emitter, buffer) = LogEmitter::to_buffer("buf");
    emitter.emit(LogLevel::Warn, "slow_property").unwrap();
    let contents = buffer.contents();
    let line = contents.lines().next().unwrap();
    let entry = validate_log_line(line, 1).unwrap();
    assert_eq!(entry.trace_id, "buf::0001");
    assert_eq!(entry.event, "slow_property");
}
