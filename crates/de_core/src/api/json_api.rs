//! JSON entry points
//!
//! Every function returns `Result<String, String>`; the error string is `CODE: message`.
//! A frame that parses but fails validation is not an API error: it comes back as a
//! `"status": "rejected"` record.

use schemars::schema_for;
use serde::Serialize;
use tracing::{debug, warn};

use super::wire::{error_codes, FrameOutputRecord, FrameRecord};
use crate::engine::evaluator::DecisionEngine;
use crate::engine::frame::Frame;

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| err_code(error_codes::SERIALIZATION_FAILED, e))
}

/// Parse one frame record.
pub fn parse_frame(frame_json: &str) -> Result<Frame, String> {
    let record: FrameRecord =
        serde_json::from_str(frame_json).map_err(|e| err_code(error_codes::INVALID_JSON, e))?;
    Ok(Frame::from(record))
}

/// Parse either a JSON array of frame records or JSON lines (one record per line,
/// blank lines ignored).
pub fn parse_frames(frames_json: &str) -> Result<Vec<Frame>, String> {
    let trimmed = frames_json.trim_start();
    if trimmed.starts_with('[') {
        let records: Vec<FrameRecord> =
            serde_json::from_str(trimmed).map_err(|e| err_code(error_codes::INVALID_JSON, e))?;
        return Ok(records.into_iter().map(Frame::from).collect());
    }

    let mut frames = Vec::new();
    for (line_no, line) in frames_json.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let frame = parse_frame(line).map_err(|e| format!("{e} (line {})", line_no + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Evaluate one frame with the active configuration.
pub fn evaluate_frame_json(frame_json: &str) -> Result<String, String> {
    evaluate_frame_json_with(&DecisionEngine::from_active_config(), frame_json)
}

pub fn evaluate_frame_json_with(engine: &DecisionEngine, frame_json: &str) -> Result<String, String> {
    let frame = parse_frame(frame_json).inspect_err(|e| warn!("frame request rejected: {e}"))?;
    let report = engine.report(&frame);
    debug!(frame = frame.index, rejected = report.is_rejected(), "frame evaluated");
    to_json(&FrameOutputRecord::from(&report))
}

/// Evaluate a batch (array or JSON lines) with the active configuration. Output is a JSON
/// array in input order.
pub fn evaluate_frames_json(frames_json: &str) -> Result<String, String> {
    evaluate_frames_json_with(&DecisionEngine::from_active_config(), frames_json)
}

pub fn evaluate_frames_json_with(engine: &DecisionEngine, frames_json: &str) -> Result<String, String> {
    let frames = parse_frames(frames_json)?;
    let outputs: Vec<FrameOutputRecord> =
        engine.evaluate_batch(&frames).iter().map(FrameOutputRecord::from).collect();
    to_json(&outputs)
}

/// JSON Schema of the input frame record.
pub fn input_schema_json() -> Result<String, String> {
    let schema = schema_for!(FrameRecord);
    serde_json::to_string_pretty(&schema).map_err(|e| err_code(error_codes::SERIALIZATION_FAILED, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use serde_json::Value;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(EngineConfig::default()).unwrap()
    }

    fn frame_json(index: u64, with_ball: bool) -> String {
        let ball = if with_ball {
            r#"{"x_m": 70.5, "y_m": 34.0, "possessor_track_id": 9}"#
        } else {
            "null"
        };
        format!(
            r#"{{"frame_index": {index}, "timestamp_seconds": {ts}, "players": [
                {{"track_id": 9, "team": "A", "role": "field", "x_m": 70.0, "y_m": 34.0, "vx_mps": 4.0, "vy_mps": 0.0}},
                {{"track_id": 7, "team": "A", "role": "field", "x_m": 75.0, "y_m": 15.0, "vx_mps": 0.0, "vy_mps": 0.0}},
                {{"track_id": 10, "team": "A", "role": "field", "x_m": 80.0, "y_m": 50.0, "vx_mps": 0.0, "vy_mps": 0.0}},
                {{"track_id": 2, "team": "B", "role": "field", "x_m": 85.0, "y_m": 20.0, "vx_mps": 0.0, "vy_mps": 0.0}},
                {{"track_id": 3, "team": "B", "role": "field", "x_m": 86.0, "y_m": 34.0, "vx_mps": 0.0, "vy_mps": 0.0}},
                {{"track_id": 4, "team": "B", "role": "field", "x_m": 85.0, "y_m": 48.0, "vx_mps": 0.0, "vy_mps": 0.0}},
                {{"track_id": 6, "team": "B", "role": "field", "x_m": 60.0, "y_m": 30.0, "vx_mps": 0.0, "vy_mps": 0.0}},
                {{"track_id": 1, "team": "B", "role": "goalkeeper", "x_m": 103.0, "y_m": 34.0, "vx_mps": 0.0, "vy_mps": 0.0}}
            ], "ball": {ball}}}"#,
            ts = index as f64 * 0.04,
        )
    }

    #[test]
    fn test_evaluate_frame_json() {
        let out = evaluate_frame_json_with(&engine(), &frame_json(1, true)).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "evaluated");
        assert_eq!(v["possession_team"], "A");
        assert_eq!(v["ball_carrier_track_id"], 9);
        assert_eq!(v["eliminations"].as_array().unwrap().len(), 4);
        let score = v["game_state"]["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
        let actions = v["actions"].as_array().unwrap();
        assert!(!actions.is_empty());
        assert!(actions[0].get("target_x").is_some());
        assert!(actions.iter().all(|a| ["red", "yellow", "green"].contains(&a["target_zone"].as_str().unwrap())));
        assert_eq!(actions.iter().filter(|a| a["is_safe_default"] == true).count(), 1);
    }

    #[test]
    fn test_byte_identical_output() {
        let engine = engine();
        let input = frame_json(5, true);
        let first = evaluate_frame_json_with(&engine, &input).unwrap();
        let second = evaluate_frame_json_with(&engine, &input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_ball_is_a_rejected_record() {
        let out = evaluate_frame_json_with(&engine(), &frame_json(3, false)).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "rejected");
        assert_eq!(v["frame_index"], 3);
        assert_eq!(v["error"]["code"], "MALFORMED_FRAME");
    }

    #[test]
    fn test_invalid_json_is_an_api_error() {
        let err = evaluate_frame_json_with(&engine(), "{not json").unwrap_err();
        assert!(err.starts_with("INVALID_JSON:"), "{err}");
        let err = evaluate_frame_json_with(&engine(), r#"{"frame_index": 1}"#).unwrap_err();
        assert!(err.starts_with("INVALID_JSON:"), "{err}");
    }

    #[test]
    fn test_active_config_entry_point() {
        let out = evaluate_frame_json(&frame_json(2, true)).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "evaluated");
    }

    #[test]
    fn test_batch_array_and_lines_agree() {
        let frames = [frame_json(0, true), frame_json(1, false), frame_json(2, true)];
        let compact: Vec<String> =
            frames.iter().map(|f| serde_json::to_string(&serde_json::from_str::<Value>(f).unwrap()).unwrap()).collect();
        let array = format!("[{}]", compact.join(","));
        let lines = format!("{}\n", compact.join("\n\n"));

        let engine = engine();
        let from_array = evaluate_frames_json_with(&engine, &array).unwrap();
        let from_lines = evaluate_frames_json_with(&engine, &lines).unwrap();
        assert_eq!(from_array, from_lines);

        let v: Value = serde_json::from_str(&from_array).unwrap();
        let statuses: Vec<&str> = v.as_array().unwrap().iter().map(|r| r["status"].as_str().unwrap()).collect();
        assert_eq!(statuses, ["evaluated", "rejected", "evaluated"]);
        assert!(evaluate_frames_json(&array).is_ok());
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let first = serde_json::from_str::<Value>(&frame_json(0, true)).unwrap();
        let input = format!("{first}\nnot json\n");
        let err = parse_frames(&input).unwrap_err();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn test_input_schema() {
        let schema = input_schema_json().unwrap();
        let v: Value = serde_json::from_str(&schema).unwrap();
        let props = v["properties"].as_object().unwrap();
        for field in ["frame_index", "timestamp_seconds", "players", "ball", "team_a_attacks_right"] {
            assert!(props.contains_key(field), "missing {field}");
        }
        let required: Vec<&str> = v["required"].as_array().unwrap().iter().filter_map(|r| r.as_str()).collect();
        assert!(required.contains(&"players"));
        assert!(!required.contains(&"ball"));
    }
}
