pub mod json_api;
pub mod wire;

pub use json_api::{
    evaluate_frame_json, evaluate_frame_json_with, evaluate_frames_json, evaluate_frames_json_with,
    input_schema_json, parse_frame, parse_frames,
};
pub use wire::{error_codes, FrameOutputRecord, FrameRecord};
