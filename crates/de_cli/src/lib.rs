//! Decision engine CLI library
//!
//! Reads tracking frames as JSON lines, evaluates them in batch and writes one output
//! record per frame. Lines that do not parse are skipped with a warning so one corrupt
//! record does not sink a whole match file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use de_core::analysis::{
    assess_decision, extract_key_moments, review_decisions, ActualAction, DecisionQuality, DecisionReview,
    KeyMoments, MatchSummary,
};
use de_core::api::{parse_frame, parse_frames};
use de_core::{DecisionEngine, EngineConfig, Frame, FrameOutputRecord, FrameReport, StaticPriors};

/// Frames read from an input file
#[derive(Debug, Default)]
pub struct FrameInput {
    pub frames: Vec<Frame>,
    /// 1-based line numbers that failed to parse
    pub skipped_lines: Vec<usize>,
}

/// Parse JSON-lines frames, or a single JSON array when the file starts with `[`.
pub fn read_frames(path: &Path) -> Result<FrameInput> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read frames: {}", path.display()))?;

    if text.trim_start().starts_with('[') {
        let frames = parse_frames(&text)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to parse frame array: {}", path.display()))?;
        return Ok(FrameInput { frames, skipped_lines: Vec::new() });
    }

    let mut input = FrameInput::default();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_frame(line) {
            Ok(frame) => input.frames.push(frame),
            Err(e) => {
                warn!(line = i + 1, "skipping unparsable frame: {e}");
                input.skipped_lines.push(i + 1);
            }
        }
    }
    info!(frames = input.frames.len(), skipped = input.skipped_lines.len(), "frames loaded");
    Ok(input)
}

/// Config file wins over profile; neither means `DE_CONFIG_PROFILE` or balanced.
pub fn load_config(profile: Option<&str>, config_path: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = config_path {
        return EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()));
    }
    match profile {
        Some(name) => Ok(EngineConfig::from_profile(name)?),
        None => Ok(EngineConfig::from_env_or_default()),
    }
}

pub fn build_engine(
    profile: Option<&str>,
    config_path: Option<&Path>,
    priors_path: Option<&Path>,
) -> Result<DecisionEngine> {
    let engine = DecisionEngine::new(load_config(profile, config_path)?)?;
    let Some(path) = priors_path else {
        return Ok(engine);
    };
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read priors: {}", path.display()))?;
    let priors = StaticPriors::from_json(&json).with_context(|| format!("Failed to parse priors: {}", path.display()))?;
    info!(players = priors.len(), "priors loaded");
    Ok(engine.with_priors(Arc::new(priors)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EvaluateStats {
    pub frames: usize,
    pub evaluated: usize,
    pub rejected: usize,
    pub skipped_lines: usize,
}

/// Evaluate every frame and write one JSON line per frame, in input order.
pub fn evaluate_to_writer<W: Write>(engine: &DecisionEngine, input: &FrameInput, out: W) -> Result<EvaluateStats> {
    let reports = engine.evaluate_batch(&input.frames);
    let mut out = BufWriter::new(out);
    for report in &reports {
        serde_json::to_writer(&mut out, &FrameOutputRecord::from(report)).context("Failed to write report")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let rejected = reports.iter().filter(|r| r.is_rejected()).count();
    Ok(EvaluateStats {
        frames: reports.len(),
        evaluated: reports.len() - rejected,
        rejected,
        skipped_lines: input.skipped_lines.len(),
    })
}

pub fn evaluate_file(engine: &DecisionEngine, input_path: &Path, output_path: Option<&Path>) -> Result<EvaluateStats> {
    let input = read_frames(input_path)?;
    let stats = match output_path {
        Some(path) => {
            let file = fs::File::create(path).with_context(|| format!("Failed to create output: {}", path.display()))?;
            evaluate_to_writer(engine, &input, file)?
        }
        None => evaluate_to_writer(engine, &input, std::io::stdout().lock())?,
    };
    info!(evaluated = stats.evaluated, rejected = stats.rejected, "evaluation finished");
    Ok(stats)
}

/// One actual action per line.
pub fn read_actions(path: &Path) -> Result<Vec<ActualAction>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read actions: {}", path.display()))?;
    let mut actions = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ActualAction>(line) {
            Ok(action) => actions.push(action),
            Err(e) => warn!(line = i + 1, "skipping unparsable action: {e}"),
        }
    }
    Ok(actions)
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub summary: MatchSummary,
    pub skipped_lines: usize,
    pub decision_review: Option<DecisionReview>,
    pub key_moments: KeyMoments,
}

/// Grade each action against the evaluation of its frame. Actions whose frame was not
/// evaluated are dropped.
pub fn assess_actions(reports: &[FrameReport], actions: &[ActualAction]) -> Vec<DecisionQuality> {
    let by_frame: BTreeMap<u64, &FrameReport> = reports.iter().map(|r| (r.frame_index(), r)).collect();
    actions
        .iter()
        .filter_map(|action| {
            let evaluation = by_frame.get(&action.frame_index)?.evaluation()?;
            Some(assess_decision(evaluation, action))
        })
        .collect()
}

pub fn summarize(
    engine: &DecisionEngine,
    input_path: &Path,
    actions_path: Option<&Path>,
    top_n: usize,
) -> Result<MatchReport> {
    let input = read_frames(input_path)?;
    let reports = engine.evaluate_batch(&input.frames);

    let decisions = match actions_path {
        Some(path) => assess_actions(&reports, &read_actions(path)?),
        None => Vec::new(),
    };

    Ok(MatchReport {
        summary: MatchSummary::from_reports(&reports),
        skipped_lines: input.skipped_lines.len(),
        decision_review: actions_path.map(|_| review_decisions(&decisions)),
        key_moments: extract_key_moments(&reports, &decisions, top_n),
    })
}
