//! # Defensive Structure
//!
//! Groups the defending field players into lines by depth, finds uncovered regions
//! between neighbouring coverage zones, and measures the block.
//!
//! Depth is always measured from the defended goal line.

use serde::Serialize;
use std::cmp::Ordering;

use super::config::{BlockHeightThresholds, StructureConfig};
use super::coverage::Covered;
use super::frame::TrackId;
use super::geometry::{clamp_to_pitch, depth_from_attacked_goal, team_view, Vec2};
use super::physics_constants::field;
use super::zone_value::zone_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockHeight {
    Low,
    Mid,
    High,
}

/// Ties go to the lower (more defensive) block.
pub fn classify_block(line_height_m: f32, thresholds: &BlockHeightThresholds) -> BlockHeight {
    if line_height_m <= thresholds.low_max_m {
        BlockHeight::Low
    } else if line_height_m <= thresholds.mid_max_m {
        BlockHeight::Mid
    } else {
        BlockHeight::High
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Between two neighbours of the same line
    WithinLine,
    /// Between the two deepest lines
    BetweenLines,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gap {
    pub centroid: Vec2,
    pub size_m: f32,
    /// `None`: not closing at current velocities
    pub time_to_close_s: Option<f32>,
    pub exploitable: bool,
    pub kind: GapKind,
    /// Bounding defenders, right to left as the attackers see it
    pub between: Option<(TrackId, TrackId)>,
    /// Zone value at the centroid for the attacking team
    pub zone_value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefensiveStructure {
    /// Mean depth of the deepest line
    pub line_height_m: f32,
    /// Mean pairwise distance among defending field players
    pub compactness_m: f32,
    /// Lateral spread
    pub width_m: f32,
    /// Depth spread
    pub depth_m: f32,
    pub line_count: usize,
    pub block: BlockHeight,
    /// Track ids per line, deepest first
    pub lines: Vec<Vec<TrackId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureAnalysis {
    pub structure: DefensiveStructure,
    /// Most dangerous first
    pub gaps: Vec<Gap>,
}

impl StructureAnalysis {
    pub fn exploitable_gaps(&self) -> impl Iterator<Item = &Gap> {
        self.gaps.iter().filter(|g| g.exploitable)
    }
}

/// One defensive line, deepest member first.
struct Line<'c, 'e> {
    members: Vec<&'c Covered<'e>>,
    mean_depth: f32,
}

pub struct GapDetector<'a> {
    config: &'a StructureConfig,
}

impl<'a> GapDetector<'a> {
    pub fn new(config: &'a StructureConfig) -> Self {
        Self { config }
    }

    /// `defenders` is the whole defending team (goalkeeper included); only field
    /// players form lines, but every zone counts when checking coverage.
    pub fn analyze(&self, defenders: &[Covered<'_>], ball: Vec2, attacks_right: bool) -> StructureAnalysis {
        let field_players: Vec<&Covered<'_>> = defenders.iter().filter(|d| d.is_field_player()).collect();
        let lines = self.defensive_lines(&field_players, attacks_right);

        let mut gaps = Vec::new();
        for line in &lines {
            gaps.extend(self.within_line_gaps(&line.members, defenders, ball, attacks_right));
        }
        gaps.extend(self.between_lines_gaps(&lines, defenders, ball, attacks_right));
        gaps.sort_by(compare_gaps);

        StructureAnalysis { structure: self.measure(&field_players, &lines, attacks_right), gaps }
    }

    /// Split by depth wherever consecutive depths jump by more than `line_separation_m`.
    fn defensive_lines<'c, 'e>(&self, players: &[&'c Covered<'e>], attacks_right: bool) -> Vec<Line<'c, 'e>> {
        let mut sorted: Vec<(f32, &'c Covered<'e>)> =
            players.iter().map(|p| (depth_from_attacked_goal(p.position(), attacks_right), *p)).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.track_id().cmp(&b.1.track_id())));

        let mut lines: Vec<Line<'c, 'e>> = Vec::new();
        let mut current: Vec<(f32, &'c Covered<'e>)> = Vec::new();
        for entry in sorted {
            if let Some(last) = current.last() {
                if entry.0 - last.0 > self.config.line_separation_m {
                    lines.push(Line::from_entries(std::mem::take(&mut current)));
                }
            }
            current.push(entry);
        }
        if !current.is_empty() {
            lines.push(Line::from_entries(current));
        }
        lines
    }

    fn within_line_gaps(
        &self,
        line: &[&Covered<'_>],
        defenders: &[Covered<'_>],
        ball: Vec2,
        attacks_right: bool,
    ) -> Vec<Gap> {
        let h = self.config.gap_horizon_s;
        let mut members: Vec<&Covered<'_>> = line.to_vec();
        let lateral = |c: &Covered<'_>| team_view(c.position(), attacks_right).y;
        members.sort_by(|a, b| lateral(a).total_cmp(&lateral(b)).then(a.track_id().cmp(&b.track_id())));

        let mut gaps = Vec::new();
        for pair in members.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let offset = b.position() - a.position();
            let Some(dir) = offset.normalized() else { continue };
            let (ra, rb) = (a.zone.radius_at(h), b.zone.radius_at(h));
            let size = offset.length() - ra - rb;
            if size <= 0.0 {
                continue;
            }

            let centroid = a.position() + dir * (ra + size * 0.5);
            let covered_elsewhere = defenders
                .iter()
                .filter(|d| d.track_id() != a.track_id() && d.track_id() != b.track_id())
                .any(|d| d.zone.covers(centroid, h));
            if covered_elsewhere {
                continue;
            }

            // Faster neighbour's velocity component toward the other
            let closing = a.entity.velocity.dot(dir).max(b.entity.velocity.dot(-dir));
            let time_to_close = (closing > self.config.min_closing_speed_mps).then(|| size / closing);

            gaps.push(self.gap(
                centroid,
                size,
                time_to_close,
                GapKind::WithinLine,
                Some((a.track_id(), b.track_id())),
                ball,
                attacks_right,
            ));
        }
        gaps
    }

    /// Probe the mid-depth between the two deepest lines when they are far apart.
    fn between_lines_gaps(
        &self,
        lines: &[Line<'_, '_>],
        defenders: &[Covered<'_>],
        ball: Vec2,
        attacks_right: bool,
    ) -> Vec<Gap> {
        let [back, next, ..] = lines else {
            return Vec::new();
        };
        if next.mean_depth - back.mean_depth <= self.config.between_lines_min_m {
            return Vec::new();
        }

        let h = self.config.gap_horizon_s;
        let mid_depth = (back.mean_depth + next.mean_depth) * 0.5;

        let mut gaps = Vec::new();
        for &offset in &self.config.between_lines_probe_offsets_m {
            // Offsets are lateral from the attacking team's point of view
            let probe_view = Vec2::new(field::LENGTH_M - mid_depth, field::CENTER_Y + offset);
            let probe = clamp_to_pitch(team_view(probe_view, attacks_right));
            let clearance = defenders
                .iter()
                .map(|d| -d.zone.slack(probe, h))
                .min_by(|a, b| a.total_cmp(b))
                .unwrap_or(f32::INFINITY);
            if clearance <= 0.0 || !clearance.is_finite() {
                continue;
            }
            let time_to_close = defenders
                .iter()
                .map(|d| d.zone.time_to_reach(probe))
                .filter(|t| t.is_finite())
                .min_by(|a, b| a.total_cmp(b));

            gaps.push(self.gap(probe, 2.0 * clearance, time_to_close, GapKind::BetweenLines, None, ball, attacks_right));
        }
        gaps
    }

    fn gap(
        &self,
        centroid: Vec2,
        size_m: f32,
        time_to_close_s: Option<f32>,
        kind: GapKind,
        between: Option<(TrackId, TrackId)>,
        ball: Vec2,
        attacks_right: bool,
    ) -> Gap {
        let transit_s = ball.distance(centroid) / self.config.reference_ball_speed_mps;
        let exploitable =
            size_m > self.config.gap_min_size_m && time_to_close_s.map_or(true, |t| t > transit_s);
        Gap {
            centroid,
            size_m,
            time_to_close_s,
            exploitable,
            kind,
            between,
            zone_value: zone_value(centroid, attacks_right),
        }
    }

    fn measure(&self, players: &[&Covered<'_>], lines: &[Line<'_, '_>], attacks_right: bool) -> DefensiveStructure {
        let line_height_m = lines.first().map(|l| l.mean_depth).unwrap_or(0.0);

        let mut pair_sum = 0.0;
        let mut pairs = 0usize;
        for (i, a) in players.iter().enumerate() {
            for b in &players[i + 1..] {
                pair_sum += a.position().distance(b.position());
                pairs += 1;
            }
        }
        let compactness_m = if pairs > 0 { pair_sum / pairs as f32 } else { 0.0 };

        let spread = |values: Vec<f32>| -> f32 {
            let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            if values.is_empty() {
                0.0
            } else {
                max - min
            }
        };
        let width_m = spread(players.iter().map(|p| p.position().y).collect());
        let depth_m =
            spread(players.iter().map(|p| depth_from_attacked_goal(p.position(), attacks_right)).collect());

        DefensiveStructure {
            line_height_m,
            compactness_m,
            width_m,
            depth_m,
            line_count: lines.len(),
            block: classify_block(line_height_m, &self.config.block_height_thresholds_m),
            lines: lines.iter().map(|l| l.members.iter().map(|m| m.track_id()).collect()).collect(),
        }
    }
}

impl<'c, 'e> Line<'c, 'e> {
    fn from_entries(entries: Vec<(f32, &'c Covered<'e>)>) -> Self {
        let mean_depth = entries.iter().map(|e| e.0).sum::<f32>() / entries.len().max(1) as f32;
        Self { members: entries.into_iter().map(|e| e.1).collect(), mean_depth }
    }
}

/// Zone value descending, then size descending, then position for a total order.
fn compare_gaps(a: &Gap, b: &Gap) -> Ordering {
    b.zone_value
        .total_cmp(&a.zone_value)
        .then(b.size_m.total_cmp(&a.size_m))
        .then(a.centroid.x.total_cmp(&b.centroid.x))
        .then(a.centroid.y.total_cmp(&b.centroid.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PhysicalConfig;
    use crate::engine::coverage::CoverageModel;
    use crate::engine::frame::{Entity, Team};
    use crate::engine::priors::NoPriors;

    fn analyze_with(
        defenders: &[Entity],
        physical: &PhysicalConfig,
        ball: Vec2,
    ) -> StructureAnalysis {
        let covered = CoverageModel::new(physical).cover(defenders, &NoPriors);
        let config = StructureConfig::default();
        GapDetector::new(&config).analyze(&covered, ball, true)
    }

    fn analyze(defenders: &[Entity], ball: Vec2) -> StructureAnalysis {
        analyze_with(defenders, &PhysicalConfig::default(), ball)
    }

    #[test]
    fn test_small_gap_not_exploitable() {
        // Two defenders 18m apart, 8m reach each at 2s: 2m gap
        let physical = PhysicalConfig { reaction_time_s: 0.0, ..PhysicalConfig::default() };
        let defenders = [
            Entity::field(2, Team::B, 40.0, 25.0).with_max_speed(4.0),
            Entity::field(3, Team::B, 40.0, 43.0).with_max_speed(4.0),
        ];
        let analysis = analyze_with(&defenders, &physical, Vec2::new(20.0, 34.0));
        assert_eq!(analysis.gaps.len(), 1);
        let gap = &analysis.gaps[0];
        assert!((gap.size_m - 2.0).abs() < 1e-4);
        assert!(!gap.exploitable);
        assert_eq!(gap.between, Some((TrackId(2), TrackId(3))));
        assert!((gap.centroid.y - 34.0).abs() < 1e-4);
    }

    #[test]
    fn test_wide_static_gap_exploitable() {
        let physical = PhysicalConfig { reaction_time_s: 0.0, ..PhysicalConfig::default() };
        let defenders = [
            Entity::field(2, Team::B, 40.0, 14.0).with_max_speed(4.0),
            Entity::field(3, Team::B, 40.0, 54.0).with_max_speed(4.0),
        ];
        let analysis = analyze_with(&defenders, &physical, Vec2::new(20.0, 34.0));
        let gap = &analysis.gaps[0];
        assert!((gap.size_m - 24.0).abs() < 1e-4);
        assert_eq!(gap.time_to_close_s, None);
        assert!(gap.exploitable);
        assert_eq!(gap.kind, GapKind::WithinLine);
    }

    #[test]
    fn test_centroid_covered_by_third_defender() {
        let physical = PhysicalConfig { reaction_time_s: 0.0, ..PhysicalConfig::default() };
        let defenders = [
            Entity::field(2, Team::B, 40.0, 14.0).with_max_speed(4.0),
            Entity::field(3, Team::B, 40.0, 54.0).with_max_speed(4.0),
            Entity::field(4, Team::B, 45.0, 34.0).with_max_speed(4.0),
        ];
        let analysis = analyze_with(&defenders, &physical, Vec2::new(20.0, 34.0));
        // Line is now 2-4-3 laterally; both gaps are real but the old centroid is covered
        assert!(analysis.gaps.iter().all(|g| (g.centroid - Vec2::new(40.0, 34.0)).length() > 1.0));
    }

    #[test]
    fn test_closing_gap_against_distant_ball() {
        // Left defender closing at 10 m/s: size 31.1m, closes in 3.11s
        let moving = [
            Entity::field(2, Team::B, 95.0, 4.0).with_velocity(0.0, 10.0),
            Entity::field(3, Team::B, 95.0, 64.0),
        ];
        let ball = Vec2::new(40.0, 36.55);
        let analysis = analyze(&moving, ball);
        let gap = &analysis.gaps[0];
        assert!((gap.size_m - 31.1).abs() < 1e-3);
        let ttc = gap.time_to_close_s.unwrap();
        assert!((ttc - 3.11).abs() < 1e-3);
        // Ball needs 55m / 15 m/s = 3.67s to get there
        assert!(!gap.exploitable);

        let still = [Entity::field(2, Team::B, 95.0, 4.0), Entity::field(3, Team::B, 95.0, 64.0)];
        let analysis = analyze(&still, ball);
        assert_eq!(analysis.gaps[0].time_to_close_s, None);
        assert!(analysis.gaps[0].exploitable);
    }

    #[test]
    fn test_lines_and_between_lines_gaps() {
        let defenders = [
            Entity::field(2, Team::B, 90.0, 10.0),
            Entity::field(3, Team::B, 90.0, 58.0),
            Entity::field(6, Team::B, 65.0, 10.0),
            Entity::field(8, Team::B, 65.0, 58.0),
            Entity::goalkeeper(1, Team::B, 103.0, 34.0),
        ];
        let analysis = analyze(&defenders, Vec2::new(40.0, 34.0));
        let s = &analysis.structure;
        assert_eq!(s.line_count, 2);
        assert_eq!(s.lines[0], vec![TrackId(2), TrackId(3)]);
        assert!((s.line_height_m - 15.0).abs() < 1e-4);
        assert_eq!(s.block, BlockHeight::Low);
        assert!((s.width_m - 48.0).abs() < 1e-4);
        assert!((s.depth_m - 25.0).abs() < 1e-4);

        let between: Vec<&Gap> = analysis.gaps.iter().filter(|g| g.kind == GapKind::BetweenLines).collect();
        assert_eq!(between.len(), 3);
        let central = between.iter().find(|g| (g.centroid.y - 34.0).abs() < 1e-4).unwrap();
        assert!((central.centroid.x - 77.5).abs() < 1e-4);
        // Goalkeeper is the nearest zone: 25.5m away, reach 11.9m
        assert!((central.size_m - 2.0 * (25.5 - 11.9)).abs() < 1e-3);
        assert!(central.between.is_none());
    }

    #[test]
    fn test_gaps_sorted_by_danger() {
        let defenders = [
            Entity::field(2, Team::B, 90.0, 10.0),
            Entity::field(3, Team::B, 90.0, 58.0),
            Entity::field(6, Team::B, 65.0, 10.0),
            Entity::field(8, Team::B, 65.0, 58.0),
        ];
        let analysis = analyze(&defenders, Vec2::new(40.0, 34.0));
        assert!(analysis.gaps.windows(2).all(|w| w[0].zone_value >= w[1].zone_value));
        assert!(analysis.exploitable_gaps().count() > 0);
    }

    #[test]
    fn test_block_classification_ties_go_lower() {
        let thresholds = BlockHeightThresholds::default();
        assert_eq!(classify_block(30.0, &thresholds), BlockHeight::Low);
        assert_eq!(classify_block(30.01, &thresholds), BlockHeight::Mid);
        assert_eq!(classify_block(45.0, &thresholds), BlockHeight::Mid);
        assert_eq!(classify_block(45.5, &thresholds), BlockHeight::High);
    }

    #[test]
    fn test_goalkeeper_only_structure() {
        let defenders = [Entity::goalkeeper(1, Team::B, 103.0, 34.0)];
        let analysis = analyze(&defenders, Vec2::new(40.0, 34.0));
        assert_eq!(analysis.structure.line_count, 0);
        assert_eq!(analysis.structure.compactness_m, 0.0);
        assert_eq!(analysis.structure.block, BlockHeight::Low);
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_compactness_is_mean_pairwise_distance() {
        let defenders = [
            Entity::field(2, Team::B, 80.0, 30.0),
            Entity::field(3, Team::B, 80.0, 40.0),
            Entity::field(4, Team::B, 80.0, 50.0),
        ];
        let analysis = analyze(&defenders, Vec2::new(40.0, 34.0));
        // (10 + 20 + 10) / 3
        assert!((analysis.structure.compactness_m - 40.0 / 3.0).abs() < 1e-4);
    }
}
