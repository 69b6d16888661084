//! Pitch dimensions (FIFA standard, meters)
//!
//! Origin at a corner flag; x runs along the length, y across the width.

pub mod field {
    /// Field length in meters
    pub const LENGTH_M: f32 = 105.0;
    /// Field width in meters
    pub const WIDTH_M: f32 = 68.0;
    /// Center X coordinate (meters)
    pub const CENTER_X: f32 = LENGTH_M * 0.5;
    /// Center Y coordinate (meters)
    pub const CENTER_Y: f32 = WIDTH_M * 0.5;
    /// Half of the pitch width, the largest lateral offset from the center line
    pub const HALF_WIDTH_M: f32 = WIDTH_M * 0.5;
    /// Penalty area length from goal line
    pub const PENALTY_AREA_LENGTH_M: f32 = 16.5;
    /// Penalty area half-width (40.32m / 2)
    pub const PENALTY_AREA_HALF_WIDTH_M: f32 = 20.16;
    /// Goal area half-width (18.32m / 2)
    pub const GOAL_AREA_HALF_WIDTH_M: f32 = 9.16;
    /// Length of one third of the pitch
    pub const THIRD_LENGTH_M: f32 = LENGTH_M / 3.0;
}

pub mod goal {
    use super::field;

    /// Goal width in meters (FIFA standard)
    pub const WIDTH_M: f32 = 7.32;
    /// Goal half-width (for Y range calculation)
    pub const HALF_WIDTH_M: f32 = 3.66;
    /// Goal Y-axis minimum (CENTER_Y - HALF_WIDTH)
    pub const Y_MIN: f32 = field::CENTER_Y - HALF_WIDTH_M;
    /// Goal Y-axis maximum (CENTER_Y + HALF_WIDTH)
    pub const Y_MAX: f32 = field::CENTER_Y + HALF_WIDTH_M;
}

pub mod zones {
    /// Shots are only generated within this distance of the attacked goal mouth
    pub const SHOOTING_ZONE_MAX_DIST_M: f32 = 25.0;
    /// ...and within this lateral offset of the goal center line
    pub const SHOOTING_ZONE_HALF_WIDTH_M: f32 = super::field::PENALTY_AREA_HALF_WIDTH_M;
}
