//! Inbound producer messages.
//!
//! These are the wire-facing shapes the transport layer deserializes and
//! hands to the service's merge entry points. Fields the producer omitted
//! arrive as zero values; enum labels the core does not know collapse to
//! their `Unknown`/`None` defaults at the serde boundary instead of
//! failing the message.

use serde::{Deserialize, Serialize};

use crate::world::{LogEntry, Point2};

/// Turn-signal state reported by the chassis.
///
/// Deserialization goes through an explicit label table so producer
/// revisions that add signal states degrade to `None` instead of
/// rejecting the whole chassis message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum TurnSignal {
    #[default]
    None,
    Left,
    Right,
    Emergency,
}

impl From<String> for TurnSignal {
    fn from(label: String) -> Self {
        match label.as_str() {
            "LEFT" => TurnSignal::Left,
            "RIGHT" => TurnSignal::Right,
            "EMERGENCY" => TurnSignal::Emergency,
            _ => TurnSignal::None,
        }
    }
}

/// Chassis telemetry (drive-by-wire feedback), ~100 Hz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisStatus {
    /// Header timestamp (seconds).
    pub timestamp_sec: f64,

    pub speed_mps: f64,

    pub throttle_percentage: f64,

    pub brake_percentage: f64,

    pub steering_percentage: f64,

    pub signal: TurnSignal,
}

/// Pose estimate, ~100 Hz.
///
/// `heading` arrives already computed: the caller applies the external
/// quaternion-to-heading transform to the raw orientation before this
/// message reaches the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationEstimate {
    /// Header timestamp (seconds).
    pub timestamp_sec: f64,

    pub position: Point2,

    /// Heading in radians, world frame.
    pub heading: f64,
}

/// One point of a planned path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// A planned trajectory from the planning module, ~10 Hz. Planners emit
/// tens to hundreds of near-collinear points; the core thins them before
/// they reach a wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningTrajectory {
    /// Header timestamp (seconds).
    pub timestamp_sec: f64,

    pub points: Vec<PathPoint>,
}

/// Object classification reported by perception.
///
/// Same label-table policy as [`TurnSignal`]: anything unmapped becomes
/// `Unknown`, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum ObstacleType {
    #[default]
    Unknown,
    UnknownMovable,
    UnknownUnmovable,
    Pedestrian,
    Bicycle,
    Vehicle,
}

impl From<String> for ObstacleType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "UNKNOWN_MOVABLE" => ObstacleType::UnknownMovable,
            "UNKNOWN_UNMOVABLE" => ObstacleType::UnknownUnmovable,
            "PEDESTRIAN" => ObstacleType::Pedestrian,
            "BICYCLE" => ObstacleType::Bicycle,
            "VEHICLE" => ObstacleType::Vehicle,
            _ => ObstacleType::Unknown,
        }
    }
}

/// One perceived obstacle.
///
/// Exactly one of the two shape representations carries real data: a
/// non-empty `polygon`, or the position/theta/dimension fields. The
/// ingestor enforces the split; the message keeps the flat wire layout
/// producers actually emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionObstacle {
    pub id: i64,

    /// Capture timestamp for this obstacle (seconds).
    pub timestamp_sec: f64,

    pub obstacle_type: ObstacleType,

    /// Center position (box representation).
    pub position: Point2,

    /// Heading in radians (box representation).
    pub theta: f64,

    pub length: f64,

    pub width: f64,

    pub height: f64,

    /// Explicit boundary points; non-empty selects the polygon
    /// representation.
    pub polygon: Vec<Point2>,
}

/// A full perception frame, ~10 Hz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionBatch {
    /// Header timestamp (seconds).
    pub timestamp_sec: f64,

    pub obstacles: Vec<PerceptionObstacle>,
}

/// A batch of operator-facing log messages, irregular cadence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorBatch {
    /// Header timestamp (seconds).
    pub timestamp_sec: f64,

    pub entries: Vec<LogEntry>,
}
