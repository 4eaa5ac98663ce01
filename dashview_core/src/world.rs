//! The simulation world - the render-ready aggregate pushed to dashboards.
//!
//! One `SimulationWorld` lives per service instance. Producer-specific
//! mergers fold incoming telemetry into it in place; the publish layer
//! serializes read-only copies of it at its own cadence. Everything here
//! is plain data with a stable serde schema.

use serde::{Deserialize, Serialize};

/// A 2D point in the world frame (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Static bounding-box dimensions of a vehicle or obstacle (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }
}

/// Classification of a renderable entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    #[default]
    Unknown,
    UnknownMovable,
    UnknownUnmovable,
    Pedestrian,
    Bicycle,
    Vehicle,
    EgoVehicle,
    Waypoint,
}

/// Spatial extent of an entity.
///
/// Perception reports an obstacle either as an explicit boundary polygon
/// or as an oriented box, never both. Modeling the two as variants makes
/// the exclusivity impossible to violate downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Boundary points copied verbatim from the producer (world frame).
    Polygon(Vec<Point2>),
    /// Box dimensions; position/heading live on the entity itself.
    Box(Dimensions),
}

/// Ego-only dynamic driving state, owned entirely by the chassis merger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveState {
    /// Forward speed in m/s.
    pub speed_mps: f64,

    /// Throttle pedal position, 0-100.
    pub throttle_percentage: f64,

    /// Brake pedal position, 0-100.
    pub brake_percentage: f64,

    /// Steering position, -100..100.
    pub steering_percentage: f64,

    /// Display label for the active turn signal ("LEFT", "RIGHT",
    /// "EMERGENCY" or "NONE").
    pub current_signal: String,
}

/// A renderable object in the snapshot: the ego vehicle, a perceived
/// obstacle, or a planned-trajectory waypoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier; decimal form of the producer's numeric id for
    /// obstacles, empty for waypoints.
    pub id: String,

    pub kind: EntityKind,

    /// Position in the world frame (meters).
    pub position: Point2,

    /// Heading in radians, world frame.
    pub heading: f64,

    /// Spatial extent; `None` until a producer has supplied one.
    pub shape: Option<Shape>,

    /// Dynamic driving state; populated for the ego vehicle only.
    pub drive: Option<DriveState>,

    /// Producer timestamp of the data backing this entity (seconds).
    pub timestamp_sec: f64,
}

/// Severity of an operator-facing log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Fatal,
}

/// One operator-facing status message.
///
/// Entries enter the world only through batch merges and leave only by
/// capacity eviction; they are never edited or deleted individually.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub message: String,

    pub timestamp_sec: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, timestamp_sec: f64) -> Self {
        Self {
            message: message.into(),
            timestamp_sec,
            level: None,
        }
    }
}

/// Bounded, newest-first operator log. Index 0 is the most recent entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorLog {
    /// Header timestamp of the batch that last touched the log.
    pub timestamp_sec: f64,

    pub entries: Vec<LogEntry>,
}

/// Last-seen header timestamp per producer stream.
///
/// The viewer subtracts these from its own clock to display per-module
/// staleness; the core itself never reads a wall clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStamps {
    pub chassis_sec: f64,
    pub localization_sec: f64,
    pub planning_sec: f64,
    pub perception_sec: f64,
    pub monitor_sec: f64,
}

/// The aggregate world state: everything a dashboard frame needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationWorld {
    /// Monotonically increasing count of merges applied to this world.
    pub sequence_num: u64,

    /// Header timestamp (seconds), set unconditionally by the monitor
    /// log merge.
    pub timestamp_sec: f64,

    /// The autonomous vehicle being monitored.
    pub ego: Entity,

    /// Obstacles from the most recent perception batch, in ingestion
    /// order. Replaced wholesale on every batch; no history retained.
    pub obstacles: Vec<Entity>,

    /// Downsampled planned trajectory, in path order.
    pub trajectory: Vec<Entity>,

    /// Bounded operator log, newest first.
    pub monitor: MonitorLog,

    /// Per-producer freshness stamps.
    pub sources: SourceStamps,
}

impl SimulationWorld {
    /// Creates an empty world with the ego entity pre-registered.
    pub fn new() -> Self {
        Self {
            ego: Entity {
                id: "ego".to_string(),
                kind: EntityKind::EgoVehicle,
                ..Entity::default()
            },
            ..Self::default()
        }
    }
}

/// Tunables for the aggregation core.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Maximum retained monitor-log entries.
    pub max_monitor_entries: usize,

    /// Index stride used to thin dense planned paths into waypoints.
    pub trajectory_stride: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_monitor_entries: 30,
            trajectory_stride: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_registers_ego() {
        let world = SimulationWorld::new();
        assert_eq!(world.ego.id, "ego");
        assert_eq!(world.ego.kind, EntityKind::EgoVehicle);
        assert!(world.ego.shape.is_none());
        assert!(world.ego.drive.is_none());
        assert!(world.obstacles.is_empty());
        assert!(world.trajectory.is_empty());
        assert!(world.monitor.entries.is_empty());
    }

    #[test]
    fn test_shape_serde_is_tagged() {
        let polygon = Shape::Polygon(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        let json = serde_json::to_string(&polygon).unwrap();
        assert!(json.contains("polygon"));

        let boxed = Shape::Box(Dimensions::new(4.0, 2.0, 1.5));
        let json = serde_json::to_string(&boxed).unwrap();
        assert!(json.contains("box"));

        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, boxed);
    }

    #[test]
    fn test_entity_kind_wire_names() {
        let json = serde_json::to_string(&EntityKind::UnknownMovable).unwrap();
        assert_eq!(json, "\"UNKNOWN_MOVABLE\"");
        let json = serde_json::to_string(&EntityKind::EgoVehicle).unwrap();
        assert_eq!(json, "\"EGO_VEHICLE\"");
    }

    #[test]
    fn test_default_config_matches_reference_limits() {
        let config = WorldConfig::default();
        assert_eq!(config.max_monitor_entries, 30);
        assert_eq!(config.trajectory_stride, 10);
    }
}
