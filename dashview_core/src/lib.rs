//! Dashview Core - Real-Time Simulation World Aggregation
//!
//! This library merges asynchronous telemetry from an autonomous-driving
//! stack into one bounded, render-ready snapshot for dashboard backends:
//! 1. **Bounded state**: obstacle lists, dense trajectories, and log
//!    streams collapse into fixed-size, wire-friendly structures
//! 2. **Field-level merging**: chassis and localization streams share
//!    one ego entity without clobbering each other
//! 3. **Consistent reads**: a coarse guard gives publishers an
//!    atomic-looking world at any cadence

pub mod messages;
pub mod monitor;
pub mod obstacles;
pub mod service;
pub mod trajectory;
pub mod vehicle;
pub mod world;

// Re-export key types for convenience
pub use messages::{
    ChassisStatus, LocalizationEstimate, MonitorBatch, ObstacleType, PathPoint, PerceptionBatch,
    PerceptionObstacle, PlanningTrajectory, TurnSignal,
};
pub use service::{SimulationWorldService, SnapshotError};
pub use vehicle::{DimensionProvider, StaticDimensions};
pub use world::{
    Dimensions, DriveState, Entity, EntityKind, LogEntry, LogLevel, MonitorLog, Point2, Shape,
    SimulationWorld, SourceStamps, WorldConfig,
};
