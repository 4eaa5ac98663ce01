//! The simulation world service - shared store, merge surface, reader.
//!
//! One coarse read-write guard protects the whole aggregate. Producers
//! call the five `update_*` entry points concurrently from their own
//! threads; each entry point resolves whatever it needs from external
//! collaborators first, then holds the write guard only for bounded
//! field copies and list rebuilds. Cross-producer ordering is whatever
//! the guard serializes - the most recently completed merge for a field
//! wins. Readers get a deep copy, never an alias into guarded state.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use thiserror::Error;
use tracing::debug;

use crate::messages::{
    ChassisStatus, LocalizationEstimate, MonitorBatch, PerceptionBatch, PlanningTrajectory,
};
use crate::vehicle::DimensionProvider;
use crate::world::{SimulationWorld, WorldConfig};
use crate::{monitor, obstacles, trajectory, vehicle};

/// Failures on the snapshot read-out path.
///
/// Merge entry points have no error channel: malformed input is absorbed
/// with defaults (see the message types), so only serialization for the
/// publish layer can fail.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize simulation world: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Aggregates producer streams into one render-ready world.
pub struct SimulationWorldService {
    world: RwLock<SimulationWorld>,
    dimensions: Box<dyn DimensionProvider>,
    config: WorldConfig,
}

impl SimulationWorldService {
    /// Creates a service with the default capacity and stride tunables.
    pub fn new(dimensions: Box<dyn DimensionProvider>) -> Self {
        Self::with_config(dimensions, WorldConfig::default())
    }

    pub fn with_config(dimensions: Box<dyn DimensionProvider>, config: WorldConfig) -> Self {
        Self {
            world: RwLock::new(SimulationWorld::new()),
            dimensions,
            config,
        }
    }

    /// Write-locks the world. A producer thread that panicked mid-merge
    /// must not wedge the remaining producers, so poisoning is stripped
    /// rather than propagated.
    fn write(&self) -> RwLockWriteGuard<'_, SimulationWorld> {
        self.world.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges an operator-log batch; see [`monitor::merge_monitor`].
    pub fn update_monitor(&self, batch: &MonitorBatch) {
        let mut world = self.write();
        monitor::merge_monitor(&mut world, batch, self.config.max_monitor_entries);
        world.sources.monitor_sec = batch.timestamp_sec;
        world.sequence_num += 1;
        debug!(
            entries = world.monitor.entries.len(),
            "merged monitor batch"
        );
    }

    /// Merges chassis telemetry into the ego vehicle.
    pub fn update_chassis(&self, chassis: &ChassisStatus) {
        // Resolved outside the guard; the provider is a collaborator and
        // nothing external runs while the world is locked.
        let dims = self.dimensions.dimensions();

        let mut world = self.write();
        vehicle::merge_chassis(&mut world, chassis, dims);
        world.sources.chassis_sec = chassis.timestamp_sec;
        world.sequence_num += 1;
    }

    /// Merges a pose estimate into the ego vehicle.
    pub fn update_localization(&self, localization: &LocalizationEstimate) {
        let mut world = self.write();
        vehicle::merge_localization(&mut world, localization);
        world.sources.localization_sec = localization.timestamp_sec;
        world.sequence_num += 1;
    }

    /// Replaces the rendered trajectory with a downsampling of the given
    /// planned path.
    pub fn update_trajectory(&self, planned: &PlanningTrajectory) {
        let dims = self.dimensions.dimensions();

        let mut world = self.write();
        trajectory::downsample_trajectory(&mut world, planned, self.config.trajectory_stride, dims);
        world.sources.planning_sec = planned.timestamp_sec;
        world.sequence_num += 1;
        debug!(waypoints = world.trajectory.len(), "merged planning update");
    }

    /// Replaces the obstacle list with the given perception batch.
    pub fn update_obstacles(&self, batch: &PerceptionBatch) {
        let mut world = self.write();
        obstacles::ingest_obstacles(&mut world, batch);
        world.sources.perception_sec = batch.timestamp_sec;
        world.sequence_num += 1;
        debug!(count = world.obstacles.len(), "merged perception batch");
    }

    /// Returns a deep copy of the current world.
    ///
    /// The read guard is held only for the clone, so publishers at any
    /// cadence observe an atomic world and never block producers for
    /// longer than one copy.
    pub fn snapshot(&self) -> SimulationWorld {
        self.world
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Serializes the current world for the publish layer.
    pub fn snapshot_json(&self) -> Result<String, SnapshotError> {
        let world = self.snapshot();
        Ok(serde_json::to_string(&world)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{PathPoint, PerceptionObstacle, TurnSignal};
    use crate::vehicle::StaticDimensions;
    use crate::world::{Dimensions, LogEntry, Point2, Shape};
    use std::sync::Arc;
    use std::thread;

    fn service() -> SimulationWorldService {
        SimulationWorldService::new(Box::new(StaticDimensions(Dimensions::new(
            4.933, 2.11, 1.48,
        ))))
    }

    #[test]
    fn test_sequence_number_counts_every_merge() {
        let service = service();
        assert_eq!(service.snapshot().sequence_num, 0);

        service.update_chassis(&ChassisStatus::default());
        service.update_localization(&LocalizationEstimate::default());
        service.update_trajectory(&PlanningTrajectory::default());
        service.update_obstacles(&PerceptionBatch::default());
        service.update_monitor(&MonitorBatch::default());

        assert_eq!(service.snapshot().sequence_num, 5);
    }

    #[test]
    fn test_each_merge_stamps_only_its_own_source() {
        let service = service();
        service.update_chassis(&ChassisStatus {
            timestamp_sec: 10.0,
            ..ChassisStatus::default()
        });
        service.update_obstacles(&PerceptionBatch {
            timestamp_sec: 20.0,
            ..PerceptionBatch::default()
        });

        let sources = service.snapshot().sources;
        assert_eq!(sources.chassis_sec, 10.0);
        assert_eq!(sources.perception_sec, 20.0);
        assert_eq!(sources.localization_sec, 0.0);
        assert_eq!(sources.planning_sec, 0.0);
        assert_eq!(sources.monitor_sec, 0.0);
    }

    #[test]
    fn test_snapshot_is_detached_from_live_world() {
        let service = service();
        let before = service.snapshot();

        service.update_chassis(&ChassisStatus {
            speed_mps: 9.0,
            ..ChassisStatus::default()
        });

        assert!(before.ego.drive.is_none());
        let after = service.snapshot();
        assert_eq!(after.ego.drive.as_ref().unwrap().speed_mps, 9.0);
    }

    #[test]
    fn test_snapshot_json_contains_world_schema() {
        let service = service();
        service.update_chassis(&ChassisStatus {
            speed_mps: 25.0,
            signal: TurnSignal::Right,
            ..ChassisStatus::default()
        });
        service.update_monitor(&MonitorBatch {
            timestamp_sec: 2000.0,
            entries: vec![LogEntry::new("planner online", 2000.0)],
        });

        let json = service.snapshot_json().expect("serializable world");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ego"]["kind"], "EGO_VEHICLE");
        assert_eq!(value["ego"]["drive"]["current_signal"], "RIGHT");
        assert_eq!(value["monitor"]["entries"][0]["message"], "planner online");
    }

    #[test]
    fn test_concurrent_producers_and_readers_keep_world_consistent() {
        let service = Arc::new(service());
        let iterations = 200;

        let chassis = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..iterations {
                    service.update_chassis(&ChassisStatus {
                        timestamp_sec: i as f64,
                        speed_mps: i as f64,
                        signal: TurnSignal::Left,
                        ..ChassisStatus::default()
                    });
                }
            })
        };
        let localization = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..iterations {
                    service.update_localization(&LocalizationEstimate {
                        timestamp_sec: i as f64,
                        position: Point2::new(i as f64, -(i as f64)),
                        heading: 0.1,
                    });
                }
            })
        };
        let planning = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..iterations {
                    service.update_trajectory(&PlanningTrajectory {
                        timestamp_sec: 1.0,
                        points: (0..50)
                            .map(|i| PathPoint {
                                x: i as f64,
                                y: i as f64,
                            })
                            .collect(),
                    });
                }
            })
        };
        let perception = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..iterations {
                    service.update_obstacles(&PerceptionBatch {
                        timestamp_sec: i as f64,
                        obstacles: vec![PerceptionObstacle {
                            id: i as i64,
                            ..PerceptionObstacle::default()
                        }],
                    });
                }
            })
        };
        let monitor = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..iterations {
                    service.update_monitor(&MonitorBatch {
                        timestamp_sec: i as f64,
                        entries: vec![LogEntry::new(format!("tick {i}"), i as f64)],
                    });
                }
            })
        };

        let reader = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..iterations {
                    let world = service.snapshot();
                    assert!(world.monitor.entries.len() <= 30);
                    assert!(world.trajectory.len() <= 6);
                    // Chassis writes drive and shape under one guard, so
                    // a reader never sees one without the other.
                    if let Some(drive) = &world.ego.drive {
                        assert_eq!(drive.current_signal, "LEFT");
                        assert!(matches!(world.ego.shape, Some(Shape::Box(_))));
                    }
                }
            })
        };

        for handle in [chassis, localization, planning, perception, monitor, reader] {
            handle.join().expect("worker panicked");
        }

        let world = service.snapshot();
        assert_eq!(world.sequence_num, 5 * iterations as u64);
        assert_eq!(world.obstacles.len(), 1);
        assert!(world.monitor.entries.len() <= 30);
    }
}
