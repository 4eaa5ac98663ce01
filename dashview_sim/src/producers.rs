//! Simulated producer threads.
//!
//! Each producer plays one upstream module of the driving stack and
//! feeds the service's merge entry points at its own rate, the way the
//! real transport would: chassis and localization at telemetry rate,
//! planning and perception at frame rate, monitor messages irregularly.
//! All randomness is seeded, so a given seed replays the same session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dashview_core::{
    ChassisStatus, LocalizationEstimate, LogEntry, LogLevel, MonitorBatch, ObstacleType,
    PathPoint, PerceptionBatch, PerceptionObstacle, PlanningTrajectory, Point2,
    SimulationWorldService, TurnSignal,
};
use nalgebra::UnitQuaternion;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Radius of the circular test track (meters).
const TRACK_RADIUS: f64 = 80.0;

/// Angular velocity of the ego vehicle around the track (rad/s).
const TRACK_OMEGA: f64 = 0.15;

/// The external orientation-to-heading transform.
///
/// The aggregation core never sees a quaternion; this boundary function
/// collapses one to a planar heading before the localization message is
/// built, mirroring how the pose producer prepares its output.
pub fn quaternion_to_heading(qw: f64, qx: f64, qy: f64, qz: f64) -> f64 {
    let rotation = UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(qw, qx, qy, qz));
    rotation.euler_angles().2
}

/// Pose of the scripted ego vehicle at simulation time `t`.
fn track_pose(t: f64) -> (Point2, f64) {
    let angle = TRACK_OMEGA * t;
    let position = Point2::new(TRACK_RADIUS * angle.cos(), TRACK_RADIUS * angle.sin());
    let yaw = angle + std::f64::consts::FRAC_PI_2;
    (position, yaw)
}

/// Shared handle for one producer thread.
pub struct Producer {
    pub name: &'static str,
    handle: thread::JoinHandle<u64>,
}

impl Producer {
    /// Waits for the producer to drain; returns how many messages it sent.
    pub fn join(self) -> u64 {
        self.handle.join().unwrap_or_default()
    }
}

fn spawn_loop<F>(name: &'static str, period: Duration, stop: Arc<AtomicBool>, mut tick: F) -> Producer
where
    F: FnMut(f64) + Send + 'static,
{
    let handle = thread::spawn(move || {
        let started = Instant::now();
        let mut sent = 0u64;
        while !stop.load(Ordering::Relaxed) {
            tick(started.elapsed().as_secs_f64());
            sent += 1;
            thread::sleep(period);
        }
        debug!(name, sent, "producer drained");
        sent
    });
    Producer { name, handle }
}

/// Chassis telemetry: speed breathing around 12 m/s, turn signal
/// toggling every ten seconds.
pub fn spawn_chassis(
    service: Arc<SimulationWorldService>,
    hz: f64,
    seed: u64,
    stop: Arc<AtomicBool>,
) -> Producer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x11);
    spawn_loop(
        "chassis",
        Duration::from_secs_f64(1.0 / hz),
        stop,
        move |t| {
            let speed = 12.0 + 3.0 * (0.5 * t).sin() + rng.gen_range(-0.2..0.2);
            let throttle = (speed * 4.0).clamp(0.0, 100.0);
            service.update_chassis(&ChassisStatus {
                timestamp_sec: t,
                speed_mps: speed,
                throttle_percentage: throttle,
                brake_percentage: if speed < 10.0 { 15.0 } else { 0.0 },
                steering_percentage: 18.0,
                signal: if (t as u64 / 10) % 2 == 0 {
                    TurnSignal::Left
                } else {
                    TurnSignal::None
                },
            });
        },
    )
}

/// Localization: scripted circular drive, heading routed through the
/// quaternion boundary the way the real pose pipeline does it.
pub fn spawn_localization(
    service: Arc<SimulationWorldService>,
    hz: f64,
    seed: u64,
    stop: Arc<AtomicBool>,
) -> Producer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x22);
    spawn_loop(
        "localization",
        Duration::from_secs_f64(1.0 / hz),
        stop,
        move |t| {
            let (position, yaw) = track_pose(t);
            let orientation = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw);
            let quat = orientation.quaternion();
            let heading = quaternion_to_heading(quat.w, quat.i, quat.j, quat.k);
            service.update_localization(&LocalizationEstimate {
                timestamp_sec: t,
                position: Point2::new(
                    position.x + rng.gen_range(-0.05..0.05),
                    position.y + rng.gen_range(-0.05..0.05),
                ),
                heading,
            });
        },
    )
}

/// Planning: a dense path of points ahead of the ego along the track.
pub fn spawn_planning(
    service: Arc<SimulationWorldService>,
    hz: f64,
    stop: Arc<AtomicBool>,
) -> Producer {
    spawn_loop(
        "planning",
        Duration::from_secs_f64(1.0 / hz),
        stop,
        move |t| {
            let horizon = 60;
            let step = 0.25;
            let points: Vec<PathPoint> = (0..horizon)
                .map(|i| {
                    let (p, _) = track_pose(t + i as f64 * step);
                    PathPoint { x: p.x, y: p.y }
                })
                .collect();
            service.update_trajectory(&PlanningTrajectory {
                timestamp_sec: t,
                points,
            });
        },
    )
}

/// Perception: a fixed cast of obstacles around the track, alternating
/// polygon and box representations.
pub fn spawn_perception(
    service: Arc<SimulationWorldService>,
    hz: f64,
    seed: u64,
    stop: Arc<AtomicBool>,
) -> Producer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x33);
    spawn_loop(
        "perception",
        Duration::from_secs_f64(1.0 / hz),
        stop,
        move |t| {
            let mut obstacles = Vec::new();

            // A parked vehicle and a pedestrian as oriented boxes.
            obstacles.push(PerceptionObstacle {
                id: 101,
                timestamp_sec: t,
                obstacle_type: ObstacleType::Vehicle,
                position: Point2::new(TRACK_RADIUS + 6.0, 0.0),
                theta: std::f64::consts::FRAC_PI_2,
                length: 4.6,
                width: 1.9,
                height: 1.5,
                ..PerceptionObstacle::default()
            });
            obstacles.push(PerceptionObstacle {
                id: 102,
                timestamp_sec: t,
                obstacle_type: ObstacleType::Pedestrian,
                position: Point2::new(
                    -TRACK_RADIUS + rng.gen_range(-1.0..1.0),
                    10.0 + 0.8 * t % 20.0,
                ),
                theta: 0.0,
                length: 0.5,
                width: 0.5,
                height: 1.8,
                ..PerceptionObstacle::default()
            });

            // A construction zone as an explicit boundary polygon.
            let cx = 0.0;
            let cy = TRACK_RADIUS + 8.0;
            obstacles.push(PerceptionObstacle {
                id: 103,
                timestamp_sec: t,
                obstacle_type: ObstacleType::UnknownUnmovable,
                polygon: vec![
                    Point2::new(cx - 3.0, cy - 2.0),
                    Point2::new(cx + 3.0, cy - 2.0),
                    Point2::new(cx + 3.0, cy + 2.0),
                    Point2::new(cx - 3.0, cy + 2.0),
                ],
                ..PerceptionObstacle::default()
            });

            service.update_obstacles(&PerceptionBatch {
                timestamp_sec: t,
                obstacles,
            });
        },
    )
}

/// Monitor log: irregular operator-facing messages, occasionally bursty
/// enough to exercise eviction.
pub fn spawn_monitor(
    service: Arc<SimulationWorldService>,
    seed: u64,
    stop: Arc<AtomicBool>,
) -> Producer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x44);
    spawn_loop(
        "monitor",
        Duration::from_millis(700),
        stop,
        move |t| {
            let burst = if rng.gen_bool(0.1) { 5 } else { 1 };
            let entries: Vec<LogEntry> = (0..burst)
                .map(|i| {
                    let mut entry = LogEntry::new(
                        format!("status check {} at t={t:.1}s", i + 1),
                        t,
                    );
                    entry.level = Some(if rng.gen_bool(0.15) {
                        LogLevel::Warn
                    } else {
                        LogLevel::Info
                    });
                    entry
                })
                .collect();
            service.update_monitor(&MonitorBatch {
                timestamp_sec: t,
                entries,
            });
        },
    )
}
