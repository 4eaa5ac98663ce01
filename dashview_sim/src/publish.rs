//! Stand-in for the external publish/transport layer.
//!
//! Ticks at the configured cadence, pulls an immutable snapshot, and
//! serializes it exactly like the real websocket pusher would - the
//! serialized frames only get logged here instead of transmitted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::tick;
use dashview_core::SimulationWorldService;
use tracing::{info, warn};

/// Summary of a finished publish session.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishStats {
    pub frames: u64,
    pub bytes: u64,
}

/// Runs the publish loop until `stop` flips; returns session statistics.
pub fn run_publisher(
    service: &SimulationWorldService,
    hz: f64,
    stop: &Arc<AtomicBool>,
) -> PublishStats {
    let ticker = tick(Duration::from_secs_f64(1.0 / hz));
    let mut stats = PublishStats::default();

    while !stop.load(Ordering::Relaxed) {
        if ticker.recv().is_err() {
            break;
        }
        match service.snapshot_json() {
            Ok(frame) => {
                stats.frames += 1;
                stats.bytes += frame.len() as u64;
                if stats.frames % (hz as u64).max(1) == 0 {
                    let world = service.snapshot();
                    info!(
                        seq = world.sequence_num,
                        obstacles = world.obstacles.len(),
                        waypoints = world.trajectory.len(),
                        log_entries = world.monitor.entries.len(),
                        frame_bytes = frame.len(),
                        "published frame"
                    );
                }
            }
            Err(err) => warn!(%err, "skipping unserializable frame"),
        }
    }

    stats
}
