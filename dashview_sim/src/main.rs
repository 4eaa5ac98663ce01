//! Dashview producer-simulation CLI.
//!
//! Drives the aggregation core the way a live stack would: one thread
//! per producer at realistic rates, plus a publisher thread standing in
//! for the websocket transport. Useful for eyeballing merge behavior
//! under load and for profiling guard contention.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use dashview_core::{Dimensions, SimulationWorldService, StaticDimensions, WorldConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod producers;
mod publish;

#[derive(Parser, Debug)]
#[command(name = "dashview-sim", about = "Producer simulation for the Dashview core")]
struct Args {
    /// Master seed; a given seed replays the same session.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// How long to run, in seconds.
    #[arg(long, default_value_t = 10.0)]
    duration_secs: f64,

    /// Chassis/localization rate (Hz).
    #[arg(long, default_value_t = 100.0)]
    telemetry_hz: f64,

    /// Planning/perception rate (Hz).
    #[arg(long, default_value_t = 10.0)]
    frame_hz: f64,

    /// Publish cadence (Hz).
    #[arg(long, default_value_t = 10.0)]
    publish_hz: f64,

    /// Monitor log capacity.
    #[arg(long, default_value_t = 30)]
    max_monitor_entries: usize,
}

fn main() {
    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(?args, "starting producer simulation");

    let service = Arc::new(SimulationWorldService::with_config(
        Box::new(StaticDimensions(Dimensions::new(4.933, 2.11, 1.48))),
        WorldConfig {
            max_monitor_entries: args.max_monitor_entries,
            ..WorldConfig::default()
        },
    ));
    let stop = Arc::new(AtomicBool::new(false));

    let producers = vec![
        producers::spawn_chassis(
            Arc::clone(&service),
            args.telemetry_hz,
            args.seed,
            Arc::clone(&stop),
        ),
        producers::spawn_localization(
            Arc::clone(&service),
            args.telemetry_hz,
            args.seed,
            Arc::clone(&stop),
        ),
        producers::spawn_planning(Arc::clone(&service), args.frame_hz, Arc::clone(&stop)),
        producers::spawn_perception(
            Arc::clone(&service),
            args.frame_hz,
            args.seed,
            Arc::clone(&stop),
        ),
        producers::spawn_monitor(Arc::clone(&service), args.seed, Arc::clone(&stop)),
    ];

    // Publisher runs on its own thread so the main thread owns the clock.
    let publisher = {
        let service = Arc::clone(&service);
        let stop = Arc::clone(&stop);
        let hz = args.publish_hz;
        thread::spawn(move || publish::run_publisher(&service, hz, &stop))
    };

    thread::sleep(Duration::from_secs_f64(args.duration_secs));

    // Let in-flight merges finish; nothing is torn down mid-merge.
    stop.store(true, Ordering::Relaxed);
    for producer in producers {
        let name = producer.name;
        let sent = producer.join();
        info!(name, sent, "producer stopped");
    }
    let stats = publisher.join().expect("publisher panicked");

    let world = service.snapshot();
    info!(
        frames = stats.frames,
        bytes = stats.bytes,
        final_seq = world.sequence_num,
        obstacles = world.obstacles.len(),
        waypoints = world.trajectory.len(),
        log_entries = world.monitor.entries.len(),
        "simulation complete"
    );
}
