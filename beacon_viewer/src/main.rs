//! Beacon Viewer CLI
//!
//! Replays a newline-delimited beacon telemetry feed: a fixed-period
//! playback driver parses records and publishes samples into a
//! latest-sample cell; an independent render loop reads that cell at the
//! frame cadence and updates the console readout (and, with the
//! `visualization` feature, a Rerun scene). Playback loops forever until
//! Ctrl-C.

mod scene;

use anyhow::Context;
use beacon_core::{
    CartesianConvention, PlaybackConfig, PlaybackDriver, PlaybackState, TelemetrySample,
};
use beacon_env::TokioContext;
use clap::Parser;
use scene::SceneState;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Beacon telemetry playback viewer
#[derive(Parser, Debug)]
#[command(name = "beacon-viewer")]
#[command(about = "Replay a satellite beacon telemetry feed", long_about = None)]
struct Args {
    /// Path to the newline-delimited telemetry feed
    #[arg(default_value = "beacon_viewer/data/beacon_sim.txt")]
    data: String,

    /// Playback tick period in milliseconds
    #[arg(short, long, default_value = "1000")]
    period_ms: u64,

    /// Sphere radius for the Cartesian conversion, in kilometres
    #[arg(long, default_value = "6371")]
    radius_km: f64,

    /// Spherical-to-Cartesian arrangement (lat-first, lon-first)
    #[arg(long, default_value = "lat-first")]
    convention: String,

    /// Camera distance; also bounds the position clamp box
    #[arg(long, default_value = "1000")]
    camera_distance: f64,

    /// Render cadence in milliseconds
    #[arg(long, default_value = "33")]
    frame_period_ms: u64,

    /// Verbose output (shows skipped records)
    #[arg(short, long)]
    verbose: bool,

    /// Emit delivered samples as JSON lines instead of the readout
    #[arg(long)]
    json: bool,

    /// Spawn the Rerun viewer and stream the scene to it
    #[cfg(feature = "visualization")]
    #[arg(long)]
    spawn_viewer: bool,

    /// Save the Rerun recording to a file instead of spawning the viewer
    #[cfg(feature = "visualization")]
    #[arg(long)]
    save: Option<String>,

    /// Number of decorative starfield points (0 disables)
    #[cfg(feature = "visualization")]
    #[arg(long, default_value = "400")]
    stars: usize,
}

#[cfg(feature = "visualization")]
fn build_visualizer(
    args: &Args,
    radius_km: f64,
) -> anyhow::Result<Option<beacon_core::visualization::RerunVisualizer>> {
    use beacon_core::visualization::RerunVisualizer;

    let visualizer = if let Some(path) = &args.save {
        Some(RerunVisualizer::new_to_file("beacon-viewer", path).map_err(|e| {
            anyhow::anyhow!("failed to open Rerun recording at {}: {}", path, e)
        })?)
    } else if args.spawn_viewer {
        Some(
            RerunVisualizer::new("beacon-viewer")
                .map_err(|e| anyhow::anyhow!("failed to spawn Rerun viewer: {}", e))?,
        )
    } else {
        None
    };

    if let Some(vis) = &visualizer {
        vis.log_earth(radius_km)
            .map_err(|e| anyhow::anyhow!("failed to log earth sphere: {}", e))?;
        if args.stars > 0 {
            vis.log_star_field(args.stars, radius_km)
                .map_err(|e| anyhow::anyhow!("failed to log starfield: {}", e))?;
        }
    }

    Ok(visualizer)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let convention: CartesianConvention = args.convention.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("Available conventions: lat-first, lon-first");
        std::process::exit(1);
    });

    let raw = std::fs::read_to_string(&args.data)
        .with_context(|| format!("failed to read feed file {}", args.data))?;
    let state = PlaybackState::from_text(&raw);
    if state.is_empty() {
        warn!("Feed {} contains no records; playback will idle", args.data);
    } else {
        info!("Loaded {} records from {}", state.len(), args.data);
    }

    let config = PlaybackConfig {
        tick_period: Duration::from_millis(args.period_ms.max(1)),
        sphere_radius_km: args.radius_km,
        convention,
    };

    #[cfg(feature = "visualization")]
    let visualizer = build_visualizer(&args, args.radius_km)?;

    // The single latest-sample cell: the driver callback writes, the
    // render loop reads. No queueing of missed samples.
    let (latest_tx, mut latest_rx) = watch::channel::<Option<TelemetrySample>>(None);

    let ctx = TokioContext::shared();
    let json = args.json;
    let handle = PlaybackDriver::spawn(ctx, state, config, move |tick| match tick.sample {
        Ok(sample) => {
            debug!("tick {}: message {}", tick.index, sample.message_id);
            if json {
                match serde_json::to_string(&sample) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("failed to serialize sample: {}", e),
                }
            }
            let _ = latest_tx.send(Some(sample));
        }
        Err(err) => {
            // Recoverable: the record is dropped, playback continues
            debug!("tick {}: unparsable record skipped: {}", tick.index, err);
        }
    });

    info!(
        "Playback running (period {} ms); press Ctrl-C to stop",
        args.period_ms
    );

    let mut scene = SceneState::new(args.camera_distance);
    let frame_period = Duration::from_millis(args.frame_period_ms.max(1));
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            _ = tokio::time::sleep(frame_period) => {
                frames += 1;
                if !latest_rx.has_changed().unwrap_or(false) {
                    continue;
                }
                let latest = latest_rx.borrow_and_update().clone();
                if let Some(sample) = latest {
                    scene.apply_sample(&sample);
                    if !json {
                        info!(
                            "Message {} @ {} | pos=[{:.1}, {:.1}, {:.1}] | rot=[{:.3}, {:.3}, {:.3}] rad",
                            sample.message_id,
                            sample.timestamp,
                            scene.model.position.x,
                            scene.model.position.y,
                            scene.model.position.z,
                            scene.model.rotation_rad.x,
                            scene.model.rotation_rad.y,
                            scene.model.rotation_rad.z,
                        );
                    }
                    #[cfg(feature = "visualization")]
                    if let Some(vis) = &visualizer {
                        if let Err(e) = vis.log_beacon(&sample) {
                            tracing::error!("Rerun logging failed: {}", e);
                        }
                    }
                }
            }
        }
    }

    handle.stop();
    info!("Playback stopped after {} frames", frames);

    Ok(())
}
