//! sphere-fit daemon
//!
//! Receives point clouds over TCP, fits a sphere to the latest one at a fixed
//! rate and publishes the smoothed estimate over UDP.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (or ./sphere-fit.toml if present)
//! sphere-fit
//!
//! # Custom config file
//! sphere-fit --config /etc/sphere-fit.toml
//!
//! # Command line overrides
//! sphere-fit --bind 0.0.0.0:6000 --target 192.168.1.20:6001 --tick-rate 30
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;

use sphere_fit::config::Config;
use sphere_fit::error::Result;
use sphere_fit::threads::spawn_node;
use sphere_fit::utils::signal::setup_ctrl_c_handler;

const DEFAULT_CONFIG_PATH: &str = "sphere-fit.toml";

#[derive(Debug, Parser)]
#[command(name = "sphere-fit", version, about = "Sphere fitting daemon for 3D point clouds")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fit loop frequency in Hz, within [0.01, 1000]
    #[arg(long)]
    tick_rate: Option<f64>,

    /// TCP bind address for incoming point clouds
    #[arg(long)]
    bind: Option<String>,

    /// UDP target for filtered sphere estimates
    #[arg(long)]
    target: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)?,
        None => Config::default(),
    };

    if let Some(rate) = args.tick_rate {
        config.fit.tick_rate_hz = rate;
    }
    if let Some(bind) = &args.bind {
        config.input.bind_address = bind.clone();
    }
    if let Some(target) = &args.target {
        config.output.target_address = target.clone();
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    })
    .init();

    log::info!("sphere-fit v{} starting", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => log::info!("  Config: {}", path.display()),
        None => log::info!("  Config: {} or built-in defaults", DEFAULT_CONFIG_PATH),
    }
    log::info!("  Rate: {:.1} Hz", config.fit.tick_rate_hz);
    log::info!(
        "  Gains: point={} radius={}",
        config.filter.point_gain,
        config.filter.radius_gain
    );
    log::info!(
        "  Output: {}{}",
        config.output.target_address,
        if config.output.publish_raw {
            format!(" (raw -> {})", config.output.raw_target_address)
        } else {
            String::new()
        }
    );

    let running = setup_ctrl_c_handler()?;
    let handles = spawn_node(&config, running.clone())?;
    log::info!(
        "Listening for point clouds on {}. Press Ctrl-C to stop.",
        handles.input_addr
    );

    while running.load(Ordering::Relaxed) {
        if handles.any_finished() {
            log::warn!("A worker thread exited unexpectedly");
            running.store(false, Ordering::Relaxed);
            break;
        }
        std::thread::sleep(Duration::from_millis(200));
    }

    log::info!("Shutting down...");
    if handles.receiver.join().is_err() {
        log::error!("Receiver thread panicked");
    }
    match handles.fit.join() {
        Ok(pipeline) => {
            let state = pipeline.filter_state();
            log::info!(
                "Final estimate: center=({:.4}, {:.4}, {:.4}) r={:.4}",
                state.x,
                state.y,
                state.z,
                state.radius
            );
        }
        Err(_) => log::error!("Fit thread panicked"),
    }

    log::info!("sphere-fit stopped");
    Ok(())
}
