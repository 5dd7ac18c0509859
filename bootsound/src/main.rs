//! Boot Sound Player (bootsound) - Main entry point
//!
//! Stands in for the host module loader: loads configuration, installs the
//! shell-init hook, starts the boot sound worker and waits for it.
//!
//! The hook fires on SIGUSR1 (unix) or immediately with `--immediate`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bootsound::audio::CpalAudioOut;
use bootsound::boot::{self, on_shell_init, BootOutcome, ShellReadyFlag};
use bootsound::config::{BootConfig, ConfigOverrides};
use bootsound_common::config::{default_config_path, TomlConfig};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for bootsound
#[derive(Parser, Debug)]
#[command(name = "bootsound")]
#[command(about = "Plays a WAV file once the system shell is up")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "BOOTSOUND_CONFIG")]
    config: Option<PathBuf>,

    /// WAV file to play (overrides BOOTSOUND_WAV and the config file)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Log level (overrides the config file; RUST_LOG overrides both)
    #[arg(long, env = "BOOTSOUND_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output device name (default device if omitted or not found)
    #[arg(long)]
    device: Option<String>,

    /// Treat the shell as ready at startup instead of waiting for the hook
    #[arg(long)]
    immediate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => TomlConfig::load(path).context("Failed to load configuration")?,
        None => TomlConfig::default(),
    };

    // Initialize tracing
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("bootsound={level},bootsound_common={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting bootsound v{} (build {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_ID")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => warn!("No config directory on this platform, using defaults"),
    }

    let config = BootConfig::from_toml(
        &toml_config,
        ConfigOverrides {
            wav_path: args.file.clone(),
        },
    )
    .context("Invalid configuration")?;

    let ready = ShellReadyFlag::new();

    // Readiness hook: the host's shell-init event
    #[cfg(unix)]
    {
        let mut hook = signal::unix::signal(signal::unix::SignalKind::user_defined1())
            .context("Failed to install SIGUSR1 hook")?;
        let hook_flag = ready.clone();
        tokio::spawn(async move {
            while hook.recv().await.is_some() {
                on_shell_init(&hook_flag);
            }
        });
        info!("Shell init hook installed (SIGUSR1)");
    }

    if args.immediate {
        on_shell_init(&ready);
    }

    let device = args.device.clone();
    let worker = boot::spawn(config, ready, move || CpalAudioOut::new(device.as_deref()))
        .context("Failed to start bootsound worker")?;
    info!("{} started", boot::WORKER_THREAD_NAME);

    let finished = tokio::task::spawn_blocking(move || worker.join());

    tokio::select! {
        joined = finished => {
            match joined {
                Ok(Ok(BootOutcome::Played(summary))) => info!(
                    "Boot sound finished: {} block(s), {} samples",
                    summary.blocks, summary.samples_submitted
                ),
                Ok(Ok(BootOutcome::Failed)) => info!("Boot sound finished without playing"),
                Ok(Err(_)) => error!("{} panicked", boot::WORKER_THREAD_NAME),
                Err(e) => error!("Failed to join {}: {}", boot::WORKER_THREAD_NAME, e),
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
