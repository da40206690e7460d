//! Fan command implementation
//!
//! Takes over the configured fan, holds a fixed level for a while and hands
//! the fan back.

use crate::cli::args::{FanArgs, OutputFormat};
use crate::cli::output::{print_output, Message};
use crate::config::{Config, FanConfig};
use crate::domain::Level;
use crate::error::{AppError, Result};
use crate::services::Bindings;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest stretch between checks of the shutdown flag
const SIGNAL_POLL: Duration = Duration::from_millis(100);

/// Execute the fan command
pub fn run_fan(args: &FanArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let fan = config.fan.as_ref().ok_or(AppError::NoFan)?;
    let duration = Duration::from_secs(args.duration);

    if config.general.dry_run {
        let message = format!(
            "[DRY RUN] Would hold {} at '{}' for {}s",
            fan_path(fan),
            args.level,
            args.duration
        );
        return print_output(
            &Message {
                message,
                success: true,
            },
            format,
        )
        .map_err(AppError::from);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut bindings = Bindings::from_config(config)?;

    let result = hold_level(
        &mut bindings,
        &args.level,
        duration,
        config.general.sleeptime(),
        &running,
    );
    let restored = bindings.shutdown();

    if let Err(e) = result {
        if let Err(restore_err) = restored {
            log::error!("{}", restore_err);
        }
        return Err(e);
    }
    restored?;

    let message = format!(
        "Held {} at '{}' for {}s and restored it",
        fan_path(fan),
        args.level,
        args.duration
    );
    print_output(
        &Message {
            message,
            success: true,
        },
        format,
    )?;
    Ok(())
}

/// Set `level` and keep it alive for `duration`, pinging every `sleeptime`.
///
/// Returns early once `running` is cleared; the caller restores the fan.
fn hold_level(
    bindings: &mut Bindings,
    level: &Level,
    duration: Duration,
    sleeptime: Duration,
    running: &AtomicBool,
) -> Result<()> {
    bindings.init_fan()?;
    bindings.set_speed(level)?;

    let start = Instant::now();
    let deadline = start + duration;
    let mut next_ping = start + sleeptime;
    loop {
        if !running.load(Ordering::SeqCst) {
            log::info!("Interrupted, restoring fan");
            break;
        }

        let now = Instant::now();
        if now >= next_ping {
            if !bindings.sensors().is_empty() {
                let temps = bindings.read_temps()?;
                if let Some(max) = temps.max() {
                    log::debug!("Max temperature: {}", max);
                }
            }
            bindings.ping_watchdog_and_depulse(level)?;
            next_ping = now + sleeptime;
        }
        if now >= deadline {
            break;
        }

        let wake = deadline.min(next_ping);
        thread::sleep(wake.saturating_duration_since(now).min(SIGNAL_POLL));
    }

    Ok(())
}

fn fan_path(fan: &FanConfig) -> String {
    match fan {
        FanConfig::TpAcpi { path } | FanConfig::Hwmon { path } => path.display().to_string(),
    }
}
