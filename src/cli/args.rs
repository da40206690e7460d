//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::domain::Level;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Fan and temperature sensor control
///
/// Reads temperatures from hwmon, thinkpad_acpi, S.M.A.R.T. and NVML sensors
/// and drives thinkpad_acpi or hwmon PWM fans.
#[derive(Parser, Debug)]
#[command(name = "fanctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FANCTL_CONFIG")]
    pub config: Option<String>,

    /// Dry run mode - don't write to any fan
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Polling period in seconds
    #[arg(short, long, global = true, value_name = "SECONDS")]
    pub sleeptime: Option<u64>,

    /// Disengage the fan briefly before every write (thinkpad_acpi only)
    #[arg(
        short = 'p',
        long,
        global = true,
        value_name = "SECONDS",
        num_args = 0..=1,
        default_missing_value = "0.5"
    )]
    pub depulse: Option<f32>,

    /// Don't wake up sleeping disks to read their temperature
    #[arg(short, long, global = true)]
    pub dnd_disk: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flags only override the configuration file when given
    pub fn flag(value: bool) -> Option<bool> {
        value.then_some(true)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read all configured sensors once
    Sensors,

    /// Run the configured fan at a fixed level, then restore it
    Fan(FanArgs),

    /// Validate the configuration and open all bindings
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the fan command
#[derive(Parser, Debug)]
pub struct FanArgs {
    /// Level to set: a number (0-7 for thinkpad_acpi, 0-255 for PWM) or a
    /// thinkpad_acpi name such as `auto`, `full-speed` or `disengaged`
    pub level: Level,

    /// How long to hold the level before restoring the fan, in seconds
    #[arg(long, default_value = "60")]
    pub duration: u64,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
