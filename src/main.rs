//! fanctl - fan and temperature sensor control tool
//!
//! A command-line tool for reading temperature sensors and driving
//! thinkpad_acpi and hwmon PWM fans.

use clap::Parser;
use fanctl::cli::args::{generate_completions, Cli, Commands};
use fanctl::commands::{load_config, run_check, run_fan, run_sensors};
use fanctl::error::{AppError, DriverError};

fn main() {
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

/// The env_logger filter admits debug output; the global max level, raised
/// by `--verbose` or `general.verbose`, decides what is emitted.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp(None)
        .init();

    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(log::LevelFilter::Warn);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let config = load_config(cli)?;
    if config.general.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    match &cli.command {
        Commands::Sensors => run_sensors(&config, cli.format),

        Commands::Fan(args) => run_fan(args, &config, cli.format),

        Commands::Check => run_check(&config, cli.format),

        Commands::Completions { .. } => Ok(()),
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Driver(e) if is_permission_error(e) => {
            eprintln!();
            eprintln!("Hint: Try running with sudo or as root.");
        }
        AppError::Driver(DriverError::System(msg)) if msg.contains("fan_control=1") => {
            eprintln!();
            eprintln!("Hint: Reload thinkpad_acpi with fan control enabled:");
            eprintln!("      modprobe -r thinkpad_acpi && modprobe thinkpad_acpi fan_control=1");
        }
        AppError::NoSensors | AppError::NoFan => {
            eprintln!();
            eprintln!("Hint: Add [[sensors]] and [fan] sections to the configuration file,");
            eprintln!("      e.g. /etc/fanctl/config.toml, or pass one with --config.");
        }
        _ => {}
    }
}

fn is_permission_error(err: &DriverError) -> bool {
    match err {
        DriverError::System(msg) => msg.contains("Permission denied"),
        _ => err.kind() == Some(std::io::ErrorKind::PermissionDenied),
    }
}
