//! ccsbl CLI - Command-line tool for flashing TI SimpleLink chips.
//!
//! ## Features
//!
//! - Flash raw firmware images through the ROM serial bootloader
//! - Ping, status query, and device reset
//! - Serial port auto-detection by USB VID/PID
//! - Shell completion generation
//! - Environment variable support

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ccsbl::ChipFamily;
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

mod commands;
mod config;
mod serial;

use config::Config;

/// Whether stderr is a terminal (set once at startup).
static STDERR_IS_TTY: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Check if animations should be used (TTY and colors enabled).
fn use_fancy_output() -> bool {
    STDERR_IS_TTY.load(std::sync::atomic::Ordering::Relaxed) && console::colors_enabled_stderr()
}

/// ccsbl - A cross-platform tool for flashing TI SimpleLink CC13x0/CC26x0
/// chips via the ROM serial bootloader.
///
/// Environment variables:
///   CCSBL_PORT   - Default serial port
///   CCSBL_BAUD   - Default baud rate (default: 230400)
///   CCSBL_CHIP   - Default chip family (cc26x0, cc13x0)
#[derive(Parser)]
#[command(name = "ccsbl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Serial port to use (auto-detected if not specified).
    #[arg(short, long, global = true, env = "CCSBL_PORT")]
    port: Option<String>,

    /// Baud rate for the bootloader UART (default: 230400).
    ///
    /// Left as an `Option` so an absent flag can defer to the config file.
    #[arg(short, long, global = true, env = "CCSBL_BAUD")]
    baud: Option<u32>,

    /// Target chip family (default: cc26x0).
    #[arg(short, long, global = true, env = "CCSBL_CHIP")]
    chip: Option<Chip>,

    /// Verbose output level (-v, -vv, -vvv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Supported chip families.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Chip {
    /// CC26x0 series (CC2640, CC2650 - BLE, default).
    Cc26x0,
    /// CC13x0 series (CC1310, CC1350 - Sub-1 GHz).
    Cc13x0,
}

impl From<Chip> for ChipFamily {
    fn from(chip: Chip) -> Self {
        match chip {
            Chip::Cc26x0 => ChipFamily::Cc26x0,
            Chip::Cc13x0 => ChipFamily::Cc13x0,
        }
    }
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Flash a firmware image.
    Flash {
        /// Path to the raw firmware image.
        image: PathBuf,

        /// Flash start address.
        #[arg(short, long, default_value = "0x0", value_parser = parse_hex_u32)]
        address: u32,

        /// Leave the device in the bootloader instead of resetting it.
        #[arg(long)]
        no_reset: bool,
    },

    /// Ping the bootloader to verify the device is responsive.
    Ping,

    /// Query the device status register.
    Status,

    /// Reset the device out of the bootloader.
    Reset,

    /// List available serial ports.
    ListPorts {
        /// Output port list as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type for completions.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse hexadecimal address (supports 0x prefix and underscores).
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    // Support underscore separators like 0x0001_0000
    let s: String = s.chars().filter(|c| *c != '_').collect();
    u32::from_str_radix(&s, 16).map_err(|e| format!("Invalid hex address: {e}"))
}

fn main() -> Result<()> {
    // --- NO_COLOR and TTY detection ---
    let stderr_is_tty = console::Term::stderr().is_term();
    STDERR_IS_TTY.store(stderr_is_tty, std::sync::atomic::Ordering::Relaxed);

    if std::env::var("NO_COLOR").is_ok() || !stderr_is_tty {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "ccsbl v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    // Load configuration
    let config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    match &cli.command {
        Commands::Flash {
            image,
            address,
            no_reset,
        } => {
            commands::flash::cmd_flash(&cli, &config, image, *address, *no_reset)?;
        }
        Commands::Ping => {
            commands::probe::cmd_ping(&cli, &config)?;
        }
        Commands::Status => {
            commands::probe::cmd_status(&cli, &config)?;
        }
        Commands::Reset => {
            commands::probe::cmd_reset(&cli, &config)?;
        }
        Commands::ListPorts { json } => {
            commands::ports::cmd_list_ports(*json);
        }
        Commands::Completions { shell } => {
            commands::completions::cmd_completions(*shell);
        }
    }

    Ok(())
}
