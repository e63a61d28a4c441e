//! Serial port, baud, and chip resolution.
//!
//! Precedence for each setting: explicit flag (or its `CCSBL_*` environment
//! variable, which clap folds into the flag), then the config file, then the
//! built-in default (auto-detection, in the port's case).

use anyhow::{Context, Result, anyhow};
use ccsbl::{ChipFamily, auto_detect_port};
use log::{debug, info};

use crate::Cli;
use crate::config::Config;

/// Resolve the serial port to use for this invocation.
pub(crate) fn resolve_port(cli: &Cli, config: &Config) -> Result<String> {
    if let Some(ref port) = cli.port {
        debug!("Using port from flag/environment: {port}");
        return Ok(port.clone());
    }

    if let Some(ref port) = config.connection.serial {
        debug!("Using port from config file: {port}");
        return Ok(port.clone());
    }

    let detected = auto_detect_port()
        .context("No serial port specified and auto-detection found none; use --port")?;
    info!(
        "Auto-detected port {} ({})",
        detected.name,
        detected.bridge.name()
    );
    Ok(detected.name)
}

/// Resolve the baud rate: flag/env wins, then config, then the chip default.
pub(crate) fn resolve_baud(cli: &Cli, config: &Config, chip: ChipFamily) -> u32 {
    cli.baud
        .or(config.connection.baud)
        .unwrap_or_else(|| chip.default_baud())
}

/// Resolve the chip family: flag/env wins, then config, then CC26x0.
///
/// A chip name in the config file that does not parse is an error rather
/// than a silent fallback.
pub(crate) fn resolve_chip(cli: &Cli, config: &Config) -> Result<ChipFamily> {
    if let Some(chip) = cli.chip {
        return Ok(chip.into());
    }

    if let Some(ref name) = config.flash.chip {
        let chip = ChipFamily::from_name(name)
            .ok_or_else(|| anyhow!("Unknown chip family '{name}' in config file"))?;
        debug!("Using chip from config file: {chip}");
        return Ok(chip);
    }

    Ok(ChipFamily::default())
}
