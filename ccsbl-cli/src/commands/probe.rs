//! Ping, status, and reset command implementations.

use anyhow::Result;
use console::style;

use crate::Cli;
use crate::config::Config;
use crate::serial::{resolve_baud, resolve_chip, resolve_port};

/// Open a flasher and run an established-session closure against it.
///
/// The port is closed on every exit path.
fn with_connected_flasher<T>(
    cli: &Cli,
    config: &Config,
    f: impl FnOnce(&mut dyn ccsbl::Flasher) -> ccsbl::Result<T>,
) -> Result<T> {
    let chip = resolve_chip(cli, config)?;
    let port = resolve_port(cli, config)?;
    let baud = resolve_baud(cli, config, chip);
    if !cli.quiet {
        eprintln!(
            "{} Using port {} at {} baud",
            style("🔌").cyan(),
            style(&port).green(),
            baud
        );
    }

    let mut flasher = chip.create_flasher(&port, baud)?;

    if let Err(err) = flasher.connect() {
        flasher.close();
        return Err(err.into());
    }

    let result = f(flasher.as_mut());
    flasher.close();
    Ok(result?)
}

/// Ping command implementation.
pub(crate) fn cmd_ping(cli: &Cli, config: &Config) -> Result<()> {
    // connect() already syncs and pings; reaching here means the device
    // answered.
    with_connected_flasher(cli, config, |_| Ok(()))?;
    if !cli.quiet {
        eprintln!("{} Device is responsive", style("✓").green());
    }
    Ok(())
}

/// Status command implementation.
pub(crate) fn cmd_status(cli: &Cli, config: &Config) -> Result<()> {
    let status = with_connected_flasher(cli, config, |flasher| flasher.status())?;
    println!("{status}");
    Ok(())
}

/// Reset command implementation.
pub(crate) fn cmd_reset(cli: &Cli, config: &Config) -> Result<()> {
    with_connected_flasher(cli, config, |flasher| flasher.reset())?;
    if !cli.quiet {
        eprintln!("{} Device reset", style("✓").green());
    }
    Ok(())
}
