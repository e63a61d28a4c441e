//! Flash command implementation.

use anyhow::{Context, Result};
use ccsbl::FirmwareImage;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::config::Config;
use crate::serial::{resolve_baud, resolve_chip, resolve_port};
use crate::{Cli, use_fancy_output};

/// Flash command implementation.
pub(crate) fn cmd_flash(
    cli: &Cli,
    config: &Config,
    image_path: &Path,
    address: u32,
    no_reset: bool,
) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "{} Loading image {}",
            style("📦").cyan(),
            style(image_path.display()).bold()
        );
    }

    let chip = resolve_chip(cli, config)?;

    // Cap the image at the target's flash size so an obviously wrong file
    // fails before any bytes hit the wire.
    let image = FirmwareImage::from_file_with_limit(image_path, u64::from(chip.flash_size()))
        .with_context(|| format!("Failed to load image {}", image_path.display()))?;

    if !cli.quiet {
        eprintln!(
            "{} {} bytes for {} at {:#010x}",
            style("ℹ").blue(),
            image.len(),
            chip,
            address
        );
    }

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

    if !cli.quiet {
        eprintln!("{} Waiting for bootloader...", style("⏳").yellow());
    }
    if let Err(err) = flasher.connect() {
        flasher.close();
        return Err(err.into());
    }
    if !cli.quiet {
        eprintln!("{} Connected", style("✓").green());
    }

    // Create progress bar
    let pb = if cli.quiet || !use_fancy_output() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(image.len() as u64);
        #[allow(clippy::unwrap_used)] // Static template string
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb
    };

    let result = flasher.load_image(image.data(), address, &mut |sent, _total| {
        pb.set_position(u64::from(sent));
    });

    match result {
        Ok(sent) => {
            pb.finish_with_message("done");
            if !cli.quiet {
                eprintln!("{} Transferred {sent} bytes", style("✓").green());
            }
        }
        Err(err) => {
            pb.abandon();
            flasher.close();
            return Err(err.into());
        }
    }

    if no_reset {
        if !cli.quiet {
            eprintln!("{} Leaving device in bootloader", style("ℹ").blue());
        }
    } else {
        if !cli.quiet {
            eprintln!("{} Resetting device", style("🔄").cyan());
        }
        if let Err(err) = flasher.reset() {
            flasher.close();
            return Err(err.into());
        }
    }

    flasher.close();

    if !cli.quiet {
        eprintln!("\n{} Flash completed", style("🎉").green().bold());
    }

    Ok(())
}
