//! Chip/target abstraction for the supported SimpleLink families.
//!
//! The CC13x0 and CC26x0 families share one boot-ROM command set, so both
//! map onto the same flasher; the abstraction exists so the CLI stays
//! chip-agnostic and future families with protocol quirks slot in behind
//! the same trait.

use crate::error::{Error, Result};
use crate::port::Port;
use crate::protocol::sbl::StatusCode;
use std::fmt;
use thiserror::Error as ThisError;

/// Supported chip families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChipFamily {
    /// CC26x0 series (CC2640, CC2640R2, CC2650 - BLE).
    #[default]
    Cc26x0,
    /// CC13x0 series (CC1310, CC1350 - Sub-1 GHz).
    Cc13x0,
}

impl ChipFamily {
    /// Baud rate the boot ROM is driven at by default.
    #[must_use]
    pub fn default_baud(&self) -> u32 {
        // The ROM autobauds, 230400 is the rate the reference host uses.
        230400
    }

    /// Base address of on-chip flash.
    #[must_use]
    pub fn flash_base(&self) -> u32 {
        0x0000_0000
    }

    /// On-chip flash size in bytes.
    #[must_use]
    pub fn flash_size(&self) -> u32 {
        match self {
            Self::Cc26x0 | Self::Cc13x0 => 0x0002_0000, // 128 KiB
        }
    }

    /// Get the chip family from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "cc26x0" | "cc2640" | "cc2640r2" | "cc2650" => Some(Self::Cc26x0),
            "cc13x0" | "cc1310" | "cc1350" => Some(Self::Cc13x0),
            _ => None,
        }
    }
}

impl fmt::Display for ChipFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cc26x0 => write!(f, "CC26x0"),
            Self::Cc13x0 => write!(f, "CC13x0"),
        }
    }
}

/// Stages of a bootloader session.
///
/// `Idle -> Syncing -> Pinging -> AwaitingInitialStatus` covers
/// [`Flasher::connect`]; the download stages cycle
/// `TransferringChunk <-> AwaitingChunkStatus` until the image is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// No session in progress.
    Idle,
    /// Autobaud preamble sent, waiting for the first ACK.
    Syncing,
    /// PING sent.
    Pinging,
    /// Initial status gate after sync and ping.
    AwaitingInitialStatus,
    /// DOWNLOAD command sent.
    SettingUpDownload,
    /// Status gate after download setup.
    AwaitingSetupStatus,
    /// SEND_DATA chunk in flight.
    TransferringChunk,
    /// Status gate after a chunk.
    AwaitingChunkStatus,
    /// All bytes confirmed.
    Complete,
    /// Session aborted at the stage recorded in the accompanying error.
    Aborted,
}

/// A failed load, carrying how far the transfer got before the abort.
///
/// `bytes_sent` counts only bytes the device acknowledged, which is exactly
/// the resume point an external policy would need.
#[derive(Debug, ThisError)]
#[error("load aborted at {stage:?} after {bytes_sent} confirmed bytes: {source}")]
pub struct LoadError {
    /// Stage at which the load aborted.
    pub stage: LoadStage,
    /// Bytes confirmed transferred before the abort.
    pub bytes_sent: u32,
    /// Underlying failure.
    #[source]
    pub source: Error,
}

/// Trait for flashing operations across all chip families.
///
/// This provides a unified interface so the CLI can work with any chip
/// family through a common API.
pub trait Flasher {
    /// Synchronize with the boot ROM and verify it is ready: autobaud sync,
    /// ping, initial status gate.
    fn connect(&mut self) -> Result<()>;

    /// Query the status of the most recently executed device operation.
    fn status(&mut self) -> Result<StatusCode>;

    /// Stream a firmware image into flash.
    ///
    /// `progress` is called with `(bytes_confirmed, total)` after each
    /// chunk the device acknowledges.
    fn load_image(
        &mut self,
        image: &[u8],
        start_addr: u32,
        progress: &mut dyn FnMut(u32, u32),
    ) -> std::result::Result<u32, LoadError>;

    /// Reset the device, leaving the bootloader.
    fn reset(&mut self) -> Result<()>;

    /// Close the flasher and release the serial port.
    ///
    /// Safe to call on any exit path; after this the flasher cannot be used.
    fn close(&mut self);
}

impl ChipFamily {
    /// Create a flasher instance for this chip family.
    ///
    /// # Arguments
    ///
    /// * `port_name` - Serial port name (e.g., "/dev/ttyUSB0")
    /// * `baud` - Baud rate to drive the boot ROM at
    pub fn create_flasher(&self, port_name: &str, baud: u32) -> Result<Box<dyn Flasher>> {
        match self {
            Self::Cc26x0 | Self::Cc13x0 => {
                let flasher = super::cc26xx::Cc26xxFlasher::open(port_name, baud)?;
                Ok(Box::new(flasher))
            }
        }
    }

    /// Create a flasher with an existing port (works for any `Port` type).
    ///
    /// This is useful for testing or custom port implementations.
    pub fn create_flasher_with_port<P: Port + 'static>(&self, port: P) -> Result<Box<dyn Flasher>> {
        match self {
            Self::Cc26x0 | Self::Cc13x0 => {
                Ok(Box::new(super::cc26xx::Cc26xxFlasher::new(port)))
            }
        }
    }
}
