//! # ccsbl
//!
//! A library for flashing TI SimpleLink CC13x0/CC26x0 wireless MCUs through
//! the serial bootloader ("SBL") built into their boot ROM.
//!
//! This crate provides the core functionality for talking to the boot ROM
//! over a UART, including:
//!
//! - SBL command framing and the modulo-256 byte checksum
//! - ACK/NACK and device-status classification
//! - The chunked download state machine (setup, transfer, status polling)
//! - Firmware image loading with a configurable size cap
//! - USB VID/PID based discovery of likely debug-probe ports
//!
//! ## Supported chips
//!
//! Any device exposing the CC13x0/CC26x0 ROM bootloader command set
//! (CC1310, CC1350, CC2640, CC2640R2, CC2650, ...).
//!
//! ## Example
//!
//! ```rust,no_run
//! use ccsbl::{ChipFamily, FirmwareImage};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let image = FirmwareImage::from_file("app.bin")?;
//!
//!     let chip = ChipFamily::Cc26x0;
//!     let mut flasher = chip.create_flasher("/dev/ttyUSB0", chip.default_baud())?;
//!     flasher.connect()?;
//!
//!     flasher.load_image(image.data(), 0x0000_0000, &mut |sent, total| {
//!         println!("{sent}/{total} bytes");
//!     })?;
//!
//!     flasher.reset()?;
//!     flasher.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod device;
pub mod error;
pub mod host;
pub mod image;
pub mod port;
pub mod protocol;
pub mod target;

// Re-exports for convenience
pub use {
    device::{DetectedPort, UsbBridge},
    error::{Error, Result},
    host::{auto_detect_port, discover_ports, discover_ti_ports},
    image::FirmwareImage,
    port::{NativePort, NativePortEnumerator, Port, PortEnumerator, PortInfo, SerialConfig},
    protocol::sbl::{Ack, Command, CommandFrame, StatusCode, checksum8},
    target::{ChipFamily, Flasher, LoadError, LoadStage},
};
