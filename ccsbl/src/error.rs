//! Error types for ccsbl.

use std::io;
use thiserror::Error;

use crate::protocol::sbl::StatusCode;

/// Result type for ccsbl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ccsbl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (serial port, file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// A blocking read did not complete within the port timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The port delivered fewer bytes than requested and then went quiet.
    #[error("Short read: wanted {wanted} bytes, got {got}")]
    ShortRead {
        /// Number of bytes requested.
        wanted: usize,
        /// Number of bytes actually received.
        got: usize,
    },

    /// The device rejected a command with a NACK.
    #[error("Device NACKed {command} command")]
    Nack {
        /// Name of the rejected command.
        command: &'static str,
    },

    /// The 2-byte response matched neither the ACK nor the NACK sentinel.
    ///
    /// This usually means the host and the boot ROM have lost framing.
    #[error("Unrecognized response {0:02X?}, protocol desync")]
    UnexpectedResponse([u8; 2]),

    /// The device reported a non-success status code.
    #[error("Device status: {0}")]
    DeviceStatus(StatusCode),

    /// Frame payload exceeds the 252-byte protocol ceiling.
    #[error("Payload too large: {0} bytes (max 252)")]
    PayloadTooLarge(usize),

    /// A data chunk must carry at least one byte.
    #[error("Empty data chunk")]
    EmptyPayload,

    /// Received frame is malformed (bad length or checksum).
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Firmware image exceeds the configured maximum size.
    #[error("Image too large: {size} bytes (max {max})")]
    ImageTooLarge {
        /// Size of the image on disk.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// No serial port could be found or auto-detected.
    #[error("No serial port found")]
    NoPortFound,
}
