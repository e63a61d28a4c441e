//! TI SimpleLink ROM serial-bootloader (SBL) commands and framing.
//!
//! This module implements the command framing documented in the CC13x0/CC26x0
//! SimpleLink Wireless MCU Technical Reference Manual, section 8.2
//! ("Bootloader Serial Interfaces").
//!
//! ## Frame Format
//!
//! Every command the host sends uses the same frame layout:
//!
//! ```text
//! +--------+----------+-----+-----------+
//! | Length | Checksum | CMD |  Payload  |
//! +--------+----------+-----+-----------+
//! | 1 byte | 1 byte   | 1   | 0..252    |
//! +--------+----------+-----+-----------+
//! ```
//!
//! `Length` counts the whole frame including itself, so it is always
//! `3 + payload.len()`. `Checksum` is the byte sum of `CMD ++ Payload`
//! modulo 256 — a plain sum, not a CRC; the boot ROM checks it bit-for-bit.
//!
//! The device answers each frame with a 2-byte sentinel, either ACK
//! (`00 CC`) or NACK (`00 33`). Anything else means the two sides have lost
//! framing.

use crate::error::{Error, Result};
use byteorder::{BigEndian, WriteBytesExt};
use std::fmt;

/// Autobaud preamble. Sent raw, not framed, so the boot ROM can measure the
/// host baud rate from the edges.
pub const SYNC: [u8; 2] = [0x55, 0x55];

/// ACK sentinel.
pub const ACK: [u8; 2] = [0x00, 0xCC];

/// NACK sentinel.
pub const NACK: [u8; 2] = [0x00, 0x33];

/// Maximum payload per frame: the length field must fit one byte.
pub const MAX_PAYLOAD: usize = 252;

/// Length of the status sub-frame returned by [`Command::GetStatus`].
pub const STATUS_FRAME_LEN: usize = 3;

/// SBL command identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// No-op, answered with an ACK (0x20).
    Ping = 0x20,

    /// Configure a flash download region: start address and size (0x21).
    Download = 0x21,

    /// Query the status of the most recent command (0x23).
    GetStatus = 0x23,

    /// Transfer one chunk of image data into the configured region (0x24).
    SendData = 0x24,

    /// Reset the device, leaving the bootloader (0x25).
    Reset = 0x25,
}

impl Command {
    /// Command name for log and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Download => "DOWNLOAD",
            Self::GetStatus => "GET_STATUS",
            Self::SendData => "SEND_DATA",
            Self::Reset => "RESET",
        }
    }
}

/// Sum of all bytes modulo 256.
///
/// This is the checksum the boot ROM expects in every command frame. There
/// is no other mixing step.
pub fn checksum8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// SBL command frame builder.
#[derive(Debug)]
pub struct CommandFrame {
    command: Command,
    data: Vec<u8>,
}

impl CommandFrame {
    /// Create a new frame with the given command and empty payload.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            data: Vec::new(),
        }
    }

    /// Build a ping frame: `{0x03, 0x20, 0x20}`.
    pub fn ping() -> Self {
        Self::new(Command::Ping)
    }

    /// Build a get-status frame: `{0x03, 0x23, 0x23}`.
    pub fn get_status() -> Self {
        Self::new(Command::GetStatus)
    }

    /// Build a download-setup frame.
    ///
    /// Payload is `start_addr` then `size`, each 4 bytes big-endian, giving
    /// an 11-byte frame.
    #[allow(clippy::unwrap_used)] // Writing to Vec<u8> cannot fail
    pub fn download(start_addr: u32, size: u32) -> Self {
        let mut frame = Self::new(Command::Download);
        frame.data.write_u32::<BigEndian>(start_addr).unwrap();
        frame.data.write_u32::<BigEndian>(size).unwrap();
        frame
    }

    /// Build a send-data frame carrying one image chunk.
    pub fn send_data(chunk: &[u8]) -> Result<Self> {
        if chunk.is_empty() {
            return Err(Error::EmptyPayload);
        }
        if chunk.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge(chunk.len()));
        }
        Ok(Self {
            command: Command::SendData,
            data: chunk.to_vec(),
        })
    }

    /// Build a reset frame: `{0x03, 0x25, 0x25}`.
    pub fn reset() -> Self {
        Self::new(Command::Reset)
    }

    /// Build the complete wire frame.
    ///
    /// Fails with [`Error::PayloadTooLarge`] when the payload would push the
    /// one-byte length field past 255.
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(&self) -> Result<Vec<u8>> {
        if self.data.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge(self.data.len()));
        }

        // Length counts itself, the checksum byte and the command id.
        let total_len = 3 + self.data.len();
        let mut buf = Vec::with_capacity(total_len);

        buf.push(total_len as u8);
        buf.push(0); // checksum, patched below
        buf.push(self.command as u8);
        buf.extend_from_slice(&self.data);

        // Checksum covers the command id and payload only.
        buf[1] = checksum8(&buf[2..]);

        Ok(buf)
    }

    /// Parse a wire frame back into command id and payload, verifying the
    /// length and checksum fields.
    pub fn parse(data: &[u8]) -> Result<(u8, Vec<u8>)> {
        if data.len() < 3 {
            return Err(Error::InvalidFrame(format!(
                "{} bytes, need at least 3",
                data.len()
            )));
        }
        if data[0] as usize != data.len() {
            return Err(Error::InvalidFrame(format!(
                "length field {} != frame size {}",
                data[0],
                data.len()
            )));
        }
        let checksum = checksum8(&data[2..]);
        if checksum != data[1] {
            return Err(Error::InvalidFrame(format!(
                "checksum {:#04x} != expected {:#04x}",
                data[1], checksum
            )));
        }
        Ok((data[2], data[3..].to_vec()))
    }

    /// Get the command id.
    pub fn command(&self) -> Command {
        self.command
    }
}

/// Classification of the 2-byte response sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Device accepted the frame.
    Ack,
    /// Device rejected the frame.
    Nack,
    /// Neither sentinel matched; the link is desynchronized.
    Unrecognized([u8; 2]),
}

impl Ack {
    /// Classify a 2-byte response by exact comparison against the sentinels.
    pub fn classify(bytes: [u8; 2]) -> Self {
        if bytes == ACK {
            Self::Ack
        } else if bytes == NACK {
            Self::Nack
        } else {
            Self::Unrecognized(bytes)
        }
    }
}

/// Status codes returned by [`Command::GetStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Last command completed successfully (0x40).
    Success,
    /// Unknown command id (0x41).
    UnknownCommand,
    /// Invalid command, in other words an incorrect packet size (0x42).
    InvalidCommand,
    /// Invalid input address (0x43).
    InvalidAddress,
    /// Flash erase or program operation failed (0x44).
    FlashFail,
    /// Status byte outside the documented range.
    Unknown(u8),
}

impl StatusCode {
    /// Decode the raw status byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x40 => Self::Success,
            0x41 => Self::UnknownCommand,
            0x42 => Self::InvalidCommand,
            0x43 => Self::InvalidAddress,
            0x44 => Self::FlashFail,
            other => Self::Unknown(other),
        }
    }

    /// Raw wire value.
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Success => 0x40,
            Self::UnknownCommand => 0x41,
            Self::InvalidCommand => 0x42,
            Self::InvalidAddress => 0x43,
            Self::FlashFail => 0x44,
            Self::Unknown(other) => other,
        }
    }

    /// Whether the device reported success.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS (0x40)"),
            Self::UnknownCommand => write!(f, "UNKNOWN_CMD (0x41)"),
            Self::InvalidCommand => write!(f, "INVALID_CMD (0x42)"),
            Self::InvalidAddress => write!(f, "INVALID_ADDR (0x43)"),
            Self::FlashFail => write!(f, "FLASH_FAIL (0x44)"),
            Self::Unknown(v) => write!(f, "unrecognized status ({v:#04x})"),
        }
    }
}
