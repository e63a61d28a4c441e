//! USB device detection and serial port auto-discovery.
//!
//! This module provides automatic serial port detection based on USB VID/PID.
//!
//! ## Supported devices
//!
//! TI LaunchPads and SimpleLink dev boards typically show up behind one of:
//! - TI XDS110 debug probe (VID: 0x0451, application UART on one interface)
//! - CP210x (VID: 0x10C4, PID: 0xEA60)
//! - FTDI (VID: 0x0403, PID: 0x6001/0x6010/0x6014/0x6015)
//! - CH340/CH341 (VID: 0x1A86, PID: 0x7523)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ccsbl::device::detect_ports;
//!
//! for port in detect_ports() {
//!     println!("Found: {} ({:?})", port.name, port.bridge);
//! }
//! ```

use crate::error::{Error, Result};
use log::{debug, info, trace};

/// Known USB VID/PID combinations for TI development boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbBridge {
    /// TI XDS110 debug probe (LaunchPad onboard).
    Xds110,
    /// Silicon Labs CP210x USB-to-Serial converter.
    Cp210x,
    /// FTDI FT232/FT2232/FT4232 USB-to-Serial converter.
    Ftdi,
    /// CH340/CH341 USB-to-Serial converter.
    Ch340,
    /// Unknown device.
    Unknown,
}

impl UsbBridge {
    /// Classify a VID/PID pair.
    #[must_use]
    pub fn from_vid_pid(vid: u16, _pid: u16) -> Self {
        match vid {
            // Texas Instruments (XDS110 and friends)
            0x0451 => Self::Xds110,
            // Silicon Labs CP210x family
            0x10C4 => Self::Cp210x,
            // FTDI family
            0x0403 => Self::Ftdi,
            // CH340/CH341 family
            0x1A86 => Self::Ch340,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable name for the device.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Xds110 => "TI XDS110",
            Self::Cp210x => "CP210x",
            Self::Ftdi => "FTDI",
            Self::Ch340 => "CH340/CH341",
            Self::Unknown => "Unknown",
        }
    }

    /// Check if this is a known/expected device type.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Detected serial port information.
#[derive(Debug, Clone)]
pub struct DetectedPort {
    /// Port name/path (e.g., "/dev/ttyUSB0" or "COM3").
    pub name: String,
    /// USB bridge type if detected.
    pub bridge: UsbBridge,
    /// USB Vendor ID (if available).
    pub vid: Option<u16>,
    /// USB Product ID (if available).
    pub pid: Option<u16>,
    /// Device manufacturer string (if available).
    pub manufacturer: Option<String>,
    /// Device product string (if available).
    pub product: Option<String>,
    /// Serial number (if available).
    pub serial: Option<String>,
}

impl DetectedPort {
    /// Check if this port is likely a TI development board.
    pub fn is_likely_ti(&self) -> bool {
        self.bridge.is_known()
    }
}

/// Detect all available serial ports with USB device information.
pub fn detect_ports() -> Vec<DetectedPort> {
    let mut result = Vec::new();

    match serialport::available_ports() {
        Ok(ports) => {
            for port_info in ports {
                let mut detected = DetectedPort {
                    name: port_info.port_name.clone(),
                    bridge: UsbBridge::Unknown,
                    vid: None,
                    pid: None,
                    manufacturer: None,
                    product: None,
                    serial: None,
                };

                if let serialport::SerialPortType::UsbPort(usb_info) = port_info.port_type {
                    detected.vid = Some(usb_info.vid);
                    detected.pid = Some(usb_info.pid);
                    detected.manufacturer = usb_info.manufacturer;
                    detected.product = usb_info.product;
                    detected.serial = usb_info.serial_number;
                    detected.bridge = UsbBridge::from_vid_pid(usb_info.vid, usb_info.pid);

                    trace!(
                        "Found USB port: {} (VID: {:04X}, PID: {:04X}, Bridge: {:?})",
                        port_info.port_name, usb_info.vid, usb_info.pid, detected.bridge
                    );
                }

                result.push(detected);
            }
        }
        Err(e) => {
            debug!("Failed to enumerate serial ports: {e}");
        }
    }

    result
}

/// Detect ports that are likely TI development boards.
pub fn detect_ti_ports() -> Vec<DetectedPort> {
    detect_ports()
        .into_iter()
        .filter(DetectedPort::is_likely_ti)
        .collect()
}

/// Auto-detect a single port.
///
/// Prioritizes the XDS110 probe found on LaunchPads over generic USB-UART
/// bridges, and any known bridge over an unclassified port.
pub fn auto_detect_port() -> Result<DetectedPort> {
    let ports = detect_ports();

    if let Some(port) = ports.iter().find(|p| p.bridge == UsbBridge::Xds110) {
        info!("Auto-detected XDS110 probe: {}", port.name);
        return Ok(port.clone());
    }

    if let Some(port) = ports.iter().find(|p| p.bridge.is_known()) {
        info!(
            "Auto-detected {} USB-UART bridge: {}",
            port.bridge.name(),
            port.name
        );
        return Ok(port.clone());
    }

    if let Some(port) = ports.into_iter().next() {
        info!("Using first available port: {}", port.name);
        return Ok(port);
    }

    Err(Error::NoPortFound)
}
