//! CC13x0/CC26x0 flasher: drives the boot-ROM serial bootloader.
//!
//! Every command follows the same turn: purge the receive buffer, write the
//! frame, then block on a fixed-size read for the response. The purge keeps
//! a noisy line or a stale response from a previous turn from being
//! misparsed as the answer to the current command.

use log::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::port::{NativePort, Port, SerialConfig};
use crate::protocol::sbl::{Ack, Command, CommandFrame, StatusCode, ACK, STATUS_FRAME_LEN, SYNC};
use crate::target::chip::{Flasher, LoadError, LoadStage};

/// Image bytes carried per SEND_DATA frame.
///
/// The protocol ceiling is 252, but smaller chunks keep each turn short and
/// make an abort cheap to localize.
const CHUNK_SIZE: usize = 128;

/// Bootloader client for the CC13x0/CC26x0 families.
///
/// Generic over [`Port`] so the same state machine drives real hardware and
/// scripted test ports.
pub struct Cc26xxFlasher<P: Port> {
    port: P,
    stage: LoadStage,
}

impl Cc26xxFlasher<NativePort> {
    /// Open the named serial port at `baud` and wrap it in a flasher.
    ///
    /// Line settings are fixed at 8N1 with no flow control, which is what
    /// the boot ROM expects.
    pub fn open(port_name: &str, baud: u32) -> Result<Self> {
        let config = SerialConfig::new(port_name, baud);
        let port = NativePort::open(&config)?;
        info!("Opened {port_name} at {baud} baud");
        Ok(Self::new(port))
    }
}

impl<P: Port> Cc26xxFlasher<P> {
    /// Wrap an already-open port.
    pub fn new(port: P) -> Self {
        Self {
            port,
            stage: LoadStage::Idle,
        }
    }

    /// Current session stage.
    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    /// Borrow the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Consume the flasher and hand the port back.
    pub fn into_port(self) -> P {
        self.port
    }

    /// One command turn: purge stale input, then write `bytes`.
    fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.clear_input()?;
        self.port.write_all_bytes(bytes)?;
        Ok(())
    }

    fn send_frame(&mut self, frame: &CommandFrame) -> Result<()> {
        let wire = frame.build()?;
        trace!("TX {} frame: {wire:02X?}", frame.command().name());
        self.send_raw(&wire)
    }

    /// Read the 2-byte response sentinel for `command`.
    fn read_ack(&mut self, command: &'static str) -> Result<()> {
        let mut resp = [0u8; 2];
        self.port.read_exact_bytes(&mut resp)?;
        trace!("RX response: {resp:02X?}");
        match Ack::classify(resp) {
            Ack::Ack => Ok(()),
            Ack::Nack => Err(Error::Nack { command }),
            Ack::Unrecognized(bytes) => Err(Error::UnexpectedResponse(bytes)),
        }
    }

    /// Autobaud handshake: two raw 0x55 bytes, answered with an ACK.
    pub fn sync(&mut self) -> Result<()> {
        debug!("Sending autobaud sync");
        self.send_raw(&SYNC)?;
        self.read_ack("SYNC")
    }

    /// PING the boot ROM.
    pub fn ping(&mut self) -> Result<()> {
        self.send_frame(&CommandFrame::ping())?;
        self.read_ack(Command::Ping.name())
    }

    /// Query the status of the most recently executed command.
    ///
    /// The device answers with its ACK followed by a 3-byte status
    /// sub-frame; the host then ACKs the sub-frame back regardless of the
    /// status it carries, so the device can retire it.
    pub fn get_status(&mut self) -> Result<StatusCode> {
        self.send_frame(&CommandFrame::get_status())?;
        self.read_ack(Command::GetStatus.name())?;

        let mut sub = [0u8; STATUS_FRAME_LEN];
        self.port.read_exact_bytes(&mut sub)?;
        self.port.write_all_bytes(&ACK)?;

        let status = StatusCode::from_byte(sub[STATUS_FRAME_LEN - 1]);
        debug!("Device status: {status}");
        Ok(status)
    }

    /// Configure the flash download region.
    pub fn download_setup(&mut self, start_addr: u32, size: u32) -> Result<()> {
        debug!("Download setup: start {start_addr:#010x}, {size} bytes");
        self.send_frame(&CommandFrame::download(start_addr, size))?;
        self.read_ack(Command::Download.name())
    }

    /// Transfer one image chunk into the configured region.
    pub fn send_data(&mut self, chunk: &[u8]) -> Result<()> {
        self.send_frame(&CommandFrame::send_data(chunk)?)?;
        self.read_ack(Command::SendData.name())
    }

    /// Reset the device out of the bootloader.
    pub fn reset_device(&mut self) -> Result<()> {
        info!("Resetting device");
        self.send_frame(&CommandFrame::reset())?;
        self.read_ack(Command::Reset.name())
    }

    /// Query the device status and require SUCCESS.
    fn status_gate(&mut self) -> Result<()> {
        let status = self.get_status()?;
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::DeviceStatus(status))
        }
    }

    /// Establish a bootloader session: sync, ping, initial status gate.
    pub fn connect_device(&mut self) -> Result<()> {
        self.stage = LoadStage::Syncing;
        self.sync()?;

        self.stage = LoadStage::Pinging;
        self.ping()?;

        self.stage = LoadStage::AwaitingInitialStatus;
        self.status_gate()?;

        self.stage = LoadStage::Idle;
        info!("Bootloader session established");
        Ok(())
    }

    fn abort(&mut self, stage: LoadStage, bytes_sent: u32, source: Error) -> LoadError {
        warn!("Load aborted at {stage:?} after {bytes_sent} bytes: {source}");
        self.stage = LoadStage::Aborted;
        LoadError {
            stage,
            bytes_sent,
            source,
        }
    }

    /// Stream `image` into flash at `start_addr`.
    ///
    /// The transfer stops at the first failure; `progress` sees
    /// `(bytes_confirmed, total)` after each chunk the device acknowledged
    /// and reported SUCCESS for. On success the confirmed byte count equals
    /// the image length.
    #[allow(clippy::cast_possible_truncation)] // image size is capped well below u32::MAX
    pub fn load(
        &mut self,
        image: &[u8],
        start_addr: u32,
        progress: &mut dyn FnMut(u32, u32),
    ) -> std::result::Result<u32, LoadError> {
        let total = image.len() as u32;

        self.stage = LoadStage::SettingUpDownload;
        if let Err(e) = self.download_setup(start_addr, total) {
            return Err(self.abort(LoadStage::SettingUpDownload, 0, e));
        }

        self.stage = LoadStage::AwaitingSetupStatus;
        if let Err(e) = self.status_gate() {
            return Err(self.abort(LoadStage::AwaitingSetupStatus, 0, e));
        }

        let mut sent: u32 = 0;
        for chunk in image.chunks(CHUNK_SIZE) {
            self.stage = LoadStage::TransferringChunk;
            if let Err(e) = self.send_data(chunk) {
                return Err(self.abort(LoadStage::TransferringChunk, sent, e));
            }
            sent += chunk.len() as u32;

            // The chunk only counts once the device reports it landed.
            self.stage = LoadStage::AwaitingChunkStatus;
            if let Err(e) = self.status_gate() {
                return Err(self.abort(LoadStage::AwaitingChunkStatus, sent, e));
            }

            trace!("Confirmed {sent}/{total} bytes");
            progress(sent, total);
        }

        self.stage = LoadStage::Complete;
        info!("Load complete: {sent} bytes confirmed");
        Ok(sent)
    }
}

impl<P: Port> Flasher for Cc26xxFlasher<P> {
    fn connect(&mut self) -> Result<()> {
        self.connect_device()
    }

    fn status(&mut self) -> Result<StatusCode> {
        self.get_status()
    }

    fn load_image(
        &mut self,
        image: &[u8],
        start_addr: u32,
        progress: &mut dyn FnMut(u32, u32),
    ) -> std::result::Result<u32, LoadError> {
        self.load(image, start_addr, progress)
    }

    fn reset(&mut self) -> Result<()> {
        self.reset_device()
    }

    fn close(&mut self) {
        if let Err(e) = self.port.close() {
            warn!("Failed to close port: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::MockPort;

    const ACK_BYTES: [u8; 2] = [0x00, 0xCC];
    const NACK_BYTES: [u8; 2] = [0x00, 0x33];

    /// Device ACK plus the 3-byte status sub-frame carrying `status`.
    fn status_response(status: u8) -> Vec<u8> {
        vec![0x00, 0xCC, 0x03, status, status]
    }

    fn flasher_with_script(script: &[&[u8]]) -> Cc26xxFlasher<MockPort> {
        let mut port = MockPort::new();
        for part in script {
            port.push_response(part);
        }
        Cc26xxFlasher::new(port)
    }

    #[test]
    fn test_connect_happy_path() {
        let mut flasher = flasher_with_script(&[
            &ACK_BYTES,            // sync
            &ACK_BYTES,            // ping
            &status_response(0x40), // initial status gate
        ]);

        flasher.connect_device().unwrap();
        assert_eq!(flasher.stage(), LoadStage::Idle);

        let port = flasher.into_port();
        assert_eq!(port.writes[0], SYNC.to_vec());
        assert_eq!(port.frames_with_command(0x20).len(), 1);
        assert_eq!(port.frames_with_command(0x23).len(), 1);
    }

    #[test]
    fn test_sync_unrecognized_response_is_desync() {
        let mut flasher = flasher_with_script(&[&[0xAA, 0xBB]]);
        let err = flasher.sync().unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse([0xAA, 0xBB])));
    }

    #[test]
    fn test_silent_device_is_timeout() {
        let mut flasher = flasher_with_script(&[]);
        let err = flasher.ping().unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn test_get_status_acks_back_regardless_of_status() {
        for status in [0x40u8, 0x44] {
            let mut flasher = flasher_with_script(&[&status_response(status)]);
            let code = flasher.get_status().unwrap();
            assert_eq!(code.as_byte(), status);

            // Exactly one bare ACK write back to the device, even for a
            // failure status.
            let port = flasher.into_port();
            let acks: Vec<_> = port
                .writes
                .iter()
                .filter(|w| w.as_slice() == ACK_BYTES.as_slice())
                .collect();
            assert_eq!(acks.len(), 1);
        }
    }

    #[test]
    fn test_three_chunk_load() {
        let image = vec![0x5A; 300];
        let mut flasher = flasher_with_script(&[
            &ACK_BYTES,            // download setup
            &status_response(0x40),
            &ACK_BYTES,            // chunk 1
            &status_response(0x40),
            &ACK_BYTES,            // chunk 2
            &status_response(0x40),
            &ACK_BYTES,            // chunk 3
            &status_response(0x40),
        ]);

        let mut progress = Vec::new();
        let sent = flasher
            .load(&image, 0x1000, &mut |done, total| {
                progress.push((done, total));
            })
            .unwrap();

        assert_eq!(sent, 300);
        assert_eq!(flasher.stage(), LoadStage::Complete);
        assert_eq!(progress, vec![(128, 300), (256, 300), (300, 300)]);

        let port = flasher.into_port();

        // Setup frame carries start address and size big-endian.
        let setup = &port.frames_with_command(0x21)[0];
        assert_eq!(setup.len(), 11);
        assert_eq!(&setup[3..7], &[0x00, 0x00, 0x10, 0x00]);
        assert_eq!(&setup[7..11], &[0x00, 0x00, 0x01, 0x2C]);

        // 300 bytes split into 128 + 128 + 44.
        let chunks = port.frames_with_command(0x24);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 3 + 128);
        assert_eq!(chunks[1].len(), 3 + 128);
        assert_eq!(chunks[2].len(), 3 + 44);

        // One purge per command turn: setup + 4 status queries + 3 chunks.
        assert_eq!(port.clears, 8);
    }

    #[test]
    fn test_setup_nack_aborts_before_any_data() {
        let mut flasher = flasher_with_script(&[&NACK_BYTES]);

        let err = flasher
            .load(&[0u8; 256], 0x0000, &mut |_, _| {})
            .unwrap_err();

        assert_eq!(err.stage, LoadStage::SettingUpDownload);
        assert_eq!(err.bytes_sent, 0);
        assert!(matches!(err.source, Error::Nack { command: "DOWNLOAD" }));
        assert_eq!(flasher.stage(), LoadStage::Aborted);

        let port = flasher.into_port();
        assert!(port.frames_with_command(0x24).is_empty());
    }

    #[test]
    fn test_flash_fail_after_second_chunk() {
        let image = vec![0xA5; 300];
        let mut flasher = flasher_with_script(&[
            &ACK_BYTES,            // download setup
            &status_response(0x40),
            &ACK_BYTES,            // chunk 1
            &status_response(0x40),
            &ACK_BYTES,            // chunk 2
            &status_response(0x44), // FLASH_FAIL
        ]);

        let mut calls = 0u32;
        let err = flasher
            .load(&image, 0x1000, &mut |_, _| calls += 1)
            .unwrap_err();

        // The second chunk was acknowledged before the gate failed, so it
        // counts toward the confirmed bytes.
        assert_eq!(err.stage, LoadStage::AwaitingChunkStatus);
        assert_eq!(err.bytes_sent, 256);
        assert!(matches!(
            err.source,
            Error::DeviceStatus(StatusCode::FlashFail)
        ));
        assert_eq!(calls, 1);

        // No third chunk went out.
        let port = flasher.into_port();
        assert_eq!(port.frames_with_command(0x24).len(), 2);
    }

    #[test]
    fn test_send_data_nack_reports_preincrement_bytes() {
        let image = vec![0x11; 200];
        let mut flasher = flasher_with_script(&[
            &ACK_BYTES,            // download setup
            &status_response(0x40),
            &ACK_BYTES,            // chunk 1
            &status_response(0x40),
            &NACK_BYTES,           // chunk 2 rejected
        ]);

        let err = flasher
            .load(&image, 0x0000, &mut |_, _| {})
            .unwrap_err();

        // Chunk 2 never landed, so only chunk 1's bytes are confirmed.
        assert_eq!(err.stage, LoadStage::TransferringChunk);
        assert_eq!(err.bytes_sent, 128);
        assert!(matches!(err.source, Error::Nack { command: "SEND_DATA" }));
    }

    #[test]
    fn test_empty_image_completes_without_data_frames() {
        let mut flasher = flasher_with_script(&[
            &ACK_BYTES,            // download setup, size 0
            &status_response(0x40),
        ]);

        let sent = flasher.load(&[], 0x0000, &mut |_, _| {}).unwrap();
        assert_eq!(sent, 0);
        assert_eq!(flasher.stage(), LoadStage::Complete);
        assert!(flasher.into_port().frames_with_command(0x24).is_empty());
    }

    #[test]
    fn test_reset_sends_reset_frame() {
        let mut flasher = flasher_with_script(&[&ACK_BYTES]);
        flasher.reset_device().unwrap();
        let port = flasher.into_port();
        assert_eq!(port.frames_with_command(0x25)[0], &vec![0x03, 0x25, 0x25]);
    }
}
