//! Scripted in-memory port for state-machine tests.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;
use crate::port::Port;

/// A port that replays a pre-scripted device byte stream and records every
/// write the client performs.
///
/// `clear_input` is a counted no-op: the scripted response bytes must
/// survive the purge the client issues before each command turn.
pub(crate) struct MockPort {
    rx: VecDeque<u8>,
    /// One entry per `write` call.
    pub writes: Vec<Vec<u8>>,
    pub clears: usize,
    timeout: Duration,
    baud_rate: u32,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            writes: Vec::new(),
            clears: 0,
            timeout: Duration::from_millis(1000),
            baud_rate: 230400,
        }
    }

    /// Append bytes the "device" will send.
    pub fn push_response(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Frames written so far, keyed by command id byte (index 2).
    pub fn frames_with_command(&self, command: u8) -> Vec<&Vec<u8>> {
        self.writes
            .iter()
            .filter(|w| w.len() >= 3 && w[2] == command)
            .collect()
    }
}

impl Port for MockPort {
    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.baud_rate = baud_rate;
        Ok(())
    }

    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn clear_input(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.rx.is_empty() {
            // Script exhausted; behave like a silent device.
            return Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "mock script exhausted",
            ));
        }
        let n = buf.len().min(self.rx.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.rx.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
