//! Command session with the soft core
//!
//! Every command is answered by an ack; a read is answered by its result
//! byte first. Console output from the running program may arrive at any
//! point in between and goes straight to the console sink.

use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context, Result};
use fpgalink_protocol::{Command, DeviceEvent, EventParser, MAX_IMAGE_SIZE};
use log::{debug, info, warn};

const READ_BUF_SIZE: usize = 256;

pub struct Session<P, O> {
    port: P,
    console: O,
    parser: EventParser,
    timeout: Duration,
}

impl<P: Read + Write, O: Write> Session<P, O> {
    /// `timeout` bounds the wait for each command's ack
    pub fn new(port: P, console: O, timeout: Duration) -> Self {
        Self {
            port,
            console,
            parser: EventParser::new(),
            timeout,
        }
    }

    /// Send one command and wait for its ack, returning any result bytes
    pub fn command(&mut self, cmd: Command<'_>) -> Result<Vec<u8>> {
        let mut frame = vec![0u8; cmd.encoded_len()];
        cmd.encode(&mut frame)
            .map_err(|e| anyhow!("cannot encode command {:#04x}: {:?}", cmd.opcode(), e))?;

        self.port
            .write_all(&frame)
            .and_then(|()| self.port.flush())
            .context("writing command to port")?;
        debug!("sent command {:#04x} ({} bytes)", cmd.opcode(), frame.len());

        self.wait_ack()
            .with_context(|| format!("command {:#04x}", cmd.opcode()))
    }

    /// Load `image` at address 0
    pub fn upload(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MAX_IMAGE_SIZE {
            bail!(
                "image is {} bytes, at most {} fit in memory",
                image.len(),
                MAX_IMAGE_SIZE
            );
        }
        self.command(Command::WriteDump { image })?;
        info!("dump of {} bytes written to memory", image.len());
        Ok(())
    }

    pub fn read_byte(&mut self, addr: u16) -> Result<u8> {
        let results = self.command(Command::ReadByte { addr })?;
        results
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no result byte for read of {:#06x}", addr))
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        self.command(Command::WriteByte { addr, value }).map(drop)
    }

    /// Read the image back from the top address down; fail on the first mismatch
    pub fn verify(&mut self, image: &[u8]) -> Result<()> {
        for addr in (0..image.len()).rev() {
            let expected = image[addr];
            let got = self.read_byte(addr as u16)?;
            if got != expected {
                bail!(
                    "wrong data at {:#06x}: expected {:#04x}, got {:#04x}",
                    addr,
                    expected,
                    got
                );
            }
        }
        info!("verified {} bytes", image.len());
        Ok(())
    }

    /// Reset the CPU, which starts executing from address 0
    pub fn reset(&mut self) -> Result<()> {
        self.command(Command::Reset).map(drop)
    }

    /// Copy program output to the console until `running` is cleared
    pub fn monitor(&mut self, running: &AtomicBool) -> Result<()> {
        let mut buf = [0u8; READ_BUF_SIZE];
        while running.load(Ordering::SeqCst) {
            let n = self.read_some(&mut buf)?;
            for event in self.decode(&buf[..n]) {
                match event {
                    DeviceEvent::Ack | DeviceEvent::Result(_) => {
                        debug!("ignoring {:?} outside a command", event)
                    }
                    other => self.show(other)?,
                }
            }
        }
        Ok(())
    }

    fn wait_ack(&mut self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        let mut results = Vec::new();
        let mut acked = false;
        let mut buf = [0u8; READ_BUF_SIZE];

        while !acked {
            let n = self.read_some(&mut buf)?;

            // Output that follows the ack in the same read is still shown
            for event in self.decode(&buf[..n]) {
                match event {
                    DeviceEvent::Ack if !acked => acked = true,
                    DeviceEvent::Result(byte) if !acked => results.push(byte),
                    DeviceEvent::Ack | DeviceEvent::Result(_) => {
                        warn!("unexpected {:?} after ack", event)
                    }
                    other => self.show(other)?,
                }
            }

            // A chatty program must not hold the deadline off
            if !acked && Instant::now() >= deadline {
                bail!("no ack within {} ms", self.timeout.as_millis());
            }
        }

        Ok(results)
    }

    /// One read from the port; a timed-out read counts as zero bytes
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if is_idle(&e) => Ok(0),
            Err(e) => Err(e).context("reading from port"),
        }
    }

    fn decode(&mut self, bytes: &[u8]) -> Vec<DeviceEvent> {
        self.parser.feed_bytes(bytes).collect()
    }

    fn show(&mut self, event: DeviceEvent) -> Result<()> {
        match event {
            DeviceEvent::Output(byte) => self.console.write_all(&[byte])?,
            DeviceEvent::PrintTime => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis();
                write!(self.console, "\nCurrent time: {}ms\n\n", now)?;
            }
            DeviceEvent::Ack | DeviceEvent::Result(_) => {}
        }
        self.console.flush()?;
        Ok(())
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}
