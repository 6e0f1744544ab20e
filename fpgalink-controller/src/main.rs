//! fpgalink controller
//!
//! Loads a ROM image into the i8080 soft core behind the bridge, optionally
//! verifies it, resets the CPU and then streams its console output.

mod args;
mod session;

use std::fs;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::args::Args;
use crate::session::Session;

/// Port read timeout; bounds how long Ctrl-C takes to be noticed
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let image = fs::read(&args.rom)
        .with_context(|| format!("reading ROM image {}", args.rom.display()))?;

    let port = serialport::new(&args.port, args.baud)
        .timeout(POLL_INTERVAL)
        .open()
        .with_context(|| format!("opening serial port {}", args.port))?;
    info!("opened {} at {} baud", args.port, args.baud);

    let mut session = Session::new(port, io::stdout(), Duration::from_millis(args.timeout_ms));

    session.upload(&image).context("writing dump")?;

    if args.verify {
        info!("verifying dump...");
        session.verify(&image).context("verifying dump")?;
    }

    for &(addr, value) in &args.poke {
        session
            .write_byte(addr, value)
            .with_context(|| format!("patching {:#06x}", addr))?;
        info!("patched {:#06x} = {:#04x}", addr, value);
    }

    session.reset().context("resetting CPU")?;
    info!("CPU reset, output follows (Ctrl-C to quit)");

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("installing Ctrl-C handler")?;

    session.monitor(&running)
}
