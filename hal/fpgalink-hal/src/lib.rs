//! fpgalink Hardware Abstraction Layer
//!
//! Transport traits for the two sides of the bridge. Chip-specific crates
//! (`fpgalink-hal-rp2040`) implement them; `fpgalink-core` only ever talks
//! to these traits, which keeps the bridge logic testable on the host.
//!
//! # Architecture
//!
//! ```text
//!   FPGA ──UART──► PeerRx ──► fpgalink-core ──► HostTx ──USB──► host
//!   FPGA ◄─UART─── PeerTx ◄── fpgalink-core ◄────────── USB──── host
//! ```
//!
//! # Traits
//!
//! - [`uart::PeerRx`], [`uart::PeerTx`] - Peer (UART) side
//! - [`usb::HostTx`] - Host (USB CDC-ACM) side
//! - [`gpio::OutputPin`] - Status LED

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;
pub mod usb;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use uart::{PeerRx, PeerRxError, PeerTx, PeerTxError, TxLimit};
pub use usb::{transfer_packets, HostTx, HostTxError, TransferPackets};
