//! RP2040 adapters for the fpgalink bridge
//!
//! Implements the `fpgalink-hal` traits on top of embassy drivers:
//!
//! - [`uart::UartPeerRx`], [`uart::UartPeerTx`] - buffered UART0/UART1
//! - [`usb::CdcHostTx`] - CDC-ACM sender from `embassy-usb`
//! - [`gpio::LedPin`] - any `embedded-hal` stateful output

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;
pub mod usb;

pub use gpio::LedPin;
pub use uart::{uart_config, UartPeerRx, UartPeerTx};
pub use usb::CdcHostTx;
