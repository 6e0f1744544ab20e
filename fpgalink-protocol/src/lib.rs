//! Controller ↔ soft-core command protocol
//!
//! The bridge forwards bytes without looking at them. This crate defines
//! what the host controller and the i8080 soft core on the FPGA say to each
//! other over that transparent pipe.
//!
//! # Host → device
//!
//! ```text
//! ┌────────┬──────────────────────────────────────────────┐
//! │ OPCODE │ ARGUMENTS                                    │
//! ├────────┼──────────────────────────────────────────────┤
//! │ 0x01   │ LEN_HI LEN_LO IMAGE[LEN-1] … IMAGE[0]        │  write dump
//! │ 0x02   │ ADDR_HI ADDR_LO VALUE                        │  write byte
//! │ 0x03   │ ADDR_HI ADDR_LO                              │  read byte
//! │ 0x04   │ (none)                                       │  reset
//! └────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Device → host
//!
//! `0x01` ack, `0x02 BYTE` read result, `0x05` print-time request; every
//! other byte is console output from the soft core.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod event;

pub use command::{Command, ProtocolError, MAX_IMAGE_SIZE};
pub use event::{DeviceEvent, EventParser};
