//! Configuration types
//!
//! Board-agnostic configuration, read from `bridge.toml` at start-up.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
