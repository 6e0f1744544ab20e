//! Start-up configuration
//!
//! The configuration is compiled in from `bridge.toml`. `build.rs` has
//! already validated it, so a parse failure here means the on-target parser
//! and the build-time validator disagree; the bridge then runs on defaults.

use defmt::*;

use fpgalink_core::config::UsbIdentity;
use fpgalink_core::{parse_config, BridgeConfig};

/// Embedded configuration (compiled into firmware)
/// Edit bridge.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../bridge.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load_config() -> BridgeConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config: {} baud, overflow={}, sizing={}, retry={}, tx_limit={}",
                config.uart.baudrate,
                config.ring.overflow,
                config.ring.chunk_sizing,
                config.flush.retry,
                config.egress.tx_limit()
            );
            config
        }
        Err(e) => {
            error!(
                "bridge.toml line {}: {:?}, using defaults",
                e.line, e.kind
            );
            BridgeConfig::default()
        }
    }
}

/// USB device descriptor settings for the CDC-ACM function
pub fn usb_config(identity: &UsbIdentity) -> embassy_usb::Config<'_> {
    let mut config = embassy_usb::Config::new(identity.vid, identity.pid);
    config.manufacturer = Some(identity.manufacturer.as_str());
    config.product = Some(identity.product.as_str());
    config.serial_number = Some(identity.serial_number.as_str());
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}
