//! Minimal `bridge.toml` parser
//!
//! Handles only the subset needed for bridge configuration, without
//! allocation, so it can run on the target at start-up.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` with integer (decimal, `0x` hex, `_` separators),
//!   boolean and double-quoted string values
//! - `#` comments, whole-line or trailing
//!
//! NOT supported: escapes in strings, arrays, inline tables, dotted keys.
//! Keys missing from the file keep their default value.

use heapless::String;

use crate::bridge::RetryPolicy;
use crate::ring::{ChunkSizing, OverflowPolicy};

use super::types::{BridgeConfig, MAX_USB_STRING_LEN};

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Line is neither a header nor `key = value`
    MalformedLine,
    /// Section name not recognised
    UnknownSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String longer than a USB descriptor allows
    StringTooLong,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Uart,
    Ring,
    Flush,
    Egress,
    Heartbeat,
    Usb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value<'a> {
    Int(u64),
    Bool(bool),
    Str(&'a str),
}

impl<'a> Value<'a> {
    fn parse(raw: &'a str) -> Result<Self, ParseErrorKind> {
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Ok(Value::Str(&raw[1..raw.len() - 1]));
        }
        match raw {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        parse_int(raw)
            .map(Value::Int)
            .ok_or(ParseErrorKind::InvalidValue)
    }

    fn as_u32(self) -> Result<u32, ParseErrorKind> {
        match self {
            Value::Int(v) => u32::try_from(v).map_err(|_| ParseErrorKind::InvalidValue),
            _ => Err(ParseErrorKind::InvalidValue),
        }
    }

    fn as_u16(self) -> Result<u16, ParseErrorKind> {
        match self {
            Value::Int(v) => u16::try_from(v).map_err(|_| ParseErrorKind::InvalidValue),
            _ => Err(ParseErrorKind::InvalidValue),
        }
    }

    fn as_str(self) -> Result<&'a str, ParseErrorKind> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(ParseErrorKind::InvalidValue),
        }
    }

    fn as_usb_string(self) -> Result<String<MAX_USB_STRING_LEN>, ParseErrorKind> {
        let mut out = String::new();
        out.push_str(self.as_str()?)
            .map_err(|_| ParseErrorKind::StringTooLong)?;
        Ok(out)
    }
}

/// Parse `bridge.toml` text into a [`BridgeConfig`]
pub fn parse_config(input: &str) -> Result<BridgeConfig, ParseError> {
    let mut config = BridgeConfig::new();
    let mut section = Section::Root;

    for (idx, raw) in input.lines().enumerate() {
        let line = strip_comment(raw).trim();
        let fail = |kind| ParseError { line: idx + 1, kind };

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(fail(ParseErrorKind::MalformedLine))?;
            section = parse_section_header(name.trim()).ok_or(fail(ParseErrorKind::UnknownSection))?;
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(fail(ParseErrorKind::MalformedLine))?;
        let value = Value::parse(value.trim()).map_err(fail)?;
        apply(&mut config, section, key.trim(), value).map_err(fail)?;
    }

    Ok(config)
}

fn parse_section_header(name: &str) -> Option<Section> {
    match name {
        "uart" => Some(Section::Uart),
        "ring" => Some(Section::Ring),
        "flush" => Some(Section::Flush),
        "egress" => Some(Section::Egress),
        "heartbeat" => Some(Section::Heartbeat),
        "usb" => Some(Section::Usb),
        _ => None,
    }
}

fn apply(
    config: &mut BridgeConfig,
    section: Section,
    key: &str,
    value: Value<'_>,
) -> Result<(), ParseErrorKind> {
    match (section, key) {
        (Section::Uart, "baudrate") => {
            let baud = value.as_u32()?;
            if baud == 0 {
                return Err(ParseErrorKind::InvalidValue);
            }
            config.uart.baudrate = baud;
        }
        (Section::Ring, "overflow") => {
            config.ring.overflow = match value.as_str()? {
                "overwrite_oldest" => OverflowPolicy::OverwriteOldest,
                "reject_new" => OverflowPolicy::RejectNew,
                _ => return Err(ParseErrorKind::InvalidValue),
            };
        }
        (Section::Ring, "chunk_sizing") => {
            config.ring.chunk_sizing = match value.as_str()? {
                "contiguous_run" => ChunkSizing::ContiguousRun,
                "full_backlog" => ChunkSizing::FullBacklog,
                _ => return Err(ParseErrorKind::InvalidValue),
            };
        }
        (Section::Flush, "retry_limit") => {
            config.flush.retry = RetryPolicy::from_limit(value.as_u32()?);
        }
        (Section::Flush, "attempt_timeout_ms") => {
            config.flush.attempt_timeout_ms = value.as_u32()?;
        }
        (Section::Egress, "tx_timeout_ms") => {
            config.egress.tx_timeout_ms = value.as_u32()?;
        }
        (Section::Heartbeat, "period_ms") => {
            config.heartbeat.period_ms = value.as_u32()?;
        }
        (Section::Usb, "vid") => config.usb.vid = value.as_u16()?,
        (Section::Usb, "pid") => config.usb.pid = value.as_u16()?,
        (Section::Usb, "manufacturer") => config.usb.manufacturer = value.as_usb_string()?,
        (Section::Usb, "product") => config.usb.product = value.as_usb_string()?,
        (Section::Usb, "serial_number") => config.usb.serial_number = value.as_usb_string()?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing `# comment`, ignoring `#` inside strings
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_int(raw: &str) -> Option<u64> {
    let (digits, radix) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (raw, 10),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return None;
    }

    let mut value: u64 = 0;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(radix)?;
        value = value.checked_mul(radix as u64)?.checked_add(digit as u64)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpgalink_hal::TxLimit;

    const SAMPLE: &str = r#"
# Bridge configuration
[uart]
baudrate = 921_600

[ring]
overflow = "reject_new"       # keep backlog
chunk_sizing = "full_backlog"

[flush]
retry_limit = 500
attempt_timeout_ms = 250

[egress]
tx_timeout_ms = 100

[heartbeat]
period_ms = 500

[usb]
vid = 0x1209
pid = 0x0001
manufacturer = "Lab #7"
product = "i8080 loader"
serial_number = "A1"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.uart.baudrate, 921_600);
        assert_eq!(config.ring.overflow, OverflowPolicy::RejectNew);
        assert_eq!(config.ring.chunk_sizing, ChunkSizing::FullBacklog);
        assert_eq!(config.flush.retry, RetryPolicy::Limited(500));
        assert_eq!(config.flush.attempt_limit(), TxLimit::Millis(250));
        assert_eq!(config.egress.tx_limit(), TxLimit::Millis(100));
        assert_eq!(config.heartbeat.period_ms, 500);
        assert_eq!(config.usb.vid, 0x1209);
        assert_eq!(config.usb.pid, 0x0001);
        assert_eq!(config.usb.manufacturer.as_str(), "Lab #7");
        assert_eq!(config.usb.product.as_str(), "i8080 loader");
        assert_eq!(config.usb.serial_number.as_str(), "A1");
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.flush.retry, RetryPolicy::Unbounded);
        assert_eq!(config.egress.tx_limit(), TxLimit::Unbounded);
        assert_eq!(config.ring.overflow, OverflowPolicy::OverwriteOldest);
        assert_eq!(config.ring.chunk_sizing, ChunkSizing::ContiguousRun);
    }

    #[test]
    fn test_shipped_firmware_config_parses() {
        let shipped = include_str!("../../../fpgalink-firmware/bridge.toml");
        let config = parse_config(shipped).unwrap();
        assert_eq!(config.uart.baudrate, 115_200);
    }

    #[test]
    fn test_unknown_key_reports_line() {
        let err = parse_config("[uart]\nbaudrate = 9600\nparity = 1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError {
                line: 3,
                kind: ParseErrorKind::UnknownKey
            }
        );
    }

    #[test]
    fn test_key_outside_section_rejected() {
        let err = parse_config("baudrate = 9600").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownKey);
    }

    #[test]
    fn test_unknown_section() {
        let err = parse_config("[motor]\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownSection);
    }

    #[test]
    fn test_bad_policy_name() {
        let err = parse_config("[ring]\noverflow = \"drop_everything\"").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);
    }

    #[test]
    fn test_wrong_value_type() {
        let err = parse_config("[uart]\nbaudrate = \"fast\"").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);

        let err = parse_config("[usb]\nvid = 70000").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);
    }

    #[test]
    fn test_zero_baudrate_rejected() {
        let err = parse_config("[uart]\nbaudrate = 0").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);
    }

    #[test]
    fn test_string_too_long() {
        let err = parse_config("[usb]\nproduct = \"this product name is far too long to fit\"")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::StringTooLong);
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_config("[uart\n").unwrap_err().kind,
            ParseErrorKind::MalformedLine
        );
        assert_eq!(
            parse_config("[uart]\nbaudrate 9600\n").unwrap_err().kind,
            ParseErrorKind::MalformedLine
        );
    }

    #[test]
    fn test_zero_limits_mean_unbounded() {
        let config = parse_config("[flush]\nretry_limit = 0\n[egress]\ntx_timeout_ms = 0").unwrap();
        assert_eq!(config.flush.retry, RetryPolicy::Unbounded);
        assert_eq!(config.egress.tx_limit(), TxLimit::Unbounded);
    }

    #[test]
    fn test_parse_int_forms() {
        assert_eq!(parse_int("115200"), Some(115_200));
        assert_eq!(parse_int("115_200"), Some(115_200));
        assert_eq!(parse_int("0xFF"), Some(255));
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("_1"), None);
        assert_eq!(parse_int("-1"), None);
        assert_eq!(parse_int("99999999999999999999999"), None);
    }
}
