//! Build script for fpgalink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in each section, with the value type they expect
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    ("uart", &[("baudrate", Kind::Integer)]),
    (
        "ring",
        &[
            ("overflow", Kind::Choice(&["overwrite_oldest", "reject_new"])),
            ("chunk_sizing", Kind::Choice(&["contiguous_run", "full_backlog"])),
        ],
    ),
    (
        "flush",
        &[("retry_limit", Kind::Integer), ("attempt_timeout_ms", Kind::Integer)],
    ),
    ("egress", &[("tx_timeout_ms", Kind::Integer)]),
    ("heartbeat", &[("period_ms", Kind::Integer)]),
    (
        "usb",
        &[
            ("vid", Kind::Integer),
            ("pid", Kind::Integer),
            ("manufacturer", Kind::UsbString),
            ("product", Kind::UsbString),
            ("serial_number", Kind::UsbString),
        ],
    ),
];

/// Longest USB string descriptor value the firmware stores
const MAX_USB_STRING_LEN: usize = 32;

#[derive(Clone, Copy)]
enum Kind {
    Integer,
    Choice(&'static [&'static str]),
    UsbString,
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate bridge.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bridge.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds bridge.toml as its configuration.           ║\n\
            ║  Please create one in the fpgalink-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = validate_sections(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid bridge configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=bridge.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check every section and key against [`SCHEMA`]
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (section, body) in root {
        let keys = match SCHEMA.iter().find(|(name, _)| name == section) {
            Some((_, keys)) => *keys,
            None => {
                errors.push(format!("unknown section [{}]", section));
                continue;
            }
        };

        let body = match body.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        for (key, value) in body {
            match keys.iter().find(|(name, _)| name == key) {
                Some((_, kind)) => {
                    if let Some(e) = check_value(section, key, value, *kind) {
                        errors.push(e);
                    }
                }
                None => errors.push(format!("[{}] unknown key '{}'", section, key)),
            }
        }
    }

    // Range checks the schema cannot express
    if let Some(toml::Value::Integer(baud)) = config.get("uart").and_then(|u| u.get("baudrate")) {
        if *baud == 0 {
            errors.push("[uart] baudrate must be non-zero".to_string());
        }
    }
    for id in ["vid", "pid"] {
        if let Some(toml::Value::Integer(v)) = config.get("usb").and_then(|u| u.get(id)) {
            if *v > 0xFFFF {
                errors.push(format!("[usb] {} must fit in 16 bits", id));
            }
        }
    }

    errors
}

fn check_value(section: &str, key: &str, value: &toml::Value, kind: Kind) -> Option<String> {
    match (kind, value) {
        (Kind::Integer, toml::Value::Integer(n)) if *n < 0 || *n > i64::from(u32::MAX) => Some(
            format!("[{}] {} must be between 0 and {}", section, key, u32::MAX),
        ),
        (Kind::Integer, toml::Value::Integer(_)) => None,
        (Kind::Integer, _) => Some(format!("[{}] {} must be an integer", section, key)),
        (Kind::Choice(options), toml::Value::String(s)) if !options.contains(&s.as_str()) => {
            Some(format!(
                "[{}] {} must be one of {}",
                section,
                key,
                options.join(", ")
            ))
        }
        (Kind::UsbString, toml::Value::String(s)) if s.len() > MAX_USB_STRING_LEN => Some(
            format!("[{}] {} longer than {} bytes", section, key, MAX_USB_STRING_LEN),
        ),
        (Kind::Choice(_) | Kind::UsbString, toml::Value::String(_)) => None,
        (_, _) => Some(format!("[{}] {} must be a string", section, key)),
    }
}
