//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Load a ROM image into the FPGA soft core, start it and show its output
#[derive(Debug, Parser)]
#[command(name = "fpgalink", version)]
pub struct Args {
    /// Serial port of the bridge
    #[arg(long, default_value = "/dev/ttyACM0")]
    pub port: String,

    /// Line speed (ignored by a CDC-ACM bridge, kept for real UARTs)
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,

    /// ROM image to load at address 0
    #[arg(long)]
    pub rom: PathBuf,

    /// Read the image back byte by byte before starting the CPU
    #[arg(long)]
    pub verify: bool,

    /// How long to wait for the device to acknowledge a command
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Patch a byte after loading, as ADDR=VALUE (decimal or 0x hex); repeatable
    #[arg(long, value_name = "ADDR=VALUE", value_parser = parse_poke)]
    pub poke: Vec<(u16, u8)>,
}

fn parse_poke(raw: &str) -> Result<(u16, u8), String> {
    let (addr, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got '{}'", raw))?;
    let addr = parse_number(addr.trim())
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| format!("invalid address '{}'", addr))?;
    let value = parse_number(value.trim())
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| format!("invalid byte value '{}'", value))?;
    Ok((addr, value))
}

fn parse_number(raw: &str) -> Option<u32> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["fpgalink", "--rom", "hello.bin"]).unwrap();
        assert_eq!(args.port, "/dev/ttyACM0");
        assert_eq!(args.baud, 115_200);
        assert_eq!(args.rom, PathBuf::from("hello.bin"));
        assert!(!args.verify);
        assert_eq!(args.timeout_ms, 5_000);
        assert!(args.poke.is_empty());
    }

    #[test]
    fn test_poke_values() {
        let args = Args::try_parse_from([
            "fpgalink", "--rom", "a.bin", "--poke", "0x0010=0x76", "--poke", "32=255",
        ])
        .unwrap();
        assert_eq!(args.poke, [(0x0010, 0x76), (32, 255)]);
    }

    #[test]
    fn test_poke_rejects_out_of_range() {
        assert!(Args::try_parse_from(["fpgalink", "--rom", "a.bin", "--poke", "0x10000=1"]).is_err());
        assert!(Args::try_parse_from(["fpgalink", "--rom", "a.bin", "--poke", "1=256"]).is_err());
        assert!(Args::try_parse_from(["fpgalink", "--rom", "a.bin", "--poke", "12"]).is_err());
    }

    #[test]
    fn test_rom_is_required() {
        assert!(Args::try_parse_from(["fpgalink"]).is_err());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "fpgalink",
            "--port",
            "COM19",
            "--baud",
            "9600",
            "--rom",
            "test.rom",
            "--verify",
            "--timeout-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(args.port, "COM19");
        assert_eq!(args.baud, 9600);
        assert!(args.verify);
        assert_eq!(args.timeout_ms, 250);
    }
}
