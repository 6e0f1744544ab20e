//! Host → device command encoding

/// Largest image a dump can carry (16-bit length field)
pub const MAX_IMAGE_SIZE: usize = u16::MAX as usize;

/// Command opcodes
pub mod opcode {
    pub const WRITE_DUMP: u8 = 0x01;
    pub const WRITE_BYTE: u8 = 0x02;
    pub const READ_BYTE: u8 = 0x03;
    pub const RESET: u8 = 0x04;
}

/// Errors from command encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Image exceeds [`MAX_IMAGE_SIZE`]
    ImageTooLarge,
    /// Output buffer too small for the encoded command
    BufferTooSmall,
}

/// A command for the soft core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Load a memory image starting at address 0
    ///
    /// The image is sent last byte first; the device fills memory from the
    /// top down.
    WriteDump { image: &'a [u8] },
    /// Store one byte
    WriteByte { addr: u16, value: u8 },
    /// Fetch one byte; answered with a result event before the ack
    ReadByte { addr: u16 },
    /// Reset the CPU and start executing
    Reset,
}

impl Command<'_> {
    /// Opcode byte
    pub fn opcode(&self) -> u8 {
        match self {
            Command::WriteDump { .. } => opcode::WRITE_DUMP,
            Command::WriteByte { .. } => opcode::WRITE_BYTE,
            Command::ReadByte { .. } => opcode::READ_BYTE,
            Command::Reset => opcode::RESET,
        }
    }

    /// Number of bytes [`Command::encode`] writes
    pub fn encoded_len(&self) -> usize {
        match self {
            Command::WriteDump { image } => 3 + image.len(),
            Command::WriteByte { .. } => 4,
            Command::ReadByte { .. } => 3,
            Command::Reset => 1,
        }
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        if let Command::WriteDump { image } = self {
            if image.len() > MAX_IMAGE_SIZE {
                return Err(ProtocolError::ImageTooLarge);
            }
        }

        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(ProtocolError::BufferTooSmall);
        }

        buffer[0] = self.opcode();
        match *self {
            Command::WriteDump { image } => {
                let [hi, lo] = (image.len() as u16).to_be_bytes();
                buffer[1] = hi;
                buffer[2] = lo;
                for (dst, &src) in buffer[3..len].iter_mut().zip(image.iter().rev()) {
                    *dst = src;
                }
            }
            Command::WriteByte { addr, value } => {
                buffer[1..3].copy_from_slice(&addr.to_be_bytes());
                buffer[3] = value;
            }
            Command::ReadByte { addr } => {
                buffer[1..3].copy_from_slice(&addr.to_be_bytes());
            }
            Command::Reset => {}
        }

        Ok(len)
    }

    /// True if the device answers with result bytes before its ack
    pub fn expects_result(&self) -> bool {
        matches!(self, Command::ReadByte { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_dump_reversed_with_length() {
        let image = [0x3E, 0x41, 0xD3, 0x00, 0x76];
        let cmd = Command::WriteDump { image: &image };
        let mut buf = [0u8; 16];
        let len = cmd.encode(&mut buf).unwrap();

        assert_eq!(len, 8);
        assert_eq!(&buf[..len], &[0x01, 0x00, 0x05, 0x76, 0x00, 0xD3, 0x41, 0x3E]);
    }

    #[test]
    fn test_write_dump_length_big_endian() {
        let image = [0u8; 0x0123];
        let mut buf = [0u8; 0x0123 + 3];
        Command::WriteDump { image: &image }.encode(&mut buf).unwrap();
        assert_eq!(&buf[..3], &[0x01, 0x01, 0x23]);
    }

    #[test]
    fn test_read_byte() {
        let mut buf = [0u8; 3];
        let len = Command::ReadByte { addr: 0x1F40 }.encode(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[0x03, 0x1F, 0x40]);
    }

    #[test]
    fn test_write_byte() {
        let mut buf = [0u8; 8];
        let len = Command::WriteByte {
            addr: 0x0002,
            value: 0xC3,
        }
        .encode(&mut buf)
        .unwrap();
        assert_eq!(&buf[..len], &[0x02, 0x00, 0x02, 0xC3]);
    }

    #[test]
    fn test_reset() {
        let mut buf = [0u8; 1];
        assert_eq!(Command::Reset.encode(&mut buf), Ok(1));
        assert_eq!(buf, [0x04]);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; 2];
        assert_eq!(
            Command::ReadByte { addr: 0 }.encode(&mut buf),
            Err(ProtocolError::BufferTooSmall)
        );
    }

    #[test]
    fn test_image_too_large() {
        let image = std::vec![0u8; MAX_IMAGE_SIZE + 1];
        let mut buf = std::vec![0u8; image.len() + 3];
        assert_eq!(
            Command::WriteDump { image: &image }.encode(&mut buf),
            Err(ProtocolError::ImageTooLarge)
        );
    }

    #[test]
    fn test_only_read_expects_result() {
        assert!(Command::ReadByte { addr: 0 }.expects_result());
        assert!(!Command::Reset.expects_result());
        assert!(!Command::WriteDump { image: &[] }.expects_result());
    }
}
