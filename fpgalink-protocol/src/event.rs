//! Device → host event decoding

/// Event opcodes
pub mod opcode {
    pub const ACK: u8 = 0x01;
    pub const RESULT: u8 = 0x02;
    pub const PRINT_TIME: u8 = 0x05;
}

/// Something the device said
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    /// Current command finished
    Ack,
    /// One byte of command output
    Result(u8),
    /// Soft core asks the host to print its wall clock
    PrintTime,
    /// Console output from the soft core
    Output(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Idle,
    /// Got RESULT, waiting for its data byte
    AwaitingResult,
}

/// Incremental event decoder
///
/// Bytes arrive in arbitrary slices from the serial port; a result opcode
/// split from its data byte is completed by the next feed.
#[derive(Debug, Clone)]
pub struct EventParser {
    state: ParseState,
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EventParser {
    /// Create a parser in the idle state
    pub const fn new() -> Self {
        Self {
            state: ParseState::Idle,
        }
    }

    /// Reset to the idle state, dropping any half-received result
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
    }

    /// True while a result opcode is waiting for its data byte
    pub fn is_pending(&self) -> bool {
        self.state == ParseState::AwaitingResult
    }

    /// Feed a single byte
    pub fn feed(&mut self, byte: u8) -> Option<DeviceEvent> {
        match self.state {
            ParseState::AwaitingResult => {
                self.state = ParseState::Idle;
                Some(DeviceEvent::Result(byte))
            }
            ParseState::Idle => match byte {
                opcode::ACK => Some(DeviceEvent::Ack),
                opcode::RESULT => {
                    self.state = ParseState::AwaitingResult;
                    None
                }
                opcode::PRINT_TIME => Some(DeviceEvent::PrintTime),
                other => Some(DeviceEvent::Output(other)),
            },
        }
    }

    /// Decode every complete event in `bytes`, in order
    pub fn feed_bytes<'p, 'b>(&'p mut self, bytes: &'b [u8]) -> Events<'p, 'b> {
        Events {
            parser: self,
            bytes: bytes.iter(),
        }
    }
}

/// Iterator returned by [`EventParser::feed_bytes`]
pub struct Events<'p, 'b> {
    parser: &'p mut EventParser,
    bytes: core::slice::Iter<'b, u8>,
}

impl Iterator for Events<'_, '_> {
    type Item = DeviceEvent;

    fn next(&mut self) -> Option<DeviceEvent> {
        for &byte in self.bytes.by_ref() {
            if let Some(event) = self.parser.feed(byte) {
                return Some(event);
            }
        }
        None
    }
}
