use core::fmt;

/// Coarse classification of a decode failure, telling the caller what to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// More bytes are needed, retry once they arrive
    InsufficientData,
    /// The sync pattern is missing, scan forward for the next sync byte
    ProtocolError,
    /// The frame is well formed but its content was rejected
    InvalidMsgData,
    /// The frame cannot fit into the parser buffer
    BufferOverflow,
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatus::InsufficientData => f.write_str("insufficient data"),
            ErrorStatus::ProtocolError => f.write_str("protocol error"),
            ErrorStatus::InvalidMsgData => f.write_str("invalid message data"),
            ErrorStatus::BufferOverflow => f.write_str("buffer overflow"),
        }
    }
}

/// Error that possible during packets parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    InsufficientData {
        required: usize,
        available: usize,
    },
    ProtocolError,
    InvalidChecksum {
        expect: u16,
        got: u16,
    },
    InvalidField {
        packet: &'static str,
        field: &'static str,
    },
    InvalidPacketLen {
        packet: &'static str,
        expect: usize,
        got: usize,
    },
    OutOfMemory {
        required_size: usize,
    },
}

impl ParserError {
    pub const fn status(&self) -> ErrorStatus {
        match self {
            ParserError::InsufficientData { .. } => ErrorStatus::InsufficientData,
            ParserError::ProtocolError => ErrorStatus::ProtocolError,
            ParserError::InvalidChecksum { .. }
            | ParserError::InvalidField { .. }
            | ParserError::InvalidPacketLen { .. } => ErrorStatus::InvalidMsgData,
            ParserError::OutOfMemory { .. } => ErrorStatus::BufferOverflow,
        }
    }

    /// `true` when feeding more bytes may turn this error into a success
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ParserError::InsufficientData { .. })
    }

    /// Rebase a shortage reported by a nested decoder onto the enclosing buffer
    pub(crate) fn offset_by(self, offset: usize) -> Self {
        match self {
            ParserError::InsufficientData {
                required,
                available,
            } => ParserError::InsufficientData {
                required: required + offset,
                available: available + offset,
            },
            other => other,
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::InsufficientData {
                required,
                available,
            } => write!(
                f,
                "Not enough data, need {} bytes, have {}",
                required, available
            ),
            ParserError::ProtocolError => f.write_str("Missing UBX sync characters"),
            ParserError::InvalidChecksum { expect, got } => write!(
                f,
                "Not valid packet's checksum, expect {:x}, got {:x}",
                expect, got
            ),
            ParserError::InvalidField { packet, field } => {
                write!(f, "Invalid field {} of packet {}", field, packet)
            },
            ParserError::InvalidPacketLen {
                packet,
                expect,
                got,
            } => write!(
                f,
                "Invalid packet({}) length, expect {}, got {}",
                packet, expect, got
            ),
            ParserError::OutOfMemory { required_size } => write!(
                f,
                "Not enough memory in buffer, {} bytes required",
                required_size
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParserError {}

/// Error that possible while writing packets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The output sink is full
    NotEnoughMem,
    /// A value does not have the shape or width its field requires
    ValueMismatch,
    InvalidValue {
        packet: &'static str,
        field: &'static str,
    },
    PayloadTooLarge {
        len: usize,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::NotEnoughMem => f.write_str("Not enough memory error"),
            EncodeError::ValueMismatch => f.write_str("Value does not fit its field"),
            EncodeError::InvalidValue { packet, field } => {
                write!(f, "Value of field {} of packet {} cannot be encoded", field, packet)
            },
            EncodeError::PayloadTooLarge { len } => {
                write!(f, "Payload of {} bytes does not fit a UBX frame", len)
            },
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    InvalidDate,
    InvalidTime,
    InvalidNanoseconds,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::InvalidDate => f.write_str("invalid date"),
            DateTimeError::InvalidTime => f.write_str("invalid time"),
            DateTimeError::InvalidNanoseconds => f.write_str("invalid nanoseconds"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DateTimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_groups_rejections() {
        assert_eq!(
            ParserError::InvalidChecksum { expect: 1, got: 2 }.status(),
            ErrorStatus::InvalidMsgData
        );
        assert_eq!(
            ParserError::InvalidField {
                packet: "CFG-PRT-SPI",
                field: "portID"
            }
            .status(),
            ErrorStatus::InvalidMsgData
        );
        assert_eq!(ParserError::ProtocolError.status(), ErrorStatus::ProtocolError);
        assert_eq!(
            ParserError::OutOfMemory { required_size: 300 }.status(),
            ErrorStatus::BufferOverflow
        );
    }

    #[test]
    fn only_short_input_is_retryable() {
        assert!(ParserError::InsufficientData {
            required: 8,
            available: 3
        }
        .is_retryable());
        assert!(!ParserError::ProtocolError.is_retryable());
    }
}
