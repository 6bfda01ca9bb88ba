use bitflags::bitflags;

use super::{force_value, NO_FIELDS};
use crate::{
    field::{
        concat_fields, BitMember, Field, FieldDef, IntRepr, ListCount, ValidValues, Value,
    },
    message::MessageKind,
    msg_id::MsgId,
};

bitflags! {
    /// Protocols a port accepts
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct InProtoMask: u16 {
        const UBX = 0x01;
        const NMEA = 0x02;
        const RTCM = 0x04;
    }
}

bitflags! {
    /// Protocols a port emits
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct OutProtoMask: u16 {
        const UBX = 0x01;
        const NMEA = 0x02;
    }
}

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct CfgPrtFlags: u16 {
        /// Extended TX timeout
        const EXTENDED_TX_TIMEOUT = 0x02;
    }
}

bitflags! {
    /// `flags` of CFG-TP5
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct CfgTp5Flags: u32 {
        const ACTIVE = 0x01;
        const LOCK_GPS_FREQ = 0x02;
        const LOCKED_OTHER_SET = 0x04;
        const IS_FREQ = 0x08;
        const IS_LENGTH = 0x10;
        const ALIGN_TO_TOW = 0x20;
        const POLARITY = 0x40;
        const GRID_UTC_GPS = 0x80;
    }
}

bitflags! {
    /// Battery backed RAM sections cleared by CFG-RST
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct NavBbrMask: u16 {
        const EPHEMERIS = 0x0001;
        const ALMANAC = 0x0002;
        const HEALTH = 0x0004;
        const KLOBUCHAR = 0x0008;
        const POSITION = 0x0010;
        const CLOCK_DRIFT = 0x0020;
        const OSCILLATOR = 0x0040;
        const UTC = 0x0080;
        const RTC = 0x0100;
        const AOP = 0x8000;
    }
}

/// Port identifiers of CFG-PRT
pub mod port {
    pub const DDC: i64 = 0;
    pub const UART1: i64 = 1;
    pub const UART2: i64 = 2;
    pub const USB: i64 = 3;
    pub const SPI: i64 = 4;
}

const U1: Field = Field::u1();

// CFG-MSG

const CFG_MSG_POLL_FIELDS: &[FieldDef] = &[FieldDef::new("id", Field::msg_id())];
const CFG_MSG_CURRENT_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", Field::msg_id()),
    FieldDef::new("rate", Field::u1()),
];
const CFG_MSG_ALL_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", Field::msg_id()),
    FieldDef::new("rate", Field::list(&U1, ListCount::Fixed(6))),
];

pub static CFG_MSG_POLL: MessageKind =
    MessageKind::new("CFG-MSG-POLL", MsgId::CFG_MSG, CFG_MSG_POLL_FIELDS);
/// Rate of one message on the port the request arrives on
pub static CFG_MSG_CURRENT: MessageKind =
    MessageKind::new("CFG-MSG-CURRENT", MsgId::CFG_MSG, CFG_MSG_CURRENT_FIELDS);
/// Rate of one message on each of the six I/O ports
pub static CFG_MSG: MessageKind = MessageKind::new("CFG-MSG", MsgId::CFG_MSG, CFG_MSG_ALL_FIELDS);

// CFG-PRT

const CFG_PRT_POLL_PORT_FIELDS: &[FieldDef] = &[FieldDef::new(
    "portID",
    Field::enum_range(IntRepr::U1, port::DDC, port::SPI),
)];

pub static CFG_PRT_POLL: MessageKind = MessageKind::new("CFG-PRT-POLL", MsgId::CFG_PRT, NO_FIELDS);
pub static CFG_PRT_POLL_PORT: MessageKind =
    MessageKind::new("CFG-PRT-POLL-PORT", MsgId::CFG_PRT, CFG_PRT_POLL_PORT_FIELDS);

const TX_READY_MEMBERS: &[BitMember] = &[
    BitMember::flag("en"),
    BitMember::flag("pol"),
    BitMember::uint("pin", 5),
    BitMember::uint("thres", 9),
];

const UART_MODE_MEMBERS: &[BitMember] = &[
    BitMember::reserved(6),
    BitMember::enumeration("charLen", 2, ValidValues::Range { min: 0, max: 3 }),
    BitMember::reserved(1),
    BitMember::enumeration("parity", 3, ValidValues::Set(&[0, 1, 4, 5])),
    BitMember::enumeration("nStopBits", 2, ValidValues::Range { min: 0, max: 3 }),
    BitMember::reserved(18),
];

const SPI_MODE_MEMBERS: &[BitMember] = &[
    BitMember::reserved(1),
    BitMember::enumeration("spiMode", 2, ValidValues::Range { min: 0, max: 3 }),
    BitMember::reserved(3),
    BitMember::enumeration("flowControl", 1, ValidValues::Range { min: 0, max: 1 }),
    BitMember::reserved(1),
    BitMember::uint("ffCnt", 8),
    BitMember::reserved(16),
];

const DDC_MODE_MEMBERS: &[BitMember] = &[
    BitMember::reserved(1),
    BitMember::enumeration("slaveAddr", 7, ValidValues::Range { min: 0x07, max: 0x78 }),
    BitMember::reserved(24),
];

const TX_READY: FieldDef = FieldDef::new("txReady", Field::bitfield(IntRepr::U2, TX_READY_MEMBERS));
const RESERVED0: FieldDef = FieldDef::new("reserved0", Field::u1());

/// Fields every port variant ends with
const PRT_TAIL: [FieldDef; 4] = [
    FieldDef::new(
        "inProtoMask",
        Field::bitmask(IntRepr::U2, !InProtoMask::all().bits() as u64),
    ),
    FieldDef::new(
        "outProtoMask",
        Field::bitmask(IntRepr::U2, !OutProtoMask::all().bits() as u64),
    ),
    FieldDef::new(
        "flags",
        Field::bitmask(IntRepr::U2, !CfgPrtFlags::all().bits() as u64),
    ),
    FieldDef::new("reserved5", Field::u2()),
];

const DDC_HEAD: [FieldDef; 5] = [
    FieldDef::new("portID", Field::enum_set(IntRepr::U1, &[port::DDC])),
    RESERVED0,
    TX_READY,
    FieldDef::new("mode", Field::bitfield(IntRepr::U4, DDC_MODE_MEMBERS)),
    FieldDef::new("reserved3", Field::u4()),
];

const UART_HEAD: [FieldDef; 5] = [
    FieldDef::new(
        "portID",
        Field::enum_set(IntRepr::U1, &[port::UART1, port::UART2]),
    ),
    RESERVED0,
    TX_READY,
    FieldDef::new("mode", Field::bitfield(IntRepr::U4, UART_MODE_MEMBERS)),
    FieldDef::new("baudRate", Field::u4()),
];

const USB_HEAD: [FieldDef; 5] = [
    FieldDef::new("portID", Field::enum_set(IntRepr::U1, &[port::USB])),
    RESERVED0,
    TX_READY,
    FieldDef::new("reserved2", Field::u4()),
    FieldDef::new("reserved3", Field::u4()),
];

const SPI_HEAD: [FieldDef; 5] = [
    FieldDef::new("portID", Field::enum_set(IntRepr::U1, &[port::SPI])),
    RESERVED0,
    TX_READY,
    FieldDef::new("mode", Field::bitfield(IntRepr::U4, SPI_MODE_MEMBERS)),
    FieldDef::new("reserved3", Field::u4()),
];

const DDC_FIELDS: [FieldDef; 9] = concat_fields(DDC_HEAD, PRT_TAIL);
const UART_FIELDS: [FieldDef; 9] = concat_fields(UART_HEAD, PRT_TAIL);
const USB_FIELDS: [FieldDef; 9] = concat_fields(USB_HEAD, PRT_TAIL);
const SPI_FIELDS: [FieldDef; 9] = concat_fields(SPI_HEAD, PRT_TAIL);

fn port_is<const P: i64>(value: &Value) -> bool {
    value.as_int() == Some(P)
}

fn port_is_uart(value: &Value) -> bool {
    matches!(value.as_int(), Some(port::UART1 | port::UART2))
}

fn force_port<const P: i64>(values: &mut [Value]) -> bool {
    force_value(values, 0, P)
}

fn force_uart_port(values: &mut [Value]) -> bool {
    if values.first().is_some_and(port_is_uart) {
        return false;
    }
    force_value(values, 0, port::UART1)
}

pub static CFG_PRT_DDC: MessageKind = MessageKind::new("CFG-PRT-DDC", MsgId::CFG_PRT, &DDC_FIELDS)
    .with_guard(0, port_is::<{ port::DDC }>)
    .with_refresh(force_port::<{ port::DDC }>);

pub static CFG_PRT_UART: MessageKind =
    MessageKind::new("CFG-PRT-UART", MsgId::CFG_PRT, &UART_FIELDS)
        .with_guard(0, port_is_uart)
        .with_refresh(force_uart_port);

pub static CFG_PRT_USB: MessageKind = MessageKind::new("CFG-PRT-USB", MsgId::CFG_PRT, &USB_FIELDS)
    .with_guard(0, port_is::<{ port::USB }>)
    .with_refresh(force_port::<{ port::USB }>);

pub static CFG_PRT_SPI: MessageKind = MessageKind::new("CFG-PRT-SPI", MsgId::CFG_PRT, &SPI_FIELDS)
    .with_guard(0, port_is::<{ port::SPI }>)
    .with_refresh(force_port::<{ port::SPI }>);

// CFG-RATE

const CFG_RATE_FIELDS: &[FieldDef] = &[
    FieldDef::new("measRate", Field::int_range(IntRepr::U2, 1, 0xffff)),
    FieldDef::new("navRate", Field::int_range(IntRepr::U2, 1, 1)),
    FieldDef::new("timeRef", Field::enum_range(IntRepr::U2, 0, 1)),
];

pub static CFG_RATE_POLL: MessageKind =
    MessageKind::new("CFG-RATE-POLL", MsgId::CFG_RATE, NO_FIELDS);
pub static CFG_RATE: MessageKind = MessageKind::new("CFG-RATE", MsgId::CFG_RATE, CFG_RATE_FIELDS);

// CFG-RST

const CFG_RST_FIELDS: &[FieldDef] = &[
    FieldDef::new(
        "navBbrMask",
        Field::bitmask(IntRepr::U2, !NavBbrMask::all().bits() as u64),
    ),
    FieldDef::new(
        "resetMode",
        Field::enum_set(IntRepr::U1, &[0x00, 0x01, 0x02, 0x04, 0x08, 0x09]),
    ),
    FieldDef::new("reserved1", Field::u1()),
];

pub static CFG_RST: MessageKind = MessageKind::new("CFG-RST", MsgId::CFG_RST, CFG_RST_FIELDS);

// CFG-TP5

const TP_IDX: Field = Field::enum_range(IntRepr::U1, 0, 1);

const CFG_TP5_POLL_IDX_FIELDS: &[FieldDef] = &[FieldDef::new("tpIdx", TP_IDX)];

const CFG_TP5_FIELDS: &[FieldDef] = &[
    FieldDef::new("tpIdx", TP_IDX),
    FieldDef::new("reserved0", Field::u1()),
    FieldDef::new("reserved1", Field::u2()),
    FieldDef::new("antCableDelay", Field::i2()),
    FieldDef::new("rfGroupDelay", Field::i2()),
    FieldDef::new("freqPeriod", Field::u4()),
    FieldDef::new("freqPeriodLock", Field::u4()),
    FieldDef::new("pulseLenRatio", Field::u4()),
    FieldDef::new("pulseLenRatioLock", Field::u4()),
    FieldDef::new("userConfigDelay", Field::i4()),
    FieldDef::new(
        "flags",
        Field::bitmask(IntRepr::U4, !CfgTp5Flags::all().bits() as u64),
    ),
];

pub static CFG_TP5_POLL: MessageKind = MessageKind::new("CFG-TP5-POLL", MsgId::CFG_TP5, NO_FIELDS);
pub static CFG_TP5_POLL_IDX: MessageKind =
    MessageKind::new("CFG-TP5-POLL-IDX", MsgId::CFG_TP5, CFG_TP5_POLL_IDX_FIELDS);
pub static CFG_TP5: MessageKind = MessageKind::new("CFG-TP5", MsgId::CFG_TP5, CFG_TP5_FIELDS);

pub static CFG_TMODE2_POLL: MessageKind =
    MessageKind::new("CFG-TMODE2-POLL", MsgId::CFG_TMODE2, NO_FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{message::Message, ParserError};

    fn spi_payload(port: u8) -> [u8; 20] {
        let mut payload = [0u8; 20];
        payload[0] = port;
        // spiMode 2, flowControl on, ffCnt 0x30
        payload[4..8].copy_from_slice(&((2u32 << 1) | (1 << 6) | (0x30 << 8)).to_le_bytes());
        payload[12] = InProtoMask::UBX.bits() as u8;
        payload[14] = (OutProtoMask::UBX | OutProtoMask::NMEA).bits() as u8;
        payload
    }

    #[test]
    fn spi_variant_reads_mode_members() {
        let msg = Message::decode_payload(&CFG_PRT_SPI, &spi_payload(4)).unwrap();
        assert!(msg.valid());
        assert_eq!(msg.bit("mode", "spiMode"), Some(2));
        assert_eq!(msg.bit("mode", "flowControl"), Some(1));
        assert_eq!(msg.bit("mode", "ffCnt"), Some(0x30));
        assert_eq!(msg.get_as::<u16>("outProtoMask"), Some(3));
    }

    #[test]
    fn port_guard_stops_decoding() {
        assert_eq!(
            Message::decode_payload(&CFG_PRT_SPI, &spi_payload(1)),
            Err(ParserError::InvalidField {
                packet: "CFG-PRT-SPI",
                field: "portID"
            })
        );
        // the guard fires before the short payload is noticed
        assert!(matches!(
            Message::decode_payload(&CFG_PRT_SPI, &[1, 0]),
            Err(ParserError::InvalidField { .. })
        ));
    }

    #[test]
    fn spi_refresh_is_idempotent() {
        let mut msg = Message::new(&CFG_PRT_SPI);
        assert_eq!(msg.field("portID"), Some(&Value::Int(port::SPI)));
        let before = msg.clone();
        assert!(!msg.refresh());
        assert_eq!(msg, before);

        msg.set("portID", 3u8);
        assert!(msg.refresh());
        assert_eq!(msg, before);
        assert!(!msg.refresh());
    }

    #[test]
    fn uart_refresh_keeps_either_uart() {
        let mut msg = Message::new(&CFG_PRT_UART);
        msg.set("portID", 2u8);
        assert!(!msg.refresh());
        msg.set("portID", 4u8);
        assert!(msg.refresh());
        assert_eq!(msg.get_as::<u8>("portID"), Some(1));
    }

    #[test]
    fn port_variants_share_the_tail() {
        for kind in [&CFG_PRT_DDC, &CFG_PRT_UART, &CFG_PRT_USB, &CFG_PRT_SPI] {
            assert_eq!(kind.fields().len(), 9);
            assert_eq!(kind.min_payload_len(), 20);
            assert_eq!(kind.field_index("inProtoMask"), Some(5));
            assert_eq!(kind.field_index("reserved5"), Some(8));
        }
    }

    #[test]
    fn proto_mask_reserved_bits() {
        let mut msg = Message::new(&CFG_PRT_USB);
        msg.set("inProtoMask", 0x0008u16);
        assert!(!msg.valid());
        msg.set("inProtoMask", (InProtoMask::UBX | InProtoMask::RTCM).bits());
        assert!(msg.valid());
    }
}
