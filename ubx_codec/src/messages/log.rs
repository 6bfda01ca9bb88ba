use bitflags::bitflags;

use super::NO_FIELDS;
use crate::{
    field::{Field, FieldDef, IntRepr, ListCount},
    message::MessageKind,
    msg_id::MsgId,
};

bitflags! {
    /// `logCfg` of LOG-CREATE
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct LogCfg: u8 {
        /// Overwrite the oldest entries once the log is full
        const CIRCULAR = 0x01;
    }
}

/// `logSize` of LOG-CREATE
pub mod log_size {
    pub const MAXIMUM: i64 = 0;
    pub const MINIMUM: i64 = 1;
    pub const USER_DEFINED: i64 = 2;
}

const BYTE: Field = Field::u1();

const LOG_CREATE_FIELDS: &[FieldDef] = &[
    FieldDef::new("version", Field::int_range(IntRepr::U1, 0, 0)),
    FieldDef::new(
        "logCfg",
        Field::bitmask(IntRepr::U1, !LogCfg::all().bits() as u64),
    ),
    FieldDef::new("reserved", Field::u1()),
    FieldDef::new(
        "logSize",
        Field::enum_range(IntRepr::U1, log_size::MAXIMUM, log_size::USER_DEFINED),
    ),
    FieldDef::new("userDefinedSize", Field::u4()),
];

const LOG_STRING_FIELDS: &[FieldDef] = &[FieldDef::new(
    "bytes",
    Field::list(&BYTE, ListCount::Remaining),
)];

pub static LOG_CREATE: MessageKind =
    MessageKind::new("LOG-CREATE", MsgId::LOG_CREATE, LOG_CREATE_FIELDS);
pub static LOG_ERASE: MessageKind = MessageKind::new("LOG-ERASE", MsgId::LOG_ERASE, NO_FIELDS);
pub static LOG_INFO_POLL: MessageKind =
    MessageKind::new("LOG-INFO-POLL", MsgId::LOG_INFO, NO_FIELDS);
/// Arbitrary bytes stored in the log, as long as the frame allows
pub static LOG_STRING: MessageKind =
    MessageKind::new("LOG-STRING", MsgId::LOG_STRING, LOG_STRING_FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::Value, message::Message};

    #[test]
    fn create_defaults_are_valid() {
        let msg = Message::new(&LOG_CREATE);
        assert!(msg.valid());
        assert_eq!(msg.payload_len(), 8);
    }

    #[test]
    fn create_rejects_unknown_version_only_on_validate() {
        let msg = Message::decode_payload(&LOG_CREATE, &[1, 0x01, 0, 2, 0, 0x10, 0, 0]).unwrap();
        assert_eq!(msg.first_invalid_field(), Some("version"));
        assert_eq!(msg.get_as::<u32>("userDefinedSize"), Some(0x1000));

        let msg = Message::decode_payload(&LOG_CREATE, &[0, 0x02, 0, 3, 0, 0, 0, 0]).unwrap();
        assert_eq!(msg.first_invalid_field(), Some("logCfg"));
    }

    #[test]
    fn string_takes_whole_payload() {
        let msg = Message::decode_payload(&LOG_STRING, b"fix acquired").unwrap();
        assert_eq!(
            msg.field("bytes").and_then(Value::to_bytes).as_deref(),
            Some(&b"fix acquired"[..])
        );
        let empty = Message::decode_payload(&LOG_STRING, &[]).unwrap();
        assert_eq!(empty.payload_len(), 0);
    }
}
