use super::NO_FIELDS;
use crate::{
    field::{Field, FieldDef, ListCount},
    message::MessageKind,
    msg_id::MsgId,
};

const CHAR: Field = Field::u1();
const EXTENSION: Field = Field::list(&CHAR, ListCount::Fixed(30));

const MON_VER_FIELDS: &[FieldDef] = &[
    FieldDef::new("swVersion", Field::list(&CHAR, ListCount::Fixed(30))),
    FieldDef::new("hwVersion", Field::list(&CHAR, ListCount::Fixed(10))),
    FieldDef::new("extension", Field::list(&EXTENSION, ListCount::Remaining)),
];

pub static MON_HW2_POLL: MessageKind = MessageKind::new("MON-HW2-POLL", MsgId::MON_HW2, NO_FIELDS);
pub static MON_VER_POLL: MessageKind = MessageKind::new("MON-VER-POLL", MsgId::MON_VER, NO_FIELDS);
/// Receiver and software versions, NUL padded strings
pub static MON_VER: MessageKind = MessageKind::new("MON-VER", MsgId::MON_VER, MON_VER_FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::Value, message::Message, types::c_string, ParserError};
    use alloc::vec::Vec;

    fn padded(s: &str, len: usize) -> Vec<u8> {
        let mut out = s.as_bytes().to_vec();
        out.resize(len, 0);
        out
    }

    #[test]
    fn version_strings_and_extensions() {
        let mut payload = padded("7.03 (45969)", 30);
        payload.extend(padded("00040007", 10));
        payload.extend(padded("PROTVER 14.00", 30));
        payload.extend(padded("GPS;SBAS;QZSS", 30));

        let msg = Message::decode_payload(&MON_VER, &payload).unwrap();
        assert_eq!(
            msg.field("swVersion").and_then(c_string).as_deref(),
            Some("7.03 (45969)")
        );
        assert_eq!(
            msg.field("hwVersion").and_then(c_string).as_deref(),
            Some("00040007")
        );
        let ext = msg.field("extension").and_then(Value::as_list).unwrap();
        assert_eq!(ext.len(), 2);
        assert_eq!(c_string(&ext[1]).as_deref(), Some("GPS;SBAS;QZSS"));
    }

    #[test]
    fn partial_extension_is_rejected() {
        let mut payload = padded("", 40);
        payload.extend(padded("PROTVER", 12));
        assert!(matches!(
            Message::decode_payload(&MON_VER, &payload),
            Err(ParserError::InvalidPacketLen { packet: "MON-VER", expect: 70, got: 52 })
        ));
    }
}
