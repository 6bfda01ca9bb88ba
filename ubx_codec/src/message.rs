//! Message kinds and message values.
//!
//! A [`MessageKind`] is a static description of one payload layout: its id,
//! the ordered fields, and optionally a read guard and a refresh rule. A
//! [`Message`] pairs a kind with one value per field.

use alloc::vec::Vec;
use core::fmt;

use num_traits::NumCast;

use crate::{
    error::{EncodeError, ParserError},
    field::{
        self, default_sequence, sequence_encoded_len, validate_sequence, Field, FieldCodec,
        FieldDef, Value,
    },
    frame::{self, MemWriter},
    msg_id::MsgId,
};

/// Contract on one field that is checked while decoding, right after the
/// field is read. A failing guard rejects the payload for this kind.
#[derive(Debug, Clone, Copy)]
pub struct ReadGuard {
    pub after: usize,
    pub check: fn(&Value) -> bool,
}

/// Rewrites fields to restore a cross-field contract, reporting whether
/// anything changed
pub type RefreshFn = fn(&mut [Value]) -> bool;

/// Static description of one payload layout
pub struct MessageKind {
    name: &'static str,
    id: MsgId,
    fields: &'static [FieldDef],
    guard: Option<ReadGuard>,
    refresh: Option<RefreshFn>,
}

impl MessageKind {
    /// Panics, at compile time when used in a static, if the id is not a
    /// known UBX id or the layout references fields out of order
    pub const fn new(name: &'static str, id: MsgId, fields: &'static [FieldDef]) -> Self {
        assert!(id.is_valid(), "message id is not a known UBX id");
        field::check_layout(fields);
        Self {
            name,
            id,
            fields,
            guard: None,
            refresh: None,
        }
    }

    pub const fn with_guard(self, after: usize, check: fn(&Value) -> bool) -> Self {
        assert!(after < self.fields.len(), "guard refers to a missing field");
        Self {
            guard: Some(ReadGuard { after, check }),
            ..self
        }
    }

    pub const fn with_refresh(self, refresh: RefreshFn) -> Self {
        Self {
            refresh: Some(refresh),
            ..self
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn id(&self) -> MsgId {
        self.id
    }

    pub const fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub const fn guard(&self) -> Option<ReadGuard> {
        self.guard
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|def| def.name == name)
    }

    /// Shortest payload any message of this kind can have
    pub fn min_payload_len(&self) -> usize {
        self.fields.iter().map(|def| def.field.min_len()).sum()
    }

    fn len_error(&self, err: ParserError, payload_len: usize) -> ParserError {
        match err {
            ParserError::InsufficientData { required, .. } => ParserError::InvalidPacketLen {
                packet: self.name,
                expect: required,
                got: payload_len,
            },
            other => other,
        }
    }
}

impl fmt::Debug for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageKind")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// One message: a kind plus a value for every field of its layout
#[derive(Clone)]
pub struct Message {
    kind: &'static MessageKind,
    values: Vec<Value>,
}

impl Message {
    /// Message with every field at its default
    pub fn new(kind: &'static MessageKind) -> Self {
        Self {
            kind,
            values: default_sequence(kind.fields),
        }
    }

    /// Builds a message from values in layout order, `None` if the count is wrong
    pub fn from_values(kind: &'static MessageKind, values: Vec<Value>) -> Option<Self> {
        (values.len() == kind.fields.len()).then_some(Self { kind, values })
    }

    pub fn kind(&self) -> &'static MessageKind {
        self.kind
    }

    pub fn id(&self) -> MsgId {
        self.kind.id
    }

    pub fn name(&self) -> &'static str {
        self.kind.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.kind.field_index(name).map(|idx| &self.values[idx])
    }

    /// Replaces a field value, returning the previous one. `None` if the
    /// layout has no such field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        let idx = self.kind.field_index(name)?;
        Some(core::mem::replace(&mut self.values[idx], value.into()))
    }

    /// Integer field converted to `T`, `None` if missing, not an integer or
    /// out of range for `T`
    pub fn get_as<T: NumCast>(&self, name: &str) -> Option<T> {
        self.field(name)?.as_int().and_then(num_traits::cast)
    }

    /// Member of a bitfield field, by name
    pub fn bit(&self, field: &str, member: &str) -> Option<u64> {
        let idx = self.kind.field_index(field)?;
        match &self.kind.fields[idx].field {
            Field::Bitfield(bitfield) => {
                let pos = bitfield.member_index(member)?;
                self.values[idx].as_bits()?.get(pos).copied()
            },
            _ => None,
        }
    }

    /// Decodes a complete payload.
    ///
    /// The payload has to be consumed exactly. Running out of bytes, or bytes
    /// left over after the last field, is reported as
    /// [`ParserError::InvalidPacketLen`]; a failing read guard as
    /// [`ParserError::InvalidField`].
    pub fn decode_payload(kind: &'static MessageKind, payload: &[u8]) -> Result<Self, ParserError> {
        let mut values = Vec::with_capacity(kind.fields.len());
        let mut offset = 0;
        for (idx, def) in kind.fields.iter().enumerate() {
            let (value, used) = def
                .field
                .decode(&payload[offset..], &values)
                .map_err(|err| kind.len_error(err.offset_by(offset), payload.len()))?;
            offset += used;
            if let Some(guard) = kind.guard {
                if guard.after == idx && !(guard.check)(&value) {
                    return Err(ParserError::InvalidField {
                        packet: kind.name,
                        field: def.name,
                    });
                }
            }
            values.push(value);
        }
        if offset != payload.len() {
            return Err(ParserError::InvalidPacketLen {
                packet: kind.name,
                expect: offset,
                got: payload.len(),
            });
        }
        Ok(Self { kind, values })
    }

    pub fn payload_len(&self) -> usize {
        sequence_encoded_len(self.kind.fields, &self.values)
    }

    pub fn encode_payload(&self, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        if self.values.len() != self.kind.fields.len() {
            return Err(EncodeError::ValueMismatch);
        }
        for (def, value) in self.kind.fields.iter().zip(&self.values) {
            def.field.encode(value, out).map_err(|err| match err {
                EncodeError::ValueMismatch => EncodeError::InvalidValue {
                    packet: self.kind.name,
                    field: def.name,
                },
                other => other,
            })?;
        }
        Ok(())
    }

    /// Every field passes its own validation
    pub fn valid(&self) -> bool {
        validate_sequence(self.kind.fields, &self.values)
    }

    /// Name of the first field failing validation
    pub fn first_invalid_field(&self) -> Option<&'static str> {
        self.kind
            .fields
            .iter()
            .enumerate()
            .find(|(i, def)| !def.field.validate(&self.values[*i], &self.values[..*i]))
            .map(|(_, def)| def.name)
    }

    /// Applies the kind's refresh rule; `false` when there is none or nothing changed
    pub fn refresh(&mut self) -> bool {
        match self.kind.refresh {
            Some(refresh) => refresh(&mut self.values),
            None => false,
        }
    }

    pub fn to_frame(&self, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        frame::write_frame(self.id(), self.payload_len(), out, |w| self.encode_payload(w))
    }

    pub fn to_frame_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.to_frame(&mut out)?;
        Ok(out)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.kind, other.kind) && self.values == other.values
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.kind.name);
        for (def, value) in self.kind.fields.iter().zip(&self.values) {
            s.field(def.name, value);
        }
        s.finish()
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use super::Message;
    use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

    struct Fields<'a>(&'a Message);

    impl Serialize for Fields<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.values.len()))?;
            for (def, value) in self.0.kind.fields.iter().zip(&self.0.values) {
                map.serialize_entry(def.name, value)?;
            }
            map.end()
        }
    }

    impl Serialize for Message {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut s = serializer.serialize_struct("Message", 3)?;
            s.serialize_field("name", self.kind.name)?;
            s.serialize_field("id", &self.kind.id)?;
            s.serialize_field("fields", &Fields(self))?;
            s.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::IntRepr;
    use alloc::vec;

    const PORT_FIELDS: &[FieldDef] = &[
        FieldDef::new("portID", Field::enum_set(IntRepr::U1, &[4])),
        FieldDef::new("rate", Field::u2()),
    ];

    fn port_is_four(value: &Value) -> bool {
        value.as_int() == Some(4)
    }

    fn force_port(values: &mut [Value]) -> bool {
        if values[0] == Value::Int(4) {
            return false;
        }
        values[0] = Value::Int(4);
        true
    }

    static PORT: MessageKind = MessageKind::new("TEST-PORT", MsgId::CFG_PRT, PORT_FIELDS)
        .with_guard(0, port_is_four)
        .with_refresh(force_port);

    #[test]
    fn guard_rejects_wrong_port() {
        assert_eq!(
            Message::decode_payload(&PORT, &[3, 0, 0]),
            Err(ParserError::InvalidField {
                packet: "TEST-PORT",
                field: "portID"
            })
        );
        let msg = Message::decode_payload(&PORT, &[4, 0x10, 0x00]).unwrap();
        assert_eq!(msg.get_as::<u16>("rate"), Some(16));
    }

    #[test]
    fn payload_must_be_consumed_exactly() {
        assert_eq!(
            Message::decode_payload(&PORT, &[4, 0]),
            Err(ParserError::InvalidPacketLen {
                packet: "TEST-PORT",
                expect: 3,
                got: 2
            })
        );
        assert_eq!(
            Message::decode_payload(&PORT, &[4, 0, 0, 0]),
            Err(ParserError::InvalidPacketLen {
                packet: "TEST-PORT",
                expect: 3,
                got: 4
            })
        );
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut msg = Message::new(&PORT);
        assert!(msg.valid());
        let before = msg.clone();
        assert!(!msg.refresh());
        assert_eq!(msg, before);

        msg.set("portID", 1u8);
        assert!(!msg.valid());
        assert_eq!(msg.first_invalid_field(), Some("portID"));
        assert!(msg.refresh());
        assert_eq!(msg.field("portID"), Some(&Value::Int(4)));
        assert!(!msg.refresh());
    }

    #[test]
    fn set_and_encode() {
        let mut msg = Message::new(&PORT);
        assert_eq!(msg.set("rate", 0x0201u16), Some(Value::Int(0)));
        assert_eq!(msg.set("missing", 1u8), None);
        let mut out = Vec::new();
        msg.encode_payload(&mut out).unwrap();
        assert_eq!(out, [4, 0x01, 0x02]);
        assert_eq!(msg.payload_len(), 3);

        msg.set("rate", Value::List(vec![]));
        assert_eq!(
            msg.encode_payload(&mut Vec::new()),
            Err(EncodeError::InvalidValue {
                packet: "TEST-PORT",
                field: "rate"
            })
        );
    }

    #[test]
    fn get_as_checks_target_range() {
        let mut msg = Message::new(&PORT);
        msg.set("rate", 300u16);
        assert_eq!(msg.get_as::<u8>("rate"), None);
        assert_eq!(msg.get_as::<i32>("rate"), Some(300));
        assert_eq!(msg.get_as::<f64>("rate"), Some(300.0));
    }
}
