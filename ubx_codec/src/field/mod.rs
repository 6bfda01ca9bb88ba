//! Field primitives and combinators from which every payload layout is built.
//!
//! A layout is a static slice of [`FieldDef`]s. Decoding walks the slice in
//! order and hands each field the values decoded before it, which is what
//! sibling-counted lists and optional fields look at.

mod bitfield;
mod list;
mod optional;
mod primitive;

use alloc::vec::Vec;

pub use self::{
    bitfield::{BitMember, BitMemberKind, BitfieldField},
    list::{ListCount, ListField},
    optional::OptionalField,
    primitive::{BitmaskField, EnumField, Endianness, IntField, IntRepr, MsgIdField, ValidValues},
};
use crate::{
    error::{EncodeError, ParserError},
    frame::MemWriter,
};

/// Decoded value of any field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Value {
    /// Integers, enumerations, bitmasks and message identifiers
    Int(i64),
    /// Bitfield members, in declaration order
    Bits(Vec<u64>),
    List(Vec<Value>),
    /// Members of a composite list element, in declaration order
    Bundle(Vec<Value>),
    /// Optional field whose presence condition does not hold
    Absent,
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bits(&self) -> Option<&[u64]> {
        match self {
            Value::Bits(bits) => Some(bits),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bundle(&self) -> Option<&[Value]> {
        match self {
            Value::Bundle(members) => Some(members),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// List of single byte integers, the shape of character arrays and raw blobs
    pub fn bytes(data: &[u8]) -> Self {
        Value::List(data.iter().map(|b| Value::Int(i64::from(*b))).collect())
    }

    /// Inverse of [`Value::bytes`]
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        self.as_list()?
            .iter()
            .map(|item| item.as_int().and_then(|v| u8::try_from(v).ok()))
            .collect()
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(u8, u16, u32, i8, i16, i32, i64);

impl From<crate::MsgId> for Value {
    fn from(id: crate::MsgId) -> Self {
        Value::Int(i64::from(id.raw()))
    }
}

/// Capabilities shared by every field kind.
///
/// `siblings` are the values already decoded in front of the field, inside the
/// same message or the same bundle.
pub trait FieldCodec {
    /// Decode from the start of `buf`, returning the value and the bytes consumed
    fn decode(&self, buf: &[u8], siblings: &[Value]) -> Result<(Value, usize), ParserError>;

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError>;

    /// Value passes the field's own rules. Decoding never checks this.
    fn validate(&self, value: &Value, siblings: &[Value]) -> bool;

    /// Exact number of bytes `encode` emits for `value`
    fn encoded_len(&self, value: &Value) -> usize;

    /// Least number of bytes any value of this field occupies
    fn min_len(&self) -> usize;

    fn default_value(&self, siblings: &[Value]) -> Value;
}

/// Every field kind the layouts may use
#[derive(Debug, Clone, Copy)]
pub enum Field {
    Int(IntField),
    Enum(EnumField),
    Bitmask(BitmaskField),
    MsgId(MsgIdField),
    Bitfield(BitfieldField),
    List(ListField),
    /// Group of fields decoded together, used as a composite list element
    Bundle(&'static [FieldDef]),
    Optional(OptionalField),
}

/// Named position in a layout
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub field: Field,
}

impl FieldDef {
    pub const fn new(name: &'static str, field: Field) -> Self {
        Self { name, field }
    }
}

impl Field {
    pub const fn u1() -> Self {
        Self::int(IntRepr::U1)
    }

    pub const fn u2() -> Self {
        Self::int(IntRepr::U2)
    }

    pub const fn u4() -> Self {
        Self::int(IntRepr::U4)
    }

    pub const fn i1() -> Self {
        Self::int(IntRepr::I1)
    }

    pub const fn i2() -> Self {
        Self::int(IntRepr::I2)
    }

    pub const fn i4() -> Self {
        Self::int(IntRepr::I4)
    }

    pub const fn int(repr: IntRepr) -> Self {
        Field::Int(IntField::new(repr))
    }

    /// Plain integer stored most significant byte first
    pub const fn int_be(repr: IntRepr) -> Self {
        Field::Int(IntField::new(repr).with_endian(Endianness::Big))
    }

    pub const fn int_range(repr: IntRepr, min: i64, max: i64) -> Self {
        Field::Int(IntField::new(repr).with_range(min, max))
    }

    pub const fn enum_range(repr: IntRepr, min: i64, max: i64) -> Self {
        Field::Enum(EnumField::new(repr, ValidValues::Range { min, max }))
    }

    pub const fn enum_set(repr: IntRepr, values: &'static [i64]) -> Self {
        Field::Enum(EnumField::new(repr, ValidValues::Set(values)))
    }

    pub const fn bitmask(repr: IntRepr, reserved: u64) -> Self {
        Field::Bitmask(BitmaskField::new(repr, reserved))
    }

    pub const fn msg_id() -> Self {
        Field::MsgId(MsgIdField)
    }

    /// Panics, at compile time when used in a constant, if member widths do
    /// not add up to the container width
    pub const fn bitfield(repr: IntRepr, members: &'static [BitMember]) -> Self {
        Field::Bitfield(BitfieldField::new(repr, members))
    }

    pub const fn list(elem: &'static Field, count: ListCount) -> Self {
        Field::List(ListField::new(elem, count))
    }

    pub const fn bundle(members: &'static [FieldDef]) -> Self {
        check_layout(members);
        Field::Bundle(members)
    }

    pub const fn optional(inner: &'static Field, present: fn(&[Value]) -> bool) -> Self {
        Field::Optional(OptionalField::new(inner, present))
    }

    /// Fields that take every byte left in the payload
    pub(crate) const fn consumes_rest(&self) -> bool {
        match self {
            Field::List(f) => matches!(f.count(), ListCount::Remaining),
            Field::Optional(f) => f.inner().consumes_rest(),
            Field::Bundle(members) => {
                let mut i = 0;
                while i < members.len() {
                    if members[i].field.consumes_rest() {
                        return true;
                    }
                    i += 1;
                }
                false
            },
            _ => false,
        }
    }

    /// Fields whose value can serve as an element count
    pub(crate) const fn is_integer(&self) -> bool {
        matches!(self, Field::Int(_) | Field::Enum(_))
    }

    pub(crate) const fn const_min_len(&self) -> usize {
        match self {
            Field::Int(f) => f.repr().width(),
            Field::Enum(f) => f.repr().width(),
            Field::Bitmask(f) => f.repr().width(),
            Field::MsgId(_) => IntRepr::U2.width(),
            Field::Bitfield(f) => f.repr().width(),
            Field::List(f) => f.const_min_len(),
            Field::Bundle(members) => sequence_min_len(members),
            Field::Optional(_) => 0,
        }
    }
}

impl FieldCodec for Field {
    fn decode(&self, buf: &[u8], siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        match self {
            Field::Int(f) => f.decode(buf, siblings),
            Field::Enum(f) => f.decode(buf, siblings),
            Field::Bitmask(f) => f.decode(buf, siblings),
            Field::MsgId(f) => f.decode(buf, siblings),
            Field::Bitfield(f) => f.decode(buf, siblings),
            Field::List(f) => f.decode(buf, siblings),
            Field::Bundle(members) => {
                let (values, used) = decode_sequence(members, buf)?;
                Ok((Value::Bundle(values), used))
            },
            Field::Optional(f) => f.decode(buf, siblings),
        }
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        match self {
            Field::Int(f) => f.encode(value, out),
            Field::Enum(f) => f.encode(value, out),
            Field::Bitmask(f) => f.encode(value, out),
            Field::MsgId(f) => f.encode(value, out),
            Field::Bitfield(f) => f.encode(value, out),
            Field::List(f) => f.encode(value, out),
            Field::Bundle(members) => {
                let values = value.as_bundle().ok_or(EncodeError::ValueMismatch)?;
                encode_sequence(members, values, out)
            },
            Field::Optional(f) => f.encode(value, out),
        }
    }

    fn validate(&self, value: &Value, siblings: &[Value]) -> bool {
        match self {
            Field::Int(f) => f.validate(value, siblings),
            Field::Enum(f) => f.validate(value, siblings),
            Field::Bitmask(f) => f.validate(value, siblings),
            Field::MsgId(f) => f.validate(value, siblings),
            Field::Bitfield(f) => f.validate(value, siblings),
            Field::List(f) => f.validate(value, siblings),
            Field::Bundle(members) => value
                .as_bundle()
                .is_some_and(|values| validate_sequence(members, values)),
            Field::Optional(f) => f.validate(value, siblings),
        }
    }

    fn encoded_len(&self, value: &Value) -> usize {
        match self {
            Field::Int(f) => f.encoded_len(value),
            Field::Enum(f) => f.encoded_len(value),
            Field::Bitmask(f) => f.encoded_len(value),
            Field::MsgId(f) => f.encoded_len(value),
            Field::Bitfield(f) => f.encoded_len(value),
            Field::List(f) => f.encoded_len(value),
            Field::Bundle(members) => value
                .as_bundle()
                .map_or(0, |values| sequence_encoded_len(members, values)),
            Field::Optional(f) => f.encoded_len(value),
        }
    }

    fn min_len(&self) -> usize {
        self.const_min_len()
    }

    fn default_value(&self, siblings: &[Value]) -> Value {
        match self {
            Field::Int(f) => f.default_value(siblings),
            Field::Enum(f) => f.default_value(siblings),
            Field::Bitmask(f) => f.default_value(siblings),
            Field::MsgId(f) => f.default_value(siblings),
            Field::Bitfield(f) => f.default_value(siblings),
            Field::List(f) => f.default_value(siblings),
            Field::Bundle(members) => Value::Bundle(default_sequence(members)),
            Field::Optional(f) => f.default_value(siblings),
        }
    }
}

/// Compile-time layout checks: lists counted by a sibling must reference an
/// earlier integer field, and only optional fields may follow a field running
/// to the end of the payload.
pub(crate) const fn check_layout(fields: &[FieldDef]) {
    let mut i = 0;
    while i < fields.len() {
        check_field(&fields[i].field, i, fields);
        if fields[i].field.consumes_rest() {
            let mut j = i + 1;
            while j < fields.len() {
                assert!(
                    matches!(fields[j].field, Field::Optional(_)),
                    "only optional fields may follow a list running to the end"
                );
                j += 1;
            }
        }
        i += 1;
    }
}

const fn check_field(field: &Field, position: usize, siblings: &[FieldDef]) {
    match field {
        Field::List(list) => {
            if let ListCount::FromField(idx) = list.count() {
                assert!(
                    idx < position,
                    "list count must come from an earlier field"
                );
                assert!(
                    siblings[idx].field.is_integer(),
                    "list count must come from an integer field"
                );
            }
            check_field(list.elem(), 0, &[]);
        },
        Field::Optional(optional) => check_field(optional.inner(), position, siblings),
        Field::Bundle(members) => check_layout(members),
        _ => {},
    }
}

const fn sequence_min_len(fields: &[FieldDef]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].field.const_min_len();
        i += 1;
    }
    total
}

/// Joins two layout fragments, for messages sharing a common head or tail
pub const fn concat_fields<const A: usize, const B: usize, const N: usize>(
    head: [FieldDef; A],
    tail: [FieldDef; B],
) -> [FieldDef; N] {
    assert!(A + B == N, "concatenated layout has the wrong length");
    let mut out = [FieldDef::new("", Field::u1()); N];
    let mut i = 0;
    while i < A {
        out[i] = head[i];
        i += 1;
    }
    let mut j = 0;
    while j < B {
        out[A + j] = tail[j];
        j += 1;
    }
    out
}

pub(crate) fn decode_sequence(
    fields: &[FieldDef],
    buf: &[u8],
) -> Result<(Vec<Value>, usize), ParserError> {
    let mut values = Vec::with_capacity(fields.len());
    let mut offset = 0;
    for def in fields {
        let (value, used) = def
            .field
            .decode(&buf[offset..], &values)
            .map_err(|err| err.offset_by(offset))?;
        offset += used;
        values.push(value);
    }
    Ok((values, offset))
}

pub(crate) fn encode_sequence(
    fields: &[FieldDef],
    values: &[Value],
    out: &mut dyn MemWriter,
) -> Result<(), EncodeError> {
    if fields.len() != values.len() {
        return Err(EncodeError::ValueMismatch);
    }
    for (def, value) in fields.iter().zip(values) {
        def.field.encode(value, out)?;
    }
    Ok(())
}

pub(crate) fn validate_sequence(fields: &[FieldDef], values: &[Value]) -> bool {
    fields.len() == values.len()
        && fields
            .iter()
            .enumerate()
            .all(|(i, def)| def.field.validate(&values[i], &values[..i]))
}

pub(crate) fn sequence_encoded_len(fields: &[FieldDef], values: &[Value]) -> usize {
    fields
        .iter()
        .zip(values)
        .map(|(def, value)| def.field.encoded_len(value))
        .sum()
}

pub(crate) fn default_sequence(fields: &[FieldDef]) -> Vec<Value> {
    let mut values = Vec::with_capacity(fields.len());
    for def in fields {
        let value = def.field.default_value(&values);
        values.push(value);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const POINT: &[FieldDef] = &[
        FieldDef::new("x", Field::i2()),
        FieldDef::new("y", Field::i2()),
    ];
    const POINT_FIELD: Field = Field::bundle(POINT);

    const SHAPE: &[FieldDef] = &[
        FieldDef::new("kind", Field::enum_range(IntRepr::U1, 0, 2)),
        FieldDef::new("numPoints", Field::u1()),
        FieldDef::new(
            "points",
            Field::list(&POINT_FIELD, ListCount::FromField(1)),
        ),
    ];

    #[test]
    fn sequence_passes_siblings() {
        let buf = [1, 2, 0xff, 0xff, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00];
        let (values, used) = decode_sequence(SHAPE, &buf).unwrap();
        assert_eq!(used, buf.len());
        assert_eq!(values[1], Value::Int(2));
        assert_eq!(
            values[2],
            Value::List(vec![
                Value::Bundle(vec![Value::Int(-1), Value::Int(1)]),
                Value::Bundle(vec![Value::Int(2), Value::Int(3)]),
            ])
        );
        assert!(validate_sequence(SHAPE, &values));

        let mut out = Vec::new();
        encode_sequence(SHAPE, &values, &mut out).unwrap();
        assert_eq!(out, buf);
        assert_eq!(sequence_encoded_len(SHAPE, &values), buf.len());
    }

    #[test]
    fn short_sequence_reports_absolute_offsets() {
        let buf = [1, 2, 0xff, 0xff, 0x01];
        assert_eq!(
            decode_sequence(SHAPE, &buf),
            Err(ParserError::InsufficientData {
                required: 10,
                available: 5
            })
        );
    }

    #[test]
    fn count_mismatch_is_invalid() {
        let values = vec![
            Value::Int(0),
            Value::Int(3),
            Value::List(vec![Value::Bundle(vec![Value::Int(0), Value::Int(0)])]),
        ];
        assert!(!validate_sequence(SHAPE, &values));
    }

    #[test]
    #[should_panic(expected = "only optional fields may follow a list running to the end")]
    fn field_after_remaining_list_is_rejected() {
        const BYTE: Field = Field::u1();
        const REST_FIRST: &[FieldDef] = &[
            FieldDef::new("rest", Field::list(&BYTE, ListCount::Remaining)),
            FieldDef::new("after", Field::u1()),
        ];
        check_layout(REST_FIRST);
    }

    #[test]
    fn remaining_list_may_end_layout() {
        const BYTE: Field = Field::u1();
        const REST_LAST: &[FieldDef] = &[
            FieldDef::new("len", Field::u1()),
            FieldDef::new("rest", Field::list(&BYTE, ListCount::Remaining)),
        ];
        check_layout(REST_LAST);
        assert!(REST_LAST[1].field.consumes_rest());
        assert!(!REST_LAST[0].field.consumes_rest());
    }

    #[test]
    fn int_fields_follow_configured_byte_order() {
        const BE: Field = Field::int_be(IntRepr::U2);
        const LE: Field = Field::u2();

        let (value, used) = BE.decode(&[0x12, 0x34], &[]).unwrap();
        assert_eq!((value.clone(), used), (Value::Int(0x1234), 2));
        let mut out = Vec::new();
        BE.encode(&value, &mut out).unwrap();
        assert_eq!(out, [0x12, 0x34]);

        assert_eq!(LE.decode(&[0x12, 0x34], &[]).unwrap().0, Value::Int(0x3412));
    }

    #[test]
    fn defaults_follow_layout() {
        let values = default_sequence(SHAPE);
        assert_eq!(
            values,
            vec![Value::Int(0), Value::Int(0), Value::List(vec![])]
        );
        assert!(validate_sequence(SHAPE, &values));
    }

    #[test]
    fn fragments_concatenate_in_order() {
        const HEAD: [FieldDef; 1] = [FieldDef::new("a", Field::u1())];
        const TAIL: [FieldDef; 2] = [
            FieldDef::new("b", Field::u2()),
            FieldDef::new("c", Field::u4()),
        ];
        const ALL: [FieldDef; 3] = concat_fields(HEAD, TAIL);
        let names: Vec<_> = ALL.iter().map(|def| def.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(sequence_min_len(&ALL), 7);
    }

    #[test]
    fn bytes_round_trip() {
        let v = Value::bytes(b"u-blox");
        assert_eq!(v.to_bytes().as_deref(), Some(&b"u-blox"[..]));
        assert_eq!(Value::List(vec![Value::Int(256)]).to_bytes(), None);
    }
}
