use alloc::vec::Vec;

use super::{primitive::Endianness, FieldCodec, IntRepr, ValidValues, Value};
use crate::{
    error::{EncodeError, ParserError},
    frame::MemWriter,
};

#[derive(Debug, Clone, Copy)]
pub enum BitMemberKind {
    Uint,
    Enum(ValidValues),
    /// Filler that must stay zero
    Reserved,
}

/// Named run of bits inside a [`BitfieldField`]
#[derive(Debug, Clone, Copy)]
pub struct BitMember {
    pub name: &'static str,
    pub bits: u32,
    pub kind: BitMemberKind,
}

impl BitMember {
    pub const fn uint(name: &'static str, bits: u32) -> Self {
        Self {
            name,
            bits,
            kind: BitMemberKind::Uint,
        }
    }

    pub const fn flag(name: &'static str) -> Self {
        Self::uint(name, 1)
    }

    pub const fn enumeration(name: &'static str, bits: u32, values: ValidValues) -> Self {
        Self {
            name,
            bits,
            kind: BitMemberKind::Enum(values),
        }
    }

    pub const fn reserved(bits: u32) -> Self {
        Self {
            name: "reserved",
            bits,
            kind: BitMemberKind::Reserved,
        }
    }

    const fn mask(&self) -> u64 {
        if self.bits >= u64::BITS {
            u64::MAX
        } else {
            (1 << self.bits) - 1
        }
    }

    fn validate(&self, value: u64) -> bool {
        if value & !self.mask() != 0 {
            return false;
        }
        match self.kind {
            BitMemberKind::Uint => true,
            BitMemberKind::Enum(values) => values.contains(value as i64),
            BitMemberKind::Reserved => value == 0,
        }
    }

    fn default_value(&self) -> u64 {
        match self.kind {
            BitMemberKind::Enum(values) => values.first() as u64,
            BitMemberKind::Uint | BitMemberKind::Reserved => 0,
        }
    }
}

/// Unsigned integer split into members, least significant bits first.
///
/// Member `i` occupies the bits following all members declared before it.
#[derive(Debug, Clone, Copy)]
pub struct BitfieldField {
    repr: IntRepr,
    members: &'static [BitMember],
}

impl BitfieldField {
    pub const fn new(repr: IntRepr, members: &'static [BitMember]) -> Self {
        assert!(!repr.is_signed(), "bitfield container must be unsigned");
        let mut total = 0;
        let mut i = 0;
        while i < members.len() {
            assert!(members[i].bits > 0, "bitfield member needs at least one bit");
            total += members[i].bits;
            i += 1;
        }
        assert!(
            total as usize == repr.width() * 8,
            "bitfield member widths must add up to the container width"
        );
        Self { repr, members }
    }

    pub const fn repr(&self) -> IntRepr {
        self.repr
    }

    pub const fn members(&self) -> &'static [BitMember] {
        self.members
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    pub fn unpack(&self, raw: u64) -> Vec<u64> {
        let mut offset = 0;
        self.members
            .iter()
            .map(|member| {
                let value = (raw >> offset) & member.mask();
                offset += member.bits;
                value
            })
            .collect()
    }

    /// `None` when the member count is wrong or a member overflows its width
    pub fn pack(&self, values: &[u64]) -> Option<u64> {
        if values.len() != self.members.len() {
            return None;
        }
        let mut raw = 0;
        let mut offset = 0;
        for (member, value) in self.members.iter().zip(values) {
            if value & !member.mask() != 0 {
                return None;
            }
            raw |= value << offset;
            offset += member.bits;
        }
        Some(raw)
    }
}

impl FieldCodec for BitfieldField {
    fn decode(&self, buf: &[u8], _siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        let (raw, used) = self.repr.read(buf, Endianness::Little)?;
        Ok((Value::Bits(self.unpack(raw as u64)), used))
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        let raw = value
            .as_bits()
            .and_then(|bits| self.pack(bits))
            .ok_or(EncodeError::ValueMismatch)?;
        self.repr.write(raw as i64, Endianness::Little, out)
    }

    fn validate(&self, value: &Value, _siblings: &[Value]) -> bool {
        match value.as_bits() {
            Some(bits) => {
                bits.len() == self.members.len()
                    && self
                        .members
                        .iter()
                        .zip(bits)
                        .all(|(member, v)| member.validate(*v))
            },
            None => false,
        }
    }

    fn encoded_len(&self, _value: &Value) -> usize {
        self.repr.width()
    }

    fn min_len(&self) -> usize {
        self.repr.width()
    }

    fn default_value(&self, _siblings: &[Value]) -> Value {
        Value::Bits(self.members.iter().map(BitMember::default_value).collect())
    }
}
