use super::{FieldCodec, Value};
use crate::{
    error::{EncodeError, ParserError},
    frame::MemWriter,
    msg_id::MsgId,
};

/// UBX integer types: `U1`/`U2`/`U4` unsigned and `I1`/`I2`/`I4` signed,
/// the digit being the width in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntRepr {
    U1,
    U2,
    U4,
    I1,
    I2,
    I4,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    #[default]
    Little,
    /// Only the message identifier is stored this way
    Big,
}

impl IntRepr {
    pub const fn width(self) -> usize {
        match self {
            IntRepr::U1 | IntRepr::I1 => 1,
            IntRepr::U2 | IntRepr::I2 => 2,
            IntRepr::U4 | IntRepr::I4 => 4,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, IntRepr::I1 | IntRepr::I2 | IntRepr::I4)
    }

    pub const fn min(self) -> i64 {
        match self {
            IntRepr::U1 | IntRepr::U2 | IntRepr::U4 => 0,
            IntRepr::I1 => i8::MIN as i64,
            IntRepr::I2 => i16::MIN as i64,
            IntRepr::I4 => i32::MIN as i64,
        }
    }

    pub const fn max(self) -> i64 {
        match self {
            IntRepr::U1 => u8::MAX as i64,
            IntRepr::U2 => u16::MAX as i64,
            IntRepr::U4 => u32::MAX as i64,
            IntRepr::I1 => i8::MAX as i64,
            IntRepr::I2 => i16::MAX as i64,
            IntRepr::I4 => i32::MAX as i64,
        }
    }

    pub const fn fits(self, value: i64) -> bool {
        value >= self.min() && value <= self.max()
    }

    pub(crate) fn read(self, buf: &[u8], endian: Endianness) -> Result<(i64, usize), ParserError> {
        let width = self.width();
        let bytes = buf.get(..width).ok_or(ParserError::InsufficientData {
            required: width,
            available: buf.len(),
        })?;
        let mut raw: u64 = 0;
        match endian {
            Endianness::Little => {
                for (i, b) in bytes.iter().enumerate() {
                    raw |= u64::from(*b) << (8 * i);
                }
            },
            Endianness::Big => {
                for b in bytes {
                    raw = (raw << 8) | u64::from(*b);
                }
            },
        }
        let value = if self.is_signed() {
            // sign extend from the top bit of the container
            let shift = 64 - 8 * width as u32;
            ((raw << shift) as i64) >> shift
        } else {
            raw as i64
        };
        Ok((value, width))
    }

    pub(crate) fn write(
        self,
        value: i64,
        endian: Endianness,
        out: &mut dyn MemWriter,
    ) -> Result<(), EncodeError> {
        if !self.fits(value) {
            return Err(EncodeError::ValueMismatch);
        }
        let width = self.width();
        let raw = value as u32;
        match endian {
            Endianness::Little => out.write(&raw.to_le_bytes()[..width]),
            Endianness::Big => out.write(&raw.to_be_bytes()[4 - width..]),
        }
    }
}

/// Legal values of an enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidValues {
    /// Inclusive, contiguous range of discriminants
    Range { min: i64, max: i64 },
    Set(&'static [i64]),
}

impl ValidValues {
    pub const fn contains(&self, value: i64) -> bool {
        match self {
            ValidValues::Range { min, max } => value >= *min && value <= *max,
            ValidValues::Set(values) => {
                let mut i = 0;
                while i < values.len() {
                    if values[i] == value {
                        return true;
                    }
                    i += 1;
                }
                false
            },
        }
    }

    /// Lowest legal discriminant, used as default
    pub const fn first(&self) -> i64 {
        match self {
            ValidValues::Range { min, .. } => *min,
            ValidValues::Set(values) => {
                if values.is_empty() {
                    0
                } else {
                    values[0]
                }
            },
        }
    }
}

/// Plain integer with an optional inclusive range
#[derive(Debug, Clone, Copy)]
pub struct IntField {
    repr: IntRepr,
    endian: Endianness,
    range: Option<(i64, i64)>,
}

impl IntField {
    pub const fn new(repr: IntRepr) -> Self {
        Self {
            repr,
            endian: Endianness::Little,
            range: None,
        }
    }

    pub const fn with_range(self, min: i64, max: i64) -> Self {
        assert!(min <= max, "empty range");
        Self {
            range: Some((min, max)),
            ..self
        }
    }

    pub const fn with_endian(self, endian: Endianness) -> Self {
        Self { endian, ..self }
    }

    pub const fn repr(&self) -> IntRepr {
        self.repr
    }

    pub const fn range(&self) -> Option<(i64, i64)> {
        self.range
    }
}

impl FieldCodec for IntField {
    fn decode(&self, buf: &[u8], _siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        let (value, used) = self.repr.read(buf, self.endian)?;
        Ok((Value::Int(value), used))
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        let value = value.as_int().ok_or(EncodeError::ValueMismatch)?;
        self.repr.write(value, self.endian, out)
    }

    fn validate(&self, value: &Value, _siblings: &[Value]) -> bool {
        match value.as_int() {
            Some(v) => {
                self.repr.fits(v)
                    && self
                        .range
                        .is_none_or(|(min, max)| (min..=max).contains(&v))
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
        Value::Int(self.range.map_or(0, |(min, _)| min))
    }
}

/// Integer restricted to a set of discriminants
#[derive(Debug, Clone, Copy)]
pub struct EnumField {
    repr: IntRepr,
    values: ValidValues,
}

impl EnumField {
    pub const fn new(repr: IntRepr, values: ValidValues) -> Self {
        Self { repr, values }
    }

    pub const fn repr(&self) -> IntRepr {
        self.repr
    }

    pub const fn values(&self) -> ValidValues {
        self.values
    }
}

impl FieldCodec for EnumField {
    fn decode(&self, buf: &[u8], _siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        let (value, used) = self.repr.read(buf, Endianness::Little)?;
        Ok((Value::Int(value), used))
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        let value = value.as_int().ok_or(EncodeError::ValueMismatch)?;
        self.repr.write(value, Endianness::Little, out)
    }

    fn validate(&self, value: &Value, _siblings: &[Value]) -> bool {
        value
            .as_int()
            .is_some_and(|v| self.repr.fits(v) && self.values.contains(v))
    }

    fn encoded_len(&self, _value: &Value) -> usize {
        self.repr.width()
    }

    fn min_len(&self) -> usize {
        self.repr.width()
    }

    fn default_value(&self, _siblings: &[Value]) -> Value {
        Value::Int(self.values.first())
    }
}

/// Unsigned integer of flags where `reserved` bits must stay clear
#[derive(Debug, Clone, Copy)]
pub struct BitmaskField {
    repr: IntRepr,
    reserved: u64,
}

impl BitmaskField {
    pub const fn new(repr: IntRepr, reserved: u64) -> Self {
        assert!(!repr.is_signed(), "bitmask must be unsigned");
        Self { repr, reserved }
    }

    pub const fn repr(&self) -> IntRepr {
        self.repr
    }

    pub const fn reserved(&self) -> u64 {
        self.reserved
    }
}

impl FieldCodec for BitmaskField {
    fn decode(&self, buf: &[u8], _siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        let (value, used) = self.repr.read(buf, Endianness::Little)?;
        Ok((Value::Int(value), used))
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        let value = value.as_int().ok_or(EncodeError::ValueMismatch)?;
        self.repr.write(value, Endianness::Little, out)
    }

    fn validate(&self, value: &Value, _siblings: &[Value]) -> bool {
        value
            .as_int()
            .is_some_and(|v| self.repr.fits(v) && (v as u64) & self.reserved == 0)
    }

    fn encoded_len(&self, _value: &Value) -> usize {
        self.repr.width()
    }

    fn min_len(&self) -> usize {
        self.repr.width()
    }

    fn default_value(&self, _siblings: &[Value]) -> Value {
        Value::Int(0)
    }
}

/// Class and id of another message, stored big-endian
#[derive(Debug, Clone, Copy)]
pub struct MsgIdField;

impl FieldCodec for MsgIdField {
    fn decode(&self, buf: &[u8], _siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        let (value, used) = IntRepr::U2.read(buf, Endianness::Big)?;
        Ok((Value::Int(value), used))
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        let value = value.as_int().ok_or(EncodeError::ValueMismatch)?;
        IntRepr::U2.write(value, Endianness::Big, out)
    }

    fn validate(&self, value: &Value, _siblings: &[Value]) -> bool {
        value
            .as_int()
            .and_then(|v| u16::try_from(v).ok())
            .is_some_and(|raw| MsgId::from_raw(raw).is_valid())
    }

    fn encoded_len(&self, _value: &Value) -> usize {
        IntRepr::U2.width()
    }

    fn min_len(&self) -> usize {
        IntRepr::U2.width()
    }

    fn default_value(&self, _siblings: &[Value]) -> Value {
        Value::Int(0)
    }
}
