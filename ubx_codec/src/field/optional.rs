use super::{Field, FieldCodec, Value};
use crate::{
    error::{EncodeError, ParserError},
    frame::MemWriter,
};

/// Field present only when `present` holds for the values decoded before it
#[derive(Debug, Clone, Copy)]
pub struct OptionalField {
    inner: &'static Field,
    present: fn(&[Value]) -> bool,
}

impl OptionalField {
    pub const fn new(inner: &'static Field, present: fn(&[Value]) -> bool) -> Self {
        Self { inner, present }
    }

    pub const fn inner(&self) -> &'static Field {
        self.inner
    }

    pub fn is_present(&self, siblings: &[Value]) -> bool {
        (self.present)(siblings)
    }
}

impl FieldCodec for OptionalField {
    fn decode(&self, buf: &[u8], siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        if self.is_present(siblings) {
            self.inner.decode(buf, siblings)
        } else {
            Ok((Value::Absent, 0))
        }
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        match value {
            Value::Absent => Ok(()),
            _ => self.inner.encode(value, out),
        }
    }

    fn validate(&self, value: &Value, siblings: &[Value]) -> bool {
        match (self.is_present(siblings), value) {
            (false, Value::Absent) => true,
            (true, Value::Absent) | (false, _) => false,
            (true, _) => self.inner.validate(value, siblings),
        }
    }

    fn encoded_len(&self, value: &Value) -> usize {
        match value {
            Value::Absent => 0,
            _ => self.inner.encoded_len(value),
        }
    }

    fn min_len(&self) -> usize {
        0
    }

    fn default_value(&self, siblings: &[Value]) -> Value {
        if self.is_present(siblings) {
            self.inner.default_value(siblings)
        } else {
            Value::Absent
        }
    }
}
