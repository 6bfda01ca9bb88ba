use alloc::vec::Vec;

use super::{primitive::Endianness, Field, FieldCodec, IntRepr, Value};
use crate::{
    error::{EncodeError, ParserError},
    frame::MemWriter,
};

/// Where a list learns how many elements it holds
#[derive(Debug, Clone, Copy)]
pub enum ListCount {
    /// Always exactly this many elements
    Fixed(usize),
    /// Element count stored in front of the elements
    Prefix(IntRepr),
    /// Byte length of the elements stored in front of them
    BytePrefix(IntRepr),
    /// Element count held by the sibling at this index
    FromField(usize),
    /// Everything up to the end of the payload
    Remaining,
}

/// Homogeneous sequence of `elem`
#[derive(Debug, Clone, Copy)]
pub struct ListField {
    elem: &'static Field,
    count: ListCount,
}

impl ListField {
    pub const fn new(elem: &'static Field, count: ListCount) -> Self {
        match count {
            ListCount::Fixed(_) => {},
            ListCount::Prefix(repr) | ListCount::BytePrefix(repr) => {
                assert!(!repr.is_signed(), "list prefix must be unsigned");
                assert!(
                    elem.const_min_len() > 0,
                    "elements of a variable list must occupy at least one byte"
                );
            },
            ListCount::FromField(_) | ListCount::Remaining => {
                assert!(
                    elem.const_min_len() > 0,
                    "elements of a variable list must occupy at least one byte"
                );
            },
        }
        Self { elem, count }
    }

    pub const fn elem(&self) -> &'static Field {
        self.elem
    }

    pub const fn count(&self) -> ListCount {
        self.count
    }

    pub(crate) const fn const_min_len(&self) -> usize {
        match self.count {
            ListCount::Fixed(n) => n * self.elem.const_min_len(),
            ListCount::Prefix(repr) | ListCount::BytePrefix(repr) => repr.width(),
            ListCount::FromField(_) | ListCount::Remaining => 0,
        }
    }

    fn decode_counted(
        &self,
        buf: &[u8],
        start: usize,
        count: usize,
    ) -> Result<(Value, usize), ParserError> {
        let required = count
            .saturating_mul(self.elem.min_len())
            .saturating_add(start);
        if buf.len() < required {
            return Err(ParserError::InsufficientData {
                required,
                available: buf.len(),
            });
        }
        let mut items = Vec::with_capacity(count);
        let mut offset = start;
        for _ in 0..count {
            let (item, used) = self
                .elem
                .decode(&buf[offset..], &[])
                .map_err(|err| err.offset_by(offset))?;
            offset += used;
            items.push(item);
        }
        Ok((Value::List(items), offset))
    }

    fn decode_to_end(&self, buf: &[u8]) -> Result<Vec<Value>, ParserError> {
        let mut items = Vec::new();
        let mut offset = 0;
        while offset < buf.len() {
            let (item, used) = self
                .elem
                .decode(&buf[offset..], &[])
                .map_err(|err| err.offset_by(offset))?;
            offset += used;
            items.push(item);
        }
        Ok(items)
    }

    fn elements_len(&self, items: &[Value]) -> usize {
        items.iter().map(|item| self.elem.encoded_len(item)).sum()
    }
}

impl FieldCodec for ListField {
    fn decode(&self, buf: &[u8], siblings: &[Value]) -> Result<(Value, usize), ParserError> {
        match self.count {
            ListCount::Fixed(n) => self.decode_counted(buf, 0, n),
            ListCount::Prefix(repr) => {
                let (count, used) = repr.read(buf, Endianness::Little)?;
                self.decode_counted(buf, used, count as usize)
            },
            ListCount::FromField(idx) => {
                let count = siblings
                    .get(idx)
                    .and_then(Value::as_int)
                    .and_then(|v| usize::try_from(v).ok())
                    .unwrap_or(0);
                self.decode_counted(buf, 0, count)
            },
            ListCount::BytePrefix(repr) => {
                let (len, used) = repr.read(buf, Endianness::Little)?;
                let end = used + len as usize;
                let body = buf.get(used..end).ok_or(ParserError::InsufficientData {
                    required: end,
                    available: buf.len(),
                })?;
                let items = self
                    .decode_to_end(body)
                    .map_err(|err| err.offset_by(used))?;
                Ok((Value::List(items), end))
            },
            ListCount::Remaining => {
                let items = self.decode_to_end(buf)?;
                Ok((Value::List(items), buf.len()))
            },
        }
    }

    fn encode(&self, value: &Value, out: &mut dyn MemWriter) -> Result<(), EncodeError> {
        let items = value.as_list().ok_or(EncodeError::ValueMismatch)?;
        match self.count {
            ListCount::Fixed(n) if items.len() != n => return Err(EncodeError::ValueMismatch),
            ListCount::Prefix(repr) => {
                let count = i64::try_from(items.len()).map_err(|_| EncodeError::ValueMismatch)?;
                repr.write(count, Endianness::Little, out)?;
            },
            ListCount::BytePrefix(repr) => {
                let len = i64::try_from(self.elements_len(items))
                    .map_err(|_| EncodeError::ValueMismatch)?;
                repr.write(len, Endianness::Little, out)?;
            },
            ListCount::Fixed(_) | ListCount::FromField(_) | ListCount::Remaining => {},
        }
        for item in items {
            self.elem.encode(item, out)?;
        }
        Ok(())
    }

    fn validate(&self, value: &Value, siblings: &[Value]) -> bool {
        let items = match value.as_list() {
            Some(items) => items,
            None => return false,
        };
        let len = items.len() as i64;
        let count_ok = match self.count {
            ListCount::Fixed(n) => items.len() == n,
            ListCount::Prefix(repr) => repr.fits(len),
            ListCount::BytePrefix(repr) => repr.fits(self.elements_len(items) as i64),
            ListCount::FromField(idx) => siblings.get(idx).and_then(Value::as_int) == Some(len),
            ListCount::Remaining => true,
        };
        count_ok && items.iter().all(|item| self.elem.validate(item, &[]))
    }

    fn encoded_len(&self, value: &Value) -> usize {
        let items = value.as_list().unwrap_or_default();
        let prefix = match self.count {
            ListCount::Prefix(repr) | ListCount::BytePrefix(repr) => repr.width(),
            _ => 0,
        };
        prefix + self.elements_len(items)
    }

    fn min_len(&self) -> usize {
        self.const_min_len()
    }

    fn default_value(&self, siblings: &[Value]) -> Value {
        let count = match self.count {
            ListCount::Fixed(n) => n,
            ListCount::FromField(idx) => siblings
                .get(idx)
                .and_then(Value::as_int)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(0),
            ListCount::Prefix(_) | ListCount::BytePrefix(_) | ListCount::Remaining => 0,
        };
        let elem = self.elem.default_value(&[]);
        Value::List(alloc::vec![elem; count])
    }
}
