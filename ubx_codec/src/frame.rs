//! The UBX envelope: sync characters, message id, payload length, payload and
//! a Fletcher checksum over everything between the sync characters and the
//! checksum itself.

use alloc::vec::Vec;

use crate::{
    constants::{
        UBX_CHECKSUM_LEN, UBX_FRAME_OVERHEAD, UBX_HEADER_LEN, UBX_LENGTH_OFFSET,
        UBX_MSG_ID_OFFSET, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
    },
    dispatcher::{Dispatcher, Packet},
    error::{EncodeError, ParserError},
    msg_id::MsgId,
};

/// Sink for encoded bytes
pub trait MemWriter {
    /// make sure that we have at least `len` bytes for writing
    fn reserve_allocate(&mut self, len: usize) -> Result<(), EncodeError>;
    fn write(&mut self, buf: &[u8]) -> Result<(), EncodeError>;
}

impl MemWriter for Vec<u8> {
    fn reserve_allocate(&mut self, len: usize) -> Result<(), EncodeError> {
        self.reserve(len);
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), EncodeError> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

/// Writes into a caller provided slice, for targets without an allocator at hand
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl MemWriter for SliceWriter<'_> {
    fn reserve_allocate(&mut self, len: usize) -> Result<(), EncodeError> {
        if self.buf.len() - self.pos < len {
            return Err(EncodeError::NotEnoughMem);
        }
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), EncodeError> {
        let end = self.pos + buf.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(EncodeError::NotEnoughMem)?;
        dst.copy_from_slice(buf);
        self.pos = end;
        Ok(())
    }
}

/// UBX [Fletcher-16 checksum](https://en.wikipedia.org/wiki/Fletcher%27s_checksum) calculator supporting both streaming and single-shot validation
#[derive(Debug, Default, Clone, Copy)]
pub struct UbxChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl UbxChecksumCalc {
    pub const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    /// Update checksum with new bytes
    pub const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    /// Update checksum with a single byte
    pub const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    /// Get the current checksum result
    pub const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// Validate checksum and return result
    pub const fn validate_result(
        self,
        received_ck_a: u8,
        received_ck_b: u8,
    ) -> Result<(), ParserError> {
        if self.is_valid(received_ck_a, received_ck_b) {
            Ok(())
        } else {
            Err(ParserError::InvalidChecksum {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]),
                got: u16::from_le_bytes([self.ck_a, self.ck_b]),
            })
        }
    }

    const fn is_valid(&self, received_ck_a: u8, received_ck_b: u8) -> bool {
        self.ck_a == received_ck_a && self.ck_b == received_ck_b
    }
}

/// Checksum of `bytes`, which run from the class byte to the end of the payload
pub const fn ubx_checksum(bytes: &[u8]) -> (u8, u8) {
    let mut calc = UbxChecksumCalc::new();
    calc.update(bytes);
    calc.result()
}

/// Forwards writes while feeding them to a checksum
struct ChecksumWriter<'a> {
    inner: &'a mut dyn MemWriter,
    calc: UbxChecksumCalc,
}

impl MemWriter for ChecksumWriter<'_> {
    fn reserve_allocate(&mut self, len: usize) -> Result<(), EncodeError> {
        self.inner.reserve_allocate(len)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), EncodeError> {
        self.inner.write(buf)?;
        self.calc.update(buf);
        Ok(())
    }
}

/// Fixed part in front of the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: MsgId,
    pub payload_len: usize,
}

impl FrameHeader {
    /// Reads sync characters, id and length from the start of `buf`
    pub fn read(buf: &[u8]) -> Result<Self, ParserError> {
        for (pos, sync) in [UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2].into_iter().enumerate() {
            match buf.get(pos) {
                Some(byte) if *byte == sync => {},
                Some(_) => return Err(ParserError::ProtocolError),
                None => {
                    return Err(ParserError::InsufficientData {
                        required: UBX_HEADER_LEN,
                        available: buf.len(),
                    })
                },
            }
        }
        if buf.len() < UBX_HEADER_LEN {
            return Err(ParserError::InsufficientData {
                required: UBX_HEADER_LEN,
                available: buf.len(),
            });
        }
        let id = MsgId::from_be_bytes([buf[UBX_MSG_ID_OFFSET], buf[UBX_MSG_ID_OFFSET + 1]]);
        let payload_len =
            u16::from_le_bytes([buf[UBX_LENGTH_OFFSET], buf[UBX_LENGTH_OFFSET + 1]]).into();
        Ok(Self { id, payload_len })
    }

    /// Length of the whole frame, sync characters to checksum
    pub const fn frame_len(&self) -> usize {
        self.payload_len + UBX_FRAME_OVERHEAD
    }
}

/// Decodes one frame from the start of `buf`, returning the packet and the
/// number of bytes the frame occupied.
///
/// The payload is decoded first, bounded so that it can never reach into the
/// checksum; the checksum is verified last, over the complete frame. A payload
/// rejected by every registered layout is reported before the checksum is
/// looked at.
pub fn decode_frame(buf: &[u8], dispatcher: &Dispatcher) -> Result<(Packet, usize), ParserError> {
    let header = FrameHeader::read(buf)?;
    let frame_len = header.frame_len();
    if buf.len() < frame_len {
        return Err(ParserError::InsufficientData {
            required: frame_len,
            available: buf.len(),
        });
    }

    let size = frame_len - UBX_CHECKSUM_LEN;
    let packet = dispatcher.decode(header.id, &buf[UBX_HEADER_LEN..size])?;

    read_checksum(&buf[..frame_len])?;
    Ok((packet, frame_len))
}

/// Verifies the trailing checksum of a complete frame
pub fn read_checksum(frame: &[u8]) -> Result<(), ParserError> {
    if frame.len() < UBX_FRAME_OVERHEAD {
        return Err(ParserError::InsufficientData {
            required: UBX_FRAME_OVERHEAD,
            available: frame.len(),
        });
    }
    let ck_pos = frame.len() - UBX_CHECKSUM_LEN;
    let mut calc = UbxChecksumCalc::new();
    calc.update(&frame[UBX_MSG_ID_OFFSET..ck_pos]);
    calc.validate_result(frame[ck_pos], frame[ck_pos + 1])
}

/// Writes a complete frame, `body` supplying exactly `payload_len` bytes
pub fn write_frame<F>(
    id: MsgId,
    payload_len: usize,
    out: &mut dyn MemWriter,
    body: F,
) -> Result<(), EncodeError>
where
    F: FnOnce(&mut dyn MemWriter) -> Result<(), EncodeError>,
{
    let len = u16::try_from(payload_len)
        .map_err(|_| EncodeError::PayloadTooLarge { len: payload_len })?;
    out.reserve_allocate(payload_len + UBX_FRAME_OVERHEAD)?;
    out.write(&[UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2])?;

    let mut writer = ChecksumWriter {
        inner: &mut *out,
        calc: UbxChecksumCalc::new(),
    };
    writer.write(&id.to_be_bytes())?;
    writer.write(&len.to_le_bytes())?;
    body(&mut writer)?;
    let (ck_a, ck_b) = writer.calc.result();

    out.write(&[ck_a, ck_b])
}

/// Frames an already encoded payload
pub fn write_raw_frame(
    id: MsgId,
    payload: &[u8],
    out: &mut dyn MemWriter,
) -> Result<(), EncodeError> {
    write_frame(id, payload.len(), out, |w| w.write(payload))
}
