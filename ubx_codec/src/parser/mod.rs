//! Streaming front end over the frame decoder.
//!
//! Bytes may arrive in chunks of any size; the parser keeps partial frames in
//! its [`UnderlyingBuffer`] until they are complete.

mod buffer;

use alloc::vec::Vec;

use log::{debug, trace, warn};

pub use self::buffer::{FixedBuffer, UnderlyingBuffer};
use crate::{
    constants::{
        MAX_PAYLOAD_LEN, UBX_FRAME_OVERHEAD, UBX_HEADER_LEN, UBX_LENGTH_OFFSET, UBX_SYNC_CHAR_1,
        UBX_SYNC_CHAR_2,
    },
    dispatcher::{Dispatcher, Packet},
    error::ParserError,
    frame,
};

/// Streaming UBX parser.
///
/// `Parser::default()` buffers in a `Vec<u8>` and decodes with
/// [`Dispatcher::standard`]; use [`ParserBuilder`] for anything else.
pub struct Parser<T = Vec<u8>>
where
    T: UnderlyingBuffer,
{
    buf: T,
    dispatcher: Dispatcher,
    max_payload_len: usize,
}

impl Default for Parser<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: UnderlyingBuffer> Parser<T> {
    pub fn new(underlying: T) -> Self {
        Self::with_dispatcher(underlying, Dispatcher::standard())
    }

    pub fn with_dispatcher(underlying: T, dispatcher: Dispatcher) -> Self {
        Self {
            buf: underlying,
            dispatcher,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Feeds `new_data` and returns an iterator over the frames now complete.
    /// Bytes the iterator does not get to are kept for the next call.
    pub fn consume<'a>(&'a mut self, new_data: &'a [u8]) -> ParserIter<'a, T> {
        ParserIter {
            buf: &mut self.buf,
            pending: new_data,
            dispatcher: &self.dispatcher,
            max_payload_len: self.max_payload_len,
        }
    }
}

/// Iterator over the frames held by a [`Parser`]
pub struct ParserIter<'a, T: UnderlyingBuffer> {
    buf: &'a mut T,
    pending: &'a [u8],
    dispatcher: &'a Dispatcher,
    max_payload_len: usize,
}

impl<T: UnderlyingBuffer> ParserIter<'_, T> {
    fn fill(&mut self) {
        let left = self.buf.extend_from_slice(self.pending);
        let copied = self.pending.len() - left;
        self.pending = &self.pending[copied..];
    }

    /// `Some(Ok(()))` once `count` bytes are buffered, `None` when waiting for
    /// more input, an error when the buffer can never hold them
    fn require(&mut self, count: usize) -> Option<Result<(), ParserError>> {
        if count > self.buf.max_capacity() {
            Some(Err(ParserError::OutOfMemory {
                required_size: count,
            }))
        } else if self.buf.len() >= count {
            Some(Ok(()))
        } else if self.pending.is_empty() {
            None
        } else {
            Some(Err(ParserError::OutOfMemory {
                required_size: count,
            }))
        }
    }

    #[allow(clippy::should_implement_trait)]
    /// Analog of `core::iter::Iterator::next`; the items do not borrow the
    /// parser, but the iterator keeps the input slice alive
    pub fn next(&mut self) -> Option<Result<Packet, ParserError>> {
        loop {
            self.fill();
            if self.buf.is_empty() {
                return None;
            }

            let pos = match self.buf.find(UBX_SYNC_CHAR_1) {
                Some(pos) => pos,
                None => {
                    trace!("dropping {} bytes without sync", self.buf.len());
                    self.buf.clear();
                    continue;
                },
            };
            if pos > 0 {
                trace!("dropping {} bytes before sync", pos);
                self.buf.drain(pos);
                continue;
            }

            match self.require(UBX_HEADER_LEN)? {
                Ok(()) => {},
                Err(err) => {
                    self.buf.drain(1);
                    return Some(Err(err));
                },
            }
            if self.buf[1] != UBX_SYNC_CHAR_2 {
                self.buf.drain(1);
                continue;
            }

            let payload_len = usize::from(u16::from_le_bytes([
                self.buf[UBX_LENGTH_OFFSET],
                self.buf[UBX_LENGTH_OFFSET + 1],
            ]));
            if payload_len > self.max_payload_len {
                warn!(
                    "skipping frame announcing {} payload bytes, limit is {}",
                    payload_len, self.max_payload_len
                );
                self.buf.drain(2);
                continue;
            }

            let frame_len = payload_len + UBX_FRAME_OVERHEAD;
            match self.require(frame_len)? {
                Ok(()) => {},
                Err(err) => {
                    debug!("frame of {} bytes does not fit the buffer", frame_len);
                    self.buf.drain(2);
                    return Some(Err(err));
                },
            }

            let result = frame::decode_frame(&self.buf[0..frame_len], self.dispatcher);
            return Some(match result {
                Ok((packet, used)) => {
                    self.buf.drain(used);
                    Ok(packet)
                },
                Err(err @ ParserError::InvalidChecksum { .. }) => {
                    debug!("{}", err);
                    self.buf.drain(2);
                    Err(err)
                },
                Err(err) => {
                    // The announced length is only trusted once the checksum agrees
                    if frame::read_checksum(&self.buf[0..frame_len]).is_ok() {
                        debug!("dropping rejected frame: {}", err);
                        self.buf.drain(frame_len);
                    } else {
                        debug!("rejected payload behind a false sync: {}", err);
                        self.buf.drain(2);
                    }
                    Err(err)
                },
            });
        }
    }
}

impl<T: UnderlyingBuffer> Drop for ParserIter<'_, T> {
    fn drop(&mut self) {
        let lost = self.buf.extend_from_slice(self.pending);
        if lost > 0 {
            warn!("parser buffer full, {} bytes lost", lost);
        }
    }
}

/// Configures a [`Parser`]
#[derive(Debug, Clone)]
pub struct ParserBuilder {
    dispatcher: Option<Dispatcher>,
    max_payload_len: usize,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self {
            dispatcher: None,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Frames announcing a longer payload are skipped without being buffered
    pub fn with_max_payload_len(mut self, len: usize) -> Self {
        self.max_payload_len = len;
        self
    }

    pub fn with_vec_buffer(self) -> Parser<Vec<u8>> {
        self.with_buffer(Vec::new())
    }

    pub fn with_fixed_buffer<const N: usize>(self) -> Parser<FixedBuffer<N>> {
        self.with_buffer(FixedBuffer::new())
    }

    pub fn with_buffer<T: UnderlyingBuffer>(self, buf: T) -> Parser<T> {
        Parser {
            buf,
            dispatcher: self.dispatcher.unwrap_or_default(),
            max_payload_len: self.max_payload_len,
        }
    }
}
