//! Maps a message id onto the message kinds registered for it.

use alloc::vec::Vec;

use log::{debug, trace};

use crate::{
    error::{EncodeError, ParserError},
    frame,
    message::{Message, MessageKind},
    messages,
    msg_id::MsgId,
};

/// Frame whose id has no registered kind. Carries the raw payload so that it
/// can be forwarded or logged.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UbxUnknownPacket {
    pub id: MsgId,
    pub payload: Vec<u8>,
}

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Packet {
    Known(Message),
    Unknown(UbxUnknownPacket),
}

impl Packet {
    pub fn msg_id(&self) -> MsgId {
        match self {
            Packet::Known(msg) => msg.id(),
            Packet::Unknown(unknown) => unknown.id,
        }
    }

    /// Name of the decoded kind, `None` for unknown frames
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Packet::Known(msg) => Some(msg.name()),
            Packet::Unknown(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Packet::Known(msg) => Some(msg),
            Packet::Unknown(_) => None,
        }
    }

    pub fn to_frame_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            Packet::Known(msg) => msg.to_frame_bytes(),
            Packet::Unknown(unknown) => {
                let mut out = Vec::new();
                frame::write_raw_frame(unknown.id, &unknown.payload, &mut out)?;
                Ok(out)
            },
        }
    }
}

/// Immutable registry of message kinds.
///
/// Several kinds may share one id, a poll request and the full message for
/// example. Decoding tries them in registration order and keeps the first that
/// accepts the payload.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    kinds: Vec<&'static MessageKind>,
}

impl Dispatcher {
    pub fn new(kinds: &[&'static MessageKind]) -> Self {
        let mut kinds = kinds.to_vec();
        // stable, so registration order survives within one id
        kinds.sort_by_key(|kind| kind.id());
        Self { kinds }
    }

    /// Dispatcher over every message kind this crate ships
    pub fn standard() -> Self {
        Self::new(messages::ALL)
    }

    /// Every registered kind, ordered by id
    pub fn catalog(&self) -> &[&'static MessageKind] {
        &self.kinds
    }

    /// Kinds registered for `id`, in registration order
    pub fn kinds_for(&self, id: MsgId) -> &[&'static MessageKind] {
        let start = self.kinds.partition_point(|kind| kind.id() < id);
        let end = self.kinds.partition_point(|kind| kind.id() <= id);
        &self.kinds[start..end]
    }

    pub fn find(&self, name: &str) -> Option<&'static MessageKind> {
        self.kinds.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn is_registered(&self, id: MsgId) -> bool {
        !self.kinds_for(id).is_empty()
    }

    /// Decodes a payload already cut out of its frame.
    ///
    /// When every candidate rejects the payload, a rejection on content is
    /// preferred over a length mismatch, so that a port variant with the wrong
    /// port id is reported as such rather than as the poll request sharing its
    /// id being too long.
    pub fn decode(&self, id: MsgId, payload: &[u8]) -> Result<Packet, ParserError> {
        let candidates = self.kinds_for(id);
        if candidates.is_empty() {
            debug!("no message kind registered for {}, {} payload bytes", id, payload.len());
            return Ok(Packet::Unknown(UbxUnknownPacket {
                id,
                payload: payload.to_vec(),
            }));
        }

        let mut best: Option<ParserError> = None;
        for kind in candidates {
            match Message::decode_payload(kind, payload) {
                Ok(msg) => return Ok(Packet::Known(msg)),
                Err(err) => {
                    trace!("{} rejected {} payload bytes: {}", kind.name(), payload.len(), err);
                    best = match best {
                        None => Some(err),
                        Some(ParserError::InvalidPacketLen { .. })
                            if !matches!(err, ParserError::InvalidPacketLen { .. }) =>
                        {
                            Some(err)
                        },
                        keep => keep,
                    };
                },
            }
        }
        Err(best.unwrap_or(ParserError::ProtocolError))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::standard()
    }
}
