//! # ubx_codec
//!
//! Framing, field model and message dispatch for the u-blox UBX protocol.
//!
//! Every message layout is data: a static list of [`FieldDef`]s wrapped in a
//! [`MessageKind`]. A [`Dispatcher`] maps the id of an incoming frame onto the
//! kinds registered for it and decodes the payload into a [`Message`], a
//! vector of [`Value`]s in layout order.
//!
//! Constructing Packets
//! ====================
//!
//! Start from the defaults of a kind, set fields by name and write the frame:
//! ```
//! use ubx_codec::{messages::cfg::CFG_PRT_SPI, InProtoMask, Message};
//!
//! let mut msg = Message::new(&CFG_PRT_SPI);
//! msg.set("inProtoMask", InProtoMask::UBX.bits());
//! assert!(msg.valid());
//! let bytes = msg.to_frame_bytes().unwrap();
//! assert_eq!(bytes.len(), 28);
//! ```
//!
//! Parsing Packets
//! ===============
//!
//! Feed bytes to a `Parser` as they arrive, in chunks of any size:
//! ```
//! use ubx_codec::Parser;
//!
//! let mut parser = Parser::default();
//! let my_raw_data = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38];
//! let mut it = parser.consume(&my_raw_data);
//! loop {
//!     match it.next() {
//!         Some(Ok(packet)) => {
//!             assert_eq!(packet.name(), Some("ACK-ACK"));
//!         }
//!         Some(Err(_)) => {
//!             // Received a malformed packet
//!         }
//!         None => {
//!             // The internal buffer is now empty
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! A complete frame already in memory can be decoded directly with
//! [`decode_frame`].
//!
//! no_std Support
//! ==============
//!
//! Without the `std` feature the crate only needs `alloc`. A parser that never
//! grows its buffer is built with a [`FixedBuffer`]:
//! ```
//! let mut parser = ubx_codec::ParserBuilder::new().with_fixed_buffer::<256>();
//! assert!(parser.is_buffer_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

pub use crate::{
    constants::{
        MAX_PAYLOAD_LEN, UBX_CHECKSUM_LEN, UBX_FRAME_OVERHEAD, UBX_HEADER_LEN, UBX_SYNC_CHAR_1,
        UBX_SYNC_CHAR_2,
    },
    dispatcher::{Dispatcher, Packet, UbxUnknownPacket},
    error::{DateTimeError, EncodeError, ErrorStatus, ParserError},
    field::{FieldCodec, FieldDef, Value},
    frame::{
        decode_frame, read_checksum, ubx_checksum, write_frame, write_raw_frame, FrameHeader,
        MemWriter, SliceWriter, UbxChecksumCalc,
    },
    message::{Message, MessageKind, ReadGuard, RefreshFn},
    messages::{
        CfgPrtFlags, CfgTp5Flags, InProtoMask, LogCfg, NavBbrMask, NavStatusFlags,
        NavTimeGpsValid, OutProtoMask, SvInfoFlags,
    },
    msg_id::{MsgClass, MsgId},
    parser::{FixedBuffer, Parser, ParserBuilder, ParserIter, UnderlyingBuffer},
    types::{c_string, gps_time_to_utc, Position},
};

mod constants;
mod dispatcher;
mod error;
pub mod field;
mod frame;
mod message;
pub mod messages;
mod msg_id;
mod parser;
mod types;
