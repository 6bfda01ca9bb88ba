//! Frame level behaviour of `decode_frame`: sync, length, id and checksum
//! handling on complete buffers.

use byteorder::{LittleEndian, WriteBytesExt};
use proptest::prelude::*;
use ubx_codec::{decode_frame, Dispatcher, ErrorStatus, MsgId, Packet, ParserError, Value};

/// ACK-ACK acknowledging NAV-POSLLH
static ACK_NAV_POSLLH: [u8; 10] = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x01, 0x02, 0x0b, 0x2f];

/// Calculates the 8-bit Fletcher-16 checksum used by u-blox.
fn calculate_checksum(data: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for byte in data {
        ck_a = ck_a.wrapping_add(*byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    (ck_a, ck_b)
}

/// Builds a frame by hand, independently of the crate's writer
fn reference_frame(class_id: u8, message_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame_core = Vec::with_capacity(4 + payload.len());
    frame_core.push(class_id);
    frame_core.push(message_id);
    frame_core
        .write_u16::<LittleEndian>(payload.len() as u16)
        .unwrap();
    frame_core.extend_from_slice(payload);

    let (ck_a, ck_b) = calculate_checksum(&frame_core);

    let mut final_frame = Vec::with_capacity(8 + payload.len());
    final_frame.push(0xB5);
    final_frame.push(0x62);
    final_frame.extend_from_slice(&frame_core);
    final_frame.push(ck_a);
    final_frame.push(ck_b);
    final_frame
}

#[test]
fn test_decode_ack_ack() {
    let dispatcher = Dispatcher::standard();
    let (packet, used) = decode_frame(&ACK_NAV_POSLLH, &dispatcher).unwrap();
    assert_eq!(used, ACK_NAV_POSLLH.len());
    assert_eq!(packet.name(), Some("ACK-ACK"));
    let msg = packet.as_message().unwrap();
    assert_eq!(msg.field("id"), Some(&Value::from(MsgId::NAV_POSLLH)));
    assert_eq!(msg.get_as::<u16>("id"), Some(0x0102));

    assert_eq!(packet.to_frame_bytes().unwrap(), ACK_NAV_POSLLH);
}

#[test]
fn test_reference_frame_matches() {
    assert_eq!(reference_frame(0x05, 0x01, &[0x01, 0x02]), ACK_NAV_POSLLH);
}

#[test]
fn test_trailing_bytes_are_not_consumed() {
    let mut bytes = ACK_NAV_POSLLH.to_vec();
    bytes.extend_from_slice(&[0xb5, 0x62, 0x05]);
    let (_, used) = decode_frame(&bytes, &Dispatcher::standard()).unwrap();
    assert_eq!(used, ACK_NAV_POSLLH.len());
}

#[test]
fn test_every_prefix_is_insufficient() {
    let dispatcher = Dispatcher::standard();
    for len in 0..ACK_NAV_POSLLH.len() {
        let err = decode_frame(&ACK_NAV_POSLLH[..len], &dispatcher).unwrap_err();
        assert_eq!(err.status(), ErrorStatus::InsufficientData, "prefix {}", len);
        assert!(err.is_retryable());
    }
}

#[test]
fn test_bad_sync_is_protocol_error() {
    let dispatcher = Dispatcher::standard();
    for pos in 0..2 {
        let mut bytes = ACK_NAV_POSLLH;
        bytes[pos] = 0x00;
        assert_eq!(
            decode_frame(&bytes, &dispatcher).unwrap_err(),
            ParserError::ProtocolError
        );
    }
}

#[test]
fn test_short_payload_is_invalid_len() {
    let bytes = reference_frame(0x05, 0x01, &[0x01]);
    assert_eq!(
        decode_frame(&bytes, &Dispatcher::standard()).unwrap_err(),
        ParserError::InvalidPacketLen {
            packet: "ACK-ACK",
            expect: 2,
            got: 1
        }
    );
}

#[test]
fn test_payload_rejection_comes_before_checksum() {
    let mut bytes = reference_frame(0x05, 0x01, &[0x01, 0x02, 0x03]);
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(
        decode_frame(&bytes, &Dispatcher::standard()),
        Err(ParserError::InvalidPacketLen { .. })
    ));
}

#[test]
fn test_unknown_id_round_trips() {
    // TIM-TP, known id without a registered layout
    let bytes = reference_frame(0x0d, 0x01, &[1, 2, 3, 4]);
    let (packet, _) = decode_frame(&bytes, &Dispatcher::standard()).unwrap();
    let Packet::Unknown(unknown) = &packet else {
        panic!("TIM-TP has no layout");
    };
    assert_eq!(unknown.id, MsgId::new(0x0d, 0x01));
    assert_eq!(unknown.payload, [1, 2, 3, 4]);
    assert_eq!(packet.to_frame_bytes().unwrap(), bytes);
}

/// Positions whose corruption must be detected: class, id, payload and checksum
fn corrupted_position() -> impl Strategy<Value = usize> {
    prop_oneof![2usize..4, 6usize..ACK_NAV_POSLLH.len()]
}

proptest! {
    #[test]
    fn test_single_byte_corruption_is_invalid((pos, flip) in (corrupted_position(), 1u8..=255)) {
        let mut bytes = ACK_NAV_POSLLH;
        bytes[pos] ^= flip;
        let err = decode_frame(&bytes, &Dispatcher::standard()).unwrap_err();
        prop_assert_eq!(err.status(), ErrorStatus::InvalidMsgData);
    }

    #[test]
    fn test_shrinking_length_is_invalid(len in 0u16..2) {
        let mut bytes = ACK_NAV_POSLLH;
        bytes[4..6].copy_from_slice(&len.to_le_bytes());
        let err = decode_frame(&bytes, &Dispatcher::standard()).unwrap_err();
        prop_assert_eq!(err.status(), ErrorStatus::InvalidMsgData);
    }

    #[test]
    fn test_growing_length_wants_more_data(len in 3u16..=u16::MAX) {
        let mut bytes = ACK_NAV_POSLLH;
        bytes[4..6].copy_from_slice(&len.to_le_bytes());
        let err = decode_frame(&bytes, &Dispatcher::standard()).unwrap_err();
        prop_assert_eq!(
            err,
            ParserError::InsufficientData {
                required: usize::from(len) + 8,
                available: ACK_NAV_POSLLH.len()
            }
        );
    }

    #[test]
    fn test_acknowledged_id_survives((class_id, message_id) in (any::<u8>(), any::<u8>())) {
        let bytes = reference_frame(0x05, 0x01, &[class_id, message_id]);
        let (packet, used) = decode_frame(&bytes, &Dispatcher::standard()).unwrap();
        prop_assert_eq!(used, bytes.len());
        let msg = packet.as_message().unwrap();
        prop_assert_eq!(msg.get_as::<u16>("id"), Some(u16::from_be_bytes([class_id, message_id])));
        prop_assert_eq!(packet.to_frame_bytes().unwrap(), bytes);
    }
}
