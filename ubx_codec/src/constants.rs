pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_SIZE: usize = 2;
pub(crate) const UBX_MSG_ID_LEN: usize = 2;
pub(crate) const UBX_PAYLOAD_SIZE_LEN: usize = 2;
pub const UBX_HEADER_LEN: usize = UBX_SYNC_SIZE + UBX_MSG_ID_LEN + UBX_PAYLOAD_SIZE_LEN;
pub const UBX_CHECKSUM_LEN: usize = 2;
/// Bytes every frame carries around its payload
pub const UBX_FRAME_OVERHEAD: usize = UBX_HEADER_LEN + UBX_CHECKSUM_LEN;

pub(crate) const UBX_MSG_ID_OFFSET: usize = 2; // After SYNC_CHAR_1, SYNC_CHAR_2
pub(crate) const UBX_LENGTH_OFFSET: usize = 4; // After class and id

/// Largest payload the streaming parser accepts unless configured otherwise.
/// MON-VER with its extension strings is the longest message in the catalog.
pub const MAX_PAYLOAD_LEN: usize = 1240;
