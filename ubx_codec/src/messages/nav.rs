use bitflags::bitflags;

use super::NO_FIELDS;
use crate::{
    field::{BitMember, Field, FieldDef, IntRepr, ListCount, ValidValues, Value},
    message::MessageKind,
    msg_id::MsgId,
};

bitflags! {
    /// Validity flags of NAV-TIMEGPS
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct NavTimeGpsValid: u8 {
        const TOW_VALID = 0x01;
        const WEEK_VALID = 0x02;
        const LEAP_S_VALID = 0x04;
    }
}

bitflags! {
    /// Navigation status flags of NAV-STATUS
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct NavStatusFlags: u8 {
        const GPS_FIX_OK = 0x01;
        const DIFF_SOLN = 0x02;
        const WKN_SET = 0x04;
        const TOW_SET = 0x08;
    }
}

bitflags! {
    /// Per channel flags of NAV-SVINFO
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct SvInfoFlags: u8 {
        const SV_USED = 0x01;
        const DIFF_CORR = 0x02;
        const ORBIT_AVAIL = 0x04;
        const ORBIT_EPH = 0x08;
        const UNHEALTHY = 0x10;
        const ORBIT_ALM = 0x20;
        const ORBIT_AOP = 0x40;
        const SMOOTHED = 0x80;
    }
}

const ITOW: FieldDef = FieldDef::new("iTOW", Field::u4());

const NAV_POSECEF_FIELDS: &[FieldDef] = &[
    ITOW,
    FieldDef::new("ecefX", Field::i4()),
    FieldDef::new("ecefY", Field::i4()),
    FieldDef::new("ecefZ", Field::i4()),
    FieldDef::new("pAcc", Field::u4()),
];

const NAV_POSLLH_FIELDS: &[FieldDef] = &[
    ITOW,
    FieldDef::new("lon", Field::i4()),
    FieldDef::new("lat", Field::i4()),
    FieldDef::new("height", Field::i4()),
    FieldDef::new("hMSL", Field::i4()),
    FieldDef::new("hAcc", Field::u4()),
    FieldDef::new("vAcc", Field::u4()),
];

const NAV_VELECEF_FIELDS: &[FieldDef] = &[
    ITOW,
    FieldDef::new("ecefVX", Field::i4()),
    FieldDef::new("ecefVY", Field::i4()),
    FieldDef::new("ecefVZ", Field::i4()),
    FieldDef::new("sAcc", Field::u4()),
];

const FIX_STAT_MEMBERS: &[BitMember] = &[
    BitMember::flag("dgpsIStat"),
    BitMember::reserved(5),
    BitMember::enumeration("mapMatching", 2, ValidValues::Range { min: 0, max: 3 }),
];

const FLAGS2_MEMBERS: &[BitMember] = &[
    BitMember::enumeration("psmState", 2, ValidValues::Range { min: 0, max: 3 }),
    BitMember::reserved(6),
];

const NAV_STATUS_FIELDS: &[FieldDef] = &[
    ITOW,
    FieldDef::new("gpsFix", Field::enum_range(IntRepr::U1, 0, 5)),
    FieldDef::new(
        "flags",
        Field::bitmask(IntRepr::U1, !NavStatusFlags::all().bits() as u64),
    ),
    FieldDef::new("fixStat", Field::bitfield(IntRepr::U1, FIX_STAT_MEMBERS)),
    FieldDef::new("flags2", Field::bitfield(IntRepr::U1, FLAGS2_MEMBERS)),
    FieldDef::new("ttff", Field::u4()),
    FieldDef::new("msss", Field::u4()),
];

const NAV_TIMEGPS_FIELDS: &[FieldDef] = &[
    ITOW,
    FieldDef::new("fTOW", Field::int_range(IntRepr::I4, -500_000, 500_000)),
    FieldDef::new("week", Field::i2()),
    FieldDef::new("leapS", Field::i1()),
    FieldDef::new(
        "valid",
        Field::bitmask(IntRepr::U1, !NavTimeGpsValid::all().bits() as u64),
    ),
    FieldDef::new("tAcc", Field::u4()),
];

const GLOBAL_FLAGS_MEMBERS: &[BitMember] = &[
    BitMember::enumeration("chipGen", 3, ValidValues::Range { min: 0, max: 4 }),
    BitMember::reserved(5),
];

const SV_CHANNEL_FIELDS: &[FieldDef] = &[
    FieldDef::new("chn", Field::u1()),
    FieldDef::new("svid", Field::u1()),
    FieldDef::new("flags", Field::bitmask(IntRepr::U1, 0)),
    FieldDef::new("quality", Field::enum_range(IntRepr::U1, 0, 7)),
    FieldDef::new("cno", Field::u1()),
    FieldDef::new("elev", Field::i1()),
    FieldDef::new("azim", Field::i2()),
    FieldDef::new("prRes", Field::i4()),
];
const SV_CHANNEL: Field = Field::bundle(SV_CHANNEL_FIELDS);

const NUM_CH: usize = 1;

const NAV_SVINFO_FIELDS: &[FieldDef] = &[
    ITOW,
    FieldDef::new("numCh", Field::u1()),
    FieldDef::new("globalFlags", Field::bitfield(IntRepr::U1, GLOBAL_FLAGS_MEMBERS)),
    FieldDef::new("reserved2", Field::u2()),
    FieldDef::new("channels", Field::list(&SV_CHANNEL, ListCount::FromField(NUM_CH))),
];

/// Keeps `numCh` equal to the number of channel blocks
fn sync_channel_count(values: &mut [Value]) -> bool {
    let [_, num_ch, _, _, channels] = values else {
        return false;
    };
    let count = channels.as_list().map_or(0, <[Value]>::len) as i64;
    if num_ch.as_int() == Some(count) {
        return false;
    }
    *num_ch = Value::Int(count);
    true
}

pub static NAV_POSECEF: MessageKind =
    MessageKind::new("NAV-POSECEF", MsgId::NAV_POSECEF, NAV_POSECEF_FIELDS);
pub static NAV_POSLLH: MessageKind =
    MessageKind::new("NAV-POSLLH", MsgId::NAV_POSLLH, NAV_POSLLH_FIELDS);
pub static NAV_STATUS_POLL: MessageKind =
    MessageKind::new("NAV-STATUS-POLL", MsgId::NAV_STATUS, NO_FIELDS);
pub static NAV_STATUS: MessageKind =
    MessageKind::new("NAV-STATUS", MsgId::NAV_STATUS, NAV_STATUS_FIELDS);
pub static NAV_VELECEF: MessageKind =
    MessageKind::new("NAV-VELECEF", MsgId::NAV_VELECEF, NAV_VELECEF_FIELDS);
pub static NAV_TIMEGPS_POLL: MessageKind =
    MessageKind::new("NAV-TIMEGPS-POLL", MsgId::NAV_TIMEGPS, NO_FIELDS);
/// GPS time solution
pub static NAV_TIMEGPS: MessageKind =
    MessageKind::new("NAV-TIMEGPS", MsgId::NAV_TIMEGPS, NAV_TIMEGPS_FIELDS);
pub static NAV_TIMEUTC_POLL: MessageKind =
    MessageKind::new("NAV-TIMEUTC-POLL", MsgId::NAV_TIMEUTC, NO_FIELDS);
/// Space vehicle information, one block per receiver channel
pub static NAV_SVINFO: MessageKind =
    MessageKind::new("NAV-SVINFO", MsgId::NAV_SVINFO, NAV_SVINFO_FIELDS)
        .with_refresh(sync_channel_count);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{message::Message, ParserError};
    use alloc::vec;

    fn svinfo_payload(num_ch: u8, channels: usize) -> Vec<u8> {
        let mut payload = vec![0x10, 0x27, 0, 0, num_ch, 0x01, 0, 0];
        for i in 0..channels {
            payload.extend_from_slice(&[i as u8, 7, 0x0d, 7, 40, 30, 0x2c, 0x01, 0xff, 0xff, 0xff, 0xff]);
        }
        payload
    }

    #[test]
    fn svinfo_channels_follow_count() {
        let msg = Message::decode_payload(&NAV_SVINFO, &svinfo_payload(2, 2)).unwrap();
        assert!(msg.valid());
        let channels = msg.field("channels").and_then(Value::as_list).unwrap();
        assert_eq!(channels.len(), 2);
        let second = channels[1].as_bundle().unwrap();
        assert_eq!(second[0], Value::Int(1));
        assert_eq!(second[6], Value::Int(300));
        assert_eq!(second[7], Value::Int(-1));
        assert_eq!(msg.payload_len(), 8 + 24);
    }

    #[test]
    fn svinfo_count_beyond_payload() {
        assert_eq!(
            Message::decode_payload(&NAV_SVINFO, &svinfo_payload(3, 2)),
            Err(ParserError::InvalidPacketLen {
                packet: "NAV-SVINFO",
                expect: 8 + 36,
                got: 8 + 24
            })
        );
        assert!(matches!(
            Message::decode_payload(&NAV_SVINFO, &svinfo_payload(1, 2)),
            Err(ParserError::InvalidPacketLen { expect: 20, got: 32, .. })
        ));
    }

    #[test]
    fn svinfo_refresh_syncs_count() {
        let mut msg = Message::decode_payload(&NAV_SVINFO, &svinfo_payload(2, 2)).unwrap();
        assert!(!msg.refresh());

        let mut channels = msg.field("channels").and_then(Value::as_list).unwrap().to_vec();
        channels.pop();
        msg.set("channels", Value::List(channels));
        assert!(!msg.valid());
        assert!(msg.refresh());
        assert_eq!(msg.get_as::<u8>("numCh"), Some(1));
        assert!(msg.valid());
    }

    #[test]
    fn timegps_valid_mask() {
        let mut msg = Message::new(&NAV_TIMEGPS);
        msg.set("valid", (NavTimeGpsValid::TOW_VALID | NavTimeGpsValid::WEEK_VALID).bits());
        assert!(msg.valid());
        msg.set("valid", 0x08u8);
        assert!(!msg.valid());
        assert_eq!(msg.first_invalid_field(), Some("valid"));
    }
}
