use super::{sync_presence, NO_FIELDS};
use crate::{
    field::{Field, FieldDef, ListCount, Value},
    message::MessageKind,
    msg_id::MsgId,
};

const U4: Field = Field::u4();
const WORDS: Field = Field::list(&U4, ListCount::Fixed(8));

const SVID_POLL_FIELDS: &[FieldDef] = &[FieldDef::new("svid", Field::u1())];

/// Index of the field gating the optional words, in both AID-ALM and AID-EPH
const GATE: usize = 1;

fn gate_is_set(siblings: &[Value]) -> bool {
    siblings.get(GATE).and_then(Value::as_int).unwrap_or(0) != 0
}

const ALM_WORDS: Field = Field::optional(&WORDS, gate_is_set);

const AID_ALM_FIELDS: &[FieldDef] = &[
    FieldDef::new("svid", Field::u4()),
    FieldDef::new("week", Field::u4()),
    FieldDef::new("dwrd", ALM_WORDS),
];

fn sync_almanac_words(values: &mut [Value]) -> bool {
    let present = gate_is_set(values);
    match values.get_mut(2) {
        Some(dwrd) => sync_presence(dwrd, present, &WORDS),
        None => false,
    }
}

const EPH_WORDS: Field = Field::optional(&WORDS, gate_is_set);

const AID_EPH_FIELDS: &[FieldDef] = &[
    FieldDef::new("svid", Field::u4()),
    FieldDef::new("how", Field::u4()),
    FieldDef::new("sf1d", EPH_WORDS),
    FieldDef::new("sf2d", EPH_WORDS),
    FieldDef::new("sf3d", EPH_WORDS),
];

fn sync_ephemeris_words(values: &mut [Value]) -> bool {
    let present = gate_is_set(values);
    values
        .iter_mut()
        .skip(2)
        .fold(false, |changed, words| sync_presence(words, present, &WORDS) || changed)
}

pub static AID_ALM_POLL: MessageKind = MessageKind::new("AID-ALM-POLL", MsgId::AID_ALM, NO_FIELDS);
pub static AID_ALM_POLL_SV: MessageKind =
    MessageKind::new("AID-ALM-POLL-SV", MsgId::AID_ALM, SVID_POLL_FIELDS);
/// Almanac of one satellite; the eight words are only sent when `week` is set
pub static AID_ALM: MessageKind = MessageKind::new("AID-ALM", MsgId::AID_ALM, AID_ALM_FIELDS)
    .with_refresh(sync_almanac_words);

pub static AID_EPH_POLL: MessageKind = MessageKind::new("AID-EPH-POLL", MsgId::AID_EPH, NO_FIELDS);
pub static AID_EPH_POLL_SV: MessageKind =
    MessageKind::new("AID-EPH-POLL-SV", MsgId::AID_EPH, SVID_POLL_FIELDS);
/// Ephemeris of one satellite; the three subframes are only sent when `how` is set
pub static AID_EPH: MessageKind = MessageKind::new("AID-EPH", MsgId::AID_EPH, AID_EPH_FIELDS)
    .with_refresh(sync_ephemeris_words);
