//! Message kinds shipped with the crate.
//!
//! Kinds sharing an id are listed in the order the dispatcher should try
//! them: shorter poll requests before the full message.

pub mod ack;
pub mod aid;
pub mod cfg;
pub mod log;
pub mod mon;
pub mod nav;

pub use self::{
    cfg::{CfgPrtFlags, CfgTp5Flags, InProtoMask, NavBbrMask, OutProtoMask},
    log::LogCfg,
    nav::{NavStatusFlags, NavTimeGpsValid, SvInfoFlags},
};
use crate::{
    field::{Field, FieldCodec, FieldDef, Value},
    message::MessageKind,
};

/// Layout of requests without payload
pub(crate) const NO_FIELDS: &[FieldDef] = &[];

/// Sets the integer at `idx` to `value`, reporting whether it differed
pub(crate) fn force_value(values: &mut [Value], idx: usize, value: i64) -> bool {
    match values.get_mut(idx) {
        Some(slot) if slot.as_int() != Some(value) => {
            *slot = Value::Int(value);
            true
        },
        _ => false,
    }
}

/// Adds or drops an optional value so that it matches `present`
pub(crate) fn sync_presence(slot: &mut Value, present: bool, inner: &Field) -> bool {
    match (present, slot.is_absent()) {
        (true, true) => {
            *slot = inner.default_value(&[]);
            true
        },
        (false, false) => {
            *slot = Value::Absent;
            true
        },
        _ => false,
    }
}

/// Every kind above, in dispatch order
pub static ALL: &[&MessageKind] = &[
    &ack::ACK_ACK,
    &ack::ACK_NAK,
    &cfg::CFG_MSG_POLL,
    &cfg::CFG_MSG_CURRENT,
    &cfg::CFG_MSG,
    &cfg::CFG_PRT_POLL,
    &cfg::CFG_PRT_POLL_PORT,
    &cfg::CFG_PRT_DDC,
    &cfg::CFG_PRT_UART,
    &cfg::CFG_PRT_USB,
    &cfg::CFG_PRT_SPI,
    &cfg::CFG_RATE_POLL,
    &cfg::CFG_RATE,
    &cfg::CFG_RST,
    &cfg::CFG_TP5_POLL,
    &cfg::CFG_TP5_POLL_IDX,
    &cfg::CFG_TP5,
    &cfg::CFG_TMODE2_POLL,
    &nav::NAV_POSECEF,
    &nav::NAV_POSLLH,
    &nav::NAV_STATUS_POLL,
    &nav::NAV_STATUS,
    &nav::NAV_VELECEF,
    &nav::NAV_TIMEGPS_POLL,
    &nav::NAV_TIMEGPS,
    &nav::NAV_TIMEUTC_POLL,
    &nav::NAV_SVINFO,
    &aid::AID_ALM_POLL,
    &aid::AID_ALM_POLL_SV,
    &aid::AID_ALM,
    &aid::AID_EPH_POLL,
    &aid::AID_EPH_POLL_SV,
    &aid::AID_EPH,
    &log::LOG_CREATE,
    &log::LOG_ERASE,
    &log::LOG_INFO_POLL,
    &log::LOG_STRING,
    &mon::MON_HW2_POLL,
    &mon::MON_VER_POLL,
    &mon::MON_VER,
];
