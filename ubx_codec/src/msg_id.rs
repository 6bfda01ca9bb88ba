//! The 16-bit UBX message identifier: class in the high byte, id within the
//! class in the low byte.

use core::fmt;

/// UBX message identifier, `class << 8 | id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MsgId(u16);

/// Message classes known to this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgClass {
    Nav = 0x01,
    Rxm = 0x02,
    Inf = 0x04,
    Ack = 0x05,
    Cfg = 0x06,
    Mon = 0x0a,
    Aid = 0x0b,
    Tim = 0x0d,
    Log = 0x21,
}

const NAV_IDS: &[u16] = &[
    MsgId::NAV_POSECEF.0,
    MsgId::NAV_POSLLH.0,
    MsgId::NAV_STATUS.0,
    MsgId::NAV_DOP.0,
    MsgId::NAV_SOL.0,
    MsgId::NAV_PVT.0,
    MsgId::NAV_VELECEF.0,
    MsgId::NAV_VELNED.0,
    MsgId::NAV_TIMEGPS.0,
    MsgId::NAV_TIMEUTC.0,
    MsgId::NAV_CLOCK.0,
    MsgId::NAV_SVINFO.0,
    MsgId::NAV_DGPS.0,
    MsgId::NAV_SBAS.0,
    MsgId::NAV_EKFSTATUS.0,
    MsgId::NAV_AOPSTATUS.0,
];

const RXM_IDS: &[u16] = &[
    MsgId::RXM_RAW.0,
    MsgId::RXM_SFRB.0,
    MsgId::RXM_SVSI.0,
    MsgId::RXM_ALM.0,
    MsgId::RXM_EPH.0,
    MsgId::RXM_PMREQ.0,
];

const INF_IDS: &[u16] = &[
    MsgId::INF_ERROR.0,
    MsgId::INF_WARNING.0,
    MsgId::INF_NOTICE.0,
    MsgId::INF_TEST.0,
    MsgId::INF_DEBUG.0,
];

const ACK_IDS: &[u16] = &[MsgId::ACK_NAK.0, MsgId::ACK_ACK.0];

const CFG_IDS: &[u16] = &[
    MsgId::CFG_PRT.0,
    MsgId::CFG_MSG.0,
    MsgId::CFG_INF.0,
    MsgId::CFG_RST.0,
    MsgId::CFG_DAT.0,
    MsgId::CFG_TP.0,
    MsgId::CFG_RATE.0,
    MsgId::CFG_CFG.0,
    MsgId::CFG_FXN.0,
    MsgId::CFG_RXM.0,
    MsgId::CFG_EKF.0,
    MsgId::CFG_ANT.0,
    MsgId::CFG_SBAS.0,
    MsgId::CFG_NMEA.0,
    MsgId::CFG_USB.0,
    MsgId::CFG_TMODE.0,
    MsgId::CFG_NVS.0,
    MsgId::CFG_NAVX5.0,
    MsgId::CFG_NAV5.0,
    MsgId::CFG_ESFGWT.0,
    MsgId::CFG_TP5.0,
    MsgId::CFG_PM.0,
    MsgId::CFG_RINV.0,
    MsgId::CFG_ITFM.0,
    MsgId::CFG_PM2.0,
    MsgId::CFG_TMODE2.0,
    MsgId::CFG_GNSS.0,
    MsgId::CFG_LOGFILTER.0,
];

const MON_IDS: &[u16] = &[
    MsgId::MON_IO.0,
    MsgId::MON_VER.0,
    MsgId::MON_MSGPP.0,
    MsgId::MON_RXBUF.0,
    MsgId::MON_TXBUF.0,
    MsgId::MON_HW.0,
    MsgId::MON_HW2.0,
    MsgId::MON_RXR.0,
];

const AID_IDS: &[u16] = &[
    MsgId::AID_REQ.0,
    MsgId::AID_INI.0,
    MsgId::AID_HUI.0,
    MsgId::AID_DATA.0,
    MsgId::AID_ALM.0,
    MsgId::AID_EPH.0,
    MsgId::AID_ALPSRV.0,
    MsgId::AID_AOP.0,
    MsgId::AID_ALP.0,
];

const TIM_IDS: &[u16] = &[
    MsgId::TIM_TP.0,
    MsgId::TIM_TM2.0,
    MsgId::TIM_SVIN.0,
    MsgId::TIM_VRFY.0,
];

const LOG_IDS: &[u16] = &[
    MsgId::LOG_ERASE.0,
    MsgId::LOG_STRING.0,
    MsgId::LOG_CREATE.0,
    MsgId::LOG_INFO.0,
    MsgId::LOG_RETRIEVE.0,
    MsgId::LOG_RETRIEVEPOS.0,
    MsgId::LOG_RETRIEVESTRING.0,
    MsgId::LOG_FINDTIME.0,
];

impl MsgClass {
    pub const ALL: [MsgClass; 9] = [
        MsgClass::Nav,
        MsgClass::Rxm,
        MsgClass::Inf,
        MsgClass::Ack,
        MsgClass::Cfg,
        MsgClass::Mon,
        MsgClass::Aid,
        MsgClass::Tim,
        MsgClass::Log,
    ];

    pub const fn from_u8(class: u8) -> Option<Self> {
        match class {
            0x01 => Some(MsgClass::Nav),
            0x02 => Some(MsgClass::Rxm),
            0x04 => Some(MsgClass::Inf),
            0x05 => Some(MsgClass::Ack),
            0x06 => Some(MsgClass::Cfg),
            0x0a => Some(MsgClass::Mon),
            0x0b => Some(MsgClass::Aid),
            0x0d => Some(MsgClass::Tim),
            0x21 => Some(MsgClass::Log),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MsgClass::Nav => "NAV",
            MsgClass::Rxm => "RXM",
            MsgClass::Inf => "INF",
            MsgClass::Ack => "ACK",
            MsgClass::Cfg => "CFG",
            MsgClass::Mon => "MON",
            MsgClass::Aid => "AID",
            MsgClass::Tim => "TIM",
            MsgClass::Log => "LOG",
        }
    }

    /// Complete identifiers of the class, in strictly ascending order
    pub const fn ids(self) -> &'static [u16] {
        match self {
            MsgClass::Nav => NAV_IDS,
            MsgClass::Rxm => RXM_IDS,
            MsgClass::Inf => INF_IDS,
            MsgClass::Ack => ACK_IDS,
            MsgClass::Cfg => CFG_IDS,
            MsgClass::Mon => MON_IDS,
            MsgClass::Aid => AID_IDS,
            MsgClass::Tim => TIM_IDS,
            MsgClass::Log => LOG_IDS,
        }
    }

    /// Membership test by binary search over the class table
    pub const fn contains(self, id: MsgId) -> bool {
        let ids = self.ids();
        let mut lo = 0;
        let mut hi = ids.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if ids[mid] == id.0 {
                return true;
            }
            if ids[mid] < id.0 {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        false
    }
}

impl MsgId {
    pub const NAV_POSECEF: MsgId = MsgId(0x0101);
    pub const NAV_POSLLH: MsgId = MsgId(0x0102);
    pub const NAV_STATUS: MsgId = MsgId(0x0103);
    pub const NAV_DOP: MsgId = MsgId(0x0104);
    pub const NAV_SOL: MsgId = MsgId(0x0106);
    pub const NAV_PVT: MsgId = MsgId(0x0107);
    pub const NAV_VELECEF: MsgId = MsgId(0x0111);
    pub const NAV_VELNED: MsgId = MsgId(0x0112);
    pub const NAV_TIMEGPS: MsgId = MsgId(0x0120);
    pub const NAV_TIMEUTC: MsgId = MsgId(0x0121);
    pub const NAV_CLOCK: MsgId = MsgId(0x0122);
    pub const NAV_SVINFO: MsgId = MsgId(0x0130);
    pub const NAV_DGPS: MsgId = MsgId(0x0131);
    pub const NAV_SBAS: MsgId = MsgId(0x0132);
    pub const NAV_EKFSTATUS: MsgId = MsgId(0x0140);
    pub const NAV_AOPSTATUS: MsgId = MsgId(0x0160);

    pub const RXM_RAW: MsgId = MsgId(0x0210);
    pub const RXM_SFRB: MsgId = MsgId(0x0211);
    pub const RXM_SVSI: MsgId = MsgId(0x0220);
    pub const RXM_ALM: MsgId = MsgId(0x0230);
    pub const RXM_EPH: MsgId = MsgId(0x0231);
    pub const RXM_PMREQ: MsgId = MsgId(0x0241);

    pub const INF_ERROR: MsgId = MsgId(0x0400);
    pub const INF_WARNING: MsgId = MsgId(0x0401);
    pub const INF_NOTICE: MsgId = MsgId(0x0402);
    pub const INF_TEST: MsgId = MsgId(0x0403);
    pub const INF_DEBUG: MsgId = MsgId(0x0404);

    pub const ACK_NAK: MsgId = MsgId(0x0500);
    pub const ACK_ACK: MsgId = MsgId(0x0501);

    pub const CFG_PRT: MsgId = MsgId(0x0600);
    pub const CFG_MSG: MsgId = MsgId(0x0601);
    pub const CFG_INF: MsgId = MsgId(0x0602);
    pub const CFG_RST: MsgId = MsgId(0x0604);
    pub const CFG_DAT: MsgId = MsgId(0x0606);
    pub const CFG_TP: MsgId = MsgId(0x0607);
    pub const CFG_RATE: MsgId = MsgId(0x0608);
    pub const CFG_CFG: MsgId = MsgId(0x0609);
    pub const CFG_FXN: MsgId = MsgId(0x060e);
    pub const CFG_RXM: MsgId = MsgId(0x0611);
    pub const CFG_EKF: MsgId = MsgId(0x0612);
    pub const CFG_ANT: MsgId = MsgId(0x0613);
    pub const CFG_SBAS: MsgId = MsgId(0x0616);
    pub const CFG_NMEA: MsgId = MsgId(0x0617);
    pub const CFG_USB: MsgId = MsgId(0x061b);
    pub const CFG_TMODE: MsgId = MsgId(0x061d);
    pub const CFG_NVS: MsgId = MsgId(0x0622);
    pub const CFG_NAVX5: MsgId = MsgId(0x0623);
    pub const CFG_NAV5: MsgId = MsgId(0x0624);
    pub const CFG_ESFGWT: MsgId = MsgId(0x0629);
    pub const CFG_TP5: MsgId = MsgId(0x0631);
    pub const CFG_PM: MsgId = MsgId(0x0632);
    pub const CFG_RINV: MsgId = MsgId(0x0634);
    pub const CFG_ITFM: MsgId = MsgId(0x0639);
    pub const CFG_PM2: MsgId = MsgId(0x063b);
    pub const CFG_TMODE2: MsgId = MsgId(0x063d);
    pub const CFG_GNSS: MsgId = MsgId(0x063e);
    pub const CFG_LOGFILTER: MsgId = MsgId(0x0647);

    pub const MON_IO: MsgId = MsgId(0x0a02);
    pub const MON_VER: MsgId = MsgId(0x0a04);
    pub const MON_MSGPP: MsgId = MsgId(0x0a06);
    pub const MON_RXBUF: MsgId = MsgId(0x0a07);
    pub const MON_TXBUF: MsgId = MsgId(0x0a08);
    pub const MON_HW: MsgId = MsgId(0x0a09);
    pub const MON_HW2: MsgId = MsgId(0x0a0b);
    pub const MON_RXR: MsgId = MsgId(0x0a21);

    pub const AID_REQ: MsgId = MsgId(0x0b00);
    pub const AID_INI: MsgId = MsgId(0x0b01);
    pub const AID_HUI: MsgId = MsgId(0x0b02);
    pub const AID_DATA: MsgId = MsgId(0x0b10);
    pub const AID_ALM: MsgId = MsgId(0x0b30);
    pub const AID_EPH: MsgId = MsgId(0x0b31);
    pub const AID_ALPSRV: MsgId = MsgId(0x0b32);
    pub const AID_AOP: MsgId = MsgId(0x0b33);
    pub const AID_ALP: MsgId = MsgId(0x0b50);

    pub const TIM_TP: MsgId = MsgId(0x0d01);
    pub const TIM_TM2: MsgId = MsgId(0x0d03);
    pub const TIM_SVIN: MsgId = MsgId(0x0d04);
    pub const TIM_VRFY: MsgId = MsgId(0x0d06);

    pub const LOG_ERASE: MsgId = MsgId(0x2103);
    pub const LOG_STRING: MsgId = MsgId(0x2104);
    pub const LOG_CREATE: MsgId = MsgId(0x2107);
    pub const LOG_INFO: MsgId = MsgId(0x2108);
    pub const LOG_RETRIEVE: MsgId = MsgId(0x2109);
    pub const LOG_RETRIEVEPOS: MsgId = MsgId(0x210b);
    pub const LOG_RETRIEVESTRING: MsgId = MsgId(0x210d);
    pub const LOG_FINDTIME: MsgId = MsgId(0x210e);

    pub const fn new(class: u8, id: u8) -> Self {
        Self(((class as u16) << 8) | id as u16)
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Identifier as it appears on the wire, class byte first
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub const fn class(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn id(self) -> u8 {
        self.0 as u8
    }

    pub const fn msg_class(self) -> Option<MsgClass> {
        MsgClass::from_u8(self.class())
    }

    /// An identifier is valid when its class byte names a known class and
    /// the full value is listed for that class.
    pub const fn is_valid(self) -> bool {
        match self.msg_class() {
            Some(class) => class.contains(self),
            None => false,
        }
    }
}

impl From<MsgId> for u16 {
    fn from(id: MsgId) -> Self {
        id.0
    }
}

impl From<u16> for MsgId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.msg_class() {
            Some(class) => write!(f, "{}-0x{:02x}", class.name(), self.id()),
            None => write!(f, "0x{:02x}-0x{:02x}", self.class(), self.id()),
        }
    }
}
