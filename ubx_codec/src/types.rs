use alloc::string::String;

use chrono::prelude::*;
use chrono::TimeDelta;

use crate::{error::DateTimeError, field::Value, message::Message, msg_id::MsgId};

/// Geodetic position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Position {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Height above ellipsoid in meters
    pub alt: f64,
}

impl Position {
    /// Position carried by a NAV-POSLLH message
    pub fn from_posllh(msg: &Message) -> Option<Self> {
        if msg.id() != MsgId::NAV_POSLLH {
            return None;
        }
        Some(Self {
            lon: msg.get_as::<f64>("lon")? * 1e-7,
            lat: msg.get_as::<f64>("lat")? * 1e-7,
            alt: msg.get_as::<f64>("height")? * 1e-3,
        })
    }
}

const GPS_EPOCH: (i32, u32, u32) = (1980, 1, 6);
const MAX_FTOW_NS: i64 = 500_000;

/// UTC time of a NAV-TIMEGPS solution.
///
/// `iTOW` (milliseconds) and `fTOW` (nanoseconds) are added to the start of
/// `week`, then the `leapS` GPS-UTC offset is taken off.
pub fn gps_time_to_utc(msg: &Message) -> Result<DateTime<Utc>, DateTimeError> {
    if msg.id() != MsgId::NAV_TIMEGPS {
        return Err(DateTimeError::InvalidDate);
    }
    let itow: i64 = msg.get_as("iTOW").ok_or(DateTimeError::InvalidTime)?;
    let ftow: i64 = msg.get_as("fTOW").ok_or(DateTimeError::InvalidNanoseconds)?;
    let week: i64 = msg.get_as("week").ok_or(DateTimeError::InvalidDate)?;
    let leap: i64 = msg.get_as("leapS").ok_or(DateTimeError::InvalidTime)?;

    if week < 0 {
        return Err(DateTimeError::InvalidDate);
    }
    if !(-MAX_FTOW_NS..=MAX_FTOW_NS).contains(&ftow) {
        return Err(DateTimeError::InvalidNanoseconds);
    }

    let (year, month, day) = GPS_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateTimeError::InvalidDate)?
        .and_hms_opt(0, 0, 0)
        .ok_or(DateTimeError::InvalidTime)?;

    let offset = TimeDelta::try_weeks(week)
        .and_then(|d| d.checked_add(&TimeDelta::try_milliseconds(itow)?))
        .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(ftow)))
        .and_then(|d| d.checked_sub(&TimeDelta::try_seconds(leap)?))
        .ok_or(DateTimeError::InvalidTime)?;

    epoch
        .checked_add_signed(offset)
        .map(|dt| dt.and_utc())
        .ok_or(DateTimeError::InvalidDate)
}

/// Text of a NUL padded character array
pub fn c_string(value: &Value) -> Option<String> {
    let bytes = value.to_bytes()?;
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
}
