//! MS-DOS packed date/time decoding.
//!
//! ZIP headers store modification time as two 16-bit words:
//!
//! ```text
//! date: yyyyyyym mmmddddd   year = y + 1980, month = m, day = d
//! time: hhhhhmmm mmmsssss   hour = h, minute = m, second = s * 2
//! ```

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{PeekError, Result};

/// Split a packed date into (year, month, day).
pub fn split_date(date: u16) -> (u16, u8, u8) {
    let day = (date & 0x1F) as u8;
    let month = ((date >> 5) & 0x0F) as u8;
    let year = ((date >> 9) & 0x7F) + 1980;
    (year, month, day)
}

/// Split a packed time into (hour, minute, second).
pub fn split_time(time: u16) -> (u8, u8, u8) {
    let second = ((time & 0x1F) * 2) as u8;
    let minute = ((time >> 5) & 0x3F) as u8;
    let hour = ((time >> 11) & 0x1F) as u8;
    (hour, minute, second)
}

/// Decode a packed date and time into a calendar timestamp.
///
/// Fails with [`PeekError::DateDecode`] when the fields do not name a real
/// moment (month 0, February 30th, hour 24, second 60, ...).
pub fn decode(date: u16, time: u16) -> Result<NaiveDateTime> {
    let (year, month, day) = split_date(date);
    let (hour, minute, second) = split_time(time);

    NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
        .and_then(|d| d.and_hms_opt(hour.into(), minute.into(), second.into()))
        .ok_or(PeekError::DateDecode { date, time })
}

/// Decode, substituting the current local time for invalid fields.
pub fn decode_or_now(date: u16, time: u16) -> NaiveDateTime {
    decode(date, time).unwrap_or_else(|e| {
        debug!("{e}, using current time");
        Local::now().naive_local()
    })
}
