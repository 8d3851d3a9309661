use std::ops::Deref;

use time::macros::time;
use time::{Date, OffsetDateTime};

/// Unix-seconds timestamp, ordered and hashable so position/order rows can be
/// keyed and sorted directly on it.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DateTime(i64);

impl DateTime {
    pub fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Parses a date-only string (e.g. `"2020-01-01"`) into a `DateTime` at
    /// 09:00 UTC.
    pub fn from_date_string(val: &str, date_fmt: &str) -> Self {
        let format = time::format_description::parse(date_fmt).unwrap();
        let date = Date::parse(val, &format).unwrap();
        let dt = date.with_time(time!(09:00)).assume_utc();
        Self(dt.unix_timestamp())
    }
}

impl Deref for DateTime {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<i64> for DateTime {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<DateTime> for i64 {
    fn from(value: DateTime) -> Self {
        value.0
    }
}

impl From<OffsetDateTime> for DateTime {
    fn from(value: OffsetDateTime) -> Self {
        Self(value.unix_timestamp())
    }
}

impl From<DateTime> for OffsetDateTime {
    fn from(value: DateTime) -> Self {
        OffsetDateTime::from_unix_timestamp(value.0).expect("out-of-range unix timestamp")
    }
}
