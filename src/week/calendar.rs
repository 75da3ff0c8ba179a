//! Calendar helpers. Every date key is ISO `YYYY-MM-DD`; a week is keyed by
//! its Monday.

use time::{macros::format_description, Date, Duration, OffsetDateTime, UtcOffset, Weekday};

use crate::error::DiaryError;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn parse_date(raw: &str) -> Result<Date, DiaryError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| DiaryError::InvalidInput(format!("bad date `{}`: {}", raw, e)))
}

pub fn date_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// The calendar day `now` falls on for someone at `offset`.
pub fn date_at(now: OffsetDateTime, offset: UtcOffset) -> Date {
    now.to_offset(offset).date()
}

pub fn today(offset: UtcOffset) -> Date {
    date_at(OffsetDateTime::now_utc(), offset)
}

pub fn shift_days(date: Date, days: i64) -> Result<Date, DiaryError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| DiaryError::InvalidInput(format!("{} ± {} days is out of range", date, days)))
}

pub fn monday_of(date: Date) -> Result<Date, DiaryError> {
    let back = i64::from(date.weekday().number_days_from_monday());
    shift_days(date, -back)
}

pub fn week_key(date: Date) -> Result<String, DiaryError> {
    Ok(date_key(monday_of(date)?))
}

/// Parses any date and returns the key of the week containing it.
pub fn week_key_for(raw: &str) -> Result<String, DiaryError> {
    week_key(parse_date(raw)?)
}

pub fn shift_weeks(date: Date, weeks: i64) -> Result<Date, DiaryError> {
    shift_days(date, weeks * 7)
}

pub fn week_dates(monday: Date) -> Result<Vec<Date>, DiaryError> {
    (0..7).map(|i| shift_days(monday, i)).collect()
}

pub fn is_monday(date: Date) -> bool {
    date.weekday() == Weekday::Monday
}

/// `#[serde(with = "iso_date")]` for `Date` fields.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::date_key(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
