use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Utc};

use crate::editor::EditorError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Instant used when stepping an empty value.
pub const FALLBACK_DATE_TIME: &str = "2016-02-01T00:00:00.000Z";

/// The three date/time encodings stored in a wrapper's `value` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    /// `YYYY-MM-DD`, stepped by days.
    Date,
    /// `HH:MM`, stepped by minutes.
    Time,
    /// RFC 3339 UTC with milliseconds, stepped by hours.
    DateTime,
}

impl Temporal {
    pub fn expected(self) -> &'static str {
        match self {
            Temporal::Date => "YYYY-MM-DD",
            Temporal::Time => "HH:MM",
            Temporal::DateTime => FALLBACK_DATE_TIME,
        }
    }

    /// Empty text is accepted: the slot is simply unset.
    pub fn check(self, text: &str) -> Result<(), EditorError> {
        if text.is_empty() {
            return Ok(());
        }
        self.parse(text).map(|_| ())
    }

    pub fn step(self, text: &str, delta: i64) -> Result<String, EditorError> {
        let current = if text.is_empty() {
            fallback()
        } else {
            self.parse(text)?
        };
        let stepped = match self {
            Temporal::Date => current.checked_add_signed(TimeDelta::days(delta)),
            Temporal::Time => {
                let (time, _) = current.time().overflowing_add_signed(TimeDelta::minutes(delta));
                Some(current.date().and_time(time))
            }
            Temporal::DateTime => current.checked_add_signed(TimeDelta::hours(delta)),
        }
        .unwrap_or(current);
        Ok(self.format(stepped))
    }

    fn parse(self, text: &str) -> Result<NaiveDateTime, EditorError> {
        let invalid = || EditorError::InvalidInput {
            what: self.what(),
            input: text.to_string(),
        };
        match self {
            Temporal::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(|date| date.and_time(NaiveTime::MIN))
                .map_err(|_| invalid()),
            Temporal::Time => NaiveTime::parse_from_str(text, TIME_FORMAT)
                .map(|time| fallback().date().and_time(time))
                .map_err(|_| invalid()),
            Temporal::DateTime => DateTime::parse_from_rfc3339(text)
                .map(|instant| instant.with_timezone(&Utc).naive_utc())
                .map_err(|_| invalid()),
        }
    }

    fn format(self, instant: NaiveDateTime) -> String {
        match self {
            Temporal::Date => instant.format(DATE_FORMAT).to_string(),
            Temporal::Time => instant.format(TIME_FORMAT).to_string(),
            Temporal::DateTime => instant
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn what(self) -> &'static str {
        match self {
            Temporal::Date => "date",
            Temporal::Time => "time",
            Temporal::DateTime => "date-time",
        }
    }
}

fn fallback() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 2, 1)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
}
