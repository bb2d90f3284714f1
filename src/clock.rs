use chrono::{DateTime, Local, Locale, TimeZone, Timelike};
use std::fmt::Display;

const LOCALE: Locale = Locale::de_DE;
const DATE_FMT: &str = "%A, %d. %B %Y";
const TIME_FMT: &str = "%H:%M";

/// Wall-clock reading taken once per tick. Display only, never persisted.
#[derive(Clone, Debug)]
pub struct ClockSnapshot<Tz: TimeZone = Local> {
    pub now: DateTime<Tz>,
}

impl ClockSnapshot<Local> {
    pub fn now() -> Self {
        Self { now: Local::now() }
    }
}

impl<Tz: TimeZone> ClockSnapshot<Tz>
where
    Tz::Offset: Display,
{
    pub fn date(&self) -> String {
        format_date(&self.now)
    }

    pub fn time(&self) -> String {
        format_time(&self.now)
    }

    /// Fraction of the current minute elapsed, drives the seconds ring.
    pub fn minute_progress(&self) -> f64 {
        f64::from(self.now.second()) / 60.0
    }
}

/// "Samstag, 17. Oktober 2026"
pub fn format_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format_localized(DATE_FMT, LOCALE).to_string()
}

/// "09:05"
pub fn format_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format_localized(TIME_FMT, LOCALE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, h, m, s).single().expect("valid date")
    }

    #[test]
    fn date_uses_german_names() {
        assert_eq!(format_date(&at(9, 5, 0)), "Samstag, 17. Oktober 2026");
    }

    #[test]
    fn day_is_two_digits() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).single().expect("valid date");
        assert_eq!(format_date(&now), "Montag, 02. März 2026");
    }

    #[test]
    fn time_is_zero_padded_24h() {
        assert_eq!(format_time(&at(9, 5, 59)), "09:05");
        assert_eq!(format_time(&at(23, 41, 0)), "23:41");
    }

    #[test]
    fn minute_progress_follows_seconds() {
        let snapshot = ClockSnapshot { now: at(10, 0, 30) };
        assert!((snapshot.minute_progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.time(), "10:00");
    }
}
