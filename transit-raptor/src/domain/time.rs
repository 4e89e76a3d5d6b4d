//! Service time handling.
//!
//! Timetables express times as seconds since a reference midnight (the start
//! of the service day). Trips running past midnight keep counting upwards, so
//! "25:10:00" is a perfectly valid time for a late-night service.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Seconds since the reference midnight of a service day.
///
/// Unlike a wall-clock time this never wraps: the search compares and adds
/// service times as plain integers.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::ServiceTime;
///
/// let t = ServiceTime::parse("0:02:40").unwrap();
/// assert_eq!(t.secs(), 160);
/// assert_eq!(t.to_string(), "0:02:40");
///
/// // Whole minutes are printed without seconds
/// assert_eq!(ServiceTime::hms(25, 10, 0).to_string(), "25:10");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTime(i32);

impl ServiceTime {
    /// The reference midnight.
    pub const MIDNIGHT: ServiceTime = ServiceTime(0);

    /// Create a time from seconds since midnight.
    pub const fn from_secs(secs: i32) -> Self {
        Self(secs)
    }

    /// Create a time from hours, minutes and seconds.
    pub const fn hms(hours: i32, minutes: i32, seconds: i32) -> Self {
        Self(hours * 3600 + minutes * 60 + seconds)
    }

    /// Seconds since midnight.
    pub const fn secs(self) -> i32 {
        self.0
    }

    /// Parse "H:MM" or "H:MM:SS". Hours may exceed 23.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_raptor::domain::ServiceTime;
    ///
    /// assert_eq!(ServiceTime::parse("00:01").unwrap().secs(), 60);
    /// assert_eq!(ServiceTime::parse("9:00:01").unwrap().secs(), 32_401);
    /// assert_eq!(ServiceTime::parse("26:00").unwrap().secs(), 93_600);
    ///
    /// assert!(ServiceTime::parse("1400").is_err());
    /// assert!(ServiceTime::parse("14:3").is_err());
    /// assert!(ServiceTime::parse("14:60").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let mut parts = s.split(':');
        let hours = parts
            .next()
            .filter(|h| !h.is_empty() && h.len() <= 3)
            .and_then(parse_digits)
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minutes = parts
            .next()
            .and_then(parse_two_digits)
            .ok_or_else(|| TimeError::new("expected H:MM or H:MM:SS format"))?;
        let seconds = match parts.next() {
            Some(sec) => {
                parse_two_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?
            }
            None => 0,
        };
        if parts.next().is_some() {
            return Err(TimeError::new("too many components"));
        }
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        let secs = hours * 3600 + minutes * 60 + seconds;
        Ok(Self(if negative { -secs } else { secs }))
    }

    /// Signed number of seconds from `earlier` to `self`.
    pub fn seconds_since(self, earlier: ServiceTime) -> i32 {
        self.0 - earlier.0
    }

    /// Map this service time onto a calendar date.
    ///
    /// Times past 24:00 land on the following day(s).
    pub fn to_datetime(self, service_date: NaiveDate) -> NaiveDateTime {
        service_date.and_time(NaiveTime::default()) + Duration::seconds(self.0.into())
    }
}

impl Add<i32> for ServiceTime {
    type Output = ServiceTime;

    fn add(self, secs: i32) -> ServiceTime {
        ServiceTime(self.0.saturating_add(secs))
    }
}

impl Sub<i32> for ServiceTime {
    type Output = ServiceTime;

    fn sub(self, secs: i32) -> ServiceTime {
        ServiceTime(self.0.saturating_sub(secs))
    }
}

impl Sub<ServiceTime> for ServiceTime {
    type Output = i32;

    fn sub(self, other: ServiceTime) -> i32 {
        self.seconds_since(other)
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let total = self.0.unsigned_abs();
        let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
        if s == 0 {
            write!(f, "{sign}{h}:{m:02}")
        } else {
            write!(f, "{sign}{h}:{m:02}:{s:02}")
        }
    }
}

/// Parse a comma or whitespace separated list of times.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{parse_times, ServiceTime};
///
/// let times = parse_times("00:01, 00:02:40").unwrap();
/// assert_eq!(times, vec![ServiceTime::hms(0, 1, 0), ServiceTime::hms(0, 2, 40)]);
/// ```
pub fn parse_times(s: &str) -> Result<Vec<ServiceTime>, TimeError> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(ServiceTime::parse)
        .collect()
}

/// Format a duration in seconds compactly, e.g. "2m30s" or "1h5m".
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::format_duration;
///
/// assert_eq!(format_duration(150), "2m30s");
/// assert_eq!(format_duration(30), "30s");
/// assert_eq!(format_duration(3900), "1h5m");
/// assert_eq!(format_duration(0), "0s");
/// ```
pub fn format_duration(secs: i32) -> String {
    if secs == 0 {
        return "0s".to_string();
    }
    let sign = if secs < 0 { "-" } else { "" };
    let total = secs.unsigned_abs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut out = String::from(sign);
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    if s > 0 {
        out.push_str(&format!("{s}s"));
    }
    out
}

fn parse_digits(s: &str) -> Option<i32> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_two_digits(s: &str) -> Option<i32> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}
