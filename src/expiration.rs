//! Token lifetime selection and human-readable rendering

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ForgeError, Result};

/// Lifetime used when nothing is chosen interactively
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 3600;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Fixed lifetimes offered in the expiration menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    SixHours,
    TwelveHours,
    OneDay,
    SevenDays,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::FiveMinutes,
        Preset::FifteenMinutes,
        Preset::ThirtyMinutes,
        Preset::OneHour,
        Preset::SixHours,
        Preset::TwelveHours,
        Preset::OneDay,
        Preset::SevenDays,
    ];

    /// Short form accepted by `--expires`
    pub fn id(&self) -> &'static str {
        match self {
            Preset::FiveMinutes => "5m",
            Preset::FifteenMinutes => "15m",
            Preset::ThirtyMinutes => "30m",
            Preset::OneHour => "1h",
            Preset::SixHours => "6h",
            Preset::TwelveHours => "12h",
            Preset::OneDay => "1d",
            Preset::SevenDays => "7d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::FiveMinutes => "5 minutes",
            Preset::FifteenMinutes => "15 minutes",
            Preset::ThirtyMinutes => "30 minutes",
            Preset::OneHour => "1 hour",
            Preset::SixHours => "6 hours",
            Preset::TwelveHours => "12 hours",
            Preset::OneDay => "1 day",
            Preset::SevenDays => "7 days",
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            Preset::FiveMinutes => 5 * MINUTE,
            Preset::FifteenMinutes => 15 * MINUTE,
            Preset::ThirtyMinutes => 30 * MINUTE,
            Preset::OneHour => HOUR,
            Preset::SixHours => 6 * HOUR,
            Preset::TwelveHours => 12 * HOUR,
            Preset::OneDay => DAY,
            Preset::SevenDays => 7 * DAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 3] = [TimeUnit::Minute, TimeUnit::Hour, TimeUnit::Day];

    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Minute => MINUTE,
            TimeUnit::Hour => HOUR,
            TimeUnit::Day => DAY,
        }
    }

    /// One year expressed in this unit
    pub fn max_amount(&self) -> i64 {
        match self {
            TimeUnit::Minute => 525_600,
            TimeUnit::Hour => 8_760,
            TimeUnit::Day => 365,
        }
    }

    /// Plural name, as used in prompts ("Enter number of hours:")
    pub fn plural(&self) -> &'static str {
        match self {
            TimeUnit::Minute => "minutes",
            TimeUnit::Hour => "hours",
            TimeUnit::Day => "days",
        }
    }

    fn from_suffix(suffix: char) -> Option<Self> {
        match suffix {
            'm' => Some(TimeUnit::Minute),
            'h' => Some(TimeUnit::Hour),
            'd' => Some(TimeUnit::Day),
            _ => None,
        }
    }
}

/// A requested token lifetime, not yet anchored to a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationSpec {
    Preset(Preset),
    Custom { amount: i64, unit: TimeUnit },
}

impl ExpirationSpec {
    /// Lifetime in seconds, enforcing the one-year bound on custom amounts
    pub fn resolve(&self) -> Result<i64> {
        match *self {
            ExpirationSpec::Preset(preset) => Ok(preset.seconds()),
            ExpirationSpec::Custom { amount, unit } => {
                if amount <= 0 {
                    return Err(ForgeError::expiration_out_of_range(
                        "Please enter a positive number",
                    ));
                }
                if amount > unit.max_amount() {
                    return Err(ForgeError::expiration_out_of_range(format!(
                        "Maximum expiration is 1 year ({} {})",
                        unit.max_amount(),
                        unit.plural()
                    )));
                }
                Ok(amount * unit.seconds())
            }
        }
    }
}

impl FromStr for ExpirationSpec {
    type Err = ForgeError;

    /// Accepts preset ids (`15m`, `7d`) and `<n>m`, `<n>h`, `<n>d`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(preset) = Preset::ALL.iter().find(|p| p.id() == s) {
            return Ok(ExpirationSpec::Preset(*preset));
        }

        let invalid = || {
            ForgeError::invalid_expiration(format!(
                "'{}' is not a valid expiration, use e.g. 15m, 2h or 30d",
                s
            ))
        };

        let suffix = s.chars().last().ok_or_else(invalid)?;
        let unit = TimeUnit::from_suffix(suffix).ok_or_else(invalid)?;
        let amount: i64 = s[..s.len() - suffix.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;

        Ok(ExpirationSpec::Custom { amount, unit })
    }
}

impl fmt::Display for ExpirationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpirationSpec::Preset(preset) => write!(f, "{}", preset.label()),
            ExpirationSpec::Custom { amount, unit } => write!(f, "{} {}", amount, unit.plural()),
        }
    }
}

/// Display form of an `exp` claim relative to a moment in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationInfo {
    pub expires_at: String,
    pub expires_in: String,
    pub timestamp: i64,
}

pub fn format_expiration(exp: i64, now: i64) -> ExpirationInfo {
    ExpirationInfo {
        expires_at: format_timestamp(exp),
        expires_in: format_duration(exp.saturating_sub(now)),
        timestamp: exp,
    }
}

/// ISO-8601 UTC with millisecond precision (`2024-01-01T00:00:00.000Z`)
///
/// Timestamps chrono cannot represent fall back to the raw number.
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| timestamp.to_string())
}

/// Render a second count as "1 day 3 hours", "5 minutes", "59 seconds"
///
/// Only the next smaller unit is appended, and only when at least one whole
/// unit of it remains.
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return format!("-{}", format_magnitude(seconds.unsigned_abs()));
    }
    format_magnitude(seconds as u64)
}

fn format_magnitude(seconds: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("day", DAY as u64), ("hour", HOUR as u64), ("minute", MINUTE as u64)];

    for (index, (name, size)) in UNITS.iter().enumerate() {
        if seconds < *size {
            continue;
        }

        let count = seconds / size;
        let remainder = seconds % size;
        let mut result = pluralize(count, name);

        if let Some((next_name, next_size)) = UNITS.get(index + 1) {
            if remainder >= *next_size {
                result.push(' ');
                result.push_str(&pluralize(remainder / next_size, next_name));
            }
        }
        return result;
    }

    pluralize(seconds, "second")
}

fn pluralize(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
