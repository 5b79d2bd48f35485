//! Sunrise setting as stored in the configuration line.

use crate::sunrise::{DAY_SECS, Poll};
use chrono::{NaiveTime, Timelike};

/// Parsed configuration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunriseConfig {
    /// Sunrise completes at this local time every day.
    CompleteAt(NaiveTime),
    /// Run the demo ramp.
    Demo,
    /// Do nothing.
    Off,
}

/// Errors parsing a configuration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Not `demo`, `off`, `HHMM` or `HH:MM`.
    Malformed,
    /// Hour outside `0..24`.
    HourOutOfRange(u32),
    /// Minute outside `0..60`.
    MinuteOutOfRange(u32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Malformed => {
                write!(f, "expected HH:MM, HHMM, \"demo\" or \"off\"")
            }
            ConfigError::HourOutOfRange(hour) => {
                write!(f, "hour {} is out of range (0-23)", hour)
            }
            ConfigError::MinuteOutOfRange(minute) => {
                write!(f, "minute {} is out of range (0-59)", minute)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl SunriseConfig {
    /// Parses a configuration line.
    ///
    /// Surrounding whitespace is ignored. Times are exactly two hour digits
    /// and two minute digits, optionally split by one `:`, so `06:30`,
    /// `0630` and `06:30\n` are equivalent while `6:30` and `0:630` are
    /// rejected.
    pub fn parse(line: &str) -> Result<Self, ConfigError> {
        let line = line.trim();
        match line {
            "demo" => return Ok(SunriseConfig::Demo),
            "off" => return Ok(SunriseConfig::Off),
            _ => {}
        }

        let (hour, minute) = match line.split_once(':') {
            Some((hour, minute)) if hour.len() == 2 && minute.len() == 2 => (hour, minute),
            Some(_) => return Err(ConfigError::Malformed),
            None if line.len() == 4 && line.is_char_boundary(2) => line.split_at(2),
            None => return Err(ConfigError::Malformed),
        };

        let hour = two_digits(hour)?;
        let minute = two_digits(minute)?;
        if hour >= 24 {
            return Err(ConfigError::HourOutOfRange(hour));
        }
        if minute >= 60 {
            return Err(ConfigError::MinuteOutOfRange(minute));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(SunriseConfig::CompleteAt)
            .ok_or(ConfigError::Malformed)
    }

    /// Scheduler input for the local time `now`.
    pub fn poll(&self, now: NaiveTime) -> Poll {
        match self {
            SunriseConfig::CompleteAt(target) => Poll::Remaining(seconds_until(*target, now)),
            SunriseConfig::Demo => Poll::Demo,
            SunriseConfig::Off => Poll::Off,
        }
    }
}

/// Seconds from `now` until the next occurrence of `target`, in `0..86400`.
///
/// Sub-second precision of `now` is ignored.
pub fn seconds_until(target: NaiveTime, now: NaiveTime) -> i32 {
    let remaining =
        target.num_seconds_from_midnight() as i32 - now.num_seconds_from_midnight() as i32;
    if remaining < 0 {
        remaining + DAY_SECS
    } else {
        remaining
    }
}

fn two_digits(text: &str) -> Result<u32, ConfigError> {
    let mut value = 0;
    for ch in text.chars() {
        let digit = ch.to_digit(10).ok_or(ConfigError::Malformed)?;
        value = value * 10 + digit;
    }
    Ok(value)
}
