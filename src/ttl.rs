//! Time-to-live configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const SECS_PER_WEEK: u64 = 7 * SECS_PER_DAY;

/// A lifetime assembled from optional, additive components.
///
/// Leaving every component unset means "no lifetime at all": a map built
/// from such a config keeps entries forever unless told otherwise.
///
/// ```
/// use expiring_map::TtlConfig;
/// use std::time::Duration;
///
/// let config = TtlConfig::new().minutes(1).seconds(30);
/// assert_eq!(config.to_duration().unwrap(), Some(Duration::from_secs(90)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TtlConfig {
    pub weeks: Option<i64>,
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
    pub milliseconds: Option<i64>,
    pub microseconds: Option<i64>,
}

impl TtlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weeks(mut self, weeks: i64) -> Self {
        self.weeks = Some(weeks);
        self
    }

    pub fn days(mut self, days: i64) -> Self {
        self.days = Some(days);
        self
    }

    pub fn hours(mut self, hours: i64) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn minutes(mut self, minutes: i64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    pub fn seconds(mut self, seconds: i64) -> Self {
        self.seconds = Some(seconds);
        self
    }

    pub fn milliseconds(mut self, milliseconds: i64) -> Self {
        self.milliseconds = Some(milliseconds);
        self
    }

    pub fn microseconds(mut self, microseconds: i64) -> Self {
        self.microseconds = Some(microseconds);
        self
    }

    /// True when no component has been set.
    pub fn is_unset(&self) -> bool {
        self == &Self::default()
    }

    /// Sums the components into a single duration.
    ///
    /// Returns `Ok(None)` when nothing is set. Negative components and sums
    /// that do not fit in a [`Duration`] are rejected.
    pub fn to_duration(&self) -> Result<Option<Duration>> {
        if self.is_unset() {
            return Ok(None);
        }

        let parts = [
            whole_seconds("weeks", self.weeks, SECS_PER_WEEK)?,
            whole_seconds("days", self.days, SECS_PER_DAY)?,
            whole_seconds("hours", self.hours, SECS_PER_HOUR)?,
            whole_seconds("minutes", self.minutes, SECS_PER_MINUTE)?,
            whole_seconds("seconds", self.seconds, 1)?,
            Duration::from_millis(non_negative("milliseconds", self.milliseconds)?),
            Duration::from_micros(non_negative("microseconds", self.microseconds)?),
        ];

        parts
            .into_iter()
            .try_fold(Duration::ZERO, |total, part| total.checked_add(part))
            .map(Some)
            .ok_or_else(|| CacheError::InvalidConfiguration("ttl overflows a duration".to_string()))
    }
}

fn non_negative(name: &str, value: Option<i64>) -> Result<u64> {
    match value {
        None => Ok(0),
        Some(v) => u64::try_from(v).map_err(|_| {
            CacheError::InvalidConfiguration(format!("{name} must not be negative, got {v}"))
        }),
    }
}

fn whole_seconds(name: &str, value: Option<i64>, unit: u64) -> Result<Duration> {
    non_negative(name, value)?
        .checked_mul(unit)
        .map(Duration::from_secs)
        .ok_or_else(|| CacheError::InvalidConfiguration(format!("{name} overflows a duration")))
}

/// Lifetime requested for a single insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ttl {
    /// Use the map's default lifetime.
    #[default]
    Default,
    /// Expire this long after insertion, overriding the default.
    After(Duration),
    /// Never expire, whatever the default is.
    Never,
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::After(duration)
    }
}
