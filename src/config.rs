//! Resolver configuration: defaults, environment overrides and serde form.

use crate::error::{Error, Result};
use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;
pub const DEFAULT_HOLIDAY_API: &str = "https://dayoffapi.vercel.app/api";
pub const DEFAULT_MAX_LOOKBACK: u32 = 30;

pub const ENV_TIMEZONE: &str = "BIZDAY_TIMEZONE";
pub const ENV_HOLIDAY_API: &str = "BIZDAY_HOLIDAY_API";
pub const ENV_MAX_LOOKBACK: &str = "BIZDAY_MAX_LOOKBACK";
pub const ENV_MEMOIZE: &str = "BIZDAY_MEMOIZE";
/// JSON array of "YYYY-MM-DD" strings
pub const ENV_ADDITIONAL_HOLIDAYS: &str = "ADDITIONAL_HOLIDAYS";

/// Settings for [`BusinessDayResolver`](crate::calendar::BusinessDayResolver).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Zone all day boundaries are computed in
    pub timezone: Tz,
    /// Base URL of the holiday API, queried as `<holiday_api>?month=<1-12>`
    pub holiday_api: String,
    /// Maximum number of candidate days examined before giving up
    pub max_lookback: u32,
    /// Fetch each month's holiday list once per resolution instead of once per candidate day
    pub memoize: bool,
    pub weekend: Vec<Weekday>,
    /// Holidays known locally, checked in addition to the remote list
    pub additional_holidays: Vec<NaiveDate>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            timezone: DEFAULT_TIMEZONE,
            holiday_api: DEFAULT_HOLIDAY_API.to_string(),
            max_lookback: DEFAULT_MAX_LOOKBACK,
            memoize: true,
            weekend: vec![Weekday::Sat, Weekday::Sun],
            additional_holidays: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Defaults overridden by the `BIZDAY_*` and `ADDITIONAL_HOLIDAYS` environment variables
    pub fn from_env() -> Result<ResolverConfig> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ResolverConfig::from_env`] but reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<ResolverConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ResolverConfig::default();

        if let Some(value) = lookup(ENV_TIMEZONE) {
            config.timezone = value
                .trim()
                .parse::<Tz>()
                .map_err(|e| invalid(ENV_TIMEZONE, e))?;
        }
        if let Some(value) = lookup(ENV_HOLIDAY_API) {
            let value = value.trim();
            if value.is_empty() {
                return Err(invalid(ENV_HOLIDAY_API, "empty URL"));
            }
            config.holiday_api = value.to_string();
        }
        if let Some(value) = lookup(ENV_MAX_LOOKBACK) {
            config.max_lookback = value
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid(ENV_MAX_LOOKBACK, e))?;
        }
        if let Some(value) = lookup(ENV_MEMOIZE) {
            config.memoize = value
                .trim()
                .parse::<bool>()
                .map_err(|e| invalid(ENV_MEMOIZE, e))?;
        }
        if let Some(value) = lookup(ENV_ADDITIONAL_HOLIDAYS) {
            let mut additional: Vec<NaiveDate> =
                serde_json::from_str(&value).map_err(|e| invalid(ENV_ADDITIONAL_HOLIDAYS, e))?;
            config.additional_holidays.append(&mut additional);
        }

        Ok(config)
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_max_lookback(mut self, max_lookback: u32) -> Self {
        self.max_lookback = max_lookback;
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// add a locally known holiday
    pub fn add_holiday(&mut self, date: NaiveDate) -> &mut Self {
        self.additional_holidays.push(date);
        self
    }
}

fn invalid(key: &str, message: impl ToString) -> Error {
    Error::Config {
        key: key.to_string(),
        message: message.to_string(),
    }
}
