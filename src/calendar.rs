//! Previous business day resolution with weekend rules and remote public holidays.
//! Holidays come from an HTTP API answering `?month=<1-12>` with a JSON list of
//! `{"Tanggal": "YYYY-MM-DD", ...}` records (e.g. <https://dayoffapi.vercel.app>).

use crate::config::ResolverConfig;
use crate::error::{Error, FetchError, Result};
use crate::fetch::Fetcher;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Format of holiday dates on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A public holiday as listed by the holiday API.
///
/// Field names are matched the way the upstream consumers match them:
/// `Tanggal` and `tanggal` are both accepted.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Holiday {
    /// "YYYY-MM-DD"
    #[serde(rename = "Tanggal", alias = "tanggal")]
    pub date: String,
    #[serde(
        rename = "Keterangan",
        alias = "keterangan",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// collective leave day ("cuti bersama") rather than a national holiday
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cuti: Option<bool>,
}

/// Where the resolver gets the holiday list of a month from
pub trait HolidaySource {
    fn holidays(&self, month: u32) -> std::result::Result<Vec<Holiday>, FetchError>;
}

/// [`HolidaySource`] backed by the remote holiday API.
#[derive(Debug, Clone)]
pub struct DayOffApi {
    fetcher: Fetcher,
    base_url: String,
}

impl DayOffApi {
    pub fn new(base_url: impl Into<String>) -> DayOffApi {
        DayOffApi::with_fetcher(Fetcher::new(), base_url)
    }

    pub fn with_fetcher(fetcher: Fetcher, base_url: impl Into<String>) -> DayOffApi {
        DayOffApi {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn month_url(&self, month: u32) -> String {
        format!("{}?month={}", self.base_url, month)
    }
}

impl HolidaySource for DayOffApi {
    fn holidays(&self, month: u32) -> std::result::Result<Vec<Holiday>, FetchError> {
        self.fetcher
            .get::<Vec<Holiday>>(&self.month_url(month))
            .map(|fetched| fetched.value)
    }
}

/// Outcome of a previous business day search
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub day: NaiveDate,
    /// 00:00:00.000 of `day` in the resolver's time zone
    pub midnight: DateTime<Tz>,
    /// candidate days skipped before `day` was accepted
    pub rejected: u32,
    /// remote holiday lookups performed
    pub lookups: u32,
    /// true when at least one lookup failed and only weekend and local rules applied to it
    pub degraded: bool,
}

/// Finds the most recent business day strictly before today.
///
/// A day is a holiday when its weekday is part of the configured weekend, when
/// it is listed in `additional_holidays`, or when the remote list for its month
/// contains it. A failed remote lookup counts as "no holidays" for that month;
/// this is logged and reported through [`Resolution::degraded`], so a real
/// holiday may be accepted while the API is unreachable.
#[derive(Debug, Clone)]
pub struct BusinessDayResolver<S> {
    source: S,
    config: ResolverConfig,
}

impl BusinessDayResolver<DayOffApi> {
    /// Resolver querying `config.holiday_api` with a default HTTP client
    pub fn from_config(config: ResolverConfig) -> BusinessDayResolver<DayOffApi> {
        let source = DayOffApi::new(config.holiday_api.clone());
        BusinessDayResolver::new(source, config)
    }
}

impl<S: HolidaySource> BusinessDayResolver<S> {
    pub fn new(source: S, config: ResolverConfig) -> BusinessDayResolver<S> {
        BusinessDayResolver { source, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn timezone(&self) -> Tz {
        self.config.timezone
    }

    /// Returns true if the date falls on a weekend
    pub fn is_weekend(&self, day: NaiveDate) -> bool {
        self.config.weekend.contains(&day.weekday())
    }

    /// Weekend, local or remote holiday. Performs one uncached remote lookup.
    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        let mut lookups = MonthLookups::new(&self.source, false);
        self.is_day_off(day, &mut lookups)
    }

    pub fn is_business_day(&self, day: NaiveDate) -> bool {
        !self.is_holiday(day)
    }

    /// Calculate the previous business day relative to the local date of `now`
    pub fn previous_business_day(&self, now: DateTime<Utc>) -> Result<Resolution> {
        let tz = self.config.timezone;
        let today = local_date(now, &tz);
        let mut lookups = MonthLookups::new(&self.source, self.config.memoize);

        let mut candidate = today;
        for rejected in 0..self.config.max_lookback {
            candidate = previous_day(candidate)?;
            if self.is_day_off(candidate, &mut lookups) {
                debug!("{} ({}) is not a business day", candidate, candidate.weekday());
                continue;
            }

            let midnight = local_midnight(candidate, &tz)?;
            info!(
                "previous business day before {} is {} ({} skipped, {} lookups{})",
                today,
                candidate,
                rejected,
                lookups.calls,
                if lookups.degraded { ", degraded" } else { "" }
            );
            return Ok(Resolution {
                day: candidate,
                midnight,
                rejected,
                lookups: lookups.calls,
                degraded: lookups.degraded,
            });
        }

        Err(Error::Exhausted {
            today,
            max_lookback: self.config.max_lookback,
        })
    }

    // The remote list is consulted for weekend days too, so a parity run
    // (memoize = false) makes exactly one call per candidate.
    fn is_day_off(&self, day: NaiveDate, lookups: &mut MonthLookups<'_, S>) -> bool {
        let listed = lookups.is_listed(day);
        self.is_weekend(day) || self.config.additional_holidays.contains(&day) || listed
    }
}

/// Holiday lists fetched during one resolution run
struct MonthLookups<'a, S> {
    source: &'a S,
    memoize: bool,
    cache: HashMap<u32, HashSet<String>>,
    calls: u32,
    degraded: bool,
}

impl<'a, S: HolidaySource> MonthLookups<'a, S> {
    fn new(source: &'a S, memoize: bool) -> Self {
        MonthLookups {
            source,
            memoize,
            cache: HashMap::new(),
            calls: 0,
            degraded: false,
        }
    }

    fn is_listed(&mut self, day: NaiveDate) -> bool {
        let month = day.month();
        let key = day.format(DATE_FORMAT).to_string();
        if let Some(dates) = self.cache.get(&month) {
            return dates.contains(&key);
        }

        let dates = self.fetch(month);
        let listed = dates.contains(&key);
        if self.memoize {
            self.cache.insert(month, dates);
        }
        listed
    }

    fn fetch(&mut self, month: u32) -> HashSet<String> {
        self.calls += 1;
        match self.source.holidays(month) {
            Ok(holidays) => {
                debug!("month {}: {} holidays listed", month, holidays.len());
                holidays.into_iter().map(|h| h.date).collect()
            }
            Err(e) => {
                warn!(
                    "holiday lookup for month {} failed, using weekend rules only: {}",
                    month, e
                );
                self.degraded = true;
                HashSet::new()
            }
        }
    }
}

/// Calendar date of `now` in `tz`
pub fn local_date(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// 00:00:00.000 of `day` in `tz`; the earliest one if the zone repeats midnight
pub fn local_midnight(day: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&day.and_time(chrono::NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| Error::NonexistentMidnight {
            date: day,
            timezone: tz.name().to_string(),
        })
}

pub fn previous_day(day: NaiveDate) -> Result<NaiveDate> {
    day.pred_opt().ok_or(Error::OutOfRange { date: day })
}

pub fn next_day(day: NaiveDate) -> Result<NaiveDate> {
    day.succ_opt().ok_or(Error::OutOfRange { date: day })
}
