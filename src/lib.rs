//! Date-range filters over MongoDB ObjectIds for "today", "yesterday" and
//! "the previous business day", the latter skipping weekends and public
//! holidays looked up from a remote holiday API.
//!
//! ```no_run
//! use bizday::{BusinessDayResolver, DayFilters, ResolverConfig, SystemClock};
//!
//! let resolver = BusinessDayResolver::from_config(ResolverConfig::from_env()?);
//! let filters = DayFilters::new(SystemClock, resolver);
//! let query = filters.yesterday_not_libur()?.on_field("_id");
//! println!("{}", query);
//! # Ok::<(), bizday::Error>(())
//! ```

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;

#[cfg(test)]
mod testing;

pub use calendar::{BusinessDayResolver, DayOffApi, Holiday, HolidaySource, Resolution};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ResolverConfig;
pub use error::{Error, FetchError, Result};
pub use fetch::{Fetched, Fetcher};
pub use filter::{
    today_filter, yesterday_filter, yesterday_not_libur_filter, DateFilter, DayFilters,
};
