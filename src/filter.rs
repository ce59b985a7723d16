//! ObjectId range filters covering one calendar day in a fixed time zone.
//!
//! MongoDB ObjectIds start with a big-endian 4-byte creation time in seconds,
//! so an id built from a timestamp followed by zero bytes is the smallest id
//! that can have been generated at that second. A range
//! `{"$gte": id(midnight), "$lt": id(next midnight)}` therefore selects exactly
//! the documents created on that local day.

use crate::calendar::{
    local_date, local_midnight, next_day, previous_day, BusinessDayResolver, HolidaySource,
};
use crate::clock::Clock;
use crate::error::Result;
use bson::oid::ObjectId;
use bson::{doc, Document};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// `[lower, upper)` range over `_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub lower: ObjectId,
    pub upper: ObjectId,
}

impl DateFilter {
    /// Range from local midnight of `day` to local midnight of the following day
    pub fn for_day(day: NaiveDate, tz: &Tz) -> Result<DateFilter> {
        let start = local_midnight(day, tz)?;
        let end = local_midnight(next_day(day)?, tz)?;
        Ok(DateFilter {
            lower: object_id_from_timestamp(&start),
            upper: object_id_from_timestamp(&end),
        })
    }

    /// `{"$gte": lower, "$lt": upper}`
    pub fn to_document(&self) -> Document {
        doc! {
            "$gte": self.lower,
            "$lt": self.upper,
        }
    }

    /// `{field: {"$gte": lower, "$lt": upper}}`, usually with `field = "_id"`
    pub fn on_field(&self, field: &str) -> Document {
        let mut query = Document::new();
        query.insert(field, self.to_document());
        query
    }
}

impl From<DateFilter> for Document {
    fn from(filter: DateFilter) -> Document {
        filter.to_document()
    }
}

/// Smallest ObjectId with the creation time of `at` (seconds, remaining bytes zero)
pub fn object_id_from_timestamp<Z: TimeZone>(at: &DateTime<Z>) -> ObjectId {
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&(at.timestamp() as u32).to_be_bytes());
    ObjectId::from_bytes(bytes)
}

/// [midnight today, midnight tomorrow)
pub fn today_filter(now: DateTime<Utc>, tz: &Tz) -> Result<DateFilter> {
    DateFilter::for_day(local_date(now, tz), tz)
}

/// [midnight yesterday, midnight today)
pub fn yesterday_filter(now: DateTime<Utc>, tz: &Tz) -> Result<DateFilter> {
    DateFilter::for_day(previous_day(local_date(now, tz))?, tz)
}

/// The previous business day ("yesterday, skipping days off"), resolved through `resolver`
pub fn yesterday_not_libur_filter<S: HolidaySource>(
    now: DateTime<Utc>,
    resolver: &BusinessDayResolver<S>,
) -> Result<DateFilter> {
    let resolution = resolver.previous_business_day(now)?;
    DateFilter::for_day(resolution.day, &resolver.timezone())
}

/// The three day filters, reading "now" from a clock.
pub struct DayFilters<C, S> {
    clock: C,
    resolver: BusinessDayResolver<S>,
}

impl<C: Clock, S: HolidaySource> DayFilters<C, S> {
    pub fn new(clock: C, resolver: BusinessDayResolver<S>) -> DayFilters<C, S> {
        DayFilters { clock, resolver }
    }

    pub fn resolver(&self) -> &BusinessDayResolver<S> {
        &self.resolver
    }

    pub fn today(&self) -> Result<DateFilter> {
        today_filter(self.clock.now(), &self.resolver.timezone())
    }

    pub fn yesterday(&self) -> Result<DateFilter> {
        yesterday_filter(self.clock.now(), &self.resolver.timezone())
    }

    pub fn yesterday_not_libur(&self) -> Result<DateFilter> {
        yesterday_not_libur_filter(self.clock.now(), &self.resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::ResolverConfig;
    use crate::error::Error;
    use crate::testing::StubHolidays;
    use chrono_tz::Asia::Jakarta;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn oid_at(at: DateTime<Utc>) -> ObjectId {
        object_id_from_timestamp(&at)
    }

    fn filters(now: DateTime<Utc>, source: StubHolidays) -> DayFilters<FixedClock, StubHolidays> {
        DayFilters::new(
            FixedClock(now),
            BusinessDayResolver::new(source, ResolverConfig::default()),
        )
    }

    #[test]
    fn object_id_carries_timestamp() {
        let at = utc(2024, 3, 17, 17);
        let id = object_id_from_timestamp(&at);

        assert_eq!(id.timestamp().timestamp_millis(), at.timestamp_millis());
        assert_eq!(&id.bytes()[4..], &[0u8; 8]);
        assert_eq!(id.to_hex(), format!("{:08x}0000000000000000", at.timestamp()));
        // the same instant in another zone maps to the same id
        assert_eq!(object_id_from_timestamp(&at.with_timezone(&Jakarta)), id);
    }

    #[test]
    fn today_spans_local_midnights() {
        // Monday 10:00 in Jakarta
        let f = today_filter(utc(2024, 3, 18, 3), &Jakarta).unwrap();

        assert_eq!(f.lower, oid_at(utc(2024, 3, 17, 17)));
        assert_eq!(f.upper, oid_at(utc(2024, 3, 18, 17)));
        assert!(f.lower < f.upper);
    }

    #[test]
    fn today_uses_the_local_calendar_day() {
        // Sunday 20:00 UTC is already Monday 03:00 in Jakarta
        let now = utc(2024, 3, 17, 20);
        assert_eq!(
            today_filter(now, &Jakarta).unwrap(),
            today_filter(utc(2024, 3, 18, 3), &Jakarta).unwrap()
        );

        let f = today_filter(now, &chrono_tz::UTC).unwrap();
        assert_eq!(f.lower, oid_at(utc(2024, 3, 17, 0)));
        assert_eq!(f.upper, oid_at(utc(2024, 3, 18, 0)));
    }

    #[test]
    fn yesterday_is_today_shifted_back_one_day() {
        for now in [
            utc(2024, 3, 18, 3),
            utc(2024, 3, 1, 16),
            utc(2024, 1, 1, 0),
            utc(2024, 12, 31, 23),
        ] {
            let today = today_filter(now, &Jakarta).unwrap();
            let yesterday = yesterday_filter(now, &Jakarta).unwrap();
            let day = 24 * 60 * 60;

            assert_eq!(yesterday.upper, today.lower);
            assert_eq!(
                yesterday.lower.timestamp().timestamp_millis() / 1000 + day,
                today.lower.timestamp().timestamp_millis() / 1000
            );
        }
    }

    #[test]
    fn spring_forward_day_is_shorter() {
        // 2024-03-10 in New York has 23 hours
        let tz = chrono_tz::America::New_York;
        let f = today_filter(utc(2024, 3, 10, 18), &tz).unwrap();

        assert_eq!(f.lower, oid_at(utc(2024, 3, 10, 5)));
        assert_eq!(f.upper, oid_at(utc(2024, 3, 11, 4)));
    }

    #[test]
    fn not_libur_monday_spans_friday() {
        let f = filters(utc(2024, 3, 18, 3), StubHolidays::none());
        let filter = f.yesterday_not_libur().unwrap();

        // [Friday midnight, Saturday midnight) Jakarta
        assert_eq!(filter.lower, oid_at(utc(2024, 3, 14, 17)));
        assert_eq!(filter.upper, oid_at(utc(2024, 3, 15, 17)));
    }

    #[test]
    fn not_libur_skips_holiday_friday() {
        let f = filters(utc(2024, 3, 18, 3), StubHolidays::with(&["2024-03-15"]));
        let filter = f.yesterday_not_libur().unwrap();

        let thursday = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(filter, DateFilter::for_day(thursday, &Jakarta).unwrap());
        assert_eq!(filter.lower, oid_at(utc(2024, 3, 13, 17)));
    }

    #[test]
    fn not_libur_midweek_equals_yesterday() {
        let f = filters(utc(2024, 3, 20, 3), StubHolidays::none());
        assert_eq!(f.yesterday_not_libur().unwrap(), f.yesterday().unwrap());
        assert_eq!(f.today().unwrap(), today_filter(utc(2024, 3, 20, 3), &Jakarta).unwrap());
    }

    #[test]
    fn not_libur_propagates_exhaustion() {
        let resolver = BusinessDayResolver::new(
            StubHolidays::none(),
            ResolverConfig::default().with_max_lookback(1),
        );
        let err = yesterday_not_libur_filter(utc(2024, 3, 18, 3), &resolver).unwrap_err();
        assert!(matches!(err, Error::Exhausted { max_lookback: 1, .. }));
    }

    #[test]
    fn renders_query_document() {
        let f = today_filter(utc(2024, 3, 18, 3), &Jakarta).unwrap();
        let expected_lower = format!("{:08x}0000000000000000", utc(2024, 3, 17, 17).timestamp());
        let expected_upper = format!("{:08x}0000000000000000", utc(2024, 3, 18, 17).timestamp());

        let range = f.to_document();
        assert_eq!(range.get_object_id("$gte").unwrap().to_hex(), expected_lower);
        assert_eq!(range.get_object_id("$lt").unwrap().to_hex(), expected_upper);

        let query = f.on_field("_id");
        assert_eq!(query.get_document("_id").unwrap(), &range);
        assert_eq!(Document::from(f), range);
    }
}
