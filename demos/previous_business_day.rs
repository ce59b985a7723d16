use bizday::{BusinessDayResolver, ResolverConfig};
use chrono::{DateTime, Utc};
/// example resolving the previous business day, optionally for a given RFC 3339 instant
use std::env::args;
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let now = match args().nth(1) {
        Some(arg) => arg.parse::<DateTime<Utc>>()?,
        None => Utc::now(),
    };
    let resolver = BusinessDayResolver::from_config(ResolverConfig::from_env()?);
    let res = resolver.previous_business_day(now)?;
    println!("today:                 {}", now.with_timezone(&resolver.timezone()).date_naive());
    println!("previous business day: {} ({} days skipped)", res.day, res.rejected);
    println!("local midnight:        {}", res.midnight);
    if res.degraded {
        println!("holiday API unavailable, only weekends were checked for some days");
    }
    Ok(())
}
