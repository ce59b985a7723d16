use bizday::{
    today_filter, yesterday_filter, yesterday_not_libur_filter, BusinessDayResolver, ResolverConfig,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Day {
    Today,
    Yesterday,
    /// previous day that is neither weekend nor public holiday
    BusinessDay,
}

/// Print a MongoDB `_id` range filter for one day as extended JSON
#[derive(Parser, Debug)]
#[command(name = "bizday", version)]
struct Cli {
    #[arg(value_enum)]
    day: Day,

    /// Reference instant (RFC 3339), defaults to the current time
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    #[arg(long, env = "BIZDAY_TIMEZONE")]
    timezone: Option<Tz>,

    #[arg(long, env = "BIZDAY_HOLIDAY_API")]
    holiday_api: Option<String>,

    #[arg(long, env = "BIZDAY_MAX_LOOKBACK")]
    max_lookback: Option<u32>,

    /// Query the holiday API once per candidate day
    #[arg(long)]
    no_memoize: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> bizday::Result<String> {
    let mut config = ResolverConfig::from_env()?;
    if let Some(tz) = cli.timezone {
        config.timezone = tz;
    }
    if let Some(url) = cli.holiday_api {
        config.holiday_api = url;
    }
    if let Some(n) = cli.max_lookback {
        config.max_lookback = n;
    }
    if cli.no_memoize {
        config.memoize = false;
    }

    let now = cli.now.unwrap_or_else(Utc::now);
    let tz = config.timezone;
    info!("reference time {} ({})", now.with_timezone(&tz), tz);

    let filter = match cli.day {
        Day::Today => today_filter(now, &tz)?,
        Day::Yesterday => yesterday_filter(now, &tz)?,
        Day::BusinessDay => {
            let resolver = BusinessDayResolver::from_config(config);
            yesterday_not_libur_filter(now, &resolver)?
        }
    };

    let query = bson::Bson::Document(filter.on_field("_id")).into_relaxed_extjson();
    Ok(query.to_string())
}
