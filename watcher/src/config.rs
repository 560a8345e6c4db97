use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;

use market::history::{LookbackConfig, MAX_REACH_DAYS};
use market::kucoin::DEFAULT_BASE_URL;
use market::pulse::SpikeConfig;
use market::pulse::volume_spike::{DEFAULT_MIN_SAMPLES, DEFAULT_SPIKE_RATIO};
use market::rate_limited::DEFAULT_RATE_LIMIT_COOLDOWN;
use scheduler::SchedulerConfig;
use scheduler::types::{DEFAULT_BATCH_CONCURRENCY, DEFAULT_BATCH_PACING, DEFAULT_BATCH_SIZE};

use crate::error::ConfigError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Futures REST base URL, without trailing slash.
    pub market_api_url: String,

    /// Per-request timeout for market and webhook calls.
    pub http_timeout: Duration,

    // =========================
    // Detection
    // =========================
    /// Spike threshold and minimum history.
    pub spike: SpikeConfig,

    /// Shape of the historical lookback.
    ///
    /// Defaults: 8 windows of 100 days, leaving out today and yesterday.
    pub lookback: LookbackConfig,

    // =========================
    // Scheduling
    // =========================
    /// Batch size, per-batch concurrency cap and inter-batch pacing.
    ///
    /// IMPORTANT:
    /// - concurrency must stay below batch size
    /// - pacing together with the cap is what keeps a full run under the
    ///   exchange's public rate limit
    pub scheduler: SchedulerConfig,

    /// Global pause applied to every outbound call after a rate-limit
    /// response.
    pub rate_limit_cooldown: Duration,

    /// UTC wall-clock time of the daily run.
    pub daily_run_at: NaiveTime,

    // =========================
    // Output
    // =========================
    /// Webhook for alerts. Alerts only go to the log when unset.
    pub notify_webhook_url: Option<String>,

    /// `APP_ENV=production` switches logs to JSON.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset or blank keys fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let market_api_url = get("MARKET_API_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let http_timeout = millis(&get, "HTTP_TIMEOUT_MS", 10_000)?;

        let spike = SpikeConfig {
            ratio: parse(&get, "SPIKE_RATIO", DEFAULT_SPIKE_RATIO)?,
            min_samples: parse(&get, "MIN_HISTORY_SAMPLES", DEFAULT_MIN_SAMPLES)?,
        };
        if !spike.ratio.is_finite() || spike.ratio <= 0.0 {
            return Err(out_of_range("SPIKE_RATIO", "must be a positive number"));
        }
        if spike.min_samples == 0 {
            return Err(out_of_range("MIN_HISTORY_SAMPLES", "must be at least 1"));
        }

        let defaults = LookbackConfig::default();
        let lookback = LookbackConfig {
            windows: parse(&get, "LOOKBACK_WINDOWS", defaults.windows)?,
            window_days: parse(&get, "LOOKBACK_WINDOW_DAYS", defaults.window_days)?,
            skip_recent_days: parse(&get, "LOOKBACK_SKIP_RECENT_DAYS", defaults.skip_recent_days)?,
        };
        if lookback.windows == 0 {
            return Err(out_of_range("LOOKBACK_WINDOWS", "must be at least 1"));
        }
        if lookback.window_days == 0 {
            return Err(out_of_range("LOOKBACK_WINDOW_DAYS", "must be at least 1"));
        }
        if lookback.skip_recent_days == 0 {
            return Err(out_of_range(
                "LOOKBACK_SKIP_RECENT_DAYS",
                "must be at least 1 (today is never complete)",
            ));
        }
        if !lookback.is_bounded() {
            return Err(ConfigError::OutOfRange {
                key: "LOOKBACK_WINDOW_DAYS",
                reason: format!(
                    "windows x window days + skipped days must not exceed {MAX_REACH_DAYS}"
                ),
            });
        }

        let scheduler = SchedulerConfig {
            batch_size: parse(&get, "BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            concurrency: parse(&get, "BATCH_CONCURRENCY", DEFAULT_BATCH_CONCURRENCY)?,
            batch_pacing: millis(
                &get,
                "BATCH_PACING_MS",
                DEFAULT_BATCH_PACING.as_millis() as u64,
            )?,
        };
        scheduler.validate()?;

        let rate_limit_cooldown = millis(
            &get,
            "RATE_LIMIT_COOLDOWN_MS",
            DEFAULT_RATE_LIMIT_COOLDOWN.as_millis() as u64,
        )?;

        let daily_run_at = match get("DAILY_RUN_AT") {
            None => NaiveTime::MIN,
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
                ConfigError::Invalid {
                    key: "DAILY_RUN_AT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
        };

        let json_logs = get("APP_ENV").is_some_and(|v| v == "production");

        Ok(Self {
            market_api_url,
            http_timeout,
            spike,
            lookback,
            scheduler,
            rate_limit_cooldown,
            daily_run_at,
            notify_webhook_url: get("NOTIFY_WEBHOOK_URL"),
            json_logs,
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn millis<G>(get: &G, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let ms: u64 = parse(get, key, default)?;
    if ms == 0 {
        return Err(out_of_range(key, "must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}

fn out_of_range(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        key,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let c = cfg(&[]).unwrap();

        assert_eq!(c.market_api_url, "https://api-futures.kucoin.com/api/v1");
        assert_eq!(c.http_timeout, Duration::from_secs(10));
        assert_eq!(c.spike.ratio, 2.0);
        assert_eq!(c.spike.min_samples, 10);
        assert_eq!(c.scheduler.batch_size, 22);
        assert_eq!(c.scheduler.concurrency, 2);
        assert_eq!(c.scheduler.batch_pacing, Duration::from_secs(10));
        assert_eq!(c.rate_limit_cooldown, Duration::from_secs(31));
        assert_eq!(c.lookback, LookbackConfig::default());
        assert_eq!(c.daily_run_at, NaiveTime::MIN);
        assert_eq!(c.notify_webhook_url, None);
        assert!(!c.json_logs);
    }

    #[test]
    fn overrides_are_applied() {
        let c = cfg(&[
            ("MARKET_API_URL", "http://localhost:9000/api/v1/"),
            ("SPIKE_RATIO", "3.5"),
            ("BATCH_SIZE", "10"),
            ("BATCH_CONCURRENCY", "4"),
            ("DAILY_RUN_AT", "06:30"),
            ("NOTIFY_WEBHOOK_URL", "https://hooks.example.com/x"),
            ("APP_ENV", "production"),
        ])
        .unwrap();

        assert_eq!(c.market_api_url, "http://localhost:9000/api/v1");
        assert_eq!(c.spike.ratio, 3.5);
        assert_eq!(c.scheduler.batch_size, 10);
        assert_eq!(c.scheduler.concurrency, 4);
        assert_eq!(c.daily_run_at, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(c.notify_webhook_url.as_deref(), Some("https://hooks.example.com/x"));
        assert!(c.json_logs);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let c = cfg(&[("BATCH_SIZE", "  "), ("NOTIFY_WEBHOOK_URL", "")]).unwrap();
        assert_eq!(c.scheduler.batch_size, 22);
        assert_eq!(c.notify_webhook_url, None);
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let err = cfg(&[("BATCH_SIZE", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BATCH_SIZE", .. }));
    }

    #[test]
    fn concurrency_must_be_below_batch_size() {
        let err = cfg(&[("BATCH_SIZE", "2"), ("BATCH_CONCURRENCY", "2")]).unwrap_err();
        assert!(matches!(err, ConfigError::Scheduler(_)));
    }

    #[test]
    fn non_positive_ratio_is_rejected() {
        let err = cfg(&[("SPIKE_RATIO", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { key: "SPIKE_RATIO", .. }));

        let err = cfg(&[("SPIKE_RATIO", "NaN")]).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { key: "SPIKE_RATIO", .. }));
    }

    #[test]
    fn zero_durations_are_rejected() {
        let err = cfg(&[("RATE_LIMIT_COOLDOWN_MS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "RATE_LIMIT_COOLDOWN_MS",
                ..
            }
        ));
    }

    #[test]
    fn bad_daily_time_is_rejected() {
        let err = cfg(&[("DAILY_RUN_AT", "25:00")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DAILY_RUN_AT", .. }));
    }

    #[test]
    fn lookback_must_keep_today_out() {
        let err = cfg(&[("LOOKBACK_SKIP_RECENT_DAYS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "LOOKBACK_SKIP_RECENT_DAYS",
                ..
            }
        ));
    }

    #[test]
    fn lookback_reach_is_bounded() {
        let err = cfg(&[("LOOKBACK_WINDOW_DAYS", "100000000")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "LOOKBACK_WINDOW_DAYS",
                ..
            }
        ));

        let err = cfg(&[("LOOKBACK_WINDOWS", "4294967295"), ("LOOKBACK_WINDOW_DAYS", "4294967295")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));

        let c = cfg(&[("LOOKBACK_WINDOWS", "36"), ("LOOKBACK_WINDOW_DAYS", "100")]).unwrap();
        assert_eq!(c.lookback.reach_days(), Some(3_601));
    }
}
