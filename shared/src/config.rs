use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_POLL_INITIAL_DELAY_MS: u32 = 500;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 2_500;
pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 7;
pub const CLOCK_TICK_MS: u32 = 1_000;
/// Delay before marker CSS transitions are re-enabled after a zoom.
pub const ZOOM_TRANSITION_RESUME_MS: u32 = 100;

/// Name of the `window` property holding a runtime config object.
pub const CONFIG_GLOBAL: &str = "RAILMAP_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("poll interval must be positive")]
    ZeroPollInterval,
    #[error("max backoff ({max_backoff_ms}ms) is shorter than the poll interval ({interval_ms}ms)")]
    BackoffBelowInterval { interval_ms: u32, max_backoff_ms: u32 },
    #[error("autocomplete limit must be positive")]
    ZeroAutocompleteLimit,
    #[error("invalid config: {0}")]
    Parse(String),
}

/// Live-position polling cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub initial_delay_ms: u32,
    pub interval_ms: u32,
    /// Upper bound for the failure backoff. Equal to `interval_ms` disables backoff.
    pub max_backoff_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_POLL_INITIAL_DELAY_MS,
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_backoff_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PollConfig {
    /// Delay before the next tick given the current run of failed ticks.
    /// Doubles per failure (capped at 2^6) and never exceeds `max_backoff_ms`.
    pub fn delay_after_failures(&self, consecutive_failures: u32) -> u32 {
        if consecutive_failures == 0 {
            return self.interval_ms;
        }
        let exponent = consecutive_failures.saturating_sub(1).min(6);
        let factor = 1u32 << exponent;
        self.interval_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms.max(self.interval_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for every backend URL. Empty means same origin.
    pub api_base: String,
    pub poll: PollConfig,
    pub autocomplete_limit: usize,
    /// Last date the published timetable covers. Later dates show a warning
    /// and skip the route lookup. `None` disables the check.
    pub schedule_cutoff: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            poll: PollConfig::default(),
            autocomplete_limit: DEFAULT_AUTOCOMPLETE_LIMIT,
            schedule_cutoff: None,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(raw)
            .map_err(|e| ConfigError::Parse(e.to_string()))?
            .validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.poll.interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll.max_backoff_ms < self.poll.interval_ms {
            return Err(ConfigError::BackoffBelowInterval {
                interval_ms: self.poll.interval_ms,
                max_backoff_ms: self.poll.max_backoff_ms,
            });
        }
        if self.autocomplete_limit == 0 {
            return Err(ConfigError::ZeroAutocompleteLimit);
        }
        Ok(self)
    }

    pub fn exceeds_cutoff(&self, date: NaiveDate) -> bool {
        self.schedule_cutoff.is_some_and(|cutoff| date > cutoff)
    }

    /// Same as [`exceeds_cutoff`](Self::exceeds_cutoff) for a raw date-input value.
    /// Unparseable dates never exceed the cutoff.
    pub fn input_exceeds_cutoff(&self, raw: &str) -> bool {
        crate::time::parse_input_date(raw).is_some_and(|date| self.exceeds_cutoff(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_live_map_cadence() {
        let config = AppConfig::default();
        assert_eq!(config.poll.initial_delay_ms, 500);
        assert_eq!(config.poll.interval_ms, 2_500);
        assert_eq!(config.autocomplete_limit, 7);
        assert_eq!(config.schedule_cutoff, None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            AppConfig::from_json(r#"{"schedule_cutoff":"2026-03-08","poll":{"interval_ms":5000,"max_backoff_ms":20000}}"#)
                .unwrap();
        assert_eq!(config.poll.initial_delay_ms, DEFAULT_POLL_INITIAL_DELAY_MS);
        assert_eq!(config.poll.interval_ms, 5_000);
        assert_eq!(config.autocomplete_limit, DEFAULT_AUTOCOMPLETE_LIMIT);
        assert_eq!(config.schedule_cutoff, NaiveDate::from_ymd_opt(2026, 3, 8));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = AppConfig::from_json(r#"{"poll":{"interval_ms":0}}"#).unwrap_err();
        assert_eq!(err, ConfigError::ZeroPollInterval);
    }

    #[test]
    fn rejects_backoff_below_interval() {
        let err =
            AppConfig::from_json(r#"{"poll":{"interval_ms":3000,"max_backoff_ms":1000}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::BackoffBelowInterval { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            AppConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_poll_has_no_backoff() {
        let poll = PollConfig::default();
        assert_eq!(poll.delay_after_failures(0), 2_500);
        assert_eq!(poll.delay_after_failures(5), 2_500);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let poll = PollConfig {
            initial_delay_ms: 0,
            interval_ms: 1_000,
            max_backoff_ms: 10_000,
        };
        assert_eq!(poll.delay_after_failures(1), 1_000);
        assert_eq!(poll.delay_after_failures(2), 2_000);
        assert_eq!(poll.delay_after_failures(3), 4_000);
        assert_eq!(poll.delay_after_failures(5), 10_000);
        assert_eq!(poll.delay_after_failures(u32::MAX), 10_000);
    }

    #[test]
    fn cutoff_is_exclusive() {
        let config = AppConfig {
            schedule_cutoff: NaiveDate::from_ymd_opt(2026, 3, 8),
            ..AppConfig::default()
        };
        assert!(!config.input_exceeds_cutoff("2026-03-08"));
        assert!(config.input_exceeds_cutoff("2026-03-09"));
        assert!(!config.input_exceeds_cutoff(""));
        assert!(!AppConfig::default().input_exceeds_cutoff("2099-01-01"));
    }
}
