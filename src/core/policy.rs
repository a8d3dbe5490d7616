use crate::core::config::PolicySettings;
use anyhow::{Result, bail};
use std::time::Duration;
use tracing::warn;

use crate::common::MIN_INTERVAL_MS;

/// Thresholds and dwell times shared by every managed device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HysteresisPolicy {
    /// Step up one clock level when the signal is at or above this.
    pub boost_threshold: u32,
    /// Step down one clock level when the signal is at or below this.
    pub low_power_threshold: u32,
    pub boost_dwell: Duration,
    pub low_power_dwell: Duration,
    /// Fold encoder and decoder utilization into the signal.
    pub include_codec: bool,
}

impl HysteresisPolicy {
    /// Merges command-line values over settings-file values. Every threshold
    /// and dwell time must be present in one of them.
    pub fn resolve(cli: &PolicySettings, file: &PolicySettings) -> Result<Self> {
        let Some(boost) = cli.boost.or(file.boost) else {
            bail!("Boost utilization threshold is not set");
        };
        let Some(low_power) = cli.low_power.or(file.low_power) else {
            bail!("Low power utilization threshold is not set");
        };
        let Some(boost_time) = cli.boost_time_ms.or(file.boost_time_ms) else {
            bail!("Boost time is not set");
        };
        let Some(low_power_time) = cli.low_power_time_ms.or(file.low_power_time_ms) else {
            bail!("Low power time is not set");
        };
        let include_codec = cli.coder.or(file.coder).unwrap_or(false);

        for (what, value) in [("Boost", boost), ("Low power", low_power)] {
            if value > 100 {
                bail!("{} utilization threshold must be within 0-100, got {}", what, value);
            }
        }

        if boost <= low_power {
            warn!(
                target: "memclockd::config",
                "Boost threshold {}% is not above low power threshold {}%; boost wins ties",
                boost,
                low_power
            );
        }

        Ok(Self {
            boost_threshold: u32::from(boost),
            low_power_threshold: u32::from(low_power),
            boost_dwell: Duration::from_millis(boost_time),
            low_power_dwell: Duration::from_millis(low_power_time),
            include_codec,
        })
    }

    /// Polling cadence: the shorter dwell time, never below one millisecond.
    pub fn interval(&self) -> Duration {
        self.boost_dwell
            .min(self.low_power_dwell)
            .max(Duration::from_millis(MIN_INTERVAL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> PolicySettings {
        PolicySettings {
            boost: Some(80),
            low_power: Some(20),
            boost_time_ms: Some(1000),
            low_power_time_ms: Some(2000),
            coder: None,
        }
    }

    #[test]
    fn resolves_from_cli_alone() {
        let policy = HysteresisPolicy::resolve(&full(), &PolicySettings::default()).unwrap();
        assert_eq!(policy.boost_threshold, 80);
        assert_eq!(policy.low_power_threshold, 20);
        assert_eq!(policy.boost_dwell, Duration::from_millis(1000));
        assert_eq!(policy.low_power_dwell, Duration::from_millis(2000));
        assert!(!policy.include_codec);
    }

    #[test]
    fn cli_overrides_file() {
        let cli = PolicySettings {
            boost: Some(90),
            ..Default::default()
        };
        let file = PolicySettings {
            coder: Some(true),
            ..full()
        };
        let policy = HysteresisPolicy::resolve(&cli, &file).unwrap();
        assert_eq!(policy.boost_threshold, 90);
        assert_eq!(policy.low_power_threshold, 20);
        assert!(policy.include_codec);
    }

    #[test]
    fn missing_values_are_reported() {
        let cases = [
            (PolicySettings { boost: None, ..full() }, "Boost utilization"),
            (PolicySettings { low_power: None, ..full() }, "Low power utilization"),
            (PolicySettings { boost_time_ms: None, ..full() }, "Boost time"),
            (PolicySettings { low_power_time_ms: None, ..full() }, "Low power time"),
        ];
        for (cli, expected) in cases {
            let err = HysteresisPolicy::resolve(&cli, &PolicySettings::default()).unwrap_err();
            assert!(err.to_string().starts_with(expected), "{}", err);
        }
    }

    #[test]
    fn threshold_above_100_is_rejected() {
        let cli = PolicySettings {
            boost: Some(101),
            ..full()
        };
        assert!(HysteresisPolicy::resolve(&cli, &PolicySettings::default()).is_err());
    }

    #[test]
    fn inverted_thresholds_are_allowed() {
        let cli = PolicySettings {
            boost: Some(10),
            low_power: Some(50),
            ..full()
        };
        assert!(HysteresisPolicy::resolve(&cli, &PolicySettings::default()).is_ok());
    }

    #[test]
    fn interval_is_shorter_dwell() {
        let policy = HysteresisPolicy::resolve(&full(), &PolicySettings::default()).unwrap();
        assert_eq!(policy.interval(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_dwell_interval_is_floored() {
        let cli = PolicySettings {
            boost_time_ms: Some(0),
            ..full()
        };
        let policy = HysteresisPolicy::resolve(&cli, &PolicySettings::default()).unwrap();
        assert_eq!(policy.interval(), Duration::from_millis(1));
    }
}
