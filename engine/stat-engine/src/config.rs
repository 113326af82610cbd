//! Configuration for the stat engine

use serde::{Deserialize, Serialize};

/// Default cap on concurrent per-entity resolve/score/persist work.
pub const DEFAULT_SCORING_CONCURRENCY: usize = 20;

/// Default number of prior days of rank history consulted for streaks.
pub const DEFAULT_STREAK_LOOKBACK_DAYS: u32 = 90;

/// Default upper bound on the trend multiplier.
pub const DEFAULT_TREND_MULTIPLIER_CAP: f64 = 5.0;

/// Configuration for the aggregation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEngineConfig {
    /// Maximum in-flight per-entity lookups/writes within one entity kind
    pub scoring_concurrency: usize,

    /// How far back rank history is walked when computing streaks
    pub streak_lookback_days: u32,

    /// Ceiling applied to the computed trend multiplier
    pub trend_multiplier_cap: f64,
}

impl Default for StatEngineConfig {
    fn default() -> Self {
        Self {
            scoring_concurrency: DEFAULT_SCORING_CONCURRENCY,
            streak_lookback_days: DEFAULT_STREAK_LOOKBACK_DAYS,
            trend_multiplier_cap: DEFAULT_TREND_MULTIPLIER_CAP,
        }
    }
}

impl StatEngineConfig {
    /// Create configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            scoring_concurrency: std::env::var("STAT_SCORING_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.scoring_concurrency),
            streak_lookback_days: std::env::var("STAT_STREAK_LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.streak_lookback_days),
            trend_multiplier_cap: std::env::var("STAT_TREND_MULTIPLIER_CAP")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(defaults.trend_multiplier_cap),
        };

        if config.scoring_concurrency == 0 {
            anyhow::bail!("STAT_SCORING_CONCURRENCY must be at least 1");
        }
        if config.trend_multiplier_cap < 1.0 {
            anyhow::bail!("STAT_TREND_MULTIPLIER_CAP must be >= 1.0");
        }

        Ok(config)
    }
}
