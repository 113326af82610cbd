//! Configuration for the challenge service

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Substitutions allowed per team per challenge.
pub const DEFAULT_SUBSTITUTION_CAP: u32 = 2;

/// Minutes the substitution window stays open after halftime.
pub const DEFAULT_HALFTIME_WINDOW_MINUTES: i64 = 15;

/// Challenge length that anchors halftime to the fixed time-of-day.
pub const FULL_DAY_HOURS: u32 = 24;

/// Configuration for challenge timing and the substitution ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Substitutions per team per challenge
    pub substitution_cap: u32,

    /// Halftime anchor for full-day challenges (16:20 local)
    pub halftime_anchor: NaiveTime,

    /// Length of the post-halftime substitution window
    pub halftime_window_minutes: i64,

    /// Power Hour bounds, local time, start inclusive / end exclusive.
    /// Fixed at [15:30, 17:30) rather than derived from the anchor.
    pub power_hour_start: NaiveTime,
    pub power_hour_end: NaiveTime,

    /// Scoring multiplier inside Power Hour (full-day challenges only)
    pub power_hour_multiplier: f64,

    /// Offset applied to the UTC clock to obtain local wall time
    pub utc_offset_minutes: i32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            substitution_cap: DEFAULT_SUBSTITUTION_CAP,
            halftime_anchor: NaiveTime::from_hms_opt(16, 20, 0).unwrap(),
            halftime_window_minutes: DEFAULT_HALFTIME_WINDOW_MINUTES,
            power_hour_start: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            power_hour_end: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            power_hour_multiplier: 2.0,
            utc_offset_minutes: 0,
        }
    }
}

impl ChallengeConfig {
    /// Create configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            substitution_cap: std::env::var("CHALLENGE_SUBSTITUTION_CAP")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.substitution_cap),
            utc_offset_minutes: std::env::var("CHALLENGE_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(defaults.utc_offset_minutes),
            ..defaults
        };

        if config.substitution_cap == 0 {
            anyhow::bail!("CHALLENGE_SUBSTITUTION_CAP must be at least 1");
        }
        if config.utc_offset_minutes.abs() > 14 * 60 {
            anyhow::bail!("CHALLENGE_UTC_OFFSET_MINUTES outside valid offset range");
        }

        Ok(config)
    }
}
