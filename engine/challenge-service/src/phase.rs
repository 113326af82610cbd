//! Pure challenge timing math
//!
//! Halftime placement, phase derivation and the Power Hour multiplier are
//! pure functions of timestamps and configuration; no state is touched.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use crate::config::{ChallengeConfig, FULL_DAY_HOURS};
use crate::types::{Challenge, ChallengePhase, ChallengeStatus};

/// Halftime for a challenge starting at `start_local` (local wall time).
///
/// Full-day challenges anchor halftime to the configured time-of-day on the
/// start day, rolled to the next day when the start is already at or past
/// the anchor. Any other duration takes the exact temporal midpoint.
pub fn compute_halftime(
    start_local: NaiveDateTime,
    duration_hours: u32,
    anchor: NaiveTime,
) -> NaiveDateTime {
    if duration_hours == FULL_DAY_HOURS {
        let anchored = start_local.date().and_time(anchor);
        if start_local.time() < anchor {
            anchored
        } else {
            anchored + Duration::days(1)
        }
    } else {
        start_local + Duration::seconds(duration_hours as i64 * 3600 / 2)
    }
}

/// Derive the challenge phase at `now`. Persisted state (completion,
/// overtime flag) takes precedence over the wall clock.
pub fn phase_at(challenge: &Challenge, now: DateTime<Utc>, window_minutes: i64) -> ChallengePhase {
    if challenge.status == ChallengeStatus::Complete {
        return ChallengePhase::Complete;
    }
    if challenge.is_in_overtime {
        return ChallengePhase::Overtime;
    }
    if now >= challenge.end_time {
        return ChallengePhase::Complete;
    }
    if now < challenge.halftime_at {
        return ChallengePhase::FirstHalf;
    }
    if now < challenge.halftime_at + Duration::minutes(window_minutes) {
        return ChallengePhase::HalftimeWindow;
    }
    ChallengePhase::SecondHalf
}

/// Scoring multiplier for `local_time`. Full-day challenges score double
/// inside [power_hour_start, power_hour_end); everything else is neutral.
pub fn power_hour_multiplier(
    local_time: NaiveTime,
    duration_hours: u32,
    config: &ChallengeConfig,
) -> f64 {
    if duration_hours == FULL_DAY_HOURS
        && local_time >= config.power_hour_start
        && local_time < config.power_hour_end
    {
        config.power_hour_multiplier
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use uuid::Uuid;

    fn local(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 20).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn anchor() -> NaiveTime {
        NaiveTime::from_hms_opt(16, 20, 0).unwrap()
    }

    #[test]
    fn full_day_halftime_anchors_to_start_day() {
        let halftime = compute_halftime(local(9, 0), 24, anchor());
        assert_eq!(halftime, local(16, 20));
    }

    #[test]
    fn full_day_halftime_rolls_past_anchor_starts_to_next_day() {
        let next_day =
            NaiveDate::from_ymd_opt(2024, 4, 21).unwrap().and_hms_opt(16, 20, 0).unwrap();
        assert_eq!(compute_halftime(local(18, 0), 24, anchor()), next_day);
        // Starting exactly at the anchor also rolls.
        assert_eq!(compute_halftime(local(16, 20), 24, anchor()), next_day);
    }

    #[test]
    fn short_challenge_halftime_is_the_midpoint() {
        assert_eq!(compute_halftime(local(12, 0), 2, anchor()), local(13, 0));
        assert_eq!(compute_halftime(local(12, 0), 1, anchor()), local(12, 30));
    }

    fn challenge_at(start_h: u32) -> Challenge {
        let start = Utc.with_ymd_and_hms(2024, 4, 20, start_h, 0, 0).unwrap();
        Challenge {
            id: Uuid::new_v4(),
            team1_id: Uuid::new_v4(),
            team2_id: Uuid::new_v4(),
            start_time: start,
            duration_hours: 2,
            halftime_at: start + Duration::hours(1),
            end_time: start + Duration::hours(2),
            halftime_score_team1: None,
            halftime_score_team2: None,
            is_halftime_passed: false,
            is_in_overtime: false,
            status: ChallengeStatus::Active,
        }
    }

    #[test]
    fn phase_walk_follows_the_clock() {
        let c = challenge_at(12);
        let at = |h: u32, m: u32| Utc.with_ymd_and_hms(2024, 4, 20, h, m, 0).unwrap();
        assert_eq!(phase_at(&c, at(12, 30), 15), ChallengePhase::FirstHalf);
        assert_eq!(phase_at(&c, at(13, 0), 15), ChallengePhase::HalftimeWindow);
        assert_eq!(phase_at(&c, at(13, 14), 15), ChallengePhase::HalftimeWindow);
        assert_eq!(phase_at(&c, at(13, 15), 15), ChallengePhase::SecondHalf);
        assert_eq!(phase_at(&c, at(14, 0), 15), ChallengePhase::Complete);
    }

    #[test]
    fn flags_override_the_clock() {
        let mut c = challenge_at(12);
        let mid = Utc.with_ymd_and_hms(2024, 4, 20, 12, 30, 0).unwrap();

        c.is_in_overtime = true;
        assert_eq!(phase_at(&c, mid, 15), ChallengePhase::Overtime);

        c.status = ChallengeStatus::Complete;
        assert_eq!(phase_at(&c, mid, 15), ChallengePhase::Complete);
    }

    #[test]
    fn power_hour_boundary_grid() {
        let config = ChallengeConfig::default();
        let t = |h: u32, m: u32| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(power_hour_multiplier(t(15, 29), 24, &config), 1.0);
        assert_eq!(power_hour_multiplier(t(15, 31), 24, &config), 2.0);
        assert_eq!(power_hour_multiplier(t(17, 29), 24, &config), 2.0);
        assert_eq!(power_hour_multiplier(t(17, 31), 24, &config), 1.0);
        // Start inclusive, end exclusive.
        assert_eq!(power_hour_multiplier(t(15, 30), 24, &config), 2.0);
        assert_eq!(power_hour_multiplier(t(17, 30), 24, &config), 1.0);
    }

    #[test]
    fn power_hour_applies_to_full_day_challenges_only() {
        let config = ChallengeConfig::default();
        let t = NaiveTime::from_hms_opt(16, 20, 0).unwrap();
        assert_eq!(power_hour_multiplier(t, 24, &config), 2.0);
        for hours in [1, 2, 12, 48] {
            assert_eq!(power_hour_multiplier(t, hours, &config), 1.0);
        }
    }
}
