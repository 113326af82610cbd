//! Challenge service implementation

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::ChallengeConfig;
use crate::error::{ChallengeServiceError, Result};
use crate::phase::{compute_halftime, phase_at, power_hour_multiplier};
use crate::store::{ChallengeStore, TeamScoreSource};
use crate::types::{
    Challenge, ChallengeStatus, HalftimeSnapshot, HalftimeStatus, Substitution,
    SubstitutionOutcome, SubstitutionRequest,
};

/// Challenge phase tracking and substitution ledger with injected
/// dependencies.
pub struct ChallengeService {
    config: ChallengeConfig,
    store: Arc<dyn ChallengeStore>,
    scores: Arc<dyn TeamScoreSource>,
    clock: Arc<dyn Clock>,
}

impl ChallengeService {
    pub fn new(
        config: ChallengeConfig,
        store: Arc<dyn ChallengeStore>,
        scores: Arc<dyn TeamScoreSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { config, store, scores, clock }
    }

    fn to_local(&self, t: DateTime<Utc>) -> NaiveDateTime {
        (t + Duration::minutes(self.config.utc_offset_minutes as i64)).naive_utc()
    }

    fn from_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
        Utc.from_utc_datetime(&(local - Duration::minutes(self.config.utc_offset_minutes as i64)))
    }

    /// Compute and persist halftime/end times for a challenge.
    pub async fn initialize_challenge_timings(
        &self,
        challenge_id: Uuid,
        start_time: DateTime<Utc>,
        duration_hours: u32,
    ) -> Result<Challenge> {
        let mut challenge = self
            .store
            .challenge(challenge_id)
            .await?
            .ok_or(ChallengeServiceError::ChallengeNotFound(challenge_id))?;

        let halftime_local = compute_halftime(
            self.to_local(start_time),
            duration_hours,
            self.config.halftime_anchor,
        );

        challenge.start_time = start_time;
        challenge.duration_hours = duration_hours;
        challenge.halftime_at = self.from_local(halftime_local);
        challenge.end_time = start_time + Duration::hours(duration_hours as i64);
        self.store.put_challenge(challenge.clone()).await?;

        info!(
            %challenge_id,
            halftime_at = %challenge.halftime_at,
            end_time = %challenge.end_time,
            "challenge timings initialized"
        );
        Ok(challenge)
    }

    /// Freeze both teams' current scores the first time the clock reaches
    /// halftime. At-most-once: any later call (or a call before halftime,
    /// or for a missing challenge) returns `None`.
    pub async fn take_halftime_snapshot(
        &self,
        challenge_id: Uuid,
    ) -> Result<Option<HalftimeSnapshot>> {
        let Some(challenge) = self.store.challenge(challenge_id).await? else {
            return Ok(None);
        };
        let now = self.clock.now();
        if challenge.is_halftime_passed || now < challenge.halftime_at {
            return Ok(None);
        }

        let date = self.to_local(now).date();
        let team1_score = self
            .scores
            .team_score(challenge_id, challenge.team1_id, date)
            .await?;
        let team2_score = self
            .scores
            .team_score(challenge_id, challenge.team2_id, date)
            .await?;

        // The store decides the race; losing it just means someone else
        // already froze the scores.
        if !self
            .store
            .freeze_halftime(challenge_id, team1_score, team2_score, now)
            .await?
        {
            return Ok(None);
        }

        info!(%challenge_id, team1_score, team2_score, "halftime snapshot taken");
        Ok(Some(HalftimeSnapshot { challenge_id, team1_score, team2_score, taken_at: now }))
    }

    /// Phase, timings, frozen scores and Power Hour state for a challenge.
    pub async fn get_halftime_status(&self, challenge_id: Uuid) -> Result<HalftimeStatus> {
        let challenge = self
            .store
            .challenge(challenge_id)
            .await?
            .ok_or(ChallengeServiceError::ChallengeNotFound(challenge_id))?;

        let now = self.clock.now();
        let phase = phase_at(&challenge, now, self.config.halftime_window_minutes);
        let multiplier = power_hour_multiplier(
            self.to_local(now).time(),
            challenge.duration_hours,
            &self.config,
        );

        Ok(HalftimeStatus {
            phase,
            halftime_at: challenge.halftime_at,
            end_time: challenge.end_time,
            halftime_score_team1: challenge.halftime_score_team1,
            halftime_score_team2: challenge.halftime_score_team2,
            is_power_hour: multiplier > 1.0,
            power_hour_multiplier: multiplier,
        })
    }

    /// Current Power Hour multiplier for a challenge duration, independent
    /// of any persisted state.
    pub fn current_multiplier(&self, duration_hours: u32) -> f64 {
        power_hour_multiplier(
            self.to_local(self.clock.now()).time(),
            duration_hours,
            &self.config,
        )
    }

    /// Attempt a lineup substitution. Every acceptance condition failure is
    /// a soft rejection with a displayable message.
    pub async fn make_substitution(
        &self,
        request: SubstitutionRequest,
    ) -> Result<SubstitutionOutcome> {
        let Some(challenge) = self.store.challenge(request.challenge_id).await? else {
            return Ok(SubstitutionOutcome::rejected("challenge not found"));
        };
        if !challenge.is_halftime_passed {
            return Ok(SubstitutionOutcome::rejected(
                "substitutions open once halftime has passed",
            ));
        }
        if challenge.status == ChallengeStatus::Complete {
            return Ok(SubstitutionOutcome::rejected("challenge is already complete"));
        }
        if challenge.is_in_overtime {
            return Ok(SubstitutionOutcome::rejected("substitutions are locked in overtime"));
        }

        let used = self
            .store
            .substitution_count(request.challenge_id, request.team_id)
            .await?;
        if used >= self.config.substitution_cap {
            return Ok(SubstitutionOutcome::rejected("substitution budget exhausted"));
        }

        let Some(lineup) = self.store.lineup(request.challenge_id, request.team_id).await? else {
            return Ok(SubstitutionOutcome::rejected("team has no lineup for this challenge"));
        };
        if !lineup.roster.contains(&request.new_asset) {
            return Ok(SubstitutionOutcome::rejected("asset is not on the drafted roster"));
        }
        let Some(old_asset) = lineup.slots.get(&request.position).copied() else {
            return Ok(SubstitutionOutcome::rejected("position has no assigned asset"));
        };

        let substitution = Substitution {
            challenge_id: request.challenge_id,
            team_id: request.team_id,
            position: request.position.clone(),
            old_asset,
            new_asset: request.new_asset,
            created_at: self.clock.now(),
        };
        self.store.upsert_substitution(substitution.clone()).await?;
        self.store
            .set_lineup_slot(
                request.challenge_id,
                request.team_id,
                &request.position,
                request.new_asset,
            )
            .await?;

        // Re-substituting the same position overwrote its record, so the
        // distinct-position count may not have moved.
        let used_after = self
            .store
            .substitution_count(request.challenge_id, request.team_id)
            .await?;
        let remaining = self.config.substitution_cap.saturating_sub(used_after);

        info!(
            challenge_id = %request.challenge_id,
            team_id = %request.team_id,
            position = %request.position,
            remaining,
            "substitution accepted"
        );
        Ok(SubstitutionOutcome::accepted(substitution, remaining))
    }

    /// Budget left for a team: cap minus distinct substituted positions.
    pub async fn get_remaining_substitutions(
        &self,
        challenge_id: Uuid,
        team_id: Uuid,
    ) -> Result<u32> {
        let used = self.store.substitution_count(challenge_id, team_id).await?;
        if used > self.config.substitution_cap {
            warn!(%challenge_id, %team_id, used, "substitution count above cap");
        }
        Ok(self.config.substitution_cap.saturating_sub(used))
    }
}
