//! In-memory challenge store backend
//!
//! Reference implementation of [`ChallengeStore`]. DashMap's per-entry
//! exclusive access makes `freeze_halftime` a true compare-and-swap and
//! keeps substitution upserts atomic on their conflict key.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{ChallengeServiceError, Result};
use crate::store::ChallengeStore;
use crate::types::{AssetRef, Challenge, Lineup, Substitution};

#[derive(Debug, Default)]
pub struct InMemoryChallengeStore {
    challenges: DashMap<Uuid, Challenge>,
    lineups: DashMap<(Uuid, Uuid), Lineup>,
    substitutions: DashMap<(Uuid, Uuid, String), Substitution>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn challenge(&self, id: Uuid) -> Result<Option<Challenge>> {
        Ok(self.challenges.get(&id).map(|c| c.clone()))
    }

    async fn put_challenge(&self, challenge: Challenge) -> Result<()> {
        self.challenges.insert(challenge.id, challenge);
        Ok(())
    }

    async fn freeze_halftime(
        &self,
        id: Uuid,
        team1_score: i64,
        team2_score: i64,
        _at: DateTime<Utc>,
    ) -> Result<bool> {
        let Some(mut challenge) = self.challenges.get_mut(&id) else {
            return Ok(false);
        };
        if challenge.is_halftime_passed {
            return Ok(false);
        }
        challenge.halftime_score_team1 = Some(team1_score);
        challenge.halftime_score_team2 = Some(team2_score);
        challenge.is_halftime_passed = true;
        Ok(true)
    }

    async fn lineup(&self, challenge_id: Uuid, team_id: Uuid) -> Result<Option<Lineup>> {
        Ok(self.lineups.get(&(challenge_id, team_id)).map(|l| l.clone()))
    }

    async fn put_lineup(&self, challenge_id: Uuid, lineup: Lineup) -> Result<()> {
        self.lineups.insert((challenge_id, lineup.team_id), lineup);
        Ok(())
    }

    async fn set_lineup_slot(
        &self,
        challenge_id: Uuid,
        team_id: Uuid,
        position: &str,
        asset: AssetRef,
    ) -> Result<()> {
        let Some(mut lineup) = self.lineups.get_mut(&(challenge_id, team_id)) else {
            return Err(ChallengeServiceError::Store(format!(
                "no lineup for challenge {challenge_id} team {team_id}"
            )));
        };
        lineup.slots.insert(position.to_string(), asset);
        Ok(())
    }

    async fn upsert_substitution(&self, substitution: Substitution) -> Result<()> {
        let key = (
            substitution.challenge_id,
            substitution.team_id,
            substitution.position.clone(),
        );
        self.substitutions.insert(key, substitution);
        Ok(())
    }

    async fn substitution_count(&self, challenge_id: Uuid, team_id: Uuid) -> Result<u32> {
        let count = self
            .substitutions
            .iter()
            .filter(|entry| {
                let (c, t, _) = entry.key();
                *c == challenge_id && *t == team_id
            })
            .count();
        Ok(count as u32)
    }
}
