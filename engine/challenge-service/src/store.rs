//! Collaborator traits for challenge state and team scores
//!
//! The store owns the atomicity the service relies on: `freeze_halftime`
//! must be a compare-and-swap on the halftime flag, and
//! `upsert_substitution` must resolve conflicts on the
//! (challenge, team, position) key.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::types::{AssetRef, Challenge, Lineup, Substitution};

#[async_trait::async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn challenge(&self, id: Uuid) -> Result<Option<Challenge>>;

    /// Insert or replace a challenge record.
    async fn put_challenge(&self, challenge: Challenge) -> Result<()>;

    /// Freeze halftime scores if, and only if, the challenge exists and
    /// halftime has not been marked passed. Returns whether this call won
    /// the swap; a `false` from a concurrent duplicate is not an error.
    async fn freeze_halftime(
        &self,
        id: Uuid,
        team1_score: i64,
        team2_score: i64,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn lineup(&self, challenge_id: Uuid, team_id: Uuid) -> Result<Option<Lineup>>;

    /// Insert or replace a team's lineup (draft lock).
    async fn put_lineup(&self, challenge_id: Uuid, lineup: Lineup) -> Result<()>;

    /// Point a lineup slot at a new asset.
    async fn set_lineup_slot(
        &self,
        challenge_id: Uuid,
        team_id: Uuid,
        position: &str,
        asset: AssetRef,
    ) -> Result<()>;

    /// Upsert on the (challenge, team, position) conflict key.
    async fn upsert_substitution(&self, substitution: Substitution) -> Result<()>;

    /// Number of distinct positions substituted by this team.
    async fn substitution_count(&self, challenge_id: Uuid, team_id: Uuid) -> Result<u32>;
}

/// Reads a team's accumulated score for a date (the stat rows of the
/// team's lineup, summed by the embedder).
#[async_trait::async_trait]
pub trait TeamScoreSource: Send + Sync {
    async fn team_score(&self, challenge_id: Uuid, team_id: Uuid, date: NaiveDate) -> Result<i64>;
}
