//! Type definitions for the challenge service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stat_engine::EntityKind;
use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle status persisted on the challenge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Active,
    Complete,
}

/// Temporal phase derived from the wall clock and the challenge flags.
/// Phases only move forward; overtime is entered via the externally set
/// flag, never from the halftime window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePhase {
    FirstHalf,
    HalftimeWindow,
    SecondHalf,
    Overtime,
    Complete,
}

impl std::fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChallengePhase::FirstHalf => "first_half",
            ChallengePhase::HalftimeWindow => "halftime_window",
            ChallengePhase::SecondHalf => "second_half",
            ChallengePhase::Overtime => "overtime",
            ChallengePhase::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// A head-to-head challenge between two teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_hours: u32,
    pub halftime_at: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Frozen by the halftime snapshot, then immutable
    pub halftime_score_team1: Option<i64>,
    pub halftime_score_team2: Option<i64>,
    pub is_halftime_passed: bool,
    pub is_in_overtime: bool,
    pub status: ChallengeStatus,
}

/// Reference to a drafted marketplace asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub kind: EntityKind,
    pub entity_id: i64,
}

impl AssetRef {
    pub fn new(kind: EntityKind, entity_id: i64) -> Self {
        Self { kind, entity_id }
    }
}

/// A team's slot assignments plus the original drafted pool. Slots change
/// only through accepted substitutions; the roster never changes after the
/// draft locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lineup {
    pub team_id: Uuid,
    pub slots: HashMap<String, AssetRef>,
    pub roster: Vec<AssetRef>,
}

/// One recorded lineup change. Keyed by (challenge, team, position):
/// re-substituting a position overwrites the existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub challenge_id: Uuid,
    pub team_id: Uuid,
    pub position: String,
    pub old_asset: AssetRef,
    pub new_asset: AssetRef,
    pub created_at: DateTime<Utc>,
}

/// Scores frozen at halftime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalftimeSnapshot {
    pub challenge_id: Uuid,
    pub team1_score: i64,
    pub team2_score: i64,
    pub taken_at: DateTime<Utc>,
}

/// Answer to a status query: phase, timings, frozen scores, Power Hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HalftimeStatus {
    pub phase: ChallengePhase,
    pub halftime_at: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub halftime_score_team1: Option<i64>,
    pub halftime_score_team2: Option<i64>,
    pub is_power_hour: bool,
    pub power_hour_multiplier: f64,
}

/// A request to swap the asset at `position` for `new_asset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRequest {
    pub challenge_id: Uuid,
    pub team_id: Uuid,
    pub position: String,
    pub new_asset: AssetRef,
}

/// Inline result of a substitution attempt. Rejections carry a
/// user-displayable message; they are values, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionOutcome {
    pub success: bool,
    pub message: String,
    pub substitution: Option<Substitution>,
    /// Budget left after an accepted substitution
    pub remaining: Option<u32>,
}

impl SubstitutionOutcome {
    pub fn rejected(message: &str) -> Self {
        Self { success: false, message: message.to_string(), substitution: None, remaining: None }
    }

    pub fn accepted(substitution: Substitution, remaining: u32) -> Self {
        Self {
            success: true,
            message: "substitution accepted".to_string(),
            substitution: Some(substitution),
            remaining: Some(remaining),
        }
    }
}
