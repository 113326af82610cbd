//! # Challenge Service
//!
//! Tracks a head-to-head daily challenge through its temporal phases,
//! takes the at-most-once halftime snapshot, answers Power Hour multiplier
//! queries and enforces the per-team substitution budget.
//!
//! State lives behind an injected [`ChallengeStore`]; the snapshot and the
//! substitution upsert rely on the store's compare-and-swap /
//! upsert-on-conflict guarantees, so a multi-process deployment stays free
//! of double-snapshot and double-substitution races.

pub mod clock;
pub mod config;
pub mod error;
pub mod memory;
pub mod phase;
pub mod service;
pub mod store;
pub mod types;


pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ChallengeConfig;
pub use error::{ChallengeServiceError, Result};
pub use memory::InMemoryChallengeStore;
pub use phase::{compute_halftime, phase_at, power_hour_multiplier};
pub use service::ChallengeService;
pub use store::{ChallengeStore, TeamScoreSource};
pub use types::{
    AssetRef, Challenge, ChallengePhase, ChallengeStatus, HalftimeSnapshot, HalftimeStatus,
    Lineup, Substitution, SubstitutionOutcome, SubstitutionRequest,
};

/// Re-export the entity kind shared with the stat engine.
pub use stat_engine::EntityKind;
