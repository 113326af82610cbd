//! # Stat Engine
//!
//! Daily marketplace ranking and scoring for the Green League. Consumes raw
//! order records from an injected source, aggregates them per entity,
//! assigns ranks, blends in historical trend data and persists one stat row
//! per (entity, date) through an injected store.
//!
//! ## Architecture
//!
//! - **aggregate**: pure per-entity aggregation and ranking
//! - **scoring**: pure trend-based point computation
//! - **AggregationService**: orchestrates aggregate → rank → resolve →
//!   score → persist for every entity kind, with bounded concurrency
//! - **sources**: collaborator traits (record source, resolver, trend
//!   provider, stat store)
//! - **memory**: in-memory stat store backend

pub mod aggregate;
pub mod config;
pub mod error;
pub mod memory;
pub mod scoring;
pub mod service;
pub mod sources;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_orders, rank_entities};
pub use config::StatEngineConfig;
pub use error::{Result, StatEngineError};
pub use memory::InMemoryStatStore;
pub use scoring::{compute_streak, market_share_percent, score_entity, ScoringInputs};
pub use service::AggregationService;
pub use sources::{EntityResolver, OrderRecordSource, StatStore, TrendProvider};
pub use types::{
    AggregationSummary, EntityKind, EntityStat, EntityTotals, KindSummary, RankedEntity,
    RawOrderRecord, ScoreBreakdown, TrendSnapshot,
};
