//! Collaborator traits for the aggregation service
//!
//! All external lookups go through these seams; the service holds trait
//! objects and has no ambient dependencies.

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{EntityKind, EntityStat, RawOrderRecord, TrendSnapshot};

/// Supplies raw order records.
///
/// `records_for_date` is the preferred, narrower fetch; when it fails the
/// service falls back to `all_records` plus client-side date filtering.
#[async_trait::async_trait]
pub trait OrderRecordSource: Send + Sync {
    async fn records_for_date(&self, date: NaiveDate) -> Result<Vec<RawOrderRecord>>;

    async fn all_records(&self) -> Result<Vec<RawOrderRecord>>;
}

/// Maps a display name to a stable entity identifier. `Ok(None)` means the
/// name could not be resolved; the entity is skipped, not an error.
#[async_trait::async_trait]
pub trait EntityResolver: Send + Sync {
    async fn resolve(&self, kind: EntityKind, name: &str) -> Result<Option<i64>>;
}

/// Supplies rolling-window volumes and rank history per entity.
#[async_trait::async_trait]
pub trait TrendProvider: Send + Sync {
    /// Trend snapshot as of `date`; `Ok(None)` when no history exists.
    async fn trend(
        &self,
        kind: EntityKind,
        entity_id: i64,
        date: NaiveDate,
    ) -> Result<Option<TrendSnapshot>>;

    /// Prior-day ranks, most recent first: index 0 is `before - 1 day`,
    /// index 1 is `before - 2 days`, and so on, up to `max_days` entries.
    /// `None` marks a day without a persisted rank.
    async fn rank_history(
        &self,
        kind: EntityKind,
        entity_id: i64,
        before: NaiveDate,
        max_days: u32,
    ) -> Result<Vec<Option<u32>>>;
}

/// Persistence seam for stat rows. Upsert semantics: the row for
/// (kind, entity_id, stat_date) is overwritten, making re-aggregation of a
/// date idempotent.
#[async_trait::async_trait]
pub trait StatStore: Send + Sync {
    async fn upsert_stat(&self, stat: EntityStat) -> Result<()>;

    async fn stats_for_date(&self, kind: EntityKind, date: NaiveDate) -> Result<Vec<EntityStat>>;
}
