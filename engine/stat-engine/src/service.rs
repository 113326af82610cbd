//! Aggregation orchestrator
//!
//! Drives aggregate → rank → resolve → score → persist for every entity
//! kind on a target date. The full ranking is materialized before any
//! concurrent per-entity work starts, so rank numbers never depend on
//! lookup timing. Per-entity failures are counted as skipped and never
//! abort a kind's pipeline; only the record source failing on both fetch
//! paths fails the run.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::aggregate::{aggregate_orders, rank_entities};
use crate::config::StatEngineConfig;
use crate::error::{Result, StatEngineError};
use crate::scoring::{compute_streak, market_share_percent, score_entity, ScoringInputs};
use crate::sources::{EntityResolver, OrderRecordSource, StatStore, TrendProvider};
use crate::types::{
    AggregationSummary, EntityKind, EntityStat, KindSummary, RankedEntity, RawOrderRecord,
    TrendSnapshot,
};

/// Daily aggregation service with injected collaborators.
pub struct AggregationService {
    config: StatEngineConfig,
    records: Arc<dyn OrderRecordSource>,
    resolver: Arc<dyn EntityResolver>,
    trends: Arc<dyn TrendProvider>,
    store: Arc<dyn StatStore>,
}

/// A ranked entity that survived resolution, with its fetched history.
struct ResolvedEntity {
    entity: RankedEntity,
    entity_id: i64,
    trend: TrendSnapshot,
    rank_history: Vec<Option<u32>>,
}

impl AggregationService {
    pub fn new(
        config: StatEngineConfig,
        records: Arc<dyn OrderRecordSource>,
        resolver: Arc<dyn EntityResolver>,
        trends: Arc<dyn TrendProvider>,
        store: Arc<dyn StatStore>,
    ) -> Self {
        Self { config, records, resolver, trends, store }
    }

    /// Aggregate, rank, score and persist stats for every entity kind on
    /// `date`. Idempotent: re-running overwrites the date's rows.
    pub async fn aggregate_for_date(&self, date: NaiveDate) -> Result<AggregationSummary> {
        let records = self.fetch_records(date).await?;
        let total_orders = records.len();
        info!(%date, total_orders, "daily aggregation started");

        // The five kind pipelines are independent; run them concurrently.
        let runs = EntityKind::ALL.map(|kind| self.aggregate_kind(kind, date, &records));
        let summaries = futures::future::join_all(runs).await;

        let per_kind = EntityKind::ALL.into_iter().zip(summaries).collect();
        Ok(AggregationSummary { stat_date: date, total_orders, per_kind })
    }

    /// Narrow date-filtered fetch, falling back to a broad fetch with
    /// client-side filtering. Both failing is fatal for the run.
    async fn fetch_records(&self, date: NaiveDate) -> Result<Vec<RawOrderRecord>> {
        match self.records.records_for_date(date).await {
            Ok(records) => Ok(records),
            Err(narrow_err) => {
                warn!(%date, error = %narrow_err, "date-filtered fetch failed, falling back to broad fetch");
                let all = self.records.all_records().await.map_err(|broad_err| {
                    StatEngineError::DataSourceUnavailable(format!(
                        "narrow fetch: {narrow_err}; broad fetch: {broad_err}"
                    ))
                })?;
                Ok(all
                    .into_iter()
                    .filter(|r| r.timestamp.date_naive() == date)
                    .collect())
            }
        }
    }

    async fn aggregate_kind(
        &self,
        kind: EntityKind,
        date: NaiveDate,
        records: &[RawOrderRecord],
    ) -> KindSummary {
        let totals = aggregate_orders(kind, records);
        // Rank assignment is complete before any concurrent lookup below;
        // unresolved entities keep their slot and do not renumber the rest.
        let ranked = rank_entities(kind, totals);
        let candidates = ranked.len();

        let cap = self.config.scoring_concurrency;
        let lookups = ranked.into_iter().map(|entity| self.resolve_entity(kind, date, entity));
        let resolved: Vec<ResolvedEntity> = stream::iter(lookups)
            .buffer_unordered(cap)
            .filter_map(|outcome| async move { outcome })
            .collect()
            .await;

        let mut skipped = (candidates - resolved.len()) as u32;

        // Category total is fixed before scoring so market share is
        // consistent across the concurrently scored entities.
        let category_total_7d: i64 = resolved
            .iter()
            .map(|r| r.trend.volume_7d.unwrap_or(0).max(0))
            .sum();

        let writes = resolved
            .into_iter()
            .map(|entity| self.score_and_persist(kind, date, entity, category_total_7d));
        let persisted: Vec<bool> = stream::iter(writes).buffer_unordered(cap).collect().await;

        let processed = persisted.iter().filter(|ok| **ok).count() as u32;
        skipped += persisted.iter().filter(|ok| !**ok).count() as u32;

        info!(%kind, %date, processed, skipped, "kind aggregation complete");
        KindSummary { processed, skipped }
    }

    /// Resolve one entity and fetch its trend data. Any miss or lookup
    /// failure skips the entity.
    async fn resolve_entity(
        &self,
        kind: EntityKind,
        date: NaiveDate,
        entity: RankedEntity,
    ) -> Option<ResolvedEntity> {
        let entity_id = match self.resolver.resolve(kind, &entity.name).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(%kind, name = %entity.name, "entity did not resolve, skipping");
                return None;
            }
            Err(e) => {
                warn!(%kind, name = %entity.name, error = %e, "resolution failed, skipping");
                return None;
            }
        };

        let trend = match self.trends.trend(kind, entity_id, date).await {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                warn!(%kind, entity_id, error = %e, "trend lookup failed, skipping");
                return None;
            }
        };

        let rank_history = match self
            .trends
            .rank_history(kind, entity_id, date, self.config.streak_lookback_days)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!(%kind, entity_id, error = %e, "rank history lookup failed, skipping");
                return None;
            }
        };

        Some(ResolvedEntity { entity, entity_id, trend, rank_history })
    }

    /// Score one resolved entity and upsert its stat row. Returns false on
    /// a persistence failure (counted as skipped).
    async fn score_and_persist(
        &self,
        kind: EntityKind,
        date: NaiveDate,
        resolved: ResolvedEntity,
        category_total_7d: i64,
    ) -> bool {
        let ResolvedEntity { entity, entity_id, trend, rank_history } = resolved;

        let previous_rank = rank_history.first().copied().flatten();
        let streak_days = compute_streak(entity.rank, &rank_history);
        let share = market_share_percent(trend.volume_7d.unwrap_or(0), category_total_7d);

        let breakdown = score_entity(&ScoringInputs {
            kind,
            totals: entity.totals,
            rank: entity.rank,
            trend,
            streak_days,
            market_share_percent: share,
            trend_multiplier_cap: self.config.trend_multiplier_cap,
        });

        let stat = EntityStat {
            kind,
            entity_id,
            name: entity.name,
            stat_date: date,
            volume: entity.totals.volume,
            order_count: entity.totals.order_count,
            revenue_cents: entity.totals.revenue_cents,
            rank: entity.rank,
            previous_rank,
            trend_multiplier: breakdown.trend_multiplier,
            consistency_score: breakdown.consistency_score,
            velocity_score: breakdown.velocity_score,
            streak_days,
            market_share_percent: breakdown.market_share_percent,
            total_points: breakdown.total_points,
        };

        match self.store.upsert_stat(stat).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%kind, entity_id, error = %e, "stat upsert failed, skipping");
                false
            }
        }
    }
}
