//! Type definitions for the stat engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The five ranked marketplace entity kinds.
///
/// Every kind-specific table (point multipliers, rank bonus tiers, primary
/// ranking metric) lives here so scoring and ranking dispatch through
/// exhaustive `match` instead of string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Manufacturer,
    Strain,
    Product,
    Pharmacy,
    Brand,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Manufacturer,
        EntityKind::Strain,
        EntityKind::Product,
        EntityKind::Pharmacy,
        EntityKind::Brand,
    ];

    /// Volume point multiplier (strains score double, products triple).
    pub fn base_multiplier(self) -> i64 {
        match self {
            EntityKind::Manufacturer | EntityKind::Pharmacy | EntityKind::Brand => 1,
            EntityKind::Strain => 2,
            EntityKind::Product => 3,
        }
    }

    /// Points awarded per order, scaled with the base multiplier (5/10/15).
    pub fn order_weight(self) -> i64 {
        self.base_multiplier() * 5
    }

    /// Kinds whose base points include a revenue component
    /// (`revenue_cents / 1000`).
    pub fn includes_revenue_points(self) -> bool {
        matches!(self, EntityKind::Manufacturer | EntityKind::Pharmacy)
    }

    /// Fixed tiered bonus for a 1-based rank. Two tier tables exist:
    /// manufacturers, products and brands use the higher one.
    pub fn rank_bonus(self, rank: u32) -> i64 {
        match self {
            EntityKind::Manufacturer | EntityKind::Product | EntityKind::Brand => match rank {
                1 => 50,
                2 => 30,
                3 => 20,
                4..=5 => 15,
                6..=10 => 10,
                _ => 0,
            },
            EntityKind::Strain | EntityKind::Pharmacy => match rank {
                1 => 40,
                2 => 25,
                3 => 15,
                4..=5 => 10,
                6..=10 => 5,
                _ => 0,
            },
        }
    }

    /// The metric entities of this kind are ranked by, descending.
    pub fn primary_metric(self, totals: &EntityTotals) -> f64 {
        match self {
            EntityKind::Manufacturer | EntityKind::Strain | EntityKind::Product => totals.volume,
            EntityKind::Pharmacy => totals.revenue_cents as f64,
            // Brands are ranked by engagement; raw orders are the only
            // engagement signal the record source carries.
            EntityKind::Brand => totals.order_count as f64,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Manufacturer => "manufacturer",
            EntityKind::Strain => "strain",
            EntityKind::Product => "product",
            EntityKind::Pharmacy => "pharmacy",
            EntityKind::Brand => "brand",
        };
        write!(f, "{s}")
    }
}

/// One raw order line as delivered by the record source. An order names up
/// to one entity of each kind; missing names drop the record from that
/// kind's aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrderRecord {
    pub manufacturer: Option<String>,
    pub strain: Option<String>,
    pub product: Option<String>,
    pub pharmacy: Option<String>,
    pub brand: Option<String>,
    /// Quantity in grams
    pub quantity: f64,
    /// Monetary amount in currency units (converted to cents on aggregation)
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl RawOrderRecord {
    /// The display name this record contributes to `kind`, if any.
    pub fn name_for(&self, kind: EntityKind) -> Option<&str> {
        let name = match kind {
            EntityKind::Manufacturer => &self.manufacturer,
            EntityKind::Strain => &self.strain,
            EntityKind::Product => &self.product,
            EntityKind::Pharmacy => &self.pharmacy,
            EntityKind::Brand => &self.brand,
        };
        name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Accumulated counters for one entity on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityTotals {
    /// Sales volume in grams
    pub volume: f64,
    pub order_count: i64,
    /// Revenue in cents, rounded half away from zero per record
    pub revenue_cents: i64,
}

/// An entity after ranking: 1-based position in the full sorted aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub name: String,
    pub totals: EntityTotals,
    pub rank: u32,
}

/// Externally supplied rolling-window history for one entity.
///
/// Every field is optional; scoring treats missing values as zero and never
/// fails on an incomplete snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub volume_1d: Option<i64>,
    pub volume_7d: Option<i64>,
    pub volume_14d: Option<i64>,
    pub volume_30d: Option<i64>,
    pub volume_60d: Option<i64>,
    pub volume_90d: Option<i64>,
    /// Brand rating inputs; ignored for other kinds
    pub total_ratings: Option<i64>,
    pub bayesian_rating: Option<f64>,
}

/// Auditable decomposition of an entity's points for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_points: i64,
    pub rank_bonus: i64,
    /// Never below 1.0; a multiplier is "no worse than neutral"
    pub trend_multiplier: f64,
    pub consistency_score: i64,
    pub velocity_score: i64,
    pub market_share_percent: f64,
    /// Additive blend of the three trend sub-scores
    pub trend_bonus: i64,
    pub total_points: i64,
}

/// One persisted stat row. Unique per (kind, entity_id, stat_date);
/// re-aggregating a date overwrites the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStat {
    pub kind: EntityKind,
    pub entity_id: i64,
    pub name: String,
    pub stat_date: NaiveDate,
    pub volume: f64,
    pub order_count: i64,
    pub revenue_cents: i64,
    pub rank: u32,
    pub previous_rank: Option<u32>,
    pub trend_multiplier: f64,
    pub consistency_score: i64,
    pub velocity_score: i64,
    pub streak_days: u32,
    pub market_share_percent: f64,
    pub total_points: i64,
}

/// Processed/skipped counts for one entity kind within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub processed: u32,
    pub skipped: u32,
}

/// Outcome of one `aggregate_for_date` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSummary {
    pub stat_date: NaiveDate,
    pub total_orders: usize,
    pub per_kind: HashMap<EntityKind, KindSummary>,
}
