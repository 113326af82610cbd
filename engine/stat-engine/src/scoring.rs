//! Trend-based scoring engine
//!
//! Pure point computation for one entity on one date. Inputs arrive already
//! defaulted (every optional trend field is treated as zero), so scoring
//! never fails; degenerate inputs clamp to neutral values instead.
//!
//! Point blend (pinned by characterization tests):
//!
//! ```text
//! total = base_points + rank_bonus + trend_bonus          (non-brand)
//! trend_bonus = round((trend_multiplier - 1) * 25)
//!             + consistency_score + velocity_score
//! total = ratings*10 + floor(bayesian*20) + rank_bonus    (brand)
//! ```
//!
//! Each trend term is non-negative and monotonic in its signal, so raising
//! any sub-score can never lower the total.

use crate::types::{EntityKind, EntityTotals, ScoreBreakdown, TrendSnapshot};

/// Weight applied to the above-neutral part of the trend multiplier.
const TREND_MULTIPLIER_WEIGHT: f64 = 25.0;

/// Weight applied to the above-neutral part of the momentum ratio.
const VELOCITY_WEIGHT: f64 = 25.0;

/// Streak days beyond this contribute no further consistency points.
const CONSISTENCY_STREAK_CAP: u32 = 30;

/// Momentum ratio surplus beyond this is ignored.
const VELOCITY_RATIO_CAP: f64 = 2.0;

/// Everything the scoring engine needs for one entity.
#[derive(Debug, Clone)]
pub struct ScoringInputs {
    pub kind: EntityKind,
    pub totals: EntityTotals,
    pub rank: u32,
    pub trend: TrendSnapshot,
    pub streak_days: u32,
    pub market_share_percent: f64,
    /// Ceiling on the trend multiplier (config)
    pub trend_multiplier_cap: f64,
}

/// Compute the full score breakdown for one entity.
pub fn score_entity(inputs: &ScoringInputs) -> ScoreBreakdown {
    let base_points = base_points(inputs.kind, &inputs.totals, &inputs.trend);
    let rank_bonus = inputs.kind.rank_bonus(inputs.rank);

    let trend_multiplier = trend_multiplier(&inputs.trend, inputs.trend_multiplier_cap);
    let consistency_score = consistency_score(inputs.streak_days);
    let velocity_score = velocity_score(&inputs.trend);

    // Brands have no volume/order flow; their total is structurally
    // distinct and carries no trend bonus.
    let trend_bonus = if inputs.kind == EntityKind::Brand {
        0
    } else {
        ((trend_multiplier - 1.0) * TREND_MULTIPLIER_WEIGHT).round() as i64
            + consistency_score
            + velocity_score
    };

    ScoreBreakdown {
        base_points,
        rank_bonus,
        trend_multiplier,
        consistency_score,
        velocity_score,
        market_share_percent: inputs.market_share_percent,
        trend_bonus,
        total_points: base_points + rank_bonus + trend_bonus,
    }
}

/// Volume, order and (for manufacturers and pharmacies) revenue points.
/// Brands score on ratings instead.
fn base_points(kind: EntityKind, totals: &EntityTotals, trend: &TrendSnapshot) -> i64 {
    if kind == EntityKind::Brand {
        let ratings = trend.total_ratings.unwrap_or(0);
        let bayesian = trend.bayesian_rating.unwrap_or(0.0);
        return ratings * 10 + (bayesian * 20.0).floor() as i64;
    }

    let mut points = (totals.volume / 10.0).floor() as i64 * kind.base_multiplier()
        + totals.order_count * kind.order_weight();
    if kind.includes_revenue_points() {
        points += totals.revenue_cents / 1000;
    }
    points
}

/// Ratio of the most recent single-day volume to the trailing daily
/// average (7-day window, falling back to 14-day). Floored at 1.0: missing,
/// zero or negative inputs are neutral, never a penalty.
fn trend_multiplier(trend: &TrendSnapshot, cap: f64) -> f64 {
    let day = trend.volume_1d.unwrap_or(0) as f64;
    let trailing_avg = match (trend.volume_7d, trend.volume_14d) {
        (Some(v), _) if v > 0 => v as f64 / 7.0,
        (_, Some(v)) if v > 0 => v as f64 / 14.0,
        _ => 0.0,
    };
    if day <= 0.0 || trailing_avg <= 0.0 {
        return 1.0;
    }
    (day / trailing_avg).clamp(1.0, cap)
}

/// Two points per consecutive top-10 day, capped at 30 days.
fn consistency_score(streak_days: u32) -> i64 {
    streak_days.min(CONSISTENCY_STREAK_CAP) as i64 * 2
}

/// Momentum of the 7-day daily average over the 30-day daily average.
/// Zero when the long window is empty; monotonic in the ratio.
fn velocity_score(trend: &TrendSnapshot) -> i64 {
    let short = trend.volume_7d.unwrap_or(0) as f64 / 7.0;
    let long = trend.volume_30d.unwrap_or(0) as f64 / 30.0;
    if long <= 0.0 {
        return 0;
    }
    let surplus = (short / long - 1.0).clamp(0.0, VELOCITY_RATIO_CAP);
    (surplus * VELOCITY_WEIGHT).round() as i64
}

/// Entity 7-day volume as a share of the category total, rounded to two
/// decimals. Zero when the category total is zero.
pub fn market_share_percent(volume_7d: i64, category_total_7d: i64) -> f64 {
    if category_total_7d <= 0 {
        return 0.0;
    }
    let share = volume_7d as f64 / category_total_7d as f64 * 100.0;
    (share * 100.0).round() / 100.0
}

/// Consecutive top-10 days including today.
///
/// `history` holds prior-day ranks, most recent first (yesterday at index
/// 0, `None` for days without a row). The walk stops at the first missing
/// or non-top-10 day; today counts once confirmed top-10. An entity outside
/// the top 10 today has no streak.
pub fn compute_streak(current_rank: u32, history: &[Option<u32>]) -> u32 {
    if current_rank > 10 {
        return 0;
    }
    let prior = history
        .iter()
        .take_while(|day| matches!(day, Some(rank) if *rank <= 10))
        .count() as u32;
    1 + prior
}
