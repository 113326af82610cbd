//! Per-entity aggregation and ranking
//!
//! Both functions are pure: aggregation folds raw order records into
//! per-entity counters, ranking materializes the full descending order by
//! the kind's primary metric before any identifier resolution happens.

use std::collections::HashMap;

use crate::types::{EntityKind, EntityTotals, RankedEntity, RawOrderRecord};

/// Convert a currency amount to integer cents, rounding half-cents away
/// from zero.
///
/// The amount is pre-rounded at mill precision (a tenth of a cent) so
/// decimal inputs with no exact binary representation, such as `1.005`,
/// still land on the half-cent boundary before the final rounding step.
/// Amounts are expected to carry at most three decimal places; magnitudes
/// beyond the `i64` cent range saturate.
pub fn to_cents(amount: f64) -> i64 {
    let mills = (amount * 1000.0).round();
    (mills / 10.0).round() as i64
}

/// Group the date's raw records by entity name for `kind`, accumulating
/// volume, order count and revenue. Records without a name for this kind
/// are dropped.
pub fn aggregate_orders(
    kind: EntityKind,
    records: &[RawOrderRecord],
) -> HashMap<String, EntityTotals> {
    let mut totals: HashMap<String, EntityTotals> = HashMap::new();
    for record in records {
        let Some(name) = record.name_for(kind) else {
            continue;
        };
        let entry = totals.entry(name.to_string()).or_default();
        entry.volume += record.quantity;
        entry.order_count += 1;
        entry.revenue_cents += to_cents(record.amount);
    }
    totals
}

/// Sort entities descending by the kind's primary metric and assign 1-based
/// ranks.
///
/// The aggregate map is first materialized in name order so the subsequent
/// stable sort gives a deterministic tie rule: equal metrics rank in entity
/// name order. The returned list is the *full* ranking; callers that fail
/// to resolve an entity later must skip it without renumbering the rest.
pub fn rank_entities(
    kind: EntityKind,
    totals: HashMap<String, EntityTotals>,
) -> Vec<RankedEntity> {
    let mut entries: Vec<(String, EntityTotals)> = totals.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.sort_by(|a, b| {
        kind.primary_metric(&b.1)
            .total_cmp(&kind.primary_metric(&a.1))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (name, totals))| RankedEntity { name, totals, rank: i as u32 + 1 })
        .collect()
}
