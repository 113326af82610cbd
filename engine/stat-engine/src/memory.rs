//! In-memory stat store backend
//!
//! Reference implementation of [`StatStore`] used by tests and by embedders
//! that do not need durable storage. Upserts replace the row at
//! (kind, entity_id, stat_date) atomically via the underlying shard lock.

use chrono::NaiveDate;
use dashmap::DashMap;

use crate::error::Result;
use crate::sources::StatStore;
use crate::types::{EntityKind, EntityStat};

#[derive(Debug, Default)]
pub struct InMemoryStatStore {
    rows: DashMap<(EntityKind, i64, NaiveDate), EntityStat>,
}

impl InMemoryStatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait::async_trait]
impl StatStore for InMemoryStatStore {
    async fn upsert_stat(&self, stat: EntityStat) -> Result<()> {
        self.rows.insert((stat.kind, stat.entity_id, stat.stat_date), stat);
        Ok(())
    }

    async fn stats_for_date(&self, kind: EntityKind, date: NaiveDate) -> Result<Vec<EntityStat>> {
        let mut stats: Vec<EntityStat> = self
            .rows
            .iter()
            .filter(|entry| {
                let (k, _, d) = entry.key();
                *k == kind && *d == date
            })
            .map(|entry| entry.value().clone())
            .collect();
        stats.sort_by_key(|s| s.rank);
        Ok(stats)
    }
}
