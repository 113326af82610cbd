//! Service-level tests for the aggregation orchestrator

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::config::StatEngineConfig;
use crate::error::{Result, StatEngineError};
use crate::memory::InMemoryStatStore;
use crate::service::AggregationService;
use crate::sources::{EntityResolver, OrderRecordSource, StatStore, TrendProvider};
use crate::types::{EntityKind, RawOrderRecord, TrendSnapshot};

fn stat_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 20).unwrap()
}

fn order(strain: &str, manufacturer: &str, quantity: f64, amount: f64) -> RawOrderRecord {
    RawOrderRecord {
        manufacturer: Some(manufacturer.to_string()),
        strain: Some(strain.to_string()),
        product: None,
        pharmacy: None,
        brand: None,
        quantity,
        amount,
        timestamp: Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap(),
    }
}

struct MockRecordSource {
    records: Vec<RawOrderRecord>,
    fail_narrow: bool,
    fail_broad: bool,
}

#[async_trait::async_trait]
impl OrderRecordSource for MockRecordSource {
    async fn records_for_date(&self, date: chrono::NaiveDate) -> Result<Vec<RawOrderRecord>> {
        if self.fail_narrow {
            return Err(StatEngineError::Internal("narrow fetch down".into()));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.timestamp.date_naive() == date)
            .cloned()
            .collect())
    }

    async fn all_records(&self) -> Result<Vec<RawOrderRecord>> {
        if self.fail_broad {
            return Err(StatEngineError::Internal("broad fetch down".into()));
        }
        Ok(self.records.clone())
    }
}

/// Resolves names through a fixed table; anything listed in `unresolved`
/// (or absent from the table) fails to resolve.
struct MockResolver {
    ids: HashMap<String, i64>,
    unresolved: HashSet<String>,
}

impl MockResolver {
    fn with_names(names: &[&str]) -> Self {
        let ids = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i as i64 + 100))
            .collect();
        Self { ids, unresolved: HashSet::new() }
    }
}

#[async_trait::async_trait]
impl EntityResolver for MockResolver {
    async fn resolve(&self, _kind: EntityKind, name: &str) -> Result<Option<i64>> {
        if self.unresolved.contains(name) {
            return Ok(None);
        }
        Ok(self.ids.get(name).copied())
    }
}

#[derive(Default)]
struct MockTrendProvider {
    trends: HashMap<i64, TrendSnapshot>,
    histories: HashMap<i64, Vec<Option<u32>>>,
}

#[async_trait::async_trait]
impl TrendProvider for MockTrendProvider {
    async fn trend(
        &self,
        _kind: EntityKind,
        entity_id: i64,
        _date: chrono::NaiveDate,
    ) -> Result<Option<TrendSnapshot>> {
        Ok(self.trends.get(&entity_id).cloned())
    }

    async fn rank_history(
        &self,
        _kind: EntityKind,
        entity_id: i64,
        _before: chrono::NaiveDate,
        _max_days: u32,
    ) -> Result<Vec<Option<u32>>> {
        Ok(self.histories.get(&entity_id).cloned().unwrap_or_default())
    }
}

fn service(
    source: MockRecordSource,
    resolver: MockResolver,
    trends: MockTrendProvider,
) -> (AggregationService, Arc<InMemoryStatStore>) {
    let store = Arc::new(InMemoryStatStore::new());
    let service = AggregationService::new(
        StatEngineConfig::default(),
        Arc::new(source),
        Arc::new(resolver),
        Arc::new(trends),
        Arc::clone(&store) as Arc<dyn StatStore>,
    );
    (service, store)
}

mod orchestration {
    use super::*;

    #[tokio::test]
    async fn aggregation_is_idempotent() {
        let records = vec![
            order("Blue Dream", "Acme Labs", 100.0, 900.0),
            order("OG Kush", "Acme Labs", 50.0, 500.0),
            order("Blue Dream", "Budco", 25.0, 200.0),
        ];
        let names = ["Blue Dream", "OG Kush", "Acme Labs", "Budco"];

        let make = |records: Vec<RawOrderRecord>| {
            service(
                MockRecordSource { records, fail_narrow: false, fail_broad: false },
                MockResolver::with_names(&names),
                MockTrendProvider::default(),
            )
        };

        let (svc, store) = make(records.clone());
        let first = svc.aggregate_for_date(stat_date()).await.unwrap();
        let rows_first = store.stats_for_date(EntityKind::Strain, stat_date()).await.unwrap();

        let second = svc.aggregate_for_date(stat_date()).await.unwrap();
        let rows_second = store.stats_for_date(EntityKind::Strain, stat_date()).await.unwrap();

        assert_eq!(rows_first, rows_second);
        assert_eq!(first.per_kind[&EntityKind::Strain], second.per_kind[&EntityKind::Strain]);
        assert_eq!(first.total_orders, 3);
    }

    #[tokio::test]
    async fn ranks_form_a_strict_descending_permutation() {
        let records = vec![
            order("Low", "M1", 10.0, 100.0),
            order("High", "M1", 90.0, 100.0),
            order("Mid", "M1", 40.0, 100.0),
        ];
        let (svc, store) = service(
            MockRecordSource { records, fail_narrow: false, fail_broad: false },
            MockResolver::with_names(&["Low", "High", "Mid", "M1"]),
            MockTrendProvider::default(),
        );
        svc.aggregate_for_date(stat_date()).await.unwrap();

        let rows = store.stats_for_date(EntityKind::Strain, stat_date()).await.unwrap();
        let ranks: Vec<u32> = rows.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        for pair in rows.windows(2) {
            assert!(pair[0].volume > pair[1].volume);
            assert!(pair[0].rank < pair[1].rank);
        }
        assert_eq!(rows[0].name, "High");
    }

    #[tokio::test]
    async fn unresolved_entities_skip_without_renumbering() {
        let records = vec![
            order("First", "M1", 90.0, 100.0),
            order("Ghost", "M1", 40.0, 100.0),
            order("Third", "M1", 10.0, 100.0),
        ];
        let mut resolver = MockResolver::with_names(&["First", "Ghost", "Third", "M1"]);
        resolver.unresolved.insert("Ghost".to_string());

        let (svc, store) = service(
            MockRecordSource { records, fail_narrow: false, fail_broad: false },
            resolver,
            MockTrendProvider::default(),
        );
        let summary = svc.aggregate_for_date(stat_date()).await.unwrap();

        let rows = store.stats_for_date(EntityKind::Strain, stat_date()).await.unwrap();
        let ranks: Vec<(String, u32)> =
            rows.iter().map(|s| (s.name.clone(), s.rank)).collect();
        // "Ghost" held rank 2; the gap stays.
        assert_eq!(ranks, vec![("First".to_string(), 1), ("Third".to_string(), 3)]);

        let strains = summary.per_kind[&EntityKind::Strain];
        assert_eq!(strains.processed, 2);
        assert_eq!(strains.skipped, 1);
    }

    #[tokio::test]
    async fn per_entity_failures_do_not_abort_the_kind() {
        // No resolver entries at all: every entity skips, run still succeeds.
        let records = vec![order("A", "M", 10.0, 10.0), order("B", "M", 20.0, 20.0)];
        let (svc, _store) = service(
            MockRecordSource { records, fail_narrow: false, fail_broad: false },
            MockResolver { ids: HashMap::new(), unresolved: HashSet::new() },
            MockTrendProvider::default(),
        );
        let summary = svc.aggregate_for_date(stat_date()).await.unwrap();
        let strains = summary.per_kind[&EntityKind::Strain];
        assert_eq!(strains.processed, 0);
        assert_eq!(strains.skipped, 2);
    }
}

mod record_fetching {
    use super::*;

    #[tokio::test]
    async fn broad_fallback_filters_by_date() {
        let mut off_date = order("Blue Dream", "Acme Labs", 30.0, 300.0);
        off_date.timestamp = Utc.with_ymd_and_hms(2024, 4, 19, 23, 0, 0).unwrap();
        let records = vec![order("Blue Dream", "Acme Labs", 100.0, 900.0), off_date];

        let (svc, _store) = service(
            MockRecordSource { records, fail_narrow: true, fail_broad: false },
            MockResolver::with_names(&["Blue Dream", "Acme Labs"]),
            MockTrendProvider::default(),
        );
        let summary = svc.aggregate_for_date(stat_date()).await.unwrap();
        // Only the on-date record survives the client-side filter.
        assert_eq!(summary.total_orders, 1);
    }

    #[tokio::test]
    async fn both_fetch_paths_failing_is_fatal() {
        let (svc, _store) = service(
            MockRecordSource { records: vec![], fail_narrow: true, fail_broad: true },
            MockResolver::with_names(&[]),
            MockTrendProvider::default(),
        );
        let err = svc.aggregate_for_date(stat_date()).await.unwrap_err();
        assert!(matches!(err, StatEngineError::DataSourceUnavailable(_)));
    }
}

mod trend_wiring {
    use super::*;

    #[tokio::test]
    async fn previous_rank_streak_and_share_flow_into_the_row() {
        let records = vec![
            order("Blue Dream", "Acme Labs", 100.0, 900.0),
            order("OG Kush", "Acme Labs", 50.0, 500.0),
        ];
        let resolver = MockResolver::with_names(&["Blue Dream", "OG Kush", "Acme Labs"]);
        let blue_id = resolver.ids["Blue Dream"];
        let kush_id = resolver.ids["OG Kush"];

        let mut trends = MockTrendProvider::default();
        trends.trends.insert(
            blue_id,
            TrendSnapshot { volume_1d: Some(30), volume_7d: Some(70), ..Default::default() },
        );
        trends.trends.insert(
            kush_id,
            TrendSnapshot { volume_7d: Some(30), ..Default::default() },
        );
        trends.histories.insert(blue_id, vec![Some(2), Some(5), Some(14)]);

        let (svc, store) = service(
            MockRecordSource { records, fail_narrow: false, fail_broad: false },
            resolver,
            trends,
        );
        svc.aggregate_for_date(stat_date()).await.unwrap();

        let rows = store.stats_for_date(EntityKind::Strain, stat_date()).await.unwrap();
        let blue = rows.iter().find(|s| s.name == "Blue Dream").unwrap();
        assert_eq!(blue.previous_rank, Some(2));
        // Today + two consecutive prior top-10 days.
        assert_eq!(blue.streak_days, 3);
        // 70 of 100 category-wide 7-day grams.
        assert_eq!(blue.market_share_percent, 70.0);
        assert_eq!(blue.trend_multiplier, 3.0);

        let kush = rows.iter().find(|s| s.name == "OG Kush").unwrap();
        assert_eq!(kush.previous_rank, None);
        assert_eq!(kush.streak_days, 1);
        assert_eq!(kush.market_share_percent, 30.0);
        assert_eq!(kush.trend_multiplier, 1.0);
    }

    #[tokio::test]
    async fn missing_trend_data_scores_neutral() {
        let records = vec![order("Blue Dream", "Acme Labs", 437.0, 523.0)];
        let (svc, store) = service(
            MockRecordSource { records, fail_narrow: false, fail_broad: false },
            MockResolver::with_names(&["Blue Dream", "Acme Labs"]),
            MockTrendProvider::default(),
        );
        svc.aggregate_for_date(stat_date()).await.unwrap();

        let rows = store.stats_for_date(EntityKind::Manufacturer, stat_date()).await.unwrap();
        let acme = &rows[0];
        assert_eq!(acme.trend_multiplier, 1.0);
        assert_eq!(acme.consistency_score, 2);
        assert_eq!(acme.velocity_score, 0);
        // volume 437 → 43, 1 order → 5, 52300 cents → 52, rank 1 → 50,
        // streak of 1 (top-10 today) → 2.
        assert_eq!(acme.total_points, 43 + 5 + 52 + 50 + 2);
    }
}
