//! Missing-movie computation.
//!
//! Compares catalog candidates with the identifiers the library already tracks.
//! The engine never posts anything; dispatching the result is up to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::catalog::{CatalogGateway, CatalogItem, MovieCategory};
use crate::error::{BridgeError, BridgeResult};
use crate::library::LibraryGateway;

/// Result of comparing one catalog listing with the library.
#[derive(Debug)]
pub struct MissingReport {
    pub category: MovieCategory,
    /// Number of candidates returned by the catalog, before any filtering.
    pub candidates: usize,
    /// Candidates absent from the library, in catalog order.
    pub missing: Vec<CatalogItem>,
    /// Candidates dropped by the release-month filter because their date can't be read.
    pub rejected: Vec<BridgeError>,
}

/// Computes which catalog entries the library doesn't track yet.
pub struct ReconciliationEngine {
    catalog: Arc<dyn CatalogGateway>,
    library: Arc<dyn LibraryGateway>,
    /// When set, only candidates released in the current calendar month are kept.
    months_ahead: Option<u32>,
}

impl ReconciliationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        library: Arc<dyn LibraryGateway>,
        months_ahead: Option<u32>,
    ) -> Self {
        Self {
            catalog,
            library,
            months_ahead,
        }
    }

    /// Fetch both sides and compute the missing candidates of `category`.
    ///
    /// Any gateway failure aborts the whole computation.
    pub async fn find_missing(&self, category: MovieCategory) -> BridgeResult<MissingReport> {
        let today = chrono::Local::now().date_naive();
        self.find_missing_at(category, today).await
    }

    /// Same as [`find_missing`](Self::find_missing) with an explicit "today".
    pub async fn find_missing_at(
        &self,
        category: MovieCategory,
        today: NaiveDate,
    ) -> BridgeResult<MissingReport> {
        // Fetched fresh on every pass.
        let known = self.library.list_known_identifiers().await?;
        info!(
            "Loaded {} movie ids currently tracked by the library",
            known.len()
        );

        let candidates = self.catalog.fetch(category).await?;
        let candidate_count = candidates.len();
        info!("Fetched {} {} movies from the catalog", candidate_count, category);

        let (candidates, rejected) = if self.months_ahead.is_some() {
            retain_release_month(candidates, today)
        } else {
            (candidates, Vec::new())
        };

        for error in &rejected {
            warn!("Skipping candidate: {}", error);
        }

        let missing = missing(candidates, &known);
        info!(
            "{} of {} {} movies are missing from the library",
            missing.len(),
            candidate_count,
            category
        );

        Ok(MissingReport {
            category,
            candidates: candidate_count,
            missing,
            rejected,
        })
    }
}

/// Candidates whose id is not in `known`, in their original order.
pub fn missing(candidates: Vec<CatalogItem>, known: &HashSet<i64>) -> Vec<CatalogItem> {
    candidates
        .into_iter()
        .filter(|item| !known.contains(&item.id))
        .collect()
}

/// Keep candidates released in the same calendar month as `today`.
///
/// This is a same-month match, not a sliding window. Candidates whose release
/// date can't be parsed are dropped and returned as errors.
pub fn retain_release_month(
    candidates: Vec<CatalogItem>,
    today: NaiveDate,
) -> (Vec<CatalogItem>, Vec<BridgeError>) {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();

    for item in candidates {
        match item.parsed_release_date() {
            Ok(date) if date.same_month_as(today) => kept.push(item),
            Ok(_) => {}
            Err(e) => rejected.push(e),
        }
    }

    (kept, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::library::{AcquisitionRequest, AcquisitionResult};

    fn item(id: i64, date: Option<&str>) -> CatalogItem {
        CatalogItem {
            id,
            title: format!("Movie {}", id),
            release_date: date.map(|d| d.to_string()),
            overview: String::new(),
            poster_path: None,
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
        }
    }

    fn ids(items: &[CatalogItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    struct StaticCatalog(Option<Vec<CatalogItem>>);

    #[async_trait]
    impl CatalogGateway for StaticCatalog {
        async fn fetch(&self, _category: MovieCategory) -> BridgeResult<Vec<CatalogItem>> {
            self.0
                .clone()
                .ok_or_else(|| BridgeError::CatalogUnavailable("down".to_string()))
        }

        async fn fetch_detail(&self, id: i64) -> BridgeResult<CatalogItem> {
            Ok(item(id, None))
        }
    }

    struct StaticLibrary(Option<HashSet<i64>>);

    #[async_trait]
    impl LibraryGateway for StaticLibrary {
        async fn list_known_identifiers(&self) -> BridgeResult<HashSet<i64>> {
            self.0
                .clone()
                .ok_or_else(|| BridgeError::LibraryUnavailable("down".to_string()))
        }

        async fn submit(&self, _request: &AcquisitionRequest) -> BridgeResult<AcquisitionResult> {
            unreachable!("the engine never submits")
        }
    }

    fn engine(
        catalog: Option<Vec<CatalogItem>>,
        known: Option<HashSet<i64>>,
        months_ahead: Option<u32>,
    ) -> ReconciliationEngine {
        ReconciliationEngine::new(
            Arc::new(StaticCatalog(catalog)),
            Arc::new(StaticLibrary(known)),
            months_ahead,
        )
    }

    #[test]
    fn test_missing_preserves_order() {
        let candidates = vec![item(40, None), item(10, None), item(30, None), item(20, None)];
        let known: HashSet<i64> = [10, 20].into_iter().collect();

        assert_eq!(ids(&missing(candidates, &known)), vec![40, 30]);
    }

    #[test]
    fn test_missing_edge_cases() {
        let known: HashSet<i64> = [1].into_iter().collect();
        assert!(missing(Vec::new(), &known).is_empty());

        let candidates = vec![item(3, None), item(1, None), item(2, None)];
        assert_eq!(ids(&missing(candidates.clone(), &HashSet::new())), vec![3, 1, 2]);

        let everything: HashSet<i64> = [1, 2, 3].into_iter().collect();
        assert!(missing(candidates, &everything).is_empty());
    }

    #[test]
    fn test_missing_keeps_duplicates_in_place() {
        let candidates = vec![item(5, None), item(6, None), item(5, None)];
        assert_eq!(ids(&missing(candidates, &HashSet::new())), vec![5, 6, 5]);
    }

    #[test]
    fn test_retain_release_month() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let candidates = vec![
            item(1, Some("2024-05-01")),
            item(2, Some("2024-06-01")),
            item(3, Some("2023-05-20")),
            item(4, Some("2024-05")),
            item(5, Some("TBA")),
            item(6, None),
        ];

        let (kept, rejected) = retain_release_month(candidates, today);

        assert_eq!(ids(&kept), vec![1, 4]);
        assert_eq!(rejected.len(), 2);
        assert!(matches!(
            rejected[0],
            BridgeError::UnparsableReleaseDate { tmdb_id: 5, .. }
        ));
        assert!(matches!(
            rejected[1],
            BridgeError::UnparsableReleaseDate { tmdb_id: 6, .. }
        ));
    }

    #[tokio::test]
    async fn test_find_missing_scenario() {
        let engine = engine(
            Some(vec![item(10, None), item(30, None), item(40, None)]),
            Some([10, 20].into_iter().collect()),
            None,
        );

        let report = engine.find_missing(MovieCategory::Upcoming).await.unwrap();
        assert_eq!(report.category, MovieCategory::Upcoming);
        assert_eq!(report.candidates, 3);
        assert_eq!(ids(&report.missing), vec![30, 40]);
        assert!(report.rejected.is_empty());
    }

    #[tokio::test]
    async fn test_find_missing_applies_month_filter_when_configured() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let engine = engine(
            Some(vec![
                item(30, Some("2024-07-01")),
                item(40, Some("2024-05-30")),
                item(50, Some("")),
            ]),
            Some(HashSet::new()),
            Some(0),
        );

        let report = engine
            .find_missing_at(MovieCategory::Upcoming, today)
            .await
            .unwrap();
        assert_eq!(ids(&report.missing), vec![40]);
        assert_eq!(report.rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_ignores_dates_without_month_filter() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let engine = engine(
            Some(vec![item(30, Some("2024-07-01")), item(50, None)]),
            Some(HashSet::new()),
            None,
        );

        let report = engine
            .find_missing_at(MovieCategory::Popular, today)
            .await
            .unwrap();
        assert_eq!(ids(&report.missing), vec![30, 50]);
        assert!(report.rejected.is_empty());
    }

    #[tokio::test]
    async fn test_library_failure_aborts() {
        let engine = engine(Some(vec![item(1, None)]), None, None);
        let result = engine.find_missing(MovieCategory::Upcoming).await;
        assert!(matches!(result, Err(BridgeError::LibraryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts() {
        let engine = engine(None, Some(HashSet::new()), None);
        let result = engine.find_missing(MovieCategory::TopRated).await;
        assert!(matches!(result, Err(BridgeError::CatalogUnavailable(_))));
    }
}
