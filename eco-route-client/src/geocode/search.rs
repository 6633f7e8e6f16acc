//! Query classification and suggestion lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::Location;

use super::error::GeocodeError;
use super::types::GeocodeResult;

/// Maximum number of suggestions requested per query.
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Shortest query (in characters, after trimming) that is searched at all.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// Trait for looking up addresses.
///
/// This abstraction allows the search flow to be tested without a provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return at most `limit` results for `query`, most relevant first.
    async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<GeocodeResult>, GeocodeError>;
}

/// What a query should do, decided without any network access.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    /// Too short to search.
    TooShort,
    /// A coordinate pair that resolves directly.
    Coordinates(Location),
    /// Free text for the geocoder.
    Text,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query was too short; nothing was looked up.
    Skipped,
    /// The query was a coordinate pair.
    Coordinates(Location),
    /// Geocoder suggestions in provider order. Empty on provider failure.
    Suggestions(Vec<GeocodeResult>),
}

/// Classify a query.
pub fn classify_query(query: &str, min_chars: usize) -> QueryKind {
    let trimmed = query.trim();

    if trimmed.chars().count() < min_chars {
        return QueryKind::TooShort;
    }

    match Location::parse_coordinates(trimmed) {
        Some(location) => QueryKind::Coordinates(location),
        None => QueryKind::Text,
    }
}

/// Turns free text into suggestions or a directly parsed location.
pub struct GeocodeSearch<G> {
    geocoder: Arc<G>,
    limit: usize,
    min_query_chars: usize,
}

// Manual impl: cloning shares the geocoder and must not require `G: Clone`.
impl<G> Clone for GeocodeSearch<G> {
    fn clone(&self) -> Self {
        Self {
            geocoder: Arc::clone(&self.geocoder),
            limit: self.limit,
            min_query_chars: self.min_query_chars,
        }
    }
}

impl<G: Geocoder> GeocodeSearch<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            limit: DEFAULT_RESULT_LIMIT,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }

    /// Set the maximum number of suggestions.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the shortest query that is searched.
    pub fn with_min_query_chars(mut self, chars: usize) -> Self {
        self.min_query_chars = chars;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn min_query_chars(&self) -> usize {
        self.min_query_chars
    }

    /// Classify `query` with this search's minimum length.
    pub fn classify(&self, query: &str) -> QueryKind {
        classify_query(query, self.min_query_chars)
    }

    /// Search for `query`.
    ///
    /// Coordinate pairs short-circuit without calling the geocoder. Provider
    /// errors are logged and reported as an empty suggestion list.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        match self.classify(query) {
            QueryKind::TooShort => SearchOutcome::Skipped,
            QueryKind::Coordinates(location) => {
                debug!(query, "query is a coordinate pair, skipping geocoder");
                SearchOutcome::Coordinates(location)
            }
            QueryKind::Text => match self.geocoder.geocode(query.trim(), self.limit).await {
                Ok(mut results) => {
                    results.truncate(self.limit);
                    debug!(query, count = results.len(), "geocoder returned suggestions");
                    SearchOutcome::Suggestions(results)
                }
                Err(e) => {
                    warn!(query, error = %e, "geocoding failed, showing no suggestions");
                    SearchOutcome::Suggestions(Vec::new())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Geocoder returning a fixed list and recording every query.
    struct FixedGeocoder {
        results: Vec<GeocodeResult>,
        fail: bool,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl FixedGeocoder {
        fn returning(results: Vec<GeocodeResult>) -> Self {
            Self {
                results,
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                results: Vec::new(),
                fail: true,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Geocoder for Arc<FixedGeocoder> {
        async fn geocode(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<GeocodeResult>, GeocodeError> {
            self.calls.lock().unwrap().push((query.to_string(), limit));
            if self.fail {
                return Err(GeocodeError::Api {
                    status: 503,
                    message: "down".into(),
                });
            }
            Ok(self.results.clone())
        }
    }

    fn suggestions(n: usize) -> Vec<GeocodeResult> {
        (0..n)
            .map(|i| GeocodeResult::new(format!("Place {i}"), "13.0", "80.0"))
            .collect()
    }

    #[test]
    fn classify_short_queries() {
        assert_eq!(classify_query("", 3), QueryKind::TooShort);
        assert_eq!(classify_query("ab", 3), QueryKind::TooShort);
        assert_eq!(classify_query("  ab  ", 3), QueryKind::TooShort);
        assert_eq!(classify_query("abc", 3), QueryKind::Text);
    }

    #[test]
    fn classify_coordinates() {
        let kind = classify_query("13.05, 80.27", 3);
        let expected = Location::new(13.05, 80.27).unwrap();
        assert_eq!(kind, QueryKind::Coordinates(expected));

        // Out-of-range pairs are searched as text
        assert_eq!(classify_query("95.0, 80.27", 3), QueryKind::Text);
    }

    #[tokio::test]
    async fn geocoder_works_as_a_trait_object() {
        let geocoder: Box<dyn Geocoder> =
            Box::new(Arc::new(FixedGeocoder::returning(suggestions(3))));

        let results = geocoder.geocode("Chennai", 2).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].display_name, "Place 0");
    }

    #[tokio::test]
    async fn coordinates_skip_geocoder() {
        let geocoder = Arc::new(FixedGeocoder::returning(suggestions(3)));
        let search = GeocodeSearch::new(Arc::clone(&geocoder));

        let outcome = search.search("13.0827, 80.2707").await;

        assert!(matches!(outcome, SearchOutcome::Coordinates(_)));
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_query_is_skipped() {
        let geocoder = Arc::new(FixedGeocoder::returning(suggestions(3)));
        let search = GeocodeSearch::new(Arc::clone(&geocoder));

        assert_eq!(search.search("ch").await, SearchOutcome::Skipped);
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn text_query_uses_limit_and_keeps_order() {
        let geocoder = Arc::new(FixedGeocoder::returning(suggestions(8)));
        let search = GeocodeSearch::new(Arc::clone(&geocoder));

        let SearchOutcome::Suggestions(results) = search.search(" Chennai ").await else {
            panic!("expected suggestions");
        };

        assert_eq!(results.len(), DEFAULT_RESULT_LIMIT);
        assert_eq!(results[0].display_name, "Place 0");
        assert_eq!(results[4].display_name, "Place 4");
        assert_eq!(
            *geocoder.calls.lock().unwrap(),
            vec![("Chennai".to_string(), DEFAULT_RESULT_LIMIT)]
        );
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_empty() {
        let geocoder = Arc::new(FixedGeocoder::failing());
        let search = GeocodeSearch::new(Arc::clone(&geocoder));

        assert_eq!(
            search.search("Chennai").await,
            SearchOutcome::Suggestions(Vec::new())
        );
    }
}
