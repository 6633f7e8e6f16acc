//! Client configuration.
//!
//! Every setting has a default; `from_env` overrides them from environment
//! variables so the binary can be pointed at another backend or geocoder
//! without flags.

use std::time::Duration;

use crate::geocode::{
    DEFAULT_MIN_QUERY_CHARS, DEFAULT_RESULT_LIMIT, GeocodeCacheConfig, GeocodeSearch, Geocoder,
    GeocoderConfig,
};
use crate::planning::EcoApiConfig;
use crate::resolver::ResolverConfig;

/// Base URL of the eco-planning backend.
pub const ECO_API_URL: &str = "ECO_API_URL";
/// Planning request timeout in seconds.
pub const ECO_PLAN_TIMEOUT_SECS: &str = "ECO_PLAN_TIMEOUT_SECS";
/// Base URL of a Nominatim-compatible geocoder.
pub const GEOCODER_URL: &str = "GEOCODER_URL";
/// User agent sent to the geocoder.
pub const GEOCODER_USER_AGENT: &str = "GEOCODER_USER_AGENT";
/// Typing pause before a search, in milliseconds.
pub const ECO_DEBOUNCE_MS: &str = "ECO_DEBOUNCE_MS";

/// Errors reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Everything the client needs to talk to its two services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub eco_api: EcoApiConfig,
    pub geocoder: GeocoderConfig,
    pub geocode_cache: GeocodeCacheConfig,
    pub resolver: ResolverConfig,
    /// Maximum number of suggestions per query.
    pub result_limit: usize,
    /// Queries shorter than this (trimmed) are not searched.
    pub min_query_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            eco_api: EcoApiConfig::default(),
            geocoder: GeocoderConfig::default(),
            geocode_cache: GeocodeCacheConfig::default(),
            resolver: ResolverConfig::default(),
            result_limit: DEFAULT_RESULT_LIMIT,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ECO_API_URL) {
            config.eco_api = config.eco_api.with_base_url(url);
        }
        if let Some(value) = get(ECO_PLAN_TIMEOUT_SECS) {
            let secs = parse_positive(ECO_PLAN_TIMEOUT_SECS, &value)?;
            config.eco_api = config.eco_api.with_timeout(secs);
        }
        if let Some(url) = get(GEOCODER_URL) {
            config.geocoder = config.geocoder.with_base_url(url);
        }
        if let Some(agent) = get(GEOCODER_USER_AGENT) {
            config.geocoder = config.geocoder.with_user_agent(agent);
        }
        if let Some(value) = get(ECO_DEBOUNCE_MS) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ECO_DEBOUNCE_MS,
                    value: value.clone(),
                })?;
            config.resolver = config
                .resolver
                .with_debounce(Duration::from_millis(millis));
        }

        Ok(config)
    }

    /// Set the backend URL.
    pub fn with_eco_api_url(mut self, url: impl Into<String>) -> Self {
        self.eco_api = self.eco_api.with_base_url(url);
        self
    }

    /// Set the geocoder URL.
    pub fn with_geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.geocoder = self.geocoder.with_base_url(url);
        self
    }

    /// Set the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.resolver = self.resolver.with_debounce(debounce);
        self
    }

    /// Wrap a geocoder with this config's search settings.
    pub fn geocode_search<G: Geocoder>(&self, geocoder: G) -> GeocodeSearch<G> {
        GeocodeSearch::new(geocoder)
            .with_limit(self.result_limit)
            .with_min_query_chars(self.min_query_chars)
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}
