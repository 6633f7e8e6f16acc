//! Address search against a geocoding provider.
//!
//! Free text typed into a location field is either a coordinate pair,
//! which resolves locally, or an address, which is looked up with a
//! Nominatim-compatible `/search` endpoint. Provider failures never reach
//! the user: they degrade to an empty suggestion list.

mod cache;
mod client;
mod error;
mod search;
mod types;

pub use cache::{CachedGeocoder, GeocodeCacheConfig};
pub use client::{GeocoderConfig, NominatimClient};
pub use error::GeocodeError;
pub use search::{
    DEFAULT_MIN_QUERY_CHARS, DEFAULT_RESULT_LIMIT, GeocodeSearch, Geocoder, QueryKind,
    SearchOutcome, classify_query,
};
pub use types::GeocodeResult;
