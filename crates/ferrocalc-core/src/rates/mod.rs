//! Currency rates: provider contract and the TTL cache in front of it.

pub mod cache;
pub mod provider;

pub use cache::{normalize, CacheMode, RateCacheConfig, RateCacheManager, RateError, RateLookup};
pub use provider::{ProviderError, ProviderErrorKind, RateProvider, StaticRateProvider};
