pub mod adapter;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod images;
pub mod imdb;
pub mod limiter;
pub mod provider;
pub mod resolve;
pub mod tmdb;
pub mod types;

pub use adapter::ProviderAdapter;
pub use cache::{CacheKey, CacheStats, CachedValue, Operation, ResolutionCache};
pub use client::{DefaultResolver, connect};
pub use config::{Config, ConfigSource, ConfigSources, Limits, config_path, config_sources};
pub use error::{ConfigError, ProviderError};
pub use imdb::ImdbClient;
pub use limiter::{RateLimiter, RatePermit};
pub use provider::{MetadataProvider, ProviderKind};
pub use resolve::{IdentityResolver, ResolveMethod, Resolved, ResolverServices};
pub use tmdb::TmdbClient;
