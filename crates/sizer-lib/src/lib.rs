//! Core library for cluster instance sizing
//!
//! This crate provides the pure-computation core:
//! - Resource quantity parsing and unit conversion
//! - Aggregation of pod resource requests and limits
//! - The instance-type catalog built from static pricing snapshots
//! - Nearest-neighbor matching of aggregate demand to catalog entries
//!
//! No network or file I/O happens here. The server binary owns catalog
//! files and cluster access and hands this crate already-fetched data.

pub mod aggregate;
pub mod catalog;
pub mod matcher;
pub mod models;
pub mod quantity;
pub mod recommend;

pub use aggregate::aggregate;
pub use catalog::{CatalogEntry, CatalogError, InstanceCatalog};
pub use matcher::{KnnMatcher, MatchError, MatcherConfig, DEFAULT_NEIGHBORS};
pub use models::*;
pub use recommend::{
    RecommendError, RecommendationResult, RecommendationService, UNKNOWN_INSTANCE_TYPE,
};
