//! Nearest-neighbor matching of aggregate demand to catalog entries
//!
//! A small flat k-nearest-neighbor index over the catalog. Features are
//! compared on raw numeric scale with no weighting or normalization, so a
//! large price feature can dominate the distance. Neighbor order is
//! deterministic given catalog order: equal distances rank the
//! earlier-inserted entry first.

use crate::catalog::{CatalogEntry, InstanceCatalog};
use crate::models::FeatureVector;
use thiserror::Error;

/// Neighbors consulted per query unless configured otherwise
pub const DEFAULT_NEIGHBORS: usize = 3;

/// Match model configuration
#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    /// Neighbors consulted per query; degrades to the catalog size
    pub neighbors: usize,
    /// Include price as a third feature dimension
    pub include_price: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            include_price: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("cannot fit a match model against an empty catalog")]
    EmptyCatalog,
    #[error("predict called before fit")]
    NotFitted,
    #[error("query has {actual} features, model was fit with {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("query vector contains a non-finite feature")]
    NonFiniteQuery,
}

#[derive(Debug, Clone)]
struct Index {
    points: Vec<Vec<f64>>,
    labels: Vec<String>,
    dimension: usize,
}

/// k-nearest-neighbor classifier over catalog feature vectors
#[derive(Debug, Clone)]
pub struct KnnMatcher {
    config: MatcherConfig,
    index: Option<Index>,
}

impl KnnMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            index: None,
        }
    }

    /// Build the index from all catalog entries. Catalog order is preserved
    /// and is what equal-distance ties resolve against.
    pub fn fit(&mut self, catalog: &InstanceCatalog) -> Result<(), MatchError> {
        if catalog.is_empty() {
            return Err(MatchError::EmptyCatalog);
        }
        let dimension = if self.config.include_price { 3 } else { 2 };
        let points = catalog.entries().iter().map(|e| self.features(e)).collect();
        let labels = catalog
            .entries()
            .iter()
            .map(|e| e.instance_type.clone())
            .collect();
        self.index = Some(Index {
            points,
            labels,
            dimension,
        });
        Ok(())
    }

    /// Fit-time dimensionality, if fitted
    pub fn dimension(&self) -> Option<usize> {
        self.index.as_ref().map(|index| index.dimension)
    }

    /// Majority-vote label among the k nearest catalog points
    pub fn predict(&self, query: &FeatureVector) -> Result<String, MatchError> {
        let index = self.index.as_ref().ok_or(MatchError::NotFitted)?;
        if query.len() != index.dimension {
            return Err(MatchError::DimensionMismatch {
                expected: index.dimension,
                actual: query.len(),
            });
        }
        if !query.is_finite() {
            return Err(MatchError::NonFiniteQuery);
        }

        // Squared distance ranks identically to Euclidean
        let mut ranked: Vec<(f64, usize)> = index
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| (squared_distance(query.values(), point), i))
            .collect();
        ranked.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let k = self.config.neighbors.clamp(1, ranked.len());
        let mut votes: Vec<(&str, usize)> = Vec::new();
        for &(_, i) in &ranked[..k] {
            let label = index.labels[i].as_str();
            match votes.iter_mut().find(|(seen, _)| *seen == label) {
                Some((_, count)) => *count += 1,
                None => votes.push((label, 1)),
            }
        }

        // Votes are in rank order; on equal counts the label whose best
        // neighbor ranks first wins.
        let mut winner = votes[0];
        for &(label, count) in &votes[1..] {
            if count > winner.1 {
                winner = (label, count);
            }
        }
        Ok(winner.0.to_string())
    }

    fn features(&self, entry: &CatalogEntry) -> Vec<f64> {
        if self.config.include_price {
            vec![entry.vcpu, entry.memory_gib, entry.price]
        } else {
            vec![entry.vcpu, entry.memory_gib]
        }
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
