//! End-to-end recommendation orchestration

use crate::aggregate::aggregate;
use crate::matcher::{KnnMatcher, MatchError};
use crate::models::{AggregationDiagnostics, FeatureVector, PodResources, Recommendation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Label returned when the model cannot produce one for otherwise valid
/// input, so the totals are never discarded
pub const UNKNOWN_INSTANCE_TYPE: &str = "unknown";

/// Request-fatal orchestration failure
///
/// Only contract violations end up here: an unfitted model, a mismatched
/// query dimensionality, or an unusable catalog. These are never recovered
/// into a best-effort guess.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("match model rejected the query")]
    Match(#[from] MatchError),
}

/// One full recommendation with its aggregation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendation: Recommendation,
    /// Prediction for the limit-based demand vector, reported alongside
    /// the designated request-based label
    pub limit_instance_type: String,
    pub diagnostics: AggregationDiagnostics,
}

/// Orchestrates aggregation, feature construction, and matching
///
/// Holds the fitted matcher for the process lifetime; each call owns its
/// totals, so concurrent requests share nothing mutable.
pub struct RecommendationService {
    matcher: KnnMatcher,
}

impl RecommendationService {
    /// The matcher should already be fitted; an unfitted one surfaces as an
    /// explicit error on the first request.
    pub fn new(matcher: KnnMatcher) -> Self {
        Self { matcher }
    }

    /// Aggregate the cluster's declared resources and match them against
    /// the catalog. All four totals are always returned; quantity fields
    /// that failed to parse contributed zero and are counted in the
    /// diagnostics rather than failing the request.
    pub fn recommend(
        &self,
        pods: &[PodResources],
    ) -> Result<RecommendationResult, RecommendError> {
        let (totals, diagnostics) = aggregate(pods);
        if diagnostics.has_failures() {
            warn!(
                parse_failures = diagnostics.parse_failures,
                unrecognized_units = diagnostics.unrecognized_units,
                "some quantities contributed zero, totals are understated"
            );
        }

        let requested = self.vector(totals.cpu_requests, totals.memory_requests);
        let limits = self.vector(totals.cpu_limits, totals.memory_limits);

        let predicted_instance_type = self.label(&requested)?;
        let limit_instance_type = self.label(&limits)?;
        debug!(
            predicted = %predicted_instance_type,
            limit_based = %limit_instance_type,
            "matched aggregate demand"
        );

        let recommendation = Recommendation {
            predicted_instance_type,
            total_cpu_requests: totals.cpu_requests,
            total_memory_requests: totals.memory_requests,
            total_cpu_limits: totals.cpu_limits,
            total_memory_limits: totals.memory_limits,
            generated_at: chrono::Utc::now().timestamp(),
        };

        Ok(RecommendationResult {
            recommendation,
            limit_instance_type,
            diagnostics,
        })
    }

    /// Build a query of the model's fit-time dimensionality; the price
    /// position is zeroed since demand carries no price.
    fn vector(&self, cpu: f64, memory: f64) -> FeatureVector {
        match self.matcher.dimension() {
            Some(3) => FeatureVector::cpu_memory_price(cpu, memory, 0.0),
            _ => FeatureVector::cpu_memory(cpu, memory),
        }
    }

    /// Query the matcher, converting a refused-but-valid query into the
    /// explicit unknown label
    fn label(&self, query: &FeatureVector) -> Result<String, MatchError> {
        match self.matcher.predict(query) {
            Ok(label) => Ok(label),
            Err(MatchError::NonFiniteQuery) => {
                warn!("aggregate totals are not finite, returning the unknown instance type");
                Ok(UNKNOWN_INSTANCE_TYPE.to_string())
            }
            Err(err) => Err(err),
        }
    }
}
