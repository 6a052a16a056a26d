//! Prometheus metrics for the sizer service
//!
//! The parse-failure and unrecognized-unit counters are deliberately
//! separate: both understate the totals, but for different reasons, and
//! the distinction must survive into monitoring.

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use sizer_lib::AggregationDiagnostics;
use std::sync::OnceLock;
use std::time::Duration;

/// Histogram buckets for request latency (seconds); the cluster listing
/// dominates, so buckets skew high
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SizerMetricsInner> = OnceLock::new();

struct SizerMetricsInner {
    recommendation_latency_seconds: Histogram,
    recommendations_total: IntCounter,
    quantity_parse_failures_total: IntCounter,
    unrecognized_units_total: IntCounter,
    catalog_entries: IntGauge,
    catalog_rows_excluded: IntGauge,
    pods_listed: IntGauge,
}

impl SizerMetricsInner {
    fn new() -> Self {
        Self {
            recommendation_latency_seconds: register_histogram!(
                "sizer_recommendation_latency_seconds",
                "Time spent producing one recommendation, cluster listing included",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register recommendation_latency_seconds"),

            recommendations_total: register_int_counter!(
                "sizer_recommendations_total",
                "Total recommendations served"
            )
            .expect("Failed to register recommendations_total"),

            quantity_parse_failures_total: register_int_counter!(
                "sizer_quantity_parse_failures_total",
                "Quantity fields that failed to parse and contributed zero"
            )
            .expect("Failed to register quantity_parse_failures_total"),

            unrecognized_units_total: register_int_counter!(
                "sizer_unrecognized_units_total",
                "Quantity fields with an unrecognized unit suffix that contributed zero"
            )
            .expect("Failed to register unrecognized_units_total"),

            catalog_entries: register_int_gauge!(
                "sizer_catalog_entries",
                "Valid instance rows loaded into the catalog"
            )
            .expect("Failed to register catalog_entries"),

            catalog_rows_excluded: register_int_gauge!(
                "sizer_catalog_rows_excluded",
                "Source rows excluded during catalog load"
            )
            .expect("Failed to register catalog_rows_excluded"),

            pods_listed: register_int_gauge!(
                "sizer_pods_listed",
                "Pods returned by the most recent cluster listing"
            )
            .expect("Failed to register pods_listed"),
        }
    }
}

/// Cloneable handle over the process-wide metrics
#[derive(Clone)]
pub struct SizerMetrics;

impl SizerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SizerMetricsInner::new);
        Self
    }

    fn inner(&self) -> &'static SizerMetricsInner {
        GLOBAL_METRICS.get_or_init(SizerMetricsInner::new)
    }

    pub fn set_catalog_stats(&self, entries: usize, excluded: usize) {
        self.inner().catalog_entries.set(entries as i64);
        self.inner().catalog_rows_excluded.set(excluded as i64);
    }

    pub fn observe_pods(&self, count: usize) {
        self.inner().pods_listed.set(count as i64);
    }

    pub fn observe_recommendation(
        &self,
        elapsed: Duration,
        diagnostics: &AggregationDiagnostics,
    ) {
        let inner = self.inner();
        inner
            .recommendation_latency_seconds
            .observe(elapsed.as_secs_f64());
        inner.recommendations_total.inc();
        inner
            .quantity_parse_failures_total
            .inc_by(diagnostics.parse_failures);
        inner
            .unrecognized_units_total
            .inc_by(diagnostics.unrecognized_units);
    }
}

impl Default for SizerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
