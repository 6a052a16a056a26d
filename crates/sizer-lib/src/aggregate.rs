//! Aggregation of container resource declarations into cluster totals

use crate::models::{AggregationDiagnostics, PodResources, ResourceTotals};
use crate::quantity::{self, QuantityOutcome, ResourceKind};
use tracing::warn;

/// Fold every container's declared quantities into one set of totals.
///
/// Each of the four (request/limit x cpu/memory) fields contributes its
/// converted value, or zero when absent or unusable. A field that fails to
/// parse is skipped for that one accumulator only; the walk over the
/// remaining containers continues. Sums are commutative, so totals do not
/// depend on pod order.
pub fn aggregate(pods: &[PodResources]) -> (ResourceTotals, AggregationDiagnostics) {
    let mut totals = ResourceTotals::default();
    let mut diagnostics = AggregationDiagnostics::default();

    for pod in pods {
        for container in &pod.containers {
            apply(
                &mut totals.cpu_requests,
                container.cpu_request.as_deref(),
                ResourceKind::Cpu,
                "cpu_request",
                pod,
                &container.name,
                &mut diagnostics,
            );
            apply(
                &mut totals.memory_requests,
                container.memory_request.as_deref(),
                ResourceKind::Memory,
                "memory_request",
                pod,
                &container.name,
                &mut diagnostics,
            );
            apply(
                &mut totals.cpu_limits,
                container.cpu_limit.as_deref(),
                ResourceKind::Cpu,
                "cpu_limit",
                pod,
                &container.name,
                &mut diagnostics,
            );
            apply(
                &mut totals.memory_limits,
                container.memory_limit.as_deref(),
                ResourceKind::Memory,
                "memory_limit",
                pod,
                &container.name,
                &mut diagnostics,
            );
        }
    }

    (totals, diagnostics)
}

fn apply(
    slot: &mut f64,
    raw: Option<&str>,
    kind: ResourceKind,
    field: &'static str,
    pod: &PodResources,
    container: &str,
    diagnostics: &mut AggregationDiagnostics,
) {
    match quantity::evaluate(raw, kind) {
        QuantityOutcome::Value(value) => *slot += value,
        QuantityOutcome::Absent => diagnostics.fields_absent += 1,
        QuantityOutcome::ParseFailure => {
            diagnostics.parse_failures += 1;
            warn!(
                namespace = %pod.namespace,
                pod = %pod.name,
                container = %container,
                field,
                value = ?raw,
                "quantity did not parse, contributing zero"
            );
        }
        QuantityOutcome::UnrecognizedUnit => {
            diagnostics.unrecognized_units += 1;
            warn!(
                namespace = %pod.namespace,
                pod = %pod.name,
                container = %container,
                field,
                value = ?raw,
                "unrecognized unit suffix, contributing zero"
            );
        }
    }
}
