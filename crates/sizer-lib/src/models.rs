//! Core data models for the instance sizer

use serde::{Deserialize, Serialize};

/// Resource declarations of a single container
///
/// The set of recognized resource kinds is closed (cpu, memory), so the
/// four quantities are named optional fields rather than an open map.
/// Values are the raw quantity strings exactly as declared in the pod spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerResources {
    pub name: String,
    pub cpu_request: Option<String>,
    pub memory_request: Option<String>,
    pub cpu_limit: Option<String>,
    pub memory_limit: Option<String>,
}

/// Resource declarations of a single pod
///
/// Name and namespace are carried for diagnostics context only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodResources {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerResources>,
}

/// Aggregate resource demand of a cluster, in canonical base units
/// (CPU in cores, memory in GiB)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub cpu_requests: f64,
    pub memory_requests: f64,
    pub cpu_limits: f64,
    pub memory_limits: f64,
}

/// Counters for the three ways a quantity field can contribute zero
///
/// `fields_absent` is expected and silent; the other two are recorded so
/// understated totals stay observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationDiagnostics {
    pub fields_absent: u64,
    pub parse_failures: u64,
    pub unrecognized_units: u64,
}

impl AggregationDiagnostics {
    /// True when some field contributed zero for a reason other than absence
    pub fn has_failures(&self) -> bool {
        self.parse_failures > 0 || self.unrecognized_units > 0
    }
}

/// Ordered feature vector queried against the match model
///
/// Dimensionality must match between fit and predict; the matcher rejects
/// mismatches instead of reshaping.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn cpu_memory(vcpu: f64, memory_gib: f64) -> Self {
        Self(vec![vcpu, memory_gib])
    }

    pub fn cpu_memory_price(vcpu: f64, memory_gib: f64, price: f64) -> Self {
        Self(vec![vcpu, memory_gib, price])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Recommendation produced for one request; never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub predicted_instance_type: String,
    pub total_cpu_requests: f64,
    pub total_memory_requests: f64,
    pub total_cpu_limits: f64,
    pub total_memory_limits: f64,
    pub generated_at: i64,
}
