//! Instance-type catalog built from static pricing snapshots
//!
//! Rows arrive in one of two source shapes: CSV tables with either the
//! `vendor,instance_type,vcpu,memory_gib,cost_in_dollars` or the
//! `InstanceType,CPU,Memory,Cost` header, and JSON arrays of
//! `{InstanceType, CPU, Memory, Cost}` records. Rows missing a required
//! field or carrying unusable values are excluded and counted, never
//! silently dropped. The loaders take readers and slices; opening files is
//! the caller's job.

use crate::quantity::leading_number;
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;
use tracing::{info, warn};

/// One priced instance type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub instance_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub vcpu: f64,
    pub memory_gib: f64,
    pub price: f64,
}

/// Stream-level loader failure. Row-level problems exclude the row instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog rows")]
    Csv(#[from] csv::Error),
    #[error("failed to read catalog records")]
    Json(#[from] serde_json::Error),
}

/// Immutable, ordered catalog of priced instance types
///
/// Entries keep first-seen order; duplicate instance types are tolerated.
/// Built once at startup and shared read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct InstanceCatalog {
    entries: Vec<CatalogEntry>,
    excluded_rows: usize,
}

impl InstanceCatalog {
    /// Build a catalog from already-validated entries, order preserved
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            excluded_rows: 0,
        }
    }

    /// Load a CSV table. Unreadable or invalid rows are excluded and
    /// counted; only a stream-level I/O failure aborts the load.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        let mut excluded = 0usize;
        for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let entry = match row {
                Ok(row) => row.into_entry(),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    warn!(row = index + 1, error = %err, "catalog row unreadable");
                    None
                }
            };
            match entry {
                Some(entry) => entries.push(entry),
                None => {
                    excluded += 1;
                    warn!(row = index + 1, "catalog row excluded");
                }
            }
        }

        info!(
            loaded = entries.len(),
            excluded, "instance catalog loaded from CSV"
        );
        Ok(Self {
            entries,
            excluded_rows: excluded,
        })
    }

    /// Load a JSON array of instance records
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let records: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;

        let mut entries = Vec::new();
        let mut excluded = 0usize;
        for (index, record) in records.iter().enumerate() {
            match json_entry(record) {
                Some(entry) => entries.push(entry),
                None => {
                    excluded += 1;
                    warn!(record = index, "catalog record excluded");
                }
            }
        }

        info!(
            loaded = entries.len(),
            excluded, "instance catalog loaded from JSON"
        );
        Ok(Self {
            entries,
            excluded_rows: excluded,
        })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many source rows were excluded during the load
    pub fn excluded_rows(&self) -> usize {
        self.excluded_rows
    }
}

/// Raw row in either tabular header shape
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "InstanceType", alias = "instanceType")]
    instance_type: Option<String>,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(alias = "CPU", alias = "vCPU")]
    vcpu: Option<String>,
    #[serde(alias = "Memory", alias = "memory_gib")]
    memory: Option<String>,
    #[serde(alias = "Cost", alias = "cost_in_dollars", alias = "Price")]
    price: Option<String>,
}

impl CsvRow {
    fn into_entry(self) -> Option<CatalogEntry> {
        let instance_type = self.instance_type.filter(|s| !s.is_empty())?;
        let vcpu = self.vcpu.as_deref().and_then(strict_number)?;
        // Memory is sometimes free text with an embedded unit ("8 GiB")
        let memory_gib = self.memory.as_deref().and_then(leading_number)?;
        let price = self.price.as_deref().and_then(strict_number)?;
        validate(instance_type, self.vendor, vcpu, memory_gib, price)
    }
}

fn json_entry(record: &serde_json::Value) -> Option<CatalogEntry> {
    let instance_type = record
        .get("InstanceType")?
        .as_str()
        .filter(|s| !s.is_empty())?
        .to_string();
    let vcpu = numeric_field(record.get("CPU")?)?;
    let memory_gib = numeric_field(record.get("Memory")?)?;
    let price = numeric_field(record.get("Cost")?)?;
    validate(instance_type, None, vcpu, memory_gib, price)
}

fn validate(
    instance_type: String,
    vendor: Option<String>,
    vcpu: f64,
    memory_gib: f64,
    price: f64,
) -> Option<CatalogEntry> {
    if !vcpu.is_finite() || vcpu <= 0.0 {
        return None;
    }
    if !memory_gib.is_finite() || memory_gib < 0.0 {
        return None;
    }
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    Some(CatalogEntry {
        instance_type,
        vendor: vendor.filter(|v| !v.is_empty()),
        vcpu,
        memory_gib,
        price,
    })
}

fn strict_number(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Numbers may arrive as JSON numbers or as free text with a unit suffix
fn numeric_field(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => leading_number(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_with_snapshot_header() {
        let data = "\
vendor,instance_type,vcpu,memory_gib,cost_in_dollars
aws,t3.medium,2,4,0.0416
aws,m5.2xlarge,8,32,0.384
";
        let catalog = InstanceCatalog::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.excluded_rows(), 0);
        let entry = &catalog.entries()[0];
        assert_eq!(entry.instance_type, "t3.medium");
        assert_eq!(entry.vendor.as_deref(), Some("aws"));
        assert_eq!(entry.vcpu, 2.0);
        assert_eq!(entry.memory_gib, 4.0);
        assert_eq!(entry.price, 0.0416);
    }

    #[test]
    fn test_csv_with_fetcher_header() {
        let data = "\
InstanceType,CPU,Memory,Cost
c5.large,2,4,0.085
r5.xlarge,4,32,0.252
";
        let catalog = InstanceCatalog::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[1].instance_type, "r5.xlarge");
        assert!(catalog.entries()[1].vendor.is_none());
    }

    #[test]
    fn test_free_text_memory_reduced_to_leading_number() {
        let data = "\
InstanceType,CPU,Memory,Cost
m5.large,2,8 GiB,0.096
";
        let catalog = InstanceCatalog::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(catalog.entries()[0].memory_gib, 8.0);
    }

    #[test]
    fn test_invalid_rows_are_excluded_and_counted() {
        let data = "\
InstanceType,CPU,Memory,Cost
good.large,2,4,0.1
,2,4,0.1
no-price.large,2,4,
bad-price.large,2,4,N/A
bad-memory.large,2,lots,0.1
zero-cpu.large,0,4,0.1
";
        let catalog = InstanceCatalog::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].instance_type, "good.large");
        assert_eq!(catalog.excluded_rows(), 5);
    }

    #[test]
    fn test_duplicate_instance_types_keep_first_seen_order() {
        let data = "\
InstanceType,CPU,Memory,Cost
dup.large,2,4,0.1
other.large,4,8,0.2
dup.large,2,4,0.3
";
        let catalog = InstanceCatalog::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 3);
        let names: Vec<&str> = catalog
            .entries()
            .iter()
            .map(|e| e.instance_type.as_str())
            .collect();
        assert_eq!(names, vec!["dup.large", "other.large", "dup.large"]);
    }

    #[test]
    fn test_header_only_csv_is_empty_not_an_error() {
        let data = "InstanceType,CPU,Memory,Cost\n";
        let catalog = InstanceCatalog::from_csv_reader(data.as_bytes()).unwrap();

        assert!(catalog.is_empty());
        assert_eq!(catalog.excluded_rows(), 0);
    }

    #[test]
    fn test_json_records() {
        let data = br#"[
            {"InstanceType": "D2s_v3", "CPU": 2, "Memory": 8, "Cost": 0.096},
            {"InstanceType": "E4s_v3", "CPU": 4, "Memory": "32 GiB", "Cost": 0.252},
            {"InstanceType": "bad", "CPU": 2, "Memory": 8},
            {"CPU": 2, "Memory": 8, "Cost": 0.1}
        ]"#;
        let catalog = InstanceCatalog::from_json_slice(data).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.excluded_rows(), 2);
        assert_eq!(catalog.entries()[1].memory_gib, 32.0);
    }

    #[test]
    fn test_json_stream_error_is_fatal() {
        let result = InstanceCatalog::from_json_slice(b"not json");
        assert!(matches!(result, Err(CatalogError::Json(_))));
    }
}
