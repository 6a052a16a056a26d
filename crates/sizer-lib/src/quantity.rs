//! Resource quantity parsing and unit conversion
//!
//! Kubernetes-style quantity strings have the form `<number><unit?>`. The
//! parser splits the two and is unit-agnostic; the caller picks a
//! conversion table via [`ResourceKind`], which fixes the base unit: cores
//! for CPU, GiB for memory. GiB is the canonical memory base because the
//! catalog declares instance memory in GiB, so demand and catalog rows
//! share one feature scale.

use thiserror::Error;

/// Recognized unit suffixes. Anything else is an unrecognized unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    Nano,
    Milli,
    Kibi,
    Mebi,
    Gibi,
    Tebi,
    Pebi,
}

/// Which conversion table applies to a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cpu,
    Memory,
}

impl Unit {
    fn from_suffix(suffix: &str) -> Option<Unit> {
        match suffix {
            "" => Some(Unit::None),
            "n" => Some(Unit::Nano),
            "m" => Some(Unit::Milli),
            "Ki" => Some(Unit::Kibi),
            "Mi" => Some(Unit::Mebi),
            "Gi" => Some(Unit::Gibi),
            "Ti" => Some(Unit::Tebi),
            "Pi" => Some(Unit::Pebi),
            _ => None,
        }
    }

    /// Scale factor from this unit to the canonical base of `kind`
    pub fn factor(self, kind: ResourceKind) -> f64 {
        match kind {
            // Base unit: one core
            ResourceKind::Cpu => match self {
                Unit::None => 1.0,
                Unit::Nano => 1e-9,
                Unit::Milli => 1e-3,
                Unit::Kibi => (1u64 << 10) as f64,
                Unit::Mebi => (1u64 << 20) as f64,
                Unit::Gibi => (1u64 << 30) as f64,
                Unit::Tebi => (1u64 << 40) as f64,
                Unit::Pebi => (1u64 << 50) as f64,
            },
            // Base unit: one GiB
            ResourceKind::Memory => match self {
                Unit::None => 1.0,
                Unit::Nano => 1e-9,
                Unit::Milli => 1e-3,
                Unit::Kibi => 1.0 / (1u64 << 20) as f64,
                Unit::Mebi => 1.0 / (1u64 << 10) as f64,
                Unit::Gibi => 1.0,
                Unit::Tebi => (1u64 << 10) as f64,
                Unit::Pebi => (1u64 << 20) as f64,
            },
        }
    }
}

/// Failure to interpret a quantity string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Empty input, a suffix with no digits, or an unparseable number
    #[error("malformed quantity {0:?}")]
    Malformed(String),
    /// A suffix outside the recognized set
    #[error("unrecognized unit suffix {0:?}")]
    UnrecognizedUnit(String),
}

/// A parsed quantity before unit conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedQuantity {
    pub value: f64,
    pub unit: Unit,
}

impl ParsedQuantity {
    /// Convert to the canonical base unit of `kind`
    pub fn to_base(self, kind: ResourceKind) -> f64 {
        self.value * self.unit.factor(kind)
    }
}

/// Split a quantity string into a leading decimal number and a trailing
/// alphabetic unit suffix.
///
/// Negative magnitudes are accepted here; rejecting them is the
/// aggregator's contract.
pub fn parse(input: &str) -> Result<ParsedQuantity, QuantityError> {
    let s = input.trim();
    let split = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| QuantityError::Malformed(input.to_string()))?;
    let unit = Unit::from_suffix(suffix)
        .ok_or_else(|| QuantityError::UnrecognizedUnit(suffix.to_string()))?;

    Ok(ParsedQuantity { value, unit })
}

/// Observable outcome of evaluating one optional quantity field
///
/// "Field absent" and "present but unusable" both contribute zero to the
/// totals, but for different reasons; keeping the causes apart is what
/// makes understated totals diagnosable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuantityOutcome {
    Absent,
    Value(f64),
    ParseFailure,
    UnrecognizedUnit,
}

/// Evaluate an optional quantity field against the conversion table of
/// `kind`. Negative magnitudes are rejected: totals are non-negative
/// accumulators.
pub fn evaluate(field: Option<&str>, kind: ResourceKind) -> QuantityOutcome {
    let Some(raw) = field else {
        return QuantityOutcome::Absent;
    };
    match parse(raw) {
        Ok(q) if q.value < 0.0 => QuantityOutcome::ParseFailure,
        Ok(q) => QuantityOutcome::Value(q.to_base(kind)),
        Err(QuantityError::Malformed(_)) => QuantityOutcome::ParseFailure,
        Err(QuantityError::UnrecognizedUnit(_)) => QuantityOutcome::UnrecognizedUnit,
    }
}

/// Extract the leading decimal number from free text such as `"8 GiB"`
pub fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim();
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_magnitude_and_unit() {
        let q = parse("500m").unwrap();
        assert_eq!(q.value, 500.0);
        assert_eq!(q.unit, Unit::Milli);
        assert_eq!(q.to_base(ResourceKind::Cpu), 0.5);
    }

    #[test]
    fn test_parse_memory_quantities() {
        assert_eq!(parse("2Gi").unwrap().to_base(ResourceKind::Memory), 2.0);
        assert_eq!(parse("512Mi").unwrap().to_base(ResourceKind::Memory), 0.5);
        assert_eq!(parse("1Ti").unwrap().to_base(ResourceKind::Memory), 1024.0);
        let one_ki = parse("1Ki").unwrap().to_base(ResourceKind::Memory);
        assert!((one_ki - 1.0 / (1024.0 * 1024.0)).abs() < 1e-12);
    }

    #[test]
    fn test_parse_cpu_quantities() {
        assert_eq!(parse("4").unwrap().to_base(ResourceKind::Cpu), 4.0);
        assert_eq!(parse("250m").unwrap().to_base(ResourceKind::Cpu), 0.25);
        let nano = parse("1500000000n").unwrap().to_base(ResourceKind::Cpu);
        assert!((nano - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_fractional_magnitude() {
        let q = parse("1.5Gi").unwrap();
        assert_eq!(q.value, 1.5);
        assert_eq!(q.unit, Unit::Gibi);
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        assert_eq!(parse(" 100m ").unwrap().value, 100.0);
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(parse(""), Err(QuantityError::Malformed("".to_string())));
        assert_eq!(parse("Gi"), Err(QuantityError::Malformed("Gi".to_string())));
        assert_eq!(parse("abc"), Err(QuantityError::Malformed("abc".to_string())));
    }

    #[test]
    fn test_unrecognized_unit_is_distinct_from_malformed() {
        assert_eq!(
            parse("5Xi"),
            Err(QuantityError::UnrecognizedUnit("Xi".to_string()))
        );
        // Lowercase binary suffixes are not in the recognized set
        assert_eq!(
            parse("5mi"),
            Err(QuantityError::UnrecognizedUnit("mi".to_string()))
        );
    }

    #[test]
    fn test_parser_accepts_negative_magnitudes() {
        assert_eq!(parse("-2").unwrap().value, -2.0);
        assert_eq!(parse("-500m").unwrap().value, -500.0);
    }

    #[test]
    fn test_round_trip_through_base_units() {
        let cases = [
            ("750n", Unit::Nano),
            ("750m", Unit::Milli),
            ("750", Unit::None),
            ("750Ki", Unit::Kibi),
            ("750Mi", Unit::Mebi),
            ("750Gi", Unit::Gibi),
            ("750Ti", Unit::Tebi),
            ("750Pi", Unit::Pebi),
        ];
        for kind in [ResourceKind::Cpu, ResourceKind::Memory] {
            for (input, unit) in cases {
                let q = parse(input).unwrap();
                assert_eq!(q.unit, unit);
                let recovered = q.to_base(kind) / unit.factor(kind);
                assert!(
                    (recovered - 750.0).abs() < 1e-6,
                    "{input} did not round-trip via {kind:?}: {recovered}"
                );
            }
        }
    }

    #[test]
    fn test_evaluate_outcomes_are_distinguishable() {
        assert_eq!(evaluate(None, ResourceKind::Cpu), QuantityOutcome::Absent);
        assert_eq!(
            evaluate(Some("500m"), ResourceKind::Cpu),
            QuantityOutcome::Value(0.5)
        );
        assert_eq!(
            evaluate(Some(""), ResourceKind::Cpu),
            QuantityOutcome::ParseFailure
        );
        assert_eq!(
            evaluate(Some("5Xi"), ResourceKind::Memory),
            QuantityOutcome::UnrecognizedUnit
        );
    }

    #[test]
    fn test_evaluate_rejects_negative_magnitudes() {
        assert_eq!(
            evaluate(Some("-1"), ResourceKind::Cpu),
            QuantityOutcome::ParseFailure
        );
    }

    #[test]
    fn test_leading_number_extraction() {
        assert_eq!(leading_number("8 GiB"), Some(8.0));
        assert_eq!(leading_number("3.75"), Some(3.75));
        assert_eq!(leading_number("16GiB"), Some(16.0));
        assert_eq!(leading_number("N/A"), None);
        assert_eq!(leading_number(""), None);
    }
}
