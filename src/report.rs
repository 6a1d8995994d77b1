//! Metric reports handed from the calculators to the printers
//!
//! A report is an insertion-ordered `name -> value` mapping. Printing
//! iterates entries in the order they were pushed, so the calculators
//! fully control the output layout.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single computed metric value
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Integer quantity
    Count(u64),
    /// Real-valued ratio
    Ratio(f64),
    /// Ordered list of warp indices
    Indices(Vec<u64>),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Ratio(r) => write!(f, "{}", r),
            Self::Indices(indices) => write!(f, "{:?}", indices),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u64(*n),
            Self::Ratio(r) => serializer.serialize_f64(*r),
            Self::Indices(indices) => indices.serialize(serializer),
        }
    }
}

/// Insertion-ordered metric mapping produced by one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricReport {
    entries: Vec<(String, MetricValue)>,
}

impl MetricReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a metric; order of pushes is the order of printing
    pub fn push(&mut self, name: impl Into<String>, value: MetricValue) {
        self.entries.push((name.into(), value));
    }

    /// All entries in insertion order
    #[must_use]
    pub fn entries(&self) -> &[(String, MetricValue)] {
        &self.entries
    }

    /// Look up a metric by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Number of metrics in the report
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no metrics have been pushed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MetricReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
