// Data structures for loaded waveform containers

use crate::core::constants::{ACCESSOR_NAMES, ACCESSOR_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Human-readable alias -> canonical signal path. Identity aliases are never stored.
pub type SignalAliasTable = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flat columnar view of a container. `columns[0]` is always the independent variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub path: String,
    pub row_count: usize,
    pub columns: Vec<Column>,
}

impl Dataset {
    pub fn independent(&self) -> &Column {
        &self.columns[0]
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Decoded samples of one column. The kind is fixed for the whole column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Real(Vec<f64>),
    Complex { re: Vec<f64>, im: Vec<f64> },
}

impl ColumnData {
    pub fn kind(&self) -> SignalKind {
        match self {
            ColumnData::Real(_) => SignalKind::Real,
            ColumnData::Complex { .. } => SignalKind::Complex,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Real(values) => values.len(),
            ColumnData::Complex { re, .. } => re.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encoding of a single raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Real,
    Complex,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Real => write!(f, "real"),
            SampleKind::Complex => write!(f, "complex [re, im]"),
        }
    }
}

pub type SignalKind = SampleKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalLeaf {
    pub signal_path: String,
    pub column_index: usize,
    pub canonical_alias: Option<String>,
}

/// Real-valued projection of a complex signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Re,
    Im,
    Mag,
    Phase,
    Db20,
}

impl Accessor {
    pub const ALL: [Accessor; 5] = [
        Accessor::Re,
        Accessor::Im,
        Accessor::Mag,
        Accessor::Phase,
        Accessor::Db20,
    ];

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "re" => Some(Accessor::Re),
            "im" => Some(Accessor::Im),
            "mag" => Some(Accessor::Mag),
            "phase" => Some(Accessor::Phase),
            "db20" => Some(Accessor::Db20),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Accessor::Re => ACCESSOR_NAMES[0],
            Accessor::Im => ACCESSOR_NAMES[1],
            Accessor::Mag => ACCESSOR_NAMES[2],
            Accessor::Phase => ACCESSOR_NAMES[3],
            Accessor::Db20 => ACCESSOR_NAMES[4],
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-supplied signal name split into `base` and an optional accessor suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalReference {
    pub base: String,
    pub accessor: Option<Accessor>,
}

impl SignalReference {
    /// Splits `name` at its last `.` when the suffix is a known accessor.
    /// Returns `None` when the base would be empty.
    pub fn parse(name: &str) -> Option<Self> {
        let (base, accessor) = match name.rsplit_once(ACCESSOR_SEPARATOR) {
            Some((base, suffix)) => match Accessor::from_suffix(suffix) {
                Some(accessor) => (base, Some(accessor)),
                None => (name, None),
            },
            None => (name, None),
        };

        if base.is_empty() {
            return None;
        }

        Some(Self {
            base: base.to_string(),
            accessor,
        })
    }

    pub fn qualified(base: &str, accessor: Accessor) -> String {
        format!("{base}{ACCESSOR_SEPARATOR}{accessor}")
    }
}
