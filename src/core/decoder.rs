// Per-column sample decoding with a memoized cache

use crate::core::constants::{IMAG_ABS_FLOOR, IMAG_REL_TOLERANCE};
use crate::core::container::ArrayValue;
use crate::core::error::{Result, WaveformError};
use crate::core::format::{ColumnData, SampleKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sample {
    Real(f64),
    Complex(f64, f64),
}

impl Sample {
    fn kind(&self) -> SampleKind {
        match self {
            Sample::Real(_) => SampleKind::Real,
            Sample::Complex(..) => SampleKind::Complex,
        }
    }
}

/// Accepts `x`, `[x]` (some exporters wrap real samples) and `[re, im]`.
/// Every number must be finite.
fn decode_sample(raw: &ArrayValue) -> Option<Sample> {
    match raw {
        ArrayValue::Number(v) if v.is_finite() => Some(Sample::Real(*v)),
        ArrayValue::List(items) => match items.as_slice() {
            [ArrayValue::Number(v)] if v.is_finite() => Some(Sample::Real(*v)),
            [ArrayValue::Number(re), ArrayValue::Number(im)] if re.is_finite() && im.is_finite() => {
                Some(Sample::Complex(*re, *im))
            }
            _ => None,
        },
        _ => None,
    }
}

fn sample_at(row: &[ArrayValue], row_index: usize, column: usize) -> Result<Sample> {
    let cell = row.get(column).ok_or_else(|| WaveformError::Decode {
        row: row_index,
        column,
        found: "no value".to_string(),
    })?;
    decode_sample(cell).ok_or_else(|| WaveformError::Decode {
        row: row_index,
        column,
        found: cell.describe(),
    })
}

fn decode_column(rows: &[Vec<ArrayValue>], column: usize) -> Result<ColumnData> {
    let Some(first) = rows.first() else {
        return Ok(ColumnData::Real(Vec::new()));
    };
    let expected = sample_at(first, 0, column)?.kind();
    let mixed = |row: usize, found: SampleKind| WaveformError::MixedEncoding {
        column,
        row,
        expected,
        found,
    };

    match expected {
        SampleKind::Real => {
            let mut values = Vec::with_capacity(rows.len());
            for (r, row) in rows.iter().enumerate() {
                match sample_at(row, r, column)? {
                    Sample::Real(v) => values.push(v),
                    other => return Err(mixed(r, other.kind())),
                }
            }
            Ok(ColumnData::Real(values))
        }
        SampleKind::Complex => {
            let mut re = Vec::with_capacity(rows.len());
            let mut im = Vec::with_capacity(rows.len());
            for (r, row) in rows.iter().enumerate() {
                match sample_at(row, r, column)? {
                    Sample::Complex(a, b) => {
                        re.push(a);
                        im.push(b);
                    }
                    other => return Err(mixed(r, other.kind())),
                }
            }
            Ok(ColumnData::Complex { re, im })
        }
    }
}

/// Decodes columns of a validated sample matrix on demand. Each column is
/// decoded at most once; later requests share the cached result.
pub struct ColumnDecoder<'a> {
    rows: &'a [Vec<ArrayValue>],
    column_count: usize,
    cache: HashMap<usize, Arc<ColumnData>>,
}

impl<'a> ColumnDecoder<'a> {
    pub fn new(rows: &'a [Vec<ArrayValue>], column_count: usize) -> Self {
        Self {
            rows,
            column_count,
            cache: HashMap::new(),
        }
    }

    pub fn decode(&mut self, column: usize) -> Result<Arc<ColumnData>> {
        if let Some(hit) = self.cache.get(&column) {
            trace!("column {} served from cache", column);
            return Ok(Arc::clone(hit));
        }
        if column >= self.column_count {
            return Err(WaveformError::invalid(format!(
                "column index {column} is out of range for {} columns",
                self.column_count
            )));
        }

        let decoded = Arc::new(decode_column(self.rows, column)?);
        debug!(
            "Decoded column {} as {} ({} rows)",
            column,
            decoded.kind(),
            decoded.len()
        );
        self.cache.insert(column, Arc::clone(&decoded));
        Ok(decoded)
    }

    pub fn cached_columns(&self) -> usize {
        self.cache.len()
    }
}

/// Real values of the independent variable. A complex column is accepted when
/// its imaginary part is negligible: `max|im| <= max(1e-12, max|re| * 1e-9)`.
pub fn resolve_independent(
    decoder: &mut ColumnDecoder<'_>,
    name: &str,
    index: usize,
) -> Result<Vec<f64>> {
    match &*decoder.decode(index)? {
        ColumnData::Real(values) => Ok(values.clone()),
        ColumnData::Complex { re, im } => {
            let max_abs_imag = im.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let max_abs_real = re.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let tolerance = IMAG_ABS_FLOOR.max(max_abs_real * IMAG_REL_TOLERANCE);

            if max_abs_imag > tolerance {
                return Err(WaveformError::SignificantImaginaryComponent {
                    signal: name.to_string(),
                    index,
                    max_abs_imag,
                    tolerance,
                });
            }

            debug!(
                "Independent variable '{}' is complex-encoded; using real part (max |im| = {:e})",
                name, max_abs_imag
            );
            Ok(re.clone())
        }
    }
}
