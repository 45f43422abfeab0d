// Error handling for the waveform container reader

use crate::core::constants::ACCESSOR_NAMES;
use crate::core::format::{Accessor, SampleKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WaveformError>;

#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Container parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] rustyhdf5::Error),

    #[error("Unsupported compression type: {0}")]
    UnsupportedCompression(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Invalid waveform container: {0}")]
    InvalidContainer(String),

    #[error(
        "Cannot decode sample at row {row}, column {column}: found {found}, \
         expected a finite scalar, a one-element array [x] or a two-element array [re, im]"
    )]
    Decode {
        row: usize,
        column: usize,
        found: String,
    },

    #[error(
        "Mixed sample encoding in column {column}: row 0 is {expected} but row {row} is {found}"
    )]
    MixedEncoding {
        column: usize,
        row: usize,
        expected: SampleKind,
        found: SampleKind,
    },

    #[error(
        "Independent variable '{signal}' (column {index}) has a significant imaginary component: \
         max |im| = {max_abs_imag:e} exceeds tolerance {tolerance:e}"
    )]
    SignificantImaginaryComponent {
        signal: String,
        index: usize,
        max_abs_imag: f64,
        tolerance: f64,
    },

    #[error("signal '{signal}' is real-valued and does not support accessor '.{accessor}'")]
    RealSignalAccessor { signal: String, accessor: Accessor },

    #[error(
        "signal '{signal}' is complex-valued; select one of the accessors {}",
        accessor_list(signal)
    )]
    MissingAccessor { signal: String },

    #[error(
        "projection '{signal}.{accessor}' produced a non-finite value ({value}) at sample {index}"
    )]
    Projection {
        signal: String,
        accessor: Accessor,
        index: usize,
        value: f64,
    },

    #[error(
        "complex signal '{signal}' has {re_len} real parts but {im_len} imaginary parts"
    )]
    ComplexLengthMismatch {
        signal: String,
        re_len: usize,
        im_len: usize,
    },
}

impl WaveformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        WaveformError::InvalidContainer(message.into())
    }
}

fn accessor_list(signal: &str) -> String {
    ACCESSOR_NAMES
        .iter()
        .map(|name| format!("'{signal}.{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
