// Waveform container loader: validate, decode, collect signals, bind the resolver

use crate::core::container::ContainerNode;
use crate::core::decoder::{resolve_independent, ColumnDecoder};
use crate::core::error::Result;
use crate::core::format::*;
use crate::core::hdf5_container::Hdf5Container;
use crate::core::json_container::JsonContainer;
use crate::core::resolver::SignalResolver;
use crate::core::tree::{build_alias_table, collect_leaves};
use crate::core::validator::validate;
use std::path::Path;
use tracing::{debug, info};

/// Result of one successful load. Immutable; share it behind an `Arc` if needed.
#[derive(Debug, Clone)]
pub struct LoadedWaveform {
    pub dataset: Dataset,
    /// Canonical leaf paths in tree order, independent variable excluded.
    pub signal_paths: Vec<String>,
    pub signal_alias_lookup: SignalAliasTable,
    /// Subset of `signal_paths` backed by complex columns.
    pub complex_signal_paths: Vec<String>,
    pub leaves: Vec<SignalLeaf>,
    resolver: SignalResolver,
}

impl LoadedWaveform {
    /// See [`SignalResolver::resolve`].
    pub fn resolve_signal_values(&self, name: &str) -> Result<Option<Vec<f64>>> {
        self.resolver.resolve(name)
    }

    pub fn resolver(&self) -> &SignalResolver {
        &self.resolver
    }

    pub fn row_count(&self) -> usize {
        self.dataset.row_count
    }

    pub fn independent_name(&self) -> &str {
        self.resolver.independent_name()
    }

    pub fn independent_values(&self) -> &[f64] {
        &self.dataset.independent().values
    }

    pub fn is_complex(&self, signal_path: &str) -> bool {
        self.complex_signal_paths.iter().any(|p| p == signal_path)
    }
}

/// On-disk rendering of a container, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Hdf5,
    /// JSON tree, optionally compressed (see `CompressionType`).
    Json,
}

impl ContainerFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "h5" | "hdf5" | "hdf" | "he5" => ContainerFormat::Hdf5,
            _ => ContainerFormat::Json,
        }
    }
}

pub struct WaveformReader;

impl WaveformReader {
    /// Loads a container file, dispatching on its extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LoadedWaveform> {
        let path = path.as_ref();
        let label = path.display().to_string();

        match ContainerFormat::from_path(path) {
            ContainerFormat::Hdf5 => {
                let container = Hdf5Container::open(path)?;
                Self::load(&container.root(), &label)
            }
            ContainerFormat::Json => {
                let container = JsonContainer::open(path)?;
                Self::load(&container.root(), &label)
            }
        }
    }

    pub fn from_hdf5_bytes(data: Vec<u8>, path: &str) -> Result<LoadedWaveform> {
        let container = Hdf5Container::from_bytes(data)?;
        Self::load(&container.root(), path)
    }

    pub fn from_slice(data: &[u8], path: &str) -> Result<LoadedWaveform> {
        let container = JsonContainer::from_slice(data)?;
        Self::load(&container.root(), path)
    }

    /// Loads from any container binding. Either the whole load succeeds or
    /// the first error is returned and nothing is kept.
    pub fn load<N: ContainerNode>(root: &N, path: &str) -> Result<LoadedWaveform> {
        debug!("Loading waveform container {}", path);

        let layout = validate(root)?;
        let mut decoder = ColumnDecoder::new(&layout.rows, layout.variable_count);

        let independent = resolve_independent(
            &mut decoder,
            &layout.indep_var_name,
            layout.indep_var_index,
        )?;
        let leaves = collect_leaves(
            &layout.signals,
            &layout.column_names,
            &layout.indep_var_name,
        )?;

        let mut columns = Vec::with_capacity(leaves.len() + 1);
        columns.push(Column::new(layout.indep_var_name.clone(), independent.clone()));

        let mut signals = Vec::with_capacity(leaves.len());
        let mut complex_signal_paths = Vec::new();
        for leaf in &leaves {
            let data = decoder.decode(leaf.column_index)?;
            match data.as_ref() {
                ColumnData::Real(values) => {
                    columns.push(Column::new(leaf.signal_path.clone(), values.clone()))
                }
                ColumnData::Complex { .. } => complex_signal_paths.push(leaf.signal_path.clone()),
            }
            signals.push((leaf.signal_path.clone(), data));
        }

        let signal_alias_lookup = build_alias_table(&leaves, &layout.indep_var_name);
        let signal_paths = leaves.iter().map(|l| l.signal_path.clone()).collect();

        let resolver = SignalResolver::new(
            layout.indep_var_name.clone(),
            independent,
            signals,
            signal_alias_lookup.clone(),
        );

        info!(
            "Loaded {}: {} points, {} signals ({} complex), {} columns decoded",
            path,
            layout.point_count,
            leaves.len(),
            complex_signal_paths.len(),
            decoder.cached_columns()
        );

        Ok(LoadedWaveform {
            dataset: Dataset {
                path: path.to_string(),
                row_count: layout.point_count,
                columns,
            },
            signal_paths,
            signal_alias_lookup,
            complex_signal_paths,
            leaves,
            resolver,
        })
    }
}
