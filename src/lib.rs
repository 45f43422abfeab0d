// Waveform container reader
// Main library entry point

pub mod core;

// Re-export main types
pub use core::container::{ArrayValue, AttrValue, ContainerNode, NodeKind};
pub use core::error::{Result, WaveformError};
pub use core::format::{
    Accessor, Column, ColumnData, Dataset, SignalAliasTable, SignalKind, SignalLeaf,
    SignalReference,
};
pub use core::hdf5_container::{Hdf5Container, Hdf5Node};
pub use core::json_container::{JsonContainer, JsonNode};
pub use core::reader::{ContainerFormat, LoadedWaveform, WaveformReader};
pub use core::resolver::SignalResolver;

#[cfg(test)]
mod tests {
    #[test]
    fn test_constants() {
        use crate::core::constants::*;
        assert_eq!(ACCESSOR_NAMES, ["re", "im", "mag", "phase", "db20"]);
        assert!((20.0 * DB20_MAGNITUDE_FLOOR.log10() + 600.0).abs() < 1e-9);
    }
}
