// Load a waveform container and print every selectable signal

use anyhow::{Context, Result};
use tracing::{info, warn, Level};
use waveform_reader::WaveformReader;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/waveform.h5".to_string());

    let waveform = WaveformReader::open(&path)
        .with_context(|| format!("loading {path}"))?;

    info!(
        "{}: {} points over '{}'",
        waveform.dataset.path,
        waveform.row_count(),
        waveform.independent_name()
    );

    for (alias, target) in &waveform.signal_alias_lookup {
        info!("  alias {} -> {}", alias, target);
    }

    for name in waveform.resolver().selectable_names() {
        match waveform.resolve_signal_values(&name)? {
            Some(values) if !values.is_empty() => info!(
                "  {}: first={} last={}",
                name,
                values[0],
                values[values.len() - 1]
            ),
            Some(_) => info!("  {}: no samples", name),
            None => warn!("  {} did not resolve", name),
        }
    }

    Ok(())
}
