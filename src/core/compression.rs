// Compression backends for container files

use crate::core::error::{Result, WaveformError};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
    Zlib,
    Lz4,
    Zstd,
}

impl CompressionType {
    /// Picks the codec from the outermost file extension (`trace.json.gz` -> gzip).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "gz" | "gzip" => CompressionType::Gzip,
            "zlib" | "zz" => CompressionType::Zlib,
            "lz4" => CompressionType::Lz4,
            "zst" | "zstd" => CompressionType::Zstd,
            _ => CompressionType::None,
        }
    }
}

pub fn decompress(data: &[u8], compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),

        CompressionType::Gzip => {
            let mut decoder = GzDecoder::new(data);
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| WaveformError::DecompressionFailed(format!("Gzip: {}", e)))?;
            Ok(decompressed)
        }

        CompressionType::Zlib => {
            let mut decoder = ZlibDecoder::new(data);
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| WaveformError::DecompressionFailed(format!("Zlib: {}", e)))?;
            Ok(decompressed)
        }

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            let mut decoder = lz4::Decoder::new(data)
                .map_err(|e| WaveformError::DecompressionFailed(format!("LZ4: {}", e)))?;
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| WaveformError::DecompressionFailed(format!("LZ4: {}", e)))?;
            Ok(decompressed)
        }

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(WaveformError::UnsupportedCompression(
            "lz4 (built without the 'lz4' feature)".to_string(),
        )),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => zstd::decode_all(data)
            .map_err(|e| WaveformError::DecompressionFailed(format!("Zstd: {}", e))),

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(WaveformError::UnsupportedCompression(
            "zstd (built without the 'zstd' feature)".to_string(),
        )),
    }
}
