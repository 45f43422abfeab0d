use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use waveform_reader::LoadedWaveform;

#[derive(Clone)]
pub struct SignalInfo {
    pub waveform: Arc<LoadedWaveform>,
    pub file_id: String,
    pub original_name: String, // The selectable name inside the file (may carry an accessor)
}

#[derive(Clone)]
pub struct LoadedFile {
    pub path: String,
    pub waveform: Arc<LoadedWaveform>,
    pub headers: Vec<String>, // Exposed (globally unique) names
}

#[derive(Clone)]
pub struct AppState {
    // Maps unique_name -> SignalInfo
    pub signals: Arc<RwLock<HashMap<String, SignalInfo>>>,
    // Maps file id -> loaded container
    pub files: Arc<RwLock<HashMap<String, LoadedFile>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            signals: Arc::new(RwLock::new(HashMap::new())),
            files: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// `base`, or `base_1`, `base_2`, ... when the name is already registered.
pub fn unique_name<V>(taken: &HashMap<String, V>, base: &str) -> String {
    if !taken.contains_key(base) {
        return base.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{}_{}", base, i);
        if !taken.contains_key(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
