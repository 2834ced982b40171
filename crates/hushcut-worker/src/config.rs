//! Worker configuration.

use std::path::PathBuf;

use hushcut_media::{AudioCutOptions, CutOptions, MAX_CHUNK_SECS};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Work directory for temporary files and pipeline outputs
    pub work_dir: String,
    /// Directory finished artifacts are moved into
    pub output_dir: String,
    /// Chunking threshold in seconds
    pub max_chunk_secs: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: "temp".to_string(),
            output_dir: "output".to_string(),
            max_chunk_secs: MAX_CHUNK_SECS,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("HUSHCUT_WORK_DIR").unwrap_or(defaults.work_dir),
            output_dir: std::env::var("HUSHCUT_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            max_chunk_secs: std::env::var("HUSHCUT_MAX_CHUNK_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_chunk_secs),
        }
    }

    /// Pipeline options for video jobs.
    pub fn cut_options(&self) -> CutOptions {
        CutOptions {
            temp_root: PathBuf::from(&self.work_dir),
            max_chunk_secs: self.max_chunk_secs,
            ..CutOptions::default()
        }
    }

    /// Pipeline options for audio jobs.
    pub fn audio_options(&self) -> AudioCutOptions {
        AudioCutOptions {
            temp_root: PathBuf::from(&self.work_dir),
            ..AudioCutOptions::default()
        }
    }
}
