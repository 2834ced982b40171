//! Audio-only silence removal.
//!
//! Audio inputs skip the segmentation pipeline entirely: FFmpeg's
//! `silenceremove` filter drops the quiet spans in a single pass and the
//! result is re-encoded to MP3. Thresholds here are deliberately more
//! aggressive than the video profile's, matching how spoken-word audio
//! tolerates tighter cuts.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterSpec;

/// Output audio codec.
pub const MP3_CODEC: &str = "libmp3lame";
/// Output sample rate.
pub const MP3_SAMPLE_RATE: u32 = 44_100;

/// Parameters for the `silenceremove` filter.
#[derive(Debug, Clone)]
pub struct SilenceRemoveParams {
    /// Leading silence periods to trim.
    pub start_periods: i32,
    /// Leading silence to keep, seconds.
    pub start_duration: f64,
    /// Loudness threshold opening a leading trim, dBFS.
    pub start_threshold_db: f64,
    /// Trailing/interior silence periods to trim (-1 = all).
    pub stop_periods: i32,
    /// Interior silence to keep, seconds.
    pub stop_duration: f64,
    /// Loudness threshold closing a trim, dBFS.
    pub stop_threshold_db: f64,
}

impl Default for SilenceRemoveParams {
    fn default() -> Self {
        Self {
            start_periods: 1,
            start_duration: 0.0,
            start_threshold_db: -30.0,
            stop_periods: -1,
            stop_duration: 0.1,
            stop_threshold_db: -40.0,
        }
    }
}

impl SilenceRemoveParams {
    /// Render as a typed filter expression.
    pub fn to_filter(&self) -> FilterSpec {
        FilterSpec::new("silenceremove")
            .arg("start_periods", self.start_periods)
            .arg("start_duration", self.start_duration)
            .arg("start_threshold", format!("{}dB", self.start_threshold_db))
            .arg("stop_periods", self.stop_periods)
            .arg("stop_duration", self.stop_duration)
            .arg("stop_threshold", format!("{}dB", self.stop_threshold_db))
    }
}

/// Options for an audio silence-cut run.
#[derive(Debug, Clone)]
pub struct AudioCutOptions {
    /// Directory that receives the output artifact.
    pub temp_root: PathBuf,
    /// Filter thresholds.
    pub params: SilenceRemoveParams,
}

impl Default for AudioCutOptions {
    fn default() -> Self {
        Self {
            temp_root: PathBuf::from("temp"),
            params: SilenceRemoveParams::default(),
        }
    }
}

/// Remove silent spans from an audio file and return the MP3 output path.
pub async fn cut_audio_remove_silence(
    input: impl AsRef<Path>,
    opts: &AudioCutOptions,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    fs::create_dir_all(&opts.temp_root).await?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let output = opts.temp_root.join(format!("output_{}.mp3", stem));

    info!(
        input = %input.display(),
        output = %output.display(),
        "Removing silence from audio"
    );

    FfmpegCommand::new(input, &output)
        .audio_filter(opts.params.to_filter().render())
        .no_video()
        .audio_codec(MP3_CODEC)
        .audio_sample_rate(MP3_SAMPLE_RATE)
        .run()
        .await?;

    Ok(output)
}
