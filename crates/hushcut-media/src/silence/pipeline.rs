//! The silence-cut pipeline and its chunk orchestrator.
//!
//! Short inputs go through a single detect → build → encode pass. Long
//! inputs are partitioned into fixed-duration chunks, each re-encoded to
//! an isolated temp file, silence-cut independently, and reassembled
//! with the concat demuxer. Chunking bounds the filter-graph size and
//! working set of any single encode: the trim+concat graph grows with
//! the detected silence count, and an 8-minute slice keeps that growth
//! predictable regardless of source length.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::command::FfmpegCommand;
use crate::error::{ChunkStage, MediaError, MediaResult};
use crate::filters::aresample_async;
use crate::probe::duration_or_zero;
use crate::silence::detect::{detect_silence, SilenceDetectParams};
use crate::silence::encode::{encode_segments, AUDIO_CODEC, VIDEO_CODEC, VIDEO_PRESET};
use crate::silence::segments::build_segments;

/// Longest span a single silence-cut pass is allowed to cover. Sources
/// beyond this are chunked. Policy constant, not derived from content.
pub const MAX_CHUNK_SECS: f64 = 8.0 * 60.0;

/// Longest input file-stem carried into output names.
const MAX_STEM_LEN: usize = 15;

/// Options for a silence-cut run.
#[derive(Debug, Clone)]
pub struct CutOptions {
    /// Directory that receives the final artifact and per-run work dirs.
    pub temp_root: PathBuf,
    /// Chunking threshold in seconds.
    pub max_chunk_secs: f64,
    /// Silence scan thresholds.
    pub detect: SilenceDetectParams,
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            temp_root: PathBuf::from("temp"),
            max_chunk_secs: MAX_CHUNK_SECS,
            detect: SilenceDetectParams::default(),
        }
    }
}

/// A planned slice of a long source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk {
    pub index: usize,
    /// Seek offset into the source, seconds.
    pub start_offset: f64,
    /// Slice length, seconds.
    pub duration: f64,
}

/// Number of chunks a source of `duration` splits into.
///
/// Exact multiples of `max_chunk_secs` produce no spurious trailing
/// empty chunk.
pub fn chunk_count(duration: f64, max_chunk_secs: f64) -> usize {
    if duration <= 0.0 || max_chunk_secs <= 0.0 {
        return 0;
    }
    (duration / max_chunk_secs).ceil() as usize
}

/// Partition `duration` into sequential fixed-size chunks.
pub fn plan_chunks(duration: f64, max_chunk_secs: f64) -> Vec<Chunk> {
    let count = chunk_count(duration, max_chunk_secs);
    (0..count)
        .map(|index| {
            let start_offset = index as f64 * max_chunk_secs;
            Chunk {
                index,
                start_offset,
                duration: max_chunk_secs.min(duration - start_offset),
            }
        })
        .collect()
}

/// Remove the silent spans from `input` and return the re-encoded
/// output path.
///
/// The artifact belongs to the caller, who deletes it once consumed.
/// All intermediate files live in a per-run work directory that is
/// removed on success and failure alike.
pub async fn cut_remove_silence(
    input: impl AsRef<Path>,
    opts: &CutOptions,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();

    // Reject missing input before anything touches the filesystem.
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    fs::create_dir_all(&opts.temp_root).await?;
    let temp_root = fs::canonicalize(&opts.temp_root).await?;

    let (stem, ext) = output_name_parts(input);
    let output = temp_root.join(format!("cut_{}.{}", stem, ext));

    let duration = duration_or_zero(input).await;

    if duration <= opts.max_chunk_secs {
        debug!(
            path = %input.display(),
            duration_secs = duration,
            "Source fits a single pass"
        );
        process_single(input, &output, duration, &opts.detect).await?;
        return Ok(output);
    }

    let work_dir = tempfile::Builder::new()
        .prefix("cut_")
        .tempdir_in(&temp_root)?;

    let chunks = plan_chunks(duration, opts.max_chunk_secs);
    info!(
        path = %input.display(),
        duration_secs = duration,
        chunks = chunks.len(),
        "Source exceeds chunk threshold, processing in chunks"
    );

    let mut processed = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let chunk_path = work_dir.path().join(format!("chunk_{}.{}", chunk.index, ext));
        materialize_chunk(input, &chunk_path, chunk)
            .await
            .map_err(|e| MediaError::chunk_pipeline(ChunkStage::Materialize, e))?;

        let processed_path = work_dir
            .path()
            .join(format!("processed_segment_{}.mp4", chunk.index));
        let chunk_duration = duration_or_zero(&chunk_path).await;
        process_single(&chunk_path, &processed_path, chunk_duration, &opts.detect)
            .await
            .map_err(|e| MediaError::chunk_pipeline(ChunkStage::Process, e))?;

        processed.push(processed_path);
    }

    concat_processed(&processed, work_dir.path(), &output)
        .await
        .map_err(|e| MediaError::chunk_pipeline(ChunkStage::Concat, e))?;

    // work_dir drop removes the chunks, processed chunks, and manifest;
    // the failure paths above rely on the same drop.
    Ok(output)
}

/// One detect → build → encode pass over a bounded-duration source.
async fn process_single(
    input: &Path,
    output: &Path,
    duration: f64,
    params: &SilenceDetectParams,
) -> MediaResult<()> {
    let silences = detect_silence(input, params, duration).await?;
    let segments = build_segments(&silences, duration);

    info!(
        path = %input.display(),
        silences = silences.len(),
        segments = segments.len(),
        "Derived keep segments"
    );

    encode_segments(input, output, &segments).await
}

/// Seek and re-encode one chunk out of the source. The boundary is
/// re-encoded rather than stream-copied so the cut is not pulled to the
/// nearest keyframe, and timestamps are rebased to zero for the later
/// concatenation.
async fn materialize_chunk(input: &Path, chunk_path: &Path, chunk: &Chunk) -> MediaResult<()> {
    debug!(
        index = chunk.index,
        start_offset = chunk.start_offset,
        duration = chunk.duration,
        "Materializing chunk"
    );

    FfmpegCommand::new(input, chunk_path)
        .seek(chunk.start_offset)
        .duration(chunk.duration)
        .video_codec(VIDEO_CODEC)
        .preset(VIDEO_PRESET)
        .audio_codec(AUDIO_CODEC)
        .zero_timestamps()
        .run()
        .await?;

    Ok(())
}

/// Reassemble the processed chunks, in chunk order, through the concat
/// demuxer. The async resample absorbs the small audio drift the
/// independent chunk encodes accumulate.
async fn concat_processed(
    processed: &[PathBuf],
    work_dir: &Path,
    output: &Path,
) -> MediaResult<()> {
    let manifest = work_dir.join("concat.txt");
    let listing: String = processed
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect();
    fs::write(&manifest, &listing).await?;

    FfmpegCommand::new(&manifest, output)
        .concat_demuxer()
        .video_codec(VIDEO_CODEC)
        .preset(VIDEO_PRESET)
        .audio_codec(AUDIO_CODEC)
        .audio_filter(aresample_async().render())
        .run()
        .await?;

    info!(
        chunks = processed.len(),
        output = %output.display(),
        "Chunk reassembly complete"
    );

    Ok(())
}

/// Output file stem (truncated) and extension for an input path.
fn output_name_parts(input: &Path) -> (String, String) {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let stem: String = stem.chars().take(MAX_STEM_LEN).collect();

    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string());

    (stem, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_rounds_up() {
        // 20 minutes at an 8-minute cap
        assert_eq!(chunk_count(1200.0, 480.0), 3);
        assert_eq!(chunk_count(100.0, 480.0), 1);
    }

    #[test]
    fn test_chunk_count_exact_multiple() {
        assert_eq!(chunk_count(960.0, 480.0), 2);
        assert_eq!(chunk_count(480.0, 480.0), 1);
    }

    #[test]
    fn test_chunk_count_degenerate() {
        assert_eq!(chunk_count(0.0, 480.0), 0);
        assert_eq!(chunk_count(100.0, 0.0), 0);
    }

    #[test]
    fn test_plan_chunks_twenty_minutes() {
        let chunks = plan_chunks(1200.0, 480.0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].start_offset, 0.0);
        assert_eq!(chunks[0].duration, 480.0);
        assert_eq!(chunks[1].start_offset, 480.0);
        assert_eq!(chunks[1].duration, 480.0);
        assert_eq!(chunks[2].start_offset, 960.0);
        assert_eq!(chunks[2].duration, 240.0);
    }

    #[test]
    fn test_plan_chunks_exact_multiple_has_no_empty_tail() {
        let chunks = plan_chunks(960.0, 480.0);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.duration == 480.0));
    }

    #[test]
    fn test_output_name_parts_truncates_stem() {
        let (stem, ext) = output_name_parts(Path::new("/uploads/a_very_long_recording_name.mkv"));
        assert_eq!(stem, "a_very_long_rec");
        assert_eq!(ext, "mkv");

        let (stem, ext) = output_name_parts(Path::new("clip.mp4"));
        assert_eq!(stem, "clip");
        assert_eq!(ext, "mp4");
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_temp_creation() {
        let parent = tempfile::TempDir::new().unwrap();
        let base = parent.path().join("work_root");
        let opts = CutOptions {
            temp_root: base.clone(),
            ..CutOptions::default()
        };

        let err = cut_remove_silence("/nonexistent/video.mp4", &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
        assert!(!base.exists(), "no temp dir may be created for bad input");
    }
}
