//! Re-encoding of keep segments into a single output.
//!
//! All segments are trimmed and spliced in one FFmpeg invocation through
//! the typed filter graph. Output codec parameters are fixed policy
//! constants; the quality/speed tradeoff is uniform across all jobs.

use std::path::Path;

use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::segment_trim_graph;
use crate::silence::segments::Segment;

/// Video codec for every re-encode in the pipeline.
pub const VIDEO_CODEC: &str = "libx264";
/// Encoder speed preset.
pub const VIDEO_PRESET: &str = "ultrafast";
/// Audio codec for every re-encode in the pipeline.
pub const AUDIO_CODEC: &str = "aac";

/// Trim `segments` out of `input`, splice them in order, and encode the
/// result to `output`.
///
/// A single segment is encoded directly with no concat nodes in the
/// graph; concat carries measurable overhead and can duplicate frames at
/// the joint. Any encoder failure aborts the job with the captured
/// diagnostics; no partial output is left claimed as a result.
pub async fn encode_segments(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    segments: &[Segment],
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if segments.is_empty() {
        return Err(MediaError::EmptySegmentSet);
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        segments = segments.len(),
        "Encoding keep segments"
    );

    let graph = segment_trim_graph(segments);

    FfmpegCommand::new(input, output)
        .filter_complex(graph.graph.render())
        .map_label(&graph.video_out)
        .map_label(&graph.audio_out)
        .video_codec(VIDEO_CODEC)
        .preset(VIDEO_PRESET)
        .audio_codec(AUDIO_CODEC)
        .run()
        .await?;

    Ok(())
}
