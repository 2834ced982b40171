//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Stage of the chunked pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStage {
    /// Seeking/re-encoding a raw chunk out of the source.
    Materialize,
    /// Silence-cutting an individual chunk.
    Process,
    /// Reassembling the processed chunks.
    Concat,
}

impl std::fmt::Display for ChunkStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChunkStage::Materialize => "chunk materialization",
            ChunkStage::Process => "chunk processing",
            ChunkStage::Concat => "chunk concatenation",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("probe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("encode failed: {message}")]
    EncodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("no segments to encode")]
    EmptySegmentSet,

    #[error("{stage} failed")]
    ChunkPipeline {
        stage: ChunkStage,
        #[source]
        source: Box<MediaError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create an encode failure error.
    pub fn encode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EncodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Wrap a step failure with the chunk-pipeline stage it happened in.
    pub fn chunk_pipeline(stage: ChunkStage, source: MediaError) -> Self {
        Self::ChunkPipeline {
            stage,
            source: Box::new(source),
        }
    }

    /// True when the error means the caller handed us bad input rather
    /// than processing breaking midway.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, MediaError::FileNotFound(_))
    }
}
