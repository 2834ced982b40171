#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for silence-based video cutting.
//!
//! This crate provides:
//! - Container probing via ffprobe JSON output
//! - Silence detection by scraping the `silencedetect` filter log
//! - Keep-segment derivation and one-pass trim/concat re-encoding
//! - Chunked processing of long sources with lossless reassembly
//! - A typed FFmpeg command and filter-expression layer

pub mod command;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod silence;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{ChunkStage, MediaError, MediaResult};
pub use filters::{FilterChain, FilterGraph, FilterSpec};
pub use probe::{duration_or_zero, probe_media, MediaInfo};
pub use silence::{
    build_segments, chunk_count, cut_audio_remove_silence, cut_remove_silence, detect_silence,
    encode_segments, plan_chunks, AudioCutOptions, Chunk, CutOptions, Segment,
    SilenceDetectParams, SilenceInterval, SilenceRemoveParams, MAX_CHUNK_SECS,
};
