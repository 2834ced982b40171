//! Silence-based cutting.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌─────────────────┐
//! │ Prober     │──►│ Detector      │──►│ Segment Builder │
//! │ (duration) │   │ (silencedetect│   │ (keep gaps)     │
//! └────────────┘   │  log scrape)  │   └────────┬────────┘
//!                  └───────────────┘            ▼
//!                  ┌───────────────┐   ┌─────────────────┐
//!                  │ Output Video  │◄──│ Segment Encoder │
//!                  │               │   │ (trim + concat) │
//!                  └───────────────┘   └─────────────────┘
//! ```
//!
//! Sources longer than [`pipeline::MAX_CHUNK_SECS`] run the same stages
//! per fixed-duration chunk and are reassembled losslessly afterwards.
//! Audio-only inputs take the single-pass `silenceremove` route in
//! [`audio`] instead.

pub mod audio;
pub mod detect;
pub mod encode;
pub mod pipeline;
pub mod segments;

pub use audio::{cut_audio_remove_silence, AudioCutOptions, SilenceRemoveParams};
pub use detect::{detect_silence, SilenceDetectParams, SilenceInterval};
pub use encode::encode_segments;
pub use pipeline::{chunk_count, cut_remove_silence, plan_chunks, Chunk, CutOptions, MAX_CHUNK_SECS};
pub use segments::{build_segments, Segment};
