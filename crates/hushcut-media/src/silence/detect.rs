//! Silence detection via FFmpeg's `silencedetect` filter.
//!
//! The filter is run in an analysis pass over the whole file and its
//! diagnostic log is scraped for `silence_start` / `silence_end` marker
//! pairs. The markers are paired tolerantly: stray end markers are
//! ignored, and a trailing start with no matching end (the stream ends
//! while silent, in which case FFmpeg never prints the end marker) is
//! closed by synthesizing an end at the file duration.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::error::MediaResult;
use crate::filters;

/// Threshold parameters for the silence scan.
#[derive(Debug, Clone)]
pub struct SilenceDetectParams {
    /// Loudness below which audio counts as silent, in dBFS.
    pub noise_db: f64,
    /// Minimum duration a quiet span must last to be reported, in seconds.
    pub min_silence_secs: f64,
}

impl Default for SilenceDetectParams {
    fn default() -> Self {
        Self {
            noise_db: -30.0,
            min_silence_secs: 0.5,
        }
    }
}

/// A detected silent span, in source-file time coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
}

impl SilenceInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Detect silent intervals in `input`.
///
/// `total_duration` is the probed container duration; it closes a
/// trailing unterminated silence and is already known to every caller,
/// so re-probing here would be redundant. Returns intervals sorted by
/// start time with overlaps merged; no markers in the log means an
/// empty vec, not an error.
pub async fn detect_silence(
    input: impl AsRef<Path>,
    params: &SilenceDetectParams,
    total_duration: f64,
) -> MediaResult<Vec<SilenceInterval>> {
    let input = input.as_ref();

    let log = FfmpegCommand::analysis(input)
        .audio_filter(filters::silencedetect(params.noise_db, params.min_silence_secs).render())
        .run()
        .await?;

    let intervals = parse_silence_log(&log, total_duration);

    debug!(
        path = %input.display(),
        noise_db = params.noise_db,
        min_silence_secs = params.min_silence_secs,
        intervals = intervals.len(),
        "Silence scan complete"
    );

    Ok(intervals)
}

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"silence_(start|end):\s*(-?\d+(?:\.\d+)?)").expect("valid marker regex")
    })
}

/// Scrape silence markers out of an FFmpeg diagnostic log.
fn parse_silence_log(log: &str, total_duration: f64) -> Vec<SilenceInterval> {
    let mut intervals = Vec::new();
    let mut open_start: Option<f64> = None;

    for caps in marker_regex().captures_iter(log) {
        let time: f64 = match caps[2].parse() {
            Ok(t) => t,
            Err(_) => continue,
        };

        match &caps[1] {
            "start" => {
                if open_start.is_none() {
                    open_start = Some(time);
                }
            }
            _ => {
                if let Some(start) = open_start.take() {
                    if time > start {
                        intervals.push(SilenceInterval::new(start, time));
                    }
                }
            }
        }
    }

    // Stream ended while silent: close the interval at file duration.
    if let Some(start) = open_start {
        if total_duration > start {
            debug!(
                start = start,
                end = total_duration,
                "Unterminated silence, synthesizing end at file duration"
            );
            intervals.push(SilenceInterval::new(start, total_duration));
        }
    }

    normalize_intervals(intervals)
}

/// Sort by start and merge overlapping intervals. The detector's single
/// linear scan already emits monotonic non-overlapping output, but the
/// gap logic downstream depends on it, so violations are repaired here
/// rather than assumed away.
pub(crate) fn normalize_intervals(mut intervals: Vec<SilenceInterval>) -> Vec<SilenceInterval> {
    intervals.retain(|iv| iv.end > iv.start);
    intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<SilenceInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => {
                last.end = last.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LOG: &str = "\
[silencedetect @ 0x55c2a9e0] silence_start: 10.01\n\
[silencedetect @ 0x55c2a9e0] silence_end: 12.02 | silence_duration: 2.01\n\
size=N/A time=00:01:00.00 bitrate=N/A speed= 312x\n\
[silencedetect @ 0x55c2a9e0] silence_start: 60\n\
[silencedetect @ 0x55c2a9e0] silence_end: 65.5 | silence_duration: 5.5\n";

    #[test]
    fn test_parse_pairs() {
        let intervals = parse_silence_log(SAMPLE_LOG, 120.0);
        assert_eq!(intervals.len(), 2);
        assert!((intervals[0].start - 10.01).abs() < 1e-9);
        assert!((intervals[0].end - 12.02).abs() < 1e-9);
        assert!((intervals[1].start - 60.0).abs() < 1e-9);
        assert!((intervals[1].end - 65.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_no_markers() {
        let intervals = parse_silence_log("frame= 100 fps= 25 size=N/A\n", 60.0);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_trailing_start_synthesized_at_duration() {
        let log = "[silencedetect @ 0x1] silence_start: 55.5\n";
        let intervals = parse_silence_log(log, 60.0);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start - 55.5).abs() < 1e-9);
        assert!((intervals[0].end - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_start_past_duration_dropped() {
        // Zero duration (probe fallback) cannot close the interval
        let log = "[silencedetect @ 0x1] silence_start: 55.5\n";
        let intervals = parse_silence_log(log, 0.0);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_stray_end_ignored() {
        let log = "\
[silencedetect @ 0x1] silence_end: 5.0 | silence_duration: 5.0\n\
[silencedetect @ 0x1] silence_start: 10.0\n\
[silencedetect @ 0x1] silence_end: 12.0 | silence_duration: 2.0\n";
        let intervals = parse_silence_log(log, 60.0);
        assert_eq!(intervals, vec![SilenceInterval::new(10.0, 12.0)]);
    }

    #[test]
    fn test_normalize_sorts_and_merges() {
        let raw = vec![
            SilenceInterval::new(20.0, 25.0),
            SilenceInterval::new(5.0, 10.0),
            SilenceInterval::new(8.0, 12.0),
            SilenceInterval::new(30.0, 30.0),
        ];
        let normalized = normalize_intervals(raw);
        assert_eq!(
            normalized,
            vec![
                SilenceInterval::new(5.0, 12.0),
                SilenceInterval::new(20.0, 25.0),
            ]
        );
    }

    #[test]
    fn test_default_params() {
        let params = SilenceDetectParams::default();
        assert!((params.noise_db - -30.0).abs() < f64::EPSILON);
        assert!((params.min_silence_secs - 0.5).abs() < f64::EPSILON);
    }
}
