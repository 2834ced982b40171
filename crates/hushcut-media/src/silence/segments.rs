//! Keep-segment derivation from detected silence.
//!
//! The builder is a pure function over the detector's output: the keep
//! segments are the gaps between silent intervals, so their union plus
//! the silence union covers the whole file.

use crate::silence::detect::{normalize_intervals, SilenceInterval};

/// A contiguous non-silent span to retain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Compute the keep segments complementary to `silences` over `[0, duration]`.
///
/// Input intervals are normalized (sorted, merged) before the gap walk,
/// so out-of-order detector output cannot produce overlapping segments.
/// Zero- and negative-width gaps are dropped. When every gap collapses —
/// the whole file is silent — a single full-duration segment is returned
/// instead of an empty set, so the encoder always has something to emit;
/// an unknown (zero) duration yields an empty set, which the encoder
/// rejects.
pub fn build_segments(silences: &[SilenceInterval], duration: f64) -> Vec<Segment> {
    if duration <= 0.0 {
        return Vec::new();
    }

    let silences = normalize_intervals(silences.to_vec());
    if silences.is_empty() {
        return vec![Segment::new(0.0, duration)];
    }

    let mut segments = Vec::with_capacity(silences.len() + 1);

    if silences[0].start > 0.0 {
        segments.push(Segment::new(0.0, silences[0].start));
    }

    for pair in silences.windows(2) {
        let gap_start = pair[0].end;
        let gap_end = pair[1].start;
        if gap_start < gap_end {
            segments.push(Segment::new(gap_start, gap_end));
        }
    }

    let last_end = silences[silences.len() - 1].end;
    if last_end < duration {
        segments.push(Segment::new(last_end, duration));
    }

    if segments.is_empty() {
        // Whole file silent: fall back to keeping everything.
        return vec![Segment::new(0.0, duration)];
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> SilenceInterval {
        SilenceInterval::new(start, end)
    }

    #[test]
    fn test_no_silence_keeps_everything() {
        assert_eq!(build_segments(&[], 300.0), vec![Segment::new(0.0, 300.0)]);
    }

    #[test]
    fn test_gaps_between_silences() {
        let silences = vec![iv(10.0, 12.0), iv(60.0, 65.0)];
        let segments = build_segments(&silences, 120.0);
        assert_eq!(
            segments,
            vec![
                Segment::new(0.0, 10.0),
                Segment::new(12.0, 60.0),
                Segment::new(65.0, 120.0),
            ]
        );
    }

    #[test]
    fn test_silence_at_file_edges() {
        let silences = vec![iv(0.0, 5.0), iv(55.0, 60.0)];
        let segments = build_segments(&silences, 60.0);
        assert_eq!(segments, vec![Segment::new(5.0, 55.0)]);
    }

    #[test]
    fn test_whole_file_silent_falls_back_to_full_segment() {
        let silences = vec![iv(0.0, 60.0)];
        let segments = build_segments(&silences, 60.0);
        assert_eq!(segments, vec![Segment::new(0.0, 60.0)]);
    }

    #[test]
    fn test_zero_width_gap_dropped() {
        // Adjacent silences meeting exactly leave no gap between them
        let silences = vec![iv(5.0, 10.0), iv(10.0, 15.0)];
        let segments = build_segments(&silences, 20.0);
        assert_eq!(
            segments,
            vec![Segment::new(0.0, 5.0), Segment::new(15.0, 20.0)]
        );
    }

    #[test]
    fn test_unsorted_input_tolerated() {
        let silences = vec![iv(60.0, 65.0), iv(10.0, 12.0)];
        let segments = build_segments(&silences, 120.0);
        assert_eq!(
            segments,
            vec![
                Segment::new(0.0, 10.0),
                Segment::new(12.0, 60.0),
                Segment::new(65.0, 120.0),
            ]
        );
    }

    #[test]
    fn test_zero_duration_yields_empty_set() {
        assert!(build_segments(&[], 0.0).is_empty());
        assert!(build_segments(&[iv(1.0, 2.0)], 0.0).is_empty());
    }

    #[test]
    fn test_segments_cover_duration_with_silences() {
        let duration = 600.0;
        let silences = vec![iv(30.0, 40.0), iv(100.0, 130.5), iv(580.0, 600.0)];
        let segments = build_segments(&silences, duration);

        // Ordered and non-overlapping
        for pair in segments.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }

        let keep: f64 = segments.iter().map(Segment::duration).sum();
        let silent: f64 = silences.iter().map(|s| s.duration()).sum();
        assert!((keep + silent - duration).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let silences = vec![iv(10.0, 12.0), iv(60.0, 65.0)];
        let first = build_segments(&silences, 120.0);
        let second = build_segments(&silences, 120.0);
        assert_eq!(first, second);
    }
}
