//! Gap-tolerant polyline reconstruction.
//!
//! The trace is built as a sequence of independent stroke segments, not one
//! continuous path: short unvoiced runs are bridged so single-frame dropouts
//! do not flicker, while runs at or past the gap threshold close the current
//! segment and start a new one at the next voiced point.

use super::PitchSample;
use super::range::ViewRange;
use crate::util::musical;
use std::time::Instant;

/// A point in draw-space, x rightward and y downward.
pub type Point = (f32, f32);

/// Walk samples oldest to newest and produce the stroke segments for one
/// frame. `now` anchors the right edge; every x is recomputed against it, so
/// the trace scrolls left as time advances.
pub fn build_segments(
    samples: impl Iterator<Item = PitchSample>,
    now: Instant,
    time_window_seconds: f32,
    gap_threshold: usize,
    view: ViewRange,
    width: f32,
    height: f32,
) -> Vec<Vec<Point>> {
    let window = time_window_seconds.max(f32::EPSILON);
    let gap_threshold = gap_threshold.max(1);

    let mut segments = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut unvoiced_run = 0usize;

    for sample in samples {
        let Some(midi) = sample
            .frequency_hz
            .and_then(|freq| musical::hz_to_midi(freq as f64))
        else {
            unvoiced_run += 1;
            continue;
        };

        if unvoiced_run >= gap_threshold && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        unvoiced_run = 0;

        let age = now.saturating_duration_since(sample.timestamp).as_secs_f32();
        let x = (1.0 - age / window) * width;
        let y = view.note_to_y(midi as f32, height);
        current.push((x, y));
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 400.0;

    fn samples(frequencies: &[Option<f32>], base: Instant) -> Vec<PitchSample> {
        frequencies
            .iter()
            .enumerate()
            .map(|(i, &frequency_hz)| PitchSample {
                frequency_hz,
                timestamp: base + Duration::from_millis(16 * i as u64),
            })
            .collect()
    }

    fn build(frequencies: &[Option<f32>], gap_threshold: usize) -> Vec<Vec<Point>> {
        let base = Instant::now();
        let trace = samples(frequencies, base);
        let now = trace.last().map(|s| s.timestamp).unwrap_or(base);
        build_segments(
            trace.iter().copied(),
            now,
            10.0,
            gap_threshold,
            ViewRange::default(),
            WIDTH,
            HEIGHT,
        )
    }

    #[test]
    fn short_gaps_are_bridged() {
        let segments = build(
            &[Some(220.0), Some(220.0), None, None, Some(220.0)],
            3,
        );
        assert_eq!(segments.len(), 1, "two unvoiced frames under threshold 3");
        assert_eq!(segments[0].len(), 3);
    }

    #[test]
    fn gaps_at_the_threshold_split_segments() {
        let segments = build(
            &[Some(220.0), Some(220.0), None, None, Some(220.0)],
            2,
        );
        assert_eq!(segments.len(), 2, "two unvoiced frames at threshold 2");
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 1);
    }

    #[test]
    fn newest_sample_sits_at_the_right_edge() {
        let segments = build(&[Some(220.0), Some(220.0)], 3);
        let last = *segments[0].last().unwrap();
        assert!((last.0 - WIDTH).abs() < 1e-3);
        let first = segments[0][0];
        assert!(first.0 < last.0, "older samples sit further left");
    }

    #[test]
    fn x_positions_advance_with_now() {
        let base = Instant::now();
        let trace = samples(&[Some(220.0)], base);
        let at_append = build_segments(
            trace.iter().copied(),
            base,
            10.0,
            3,
            ViewRange::default(),
            WIDTH,
            HEIGHT,
        );
        let one_second_later = build_segments(
            trace.iter().copied(),
            base + Duration::from_secs(1),
            10.0,
            3,
            ViewRange::default(),
            WIDTH,
            HEIGHT,
        );
        let drift = at_append[0][0].0 - one_second_later[0][0].0;
        assert!(
            (drift - WIDTH / 10.0).abs() < 1e-2,
            "one second scrolls a tenth of the window, moved {drift}"
        );
    }

    #[test]
    fn all_unvoiced_yields_no_segments() {
        assert!(build(&[None, None, None], 3).is_empty());
    }

    #[test]
    fn leading_gap_does_not_split() {
        let segments = build(&[None, None, None, Some(220.0), Some(220.0)], 2);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 2);
    }
}
