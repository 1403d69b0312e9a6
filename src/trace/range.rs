//! Visible note range and one-shot auto-ranging.

use crate::util::musical;
use tracing::{debug, info};

pub const MIN_RANGE_SEMITONES: f32 = 6.0;
pub const MAX_RANGE_SEMITONES: f32 = 120.0;
const DEFAULT_MIN_NOTE: f32 = 36.0; // C2
const DEFAULT_MAX_NOTE: f32 = 84.0; // C6
const ZOOM_STEP_FACTOR: f32 = 1.2;
const AUTO_RANGE_HALF_SPAN: f64 = 18.0;

/// The visible window in fractional MIDI units. Width stays within
/// [`MIN_RANGE_SEMITONES`, `MAX_RANGE_SEMITONES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRange {
    pub min_note: f32,
    pub max_note: f32,
}

impl Default for ViewRange {
    fn default() -> Self {
        Self {
            min_note: DEFAULT_MIN_NOTE,
            max_note: DEFAULT_MAX_NOTE,
        }
    }
}

impl ViewRange {
    pub fn new(min_note: f32, max_note: f32) -> Self {
        Self { min_note, max_note }.clamped()
    }

    pub fn width(&self) -> f32 {
        self.max_note - self.min_note
    }

    pub fn center(&self) -> f32 {
        (self.min_note + self.max_note) * 0.5
    }

    /// Re-center the range at its current midpoint with width clamped to the
    /// legal span.
    pub fn clamped(self) -> Self {
        let width = self
            .width()
            .clamp(MIN_RANGE_SEMITONES, MAX_RANGE_SEMITONES);
        let center = self.center();
        Self {
            min_note: center - width * 0.5,
            max_note: center + width * 0.5,
        }
    }

    /// Scale the visible width by `1.2^delta`; positive widens (zoom out),
    /// negative narrows (zoom in). The midpoint is preserved.
    pub fn zoom(&mut self, delta: f32) {
        let center = self.center();
        let width = (self.width() * ZOOM_STEP_FACTOR.powf(delta))
            .clamp(MIN_RANGE_SEMITONES, MAX_RANGE_SEMITONES);
        self.min_note = center - width * 0.5;
        self.max_note = center + width * 0.5;
    }

    /// Shift the range by a pixel drag. Positive `delta_pixels` moves content
    /// down; the shift is a fraction of the current width, so panning scales
    /// with zoom level.
    pub fn pan_pixels(&mut self, delta_pixels: f32, height: f32, sensitivity: f32) {
        if height <= 0.0 {
            return;
        }
        let shift = -(delta_pixels / height) * self.width() * sensitivity;
        self.min_note += shift;
        self.max_note += shift;
    }

    /// Map a (fractional) MIDI note to a vertical position: higher pitch is
    /// higher on screen. Notes outside the range map outside [0, height]
    /// without clamping.
    pub fn note_to_y(&self, note: f32, height: f32) -> f32 {
        let width = self.width().max(f32::EPSILON);
        height - ((note - self.min_note) / width) * height
    }
}

/// Collect-once auto-ranging: gathers early voiced samples, then centers a
/// fixed three-octave window on their mean pitch. Terminal until cleared.
#[derive(Debug, Clone)]
pub struct AutoRange {
    enabled: bool,
    has_ranged: bool,
    pending: Vec<f32>,
    target_samples: usize,
}

impl AutoRange {
    pub fn new(target_samples: usize) -> Self {
        Self {
            enabled: true,
            has_ranged: false,
            pending: Vec::with_capacity(target_samples),
            target_samples: target_samples.max(1),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_target_samples(&mut self, target_samples: usize) {
        self.target_samples = target_samples.max(1);
    }

    pub fn has_ranged(&self) -> bool {
        self.has_ranged
    }

    /// Re-enter the collecting state with the pending buffer emptied.
    pub fn clear(&mut self) {
        if self.has_ranged || !self.pending.is_empty() {
            debug!("auto-range re-armed");
        }
        self.has_ranged = false;
        self.pending.clear();
    }

    /// Feed one voiced frequency. Returns the locked view once enough samples
    /// have accumulated, exactly once per collecting cycle.
    pub fn observe(&mut self, frequency_hz: f32) -> Option<ViewRange> {
        if !self.enabled || self.has_ranged {
            return None;
        }

        self.pending.push(frequency_hz);
        if self.pending.len() < self.target_samples {
            return None;
        }

        let mean = self.pending.iter().sum::<f32>() / self.pending.len() as f32;
        self.pending.clear();
        self.has_ranged = true;

        let midi = musical::hz_to_midi(mean as f64)?;
        let range = ViewRange {
            min_note: (midi - AUTO_RANGE_HALF_SPAN).round() as f32,
            max_note: (midi + AUTO_RANGE_HALF_SPAN).round() as f32,
        };
        info!(
            "auto-range locked to [{}, {}] around {mean:.1} Hz",
            range.min_note, range.max_note
        );
        Some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_out_never_exceeds_the_widest_span() {
        let mut view = ViewRange::default();
        for _ in 0..60 {
            view.zoom(1.0);
        }
        assert!(view.width() <= MAX_RANGE_SEMITONES + 1e-3);
        assert!((view.center() - 60.0).abs() < 1e-3, "midpoint preserved");
    }

    #[test]
    fn zoom_in_never_shrinks_below_the_narrowest_span() {
        let mut view = ViewRange::default();
        for _ in 0..100 {
            view.zoom(-1.0);
        }
        assert!(view.width() >= MIN_RANGE_SEMITONES - 1e-3);
        assert!((view.center() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_scales_width_geometrically() {
        let mut view = ViewRange::new(48.0, 72.0);
        view.zoom(1.0);
        assert!((view.width() - 28.8).abs() < 1e-3);
        view.zoom(-1.0);
        assert!((view.width() - 24.0).abs() < 1e-3);
    }

    #[test]
    fn pan_shifts_by_a_fraction_of_the_width() {
        let mut view = ViewRange::new(36.0, 84.0);
        view.pan_pixels(48.0, 480.0, 0.05);
        // -(48 / 480) * 48 * 0.05 = -0.24 semitones.
        assert!((view.min_note - 35.76).abs() < 1e-4);
        assert!((view.max_note - 83.76).abs() < 1e-4);
        assert!((view.width() - 48.0).abs() < 1e-4, "width unchanged by pan");
    }

    #[test]
    fn note_mapping_is_linear_and_inverted() {
        let view = ViewRange::new(57.0, 81.0);
        assert_eq!(view.note_to_y(57.0, 240.0), 240.0);
        assert_eq!(view.note_to_y(81.0, 240.0), 0.0);
        assert_eq!(view.note_to_y(69.0, 240.0), 120.0);
        // Out-of-range notes map off screen, unclamped.
        assert!(view.note_to_y(85.0, 240.0) < 0.0);
        assert!(view.note_to_y(50.0, 240.0) > 240.0);
    }

    #[test]
    fn auto_range_locks_once_at_the_sample_target() {
        let mut auto = AutoRange::new(10);
        for _ in 0..9 {
            assert!(auto.observe(220.0).is_none());
        }
        let view = auto.observe(220.0).expect("tenth sample locks the view");
        assert_eq!(view.min_note, 39.0);
        assert_eq!(view.max_note, 75.0);
        assert!(auto.has_ranged());

        // The eleventh sample must not re-trigger.
        assert!(auto.observe(880.0).is_none());
    }

    #[test]
    fn auto_range_clear_re_enters_collecting() {
        let mut auto = AutoRange::new(2);
        auto.observe(440.0);
        auto.observe(440.0).expect("locked");
        auto.clear();
        assert!(!auto.has_ranged());
        auto.observe(220.0);
        let view = auto.observe(220.0).expect("locks again after clear");
        assert_eq!(view.min_note, 39.0);
    }

    #[test]
    fn auto_range_ignores_samples_while_disabled() {
        let mut auto = AutoRange::new(1);
        auto.set_enabled(false);
        assert!(auto.observe(440.0).is_none());
        assert!(!auto.has_ranged());
        auto.set_enabled(true);
        assert!(auto.observe(440.0).is_some());
    }
}
