//! The trace engine: rolling window, view state, and draw-model production.

use super::range::{AutoRange, ViewRange};
use super::{DisplayMode, PitchSample, TraceConfig, clamp_config, polyline};
use crate::dsp::Reconfigurable;
use crate::util::musical;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// One horizontal grid line at an integer semitone.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub midi: i32,
    pub y: f32,
    pub label: String,
}

/// Mode-dependent overlay geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// Dashed horizontal reference line at the target pitch.
    TargetLine { y: f32 },
    /// Shaded band between the highest (`top`) and lowest (`bottom`)
    /// frequency observed in Range mode.
    Band { top: f32, bottom: f32 },
}

/// Everything a rasterizer needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub view: ViewRange,
    pub grid: Vec<GridLine>,
    pub segments: Vec<Vec<polyline::Point>>,
    pub overlay: Option<Overlay>,
}

/// Owns the rolling sample window, the visible note range, auto-ranging and
/// the display mode. Driven synchronously from the render tick: `append` once
/// per estimate, `produce_frame` once per paint.
#[derive(Debug, Clone)]
pub struct TraceEngine {
    config: TraceConfig,
    window: VecDeque<PitchSample>,
    view: ViewRange,
    auto_range: AutoRange,
    mode: DisplayMode,
}

impl TraceEngine {
    pub fn new(config: TraceConfig) -> Self {
        let config = clamp_config(config);
        Self {
            config,
            window: VecDeque::new(),
            view: ViewRange::default(),
            auto_range: AutoRange::new(config.auto_range_samples),
            mode: DisplayMode::Normal,
        }
    }

    pub fn config(&self) -> TraceConfig {
        self.config
    }

    pub fn view(&self) -> ViewRange {
        self.view
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Record one estimate. Timestamps must be non-decreasing; the window is
    /// trimmed against the newest timestamp on every append.
    pub fn append(&mut self, frequency_hz: Option<f32>, timestamp: Instant) {
        if let Some(frequency) = frequency_hz {
            if let Some(view) = self.auto_range.observe(frequency) {
                self.view = view.clamped();
            }
            if let DisplayMode::Range {
                min_observed,
                max_observed,
            } = &mut self.mode
            {
                *min_observed = Some(min_observed.map_or(frequency, |m| m.min(frequency)));
                *max_observed = Some(max_observed.map_or(frequency, |m| m.max(frequency)));
            }
        }

        self.window.push_back(PitchSample {
            frequency_hz,
            timestamp,
        });
        self.trim(timestamp);
    }

    fn trim(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(Duration::from_secs_f32(self.config.time_window_seconds))
        else {
            return;
        };
        while let Some(front) = self.window.front() {
            if front.timestamp <= cutoff {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Produce the draw model for the given clock and drawable size. Pure:
    /// the clock is an explicit input, so frames are reproducible in tests.
    pub fn produce_frame(&self, now: Instant, width: f32, height: f32) -> TraceFrame {
        TraceFrame {
            view: self.view,
            grid: self.grid_lines(height),
            segments: polyline::build_segments(
                self.window.iter().copied(),
                now,
                self.config.time_window_seconds,
                self.config.gap_threshold,
                self.view,
                width,
                height,
            ),
            overlay: self.overlay(height),
        }
    }

    fn grid_lines(&self, height: f32) -> Vec<GridLine> {
        let min_midi = self.view.min_note.ceil() as i32;
        let max_midi = self.view.max_note.floor() as i32;
        musical::note_range(min_midi, max_midi)
            .into_iter()
            .map(|note| GridLine {
                midi: note.midi_number,
                y: self.view.note_to_y(note.midi_number as f32, height),
                label: note.format(),
            })
            .collect()
    }

    fn overlay(&self, height: f32) -> Option<Overlay> {
        match self.mode {
            DisplayMode::Normal => None,
            DisplayMode::Target { frequency_hz } => {
                let midi = musical::hz_to_midi(frequency_hz as f64)?;
                Some(Overlay::TargetLine {
                    y: self.view.note_to_y(midi as f32, height),
                })
            }
            DisplayMode::Range {
                min_observed,
                max_observed,
            } => {
                let low = musical::hz_to_midi(min_observed? as f64)?;
                let high = musical::hz_to_midi(max_observed? as f64)?;
                Some(Overlay::Band {
                    top: self.view.note_to_y(high as f32, height),
                    bottom: self.view.note_to_y(low as f32, height),
                })
            }
        }
    }

    /// Switch display mode. Entering a mode resets the state it accumulates;
    /// entering Range also clears the rolling window. Any mode switch re-arms
    /// auto-range.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = match mode {
            DisplayMode::Normal => DisplayMode::Normal,
            DisplayMode::Target { frequency_hz } => DisplayMode::Target { frequency_hz },
            DisplayMode::Range { .. } => {
                self.window.clear();
                DisplayMode::Range {
                    min_observed: None,
                    max_observed: None,
                }
            }
        };
        self.auto_range.clear();
        debug!("display mode set to {:?}", self.mode);
    }

    /// Update the target pitch. Only meaningful in Target mode; ignored
    /// otherwise.
    pub fn set_target_frequency(&mut self, hz: f32) {
        if let DisplayMode::Target { frequency_hz } = &mut self.mode {
            *frequency_hz = hz;
        } else {
            debug!("target frequency ignored outside Target mode");
        }
    }

    /// Scale the visible width by `1.2^delta` around the current midpoint.
    pub fn zoom(&mut self, delta: f32) {
        self.view.zoom(delta);
    }

    /// Shift the view by a pixel drag against the given drawable height.
    pub fn pan(&mut self, delta_pixels: f32, height: f32) {
        self.view
            .pan_pixels(delta_pixels, height, self.config.pan_sensitivity);
    }

    /// Takes effect on the next trim; already-kept samples are not reshaped.
    pub fn set_time_window(&mut self, seconds: f32) {
        self.config.time_window_seconds =
            seconds.clamp(super::MIN_TIME_WINDOW_SECONDS, super::MAX_TIME_WINDOW_SECONDS);
    }

    pub fn set_gap_threshold(&mut self, count: usize) {
        self.config.gap_threshold = count.max(super::MIN_GAP_THRESHOLD);
    }

    pub fn set_auto_range(&mut self, enabled: bool) {
        self.auto_range.set_enabled(enabled);
    }

    /// Drop all recorded samples, re-arm auto-range, and empty the Range-mode
    /// accumulators. The view range and configuration persist.
    pub fn clear(&mut self) {
        self.window.clear();
        self.auto_range.clear();
        if let DisplayMode::Range {
            min_observed,
            max_observed,
        } = &mut self.mode
        {
            *min_observed = None;
            *max_observed = None;
        }
    }
}

impl Default for TraceEngine {
    fn default() -> Self {
        Self::new(TraceConfig::default())
    }
}

impl Reconfigurable<TraceConfig> for TraceEngine {
    fn update_config(&mut self, config: TraceConfig) {
        let clamped = clamp_config(config);
        self.auto_range
            .set_target_samples(clamped.auto_range_samples);
        self.config = clamped;
    }
}
