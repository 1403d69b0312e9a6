//! Pitch-trace visualization core.
//!
//! Turns the time-stamped estimate stream into a rendering-ready draw model:
//! a scrolling, gap-tolerant polyline over a semitone grid, with zoom, pan,
//! one-shot auto-ranging and mode-dependent overlays. Nothing here touches a
//! painting surface; the rasterizer consumes [`engine::TraceFrame`].

pub mod engine;
pub mod polyline;
pub mod range;

use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const MIN_TIME_WINDOW_SECONDS: f32 = 5.0;
pub const MAX_TIME_WINDOW_SECONDS: f32 = 30.0;
const DEFAULT_TIME_WINDOW_SECONDS: f32 = 10.0;
pub const MIN_GAP_THRESHOLD: usize = 1;
const DEFAULT_GAP_THRESHOLD: usize = 3;
const DEFAULT_PAN_SENSITIVITY: f32 = 0.05;
const DEFAULT_AUTO_RANGE_SAMPLES: usize = 10;

/// One estimator result as stored by the rolling window. `frequency_hz` is
/// `None` for unvoiced or below-gate frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSample {
    pub frequency_hz: Option<f32>,
    pub timestamp: Instant,
}

/// The active display mode, with its mode-specific state in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DisplayMode {
    Normal,
    /// Draw a dashed reference line at a fixed target frequency.
    Target { frequency_hz: f32 },
    /// Shade the band between the lowest and highest frequency observed
    /// since the mode was entered.
    Range {
        min_observed: Option<f32>,
        max_observed: Option<f32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// How much history the rolling window keeps, in seconds.
    pub time_window_seconds: f32,
    /// Unvoiced runs shorter than this are bridged; longer runs split the
    /// polyline into a new segment.
    pub gap_threshold: usize,
    /// Fraction of the visible range a full-height drag pans.
    pub pan_sensitivity: f32,
    /// Voiced samples collected before auto-range locks the view.
    pub auto_range_samples: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            time_window_seconds: DEFAULT_TIME_WINDOW_SECONDS,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            pan_sensitivity: DEFAULT_PAN_SENSITIVITY,
            auto_range_samples: DEFAULT_AUTO_RANGE_SAMPLES,
        }
    }
}

pub(crate) fn clamp_config(mut config: TraceConfig) -> TraceConfig {
    config.time_window_seconds = config
        .time_window_seconds
        .clamp(MIN_TIME_WINDOW_SECONDS, MAX_TIME_WINDOW_SECONDS);
    config.gap_threshold = config.gap_threshold.max(MIN_GAP_THRESHOLD);
    config.pan_sensitivity = config.pan_sensitivity.clamp(0.001, 1.0);
    config.auto_range_samples = config.auto_range_samples.max(1);
    config
}
