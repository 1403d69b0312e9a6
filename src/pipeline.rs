//! The per-tick driver coupling acquisition, estimation, and the trace.
//!
//! Acquisition is an external collaborator: the pipeline only polls it for
//! the most recent complete buffer. A tick with no frame available counts as
//! an unvoiced sample so the trace keeps scrolling through dropouts.

use crate::dsp::{AudioFrame, PitchDetector, PitchEstimate};
use crate::trace::engine::{TraceEngine, TraceFrame};
use std::time::Instant;
use tracing::info;

/// Polling boundary to the audio acquisition collaborator.
pub trait FrameSource {
    /// Sample rate the source captures at, in Hz.
    fn sample_rate(&self) -> f32;

    /// The most recent complete buffer, or `None` when no usable frame is
    /// available (device starved, or below the caller's noise gate).
    fn next_frame(&mut self) -> Option<&[f32]>;
}

/// Single-threaded render-tick pipeline: one estimate and one window append
/// per tick, one draw model per paint.
pub struct Pipeline<S, D> {
    source: S,
    detector: D,
    engine: TraceEngine,
}

impl<S, D> Pipeline<S, D>
where
    S: FrameSource,
    D: PitchDetector,
{
    pub fn new(source: S, detector: D, engine: TraceEngine) -> Self {
        Self {
            source,
            detector,
            engine,
        }
    }

    /// Pull one frame, estimate its pitch, and append the result at `now`.
    /// Returns the estimate recorded for this tick.
    pub fn tick(&mut self, now: Instant) -> PitchEstimate {
        let sample_rate = self.source.sample_rate();
        let estimate = match self.source.next_frame() {
            Some(samples) => self
                .detector
                .process_frame(&AudioFrame::new(samples, sample_rate)),
            None => PitchEstimate::Unvoiced,
        };
        self.engine.append(estimate.frequency(), now);
        estimate
    }

    /// Produce the draw model for the current state.
    pub fn frame(&self, now: Instant, width: f32, height: f32) -> TraceFrame {
        self.engine.produce_frame(now, width, height)
    }

    /// Start a fresh session: smoothing history and recorded samples go,
    /// view range and configuration stay.
    pub fn reset(&mut self) {
        info!("pipeline reset");
        self.detector.reset();
        self.engine.clear();
    }

    pub fn engine(&self) -> &TraceEngine {
        &self.engine
    }

    /// Control-surface access for zoom/pan/mode/setter wiring.
    pub fn engine_mut(&mut self) -> &mut TraceEngine {
        &mut self.engine
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }
}
