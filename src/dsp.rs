//! Pitch estimation contracts and frame types.
//!
//! This module provides the shared plumbing for pitch estimators: the borrowed
//! audio-frame type, the estimate variant, and the traits an estimator
//! implements so the pipeline can drive it without knowing the algorithm.

pub mod yin;

/// Borrowed audio samples handed to a pitch detector for one analysis frame.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    /// Mono PCM samples in [-1, 1].
    pub samples: &'a [f32],
    /// Sample-rate of the upstream capture pipeline.
    pub sample_rate: f32,
}

impl<'a> AudioFrame<'a> {
    pub fn new(samples: &'a [f32], sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the analysis window: half the frame, truncating odd lengths.
    pub fn analysis_window(&self) -> usize {
        self.samples.len() / 2
    }
}

/// Result of analysing one [`AudioFrame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    /// A periodic signal was found. `period` is the refined lag in samples
    /// that produced the estimate.
    Voiced { frequency_hz: f32, period: f32 },
    /// No plausible periodicity in this frame.
    Unvoiced,
}

impl PitchEstimate {
    /// The estimated frequency, or `None` when unvoiced.
    pub fn frequency(&self) -> Option<f32> {
        match self {
            Self::Voiced { frequency_hz, .. } => Some(*frequency_hz),
            Self::Unvoiced => None,
        }
    }

    pub fn is_voiced(&self) -> bool {
        matches!(self, Self::Voiced { .. })
    }
}

/// Shared contract implemented by pitch detectors.
pub trait PitchDetector {
    /// Consume one frame and produce an estimate for it.
    fn process_frame(&mut self, frame: &AudioFrame<'_>) -> PitchEstimate;

    /// Clear all cross-frame state (smoothing history). Call when switching
    /// recording sessions.
    fn reset(&mut self);
}

/// Optional helper trait for components that accept lightweight configuration
/// updates mid-session.
pub trait Reconfigurable<Cfg> {
    fn update_config(&mut self, config: Cfg);
}
