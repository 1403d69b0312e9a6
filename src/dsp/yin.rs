//! YIN fundamental-frequency estimation.
//!
//! Time-domain implementation of the YIN algorithm: squared difference over
//! candidate lags, cumulative mean normalization, absolute-threshold dip
//! search, and parabolic refinement of the winning lag. The difference
//! function is O(N²/4) and dominates the cost of a frame; it sits behind
//! [`PitchDetector`] so it can be swapped for an FFT-based autocorrelation
//! without touching callers.

use super::{AudioFrame, PitchDetector, PitchEstimate, Reconfigurable};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_THRESHOLD: f32 = 0.01;
pub const MAX_THRESHOLD: f32 = 0.5;
const DEFAULT_THRESHOLD: f32 = 0.12;
pub const MIN_SMOOTHING: f32 = 0.0;
pub const MAX_SMOOTHING: f32 = 0.95;
const DEFAULT_SMOOTHING: f32 = 0.3;
const DEFAULT_MIN_FREQUENCY_HZ: f32 = 50.0;
const DEFAULT_MAX_FREQUENCY_HZ: f32 = 2_000.0;
const DEFAULT_SEARCH_CEILING_HZ: f32 = 1_000.0;
const DEFAULT_POWER_GATE: f32 = 1.0e-6;
const DEFAULT_UNVOICED_RELEASE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YinConfig {
    /// Absolute cmndf threshold for the dip search. Lower is more sensitive.
    pub threshold: f32,
    /// IIR smoothing factor: `smoothed = last * smoothing + raw * (1 - smoothing)`.
    pub smoothing: f32,
    /// Estimates below this frequency are rejected as implausible.
    pub min_frequency_hz: f32,
    /// Estimates above this frequency are rejected as implausible.
    pub max_frequency_hz: f32,
    /// Upper bound on detectable frequency; sets the first lag searched.
    pub search_ceiling_hz: f32,
    /// Frames with mean power below this are unvoiced without analysis.
    pub power_gate: f32,
    /// Consecutive unvoiced frames after which smoothing history is dropped.
    /// Zero retains the history indefinitely.
    pub unvoiced_release: usize,
}

impl Default for YinConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            smoothing: DEFAULT_SMOOTHING,
            min_frequency_hz: DEFAULT_MIN_FREQUENCY_HZ,
            max_frequency_hz: DEFAULT_MAX_FREQUENCY_HZ,
            search_ceiling_hz: DEFAULT_SEARCH_CEILING_HZ,
            power_gate: DEFAULT_POWER_GATE,
            unvoiced_release: DEFAULT_UNVOICED_RELEASE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct YinDetector {
    config: YinConfig,
    diff: Vec<f32>,
    cmndf: Vec<f32>,
    last_smoothed: Option<f32>,
    unvoiced_run: usize,
}

impl YinDetector {
    pub fn new(config: YinConfig) -> Self {
        Self {
            config: clamp_config(config),
            diff: Vec::new(),
            cmndf: Vec::new(),
            last_smoothed: None,
            unvoiced_run: 0,
        }
    }

    pub fn config(&self) -> YinConfig {
        self.config
    }

    /// The smoothed frequency carried between frames, if any.
    pub fn last_smoothed(&self) -> Option<f32> {
        self.last_smoothed
    }

    fn analyse(&mut self, frame: &AudioFrame<'_>) -> Option<(f32, f32)> {
        let window = frame.analysis_window();
        let sample_rate = frame.sample_rate.max(1.0);
        let tau_min = ((sample_rate / self.config.search_ceiling_hz).floor() as usize).max(1);

        if window == 0 || tau_min >= window {
            return None;
        }
        if mean_power(frame.samples) < self.config.power_gate {
            return None;
        }

        self.difference(frame.samples, window);
        self.normalize(window);

        let tau = self.find_dip(tau_min, window)?;
        let period = self.refine(tau, window);
        let frequency = sample_rate / period;

        if frequency < self.config.min_frequency_hz || frequency > self.config.max_frequency_hz {
            return None;
        }

        Some((frequency, period))
    }

    /// Squared difference `d(τ) = Σ (x[i] - x[i+τ])²` over the analysis window.
    fn difference(&mut self, samples: &[f32], window: usize) {
        self.diff.clear();
        self.diff.resize(window, 0.0);

        for (tau, slot) in self.diff.iter_mut().enumerate() {
            *slot = samples[..window]
                .iter()
                .zip(&samples[tau..tau + window])
                .map(|(a, b)| {
                    let d = a - b;
                    d * d
                })
                .sum();
        }
    }

    /// Cumulative mean normalized difference: `cmndf(τ) = d(τ)·τ / Σ_{1..=τ} d`.
    fn normalize(&mut self, window: usize) {
        self.cmndf.clear();
        self.cmndf.resize(window, 1.0);

        let mut running_sum = 0.0f64;
        for tau in 1..window {
            running_sum += self.diff[tau] as f64;
            if running_sum > 0.0 {
                self.cmndf[tau] = (self.diff[tau] as f64 * tau as f64 / running_sum) as f32;
            }
        }
    }

    /// First lag under the threshold, walked downhill to its local minimum.
    fn find_dip(&self, tau_min: usize, window: usize) -> Option<usize> {
        let mut tau = tau_min;
        while tau < window {
            if self.cmndf[tau] < self.config.threshold {
                while tau + 1 < window && self.cmndf[tau + 1] < self.cmndf[tau] {
                    tau += 1;
                }
                return Some(tau);
            }
            tau += 1;
        }
        None
    }

    /// Parabolic interpolation of the dip against its neighbors. Skipped at
    /// the buffer edges, where a neighbor is missing.
    fn refine(&self, tau: usize, window: usize) -> f32 {
        if tau == 0 || tau + 1 >= window {
            return tau as f32;
        }
        let s0 = self.cmndf[tau - 1];
        let s1 = self.cmndf[tau];
        let s2 = self.cmndf[tau + 1];
        let denom = 2.0 * (2.0 * s1 - s2 - s0);
        if denom.abs() <= f32::EPSILON {
            return tau as f32;
        }
        tau as f32 + (s2 - s0) / denom
    }
}

impl Default for YinDetector {
    fn default() -> Self {
        Self::new(YinConfig::default())
    }
}

impl PitchDetector for YinDetector {
    fn process_frame(&mut self, frame: &AudioFrame<'_>) -> PitchEstimate {
        match self.analyse(frame) {
            Some((raw, period)) => {
                self.unvoiced_run = 0;
                let alpha = self.config.smoothing;
                let smoothed = match self.last_smoothed {
                    Some(last) => last * alpha + raw * (1.0 - alpha),
                    None => raw,
                };
                self.last_smoothed = Some(smoothed);
                PitchEstimate::Voiced {
                    frequency_hz: smoothed,
                    period,
                }
            }
            None => {
                self.unvoiced_run = self.unvoiced_run.saturating_add(1);
                let release = self.config.unvoiced_release;
                if release > 0
                    && self.unvoiced_run >= release
                    && self.last_smoothed.take().is_some()
                {
                    debug!(
                        "smoothing history dropped after {} unvoiced frames",
                        self.unvoiced_run
                    );
                }
                PitchEstimate::Unvoiced
            }
        }
    }

    fn reset(&mut self) {
        self.last_smoothed = None;
        self.unvoiced_run = 0;
    }
}

impl Reconfigurable<YinConfig> for YinDetector {
    /// Sensitivity and smoothing may change mid-session; smoothing history is
    /// kept so the trace does not jump on a settings change.
    fn update_config(&mut self, config: YinConfig) {
        self.config = clamp_config(config);
    }
}

fn clamp_config(mut config: YinConfig) -> YinConfig {
    config.threshold = config.threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
    config.smoothing = config.smoothing.clamp(MIN_SMOOTHING, MAX_SMOOTHING);
    config.min_frequency_hz = config.min_frequency_hz.max(1.0);
    config.max_frequency_hz = config.max_frequency_hz.max(config.min_frequency_hz);
    config.search_ceiling_hz = config.search_ceiling_hz.max(1.0);
    config.power_gate = config.power_gate.max(0.0);
    config
}

#[inline]
fn mean_power(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32
}
