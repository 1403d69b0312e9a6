//! Real-time vocal pitch tracing.
//!
//! `pitchtrace` turns a live audio stream into a rendering-ready record of
//! perceived pitch over time. The crate is a synchronous, single-threaded
//! computational core driven once per display refresh:
//!
//! 1. an acquisition collaborator hands the [`pipeline::Pipeline`] one audio
//!    frame per tick,
//! 2. the [`dsp::yin::YinDetector`] estimates a fundamental frequency for it
//!    (or judges the frame unvoiced),
//! 3. the [`trace::engine::TraceEngine`] appends the result to its rolling
//!    window and, on demand, produces a [`trace::engine::TraceFrame`] draw
//!    model — semitone grid lines, gap-tolerant polyline segments, and
//!    mode-dependent overlays — for an external rasterizer to paint.
//!
//! Device capture, input-event translation, and pixel-level painting are
//! deliberately out of scope; they talk to this core through
//! [`pipeline::FrameSource`], the engine's setters, and the draw model.

pub mod dsp;
pub mod pipeline;
pub mod trace;
pub mod util;

pub use dsp::yin::{YinConfig, YinDetector};
pub use dsp::{AudioFrame, PitchDetector, PitchEstimate, Reconfigurable};
pub use pipeline::{FrameSource, Pipeline};
pub use trace::engine::{TraceEngine, TraceFrame};
pub use trace::{DisplayMode, TraceConfig};
