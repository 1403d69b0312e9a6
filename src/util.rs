//! Utility functions and types for pitchtrace.

pub mod musical;
pub mod telemetry;

pub use musical::{MusicalNote, hz_to_midi, midi_to_hz, note_range};
