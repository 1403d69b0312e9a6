//! Frequency/note conversion on the 12-TET MIDI scale.

const A440_HZ: f64 = 440.0;
const A440_MIDI: f64 = 69.0;
const SEMITONES_PER_OCTAVE: i32 = 12;
const MIDI_OCTAVE_OFFSET: i32 = 1;
const CENTS_PER_SEMITONE: f64 = 100.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a frequency to a fractional MIDI number: `12 * log2(f / 440) + 69`.
///
/// Returns `None` for zero, negative, or non-finite input.
#[inline]
pub fn hz_to_midi(freq_hz: f64) -> Option<f64> {
    if freq_hz <= 0.0 || !freq_hz.is_finite() {
        return None;
    }
    Some(SEMITONES_PER_OCTAVE as f64 * (freq_hz / A440_HZ).log2() + A440_MIDI)
}

/// Convert a (possibly fractional) MIDI number to a frequency in Hz.
#[inline]
pub fn midi_to_hz(midi: f64) -> f64 {
    A440_HZ * ((midi - A440_MIDI) / SEMITONES_PER_OCTAVE as f64).exp2()
}

/// A named note on the chromatic scale, with the deviation of the source
/// frequency from its equal-tempered center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicalNote {
    pub midi_number: i32,
    pub name: &'static str,
    pub octave: i32,
    /// Deviation from the note center in cents, in [-50, 50].
    pub cents: i32,
}

impl MusicalNote {
    /// Nearest note to the given frequency. `None` for non-positive or
    /// non-finite input.
    pub fn from_frequency(freq_hz: f64) -> Option<Self> {
        let midi_float = hz_to_midi(freq_hz)?;
        let midi_number = midi_float.round() as i32;
        let cents = ((midi_float - midi_number as f64) * CENTS_PER_SEMITONE).round() as i32;
        Some(Self::from_midi_with_cents(midi_number, cents))
    }

    /// The note at an exact integer MIDI number.
    pub fn from_midi(midi_number: i32) -> Self {
        Self::from_midi_with_cents(midi_number, 0)
    }

    fn from_midi_with_cents(midi_number: i32, cents: i32) -> Self {
        // Note index 0-11 with proper negative wrap-around.
        let note_index = ((midi_number % SEMITONES_PER_OCTAVE + SEMITONES_PER_OCTAVE)
            % SEMITONES_PER_OCTAVE) as usize;
        let octave = midi_number.div_euclid(SEMITONES_PER_OCTAVE) - MIDI_OCTAVE_OFFSET;

        Self {
            midi_number,
            name: NOTE_NAMES[note_index],
            octave,
            cents,
        }
    }

    /// Equal-tempered center frequency of this note.
    pub fn frequency_hz(&self) -> f64 {
        midi_to_hz(self.midi_number as f64)
    }

    pub fn format(&self) -> String {
        format!("{}{}", self.name, self.octave)
    }
}

/// All integer notes in `[min_midi, max_midi]` inclusive, ascending.
///
/// Empty when `min_midi > max_midi`.
pub fn note_range(min_midi: i32, max_midi: i32) -> Vec<MusicalNote> {
    if min_midi > max_midi {
        return Vec::new();
    }
    (min_midi..=max_midi).map(MusicalNote::from_midi).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi_round_trips_through_frequency() {
        for midi in 0..=127 {
            let freq = midi_to_hz(midi as f64);
            let back = hz_to_midi(freq).expect("positive frequency");
            assert!(
                (back - midi as f64).abs() < 1e-6,
                "midi {midi} round-tripped to {back}"
            );
        }
    }

    #[test]
    fn rejects_non_positive_frequencies() {
        assert!(hz_to_midi(0.0).is_none());
        assert!(hz_to_midi(-440.0).is_none());
        assert!(hz_to_midi(f64::NAN).is_none());
        assert!(MusicalNote::from_frequency(0.0).is_none());
    }

    #[test]
    fn names_reference_notes() {
        let a4 = MusicalNote::from_frequency(440.0).unwrap();
        assert_eq!(a4.midi_number, 69);
        assert_eq!(a4.name, "A");
        assert_eq!(a4.octave, 4);
        assert_eq!(a4.cents, 0);
        assert_eq!(a4.format(), "A4");

        let c4 = MusicalNote::from_frequency(261.63).unwrap();
        assert_eq!(c4.format(), "C4");
        assert_eq!(c4.midi_number, 60);
    }

    #[test]
    fn cents_stay_within_half_a_semitone() {
        // A quarter tone above A4 sits at +50 or -50 of a neighbor.
        for freq in [430.0, 435.0, 440.0, 445.0, 452.0] {
            let note = MusicalNote::from_frequency(freq).unwrap();
            assert!(
                (-50..=50).contains(&note.cents),
                "{freq} Hz gave {} cents",
                note.cents
            );
        }

        let sharp = MusicalNote::from_frequency(445.0).unwrap();
        assert_eq!(sharp.midi_number, 69);
        assert!(sharp.cents > 0);
    }

    #[test]
    fn note_range_is_inclusive_and_ascending() {
        let notes = note_range(57, 69);
        assert_eq!(notes.len(), 13);
        for pair in notes.windows(2) {
            assert_eq!(pair[1].midi_number, pair[0].midi_number + 1);
        }
        assert_eq!(notes.first().unwrap().format(), "A3");
        assert_eq!(notes.last().unwrap().format(), "A4");
        assert!((notes.last().unwrap().frequency_hz() - 440.0).abs() < 1e-9);
    }

    #[test]
    fn note_range_is_empty_when_inverted() {
        assert!(note_range(70, 69).is_empty());
        assert_eq!(note_range(69, 69).len(), 1);
    }

    #[test]
    fn octaves_wrap_below_c0() {
        let low = MusicalNote::from_midi(0);
        assert_eq!(low.name, "C");
        assert_eq!(low.octave, -1);

        let below = MusicalNote::from_midi(-1);
        assert_eq!(below.name, "B");
        assert_eq!(below.octave, -2);
    }
}
