//! Turning timestamped keypresses into hit/miss judgments
//!
//! An input belongs to whichever beat's half-interval span contains it. It is a
//! hit when it also falls inside that beat's judgment window and the beat has
//! not already been hit. Beats nobody played are reported by [`SkipDetector`].

use serde::{Deserialize, Serialize};

use crate::rhythm::clock::RhythmClock;

/// Timing grade of a judged input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// Within half the tolerance
    Perfect,
    /// Within the tolerance
    Good,
    Miss,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::Perfect => "Perfect!",
            Grade::Good => "Good",
            Grade::Miss => "Miss",
        }
    }
}

/// Result of judging one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Beat the input was attributed to (None outside the song)
    pub beat: Option<u32>,
    /// Signed distance from the beat in seconds (negative = early)
    pub offset: f64,
    pub grade: Grade,
}

impl Judgment {
    pub fn is_hit(&self) -> bool {
        !matches!(self.grade, Grade::Miss)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BeatMark {
    /// Any input landed in this beat's span
    touched: bool,
    /// A successful input was already credited to this beat
    hit: bool,
}

/// Per-match judge state
#[derive(Debug, Clone)]
pub struct InputJudge {
    clock: RhythmClock,
    /// Rounded beat times, index 0 = beat 1
    beat_times: Vec<f64>,
    marks: Vec<BeatMark>,
}

impl InputJudge {
    pub fn new(clock: RhythmClock) -> Self {
        let beat_times: Vec<f64> = clock.beats().iter().map(|b| b.time).collect();
        let marks = vec![BeatMark::default(); beat_times.len()];
        Self {
            clock,
            beat_times,
            marks,
        }
    }

    pub fn clock(&self) -> &RhythmClock {
        &self.clock
    }

    /// Beat whose half-interval span contains `t`
    fn beat_for(&self, t: f64) -> Option<u32> {
        let nearest = (t / self.clock.beat_interval()).round();
        if nearest < 1.0 || nearest > self.beat_times.len() as f64 {
            return None;
        }
        Some(nearest as u32)
    }

    /// Judge an input arriving at song time `t` and record it against its beat
    pub fn judge(&mut self, t: f64) -> Judgment {
        let Some(beat) = self.beat_for(t) else {
            return Judgment {
                beat: None,
                offset: 0.0,
                grade: Grade::Miss,
            };
        };

        let slot = (beat - 1) as usize;
        let offset = t - self.beat_times[slot];
        let tolerance = self.clock.tolerance();
        let mark = &mut self.marks[slot];
        mark.touched = true;

        // A second press on an already credited beat is off the rhythm
        let grade = if mark.hit || offset.abs() > tolerance + 1e-9 {
            Grade::Miss
        } else if offset.abs() <= tolerance / 2.0 {
            Grade::Perfect
        } else {
            Grade::Good
        };

        if grade != Grade::Miss {
            mark.hit = true;
        }

        Judgment {
            beat: Some(beat),
            offset,
            grade,
        }
    }

    /// Whether any input (hit or miss) was attributed to `beat`
    pub fn was_touched(&self, beat: u32) -> bool {
        beat >= 1
            && self
                .marks
                .get((beat - 1) as usize)
                .map(|m| m.touched)
                .unwrap_or(false)
    }

    pub fn was_hit(&self, beat: u32) -> bool {
        beat >= 1
            && self
                .marks
                .get((beat - 1) as usize)
                .map(|m| m.hit)
                .unwrap_or(false)
    }
}

/// Emits the `skip` pseudo-input for beats that received no input at all
///
/// A beat is settled once song time reaches the midpoint after it; inputs past
/// that point belong to the next beat.
#[derive(Debug, Clone)]
pub struct SkipDetector {
    midpoints: Vec<f64>,
    cursor: usize,
}

impl SkipDetector {
    pub fn new(clock: &RhythmClock) -> Self {
        Self {
            midpoints: clock.skip_midpoints(),
            cursor: 0,
        }
    }

    /// Beats whose midpoint passed since the last poll without any input, in order
    pub fn poll(&mut self, song_time: f64, judge: &InputJudge) -> Vec<u32> {
        let mut skipped = Vec::new();
        while self.cursor < self.midpoints.len() && song_time >= self.midpoints[self.cursor] {
            let beat = self.cursor as u32 + 1;
            if !judge.was_touched(beat) {
                skipped.push(beat);
            }
            self.cursor += 1;
        }
        skipped
    }

    /// Number of beats already settled
    pub fn settled(&self) -> usize {
        self.cursor
    }
}
