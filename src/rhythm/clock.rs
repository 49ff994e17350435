//! Beat timeline derived from tempo and song length
//!
//! Everything here is a pure function of the clock parameters. Beat 0 (time
//! zero) is never emitted: the first playable beat is index 1.

use serde::{Deserialize, Serialize};

use crate::core::config::RhythmConfig;

/// One beat of the master timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub index: u32,
    /// Seconds from song start
    pub time: f64,
    /// 1-based bar number (four beats per bar)
    pub bar: u32,
    /// 1-based position inside the bar
    pub beat_in_bar: u32,
}

/// Interval around a beat inside which an input counts as on time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentWindow {
    pub beat: u32,
    pub time: f64,
    pub start: f64,
    pub end: f64,
}

impl JudgmentWindow {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// The half-beat span on either side of a beat; decides which beat an input belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatSpan {
    pub beat: u32,
    pub start: f64,
    pub end: f64,
}

/// Summary of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetadata {
    pub bpm: f64,
    pub beat_interval: f64,
    pub total_beats: u32,
    pub tolerance: f64,
    pub offset: f64,
    pub duration: f64,
}

/// Tempo-driven clock for one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmClock {
    bpm: f64,
    tolerance: f64,
    offset: f64,
    duration: f64,
}

/// Round to millisecond precision, as the beat tables are stored
fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

impl RhythmClock {
    pub fn new(bpm: f64, tolerance: f64, offset: f64, time_limit_minutes: f64) -> Self {
        Self {
            bpm,
            tolerance,
            offset,
            duration: time_limit_minutes * 60.0,
        }
    }

    /// Clock using the configured defaults, optionally overridden by a stage's tempo/offset
    pub fn from_config(config: &RhythmConfig, bpm: Option<f32>, offset: Option<f32>) -> Self {
        Self::new(
            bpm.unwrap_or(config.default_bpm) as f64,
            config.tolerance as f64,
            offset.unwrap_or(config.default_offset) as f64,
            config.time_limit_minutes as f64,
        )
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Song length in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Seconds per beat
    pub fn beat_interval(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Number of emitted beats: every whole beat in the song except beat 0
    pub fn total_beats(&self) -> u32 {
        // duration * bpm / 60 avoids the 0.999.. drift of dividing by the interval
        let whole = (self.duration * self.bpm / 60.0 + 1e-9).floor() as i64;
        (whole - 1).max(0) as u32
    }

    /// Time of beat `index` (unrounded)
    fn beat_time(&self, index: u32) -> f64 {
        index as f64 * self.beat_interval()
    }

    /// The master beat list
    pub fn beats(&self) -> Vec<Beat> {
        (1..=self.total_beats())
            .map(|index| Beat {
                index,
                time: round_ms(self.beat_time(index)),
                bar: index / 4 + 1,
                beat_in_bar: index % 4 + 1,
            })
            .collect()
    }

    pub fn judgment_windows(&self) -> Vec<JudgmentWindow> {
        self.beats()
            .into_iter()
            .map(|beat| JudgmentWindow {
                beat: beat.index,
                time: beat.time,
                start: beat.time - self.tolerance,
                end: beat.time + self.tolerance,
            })
            .collect()
    }

    pub fn beat_spans(&self) -> Vec<BeatSpan> {
        let half = self.beat_interval() / 2.0;
        self.beats()
            .into_iter()
            .map(|beat| BeatSpan {
                beat: beat.index,
                start: beat.time - half,
                end: beat.time + half,
            })
            .collect()
    }

    /// Beat times shifted earlier by the output latency offset, for scheduling clicks/music
    pub fn audio_cues(&self) -> Vec<Beat> {
        self.beats()
            .into_iter()
            .map(|beat| Beat {
                time: round_ms(beat.time - self.offset),
                ..beat
            })
            .collect()
    }

    /// Midpoints between consecutive beats (one fewer than the beat count)
    pub fn skip_midpoints(&self) -> Vec<f64> {
        let half = self.beat_interval() / 2.0;
        let beats = self.beats();
        beats
            .iter()
            .take(beats.len().saturating_sub(1))
            .map(|beat| round_ms(beat.time + half))
            .collect()
    }

    pub fn metadata(&self) -> TimelineMetadata {
        TimelineMetadata {
            bpm: self.bpm,
            beat_interval: self.beat_interval(),
            total_beats: self.total_beats(),
            tolerance: self.tolerance,
            offset: self.offset,
            duration: self.duration,
        }
    }

    /// Fractional beat position at `song_time`
    pub fn beat_position(&self, song_time: f64) -> f64 {
        song_time / self.beat_interval()
    }

    /// The most recent beat at or before `song_time`, if any has been reached
    pub fn last_beat_at(&self, song_time: f64) -> Option<u32> {
        let whole = self.beat_position(song_time + 1e-9).floor();
        if whole < 1.0 {
            return None;
        }
        Some((whole as u32).min(self.total_beats()))
    }

    /// Time of the first beat strictly after `song_time`
    pub fn next_beat_time(&self, song_time: f64) -> Option<f64> {
        let next = self.beat_position(song_time + 1e-9).floor() as u32 + 1;
        if next > self.total_beats() {
            return None;
        }
        Some(round_ms(self.beat_time(next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_120() -> RhythmClock {
        RhythmClock::new(120.0, 0.2, 0.1, 2.0)
    }

    #[test]
    fn test_beat_interval() {
        assert!((clock_120().beat_interval() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_total_beats_excludes_beat_zero() {
        // 120 s at 0.5 s per beat = 240 whole beats, minus beat 0
        let clock = clock_120();
        assert_eq!(clock.total_beats(), 239);
        assert_eq!(clock.beats().len(), 239);
    }

    #[test]
    fn test_first_beat_is_index_one() {
        let beats = clock_120().beats();
        assert_eq!(beats[0].index, 1);
        assert_eq!(beats[0].time, 0.5);
        assert!(beats.iter().all(|b| b.index != 0 && b.time > 0.0));
    }

    #[test]
    fn test_bar_numbering() {
        let beats = clock_120().beats();
        // index 1..3 sit in bar 1, index 4 starts bar 2
        assert_eq!((beats[0].bar, beats[0].beat_in_bar), (1, 2));
        assert_eq!((beats[2].bar, beats[2].beat_in_bar), (1, 4));
        assert_eq!((beats[3].bar, beats[3].beat_in_bar), (2, 1));
    }

    #[test]
    fn test_judgment_windows_surround_beats() {
        let windows = clock_120().judgment_windows();
        assert_eq!(windows.len(), 239);
        let first = windows[0];
        assert!((first.start - 0.3).abs() < 1e-9);
        assert!((first.end - 0.7).abs() < 1e-9);
        assert!(first.contains(0.5));
        assert!(!first.contains(0.71));
    }

    #[test]
    fn test_audio_cues_shifted_by_offset() {
        let clock = clock_120();
        let cues = clock.audio_cues();
        let beats = clock.beats();
        for (cue, beat) in cues.iter().zip(beats.iter()) {
            assert_eq!(cue.index, beat.index);
            assert!((beat.time - cue.time - 0.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_skip_midpoints() {
        let clock = clock_120();
        let mids = clock.skip_midpoints();
        assert_eq!(mids.len(), clock.total_beats() as usize - 1);
        assert_eq!(mids[0], 0.75);
        assert_eq!(mids[1], 1.25);
    }

    #[test]
    fn test_fast_tempo_beat_count() {
        // 140 bpm for two minutes = 280 whole beats
        let clock = RhythmClock::new(140.0, 0.2, 0.0, 2.0);
        assert_eq!(clock.total_beats(), 279);
        assert_eq!(clock.beats()[0].time, 0.429);
    }

    #[test]
    fn test_last_and_next_beat() {
        let clock = clock_120();
        assert_eq!(clock.last_beat_at(0.2), None);
        assert_eq!(clock.last_beat_at(0.5), Some(1));
        assert_eq!(clock.last_beat_at(1.2), Some(2));
        assert_eq!(clock.next_beat_time(0.0), Some(0.5));
        assert_eq!(clock.next_beat_time(0.5), Some(1.0));
        assert_eq!(clock.next_beat_time(200.0), None);
    }

    #[test]
    fn test_metadata_matches_timeline() {
        let clock = clock_120();
        let meta = clock.metadata();
        assert_eq!(meta.total_beats as usize, clock.beats().len());
        assert_eq!(meta.duration, 120.0);
    }
}
