//! Host-facing match facade
//!
//! `MatchSession` wires the rhythm layer into the battle: judged inputs feed the
//! pattern recognizer, and a completed pattern summons the unit in its slot.
//! The host owns the frame loop and calls [`MatchSession::advance`] with the
//! elapsed time; keypresses go through [`MatchSession::press`].

use tracing::{debug, info};

use crate::battle::execution::{BattleEventLog, BattleState, MatchOutcome};
use crate::battle::team::TeamSelection;
use crate::core::config::RhythmConfig;
use crate::core::error::{BattleError, Result, SpawnError};
use crate::core::types::UnitId;
use crate::game::assets::MatchAssets;
use crate::game::feedback::{BeatBlink, FeedbackText};
use crate::render::snapshot::RenderSnapshot;
use crate::rhythm::clock::{Beat, RhythmClock};
use crate::rhythm::judge::{InputJudge, Judgment, SkipDetector};
use crate::rhythm::pattern::{InputSymbol, KnownPattern, PatternMatch, PatternRecognizer};

/// A pattern completion and what came of the summon it triggered
#[derive(Debug, Clone, PartialEq)]
pub struct SummonAttempt {
    pub pattern: PatternMatch,
    pub result: std::result::Result<UnitId, SpawnError>,
}

/// What happened to one keypress
#[derive(Debug, Clone, PartialEq)]
pub struct InputOutcome {
    pub symbol: InputSymbol,
    pub judgment: Judgment,
    pub summon: Option<SummonAttempt>,
}

/// What happened during one `advance`
#[derive(Debug, Clone, Default)]
pub struct SessionTick {
    pub events: BattleEventLog,
    /// Beats settled this frame with no input
    pub skipped_beats: Vec<u32>,
    /// Summons triggered by patterns that ended in a skip
    pub summons: Vec<SummonAttempt>,
}

pub struct MatchSession {
    battle: BattleState,
    clock: RhythmClock,
    judge: InputJudge,
    skips: SkipDetector,
    recognizer: PatternRecognizer,
    rhythm: RhythmConfig,
    song_time: f64,
    started: bool,
    feedback: FeedbackText,
    blink: BeatBlink,
}

impl MatchSession {
    /// Build a match on `stage_id`. Fails without side effects if any input is inconsistent.
    pub fn new(assets: &MatchAssets, stage_id: &str, team: TeamSelection, seed: u64) -> Result<Self> {
        let stage = assets.stages.get(stage_id)?.clone();
        let clock = RhythmClock::from_config(&assets.rhythm, Some(stage.bgm.bpm), Some(stage.bgm.offset));
        if clock.tolerance() > clock.beat_interval() / 2.0 {
            return Err(BattleError::InvalidConfig(format!(
                "tolerance {}s overlaps neighbouring beats at {} bpm",
                clock.tolerance(),
                clock.bpm()
            )));
        }

        let battle = BattleState::new(
            assets.battle.clone(),
            stage,
            team,
            assets.archetypes.clone(),
            seed,
        )?;
        let recognizer = PatternRecognizer::new(
            assets.patterns.clone(),
            assets.rhythm.history_capacity,
            assets.rhythm.match_window,
        );

        Ok(Self {
            battle,
            judge: InputJudge::new(clock),
            skips: SkipDetector::new(&clock),
            clock,
            recognizer,
            rhythm: assets.rhythm.clone(),
            song_time: 0.0,
            started: false,
            feedback: FeedbackText::new(),
            blink: BeatBlink::new(),
        })
    }

    /// Start the song. Returns the audio cue timeline for the host to schedule.
    pub fn start(&mut self) -> Vec<Beat> {
        self.started = true;
        self.song_time = 0.0;
        let cues = self.clock.audio_cues();
        info!(
            "Song started: {} bpm, {} beats, offset {:.2}s",
            self.clock.bpm(),
            cues.len(),
            self.clock.offset()
        );
        cues
    }

    /// Advance song time and the simulation by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> SessionTick {
        let mut tick = SessionTick::default();
        if !self.started || self.is_paused() || self.battle.is_over() || dt < 0.0 {
            return tick;
        }

        let dt_ms = dt * 1000.0;
        self.song_time += f64::from(dt);

        // Unplayed beats count as the skip symbol
        tick.skipped_beats = self.skips.poll(self.song_time, &self.judge);
        for _ in &tick.skipped_beats {
            if let Some(pattern) = self.recognizer.record_input(InputSymbol::Skip, true) {
                tick.summons.push(self.summon_for(pattern));
            }
        }

        tick.events = self.battle.advance(dt);

        self.feedback.tick(dt_ms);
        self.blink.update(
            self.clock.last_beat_at(self.song_time),
            dt_ms,
            self.rhythm.beat_blink_ms,
        );
        tick
    }

    /// Press `symbol` at the current song time
    pub fn press(&mut self, symbol: InputSymbol) -> Option<InputOutcome> {
        self.press_at(symbol, self.song_time)
    }

    /// Press `symbol` at song time `t`.
    ///
    /// Ignored (returns `None`) before the song starts, while paused, after the
    /// match ends, or for the skip symbol, which only the skip detector emits.
    pub fn press_at(&mut self, symbol: InputSymbol, t: f64) -> Option<InputOutcome> {
        if !self.started || self.is_paused() || self.battle.is_over() {
            return None;
        }
        if symbol == InputSymbol::Skip {
            return None;
        }

        let judgment = self.judge.judge(t);
        debug!(
            "Input {} at {:.3}s: {:?} (beat {:?}, offset {:+.3})",
            symbol, t, judgment.grade, judgment.beat, judgment.offset
        );
        self.feedback
            .show(judgment.grade.label(), self.rhythm.feedback_ms);

        let summon = self
            .recognizer
            .record_input(symbol, judgment.is_hit())
            .map(|pattern| self.summon_for(pattern));

        Some(InputOutcome {
            symbol,
            judgment,
            summon,
        })
    }

    fn summon_for(&mut self, pattern: PatternMatch) -> SummonAttempt {
        info!("Pattern {} matched, summoning slot {}", pattern.name, pattern.slot + 1);
        let result = self.battle.spawn_player_unit(pattern.slot);
        if let Ok(unit_id) = result {
            if let Some(unit) = self.battle.player_units.get(unit_id) {
                let text = format!("{}!", unit.name);
                self.feedback.show(text, self.rhythm.feedback_ms);
            }
        }
        SummonAttempt { pattern, result }
    }

    /// Summon a slot directly, bypassing the rhythm layer
    pub fn summon(&mut self, slot: usize) -> std::result::Result<UnitId, SpawnError> {
        if self.is_paused() {
            return Err(SpawnError::Paused);
        }
        self.battle.spawn_player_unit(slot)
    }

    pub fn pause(&mut self) {
        if !self.battle.paused {
            info!("Paused at {:.2}s", self.song_time);
        }
        self.battle.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.battle.set_paused(false);
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
        self.is_paused()
    }

    /// Rebuild every piece of per-match state and restart the song.
    /// Returns the audio cue timeline, as `start` does.
    pub fn restart(&mut self) -> Vec<Beat> {
        info!("Restarting match");
        self.battle.reset();
        self.judge = InputJudge::new(self.clock);
        self.skips = SkipDetector::new(&self.clock);
        self.recognizer.clear();
        self.feedback.clear();
        self.blink.reset();
        self.start()
    }

    /// Swap the pattern table; takes effect on the next input
    pub fn replace_patterns(&mut self, patterns: Vec<KnownPattern>) {
        self.recognizer.replace_patterns(patterns);
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.battle.outcome
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }

    pub fn battle(&self) -> &BattleState {
        &self.battle
    }

    pub fn battle_mut(&mut self) -> &mut BattleState {
        &mut self.battle
    }

    pub fn clock(&self) -> &RhythmClock {
        &self.clock
    }

    pub fn recognizer(&self) -> &PatternRecognizer {
        &self.recognizer
    }

    pub fn song_time(&self) -> f64 {
        self.song_time
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.battle.paused
    }

    /// Song has run past its last beat
    pub fn song_finished(&self) -> bool {
        self.song_time >= self.clock.duration()
    }

    pub fn feedback_text(&self) -> Option<&str> {
        self.feedback.current()
    }

    pub fn beat_lit(&self) -> bool {
        self.blink.is_lit()
    }

    pub fn current_beat(&self) -> Option<u32> {
        self.blink.last_beat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm::judge::Grade;

    fn session() -> MatchSession {
        let mut session =
            MatchSession::new(&MatchAssets::with_defaults(), "stage1", TeamSelection::default(), 3)
                .unwrap();
        session.start();
        session
    }

    fn key(c: char) -> InputSymbol {
        InputSymbol::Key(c)
    }

    #[test]
    fn test_unknown_stage_fails() {
        let result = MatchSession::new(&MatchAssets::with_defaults(), "nowhere", TeamSelection::default(), 0);
        assert!(matches!(result, Err(BattleError::UnknownStage(_))));
    }

    #[test]
    fn test_start_returns_offset_cues() {
        let mut session =
            MatchSession::new(&MatchAssets::with_defaults(), "stage1", TeamSelection::default(), 0)
                .unwrap();
        let cues = session.start();
        // stage1: 120 bpm for two minutes, cues 0.75s early
        assert_eq!(cues.len(), 239);
        assert!((cues[1].time - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_inputs_ignored_before_start() {
        let mut session =
            MatchSession::new(&MatchAssets::with_defaults(), "stage1", TeamSelection::default(), 0)
                .unwrap();
        assert!(session.press_at(key('1'), 0.5).is_none());
        session.advance(1.0);
        assert_eq!(session.battle().tick, 0);
    }

    #[test]
    fn test_pattern_summons_slot() {
        let mut session = session();
        // stage1 is 120 bpm: beats at 0.5, 1.0, 1.5, 2.0
        for (i, c) in ['1', '1', '1'].iter().enumerate() {
            let out = session.press_at(key(*c), 0.5 * (i + 1) as f64).unwrap();
            assert!(out.summon.is_none());
        }
        let out = session.press_at(key('2'), 2.0).unwrap();
        let summon = out.summon.unwrap();
        assert_eq!(summon.pattern.slot, 0);
        assert!(summon.result.is_ok());
        assert_eq!(session.battle().player_units.len(), 1);
        assert_eq!(session.battle().energy, 50.0);
        assert_eq!(session.feedback_text(), Some("Drum Knight!"));
    }

    #[test]
    fn test_mistimed_input_breaks_pattern() {
        let mut session = session();
        session.press_at(key('1'), 0.5);
        session.press_at(key('1'), 1.0);
        let out = session.press_at(key('1'), 1.25).unwrap();
        assert_eq!(out.judgment.grade, Grade::Miss);
        assert_eq!(session.recognizer().history_len(), 0);
        assert_eq!(session.feedback_text(), Some("Miss"));
    }

    #[test]
    fn test_double_press_is_miss() {
        let mut session = session();
        assert!(session.press_at(key('1'), 0.5).unwrap().judgment.is_hit());
        assert!(!session.press_at(key('1'), 0.52).unwrap().judgment.is_hit());
    }

    #[test]
    fn test_skip_completes_pattern() {
        let mut session = session();
        session.battle_mut().energy = 500.0;
        // slot3 = s skip d f: press on beat 1, leave beat 2 empty, then beats 3 and 4
        session.press_at(key('s'), 0.5);
        // Past the midpoint after beat 2 (1.25s) the skip is emitted
        let tick = session.advance(1.3);
        assert_eq!(tick.skipped_beats, vec![2]);
        session.press_at(key('d'), 1.5);
        let out = session.press_at(key('f'), 2.0).unwrap();
        assert_eq!(out.summon.unwrap().pattern.slot, 2);
    }

    #[test]
    fn test_pause_freezes_song_and_battle() {
        let mut session = session();
        session.advance(1.0);
        assert!(session.toggle_pause());
        session.advance(5.0);
        assert_eq!(session.song_time(), 1.0);
        assert_eq!(session.battle().tick, 1);
        assert!(session.press(key('1')).is_none());
        assert_eq!(session.summon(0), Err(SpawnError::Paused));
        assert!(!session.toggle_pause());
        session.advance(1.0);
        assert_eq!(session.song_time(), 2.0);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = session();
        session.summon(0).unwrap();
        session.press_at(key('1'), 0.5);
        for _ in 0..20 {
            session.advance(0.5);
        }
        session.restart();
        assert_eq!(session.song_time(), 0.0);
        assert_eq!(session.battle().tick, 0);
        assert!(session.battle().player_units.is_empty());
        assert_eq!(session.recognizer().history_len(), 0);
        assert!(session.feedback_text().is_none());
        // The judge forgot earlier presses
        assert!(session.press_at(key('1'), 0.5).unwrap().judgment.is_hit());
    }

    #[test]
    fn test_replace_patterns() {
        let mut session = session();
        session.replace_patterns(vec![KnownPattern::new("quick", 1, &["q", "q"]).unwrap()]);
        session.press_at(key('q'), 0.5);
        let out = session.press_at(key('q'), 1.0).unwrap();
        assert_eq!(out.summon.unwrap().pattern.name, "quick");
    }

    #[test]
    fn test_beat_blink_follows_song() {
        let mut session = session();
        session.advance(0.45);
        assert!(!session.beat_lit());
        session.advance(0.1);
        assert!(session.beat_lit());
        assert_eq!(session.current_beat(), Some(1));
    }
}
