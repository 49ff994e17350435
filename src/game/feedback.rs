//! Short-lived UI cues: judgment text and the beat indicator blink

use serde::{Deserialize, Serialize};

/// Text that stays visible for a fixed time after it is shown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackText {
    text: Option<String>,
    remaining_ms: f32,
}

impl FeedbackText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is showing
    pub fn show(&mut self, text: impl Into<String>, duration_ms: f32) {
        self.text = Some(text.into());
        self.remaining_ms = duration_ms;
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if self.text.is_none() {
            return;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.text = None;
            self.remaining_ms = 0.0;
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn clear(&mut self) {
        self.text = None;
        self.remaining_ms = 0.0;
    }
}

/// Lights up for a fixed time each time a new beat passes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatBlink {
    last_beat: Option<u32>,
    remaining_ms: f32,
}

impl BeatBlink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest beat index seen at the current song time
    pub fn update(&mut self, beat: Option<u32>, dt_ms: f32, blink_ms: f32) {
        self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
        if beat.is_some() && beat != self.last_beat {
            self.last_beat = beat;
            self.remaining_ms = blink_ms;
        }
    }

    pub fn is_lit(&self) -> bool {
        self.remaining_ms > 0.0
    }

    pub fn last_beat(&self) -> Option<u32> {
        self.last_beat
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_expires() {
        let mut feedback = FeedbackText::new();
        feedback.show("Perfect!", 600.0);
        feedback.tick(500.0);
        assert_eq!(feedback.current(), Some("Perfect!"));
        feedback.tick(100.0);
        assert_eq!(feedback.current(), None);
    }

    #[test]
    fn test_new_text_restarts_timer() {
        let mut feedback = FeedbackText::new();
        feedback.show("Good", 600.0);
        feedback.tick(500.0);
        feedback.show("Miss", 600.0);
        feedback.tick(500.0);
        assert_eq!(feedback.current(), Some("Miss"));
    }

    #[test]
    fn test_blink_on_new_beat_only() {
        let mut blink = BeatBlink::new();
        blink.update(None, 16.0, 100.0);
        assert!(!blink.is_lit());
        blink.update(Some(1), 16.0, 100.0);
        assert!(blink.is_lit());
        blink.update(Some(1), 60.0, 100.0);
        blink.update(Some(1), 60.0, 100.0);
        assert!(!blink.is_lit());
        blink.update(Some(2), 16.0, 100.0);
        assert!(blink.is_lit());
        assert_eq!(blink.last_beat(), Some(2));
    }
}
