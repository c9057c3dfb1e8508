use std::time::{Duration, Instant};

use crate::model::Question;

/// Auto-play waits this long before picking the correct answer.
pub const AUTO_SELECT_DELAY: Duration = Duration::from_millis(1500);
/// A revealed question holds this long before advancing.
pub const ADVANCE_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewMode {
    Manual,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Waiting for a click (manual) or the auto-select delay (auto).
    Waiting { since: Instant },
    /// Answer shown; advances after `ADVANCE_DELAY`.
    Revealed { at: Instant },
}

/// Wall-clock state machine behind the interactive preview. Time is passed
/// in explicitly, so a host can drive it from any timer (and tests can
/// drive it from none). All delays are real time, not frames — the frame
/// animation runs independently through `animate`.
#[derive(Debug)]
pub struct PreviewController {
    questions: Vec<Question>,
    mode: PreviewMode,
    current: usize,
    selected: Option<usize>,
    phase: Phase,
}

impl PreviewController {
    pub fn new(questions: Vec<Question>, mode: PreviewMode, now: Instant) -> Self {
        Self {
            questions,
            mode,
            current: 0,
            selected: None,
            phase: Phase::Waiting { since: now },
        }
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn revealed(&self) -> bool {
        matches!(self.phase, Phase::Revealed { .. })
    }

    /// Manual selection. The first click before the reveal locks in and
    /// reveals immediately; anything after that is ignored until the
    /// question changes.
    pub fn click(&mut self, option_index: usize, now: Instant) {
        if self.revealed() || self.questions.is_empty() {
            return;
        }
        let Some(q) = self.questions.get(self.current) else {
            return;
        };
        if option_index >= q.options.len() {
            return;
        }
        self.selected = Some(option_index);
        self.phase = Phase::Revealed { at: now };
    }

    /// Advances the clock. Call on every host timer tick; the controller
    /// fires whatever transitions the elapsed wall time implies.
    pub fn tick(&mut self, now: Instant) {
        if self.questions.is_empty() {
            return;
        }
        match self.phase {
            Phase::Waiting { since } => {
                if self.mode == PreviewMode::Auto
                    && now.duration_since(since) >= AUTO_SELECT_DELAY
                {
                    // Auto mode picks the first correct option; a question
                    // without one reveals with nothing selected.
                    self.selected = self
                        .questions[self.current]
                        .options
                        .iter()
                        .position(|o| o.correct);
                    self.phase = Phase::Revealed { at: now };
                }
            }
            Phase::Revealed { at } => {
                if now.duration_since(at) >= ADVANCE_DELAY {
                    self.advance(now);
                }
            }
        }
    }

    /// Moves to the next question, wrapping to the first after the last,
    /// and resets selection/reveal state.
    pub fn advance(&mut self, now: Instant) {
        if self.questions.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.questions.len();
        self.selected = None;
        self.phase = Phase::Waiting { since: now };
    }
}
