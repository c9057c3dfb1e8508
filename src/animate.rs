use crate::{
    core::FrameIndex,
    ease::Ease,
    model::QuizOption,
    timeline::{LocatedFrame, Timeline},
};

/// Frames the question-text entrance takes to settle.
pub const ENTRANCE_FRAMES: u64 = 30;
/// Local frame at which the options entrance begins.
pub const OPTIONS_DELAY_FRAMES: u64 = 30;
/// Question text slides in from this vertical offset (px, negative = above).
pub const QUESTION_ENTRANCE_FROM: f64 = -50.0;
/// Options slide in from this horizontal offset (px).
pub const OPTIONS_ENTRANCE_FROM: f64 = 100.0;

const ENTRANCE_EASE: Ease = Ease::OutCubic;

/// Everything the visual layer needs for one frame of one question.
/// Purely computed, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AnimationState {
    pub question_index: usize,
    pub local_frame: u64,
    pub question_entrance_offset: f64,
    pub options_entrance_offset: f64,
    pub reveal_progress_percent: f64,
    pub answer_revealed: bool,
}

/// How a single option should render at a given frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum OptionVisual {
    /// Pre-reveal resting look.
    Neutral,
    /// Pre-reveal, actively picked by the user (interactive preview only).
    Selected,
    /// Post-reveal, this option is a correct answer.
    Correct,
    /// Post-reveal, not a correct answer: reduced opacity.
    Dimmed,
}

/// Pure function of `(local frame, question length)` — the same math drives
/// the wall-clock preview and the frame-exact offline render, which is what
/// keeps the two pixel-equivalent at any frame number.
pub fn animate(at: LocatedFrame, duration_frames: u64) -> AnimationState {
    AnimationState {
        question_index: at.question_index,
        local_frame: at.local_frame,
        question_entrance_offset: entrance_offset(at.local_frame, QUESTION_ENTRANCE_FROM),
        options_entrance_offset: entrance_offset(
            at.local_frame.saturating_sub(OPTIONS_DELAY_FRAMES),
            OPTIONS_ENTRANCE_FROM,
        ),
        reveal_progress_percent: progress_percent(at.local_frame, duration_frames),
        answer_revealed: answer_revealed(at.local_frame, duration_frames),
    }
}

/// Convenience for hosts holding an absolute frame counter: locate the
/// frame on the timeline and animate it. `None` past the end of playback.
pub fn sample(timeline: &Timeline, frame: FrameIndex) -> Option<AnimationState> {
    let at = timeline.locate(frame)?;
    let duration_frames = timeline.ranges()[at.question_index].range.len_frames();
    Some(animate(at, duration_frames))
}

/// Per-option looks for one frame. `selected` is only meaningful in the
/// interactive preview; the offline render passes `None`.
///
/// After the reveal, every `correct` option highlights and the rest dim —
/// so a question with several correct options highlights them all, and one
/// with none highlights nothing.
pub fn option_visuals(
    options: &[QuizOption],
    revealed: bool,
    selected: Option<usize>,
) -> Vec<OptionVisual> {
    options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            if revealed {
                if opt.correct {
                    OptionVisual::Correct
                } else {
                    OptionVisual::Dimmed
                }
            } else if selected == Some(i) {
                OptionVisual::Selected
            } else {
                OptionVisual::Neutral
            }
        })
        .collect()
}

/// Eased slide from `from` to 0 over `ENTRANCE_FRAMES`; exactly 0 from
/// frame `ENTRANCE_FRAMES` on.
fn entrance_offset(local_frame: u64, from: f64) -> f64 {
    if local_frame >= ENTRANCE_FRAMES {
        return 0.0;
    }
    let t = local_frame as f64 / ENTRANCE_FRAMES as f64;
    ENTRANCE_EASE.interpolate(from, 0.0, t)
}

/// Reveal threshold: strictly past 80% of the question's allotted frames.
/// Integer arithmetic keeps the boundary exact.
fn answer_revealed(local_frame: u64, duration_frames: u64) -> bool {
    local_frame * 5 > duration_frames * 4
}

fn progress_percent(local_frame: u64, duration_frames: u64) -> f64 {
    if duration_frames == 0 {
        return 0.0;
    }
    (local_frame as f64 / duration_frames as f64 * 100.0).clamp(0.0, 100.0)
}
