use crate::{
    core::{Fps, FrameIndex, FrameRange},
    model::Question,
};

/// One question's slot on the absolute frame axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct QuestionRange {
    pub range: FrameRange,
    pub question_index: usize,
}

/// An absolute frame resolved to the question that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LocatedFrame {
    pub question_index: usize,
    pub local_frame: u64,
}

/// A contiguous, non-overlapping partition of the frame axis: one half-open
/// range per question, in question order, starting at frame 0. Derived from
/// the question list — never stored, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Timeline {
    fps: Fps,
    ranges: Vec<QuestionRange>,
}

impl Timeline {
    /// Durations are whole seconds and fps is an integer, so
    /// `duration_frames = duration_secs * fps` is exact.
    pub fn compile(questions: &[Question], fps: Fps) -> Self {
        let mut ranges = Vec::with_capacity(questions.len());
        let mut cursor = 0u64;
        for (question_index, q) in questions.iter().enumerate() {
            let len = fps.frames_for_secs(q.duration_secs);
            let range = FrameRange {
                start: FrameIndex(cursor),
                end: FrameIndex(cursor + len),
            };
            ranges.push(QuestionRange {
                range,
                question_index,
            });
            cursor += len;
        }
        Self { fps, ranges }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn ranges(&self) -> &[QuestionRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// End of the last range; 0 when there are no questions.
    pub fn total_frames(&self) -> u64 {
        self.ranges.last().map_or(0, |r| r.range.end.0)
    }

    /// Resolves an absolute frame to `(question index, local frame)`.
    ///
    /// Frames at or past the total duration resolve to `None`; whether to
    /// stop, clamp, or wrap is the caller's playback policy.
    pub fn locate(&self, frame: FrameIndex) -> Option<LocatedFrame> {
        if frame.0 >= self.total_frames() {
            return None;
        }
        // Ranges are sorted and contiguous; find the first one ending past
        // the frame. Zero-length ranges never contain anything and are
        // correctly skipped by the strict comparison.
        let idx = self.ranges.partition_point(|r| r.range.end.0 <= frame.0);
        let slot = &self.ranges[idx];
        debug_assert!(slot.range.contains(frame));
        Some(LocatedFrame {
            question_index: slot.question_index,
            local_frame: frame.0 - slot.range.start.0,
        })
    }

    /// Clamps an absolute frame into the playable interval, for callers
    /// whose policy is "hold the last frame".
    pub fn clamp(&self, frame: FrameIndex) -> FrameIndex {
        let total = self.total_frames();
        if total == 0 {
            return FrameIndex(0);
        }
        FrameIndex(frame.0.min(total - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizOption;

    fn question(duration_secs: u32) -> Question {
        Question::new(
            "q",
            vec![
                QuizOption {
                    text: "a".to_string(),
                    correct: true,
                },
                QuizOption {
                    text: "b".to_string(),
                    correct: false,
                },
            ],
            duration_secs,
        )
    }

    #[test]
    fn empty_question_list_compiles_to_empty_timeline() {
        let tl = Timeline::compile(&[], Fps::new(30).unwrap());
        assert!(tl.is_empty());
        assert_eq!(tl.total_frames(), 0);
        assert_eq!(tl.locate(FrameIndex(0)), None);
    }

    #[test]
    fn ranges_are_contiguous_and_in_order() {
        let qs = vec![question(5), question(10), question(7)];
        let tl = Timeline::compile(&qs, Fps::new(30).unwrap());

        assert_eq!(tl.ranges().len(), 3);
        let mut expected_start = 0u64;
        for (i, slot) in tl.ranges().iter().enumerate() {
            assert_eq!(slot.question_index, i);
            assert_eq!(slot.range.start.0, expected_start);
            assert_eq!(
                slot.range.len_frames(),
                u64::from(qs[i].duration_secs) * 30
            );
            expected_start = slot.range.end.0;
        }
        assert_eq!(tl.total_frames(), (5 + 10 + 7) * 30);
    }

    #[test]
    fn locate_inverts_range_construction() {
        let qs = vec![question(5), question(10)];
        let tl = Timeline::compile(&qs, Fps::new(30).unwrap());

        for f in 0..tl.total_frames() {
            let at = tl.locate(FrameIndex(f)).unwrap();
            let slot = tl.ranges()[at.question_index];
            assert!(slot.range.contains(FrameIndex(f)));
            assert_eq!(at.local_frame, f - slot.range.start.0);
        }
    }

    #[test]
    fn two_question_scenario_from_the_product_brief() {
        // 5s + 10s at 30fps: [0,150) and [150,450); frame 200 is question 1
        // at local frame 50.
        let qs = vec![question(5), question(10)];
        let tl = Timeline::compile(&qs, Fps::new(30).unwrap());

        assert_eq!(tl.ranges()[0].range.start.0, 0);
        assert_eq!(tl.ranges()[0].range.end.0, 150);
        assert_eq!(tl.ranges()[1].range.start.0, 150);
        assert_eq!(tl.ranges()[1].range.end.0, 450);

        let at = tl.locate(FrameIndex(200)).unwrap();
        assert_eq!(at.question_index, 1);
        assert_eq!(at.local_frame, 50);
    }

    #[test]
    fn frames_outside_the_total_duration_locate_to_none() {
        let tl = Timeline::compile(&[question(5)], Fps::new(30).unwrap());
        assert!(tl.locate(FrameIndex(149)).is_some());
        assert_eq!(tl.locate(FrameIndex(150)), None);
        assert_eq!(tl.locate(FrameIndex(9999)), None);
    }

    #[test]
    fn clamp_holds_the_last_frame() {
        let tl = Timeline::compile(&[question(5)], Fps::new(30).unwrap());
        assert_eq!(tl.clamp(FrameIndex(9999)), FrameIndex(149));
        assert_eq!(tl.clamp(FrameIndex(3)), FrameIndex(3));

        let empty = Timeline::compile(&[], Fps::new(30).unwrap());
        assert_eq!(empty.clamp(FrameIndex(7)), FrameIndex(0));
    }
}
