use crate::{
    error::{QuizError, QuizResult},
    model::{ExportDocument, Question, Quiz, Style},
};

/// The one owned state object behind an authoring session: the ordered
/// question list, the style, and the two bits of UI-visible mode state.
/// All mutation goes through the named transitions below; render/export
/// consumers only ever read.
#[derive(Clone, Debug, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    style: Style,
    selected: usize,
    auto_mode: bool,
}

impl QuizSession {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn quiz(&self) -> Quiz {
        Quiz {
            questions: self.questions.clone(),
            style: self.style.clone(),
        }
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::new(&self.quiz())
    }

    /// Adds the question, or replaces the existing one with the same id
    /// (the edit flow saves through the same path as the create flow).
    pub fn upsert_question(&mut self, question: Question) -> QuizResult<()> {
        question.validate()?;
        match self.questions.iter_mut().find(|q| q.id == question.id) {
            Some(slot) => *slot = question,
            None => self.questions.push(question),
        }
        Ok(())
    }

    /// Removes by id; the selection is clamped so it keeps pointing at a
    /// live question (or 0 when the list empties).
    pub fn delete_question(&mut self, id: &str) -> QuizResult<()> {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        if self.questions.len() == before {
            return Err(QuizError::asset_not_found(format!("question '{id}'")));
        }
        self.selected = self.selected.min(self.questions.len().saturating_sub(1));
        Ok(())
    }

    /// Drag-reorder: moves the question at `from` to position `to`.
    pub fn move_question(&mut self, from: usize, to: usize) -> QuizResult<()> {
        if from >= self.questions.len() || to >= self.questions.len() {
            return Err(QuizError::invalid_input(format!(
                "reorder {from} -> {to} out of bounds (len {})",
                self.questions.len()
            )));
        }
        let q = self.questions.remove(from);
        self.questions.insert(to, q);
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> QuizResult<()> {
        if index >= self.questions.len() {
            return Err(QuizError::invalid_input(format!(
                "selected index {index} out of bounds (len {})",
                self.questions.len()
            )));
        }
        self.selected = index;
        Ok(())
    }

    /// Advances the selection, wrapping to the first question.
    pub fn next_question(&mut self) {
        if self.questions.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.questions.len();
    }

    pub fn toggle_auto_mode(&mut self) {
        self.auto_mode = !self.auto_mode;
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    /// All-or-nothing swap used by question generation: the incoming set is
    /// validated as a whole first, and on any error the current list stays
    /// exactly as it was.
    pub fn replace_questions(&mut self, questions: Vec<Question>) -> QuizResult<()> {
        if questions.is_empty() {
            return Err(QuizError::invalid_input(
                "refusing to replace questions with an empty set",
            ));
        }
        for q in &questions {
            q.validate()?;
        }
        self.questions = questions;
        self.selected = 0;
        Ok(())
    }
}
