use crate::error::{QuizError, QuizResult};

pub const MIN_DURATION_SECS: u32 = 5;
pub const MAX_DURATION_SECS: u32 = 60;

/// Version written into every exported/rendered props document.
pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub correct: bool,
}

/// One multiple-choice question. `id` is opaque and unique within a session;
/// the option list may contain zero or several `correct` entries (the
/// animator and preview handle both, see `animate::option_visuals`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<QuizOption>,
    #[serde(rename = "duration")]
    pub duration_secs: u32,
}

impl Question {
    pub fn new(text: impl Into<String>, options: Vec<QuizOption>, duration_secs: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            options,
            duration_secs,
        }
    }

    pub fn validate(&self) -> QuizResult<()> {
        if self.id.trim().is_empty() {
            return Err(QuizError::validation("question id must be non-empty"));
        }
        if self.text.trim().is_empty() {
            return Err(QuizError::validation(format!(
                "question '{}' has empty text",
                self.id
            )));
        }
        if self.options.len() < 2 {
            return Err(QuizError::validation(format!(
                "question '{}' must have at least two options",
                self.id
            )));
        }
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration_secs) {
            return Err(QuizError::validation(format!(
                "question '{}' duration must be {MIN_DURATION_SECS}..={MAX_DURATION_SECS} seconds, got {}",
                self.id, self.duration_secs
            )));
        }
        Ok(())
    }
}

/// Visual styling, four independent fields. Colors are `#rrggbb` strings,
/// parsed only at the render boundary.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub font: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: "#1a1a1a".to_string(),
            text_color: "#ffffff".to_string(),
            accent_color: "#4f46e5".to_string(),
            font: "Inter".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub questions: Vec<Question>,
    pub style: Style,
}

impl Quiz {
    pub fn validate(&self) -> QuizResult<()> {
        if self.questions.is_empty() {
            return Err(QuizError::invalid_input("quiz has no questions"));
        }
        for q in &self.questions {
            q.validate()?;
        }
        Ok(())
    }

    /// Canonical total duration: the sum of per-question durations.
    pub fn total_duration_secs(&self) -> u32 {
        self.questions.iter().map(|q| q.duration_secs).sum()
    }
}

/// The on-disk/over-the-wire quiz document: what the export button saves and
/// what the render endpoint hands to the renderer as props.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    pub questions: Vec<Question>,
    pub style: Style,
}

impl ExportDocument {
    pub fn new(quiz: &Quiz) -> Self {
        Self {
            version: EXPORT_VERSION,
            questions: quiz.questions.clone(),
            style: quiz.style.clone(),
        }
    }

    pub fn into_quiz(self) -> Quiz {
        Quiz {
            questions: self.questions,
            style: self.style,
        }
    }

    pub fn to_json(&self) -> QuizResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QuizError::serde(format!("serialize export document: {e}")))
    }

    pub fn from_json(s: &str) -> QuizResult<Self> {
        let doc: Self = serde_json::from_str(s)
            .map_err(|e| QuizError::serde(format!("parse export document: {e}")))?;
        if doc.version > EXPORT_VERSION {
            return Err(QuizError::serde(format!(
                "unsupported export version {} (this build understands <= {EXPORT_VERSION})",
                doc.version
            )));
        }
        Ok(doc)
    }
}
