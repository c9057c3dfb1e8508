use serde::Deserialize;

use crate::{
    error::{QuizError, QuizResult},
    model::{Question, QuizOption},
};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";
/// Generated questions start with this duration; the author tunes it later.
pub const DEFAULT_GENERATED_DURATION_SECS: u32 = 10;

const SYSTEM_INSTRUCTION: &str = "Generate a multiple-choice quiz as JSON. \
Reply with exactly this shape and nothing else: \
{ \"qcm\": [{ \"question\": \"?\", \"answers\": [{ \"text\": \"?\", \"correct\": boolean }] }] }";

/// Shape the model is instructed to reply with.
#[derive(Debug, Deserialize)]
struct GeneratedQcm {
    qcm: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
    answers: Vec<GeneratedAnswer>,
}

#[derive(Debug, Deserialize)]
struct GeneratedAnswer {
    text: String,
    correct: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// One-shot question generation against a chat-completion endpoint. The
/// request is a single cancellable future; callers swap the result into
/// their session with `replace_questions`, so a failure anywhere in here
/// leaves their question list untouched.
#[derive(Debug, Clone)]
pub struct Generator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl Generator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[tracing::instrument(skip(self))]
    pub async fn generate(&self, topic: &str) -> QuizResult<Vec<Question>> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": format!("Generate a quiz about: {topic}") },
            ],
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuizError::external_service(format!("generation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuizError::external_service(format!(
                "generation request returned {status}"
            )));
        }

        let reply: ChatCompletionReply = response.json().await.map_err(|e| {
            QuizError::external_service(format!("generation reply was not valid JSON: {e}"))
        })?;

        let content = reply
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| QuizError::external_service("generation reply had no choices"))?;

        let questions = parse_reply(content)?;
        tracing::info!(count = questions.len(), "generated questions");
        Ok(questions)
    }
}

/// Parses the model's message content into questions. Defensive on purpose:
/// replies routinely arrive wrapped in code fences or with prose around the
/// JSON object, and anything that still fails the schema is an
/// `ExternalService` error, never a panic.
pub fn parse_reply(content: &str) -> QuizResult<Vec<Question>> {
    let json = extract_json_object(content)
        .ok_or_else(|| QuizError::external_service("reply contained no JSON object"))?;

    let parsed: GeneratedQcm = serde_json::from_str(json).map_err(|e| {
        QuizError::external_service(format!("reply did not match the qcm schema: {e}"))
    })?;

    if parsed.qcm.is_empty() {
        return Err(QuizError::external_service("reply contained no questions"));
    }

    Ok(parsed
        .qcm
        .into_iter()
        .map(|g| {
            Question::new(
                g.question,
                g.answers
                    .into_iter()
                    .map(|a| QuizOption {
                        text: a.text,
                        correct: a.correct,
                    })
                    .collect(),
                DEFAULT_GENERATED_DURATION_SECS,
            )
        })
        .collect())
}

/// Slices out the outermost `{ ... }` of the content, skipping fences and
/// any surrounding prose.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}
