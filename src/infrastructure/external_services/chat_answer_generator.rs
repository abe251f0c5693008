use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::application::ports::AnswerGenerator;
use crate::application::ports::answer_generator::{GeneratedAnswer, GenerationError, SourceRef};
use crate::domain::entities::Chunk;
use crate::infrastructure::external_services::inference_client::{InferenceClient, InferenceError};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
const SOURCES_MARKER: &str = "sources:";

const INSTRUCTIONS: &str = "Given the following extracted parts of a long document and a question, \
create a final answer with references (\"SOURCES\").\n\
If you don't know the answer, just say that you don't know. Don't try to make up an answer.\n\
ALWAYS return a \"SOURCES\" part in your answer.";

static SOURCE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<doc>.*?)\s*(?:,?\s*\bpage\s*(?P<page>\d+))?$").ok()
});

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl From<InferenceError> for GenerationError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Request(msg) | InferenceError::InvalidUrl(msg) => {
                GenerationError::Network(msg)
            }
            InferenceError::RateLimited => GenerationError::RateLimitExceeded,
            InferenceError::Status { status, message } => GenerationError::Api { status, message },
            InferenceError::Parse(msg) => GenerationError::InvalidResponse(msg),
        }
    }
}

/// Answers questions with an OpenAI-compatible chat model, asking it to
/// list its sources after a `SOURCES:` marker.
pub struct ChatAnswerGenerator {
    client: Arc<InferenceClient>,
    model: String,
    temperature: f32,
}

impl ChatAnswerGenerator {
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl AnswerGenerator for ChatAnswerGenerator {
    async fn generate(
        &self,
        question: &str,
        context: &[Chunk],
    ) -> Result<GeneratedAnswer, GenerationError> {
        let prompt = build_prompt(question, context);
        debug!(
            model = %self.model,
            context_chunks = context.len(),
            prompt_len = prompt.len(),
            "requesting chat completion"
        );

        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        let response: ChatCompletionResponse =
            self.client.post_json(CHAT_COMPLETIONS_PATH, &request).await?;

        let completion = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse("no choices returned".to_string()))?;

        parse_completion(&completion)
    }

    fn model_info(&self) -> (String, f32) {
        (self.model.clone(), self.temperature)
    }
}

fn build_prompt(question: &str, context: &[Chunk]) -> String {
    let mut prompt = format!("{INSTRUCTIONS}\n\nQUESTION: {question}\n=========\n");
    for chunk in context {
        let _ = write!(
            prompt,
            "Content: {}\nSource: {} page {}\n\n",
            chunk.text(),
            chunk.document_name(),
            chunk.page().display()
        );
    }
    prompt.push_str("=========\nFINAL ANSWER:");
    prompt
}

/// Splits a completion into the answer and the sources listed after the
/// last `SOURCES:` marker.
fn parse_completion(completion: &str) -> Result<GeneratedAnswer, GenerationError> {
    // ASCII lowercasing keeps byte offsets valid for `completion`.
    let lowered = completion.to_ascii_lowercase();
    let (answer, sources) = match lowered.rfind(SOURCES_MARKER) {
        Some(at) => (
            &completion[..at],
            parse_sources(&completion[at + SOURCES_MARKER.len()..]),
        ),
        None => (completion, Vec::new()),
    };

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(GenerationError::EmptyAnswer);
    }

    Ok(GeneratedAnswer {
        answer: answer.to_string(),
        self_reported_sources: sources,
    })
}

fn parse_sources(list: &str) -> Vec<SourceRef> {
    list.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty() && !item.eq_ignore_ascii_case("none"))
        .filter_map(parse_source)
        .collect()
}

fn parse_source(item: &str) -> Option<SourceRef> {
    let captures = SOURCE_PATTERN.as_ref()?.captures(item)?;
    let document_name = captures.name("doc")?.as_str().trim();
    if document_name.is_empty() {
        return None;
    }
    Some(SourceRef {
        document_name: document_name.to_string(),
        page: captures
            .name("page")
            .and_then(|p| p.as_str().parse().ok()),
    })
}
