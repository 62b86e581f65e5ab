//! LLM backend.
//!
//! A single OpenAI-compatible chat-completions client. The call either
//! yields text, yields nothing, or fails with an HTTP status; the caller
//! decides how each is reported.

pub mod openai;

pub use openai::OpenAIClient;

/// Classified outcome of one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// First choice's content, trimmed.
    Reply(String),
    /// 200 response without any choices.
    Empty,
    /// Non-200 response.
    Failed { status: u16, body: String },
}

impl Completion {
    /// The line printed to stdout for this outcome.
    pub fn render(&self) -> String {
        match self {
            Completion::Reply(text) => text.clone(),
            Completion::Empty => "No response from OpenAI API.".to_string(),
            Completion::Failed { status, body } => {
                format!("Error fetching summary: {} - {}", status, body)
            }
        }
    }
}
