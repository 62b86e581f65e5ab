//! Chat-completion wire types.
//!
//! Only the subset of the request/response schema that chatpipe sends or
//! reads is modelled here.

use crate::error::ChatpipeError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Plain text, or a list of parts once images are attached.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: ImageDetail,
}

/// Resolution hint for image inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// An image ready to be referenced from a message, either a remote URL or
/// an inline `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    url: String,
}

impl Image {
    /// Read a local file and inline it as a base64 data URL.
    pub fn from_path(path: &Path) -> Result<Self, ChatpipeError> {
        let bytes = std::fs::read(path).map_err(|source| ChatpipeError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(&bytes, mime_type_for(path)))
    }

    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            url: format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes)),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Guess the image MIME type from the file extension.
fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Settings that shape a request independently of its text.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub model: String,
    pub max_tokens: u32,
    pub json_mode: bool,
    pub detail: ImageDetail,
}

/// Assemble the request body.
///
/// `images` are appended after the text part in the order given; callers
/// pass local files before remote URLs.
pub fn build_request(
    options: &RequestOptions,
    system_prompt: &str,
    user_text: String,
    images: &[Image],
) -> ChatRequest {
    let user_content = if images.is_empty() {
        MessageContent::Text(user_text)
    } else {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::Text { text: user_text });
        parts.extend(images.iter().map(|image| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: image.url().to_string(),
                detail: options.detail,
            },
        }));
        MessageContent::Parts(parts)
    };

    ChatRequest {
        model: options.model.clone(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: MessageContent::Text(system_prompt.to_string()),
            },
            ChatMessage {
                role: Role::User,
                content: user_content,
            },
        ],
        max_tokens: options.max_tokens,
        response_format: options.json_mode.then(ResponseFormat::json_object),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Missing and `null` both mean no choices.
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
}

impl ChatResponse {
    pub fn into_choices(self) -> Vec<ChatChoice> {
        self.choices.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}
