//! Data models for the Anthropic Messages API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::providers::InvokeOptions;

/// Request body for `POST /messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    pub messages: Vec<Message>,
}

impl MessagesRequest {
    /// Single user message carrying `prompt`
    pub fn from_prompt(model: &str, prompt: &str, options: &InvokeOptions) -> Self {
        Self {
            model: model.to_string(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_k: options.top_k,
            top_p: options.top_p,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Successful response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first content block
    pub fn first_text(&self) -> Option<String> {
        self.content.first()?.text.clone()
    }

    /// Pull the generated text out of a raw body
    pub fn text_from(body: &Value) -> Option<String> {
        serde_json::from_value::<Self>(body.clone())
            .ok()
            .and_then(|response| response.first_text())
    }
}
