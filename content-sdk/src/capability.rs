//! Capabilities offered to callers and their request payloads

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upstream capability being exercised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Script,
    Summary,
    Quiz,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Script, Capability::Summary, Capability::Quiz];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Script => "script",
            Capability::Summary => "summary",
            Capability::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative style of a generated script.
///
/// Parsing never fails: unrecognized names resolve to
/// [`Tone::Conversational`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Conversational,
    Formal,
    Humorous,
    Storytelling,
}

impl Tone {
    /// Resolve a tone name, falling back to conversational
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "formal" => Tone::Formal,
            "humorous" => Tone::Humorous,
            "storytelling" => Tone::Storytelling,
            _ => Tone::Conversational,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Conversational => "conversational",
            Tone::Formal => "formal",
            Tone::Humorous => "humorous",
            Tone::Storytelling => "storytelling",
        }
    }

    /// Style instructions handed to the model
    pub fn instructions(self) -> &'static str {
        match self {
            Tone::Conversational => "Write in a casual, friendly, and engaging conversational style. Use relatable examples and keep the language simple.",
            Tone::Formal => "Write in a professional, structured, and authoritative tone. Use precise language and maintain a serious demeanor.",
            Tone::Humorous => "Write with wit, humor, and entertainment value. Include jokes, funny observations, and keep the mood light.",
            Tone::Storytelling => "Write as a compelling narrative with vivid descriptions, character development, and dramatic arcs.",
        }
    }
}

impl FromStr for Tone {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tone::from_name(s))
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a capability call works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationPayload {
    Topic { topic: String, tone: Tone },
    Script(String),
}

/// A single capability call, alive for the duration of the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub capability: Capability,
    pub payload: GenerationPayload,
}

impl GenerationRequest {
    pub fn script(topic: impl Into<String>, tone: Tone) -> Self {
        Self {
            capability: Capability::Script,
            payload: GenerationPayload::Topic {
                topic: topic.into(),
                tone,
            },
        }
    }

    pub fn summary(script: impl Into<String>) -> Self {
        Self {
            capability: Capability::Summary,
            payload: GenerationPayload::Script(script.into()),
        }
    }

    pub fn quiz(script: impl Into<String>) -> Self {
        Self {
            capability: Capability::Quiz,
            payload: GenerationPayload::Script(script.into()),
        }
    }

    /// True when the topic or script is blank
    pub fn is_blank(&self) -> bool {
        match self.payload {
            GenerationPayload::Topic { ref topic, .. } => topic.trim().is_empty(),
            GenerationPayload::Script(ref script) => script.trim().is_empty(),
        }
    }

    /// Prompt for this request
    pub fn prompt(&self) -> String {
        match (self.capability, &self.payload) {
            (_, GenerationPayload::Topic { topic, tone }) => crate::prompts::script_prompt(topic, *tone),
            (Capability::Quiz, GenerationPayload::Script(script)) => crate::prompts::quiz_prompt(script),
            (_, GenerationPayload::Script(script)) => crate::prompts::summary_prompt(script),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tones_resolve() {
        assert_eq!(Tone::from_name("formal"), Tone::Formal);
        assert_eq!(Tone::from_name(" Humorous "), Tone::Humorous);
        assert_eq!(Tone::from_name("STORYTELLING"), Tone::Storytelling);
        assert_eq!(Tone::from_name("conversational"), Tone::Conversational);
    }

    #[test]
    fn test_unknown_tone_falls_back_to_conversational() {
        for name in ["sarcastic", "", "   ", "formal-ish"] {
            let tone: Tone = name.parse().unwrap();
            assert_eq!(tone, Tone::Conversational);
            assert_eq!(tone.instructions(), Tone::Conversational.instructions());
        }
    }

    #[test]
    fn test_blank_requests() {
        assert!(GenerationRequest::script("  ", Tone::Formal).is_blank());
        assert!(GenerationRequest::summary("").is_blank());
        assert!(!GenerationRequest::quiz("A script").is_blank());
    }
}
