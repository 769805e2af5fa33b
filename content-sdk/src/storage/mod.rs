//! Persistence of generated scripts
//!
//! [`ScriptStore`] is the seam to the hosted database. Two implementations
//! ship with the SDK: [`PostgrestScriptStore`] talks to the database's REST
//! interface and [`MemoryScriptStore`] keeps records in process.

mod memory;
mod postgrest;

pub use memory::MemoryScriptStore;
pub use postgrest::PostgrestScriptStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, ServiceError};
use crate::quiz::{Quiz, QuizValidator};

/// A saved script with its generated companions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    pub script: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_quiz")]
    pub quiz: Option<Quiz>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScript {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

impl NewScript {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(ServiceError::validation("User id is required"));
        }
        if self.title.trim().is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        if self.script.trim().is_empty() {
            return Err(ServiceError::validation("Script is required"));
        }
        Ok(())
    }
}

/// Partial update; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

impl ScriptUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.summary.is_none() && self.quiz.is_none()
    }

    /// Apply the set fields to `record`
    pub fn apply_to(&self, record: &mut ScriptRecord) {
        if let Some(ref title) = self.title {
            record.title = title.clone();
        }
        if let Some(ref summary) = self.summary {
            record.summary = Some(summary.clone());
        }
        if let Some(ref quiz) = self.quiz {
            record.quiz = Some(quiz.clone());
        }
    }
}

/// Storage backend for scripts
#[async_trait]
pub trait ScriptStore: Send + Sync {
    /// Backend name used in logs and health output
    fn name(&self) -> &'static str;

    async fn create(&self, script: NewScript) -> Result<ScriptRecord>;

    async fn get(&self, id: &str) -> Result<ScriptRecord>;

    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// All scripts of a user, newest first
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ScriptRecord>>;
}

/// Accept both text and numeric primary keys
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Stored quizzes pass through the same coercion as model output; one that
/// cannot be repaired loads as `None` instead of failing the whole row.
fn lenient_quiz<'de, D>(deserializer: D) -> std::result::Result<Option<Quiz>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match QuizValidator::default().coerce_value(value) {
            Ok(quiz) => Ok(Some(quiz)),
            Err(reason) => {
                warn!(reason = %reason, "Discarding unusable stored quiz");
                Ok(None)
            }
        },
    }
}
