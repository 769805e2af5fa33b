use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{NewScript, ScriptRecord, ScriptStore, ScriptUpdate};
use crate::error::{Result, ServiceError};

/// In-process script store
#[derive(Debug, Default)]
pub struct MemoryScriptStore {
    records: RwLock<HashMap<String, ScriptRecord>>,
}

impl MemoryScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::not_found(format!("Script {} not found", id))
}

#[async_trait]
impl ScriptStore for MemoryScriptStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, script: NewScript) -> Result<ScriptRecord> {
        script.validate()?;

        let record = ScriptRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: script.user_id,
            title: script.title,
            prompt: script.prompt,
            script: script.script,
            summary: script.summary,
            quiz: script.quiz,
            created_at: Utc::now(),
        };

        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<ScriptRecord> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or_else(|| not_found(id))?;
        update.apply_to(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ScriptRecord>> {
        let mut scripts: Vec<ScriptRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();

        scripts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(scripts)
    }
}
