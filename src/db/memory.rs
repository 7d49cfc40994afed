use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::DocumentStore;
use crate::{
    error::{AppError, AppResult},
    models::UserId,
};

/// In-process document store for local runs and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<UserId, Map<String, Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a user's whole document, e.g. to load an older export
    pub async fn seed(&self, user_id: &UserId, doc: Value) -> AppResult<()> {
        let Value::Object(fields) = doc else {
            return Err(AppError::InvalidInput(
                "a user document must be a JSON object".to_string(),
            ));
        };
        self.documents.write().await.insert(user_id.clone(), fields);
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, user_id: &UserId) -> AppResult<Option<Value>> {
        let documents = self.documents.read().await;
        Ok(documents.get(user_id).cloned().map(Value::Object))
    }

    async fn merge_write(&self, user_id: &UserId, fields: Map<String, Value>) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        let doc = documents.entry(user_id.clone()).or_default();
        for (name, value) in fields {
            doc.insert(name, value);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
