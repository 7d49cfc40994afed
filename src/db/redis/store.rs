use std::collections::HashMap;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use serde_json::{Map, Value};

use crate::db::DocumentStore;
use crate::error::AppResult;
use crate::models::UserId;

/// Creates a Redis client
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Hash key holding a user's document
fn document_key(user_id: &UserId) -> String {
    format!("user:{}", user_id)
}

/// User documents stored as Redis hashes
///
/// Each top-level document field is one hash field holding JSON text, so a
/// merge write is a single `HSET` of the named fields.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects through a reconnecting connection manager
    pub async fn connect(client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Rebuilds a document from its hash fields
    ///
    /// Fields that do not hold valid JSON are kept as plain strings.
    fn decode(raw: HashMap<String, String>) -> Option<Value> {
        if raw.is_empty() {
            return None;
        }

        let fields = raw
            .into_iter()
            .map(|(name, text)| {
                let value = serde_json::from_str(&text).unwrap_or_else(|e| {
                    tracing::warn!(field = %name, error = %e, "Non-JSON hash field in user document");
                    Value::String(text)
                });
                (name, value)
            })
            .collect::<Map<String, Value>>();

        Some(Value::Object(fields))
    }

    fn encode(fields: &Map<String, Value>) -> Vec<(String, String)> {
        fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

#[async_trait::async_trait]
impl DocumentStore for RedisStore {
    async fn read(&self, user_id: &UserId) -> AppResult<Option<Value>> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(document_key(user_id)).await?;
        Ok(Self::decode(raw))
    }

    async fn merge_write(&self, user_id: &UserId, fields: Map<String, Value>) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let items = Self::encode(&fields);
        let mut conn = self.conn.clone();
        let _: () = conn.hset_multiple(document_key(user_id), &items).await?;

        tracing::debug!(user_id = %user_id, field_count = items.len(), "Merged fields into user hash");

        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
