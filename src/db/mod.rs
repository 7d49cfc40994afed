//! Remote document store abstraction
//!
//! One JSON document per user id. Writes are merges that replace each named
//! top-level field wholesale; there are no transactions across fields and no
//! optimistic lock token.
use serde_json::{Map, Value};

use crate::{error::AppResult, models::UserId};

pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};
pub use redis::{create_redis_client, RedisStore};

/// Key-value document store keyed by user id
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the whole document, `None` when the user has none yet
    async fn read(&self, user_id: &UserId) -> AppResult<Option<Value>>;

    /// Replaces the given top-level fields, leaving all others untouched
    ///
    /// Creates the document if it does not exist.
    async fn merge_write(&self, user_id: &UserId, fields: Map<String, Value>) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
