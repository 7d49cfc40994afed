use std::sync::Arc;

use tracing::instrument;

use crate::{
    db::DocumentStore,
    error::AppResult,
    models::{Membership, PreferencesUpdate, UserId, UserPreferences},
};

/// Settings and account bootstrap for a user's document
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn preferences(&self, user_id: &UserId) -> AppResult<UserPreferences> {
        let doc = self.store.read(user_id).await?;
        Ok(UserPreferences::from_document(doc.as_ref()))
    }

    /// Writes the supplied settings in one merge and returns the result
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_preferences(
        &self,
        user_id: &UserId,
        update: &PreferencesUpdate,
    ) -> AppResult<UserPreferences> {
        let fields = update.to_fields()?;
        let changed: Vec<&str> = fields.keys().map(String::as_str).collect();
        tracing::info!(fields = ?changed, "Updating preferences");

        self.store.merge_write(user_id, fields).await?;
        self.preferences(user_id).await
    }

    /// Creates the user's document with empty lists and default settings
    ///
    /// Returns `false` and leaves the document alone if one already exists.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn provision(&self, user_id: &UserId, email: Option<String>) -> AppResult<bool> {
        if self.store.read(user_id).await?.is_some() {
            tracing::debug!("User document already exists");
            return Ok(false);
        }

        let preferences = UserPreferences {
            email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            ..UserPreferences::default()
        };

        let mut fields = preferences.to_fields();
        if let serde_json::Value::Object(lists) = Membership::default().to_document() {
            fields.extend(lists);
        }

        self.store.merge_write(user_id, fields).await?;
        tracing::info!("Provisioned user document");

        Ok(true)
    }
}
