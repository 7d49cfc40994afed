use std::sync::Arc;

use crate::{
    db::DocumentStore,
    services::{ListService, MetadataSource, ProfileService, ReadFailurePolicy},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub lists: ListService,
    pub profile: ProfileService,
    pub metadata: Arc<dyn MetadataSource>,
}

impl AppState {
    /// Wires the services around one document store and one metadata source
    pub fn new(
        store: Arc<dyn DocumentStore>,
        metadata: Arc<dyn MetadataSource>,
        on_read_failure: ReadFailurePolicy,
    ) -> Self {
        Self {
            lists: ListService::new(Arc::clone(&store), on_read_failure),
            profile: ProfileService::new(store),
            metadata,
        }
    }
}
