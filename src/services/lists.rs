use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    db::DocumentStore,
    error::{AppError, AppResult},
    models::{ContentItem, ContentType, ItemStatus, ListKind, Membership, UserId},
    services::{
        membership::{self, ListSlot, ListWrite, Transition},
        normalizer,
    },
};

/// What a mutation does when the pre-mutation read fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailurePolicy {
    /// Surface the read error and write nothing
    #[default]
    Abort,
    /// Treat the item as a member of no list and carry on
    ///
    /// The resulting writes replace whole list fields computed from an empty
    /// membership, so other items in the touched lists are dropped.
    AssumeEmpty,
}

/// A merge write that did not land
#[derive(Debug, Clone, PartialEq)]
pub struct FailedWrite {
    pub write: ListWrite,
    pub error: String,
}

/// How the writes of one mutation fared
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Every write landed (or there was nothing to write)
    Applied { written: Vec<ListSlot> },
    /// Some writes landed; the store now holds a mix of old and new lists
    Partial {
        written: Vec<ListSlot>,
        failed: Vec<FailedWrite>,
    },
    /// No write landed
    Failed { failed: Vec<FailedWrite> },
}

impl WriteOutcome {
    fn from_parts(written: Vec<ListSlot>, failed: Vec<FailedWrite>) -> Self {
        if failed.is_empty() {
            WriteOutcome::Applied { written }
        } else if written.is_empty() {
            WriteOutcome::Failed { failed }
        } else {
            WriteOutcome::Partial { written, failed }
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied { .. })
    }

    pub fn written(&self) -> &[ListSlot] {
        match self {
            WriteOutcome::Applied { written } | WriteOutcome::Partial { written, .. } => written,
            WriteOutcome::Failed { .. } => &[],
        }
    }

    pub fn failed(&self) -> &[FailedWrite] {
        match self {
            WriteOutcome::Applied { .. } => &[],
            WriteOutcome::Partial { failed, .. } | WriteOutcome::Failed { failed } => failed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WriteOutcome::Applied { .. } => "applied",
            WriteOutcome::Partial { .. } => "partial",
            WriteOutcome::Failed { .. } => "failed",
        }
    }
}

/// A dispatched mutation: what was there, what was proposed, what landed
#[derive(Debug, Clone)]
pub struct Mutation {
    pub previous: Membership,
    pub transition: Transition,
    pub outcome: WriteOutcome,
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }

    /// Membership to show the user
    ///
    /// The proposed state only once every write landed; otherwise the state
    /// read before the mutation.
    pub fn visible_state(&self) -> &Membership {
        if self.is_applied() {
            &self.transition.state
        } else {
            &self.previous
        }
    }

    pub fn visible_status(&self) -> ItemStatus {
        if self.is_applied() {
            self.transition.after
        } else {
            self.transition.before
        }
    }
}

/// Read-before-write front end of the membership engine
///
/// Loads and normalizes the user's document, computes the transition, then
/// dispatches the merge writes concurrently and waits for all of them.
/// Holds no per-user state and takes no locks: two mutations racing on the
/// same user can both read the same snapshot, and the later writes win.
#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn DocumentStore>,
    on_read_failure: ReadFailurePolicy,
}

impl ListService {
    pub fn new(store: Arc<dyn DocumentStore>, on_read_failure: ReadFailurePolicy) -> Self {
        Self {
            store,
            on_read_failure,
        }
    }

    /// Canonical membership for a user
    #[instrument(skip(self), fields(user_id = %user_id, store = self.store.name()))]
    pub async fn load(&self, user_id: &UserId) -> AppResult<Membership> {
        let doc = self.store.read(user_id).await?;

        tracing::debug!(shape = ?normalizer::detect_shape(doc.as_ref()), "Loaded user document");

        Ok(normalizer::normalize(doc.as_ref()))
    }

    /// Which lists hold one item
    pub async fn status(&self, user_id: &UserId, item: &ContentItem) -> AppResult<ItemStatus> {
        Ok(self.load(user_id).await?.status(item))
    }

    /// Raw add: no exclusivity rules
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item.id))]
    pub async fn add(
        &self,
        user_id: &UserId,
        item: &ContentItem,
        list: ListKind,
    ) -> AppResult<Mutation> {
        let previous = self.load_for_mutation(user_id).await?;
        let transition = membership::add(&previous, item, list);
        Ok(self.dispatch(user_id, previous, transition).await)
    }

    /// Raw remove: no exclusivity rules
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn remove(
        &self,
        user_id: &UserId,
        item_id: &str,
        list: ListKind,
        content_type: ContentType,
    ) -> AppResult<Mutation> {
        let previous = self.load_for_mutation(user_id).await?;
        let transition = membership::remove(&previous, item_id, list, content_type);
        Ok(self.dispatch(user_id, previous, transition).await)
    }

    /// Policy toggle with the exclusivity rules
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item.id))]
    pub async fn toggle(
        &self,
        user_id: &UserId,
        item: &ContentItem,
        list: ListKind,
    ) -> AppResult<Mutation> {
        let previous = self.load_for_mutation(user_id).await?;
        let transition = membership::toggle(&previous, item, list);

        tracing::info!(
            before = ?transition.before,
            after = ?transition.after,
            write_count = transition.writes.len(),
            "Toggling list membership"
        );

        Ok(self.dispatch(user_id, previous, transition).await)
    }

    /// Sends a precomputed transition's writes
    pub async fn dispatch(
        &self,
        user_id: &UserId,
        previous: Membership,
        transition: Transition,
    ) -> Mutation {
        let outcome = self.write_all(user_id, transition.writes.clone()).await;

        match &outcome {
            WriteOutcome::Applied { written } => {
                tracing::debug!(user_id = %user_id, write_count = written.len(), "Mutation applied");
            }
            WriteOutcome::Partial { written, failed } => {
                tracing::warn!(
                    user_id = %user_id,
                    success_count = written.len(),
                    error_count = failed.len(),
                    "Partial list write failure; stored lists may break exclusivity until retried"
                );
            }
            WriteOutcome::Failed { failed } => {
                tracing::error!(user_id = %user_id, error_count = failed.len(), "List write failed");
            }
        }

        Mutation {
            previous,
            transition,
            outcome,
        }
    }

    /// Re-sends only the writes that failed
    ///
    /// The writes carry the values computed at mutation time, so anything
    /// written to those lists since then is overwritten.
    #[instrument(skip(self, mutation), fields(user_id = %user_id))]
    pub async fn retry(&self, user_id: &UserId, mutation: Mutation) -> Mutation {
        let failed: Vec<ListWrite> = mutation
            .outcome
            .failed()
            .iter()
            .map(|f| f.write.clone())
            .collect();

        if failed.is_empty() {
            return mutation;
        }

        tracing::info!(retry_count = failed.len(), "Retrying failed list writes");

        let retried = self.write_all(user_id, failed).await;

        let mut written = mutation.outcome.written().to_vec();
        written.extend_from_slice(retried.written());
        let outcome = WriteOutcome::from_parts(written, retried.failed().to_vec());

        Mutation { outcome, ..mutation }
    }

    async fn load_for_mutation(&self, user_id: &UserId) -> AppResult<Membership> {
        match self.load(user_id).await {
            Ok(membership) => Ok(membership),
            Err(e) => match self.on_read_failure {
                ReadFailurePolicy::Abort => Err(e),
                ReadFailurePolicy::AssumeEmpty => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "Read before write failed, continuing from an empty membership"
                    );
                    Ok(Membership::default())
                }
            },
        }
    }

    async fn write_all(&self, user_id: &UserId, writes: Vec<ListWrite>) -> WriteOutcome {
        let mut tasks = Vec::with_capacity(writes.len());

        for write in writes {
            let store = Arc::clone(&self.store);
            let user_id = user_id.clone();
            let fields = write.to_fields();
            let task = tokio::spawn(async move { store.merge_write(&user_id, fields).await });
            tasks.push((write, task));
        }

        let mut written = Vec::new();
        let mut failed = Vec::new();

        for (write, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(AppError::Internal(e.to_string())),
            };

            match result {
                Ok(()) => written.push(write.slot()),
                Err(e) => {
                    tracing::error!(
                        user_id = %user_id,
                        list = %write.list,
                        content_type = %write.content_type,
                        error = %e,
                        "List write failed"
                    );
                    failed.push(FailedWrite {
                        write,
                        error: e.to_string(),
                    });
                }
            }
        }

        WriteOutcome::from_parts(written, failed)
    }
}

/// Failed slot as reported to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSlot {
    #[serde(flatten)]
    pub slot: ListSlot,
    pub error: String,
}

impl From<&FailedWrite> for FailedSlot {
    fn from(failed: &FailedWrite) -> Self {
        Self {
            slot: failed.write.slot(),
            error: failed.error.clone(),
        }
    }
}
