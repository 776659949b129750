//! Configuration for documents and the sync driver.

use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    constants::MAX_SYNC_ROUNDS,
    types::ActorId,
};

/// Settings for a new [`Document`](crate::Document).
///
/// ```
/// use std::sync::Arc;
/// use accord::{ActorId, Document, DocumentConfig, FixedClock};
///
/// let actor = ActorId::random();
/// let doc = Document::with_config(
///     DocumentConfig::default()
///         .with_actor(actor)
///         .with_clock(Arc::new(FixedClock::default())),
/// );
/// assert_eq!(doc.actor(), actor);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Actor for local commits; random when `None`.
    pub actor: Option<ActorId>,
    /// Source of commit timestamps.
    pub clock: Arc<dyn Clock>,
    /// When false, commits record a time of 0 unless one is given
    /// explicitly.
    pub timestamps: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            actor: None,
            clock: Arc::new(SystemClock),
            timestamps: true,
        }
    }
}

impl DocumentConfig {
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Commit with a time of 0, making change hashes independent of when
    /// they were made.
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }
}

/// Settings for [`sync_documents`](crate::sync::sync_documents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Rounds to run before giving up. A round is one message in each
    /// direction.
    pub max_rounds: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_rounds: MAX_SYNC_ROUNDS,
        }
    }
}

impl SyncConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}
