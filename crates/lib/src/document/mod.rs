//!
//! Documents: an object store plus the history that produced it.
//!
//! A [`Document`] owns:
//!
//! * the live [`OpSet`] that reads are served from
//! * the [`ChangeGraph`] of every change applied so far
//! * a queue of received changes still waiting for their dependencies
//! * the actor id and clock used for local commits
//!
//! Local writes go through [`Document::transaction`]. Foreign history
//! arrives through [`Document::apply_changes`], [`Document::merge`], the
//! persistence helpers or the sync protocol, and always ends up in the same
//! place: [`Document::apply_change`], which replays a change's ops into the
//! store and appends it to the graph.

mod errors;
mod merge;
mod persistence;
mod read;

pub use errors::DocumentError;
pub use persistence::LoadMode;
pub use read::ReadDoc;

use std::sync::Arc;

use crate::{
    Result,
    change::Change,
    clock::Clock,
    config::DocumentConfig,
    graph::ChangeGraph,
    store::OpSet,
    transaction::Transaction,
    types::{ActorId, ChangeHash},
};

/// A replicated document.
pub struct Document {
    actor: ActorId,
    ops: OpSet,
    history: ChangeGraph,
    /// Changes whose deps have not all arrived, in arrival order.
    queue: Vec<Change>,
    max_op: u64,
    clock: Arc<dyn Clock>,
    timestamps: bool,
    /// Heads at the last save, for incremental saves.
    saved_heads: Vec<ChangeHash>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with a random actor.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// An empty document writing as `actor`.
    pub fn with_actor(actor: ActorId) -> Self {
        Self::with_config(DocumentConfig::default().with_actor(actor))
    }

    /// An empty document built from `config`.
    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            actor: config.actor.unwrap_or_else(ActorId::random),
            ops: OpSet::new(),
            history: ChangeGraph::new(),
            queue: Vec::new(),
            max_op: 0,
            clock: config.clock,
            timestamps: config.timestamps,
            saved_heads: Vec::new(),
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Write future changes as `actor`. Existing history is unaffected.
    pub fn set_actor(&mut self, actor: ActorId) {
        self.actor = actor;
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn timestamps(&self) -> bool {
        self.timestamps
    }

    pub(crate) fn ops(&self) -> &OpSet {
        &self.ops
    }

    pub(crate) fn ops_mut(&mut self) -> &mut OpSet {
        &mut self.ops
    }

    pub(crate) fn history(&self) -> &ChangeGraph {
        &self.history
    }

    /// Largest op counter applied so far.
    pub fn max_op(&self) -> u64 {
        self.max_op
    }

    /// Open a transaction. Only one can be open at a time.
    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Run `f` in a transaction, committing if it returns `Ok` and rolling
    /// back otherwise.
    ///
    /// ```
    /// use accord::{Document, ReadDoc, ROOT};
    ///
    /// let mut doc = Document::new();
    /// let (value, hash) = doc
    ///     .transact(|tx| {
    ///         tx.put(&ROOT, "answer", 42)?;
    ///         Ok::<_, accord::Error>("done")
    ///     })
    ///     .unwrap();
    /// assert_eq!(value, "done");
    /// assert!(hash.is_some());
    /// assert!(doc.get(&ROOT, "answer").unwrap().unwrap() == 42);
    /// ```
    pub fn transact<F, T, E>(&mut self, f: F) -> std::result::Result<(T, Option<ChangeHash>), E>
    where
        F: FnOnce(&mut Transaction<'_>) -> std::result::Result<T, E>,
        E: From<crate::Error>,
    {
        let mut tx = self.transaction();
        match f(&mut tx) {
            Ok(value) => {
                let hash = tx.commit()?;
                Ok((value, hash))
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }

    /// Current heads, sorted.
    pub fn get_heads(&self) -> Vec<ChangeHash> {
        self.history.heads()
    }

    /// Changes not covered by `since`, in dependency order. An empty
    /// `since` returns the full history.
    pub fn get_changes(&self, since: &[ChangeHash]) -> Vec<&Change> {
        self.history.changes_since(since)
    }

    /// Every applied change in dependency order.
    pub fn get_history(&self) -> Vec<&Change> {
        self.history.iter().collect()
    }

    pub fn get_change_by_hash(&self, hash: &ChangeHash) -> Option<&Change> {
        self.history.get(hash)
    }

    /// The most recent change authored by this document's actor.
    pub fn get_last_local_change(&self) -> Option<&Change> {
        let seq = self.history.last_seq(&self.actor);
        self.history
            .hash_for_seq(&self.actor, seq)
            .and_then(|hash| self.history.get(&hash))
    }

    /// Hashes needed before `heads` and the queued changes can be applied.
    pub fn get_missing_deps(&self, heads: &[ChangeHash]) -> Vec<ChangeHash> {
        let queued: std::collections::HashSet<ChangeHash> =
            self.queue.iter().map(Change::hash).collect();
        let mut missing: Vec<ChangeHash> = self
            .queue
            .iter()
            .flat_map(|c| c.deps().iter().copied())
            .chain(heads.iter().copied())
            .filter(|h| !self.history.contains(h) && !queued.contains(h))
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Number of received changes waiting for dependencies.
    pub fn pending_changes(&self) -> usize {
        self.queue.len()
    }

    /// Every actor that has authored a change.
    pub fn actors(&self) -> Vec<ActorId> {
        self.history.actors()
    }

    /// Append a change this document just committed; its ops are already
    /// in the store.
    pub(crate) fn record_local_change(&mut self, change: Change) {
        self.max_op = self.max_op.max(change.max_op());
        self.history.add(change);
    }

    /// Replay a causally ready change into the store and the graph.
    ///
    /// If any op fails the ops already applied are reverted and the
    /// document is left unchanged.
    pub(crate) fn apply_change(&mut self, change: Change) -> Result<()> {
        let mut undo = Vec::with_capacity(change.len());
        for op in change.ops() {
            match self.ops.apply_op(op) {
                Ok(entry) => undo.push(entry),
                Err(err) => {
                    while let Some(entry) = undo.pop() {
                        self.ops.undo(entry);
                    }
                    return Err(err.into());
                }
            }
        }
        tracing::trace!(
            hash = %change.hash(),
            actor = %change.actor().short(),
            seq = change.seq(),
            ops = change.len(),
            "Applied change"
        );
        self.max_op = self.max_op.max(change.max_op());
        self.history.add(change);
        Ok(())
    }

    /// A copy of this document writing as a fresh random actor.
    pub fn fork(&self) -> Self {
        let mut forked = self.clone();
        forked.actor = ActorId::random();
        forked
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            actor: self.actor,
            ops: self.ops.clone(),
            history: self.history.clone(),
            queue: self.queue.clone(),
            max_op: self.max_op,
            clock: Arc::clone(&self.clock),
            timestamps: self.timestamps,
            saved_heads: self.saved_heads.clone(),
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("actor", &self.actor)
            .field("changes", &self.history.len())
            .field("heads", &self.history.heads())
            .field("pending", &self.queue.len())
            .field("max_op", &self.max_op)
            .finish()
    }
}
