//! Admitting foreign history.
//!
//! Changes may arrive in any order. A change is applied as soon as every
//! dep is in the graph; until then it waits in the queue, and every
//! successful application retries the queue. Applying a change twice is a
//! no-op, which together with the store's slot rules makes merging
//! commutative, associative and idempotent.

use std::collections::HashSet;

use super::{Document, DocumentError};
use crate::{
    Result,
    change::{Change, ChangeError},
    graph::traversal,
    types::ChangeHash,
};

impl Document {
    /// Apply foreign changes, queueing those whose deps are missing.
    ///
    /// Returns how many changes were applied, including queued changes that
    /// became ready.
    pub fn apply_changes(&mut self, changes: impl IntoIterator<Item = Change>) -> Result<usize> {
        let mut applied = 0;
        for change in changes {
            if self.is_known(&change.hash()) {
                continue;
            }
            self.check_duplicate_seq(&change)?;
            if self.history().is_causally_ready(&change) {
                self.apply_change(change)?;
                applied += 1;
            } else {
                tracing::debug!(
                    hash = %change.hash(),
                    missing = change.deps().iter().filter(|d| !self.history().contains(d)).count(),
                    "Queueing change with missing dependencies"
                );
                self.queue.push(change);
            }
        }
        while let Some(change) = self.pop_next_causally_ready_change() {
            let hash = change.hash();
            if let Err(err) = self.apply_change(change) {
                tracing::warn!(%hash, error = %err, "Dropping queued change that failed to apply");
                return Err(err);
            }
            applied += 1;
        }
        Ok(applied)
    }

    fn is_known(&self, hash: &ChangeHash) -> bool {
        self.history().contains(hash) || self.queue.iter().any(|c| c.hash() == *hash)
    }

    fn check_duplicate_seq(&self, change: &Change) -> Result<()> {
        let actor = change.actor();
        let clash = |other: ChangeHash| other != change.hash();
        let in_history = self
            .history()
            .hash_for_seq(&actor, change.seq())
            .is_some_and(clash);
        let in_queue = self
            .queue
            .iter()
            .any(|c| c.actor() == actor && c.seq() == change.seq() && clash(c.hash()));
        if in_history || in_queue {
            return Err(ChangeError::DuplicateSeq {
                actor,
                seq: change.seq(),
            }
            .into());
        }
        Ok(())
    }

    fn pop_next_causally_ready_change(&mut self) -> Option<Change> {
        let index = self
            .queue
            .iter()
            .position(|c| self.history().is_causally_ready(c))?;
        Some(self.queue.remove(index))
    }

    /// Import every change `other` has that this document lacks.
    ///
    /// Returns the new heads. Fails with `UnknownDependency` if any of
    /// `other`'s changes could not be applied because a dep is missing from
    /// both documents.
    pub fn merge(&mut self, other: &Document) -> Result<Vec<ChangeHash>> {
        let incoming: Vec<Change> = other
            .history()
            .iter()
            .filter(|c| !self.history().contains(&c.hash()))
            .cloned()
            .collect();
        let hashes: HashSet<ChangeHash> = incoming.iter().map(Change::hash).collect();
        let applied = self.apply_changes(incoming)?;
        tracing::trace!(applied, "Merged document");

        if let Some(stuck) = self.queue.iter().find(|c| hashes.contains(&c.hash())) {
            let missing = stuck
                .deps()
                .iter()
                .find(|d| !self.history().contains(d))
                .copied()
                .unwrap_or_else(|| stuck.hash());
            return Err(DocumentError::UnknownDependency {
                hash: missing.to_hex(),
            }
            .into());
        }
        Ok(self.get_heads())
    }

    /// A new document containing only the history reachable from `heads`.
    ///
    /// The fork writes as a fresh random actor.
    pub fn fork_at(&self, heads: &[ChangeHash]) -> Result<Document> {
        if let Some(unknown) = self.history().missing(heads).first() {
            return Err(DocumentError::UnknownDependency {
                hash: unknown.to_hex(),
            }
            .into());
        }
        let keep = traversal::ancestors(self.history(), heads);
        let mut forked = Document::with_config(crate::config::DocumentConfig {
            actor: None,
            clock: self.clock().clone(),
            timestamps: self.timestamps(),
        });
        let changes = self
            .history()
            .iter()
            .filter(|c| keep.contains(&c.hash()))
            .cloned();
        for change in changes {
            forked.apply_change(change)?;
        }
        Ok(forked)
    }
}
