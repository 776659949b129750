//! The change graph: an append-only arena of changes linked by deps.
//!
//! Changes are stored in the order they were admitted. A change is only
//! admitted once all its deps are present, so arena order is always a
//! topological order. Heads are the changes no other known change depends
//! on.

pub(crate) mod traversal;

use std::collections::{BTreeSet, HashMap};

use crate::change::Change;
use crate::types::{ActorId, ChangeHash};

/// Arena of committed changes with a hash index.
#[derive(Clone, Debug, Default)]
pub struct ChangeGraph {
    changes: Vec<Change>,
    index: HashMap<ChangeHash, usize>,
    heads: BTreeSet<ChangeHash>,
    /// (actor, seq) to the change holding it.
    seqs: HashMap<(ActorId, u64), ChangeHash>,
    last_seq: HashMap<ActorId, u64>,
}

impl ChangeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn contains(&self, hash: &ChangeHash) -> bool {
        self.index.contains_key(hash)
    }

    pub fn get(&self, hash: &ChangeHash) -> Option<&Change> {
        self.index.get(hash).map(|&i| &self.changes[i])
    }

    /// Current heads, sorted ascending.
    pub fn heads(&self) -> Vec<ChangeHash> {
        self.heads.iter().copied().collect()
    }

    /// All changes in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// The highest seq admitted for `actor`, or 0.
    pub fn last_seq(&self, actor: &ActorId) -> u64 {
        self.last_seq.get(actor).copied().unwrap_or(0)
    }

    /// The change holding `(actor, seq)`, if any.
    pub fn hash_for_seq(&self, actor: &ActorId, seq: u64) -> Option<ChangeHash> {
        self.seqs.get(&(*actor, seq)).copied()
    }

    /// Every actor that has authored a change, sorted.
    pub fn actors(&self) -> Vec<ActorId> {
        let mut actors: Vec<ActorId> = self.last_seq.keys().copied().collect();
        actors.sort();
        actors
    }

    /// Whether every dep of `change` is already present.
    pub fn is_causally_ready(&self, change: &Change) -> bool {
        change.deps().iter().all(|dep| self.contains(dep))
    }

    /// Append a change whose deps are all present.
    ///
    /// Returns false without modifying the graph if the change is already
    /// known.
    pub(crate) fn add(&mut self, change: Change) -> bool {
        let hash = change.hash();
        if self.contains(&hash) {
            return false;
        }
        for dep in change.deps() {
            self.heads.remove(dep);
        }
        self.heads.insert(hash);
        self.seqs.insert((change.actor(), change.seq()), hash);
        let last = self.last_seq.entry(change.actor()).or_insert(0);
        *last = (*last).max(change.seq());
        self.index.insert(hash, self.changes.len());
        self.changes.push(change);
        true
    }

    /// Changes reachable from the heads but not from `since`, in
    /// topological order. An empty `since` yields the whole history.
    pub fn changes_since(&self, since: &[ChangeHash]) -> Vec<&Change> {
        let covered = traversal::ancestors(self, since);
        self.changes
            .iter()
            .filter(|c| !covered.contains(&c.hash()))
            .collect()
    }

    /// Hashes from `heads` that are not in the graph.
    pub fn missing(&self, heads: &[ChangeHash]) -> Vec<ChangeHash> {
        traversal::missing(self, heads)
    }
}
