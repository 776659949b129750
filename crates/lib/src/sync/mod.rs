//! Peer-to-peer synchronization.
//!
//! Two documents converge by exchanging [`Message`]s until neither side has
//! anything left to say. Each message carries the sender's heads, the
//! hashes it knows it is missing, a bloom filter of what it added since the
//! last shared heads, and whatever changes it believes the receiver lacks.
//!
//! The protocol is exposed as two step functions on [`Document`], so the
//! caller owns the transport and decides when to stop:
//!
//! ```
//! use accord::{Document, ROOT, ReadDoc, SyncState};
//!
//! let mut a = Document::new();
//! let mut b = Document::new();
//! a.transact(|tx| tx.put(&ROOT, "from", "a")).unwrap();
//!
//! let (mut sa, mut sb) = (SyncState::new(), SyncState::new());
//! loop {
//!     let to_b = a.generate_sync_message(&mut sa);
//!     if let Some(msg) = &to_b {
//!         b.receive_sync_message(&mut sb, msg.clone()).unwrap();
//!     }
//!     let to_a = b.generate_sync_message(&mut sb);
//!     if let Some(msg) = &to_a {
//!         a.receive_sync_message(&mut sa, msg.clone()).unwrap();
//!     }
//!     if to_b.is_none() && to_a.is_none() {
//!         break;
//!     }
//! }
//! assert_eq!(a.get_heads(), b.get_heads());
//! assert!(b.get(&ROOT, "from").unwrap().unwrap() == "a");
//! ```
//!
//! [`sync_documents`] runs that loop in memory with a round cap.

mod bloom;
mod errors;
mod message;
mod state;

pub use bloom::BloomFilter;
pub use errors::SyncError;
pub use message::{Have, Message};
pub use state::{SyncPhase, SyncState};

use std::collections::HashSet;

use crate::{
    Result, change::Change, config::SyncConfig, document::Document, graph::traversal,
    types::ChangeHash,
};

/// Outcome of [`sync_documents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Rounds in which at least one message was exchanged.
    pub rounds: usize,
    /// False if the round cap was reached first.
    pub converged: bool,
}

impl Document {
    /// Produce the next message for the peer tracked by `state`, or `None`
    /// if there is nothing to say.
    pub fn generate_sync_message(&self, state: &mut SyncState) -> Option<Message> {
        let our_heads = self.get_heads();
        let our_need = self.get_missing_deps(state.their_heads.as_deref().unwrap_or_default());

        let mut our_have = Vec::new();
        let their_heads_cover_need = state
            .their_heads
            .as_ref()
            .is_none_or(|theirs| our_need.iter().all(|h| theirs.contains(h)));
        if their_heads_cover_need {
            our_have.push(self.make_have(&state.shared_heads));
        }

        if let Some(first) = state.their_have.as_ref().and_then(|have| have.first())
            && !first
                .last_sync
                .iter()
                .all(|h| self.get_change_by_hash(h).is_some())
        {
            tracing::debug!(
                peer_last_sync = first.last_sync.len(),
                "Peer shares heads we do not know; sending reset"
            );
            state.phase = SyncPhase::AwaitingPeerChanges;
            return Some(Message {
                heads: our_heads,
                need: Vec::new(),
                have: vec![Have::default()],
                changes: Vec::new(),
            });
        }

        let mut changes = match (&state.their_have, &state.their_need) {
            (Some(have), Some(need)) => self.changes_to_send(have, need),
            _ => Vec::new(),
        };

        let heads_unchanged = state.last_sent_heads == our_heads;
        let heads_equal = state.their_heads.as_ref() == Some(&our_heads);
        if heads_unchanged {
            if heads_equal && changes.is_empty() {
                state.phase = SyncPhase::Converged;
                return None;
            }
            if state.in_flight {
                return None;
            }
        }

        changes.retain(|c| !state.sent_hashes.contains(&c.hash()));

        tracing::debug!(
            heads = our_heads.len(),
            need = our_need.len(),
            changes = changes.len(),
            "Generated sync message"
        );
        state.last_sent_heads = our_heads.clone();
        state.sent_hashes.extend(changes.iter().map(|c| c.hash()));
        state.in_flight = true;
        state.phase = SyncPhase::AwaitingPeerChanges;

        Some(Message {
            heads: our_heads,
            need: our_need,
            have: our_have,
            changes: changes.into_iter().cloned().collect(),
        })
    }

    /// Process a message from the peer tracked by `state`.
    ///
    /// Included changes go through [`apply_changes`](Self::apply_changes);
    /// changes whose deps are still missing wait in the queue and show up
    /// in the next message's `need`.
    pub fn receive_sync_message(&mut self, state: &mut SyncState, message: Message) -> Result<()> {
        let before = self.get_heads();
        let Message {
            heads,
            need,
            have,
            changes,
        } = message;
        tracing::debug!(
            heads = heads.len(),
            changes = changes.len(),
            "Received sync message"
        );

        let received_changes = !changes.is_empty();
        if received_changes {
            self.apply_changes(changes)?;
            state.shared_heads = advance_heads(&before, &self.get_heads(), &state.shared_heads);
        }

        self.forget_acknowledged(&heads, &mut state.sent_hashes);
        // A change we sent that the peer still needs was lost in transit.
        state.sent_hashes.retain(|h| !need.contains(h));
        if !received_changes && heads == before {
            state.last_sent_heads = heads.clone();
        }
        if state.sent_hashes.is_empty() {
            state.in_flight = false;
        }

        let known: Vec<ChangeHash> = heads
            .iter()
            .filter(|h| self.get_change_by_hash(h).is_some())
            .copied()
            .collect();
        if known.len() == heads.len() {
            state.shared_heads = heads.clone();
            state.in_flight = false;
            // The peer lost everything; start over.
            if heads.is_empty() {
                state.last_sent_heads.clear();
                state.sent_hashes.clear();
            }
        } else {
            state.shared_heads.extend(known);
            state.shared_heads.sort();
            state.shared_heads.dedup();
        }

        state.phase = if heads == self.get_heads() && state.sent_hashes.is_empty() {
            SyncPhase::Converged
        } else {
            SyncPhase::Idle
        };
        state.their_have = Some(have);
        state.their_heads = Some(heads);
        state.their_need = Some(need);
        Ok(())
    }

    fn make_have(&self, last_sync: &[ChangeHash]) -> Have {
        let hashes: Vec<ChangeHash> = self
            .get_changes(last_sync)
            .into_iter()
            .map(Change::hash)
            .collect();
        Have {
            last_sync: last_sync.to_vec(),
            bloom: BloomFilter::from_hashes(hashes.iter()),
        }
    }

    /// Changes the peer lacks according to its `have` and `need`: those
    /// missing from its filters, everything depending on them, and the
    /// changes it asked for by hash.
    fn changes_to_send(&self, have: &[Have], need: &[ChangeHash]) -> Vec<&Change> {
        if have.is_empty() {
            return need
                .iter()
                .filter_map(|h| self.get_change_by_hash(h))
                .collect();
        }

        let mut last_sync: Vec<ChangeHash> = have
            .iter()
            .flat_map(|h| h.last_sync.iter().copied())
            .collect();
        last_sync.sort();
        last_sync.dedup();
        let candidates = self.get_changes(&last_sync);

        let missing: Vec<ChangeHash> = candidates
            .iter()
            .map(|c| c.hash())
            .filter(|hash| have.iter().all(|h| !h.bloom.contains(hash)))
            .collect();
        // Dependents of a change past `last_sync` are past it too.
        let mut to_send = traversal::dependents(self.history(), &missing);
        to_send.extend(missing);

        let mut out: Vec<&Change> = need
            .iter()
            .filter(|h| !to_send.contains(h))
            .filter_map(|h| self.get_change_by_hash(h))
            .collect();
        out.extend(candidates.into_iter().filter(|c| to_send.contains(&c.hash())));
        out
    }

    /// Drop from `sent` every change the peer's `heads` already cover.
    fn forget_acknowledged(&self, heads: &[ChangeHash], sent: &mut HashSet<ChangeHash>) {
        let covered = traversal::ancestors(self.history(), heads);
        sent.retain(|h| !covered.contains(h));
    }
}

/// Shared heads after applying changes moved our heads from `old` to `new`:
/// our new heads plus whatever shared heads are still heads.
fn advance_heads(
    old: &[ChangeHash],
    new: &[ChangeHash],
    shared: &[ChangeHash],
) -> Vec<ChangeHash> {
    let mut advanced: Vec<ChangeHash> = new
        .iter()
        .filter(|h| !old.contains(h))
        .chain(shared.iter().filter(|h| new.contains(h)))
        .copied()
        .collect();
    advanced.sort();
    advanced.dedup();
    advanced
}

/// Sync two in-memory documents until neither has anything to send.
///
/// Each call is a new session: messages still marked in flight from an
/// earlier, interrupted session are assumed lost. A round is one message
/// from `a` to `b` followed by one from `b` to `a`. Reaching
/// `config.max_rounds` is not an error; the report says whether the
/// documents ended with the same heads.
pub fn sync_documents(
    a: &mut Document,
    a_state: &mut SyncState,
    b: &mut Document,
    b_state: &mut SyncState,
    config: &SyncConfig,
) -> Result<SyncReport> {
    a_state.reset_session();
    b_state.reset_session();
    let mut rounds = 0;
    for _ in 0..config.max_rounds {
        let to_b = a.generate_sync_message(a_state);
        let sent_to_b = to_b.is_some();
        if let Some(message) = to_b {
            b.receive_sync_message(b_state, message)?;
        }
        let to_a = b.generate_sync_message(b_state);
        let sent_to_a = to_a.is_some();
        if let Some(message) = to_a {
            a.receive_sync_message(a_state, message)?;
        }
        if !sent_to_b && !sent_to_a {
            let converged = a.get_heads() == b.get_heads();
            if converged {
                tracing::debug!(rounds, "Documents converged");
            } else {
                tracing::warn!(rounds, "Sync stalled with differing heads");
            }
            return Ok(SyncReport { rounds, converged });
        }
        rounds += 1;
    }
    tracing::warn!(
        rounds,
        max_rounds = config.max_rounds,
        "Sync round limit reached before convergence"
    );
    Ok(SyncReport {
        rounds,
        converged: false,
    })
}
