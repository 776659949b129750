//! Per-peer sync state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Have, SyncError};
use crate::{
    Result,
    change::codec::{frame, unframe},
    constants::CHUNK_SYNC_STATE,
    types::ChangeHash,
};

/// Where a sync session with one peer stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing sent yet, or the last exchange left work to do.
    #[default]
    Idle,
    /// A message is in flight and we are waiting for the reply.
    AwaitingPeerChanges,
    /// Both sides report the same heads and nothing is outstanding.
    Converged,
}

/// What we know about one peer.
///
/// Keep one state per peer per document and pass it to every
/// [`generate_sync_message`](crate::Document::generate_sync_message) and
/// [`receive_sync_message`](crate::Document::receive_sync_message) call.
/// Only the shared heads survive [`encode`](Self::encode); everything else
/// is rebuilt during the next session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    /// Heads both sides are known to have.
    pub(crate) shared_heads: Vec<ChangeHash>,
    /// Our heads as of the last message we sent.
    pub(crate) last_sent_heads: Vec<ChangeHash>,
    pub(crate) their_heads: Option<Vec<ChangeHash>>,
    pub(crate) their_need: Option<Vec<ChangeHash>>,
    pub(crate) their_have: Option<Vec<Have>>,
    /// Changes sent that the peer has not acknowledged yet.
    pub(crate) sent_hashes: HashSet<ChangeHash>,
    pub(crate) in_flight: bool,
    pub(crate) phase: SyncPhase,
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    shared_heads: Vec<ChangeHash>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_heads(&self) -> &[ChangeHash] {
        &self.shared_heads
    }

    /// The peer's heads from its last message, if any.
    pub fn their_heads(&self) -> Option<&[ChangeHash]> {
        self.their_heads.as_deref()
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Start a new session with the same peer.
    ///
    /// Forgets what was sent but not acknowledged, so anything lost with
    /// the previous connection is offered again. What is known about the
    /// peer's heads and summaries is kept.
    pub fn reset_session(&mut self) {
        self.last_sent_heads.clear();
        self.sent_hashes.clear();
        self.in_flight = false;
        if self.phase == SyncPhase::AwaitingPeerChanges {
            self.phase = SyncPhase::Idle;
        }
    }

    /// Encode the shared heads as `MAGIC | 0x43 | body`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = postcard::to_allocvec(&PersistedState {
            shared_heads: self.shared_heads.clone(),
        })
        .map_err(|e| SyncError::protocol(e.to_string()))?;
        Ok(frame(CHUNK_SYNC_STATE, None, &body))
    }

    /// Restore a state saved with [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<SyncState> {
        let body =
            unframe(bytes, CHUNK_SYNC_STATE).ok_or_else(|| SyncError::protocol("not a sync state"))?;
        let persisted: PersistedState =
            postcard::from_bytes(body).map_err(|e| SyncError::protocol(e.to_string()))?;
        Ok(SyncState {
            shared_heads: persisted.shared_heads,
            ..SyncState::default()
        })
    }
}
