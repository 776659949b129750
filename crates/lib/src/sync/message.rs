//! Sync messages and their wire format.

use serde::{Deserialize, Serialize};

use super::{BloomFilter, SyncError};
use crate::{
    Result,
    change::{
        Change,
        codec::{frame, unframe},
    },
    constants::CHUNK_SYNC_MESSAGE,
    types::ChangeHash,
};

/// A summary of the changes a peer added since `last_sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Have {
    /// Heads both peers had in common when the filter was built.
    pub last_sync: Vec<ChangeHash>,
    /// Every change added since `last_sync`.
    pub bloom: BloomFilter,
}

/// One step of the sync protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The sender's heads.
    pub heads: Vec<ChangeHash>,
    /// Hashes the sender knows it is missing.
    pub need: Vec<ChangeHash>,
    /// Summaries of what the sender has. A single empty summary asks the
    /// receiver to resend everything.
    pub have: Vec<Have>,
    /// Changes the sender believes the receiver lacks.
    pub changes: Vec<Change>,
}

#[derive(Serialize)]
struct MessageRef<'a> {
    heads: &'a [ChangeHash],
    need: &'a [ChangeHash],
    have: &'a [Have],
    changes: Vec<&'a [u8]>,
}

#[derive(Deserialize)]
struct MessageBody {
    heads: Vec<ChangeHash>,
    need: Vec<ChangeHash>,
    have: Vec<Have>,
    changes: Vec<Vec<u8>>,
}

impl Message {
    /// Encode as `MAGIC | 0x42 | body`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = MessageRef {
            heads: &self.heads,
            need: &self.need,
            have: &self.have,
            changes: self.changes.iter().map(Change::raw_bytes).collect(),
        };
        let body = postcard::to_allocvec(&body).map_err(|e| SyncError::protocol(e.to_string()))?;
        Ok(frame(CHUNK_SYNC_MESSAGE, None, &body))
    }

    /// Decode a message. Bad framing or a malformed body is a
    /// `ProtocolError`; an embedded change that fails its hash check is
    /// reported as `CorruptChange`.
    pub fn decode(bytes: &[u8]) -> Result<Message> {
        let body = unframe(bytes, CHUNK_SYNC_MESSAGE)
            .ok_or_else(|| SyncError::protocol("not a sync message"))?;
        let body: MessageBody =
            postcard::from_bytes(body).map_err(|e| SyncError::protocol(e.to_string()))?;
        let changes = body
            .changes
            .iter()
            .map(|raw| Change::from_bytes(raw))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Message {
            heads: body.heads,
            need: body.need,
            have: body.have,
            changes,
        })
    }
}
