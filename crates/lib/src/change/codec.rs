//! Binary framing and the change wire format.
//!
//! Every blob starts with [`MAGIC`] and a one-byte chunk type. Changes and
//! snapshots follow that with a 32-byte SHA-256 of the body. Bodies are
//! `postcard` encodings of serde structs.
//!
//! Op ids are not stored: the op at index `i` of a change has id
//! `(start_op + i, actor)`.

use serde::{Deserialize, Serialize};

use super::{Change, ChangeError, Op, OpAction};
use crate::constants::{CHUNK_CHANGE, HASH_LEN, MAGIC};
use crate::types::{ActorId, ChangeHash, Key, ObjId, OpId};

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Prefix `body` with the magic bytes, the chunk type and, for hashed
/// chunks, the checksum.
pub(crate) fn frame(chunk: u8, checksum: Option<&ChangeHash>, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + HASH_LEN + body.len());
    out.extend_from_slice(&MAGIC);
    out.push(chunk);
    if let Some(hash) = checksum {
        out.extend_from_slice(hash.as_bytes());
    }
    out.extend_from_slice(body);
    out
}

/// Strip the magic bytes and check the chunk type.
pub(crate) fn unframe(bytes: &[u8], chunk: u8) -> Option<&[u8]> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC || bytes[MAGIC.len()] != chunk {
        return None;
    }
    Some(&bytes[HEADER_LEN..])
}

/// The chunk type of a framed blob.
pub(crate) fn chunk_type(bytes: &[u8]) -> Option<u8> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
        return None;
    }
    Some(bytes[MAGIC.len()])
}

/// Split a checksum off the front of an unframed body.
pub(crate) fn split_checksum(rest: &[u8]) -> Option<(ChangeHash, &[u8])> {
    if rest.len() < HASH_LEN {
        return None;
    }
    let (hash, body) = rest.split_at(HASH_LEN);
    let hash = ChangeHash::try_from(hash).ok()?;
    Some((hash, body))
}

#[derive(Serialize)]
struct OpRecordRef<'a> {
    obj: &'a ObjId,
    key: &'a Key,
    insert: bool,
    action: &'a OpAction,
    pred: &'a [OpId],
}

#[derive(Deserialize)]
struct OpRecord {
    obj: ObjId,
    key: Key,
    insert: bool,
    action: OpAction,
    pred: Vec<OpId>,
}

#[derive(Serialize)]
struct ChangeBodyRef<'a> {
    deps: &'a [ChangeHash],
    actor: &'a ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: Option<&'a str>,
    ops: Vec<OpRecordRef<'a>>,
}

#[derive(Deserialize)]
struct ChangeBody {
    deps: Vec<ChangeHash>,
    actor: ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: Option<String>,
    ops: Vec<OpRecord>,
}

pub(crate) struct EncodedChange {
    pub hash: ChangeHash,
    pub bytes: Vec<u8>,
}

/// Serialize the parts of a change and compute its hash.
#[allow(clippy::too_many_arguments)]
pub(crate) fn encode(
    deps: &[ChangeHash],
    actor: &ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: Option<&str>,
    ops: &[Op],
) -> Result<EncodedChange, ChangeError> {
    let body = ChangeBodyRef {
        deps,
        actor,
        seq,
        start_op,
        time,
        message,
        ops: ops
            .iter()
            .map(|op| OpRecordRef {
                obj: &op.obj,
                key: &op.key,
                insert: op.insert,
                action: &op.action,
                pred: &op.pred,
            })
            .collect(),
    };
    let body = postcard::to_allocvec(&body).map_err(|e| ChangeError::Encode {
        reason: e.to_string(),
    })?;
    let hash = ChangeHash::digest(&body);
    Ok(EncodedChange {
        hash,
        bytes: frame(CHUNK_CHANGE, Some(&hash), &body),
    })
}

/// Decode a change, verifying its hash.
pub fn decode_change(bytes: &[u8]) -> Result<Change, ChangeError> {
    let rest = unframe(bytes, CHUNK_CHANGE).ok_or_else(|| ChangeError::Decode {
        reason: "missing change header".to_string(),
    })?;
    let (declared, body) = split_checksum(rest).ok_or_else(|| ChangeError::Decode {
        reason: "truncated change hash".to_string(),
    })?;
    let computed = ChangeHash::digest(body);
    if computed != declared {
        return Err(ChangeError::CorruptChange {
            declared: declared.to_hex(),
            computed: computed.to_hex(),
        });
    }
    let body: ChangeBody = postcard::from_bytes(body).map_err(|e| ChangeError::Decode {
        reason: e.to_string(),
    })?;

    let ops = body
        .ops
        .into_iter()
        .enumerate()
        .map(|(i, record)| Op {
            id: OpId::new(body.start_op + i as u64, body.actor),
            obj: record.obj,
            key: record.key,
            insert: record.insert,
            action: record.action,
            pred: record.pred,
        })
        .collect();

    Ok(Change {
        hash: declared,
        actor: body.actor,
        seq: body.seq,
        start_op: body.start_op,
        time: body.time,
        message: body.message,
        deps: body.deps,
        ops,
        bytes: bytes.to_vec(),
    })
}
