//!
//! Changes: immutable, content-addressed batches of ops.
//!
//! A `Change` is everything one actor did in one committed transaction. It
//! names the heads it was built on as its `deps`, which links all changes
//! into a Merkle-DAG. Its hash is the SHA-256 of its encoded body, so two
//! replicas agree on a change's identity without coordination.

pub mod codec;
pub mod errors;
pub mod op;

pub use codec::decode_change;
pub use errors::ChangeError;
pub use op::{ExpandMark, Op, OpAction};

use crate::types::{ActorId, ChangeHash};

/// A committed batch of ops by one actor.
///
/// Changes are created through [`ChangeBuilder`] or by decoding bytes and
/// never change afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    hash: ChangeHash,
    actor: ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: Option<String>,
    /// Kept sorted.
    deps: Vec<ChangeHash>,
    ops: Vec<Op>,
    /// The encoded form, retained so saves and sync do not re-encode.
    bytes: Vec<u8>,
}

impl Change {
    /// Start building a change for `actor`.
    pub fn builder(actor: ActorId, seq: u64, start_op: u64) -> ChangeBuilder {
        ChangeBuilder::new(actor, seq, start_op)
    }

    /// Decode a change from its binary form, verifying its hash.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChangeError> {
        decode_change(bytes)
    }

    pub fn hash(&self) -> ChangeHash {
        self.hash
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Position of this change in its actor's history, starting at 1.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Counter of the first op.
    pub fn start_op(&self) -> u64 {
        self.start_op
    }

    /// Counter of the last op, or `start_op - 1` for an empty change.
    pub fn max_op(&self) -> u64 {
        (self.start_op + self.ops.len() as u64).saturating_sub(1)
    }

    /// Commit time in milliseconds since the epoch; 0 when unset.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Hashes of the changes this one was built on, sorted.
    pub fn deps(&self) -> &[ChangeHash] {
        &self.deps
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The encoded change.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Assembles a [`Change`] and computes its hash.
///
/// ```
/// use accord::{ActorId, Change};
///
/// let actor = ActorId::random();
/// let change = Change::builder(actor, 1, 1)
///     .message("first")
///     .time(1_000)
///     .build()
///     .unwrap();
/// let decoded = Change::from_bytes(change.raw_bytes()).unwrap();
/// assert_eq!(decoded.hash(), change.hash());
/// ```
#[derive(Clone, Debug)]
pub struct ChangeBuilder {
    actor: ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: Option<String>,
    deps: Vec<ChangeHash>,
    ops: Vec<Op>,
}

impl ChangeBuilder {
    pub fn new(actor: ActorId, seq: u64, start_op: u64) -> Self {
        Self {
            actor,
            seq,
            start_op,
            time: 0,
            message: None,
            deps: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn deps(mut self, deps: Vec<ChangeHash>) -> Self {
        self.deps = deps;
        self
    }

    pub fn time(mut self, time: i64) -> Self {
        self.time = time;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn set_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Ops must carry ids `start_op`, `start_op + 1`, ... for this actor.
    pub fn ops(mut self, ops: Vec<Op>) -> Self {
        self.ops = ops;
        self
    }

    /// Sort the deps, encode the change and hash it.
    pub fn build(mut self) -> Result<Change, ChangeError> {
        self.deps.sort();
        self.deps.dedup();

        for (i, op) in self.ops.iter().enumerate() {
            if op.id.actor() != self.actor || op.id.counter() != self.start_op + i as u64 {
                return Err(ChangeError::Encode {
                    reason: format!(
                        "op {} does not follow start_op {} for actor {}",
                        op.id, self.start_op, self.actor
                    ),
                });
            }
        }

        let encoded = codec::encode(
            &self.deps,
            &self.actor,
            self.seq,
            self.start_op,
            self.time,
            self.message.as_deref(),
            &self.ops,
        )?;

        Ok(Change {
            hash: encoded.hash,
            actor: self.actor,
            seq: self.seq,
            start_op: self.start_op,
            time: self.time,
            message: self.message,
            deps: self.deps,
            ops: self.ops,
            bytes: encoded.bytes,
        })
    }
}
