//! Operation, object and element identifiers.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{actor::ActorId, errors::IdError};
use crate::constants::{ROOT_OBJ, START_CURSOR};

/// A globally unique operation identifier.
///
/// Ordered by `counter` first and by `actor` as the tie-break, which gives
/// every replica the same total order over all ops.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId {
    counter: u64,
    actor: ActorId,
}

impl OpId {
    /// Create an op id from its parts.
    pub fn new(counter: u64, actor: ActorId) -> Self {
        Self { counter, actor }
    }

    /// The Lamport counter of this op.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// The actor that produced this op.
    pub fn actor(&self) -> ActorId {
        self.actor
    }
}

impl Ord for OpId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter
            .cmp(&other.counter)
            .then_with(|| self.actor.cmp(&other.actor))
    }
}

impl PartialOrd for OpId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, self.actor)
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, self.actor.short())
    }
}

impl FromStr for OpId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdError::InvalidObjectId {
            value: s.to_string(),
        };
        let (counter, actor) = s.split_once('@').ok_or_else(invalid)?;
        let counter = counter.parse::<u64>().map_err(|_| invalid())?;
        let actor = actor.parse::<ActorId>().map_err(|_| invalid())?;
        Ok(Self::new(counter, actor))
    }
}

/// Identifies an object in the document.
///
/// The root map is [`ObjId::Root`]; every other object is named by the op
/// that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ObjId {
    /// The implicit root map.
    #[default]
    Root,
    /// An object created by the given op.
    Id(OpId),
}

impl ObjId {
    /// Check if this is the root map.
    pub fn is_root(&self) -> bool {
        matches!(self, ObjId::Root)
    }
}

impl From<OpId> for ObjId {
    fn from(id: OpId) -> Self {
        ObjId::Id(id)
    }
}

impl AsRef<ObjId> for ObjId {
    fn as_ref(&self) -> &ObjId {
        self
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjId::Root => write!(f, "{ROOT_OBJ}"),
            ObjId::Id(id) => write!(f, "{id}"),
        }
    }
}

impl fmt::Debug for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjId::Root => write!(f, "{ROOT_OBJ}"),
            ObjId::Id(id) => write!(f, "{id:?}"),
        }
    }
}

impl FromStr for ObjId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ROOT_OBJ {
            return Ok(ObjId::Root);
        }
        Ok(ObjId::Id(s.parse()?))
    }
}

/// Identifies a position in a sequence: the head, or an element by the op
/// that inserted it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ElemId {
    /// Before the first element.
    Head,
    /// The element inserted by the given op.
    Id(OpId),
}

/// The address an op targets inside its object.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Key {
    /// A map key.
    Map(String),
    /// A sequence element, or for inserts the element to insert after.
    Seq(ElemId),
    /// A range of a sequence, used by mark ops.
    Range {
        /// Where the range begins
        start: Anchor,
        /// Where the range ends
        end: Anchor,
    },
}

/// One side of a mark range.
///
/// Anchors bind to elements rather than positions so that ranges follow
/// concurrent edits. Binding *after* the element preceding a boundary lets
/// text typed at that boundary fall inside the range; binding *before* the
/// element following it keeps such text outside.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Anchor {
    /// The very start of the sequence.
    Start,
    /// The very end of the sequence.
    End,
    /// Immediately before the given element.
    Before(OpId),
    /// Immediately after the given element.
    After(OpId),
}

/// Caller-facing address within an object: a map key or a 0-based index.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Prop {
    /// A map key.
    Map(String),
    /// A 0-based list or text index.
    Seq(usize),
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Map(key) => write!(f, "{key}"),
            Prop::Seq(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Prop {
    fn from(key: &str) -> Self {
        Prop::Map(key.to_string())
    }
}

impl From<String> for Prop {
    fn from(key: String) -> Self {
        Prop::Map(key)
    }
}

impl From<&String> for Prop {
    fn from(key: &String) -> Self {
        Prop::Map(key.clone())
    }
}

impl From<usize> for Prop {
    fn from(index: usize) -> Self {
        Prop::Seq(index)
    }
}

/// A stable position in a list or text object.
///
/// A cursor binds to the element immediately before the position it was
/// created for, so its resolved index moves with inserts and deletes made
/// by any replica.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Cursor {
    /// Before the first element.
    Start,
    /// After the given element.
    After(OpId),
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Start => write!(f, "{START_CURSOR}"),
            Cursor::After(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for Cursor {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == START_CURSOR {
            return Ok(Cursor::Start);
        }
        Ok(Cursor::After(s.parse()?))
    }
}
