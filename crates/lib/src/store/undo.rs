//! Undo records for ops applied to the store.

use super::map::Slot;
use crate::types::{ObjId, OpId};

/// How to revert one applied op.
#[derive(Debug, Clone)]
pub(crate) enum UndoKind {
    /// Restore the previous contents of a map key.
    MapSlot { key: String, previous: Slot },
    /// Restore the previous entries of a sequence element.
    SeqSlot { elem: OpId, previous: Slot },
    /// Remove an inserted element.
    Inserted { elem: OpId },
    /// Remove a mark.
    Marked { id: OpId },
}

/// Reverts one op. Entries must be reverted newest first.
#[derive(Debug, Clone)]
pub(crate) struct Undo {
    pub obj: ObjId,
    pub kind: UndoKind,
    /// The object this op created, if any.
    pub created: Option<ObjId>,
}
