//! Operations: the smallest unit of mutation.

use serde::{Deserialize, Serialize};

use crate::types::{Key, ObjId, OpId};
use crate::value::{ObjType, ScalarValue};

/// Whether a mark grows to cover text typed at its boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpandMark {
    /// Neither boundary grows.
    None,
    /// Text inserted at the start joins the mark.
    Before,
    /// Text inserted at the end joins the mark.
    #[default]
    After,
    /// Both boundaries grow.
    Both,
}

impl ExpandMark {
    /// Whether the start boundary grows.
    pub fn before(&self) -> bool {
        matches!(self, ExpandMark::Before | ExpandMark::Both)
    }

    /// Whether the end boundary grows.
    pub fn after(&self) -> bool {
        matches!(self, ExpandMark::After | ExpandMark::Both)
    }
}

/// What an op does to its target slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpAction {
    /// Create a nested object.
    Make(ObjType),
    /// Store a scalar.
    Put(ScalarValue),
    /// Remove the values named in `pred`.
    Delete,
    /// Add to the counters named in `pred`.
    Increment(i64),
    /// Format a range of a sequence.
    Mark {
        name: String,
        value: ScalarValue,
        expand: ExpandMark,
    },
}

/// A single mutation, tagged with its own id and the ops it supersedes.
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub id: OpId,
    pub obj: ObjId,
    pub key: Key,
    /// When set, `key` names the element this op inserts after.
    pub insert: bool,
    pub action: OpAction,
    pub pred: Vec<OpId>,
}

impl Op {
    /// Whether this op is a mark.
    pub fn is_mark(&self) -> bool {
        matches!(self.action, OpAction::Mark { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_policy_flags() {
        assert!(!ExpandMark::None.before() && !ExpandMark::None.after());
        assert!(ExpandMark::Before.before() && !ExpandMark::Before.after());
        assert!(!ExpandMark::After.before() && ExpandMark::After.after());
        assert!(ExpandMark::Both.before() && ExpandMark::Both.after());
        assert_eq!(ExpandMark::default(), ExpandMark::After);
    }
}
