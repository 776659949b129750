//! Sequence objects (lists and text) as an RGA.
//!
//! Elements are kept in document order, tombstones included. Each element
//! remembers the element it was inserted after (its origin). A new element
//! goes right after its origin, then past any neighbours with a greater op
//! id; since op counters are Lamport timestamps this gives every replica the
//! same order regardless of delivery order.

use serde::{Deserialize, Serialize};

use super::map::{Slot, SlotOp, apply_to_slot};
use crate::change::{ExpandMark, OpAction};
use crate::types::{Anchor, ElemId, OpId};
use crate::value::ScalarValue;

/// One element of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// The op that inserted this element.
    pub id: OpId,
    pub origin: ElemId,
    pub entries: Slot,
}

impl Element {
    pub fn is_visible(&self) -> bool {
        !self.entries.is_empty()
    }

    /// The winning live op.
    pub fn winner(&self) -> Option<&SlotOp> {
        self.entries.last()
    }
}

/// A stored mark op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkOp {
    pub id: OpId,
    pub start: Anchor,
    pub end: Anchor,
    pub name: String,
    pub value: ScalarValue,
    pub expand: ExpandMark,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeqState {
    elements: Vec<Element>,
    marks: Vec<MarkOp>,
}

impl SeqState {
    /// All elements in order, tombstones included.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn marks(&self) -> &[MarkOp] {
        &self.marks
    }

    /// Position of an element among all elements.
    pub fn index_of(&self, id: &OpId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    pub fn visible(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_visible())
    }

    pub fn visible_len(&self) -> usize {
        self.visible().count()
    }

    /// The `n`th visible element.
    pub fn nth_visible(&self, n: usize) -> Option<&Element> {
        self.visible().nth(n)
    }

    /// Number of visible elements among the first `end` elements.
    pub fn visible_before(&self, end: usize) -> usize {
        self.elements[..end.min(self.elements.len())]
            .iter()
            .filter(|e| e.is_visible())
            .count()
    }

    /// Insert a new element after `origin`.
    ///
    /// Returns `None` when the origin is unknown.
    pub(crate) fn insert(&mut self, origin: ElemId, entry: SlotOp) -> Option<usize> {
        let id = entry.id;
        let mut pos = match origin {
            ElemId::Head => 0,
            ElemId::Id(origin_id) => self.index_of(&origin_id)? + 1,
        };
        while pos < self.elements.len() && self.elements[pos].id > id {
            pos += 1;
        }
        self.elements.insert(
            pos,
            Element {
                id,
                origin,
                entries: vec![entry],
            },
        );
        Some(pos)
    }

    /// Apply a non-insert op to an existing element, returning its previous
    /// entries.
    pub(crate) fn apply(
        &mut self,
        elem: &OpId,
        id: OpId,
        action: &OpAction,
        pred: &[OpId],
    ) -> Option<Slot> {
        let pos = self.index_of(elem)?;
        let element = &mut self.elements[pos];
        let previous = element.entries.clone();
        apply_to_slot(&mut element.entries, id, action, pred);
        Some(previous)
    }

    pub(crate) fn restore(&mut self, elem: &OpId, previous: Slot) {
        if let Some(pos) = self.index_of(elem) {
            self.elements[pos].entries = previous;
        }
    }

    pub(crate) fn remove_element(&mut self, elem: &OpId) {
        if let Some(pos) = self.index_of(elem) {
            self.elements.remove(pos);
        }
    }

    pub(crate) fn add_mark(&mut self, mark: MarkOp) {
        let pos = self.marks.partition_point(|m| m.id < mark.id);
        self.marks.insert(pos, mark);
    }

    pub(crate) fn remove_mark(&mut self, id: &OpId) {
        self.marks.retain(|m| m.id != *id);
    }

    /// Resolve an anchor to a boundary between elements, counted over all
    /// elements. `None` if it names an unknown element.
    pub fn boundary(&self, anchor: &Anchor) -> Option<usize> {
        match anchor {
            Anchor::Start => Some(0),
            Anchor::End => Some(self.elements.len()),
            Anchor::Before(id) => self.index_of(id),
            Anchor::After(id) => self.index_of(id).map(|i| i + 1),
        }
    }
}
