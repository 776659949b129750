//! Map objects and the slot rules shared with sequence elements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::change::OpAction;
use crate::types::{ObjId, OpId};
use crate::value::{ObjType, ScalarValue, Value};

/// What a live op holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlotValue {
    Scalar(ScalarValue),
    Object(ObjType),
}

/// A live value in a slot, tagged with the op that wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotOp {
    pub id: OpId,
    pub value: SlotValue,
}

impl SlotOp {
    /// The value as seen by readers.
    pub fn to_value(&self) -> Value {
        match &self.value {
            SlotValue::Scalar(s) => Value::Scalar(s.clone()),
            SlotValue::Object(typ) => Value::Object(*typ, ObjId::Id(self.id)),
        }
    }
}

/// The live ops of one map key or sequence element, sorted by op id.
///
/// The last entry is the winner. An empty slot means the key is absent or
/// the element is a tombstone.
pub type Slot = Vec<SlotOp>;

/// Apply a non-insert op to a slot.
///
/// - puts and makes remove their predecessors and add themselves
/// - deletes remove their predecessors
/// - increments add to every counter among their predecessors
pub(crate) fn apply_to_slot(slot: &mut Slot, id: OpId, action: &OpAction, pred: &[OpId]) {
    match action {
        OpAction::Put(value) => {
            slot.retain(|o| !pred.contains(&o.id));
            insert_sorted(
                slot,
                SlotOp {
                    id,
                    value: SlotValue::Scalar(value.clone()),
                },
            );
        }
        OpAction::Make(typ) => {
            slot.retain(|o| !pred.contains(&o.id));
            insert_sorted(
                slot,
                SlotOp {
                    id,
                    value: SlotValue::Object(*typ),
                },
            );
        }
        OpAction::Delete => slot.retain(|o| !pred.contains(&o.id)),
        OpAction::Increment(by) => {
            for live in slot.iter_mut().filter(|o| pred.contains(&o.id)) {
                if let SlotValue::Scalar(ScalarValue::Counter(n)) = &mut live.value {
                    *n = n.wrapping_add(*by);
                }
            }
        }
        OpAction::Mark { .. } => {}
    }
}

fn insert_sorted(slot: &mut Slot, op: SlotOp) {
    let pos = slot.partition_point(|o| o.id < op.id);
    slot.insert(pos, op);
}

/// A map object: key to live ops. Absent keys have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    entries: BTreeMap<String, Slot>,
}

impl MapState {
    pub fn get(&self, key: &str) -> &[SlotOp] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Winning value per key, in key order.
    pub fn winners(&self) -> impl Iterator<Item = (&str, &SlotOp)> {
        self.entries
            .iter()
            .filter_map(|(k, slot)| slot.last().map(|op| (k.as_str(), op)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply an op and return the slot contents it replaced.
    pub(crate) fn apply(&mut self, key: &str, id: OpId, action: &OpAction, pred: &[OpId]) -> Slot {
        let slot = self.entries.entry(key.to_string()).or_default();
        let previous = slot.clone();
        apply_to_slot(slot, id, action, pred);
        if slot.is_empty() {
            self.entries.remove(key);
        }
        previous
    }

    pub(crate) fn restore(&mut self, key: &str, previous: Slot) {
        if previous.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), previous);
        }
    }
}
