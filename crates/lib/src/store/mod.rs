//! The object store: live state built by applying ops.
//!
//! An [`OpSet`] holds one [`ObjectState`] per object ever created, keyed by
//! [`ObjId`]. Map objects map keys to slots of live ops; lists and text are
//! RGA sequences whose elements each own a slot. A slot keeps every live
//! value so concurrent writes stay visible as conflicts, and the value with
//! the highest op id wins reads.
//!
//! Applying an op returns an [`Undo`](undo::Undo) record so an open
//! transaction can be rolled back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod map;
pub mod seq;
pub(crate) mod undo;

pub use errors::StoreError;
pub use map::{MapState, SlotOp, SlotValue};
pub use seq::{Element, MarkOp, SeqState};

use crate::change::{Op, OpAction};
use crate::types::{ElemId, Key, ObjId, OpId, Prop};
use crate::value::{ObjType, Value};
use undo::{Undo, UndoKind};

/// The contents of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjData {
    Map(MapState),
    Seq(SeqState),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    typ: ObjType,
    data: ObjData,
}

impl ObjectState {
    fn new(typ: ObjType) -> Self {
        let data = match typ {
            ObjType::Map => ObjData::Map(MapState::default()),
            ObjType::List | ObjType::Text => ObjData::Seq(SeqState::default()),
        };
        Self { typ, data }
    }

    pub fn typ(&self) -> ObjType {
        self.typ
    }

    pub fn data(&self) -> &ObjData {
        &self.data
    }
}

/// Every object in a document and its live contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpSet {
    objects: BTreeMap<ObjId, ObjectState>,
}

impl Default for OpSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OpSet {
    /// A store holding only the empty root map.
    pub fn new() -> Self {
        let mut objects = BTreeMap::new();
        objects.insert(ObjId::Root, ObjectState::new(ObjType::Map));
        Self { objects }
    }

    pub fn object(&self, obj: &ObjId) -> Result<&ObjectState, StoreError> {
        self.objects
            .get(obj)
            .ok_or_else(|| StoreError::ObjectNotFound {
                obj: obj.to_string(),
            })
    }

    pub fn object_type(&self, obj: &ObjId) -> Result<ObjType, StoreError> {
        Ok(self.object(obj)?.typ)
    }

    /// The map state of `obj`, or `TypeMismatch` if it is a sequence.
    pub fn map(&self, obj: &ObjId) -> Result<&MapState, StoreError> {
        let state = self.object(obj)?;
        match &state.data {
            ObjData::Map(map) => Ok(map),
            ObjData::Seq(_) => Err(StoreError::type_mismatch("map", state.typ)),
        }
    }

    /// The sequence state of `obj`, which must be of kind `typ`.
    pub fn seq_of(&self, obj: &ObjId, typ: ObjType) -> Result<&SeqState, StoreError> {
        let state = self.object(obj)?;
        match &state.data {
            ObjData::Seq(seq) if state.typ == typ => Ok(seq),
            _ => Err(StoreError::type_mismatch(typ.to_string(), state.typ)),
        }
    }

    /// The sequence state of `obj`, list or text.
    pub fn seq(&self, obj: &ObjId) -> Result<&SeqState, StoreError> {
        let state = self.object(obj)?;
        match &state.data {
            ObjData::Seq(seq) => Ok(seq),
            ObjData::Map(_) => Err(StoreError::type_mismatch("list or text", state.typ)),
        }
    }

    /// Apply one op and return how to revert it.
    pub(crate) fn apply_op(&mut self, op: &Op) -> Result<Undo, StoreError> {
        let state = self
            .objects
            .get_mut(&op.obj)
            .ok_or_else(|| StoreError::MissingObject {
                op: op.id.to_string(),
                obj: op.obj.to_string(),
            })?;
        let typ = state.typ;
        let missing_elem = |elem: &OpId| StoreError::MissingElement {
            obj: op.obj.to_string(),
            elem: elem.to_string(),
        };

        let kind = match (&mut state.data, &op.key) {
            (ObjData::Map(map), Key::Map(key)) if !op.insert && !op.is_mark() => {
                let previous = map.apply(key, op.id, &op.action, &op.pred);
                UndoKind::MapSlot {
                    key: key.clone(),
                    previous,
                }
            }
            (ObjData::Seq(seq), Key::Seq(origin)) if op.insert => {
                let value = match &op.action {
                    OpAction::Put(v) => SlotValue::Scalar(v.clone()),
                    OpAction::Make(t) => SlotValue::Object(*t),
                    other => {
                        return Err(StoreError::type_mismatch(
                            "put or make for insert",
                            format!("{other:?}"),
                        ));
                    }
                };
                seq.insert(*origin, SlotOp { id: op.id, value })
                    .ok_or_else(|| match origin {
                        ElemId::Id(id) => missing_elem(id),
                        ElemId::Head => missing_elem(&op.id),
                    })?;
                UndoKind::Inserted { elem: op.id }
            }
            (ObjData::Seq(seq), Key::Seq(ElemId::Id(elem))) if !op.is_mark() => {
                let previous = seq
                    .apply(elem, op.id, &op.action, &op.pred)
                    .ok_or_else(|| missing_elem(elem))?;
                UndoKind::SeqSlot {
                    elem: *elem,
                    previous,
                }
            }
            (ObjData::Seq(seq), Key::Range { start, end }) if typ == ObjType::Text => {
                let OpAction::Mark {
                    name,
                    value,
                    expand,
                } = &op.action
                else {
                    return Err(StoreError::type_mismatch("mark", format!("{:?}", op.action)));
                };
                seq.add_mark(MarkOp {
                    id: op.id,
                    start: *start,
                    end: *end,
                    name: name.clone(),
                    value: value.clone(),
                    expand: *expand,
                });
                UndoKind::Marked { id: op.id }
            }
            (_, key) => {
                return Err(StoreError::type_mismatch(
                    format!("key valid for {typ}"),
                    format!("{key:?}"),
                ));
            }
        };

        let created = match &op.action {
            OpAction::Make(new_typ) => {
                let id = ObjId::Id(op.id);
                self.objects.insert(id, ObjectState::new(*new_typ));
                Some(id)
            }
            _ => None,
        };

        Ok(Undo {
            obj: op.obj,
            kind,
            created,
        })
    }

    /// Revert one op. Undo records must be replayed newest first.
    pub(crate) fn undo(&mut self, undo: Undo) {
        if let Some(created) = undo.created {
            self.objects.remove(&created);
        }
        let Some(state) = self.objects.get_mut(&undo.obj) else {
            return;
        };
        match (&mut state.data, undo.kind) {
            (ObjData::Map(map), UndoKind::MapSlot { key, previous }) => map.restore(&key, previous),
            (ObjData::Seq(seq), UndoKind::SeqSlot { elem, previous }) => seq.restore(&elem, previous),
            (ObjData::Seq(seq), UndoKind::Inserted { elem }) => seq.remove_element(&elem),
            (ObjData::Seq(seq), UndoKind::Marked { id }) => seq.remove_mark(&id),
            _ => {}
        }
    }

    /// All live values at `prop`, ascending by op id.
    pub fn get_all(&self, obj: &ObjId, prop: &Prop) -> Result<Vec<(Value, OpId)>, StoreError> {
        let state = self.object(obj)?;
        let slot: &[SlotOp] = match (&state.data, prop) {
            (ObjData::Map(map), Prop::Map(key)) => map.get(key),
            (ObjData::Seq(seq), Prop::Seq(index)) => seq
                .nth_visible(*index)
                .map(|e| e.entries.as_slice())
                .unwrap_or(&[]),
            (ObjData::Map(_), Prop::Seq(_)) => {
                return Err(StoreError::type_mismatch("map key", "index"));
            }
            (ObjData::Seq(_), Prop::Map(_)) => {
                return Err(StoreError::type_mismatch("index", "map key"));
            }
        };
        Ok(slot.iter().map(|o| (o.to_value(), o.id)).collect())
    }

    /// The winning value at `prop`.
    pub fn get(&self, obj: &ObjId, prop: &Prop) -> Result<Option<(Value, OpId)>, StoreError> {
        Ok(self.get_all(obj, prop)?.pop())
    }

    /// Sorted keys of a map. Sequences have no keys.
    pub fn keys(&self, obj: &ObjId) -> Result<Vec<String>, StoreError> {
        match &self.object(obj)?.data {
            ObjData::Map(map) => Ok(map.keys().map(str::to_string).collect()),
            ObjData::Seq(_) => Ok(Vec::new()),
        }
    }

    /// Winning values in key or sequence order.
    pub fn values(&self, obj: &ObjId) -> Result<Vec<Value>, StoreError> {
        match &self.object(obj)?.data {
            ObjData::Map(map) => Ok(map.winners().map(|(_, op)| op.to_value()).collect()),
            ObjData::Seq(seq) => Ok(seq
                .visible()
                .filter_map(|e| e.winner().map(SlotOp::to_value))
                .collect()),
        }
    }

    /// Number of keys or visible elements.
    pub fn length(&self, obj: &ObjId) -> Result<usize, StoreError> {
        match &self.object(obj)?.data {
            ObjData::Map(map) => Ok(map.len()),
            ObjData::Seq(seq) => Ok(seq.visible_len()),
        }
    }

    /// The contents of a text object.
    pub fn text(&self, obj: &ObjId) -> Result<String, StoreError> {
        let seq = self.seq_of(obj, ObjType::Text)?;
        Ok(seq
            .visible()
            .filter_map(|e| e.winner())
            .filter_map(|op| match &op.value {
                SlotValue::Scalar(s) => s.as_str().map(str::to_string),
                SlotValue::Object(_) => None,
            })
            .collect())
    }

    /// Materialize an object and everything below it as JSON.
    pub fn to_json(&self, obj: &ObjId) -> Result<serde_json::Value, StoreError> {
        let state = self.object(obj)?;
        match (&state.data, state.typ) {
            (ObjData::Map(map), _) => {
                let mut out = serde_json::Map::new();
                for (key, op) in map.winners() {
                    out.insert(key.to_string(), self.slot_json(op)?);
                }
                Ok(serde_json::Value::Object(out))
            }
            (ObjData::Seq(_), ObjType::Text) => Ok(serde_json::Value::String(self.text(obj)?)),
            (ObjData::Seq(seq), _) => {
                let items = seq
                    .visible()
                    .filter_map(|e| e.winner())
                    .map(|op| self.slot_json(op))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(serde_json::Value::Array(items))
            }
        }
    }

    fn slot_json(&self, op: &SlotOp) -> Result<serde_json::Value, StoreError> {
        match &op.value {
            SlotValue::Scalar(s) => Ok(s.to_json()),
            SlotValue::Object(_) => self.to_json(&ObjId::Id(op.id)),
        }
    }
}
