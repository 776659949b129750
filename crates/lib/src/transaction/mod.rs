//! Transactions: the only way to mutate a document.
//!
//! A [`Transaction`] mutably borrows its [`Document`], so at most one can be
//! open at a time. Every write is turned into an [`Op`], applied to the live
//! store straight away (so reads inside the transaction see it) and
//! recorded together with an undo entry.
//!
//! Finishing a transaction either turns the buffered ops into a single
//! [`Change`] on top of the current heads ([`commit`](Transaction::commit))
//! or replays the undo log backwards ([`rollback`](Transaction::rollback)).
//! Dropping an unfinished transaction rolls it back.

use std::ops::Range;

use crate::{
    Document, Result,
    change::{Change, ExpandMark, Op, OpAction},
    document::ReadDoc,
    store::{StoreError, undo::Undo},
    text::{self, Mark},
    types::{ChangeHash, Cursor, ElemId, Key, ObjId, OpId, Prop},
    value::{Composite, ObjType, ScalarValue, Value},
};

/// Optional metadata for a commit.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Free-form description stored in the change.
    pub message: Option<String>,
    /// Overrides the clock reading, in milliseconds since the epoch.
    pub time: Option<i64>,
}

impl CommitOptions {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }
}

/// An open batch of writes against a [`Document`].
///
/// ```
/// use accord::{Document, ObjType, ReadDoc, ROOT};
///
/// let mut doc = Document::new();
/// let mut tx = doc.transaction();
/// let list = tx.put_object(&ROOT, "todo", ObjType::List).unwrap();
/// tx.push(&list, "milk").unwrap();
/// assert_eq!(tx.length(&list).unwrap(), 1);
/// let hash = tx.commit().unwrap();
/// assert!(hash.is_some());
/// ```
pub struct Transaction<'a> {
    doc: &'a mut Document,
    start_op: u64,
    ops: Vec<Op>,
    undo: Vec<Undo>,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(doc: &'a mut Document) -> Self {
        let start_op = doc.max_op() + 1;
        Self {
            doc,
            start_op,
            ops: Vec::new(),
            undo: Vec::new(),
            finished: false,
        }
    }

    /// Number of ops recorded so far.
    pub fn pending_ops(&self) -> usize {
        self.ops.len()
    }

    /// Commit with default options.
    ///
    /// Returns `None` when the transaction recorded no ops.
    pub fn commit(self) -> Result<Option<ChangeHash>> {
        self.commit_with(CommitOptions::default())
    }

    /// Turn the recorded ops into a change on top of the current heads.
    pub fn commit_with(mut self, options: CommitOptions) -> Result<Option<ChangeHash>> {
        self.finished = true;
        if self.ops.is_empty() {
            return Ok(None);
        }

        let actor = self.doc.actor();
        let seq = self.doc.history().last_seq(&actor) + 1;
        let time = match options.time {
            Some(time) => time,
            None if self.doc.timestamps() => self.doc.clock().now_millis(),
            None => 0,
        };
        let ops = std::mem::take(&mut self.ops);
        let op_count = ops.len();

        let built = Change::builder(actor, seq, self.start_op)
            .deps(self.doc.get_heads())
            .time(time)
            .set_message(options.message)
            .ops(ops)
            .build();
        let change = match built {
            Ok(change) => change,
            Err(err) => {
                self.revert();
                return Err(err.into());
            }
        };

        let hash = change.hash();
        tracing::debug!(
            hash = %hash,
            actor = %actor.short(),
            seq,
            ops = op_count,
            "Committed change"
        );
        self.undo.clear();
        self.doc.record_local_change(change);
        Ok(Some(hash))
    }

    /// Discard every recorded op and return how many there were.
    pub fn rollback(mut self) -> usize {
        self.finished = true;
        let discarded = self.revert();
        tracing::debug!(ops = discarded, "Rolled back transaction");
        discarded
    }

    fn revert(&mut self) -> usize {
        let discarded = self.undo.len();
        while let Some(undo) = self.undo.pop() {
            self.doc.ops_mut().undo(undo);
        }
        self.ops.clear();
        discarded
    }

    fn next_id(&self) -> OpId {
        OpId::new(self.start_op + self.ops.len() as u64, self.doc.actor())
    }

    fn apply(
        &mut self,
        obj: &ObjId,
        key: Key,
        insert: bool,
        action: OpAction,
        pred: Vec<OpId>,
    ) -> Result<OpId> {
        let op = Op {
            id: self.next_id(),
            obj: *obj,
            key,
            insert,
            action,
            pred,
        };
        let undo = self.doc.ops_mut().apply_op(&op)?;
        let id = op.id;
        self.undo.push(undo);
        self.ops.push(op);
        Ok(id)
    }

    /// Resolve `prop` to the key to write and the live ops to supersede.
    ///
    /// Index writes are only accepted on lists.
    fn slot_for_write(&self, obj: &ObjId, prop: &Prop) -> Result<(Key, Vec<OpId>)> {
        let store = self.doc.ops();
        let typ = store.object_type(obj)?;
        match (typ, prop) {
            (ObjType::Map, Prop::Map(key)) => {
                let pred = store.map(obj)?.get(key).iter().map(|o| o.id).collect();
                Ok((Key::Map(key.clone()), pred))
            }
            (ObjType::List, Prop::Seq(index)) => {
                let seq = store.seq_of(obj, ObjType::List)?;
                let element = seq.nth_visible(*index).ok_or(StoreError::IndexOutOfRange {
                    index: *index,
                    length: seq.visible_len(),
                })?;
                let pred = element.entries.iter().map(|o| o.id).collect();
                Ok((Key::Seq(ElemId::Id(element.id)), pred))
            }
            (ObjType::Map, Prop::Seq(_)) => Err(StoreError::type_mismatch("map key", "index").into()),
            (ObjType::List, Prop::Map(_)) => Err(StoreError::type_mismatch("index", "map key").into()),
            (ObjType::Text, _) => Err(StoreError::type_mismatch("list", "text").into()),
        }
    }

    /// The element a list insert at `index` goes after.
    fn insert_origin(&self, obj: &ObjId, typ: ObjType, index: usize) -> Result<ElemId> {
        let seq = self.doc.ops().seq_of(obj, typ)?;
        let length = seq.visible_len();
        if index > length {
            return Err(StoreError::IndexOutOfRange { index, length }.into());
        }
        if index == 0 {
            return Ok(ElemId::Head);
        }
        seq.nth_visible(index - 1)
            .map(|e| ElemId::Id(e.id))
            .ok_or_else(|| StoreError::IndexOutOfRange { index, length }.into())
    }

    /// Set a map key or list element to a scalar.
    pub fn put<P: Into<Prop>, V: Into<ScalarValue>>(&mut self, obj: &ObjId, prop: P, value: V) -> Result<()> {
        let (key, pred) = self.slot_for_write(obj, &prop.into())?;
        self.apply(obj, key, false, OpAction::Put(value.into()), pred)?;
        Ok(())
    }

    /// Create a nested object at a map key or list element.
    pub fn put_object<P: Into<Prop>>(&mut self, obj: &ObjId, prop: P, typ: ObjType) -> Result<ObjId> {
        let (key, pred) = self.slot_for_write(obj, &prop.into())?;
        let id = self.apply(obj, key, false, OpAction::Make(typ), pred)?;
        Ok(ObjId::Id(id))
    }

    /// Insert a scalar into a list before `index`.
    pub fn insert<V: Into<ScalarValue>>(&mut self, obj: &ObjId, index: usize, value: V) -> Result<()> {
        let origin = self.insert_origin(obj, ObjType::List, index)?;
        self.apply(obj, Key::Seq(origin), true, OpAction::Put(value.into()), vec![])?;
        Ok(())
    }

    /// Insert a nested object into a list before `index`.
    pub fn insert_object(&mut self, obj: &ObjId, index: usize, typ: ObjType) -> Result<ObjId> {
        let origin = self.insert_origin(obj, ObjType::List, index)?;
        let id = self.apply(obj, Key::Seq(origin), true, OpAction::Make(typ), vec![])?;
        Ok(ObjId::Id(id))
    }

    /// Append a scalar to a list.
    pub fn push<V: Into<ScalarValue>>(&mut self, obj: &ObjId, value: V) -> Result<()> {
        let length = self.doc.ops().seq_of(obj, ObjType::List)?.visible_len();
        self.insert(obj, length, value)
    }

    /// Remove a map key or sequence element.
    ///
    /// Deleting an absent map key does nothing.
    pub fn delete<P: Into<Prop>>(&mut self, obj: &ObjId, prop: P) -> Result<()> {
        let prop = prop.into();
        let store = self.doc.ops();
        let (key, pred) = match (store.object_type(obj)?, &prop) {
            (ObjType::Map, Prop::Map(key)) => {
                let pred: Vec<OpId> = store.map(obj)?.get(key).iter().map(|o| o.id).collect();
                if pred.is_empty() {
                    return Ok(());
                }
                (Key::Map(key.clone()), pred)
            }
            (ObjType::List | ObjType::Text, Prop::Seq(index)) => {
                let seq = store.seq(obj)?;
                let element = seq.nth_visible(*index).ok_or(StoreError::IndexOutOfRange {
                    index: *index,
                    length: seq.visible_len(),
                })?;
                let pred = element.entries.iter().map(|o| o.id).collect();
                (Key::Seq(ElemId::Id(element.id)), pred)
            }
            (ObjType::Map, Prop::Seq(_)) => {
                return Err(StoreError::type_mismatch("map key", "index").into());
            }
            (_, Prop::Map(_)) => return Err(StoreError::type_mismatch("index", "map key").into()),
        };
        self.apply(obj, key, false, OpAction::Delete, pred)?;
        Ok(())
    }

    /// Add `by` to the counter at `prop`.
    ///
    /// Every live counter at the slot receives the increment; the winning
    /// value must be a counter.
    pub fn increment<P: Into<Prop>>(&mut self, obj: &ObjId, prop: P, by: i64) -> Result<()> {
        let prop = prop.into();
        let (key, _) = self.slot_for_write(obj, &prop)?;
        let live = self.doc.ops().get_all(obj, &prop)?;
        let found = match live.last() {
            Some((Value::Scalar(ScalarValue::Counter(_)), _)) => None,
            Some((value, _)) => Some(value.to_string()),
            None => Some("nothing".to_string()),
        };
        if let Some(found) = found {
            return Err(StoreError::type_mismatch("counter", found).into());
        }
        let pred = live
            .iter()
            .filter(|(v, _)| matches!(v, Value::Scalar(ScalarValue::Counter(_))))
            .map(|(_, id)| *id)
            .collect();
        self.apply(obj, key, false, OpAction::Increment(by), pred)?;
        Ok(())
    }

    /// Write a nested value at a map key or list element.
    pub fn put_composite<P: Into<Prop>>(&mut self, obj: &ObjId, prop: P, value: Composite) -> Result<()> {
        match value.obj_type() {
            None => {
                if let Composite::Scalar(scalar) = value {
                    self.put(obj, prop, scalar)?;
                }
            }
            Some(typ) => {
                let child = self.put_object(obj, prop, typ)?;
                self.fill(&child, value)?;
            }
        }
        Ok(())
    }

    /// Insert a nested value into a list before `index`.
    pub fn insert_composite(&mut self, obj: &ObjId, index: usize, value: Composite) -> Result<()> {
        match value.obj_type() {
            None => {
                if let Composite::Scalar(scalar) = value {
                    self.insert(obj, index, scalar)?;
                }
            }
            Some(typ) => {
                let child = self.insert_object(obj, index, typ)?;
                self.fill(&child, value)?;
            }
        }
        Ok(())
    }

    /// Append a nested value to a list.
    pub fn push_composite(&mut self, obj: &ObjId, value: Composite) -> Result<()> {
        let length = self.doc.ops().seq_of(obj, ObjType::List)?.visible_len();
        self.insert_composite(obj, length, value)
    }

    fn fill(&mut self, obj: &ObjId, value: Composite) -> Result<()> {
        match value {
            Composite::Scalar(_) => Ok(()),
            Composite::Map(entries) => {
                for (key, child) in entries {
                    self.put_composite(obj, key, child)?;
                }
                Ok(())
            }
            Composite::List(items) => {
                for (index, child) in items.into_iter().enumerate() {
                    self.insert_composite(obj, index, child)?;
                }
                Ok(())
            }
            Composite::Text(content) => self.splice_text(obj, 0, 0, &content),
        }
    }

    /// Delete `delete` code points at `pos` in a text, then insert `text`
    /// there.
    pub fn splice_text(&mut self, obj: &ObjId, pos: usize, delete: usize, text: &str) -> Result<()> {
        let seq = self.doc.ops().seq_of(obj, ObjType::Text)?;
        let length = seq.visible_len();
        if pos > length {
            return Err(StoreError::IndexOutOfRange { index: pos, length }.into());
        }
        if pos + delete > length {
            return Err(StoreError::IndexOutOfRange {
                index: pos + delete,
                length,
            }
            .into());
        }

        for _ in 0..delete {
            let seq = self.doc.ops().seq_of(obj, ObjType::Text)?;
            let (elem, pred) = match seq.nth_visible(pos) {
                Some(element) => (
                    element.id,
                    element.entries.iter().map(|o| o.id).collect::<Vec<_>>(),
                ),
                None => return Err(StoreError::IndexOutOfRange { index: pos, length }.into()),
            };
            self.apply(obj, Key::Seq(ElemId::Id(elem)), false, OpAction::Delete, pred)?;
        }

        let mut origin = self.insert_origin(obj, ObjType::Text, pos)?;
        for c in text.chars() {
            let id = self.apply(
                obj,
                Key::Seq(origin),
                true,
                OpAction::Put(ScalarValue::Str(c.to_string())),
                vec![],
            )?;
            origin = ElemId::Id(id);
        }
        Ok(())
    }

    /// Replace the contents of a text with `new`, touching only the code
    /// points that differ.
    pub fn update_text(&mut self, obj: &ObjId, new: &str) -> Result<()> {
        let old = self.doc.ops().text(obj)?;
        for splice in text::diff::diff(&old, new).into_iter().rev() {
            self.splice_text(obj, splice.pos, splice.delete, &splice.insert)?;
        }
        Ok(())
    }

    /// Format the code points in `range` with `name = value`.
    ///
    /// An empty range records nothing.
    pub fn mark<V: Into<ScalarValue>>(
        &mut self,
        obj: &ObjId,
        range: Range<usize>,
        name: &str,
        value: V,
        expand: ExpandMark,
    ) -> Result<()> {
        let seq = self.doc.ops().seq_of(obj, ObjType::Text)?;
        let length = seq.visible_len();
        if range.end > length || range.start > range.end {
            return Err(StoreError::IndexOutOfRange {
                index: range.end.max(range.start),
                length,
            }
            .into());
        }
        if range.is_empty() {
            return Ok(());
        }
        let (start, end) = text::marks::anchors(seq, range.start, range.end, expand)?;
        self.apply(
            obj,
            Key::Range { start, end },
            false,
            OpAction::Mark {
                name: name.to_string(),
                value: value.into(),
                expand,
            },
            vec![],
        )?;
        Ok(())
    }

    /// Clear `name` over `range`.
    pub fn unmark(&mut self, obj: &ObjId, range: Range<usize>, name: &str, expand: ExpandMark) -> Result<()> {
        self.mark(obj, range, name, ScalarValue::Null, expand)
    }
}

impl ReadDoc for Transaction<'_> {
    fn get<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Option<Value>> {
        self.doc.get(obj, prop)
    }

    fn get_all<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Vec<(Value, OpId)>> {
        self.doc.get_all(obj, prop)
    }

    fn keys(&self, obj: &ObjId) -> Result<Vec<String>> {
        self.doc.keys(obj)
    }

    fn values(&self, obj: &ObjId) -> Result<Vec<Value>> {
        self.doc.values(obj)
    }

    fn length(&self, obj: &ObjId) -> Result<usize> {
        self.doc.length(obj)
    }

    fn object_type(&self, obj: &ObjId) -> Result<ObjType> {
        self.doc.object_type(obj)
    }

    fn text(&self, obj: &ObjId) -> Result<String> {
        self.doc.text(obj)
    }

    fn marks(&self, obj: &ObjId) -> Result<Vec<Mark>> {
        self.doc.marks(obj)
    }

    fn get_cursor(&self, obj: &ObjId, pos: usize) -> Result<Cursor> {
        self.doc.get_cursor(obj, pos)
    }

    fn get_cursor_position(&self, obj: &ObjId, cursor: &Cursor) -> Result<usize> {
        self.doc.get_cursor_position(obj, cursor)
    }

    fn to_json(&self, obj: &ObjId) -> Result<serde_json::Value> {
        self.doc.to_json(obj)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.undo.is_empty() {
            let discarded = self.revert();
            tracing::warn!(
                ops = discarded,
                "Transaction dropped without commit; rolled back"
            );
        }
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("actor", &self.doc.actor())
            .field("start_op", &self.start_op)
            .field("ops", &self.ops.len())
            .finish()
    }
}
