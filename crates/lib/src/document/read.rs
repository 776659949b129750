//! Read access shared by documents and open transactions.

use crate::{
    Result,
    document::Document,
    text::{self, Mark},
    types::{Cursor, ObjId, OpId, Prop},
    value::{ObjType, Value},
};

/// Reading the current state of a document.
///
/// Implemented by [`Document`] and by an open
/// [`Transaction`](crate::Transaction), which sees its own uncommitted
/// writes. Absent keys and indices read as `None` or empty, never as
/// errors.
pub trait ReadDoc {
    /// The winning value at `prop`.
    fn get<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Option<Value>>;

    /// Every live value at `prop` with the op that wrote it, ascending by op
    /// id. The winner is last.
    fn get_all<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Vec<(Value, OpId)>>;

    /// Sorted keys of a map.
    fn keys(&self, obj: &ObjId) -> Result<Vec<String>>;

    /// Values of a map in key order, or of a sequence in order.
    fn values(&self, obj: &ObjId) -> Result<Vec<Value>>;

    /// Number of keys or visible elements.
    fn length(&self, obj: &ObjId) -> Result<usize>;

    fn object_type(&self, obj: &ObjId) -> Result<ObjType>;

    /// The contents of a text object.
    fn text(&self, obj: &ObjId) -> Result<String>;

    /// Resolved formatting runs of a text object.
    fn marks(&self, obj: &ObjId) -> Result<Vec<Mark>>;

    /// A cursor that tracks position `pos` through later edits.
    fn get_cursor(&self, obj: &ObjId, pos: usize) -> Result<Cursor>;

    /// Where a cursor currently points.
    fn get_cursor_position(&self, obj: &ObjId, cursor: &Cursor) -> Result<usize>;

    /// Materialize an object as JSON.
    fn to_json(&self, obj: &ObjId) -> Result<serde_json::Value>;
}

impl ReadDoc for Document {
    fn get<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Option<Value>> {
        Ok(self.ops().get(obj, &prop.into())?.map(|(value, _)| value))
    }

    fn get_all<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Vec<(Value, OpId)>> {
        Ok(self.ops().get_all(obj, &prop.into())?)
    }

    fn keys(&self, obj: &ObjId) -> Result<Vec<String>> {
        Ok(self.ops().keys(obj)?)
    }

    fn values(&self, obj: &ObjId) -> Result<Vec<Value>> {
        Ok(self.ops().values(obj)?)
    }

    fn length(&self, obj: &ObjId) -> Result<usize> {
        Ok(self.ops().length(obj)?)
    }

    fn object_type(&self, obj: &ObjId) -> Result<ObjType> {
        Ok(self.ops().object_type(obj)?)
    }

    fn text(&self, obj: &ObjId) -> Result<String> {
        Ok(self.ops().text(obj)?)
    }

    fn marks(&self, obj: &ObjId) -> Result<Vec<Mark>> {
        let seq = self.ops().seq_of(obj, ObjType::Text)?;
        Ok(text::marks::resolve(seq))
    }

    fn get_cursor(&self, obj: &ObjId, pos: usize) -> Result<Cursor> {
        let seq = self.ops().seq(obj)?;
        Ok(text::cursor::cursor_at(seq, obj, pos)?)
    }

    fn get_cursor_position(&self, obj: &ObjId, cursor: &Cursor) -> Result<usize> {
        let seq = self.ops().seq(obj)?;
        Ok(text::cursor::resolve(seq, obj, cursor)?)
    }

    fn to_json(&self, obj: &ObjId) -> Result<serde_json::Value> {
        Ok(self.ops().to_json(obj)?)
    }
}
