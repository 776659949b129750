//! Stable positions in sequences.

use crate::store::{SeqState, StoreError};
use crate::types::{Cursor, ObjId};

/// Bind a cursor to the element just before `pos`.
pub(crate) fn cursor_at(seq: &SeqState, obj: &ObjId, pos: usize) -> Result<Cursor, StoreError> {
    if pos == 0 {
        return Ok(Cursor::Start);
    }
    let length = seq.visible_len();
    seq.nth_visible(pos - 1)
        .map(|e| Cursor::After(e.id))
        .ok_or_else(|| {
            tracing::trace!(obj = %obj, pos, length, "cursor position beyond end");
            StoreError::IndexOutOfRange { index: pos, length }
        })
}

/// The current index a cursor points at.
///
/// Counts the visible elements up to and including the bound element, so
/// a cursor whose element was deleted falls back to the nearest visible
/// position on its left.
pub(crate) fn resolve(seq: &SeqState, obj: &ObjId, cursor: &Cursor) -> Result<usize, StoreError> {
    match cursor {
        Cursor::Start => Ok(0),
        Cursor::After(id) => {
            let index = seq.index_of(id).ok_or_else(|| StoreError::MissingElement {
                obj: obj.to_string(),
                elem: id.to_string(),
            })?;
            Ok(seq.visible_before(index + 1))
        }
    }
}
