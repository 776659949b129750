//! Formatting spans over text.
//!
//! A mark op stores two anchors instead of two indices so the span follows
//! concurrent edits. Reading resolves every mark op against the current
//! element order; for each character and name the mark op with the highest
//! id decides the value, and a `Null` value means "not marked".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::change::ExpandMark;
use crate::store::{SeqState, StoreError};
use crate::types::Anchor;
use crate::value::ScalarValue;

/// A resolved run of one mark over visible positions `start..end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub name: String,
    pub value: ScalarValue,
    pub start: usize,
    pub end: usize,
}

impl Mark {
    pub fn new(name: impl Into<String>, value: impl Into<ScalarValue>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            start,
            end,
        }
    }
}

/// Choose the anchors for marking visible positions `start..end`.
///
/// The caller guarantees `start < end <= visible length`.
pub(crate) fn anchors(
    seq: &SeqState,
    start: usize,
    end: usize,
    expand: ExpandMark,
) -> Result<(Anchor, Anchor), StoreError> {
    let length = seq.visible_len();
    let id_at = |index: usize| {
        seq.nth_visible(index)
            .map(|e| e.id)
            .ok_or(StoreError::IndexOutOfRange { index, length })
    };

    let start_anchor = if expand.before() {
        if start == 0 {
            Anchor::Start
        } else {
            Anchor::After(id_at(start - 1)?)
        }
    } else {
        Anchor::Before(id_at(start)?)
    };

    let end_anchor = if expand.after() {
        if end == length {
            Anchor::End
        } else {
            Anchor::Before(id_at(end)?)
        }
    } else {
        Anchor::After(id_at(end - 1)?)
    };

    Ok((start_anchor, end_anchor))
}

/// Resolve all mark ops of a text into runs, sorted by start then name.
pub(crate) fn resolve(seq: &SeqState) -> Vec<Mark> {
    let elements = seq.elements();
    let names: BTreeSet<&str> = seq.marks().iter().map(|m| m.name.as_str()).collect();
    let mut out = Vec::new();

    for name in names {
        // Per element, the value of the highest mark op covering it. Mark ops
        // are stored ascending by id, so later writes win.
        let mut winner: Vec<Option<&ScalarValue>> = vec![None; elements.len()];
        for mark in seq.marks().iter().filter(|m| m.name == name) {
            let (Some(s), Some(e)) = (seq.boundary(&mark.start), seq.boundary(&mark.end)) else {
                continue;
            };
            for slot in winner.iter_mut().take(e).skip(s) {
                *slot = Some(&mark.value);
            }
        }

        let mut run: Option<Mark> = None;
        let mut pos = 0;
        for (element, value) in elements.iter().zip(&winner) {
            if !element.is_visible() {
                continue;
            }
            match (*value).filter(|v| !v.is_null()) {
                Some(v) => {
                    let extends = matches!(&run, Some(current) if current.value == *v && current.end == pos);
                    if let (true, Some(current)) = (extends, run.as_mut()) {
                        current.end = pos + 1;
                    } else {
                        out.extend(run.take());
                        run = Some(Mark::new(name, v.clone(), pos, pos + 1));
                    }
                }
                None => out.extend(run.take()),
            }
            pos += 1;
        }
        out.extend(run);
    }

    out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
    out
}
