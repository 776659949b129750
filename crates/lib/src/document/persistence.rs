//! Saving and loading documents.
//!
//! A snapshot is `MAGIC | 0x00 | checksum[32] | body`, where the body is a
//! postcard [`Snapshot`] and the checksum is the SHA-256 of the body. The
//! body carries the full change history, so a snapshot can always be
//! rebuilt by replay; the stored index just makes loading cheaper.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Document, DocumentError};
use crate::{
    Result,
    change::{
        Change,
        codec::{chunk_type, frame, split_checksum, unframe},
    },
    constants::{CHUNK_CHANGE, CHUNK_DOCUMENT, CHUNK_INCREMENTAL, SNAPSHOT_VERSION},
    store::OpSet,
    types::ChangeHash,
};

/// How [`Document::load_with`] rebuilds the object store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Use the object index stored in the snapshot.
    #[default]
    Snapshot,
    /// Ignore the stored index and replay every change.
    Replay,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    heads: &'a [ChangeHash],
    changes: Vec<&'a [u8]>,
    max_op: u64,
    index: &'a OpSet,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    heads: Vec<ChangeHash>,
    changes: Vec<Vec<u8>>,
    max_op: u64,
    index: OpSet,
}

fn corrupt(reason: impl Into<String>) -> DocumentError {
    DocumentError::CorruptDocument {
        reason: reason.into(),
    }
}

impl Document {
    /// Encode the whole document as a snapshot.
    ///
    /// The heads at this point become the base for the next
    /// [`save_incremental`](Self::save_incremental).
    pub fn save(&mut self) -> Result<Vec<u8>> {
        let heads = self.get_heads();
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            heads: &heads,
            changes: self.history.iter().map(Change::raw_bytes).collect(),
            max_op: self.max_op,
            index: &self.ops,
        };
        let body = postcard::to_allocvec(&snapshot).map_err(|e| corrupt(e.to_string()))?;
        let checksum = ChangeHash::digest(&body);
        let bytes = frame(CHUNK_DOCUMENT, Some(&checksum), &body);
        tracing::debug!(
            changes = self.history.len(),
            bytes = bytes.len(),
            "Saved document"
        );
        self.saved_heads = heads;
        Ok(bytes)
    }

    /// Load a snapshot produced by [`save`](Self::save).
    pub fn load(bytes: &[u8]) -> Result<Document> {
        Self::load_with(bytes, LoadMode::default())
    }

    /// Load a snapshot, choosing how the object store is rebuilt.
    ///
    /// Verifies the checksum, every change hash, that each change's deps
    /// precede it, and that the rebuilt heads match the recorded ones.
    pub fn load_with(bytes: &[u8], mode: LoadMode) -> Result<Document> {
        let rest = unframe(bytes, CHUNK_DOCUMENT).ok_or_else(|| corrupt("not a document"))?;
        let (declared, body) = split_checksum(rest).ok_or_else(|| corrupt("truncated checksum"))?;
        if ChangeHash::digest(body) != declared {
            return Err(corrupt("checksum mismatch").into());
        }
        let (version, _) =
            postcard::take_from_bytes::<u32>(body).map_err(|e| corrupt(e.to_string()))?;
        if version != SNAPSHOT_VERSION {
            return Err(DocumentError::UnsupportedVersion { version }.into());
        }
        let snapshot: Snapshot = postcard::from_bytes(body).map_err(|e| corrupt(e.to_string()))?;
        debug_assert_eq!(snapshot.version, SNAPSHOT_VERSION);

        let mut doc = Document::new();
        for raw in &snapshot.changes {
            let change = Change::from_bytes(raw)?;
            if let Some(dep) = change.deps().iter().find(|d| !doc.history.contains(d)) {
                return Err(DocumentError::UnknownDependency {
                    hash: dep.to_hex(),
                }
                .into());
            }
            match mode {
                LoadMode::Snapshot => {
                    doc.max_op = doc.max_op.max(change.max_op());
                    doc.history.add(change);
                }
                LoadMode::Replay => doc.apply_change(change)?,
            }
        }

        let mut heads = snapshot.heads;
        heads.sort();
        if doc.get_heads() != heads {
            return Err(corrupt("heads do not match history").into());
        }
        if mode == LoadMode::Snapshot {
            doc.ops = snapshot.index;
            doc.max_op = doc.max_op.max(snapshot.max_op);
        }
        doc.saved_heads = heads;
        tracing::debug!(changes = doc.history.len(), ?mode, "Loaded document");
        Ok(doc)
    }

    /// Encode the changes made since the last save or incremental save.
    ///
    /// The result can be fed to [`load_incremental`](Self::load_incremental)
    /// on any replica holding the earlier state.
    pub fn save_incremental(&mut self) -> Result<Vec<u8>> {
        let changes: Vec<&[u8]> = self
            .get_changes(&self.saved_heads)
            .into_iter()
            .map(Change::raw_bytes)
            .collect();
        let body = postcard::to_allocvec(&changes).map_err(|e| corrupt(e.to_string()))?;
        tracing::debug!(changes = changes.len(), "Saved incremental changes");
        self.saved_heads = self.get_heads();
        Ok(frame(CHUNK_INCREMENTAL, None, &body))
    }

    /// Apply an incremental save, a full snapshot or a single encoded
    /// change. Returns how many changes were applied.
    pub fn load_incremental(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        match chunk_type(bytes) {
            Some(CHUNK_INCREMENTAL) => {
                let body = unframe(bytes, CHUNK_INCREMENTAL)
                    .ok_or_else(|| corrupt("not an incremental save"))?;
                let raw: Vec<Vec<u8>> =
                    postcard::from_bytes(body).map_err(|e| corrupt(e.to_string()))?;
                let changes = raw
                    .iter()
                    .map(|bytes| Change::from_bytes(bytes))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                self.apply_changes(changes)
            }
            Some(CHUNK_DOCUMENT) => {
                let other = Document::load_with(bytes, LoadMode::Replay)?;
                let changes: Vec<Change> = other.history.iter().cloned().collect();
                self.apply_changes(changes)
            }
            Some(CHUNK_CHANGE) => {
                let change = Change::from_bytes(bytes)?;
                self.apply_changes([change])
            }
            Some(other) => Err(corrupt(format!("unexpected chunk type {other:#04x}")).into()),
            None => Err(corrupt("missing header").into()),
        }
    }

    /// Save a snapshot to `path`, replacing any existing file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.save()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a snapshot from `path`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Document> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }
}
