use accord::{Document, LoadMode, ObjType, ROOT, ReadDoc, ScalarValue};
use tempfile::TempDir;

use crate::helpers::{assert_converged, test_doc};

/// A document touching every object type and a few conflicts.
fn rich_document() -> Document {
    let mut doc = test_doc(1);
    doc.transact(|tx| {
        tx.put(&ROOT, "title", "Shopping")?;
        tx.put(&ROOT, "visits", ScalarValue::Counter(0))?;
        let items = tx.put_object(&ROOT, "items", ObjType::List)?;
        tx.push(&items, "eggs")?;
        tx.push(&items, "flour")?;
        let notes = tx.put_object(&ROOT, "notes", ObjType::Text)?;
        tx.splice_text(&notes, 0, 0, "buy before noon")?;
        let meta = tx.put_object(&ROOT, "meta", ObjType::Map)?;
        tx.put(&meta, "shared", true)
    })
    .unwrap();

    let mut other = doc.fork();
    other.set_actor(crate::helpers::actor(2));
    other
        .transact(|tx| tx.put(&ROOT, "title", "Groceries"))
        .unwrap();
    doc.transact(|tx| tx.increment(&ROOT, "visits", 2)).unwrap();
    doc.merge(&other).unwrap();
    doc
}

#[test]
fn test_load_reproduces_heads_contents_and_history() {
    let mut doc = rich_document();
    let bytes = doc.save().unwrap();
    let loaded = Document::load(&bytes).unwrap();

    assert_converged(&doc, &loaded);
    assert_eq!(loaded.get_history().len(), doc.get_history().len());
    assert_eq!(loaded.max_op(), doc.max_op());
    assert_eq!(
        loaded.get_all(&ROOT, "title").unwrap(),
        doc.get_all(&ROOT, "title").unwrap()
    );
}

#[test]
fn test_replay_mode_matches_snapshot_mode() {
    let mut doc = rich_document();
    let bytes = doc.save().unwrap();
    let snapshot = Document::load_with(&bytes, LoadMode::Snapshot).unwrap();
    let replayed = Document::load_with(&bytes, LoadMode::Replay).unwrap();
    assert_converged(&snapshot, &replayed);
    assert_eq!(
        snapshot.get_all(&ROOT, "title").unwrap(),
        replayed.get_all(&ROOT, "title").unwrap()
    );
    assert_eq!(snapshot.max_op(), replayed.max_op());
}

/// A loaded document keeps editing and merging with the original.
#[test]
fn test_loaded_document_continues_editing() {
    let mut doc = rich_document();
    let mut loaded = Document::load(&doc.save().unwrap()).unwrap();
    loaded.set_actor(crate::helpers::actor(3));
    loaded
        .transact(|tx| tx.put(&ROOT, "title", "After reload"))
        .unwrap();
    doc.merge(&loaded).unwrap();
    assert!(doc.get(&ROOT, "title").unwrap().unwrap() == "After reload");
}

#[test]
fn test_save_to_file_and_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.accord");

    let mut doc = rich_document();
    doc.save_to_file(&path).unwrap();
    let loaded = Document::load_from_file(&path).unwrap();
    assert_converged(&doc, &loaded);

    let missing = Document::load_from_file(dir.path().join("absent.accord")).unwrap_err();
    assert!(missing.is_io_error());
}

/// Incremental saves replay onto a replica that holds the earlier state.
#[test]
fn test_incremental_saves_catch_up_a_replica() {
    let mut doc = test_doc(1);
    doc.transact(|tx| tx.put(&ROOT, "step", 1)).unwrap();
    let base = doc.save().unwrap();
    let mut replica = Document::load(&base).unwrap();

    doc.transact(|tx| tx.put(&ROOT, "step", 2)).unwrap();
    doc.transact(|tx| tx.put(&ROOT, "step", 3)).unwrap();
    let delta = doc.save_incremental().unwrap();
    assert_eq!(replica.load_incremental(&delta).unwrap(), 2);

    // Nothing new since the last incremental save.
    let empty = doc.save_incremental().unwrap();
    assert_eq!(replica.load_incremental(&empty).unwrap(), 0);
    assert_converged(&doc, &replica);
}

#[test]
fn test_load_incremental_accepts_a_full_snapshot() {
    let mut doc = rich_document();
    let mut empty = test_doc(9);
    let applied = empty.load_incremental(&doc.save().unwrap()).unwrap();
    assert_eq!(applied, doc.get_history().len());
    assert_converged(&doc, &empty);
    assert_eq!(empty.load_incremental(&[]).unwrap(), 0);
}

#[test]
fn test_corrupt_input_is_rejected() {
    let mut doc = rich_document();
    let bytes = doc.save().unwrap();

    let mut flipped = bytes.clone();
    let last = flipped.len() - 1;
    flipped[last] ^= 0xff;
    assert!(Document::load(&flipped).unwrap_err().is_integrity_error());

    let truncated = &bytes[..bytes.len() / 2];
    assert!(Document::load(truncated).unwrap_err().is_integrity_error());

    assert!(Document::load(b"not a document").unwrap_err().is_integrity_error());
    assert!(doc.load_incremental(b"garbage").unwrap_err().is_integrity_error());
}
