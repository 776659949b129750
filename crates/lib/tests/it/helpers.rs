use std::sync::Arc;

use accord::{
    ActorId, Document, DocumentConfig, FixedClock, ObjId, ObjType, ROOT, ReadDoc, SyncConfig,
    SyncReport, SyncState, sync_documents,
};

// ==========================
// DOCUMENT FACTORIES
// ==========================

/// A deterministic actor id built from one repeated byte.
pub fn actor(byte: u8) -> ActorId {
    ActorId::from_bytes([byte; 16])
}

/// A document with a fixed actor and a deterministic clock.
pub fn test_doc(byte: u8) -> Document {
    Document::with_config(
        DocumentConfig::default()
            .with_actor(actor(byte))
            .with_clock(Arc::new(FixedClock::default())),
    )
}

/// A document holding an empty text object at `key`, plus a fork of it
/// writing as a second actor.
pub fn text_replicas(key: &str, initial: &str) -> (Document, Document, ObjId) {
    let mut a = test_doc(1);
    let (text, _) = a
        .transact(|tx| {
            let text = tx.put_object(&ROOT, key, ObjType::Text)?;
            tx.splice_text(&text, 0, 0, initial)?;
            Ok::<_, accord::Error>(text)
        })
        .unwrap();
    let mut b = a.fork();
    b.set_actor(actor(2));
    (a, b, text)
}

// ==========================
// CONVERGENCE HELPERS
// ==========================

/// Merge each document into the other.
pub fn merge_both(a: &mut Document, b: &mut Document) {
    let snapshot_b = b.clone();
    a.merge(&snapshot_b).unwrap();
    b.merge(a).unwrap();
}

/// Run the sync protocol with fresh states.
pub fn sync_fresh(a: &mut Document, b: &mut Document) -> SyncReport {
    sync_documents(
        a,
        &mut SyncState::new(),
        b,
        &mut SyncState::new(),
        &SyncConfig::default(),
    )
    .unwrap()
}

/// Assert that two documents hold the same heads and the same contents.
pub fn assert_converged(a: &Document, b: &Document) {
    assert_eq!(a.get_heads(), b.get_heads(), "heads differ");
    assert_eq!(
        a.to_json(&ROOT).unwrap(),
        b.to_json(&ROOT).unwrap(),
        "contents differ"
    );
}
