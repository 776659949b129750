use accord::{
    ObjType, ROOT, ReadDoc, SyncConfig, SyncMessage, SyncPhase, SyncState, sync_documents,
};

use crate::helpers::{actor, assert_converged, sync_fresh, test_doc};

/// Two peers each put and commit; sync converges in at most three rounds.
#[test]
fn test_two_peers_converge_quickly() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    a.transact(|tx| tx.put(&ROOT, "from_a", 1)).unwrap();
    b.transact(|tx| tx.put(&ROOT, "from_b", 2)).unwrap();

    let report = sync_fresh(&mut a, &mut b);
    assert!(report.converged);
    assert!(report.rounds <= 3, "took {} rounds", report.rounds);
    assert_converged(&a, &b);
}

#[test]
fn test_forked_replicas_converge_after_sync() {
    let mut a = test_doc(1);
    let list = a
        .transact(|tx| tx.put_object(&ROOT, "log", ObjType::List))
        .unwrap()
        .0;
    let mut b = a.fork();
    b.set_actor(actor(2));

    for i in 0..20 {
        a.transact(|tx| tx.push(&list, format!("a{i}"))).unwrap();
        if i % 2 == 0 {
            b.transact(|tx| tx.push(&list, format!("b{i}"))).unwrap();
        }
    }

    let report = sync_fresh(&mut a, &mut b);
    assert!(report.converged);
    assert_converged(&a, &b);
    assert_eq!(a.length(&list).unwrap(), 30);
}

/// Messages survive the wire format between every step.
#[test]
fn test_sync_over_encoded_messages() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    a.transact(|tx| tx.put(&ROOT, "k", "a")).unwrap();
    b.transact(|tx| tx.put(&ROOT, "j", "b")).unwrap();

    let mut sa = SyncState::new();
    let mut sb = SyncState::new();
    for _ in 0..10 {
        let to_b = a.generate_sync_message(&mut sa);
        if let Some(message) = &to_b {
            let decoded = SyncMessage::decode(&message.encode().unwrap()).unwrap();
            b.receive_sync_message(&mut sb, decoded).unwrap();
        }
        let to_a = b.generate_sync_message(&mut sb);
        if let Some(message) = &to_a {
            let decoded = SyncMessage::decode(&message.encode().unwrap()).unwrap();
            a.receive_sync_message(&mut sa, decoded).unwrap();
        }
        if to_b.is_none() && to_a.is_none() {
            break;
        }
    }
    assert_converged(&a, &b);
    assert_eq!(sa.phase(), SyncPhase::Converged);
}

/// A restored state resumes from the shared heads and only new changes
/// are exchanged.
#[test]
fn test_resume_from_persisted_state() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    a.transact(|tx| tx.put(&ROOT, "v", 1)).unwrap();

    let mut sa = SyncState::new();
    let mut sb = SyncState::new();
    sync_documents(&mut a, &mut sa, &mut b, &mut sb, &SyncConfig::default()).unwrap();
    assert_converged(&a, &b);

    let mut sa = SyncState::decode(&sa.encode().unwrap()).unwrap();
    let mut sb = SyncState::decode(&sb.encode().unwrap()).unwrap();
    assert_eq!(sa.shared_heads(), a.get_heads().as_slice());

    a.transact(|tx| tx.put(&ROOT, "v", 2)).unwrap();
    let first = a.generate_sync_message(&mut sa).unwrap();
    // Nothing is sent until the peer's heads are known.
    assert!(first.changes.is_empty());
    b.receive_sync_message(&mut sb, first).unwrap();

    let report =
        sync_documents(&mut a, &mut sa, &mut b, &mut sb, &SyncConfig::default()).unwrap();
    assert!(report.converged);
    assert_converged(&a, &b);
    assert!(b.get(&ROOT, "v").unwrap().unwrap() == 2);
}

/// A peer that lost its data gets everything again.
#[test]
fn test_peer_that_lost_its_data_is_resent_everything() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    for i in 0..3 {
        a.transact(|tx| tx.put(&ROOT, "n", i)).unwrap();
    }
    let mut sa = SyncState::new();
    sync_documents(
        &mut a,
        &mut sa,
        &mut b,
        &mut SyncState::new(),
        &SyncConfig::default(),
    )
    .unwrap();

    // b is wiped but a keeps its state for the peer.
    let mut fresh = test_doc(2);
    let report = sync_documents(
        &mut a,
        &mut sa,
        &mut fresh,
        &mut SyncState::new(),
        &SyncConfig::default(),
    )
    .unwrap();
    assert!(report.converged);
    assert_converged(&a, &fresh);
}

/// A message carrying changes is dropped mid-session. The next sync run
/// starts a new session, resends the changes and only then reports
/// convergence.
#[test]
fn test_sync_recovers_after_a_dropped_message() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    for i in 0..3 {
        a.transact(|tx| tx.put(&ROOT, "n", i)).unwrap();
    }
    b.transact(|tx| tx.put(&ROOT, "m", 1)).unwrap();

    let mut sa = SyncState::new();
    let mut sb = SyncState::new();
    let hello = a.generate_sync_message(&mut sa).unwrap();
    b.receive_sync_message(&mut sb, hello).unwrap();
    let reply = b.generate_sync_message(&mut sb).unwrap();
    a.receive_sync_message(&mut sa, reply).unwrap();
    let dropped = a.generate_sync_message(&mut sa).unwrap();
    assert_eq!(dropped.changes.len(), 3);
    assert_ne!(a.get_heads(), b.get_heads());

    let report =
        sync_documents(&mut a, &mut sa, &mut b, &mut sb, &SyncConfig::default()).unwrap();
    assert!(report.converged);
    assert_converged(&a, &b);
    assert!(b.get(&ROOT, "n").unwrap().unwrap() == 2);
    assert!(a.get(&ROOT, "m").unwrap().unwrap() == 1);
}

#[test]
fn test_identical_documents_exchange_no_changes() {
    let mut a = test_doc(1);
    a.transact(|tx| tx.put(&ROOT, "same", true)).unwrap();
    let mut b = a.fork();

    let mut sa = SyncState::new();
    let mut sb = SyncState::new();
    let mut changes_sent = 0;
    for _ in 0..5 {
        let to_b = a.generate_sync_message(&mut sa);
        if let Some(message) = to_b.clone() {
            changes_sent += message.changes.len();
            b.receive_sync_message(&mut sb, message).unwrap();
        }
        let to_a = b.generate_sync_message(&mut sb);
        if let Some(message) = to_a.clone() {
            changes_sent += message.changes.len();
            a.receive_sync_message(&mut sa, message).unwrap();
        }
        if to_b.is_none() && to_a.is_none() {
            break;
        }
    }
    assert_eq!(changes_sent, 0);
    assert_converged(&a, &b);
}

#[test]
fn test_malformed_message_is_a_protocol_error() {
    let err = SyncMessage::decode(&[0x85, 0x6f, 0x4a, 0x83, 0x42, 0xff]).unwrap_err();
    assert!(err.is_protocol_error());
    assert_eq!(err.module(), "sync");
}
