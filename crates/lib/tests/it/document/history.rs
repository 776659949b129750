use accord::{ChangeHash, CommitOptions, ROOT, ReadDoc};

use crate::helpers::{actor, merge_both, test_doc};

#[test]
fn test_heads_are_sorted_and_track_concurrency() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    let ha = a.transact(|tx| tx.put(&ROOT, "x", 1)).unwrap().1.unwrap();
    let hb = b.transact(|tx| tx.put(&ROOT, "y", 2)).unwrap().1.unwrap();
    merge_both(&mut a, &mut b);

    let mut expected = vec![ha, hb];
    expected.sort();
    assert_eq!(a.get_heads(), expected);

    // A commit on top of both collapses the heads.
    let merged = a.transact(|tx| tx.put(&ROOT, "z", 3)).unwrap().1.unwrap();
    assert_eq!(a.get_heads(), vec![merged]);
    assert_eq!(a.get_change_by_hash(&merged).unwrap().deps(), expected.as_slice());
}

#[test]
fn test_history_is_in_dependency_order() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    for i in 0..3 {
        a.transact(|tx| tx.put(&ROOT, "a", i)).unwrap();
        b.transact(|tx| tx.put(&ROOT, "b", i)).unwrap();
    }
    merge_both(&mut a, &mut b);
    a.transact(|tx| tx.put(&ROOT, "done", true)).unwrap();

    let history = a.get_history();
    assert_eq!(history.len(), 7);
    let mut seen: Vec<ChangeHash> = Vec::new();
    for change in history {
        assert!(change.deps().iter().all(|d| seen.contains(d)));
        seen.push(change.hash());
    }
}

#[test]
fn test_get_changes_between_replicas() {
    let mut a = test_doc(1);
    a.transact(|tx| tx.put(&ROOT, "shared", 1)).unwrap();
    let mut b = a.fork();
    b.set_actor(actor(2));
    let shared = a.get_heads();

    b.transact(|tx| tx.put(&ROOT, "b1", 1)).unwrap();
    b.transact(|tx| tx.put(&ROOT, "b2", 1)).unwrap();

    let delta: Vec<_> = b.get_changes(&shared).into_iter().cloned().collect();
    assert_eq!(delta.len(), 2);
    assert!(delta.iter().all(|c| c.actor() == actor(2)));
    assert_eq!(a.apply_changes(delta).unwrap(), 2);
    assert_eq!(a.get_heads(), b.get_heads());
}

#[test]
fn test_last_local_change_and_commit_metadata() {
    let mut doc = test_doc(1);
    assert!(doc.get_last_local_change().is_none());

    let mut tx = doc.transaction();
    tx.put(&ROOT, "k", "v").unwrap();
    tx.commit_with(CommitOptions::default().with_message("initial import"))
        .unwrap();

    let change = doc.get_last_local_change().unwrap();
    assert_eq!(change.message(), Some("initial import"));
    assert_eq!(change.seq(), 1);
    assert_eq!(change.actor(), actor(1));
    assert_eq!(change.time(), 1_704_067_200_000);
}

#[test]
fn test_fork_at_an_old_head_then_merge_back() {
    let mut doc = test_doc(1);
    doc.transact(|tx| tx.put(&ROOT, "v", "one")).unwrap();
    let old = doc.get_heads();
    doc.transact(|tx| tx.put(&ROOT, "v", "two")).unwrap();

    let mut branch = doc.fork_at(&old).unwrap();
    branch.set_actor(actor(9));
    assert!(branch.get(&ROOT, "v").unwrap().unwrap() == "one");
    branch.transact(|tx| tx.put(&ROOT, "branch", true)).unwrap();

    doc.merge(&branch).unwrap();
    assert!(doc.get(&ROOT, "v").unwrap().unwrap() == "two");
    assert!(doc.get(&ROOT, "branch").unwrap().unwrap() == true);
    assert_eq!(doc.get_heads().len(), 2);
}
