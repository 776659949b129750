use accord::{Change, ObjType, ROOT, ReadDoc, ScalarValue, Value};

use crate::helpers::{actor, assert_converged, merge_both, test_doc};

/// Three replicas edit independently; every merge order gives the same
/// document.
#[test]
fn test_merge_order_does_not_matter() {
    let mut base = test_doc(0);
    let list = base
        .transact(|tx| tx.put_object(&ROOT, "list", ObjType::List))
        .unwrap()
        .0;

    let mut replicas: Vec<_> = (1..=3)
        .map(|i| {
            let mut doc = base.fork();
            doc.set_actor(actor(i));
            doc.transact(|tx| {
                tx.put(&ROOT, "winner", i64::from(i))?;
                tx.push(&list, format!("item {i}"))
            })
            .unwrap();
            doc
        })
        .collect();

    let mut forward = base.clone();
    for doc in &replicas {
        forward.merge(doc).unwrap();
    }
    let mut backward = base.clone();
    for doc in replicas.iter().rev() {
        backward.merge(doc).unwrap();
    }
    assert_converged(&forward, &backward);
    assert_eq!(forward.length(&list).unwrap(), 3);
    assert!(forward.get(&ROOT, "winner").unwrap().unwrap() == 3);

    // Pairwise merging in a chain reaches the same state.
    let (first, rest) = replicas.split_at_mut(1);
    for doc in rest.iter_mut() {
        merge_both(&mut first[0], doc);
    }
    assert_converged(&first[0], &forward);
}

#[test]
fn test_merge_is_idempotent() {
    let mut a = test_doc(1);
    let mut b = test_doc(2);
    a.transact(|tx| tx.put(&ROOT, "a", true)).unwrap();
    b.transact(|tx| tx.put(&ROOT, "b", true)).unwrap();

    a.merge(&b).unwrap();
    let once = a.clone();
    a.merge(&b).unwrap();
    a.merge(&once).unwrap();
    assert_converged(&a, &once);
    assert_eq!(a.get_history().len(), 2);
}

#[test]
fn test_nested_edits_merge_inside_concurrent_objects() {
    let mut a = test_doc(1);
    let settings = a
        .transact(|tx| tx.put_object(&ROOT, "settings", ObjType::Map))
        .unwrap()
        .0;
    let mut b = a.fork();
    b.set_actor(actor(2));

    a.transact(|tx| tx.put(&settings, "theme", "dark")).unwrap();
    b.transact(|tx| tx.put(&settings, "font", "mono")).unwrap();
    merge_both(&mut a, &mut b);

    assert_eq!(
        a.keys(&settings).unwrap(),
        vec!["font".to_string(), "theme".to_string()]
    );
    assert_converged(&a, &b);
}

#[test]
fn test_counters_from_many_actors_sum() {
    let mut base = test_doc(0);
    base.transact(|tx| tx.put(&ROOT, "votes", ScalarValue::Counter(0)))
        .unwrap();

    let mut total = base.clone();
    for i in 1..=4u8 {
        let mut voter = base.fork();
        voter.set_actor(actor(i));
        voter
            .transact(|tx| tx.increment(&ROOT, "votes", i64::from(i)))
            .unwrap();
        total.merge(&voter).unwrap();
    }
    assert_eq!(
        total.get(&ROOT, "votes").unwrap(),
        Some(Value::Scalar(ScalarValue::Counter(10)))
    );
}

/// Changes applied in reverse order end up in the same state once the
/// queue drains.
#[test]
fn test_reverse_delivery_drains_the_queue() {
    let mut source = test_doc(1);
    for i in 0..5 {
        source.transact(|tx| tx.put(&ROOT, "step", i)).unwrap();
    }
    let mut changes: Vec<Change> = source.get_history().into_iter().cloned().collect();
    changes.reverse();

    let mut target = test_doc(2);
    assert_eq!(target.apply_changes(changes).unwrap(), 5);
    assert_eq!(target.pending_changes(), 0);
    assert_converged(&source, &target);
}
