//! Property-based convergence tests.
//!
//! Random edit scripts run on several replicas; whatever order the
//! resulting changes arrive in, every replica must end up identical.

use accord::{Change, Document, ObjId, ObjType, ROOT, ReadDoc};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::helpers::{actor, test_doc};

// ==========================
// EDIT SCRIPTS
// ==========================

#[derive(Clone, Debug)]
enum Edit {
    Insert { pos_pct: f64, content: String },
    Delete { pos_pct: f64, len_pct: f64 },
    Put { key: u8, value: i64 },
}

fn arbitrary_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0.0..=1.0f64, "[a-z]{1,6}")
            .prop_map(|(pos_pct, content)| Edit::Insert { pos_pct, content }),
        (0.0..=1.0f64, 0.0..=0.5f64)
            .prop_map(|(pos_pct, len_pct)| Edit::Delete { pos_pct, len_pct }),
        (0u8..4, any::<i64>()).prop_map(|(key, value)| Edit::Put { key, value }),
    ]
}

fn apply_edit(doc: &mut Document, text: &ObjId, edit: &Edit) {
    let len = doc.length(text).unwrap();
    match edit {
        Edit::Insert { pos_pct, content } => {
            let pos = ((*pos_pct * len as f64) as usize).min(len);
            doc.transact(|tx| tx.splice_text(text, pos, 0, content))
                .unwrap();
        }
        Edit::Delete { pos_pct, len_pct } => {
            if len == 0 {
                return;
            }
            let start = ((*pos_pct * len as f64) as usize).min(len - 1);
            let count = ((*len_pct * (len - start) as f64) as usize).clamp(1, len - start);
            doc.transact(|tx| tx.splice_text(text, start, count, ""))
                .unwrap();
        }
        Edit::Put { key, value } => {
            doc.transact(|tx| tx.put(&ROOT, format!("k{key}"), *value))
                .unwrap();
        }
    }
}

/// Three replicas of one document holding a text object at "body".
fn replicas() -> (Vec<Document>, ObjId) {
    let mut base = test_doc(0);
    let text = base
        .transact(|tx| {
            let text = tx.put_object(&ROOT, "body", ObjType::Text)?;
            tx.splice_text(&text, 0, 0, "seed")?;
            Ok::<_, accord::Error>(text)
        })
        .unwrap()
        .0;
    let docs = (1..=3)
        .map(|byte| {
            let mut doc = base.fork();
            doc.set_actor(actor(byte));
            doc
        })
        .collect();
    (docs, text)
}

fn all_changes(docs: &[Document]) -> Vec<Change> {
    let mut merged = Document::new();
    for doc in docs {
        merged.merge(doc).unwrap();
    }
    merged.get_history().into_iter().cloned().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Local text edits agree with the same edits on a plain string.
    #[test]
    fn text_edits_match_a_string_model(
        edits in prop::collection::vec(arbitrary_edit(), 1..40),
    ) {
        let (mut docs, text) = replicas();
        let doc = &mut docs[0];
        let mut model: Vec<char> = "seed".chars().collect();
        for edit in &edits {
            let len = model.len();
            match edit {
                Edit::Insert { pos_pct, content } => {
                    let pos = ((*pos_pct * len as f64) as usize).min(len);
                    model.splice(pos..pos, content.chars());
                }
                Edit::Delete { pos_pct, len_pct } if len > 0 => {
                    let start = ((*pos_pct * len as f64) as usize).min(len - 1);
                    let count =
                        ((*len_pct * (len - start) as f64) as usize).clamp(1, len - start);
                    model.drain(start..start + count);
                }
                _ => {}
            }
            apply_edit(doc, &text, edit);
        }
        prop_assert_eq!(doc.text(&text).unwrap(), model.into_iter().collect::<String>());
    }

    /// Replicas editing concurrently converge however they merge.
    #[test]
    fn concurrent_edits_converge(
        scripts in prop::collection::vec(prop::collection::vec(arbitrary_edit(), 0..15), 3),
    ) {
        let (mut docs, text) = replicas();
        for (doc, script) in docs.iter_mut().zip(&scripts) {
            for edit in script {
                apply_edit(doc, &text, edit);
            }
        }

        let (first, rest) = docs.split_at_mut(1);
        let (second, third) = rest.split_at_mut(1);
        let (a, b, c) = (&mut first[0], &mut second[0], &mut third[0]);

        // a pulls b then c; c pulls a (already holding b); b pulls c.
        a.merge(b).unwrap();
        a.merge(c).unwrap();
        c.merge(a).unwrap();
        b.merge(c).unwrap();

        for other in [&*b, &*c] {
            prop_assert_eq!(a.get_heads(), other.get_heads());
            prop_assert_eq!(a.text(&text).unwrap(), other.text(&text).unwrap());
            prop_assert_eq!(a.to_json(&ROOT).unwrap(), other.to_json(&ROOT).unwrap());
        }
    }

    /// Delivering the full change set in any order yields the same state.
    #[test]
    fn delivery_order_does_not_matter(
        scripts in prop::collection::vec(prop::collection::vec(arbitrary_edit(), 1..8), 3),
        seed in any::<u64>(),
    ) {
        let (mut docs, text) = replicas();
        for (doc, script) in docs.iter_mut().zip(&scripts) {
            for edit in script {
                apply_edit(doc, &text, edit);
            }
        }
        let changes = all_changes(&docs);

        let mut in_order = Document::new();
        in_order.apply_changes(changes.clone()).unwrap();

        let mut shuffled_changes = changes;
        shuffled_changes.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut shuffled = Document::new();
        for change in shuffled_changes {
            shuffled.apply_changes([change]).unwrap();
        }

        prop_assert_eq!(shuffled.pending_changes(), 0);
        prop_assert_eq!(in_order.get_heads(), shuffled.get_heads());
        prop_assert_eq!(in_order.text(&text).unwrap(), shuffled.text(&text).unwrap());
        prop_assert_eq!(in_order.to_json(&ROOT).unwrap(), shuffled.to_json(&ROOT).unwrap());
    }

    /// `update_text` always lands exactly on the target string.
    #[test]
    fn update_text_reaches_any_target(
        start in "\\PC{0,20}",
        target in "\\PC{0,20}",
    ) {
        let mut doc = test_doc(1);
        let text = doc
            .transact(|tx| {
                let text = tx.put_object(&ROOT, "t", ObjType::Text)?;
                tx.splice_text(&text, 0, 0, &start)?;
                tx.update_text(&text, &target)?;
                Ok::<_, accord::Error>(text)
            })
            .unwrap()
            .0;
        prop_assert_eq!(doc.text(&text).unwrap(), target);
    }
}
