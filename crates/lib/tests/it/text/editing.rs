use accord::{ObjType, ROOT, ReadDoc};

use crate::helpers::{assert_converged, merge_both, test_doc, text_replicas};

/// "Hello" + " World" at 5, then an update to "Hello Universe" that
/// matches doing the splices by hand.
#[test]
fn test_update_text_matches_manual_splices() {
    let mut doc = test_doc(1);
    let text = doc
        .transact(|tx| {
            let text = tx.put_object(&ROOT, "greeting", ObjType::Text)?;
            tx.splice_text(&text, 0, 0, "Hello")?;
            tx.splice_text(&text, 5, 0, " World")
                .map(|_| text)
        })
        .unwrap()
        .0;
    assert_eq!(doc.text(&text).unwrap(), "Hello World");

    let mut manual = doc.clone();
    doc.transact(|tx| tx.update_text(&text, "Hello Universe"))
        .unwrap();
    manual
        .transact(|tx| tx.splice_text(&text, 6, 5, "Universe"))
        .unwrap();

    assert_eq!(doc.text(&text).unwrap(), "Hello Universe");
    assert_eq!(doc.text(&text).unwrap(), manual.text(&text).unwrap());
    assert_eq!(doc.length(&text).unwrap(), manual.length(&text).unwrap());
}

#[test]
fn test_update_text_keeps_unchanged_characters() {
    let (mut a, _, text) = text_replicas("t", "the quick fox");
    let cursor = a.get_cursor(&text, 4).unwrap();
    a.transact(|tx| tx.update_text(&text, "the slow brown fox"))
        .unwrap();
    assert_eq!(a.text(&text).unwrap(), "the slow brown fox");
    // "the " survived, so a cursor bound inside it still resolves there.
    assert_eq!(a.get_cursor_position(&text, &cursor).unwrap(), 4);
}

#[test]
fn test_positions_count_code_points() {
    let (mut a, _, text) = text_replicas("t", "héllo 🌍");
    assert_eq!(a.length(&text).unwrap(), 7);
    a.transact(|tx| tx.splice_text(&text, 6, 1, "🌙!")).unwrap();
    assert_eq!(a.text(&text).unwrap(), "héllo 🌙!");
    a.transact(|tx| tx.update_text(&text, "hello 🌙!")).unwrap();
    assert_eq!(a.text(&text).unwrap(), "hello 🌙!");
}

#[test]
fn test_concurrent_typing_at_one_position_stays_contiguous() {
    let (mut a, mut b, text) = text_replicas("t", "[]");
    a.transact(|tx| tx.splice_text(&text, 1, 0, "alpha")).unwrap();
    b.transact(|tx| tx.splice_text(&text, 1, 0, "beta")).unwrap();
    merge_both(&mut a, &mut b);

    assert_converged(&a, &b);
    let merged = a.text(&text).unwrap();
    assert!(
        merged == "[alphabeta]" || merged == "[betaalpha]",
        "interleaved: {merged}"
    );
}

#[test]
fn test_concurrent_deletes_and_inserts_converge() {
    let (mut a, mut b, text) = text_replicas("t", "abcdef");
    a.transact(|tx| tx.splice_text(&text, 1, 3, "")).unwrap();
    b.transact(|tx| tx.splice_text(&text, 3, 0, "XY")).unwrap();
    b.transact(|tx| tx.splice_text(&text, 2, 1, "")).unwrap();
    merge_both(&mut a, &mut b);

    assert_converged(&a, &b);
    assert_eq!(a.text(&text).unwrap(), "aXYef");
}

#[test]
fn test_deleting_the_same_character_twice_is_harmless() {
    let (mut a, mut b, text) = text_replicas("t", "xyz");
    a.transact(|tx| tx.delete(&text, 1)).unwrap();
    b.transact(|tx| tx.splice_text(&text, 1, 1, "")).unwrap();
    merge_both(&mut a, &mut b);
    assert_eq!(a.text(&text).unwrap(), "xz");
    assert_converged(&a, &b);
}
