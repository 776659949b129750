use accord::{ExpandMark, Mark, ReadDoc};

use crate::helpers::{merge_both, text_replicas};

#[test]
fn test_mark_expands_only_on_the_chosen_side() {
    let (mut a, _, text) = text_replicas("t", "abc");
    a.transact(|tx| tx.mark(&text, 1..2, "bold", true, ExpandMark::After))
        .unwrap();
    a.transact(|tx| tx.mark(&text, 1..2, "link", "x", ExpandMark::None))
        .unwrap();

    // Typing right after "b".
    a.transact(|tx| tx.splice_text(&text, 2, 0, "!")).unwrap();
    assert_eq!(a.text(&text).unwrap(), "ab!c");
    assert_eq!(
        a.marks(&text).unwrap(),
        vec![Mark::new("bold", true, 1, 3), Mark::new("link", "x", 1, 2)]
    );

    // Typing right before "b" expands neither.
    a.transact(|tx| tx.splice_text(&text, 1, 0, "?")).unwrap();
    assert_eq!(
        a.marks(&text).unwrap(),
        vec![Mark::new("bold", true, 2, 4), Mark::new("link", "x", 2, 3)]
    );
}

#[test]
fn test_expand_before_covers_inserts_at_the_start() {
    let (mut a, _, text) = text_replicas("t", "abc");
    a.transact(|tx| tx.mark(&text, 1..3, "em", true, ExpandMark::Before))
        .unwrap();
    a.transact(|tx| tx.splice_text(&text, 1, 0, "_")).unwrap();
    assert_eq!(a.marks(&text).unwrap(), vec![Mark::new("em", true, 1, 4)]);
}

#[test]
fn test_concurrent_insert_inside_a_mark_is_covered() {
    let (mut a, mut b, text) = text_replicas("t", "hello");
    a.transact(|tx| tx.mark(&text, 0..5, "bold", true, ExpandMark::None))
        .unwrap();
    b.transact(|tx| tx.splice_text(&text, 2, 0, "XX")).unwrap();
    merge_both(&mut a, &mut b);

    assert_eq!(a.text(&text).unwrap(), "heXXllo");
    assert_eq!(a.marks(&text).unwrap(), vec![Mark::new("bold", true, 0, 7)]);
    assert_eq!(a.marks(&text).unwrap(), b.marks(&text).unwrap());
}

#[test]
fn test_later_mark_wins_and_unmark_hides() {
    let (mut a, mut b, text) = text_replicas("t", "abcdef");
    a.transact(|tx| tx.mark(&text, 0..6, "color", "red", ExpandMark::None))
        .unwrap();
    b.merge(&a).unwrap();
    b.transact(|tx| tx.mark(&text, 2..4, "color", "blue", ExpandMark::None))
        .unwrap();
    a.transact(|tx| tx.unmark(&text, 5..6, "color", ExpandMark::None))
        .unwrap();
    merge_both(&mut a, &mut b);

    assert_eq!(
        a.marks(&text).unwrap(),
        vec![
            Mark::new("color", "red", 0, 2),
            Mark::new("color", "blue", 2, 4),
            Mark::new("color", "red", 4, 5),
        ]
    );
    assert_eq!(a.marks(&text).unwrap(), b.marks(&text).unwrap());
}
