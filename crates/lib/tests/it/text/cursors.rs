use accord::{Cursor, ROOT, ReadDoc};

use crate::helpers::{merge_both, test_doc, text_replicas};

#[test]
fn test_cursor_follows_inserts_before_it() {
    let (mut a, _, text) = text_replicas("t", "world");
    let cursor = a.get_cursor(&text, 3).unwrap();
    a.transact(|tx| tx.splice_text(&text, 0, 0, "hello ")).unwrap();
    assert_eq!(a.get_cursor_position(&text, &cursor).unwrap(), 9);

    // Inserts after the cursor do not move it.
    a.transact(|tx| tx.splice_text(&text, 11, 0, "!")).unwrap();
    assert_eq!(a.get_cursor_position(&text, &cursor).unwrap(), 9);
}

#[test]
fn test_cursor_survives_merges_from_another_replica() {
    let (mut a, mut b, text) = text_replicas("t", "abc");
    let cursor = a.get_cursor(&text, 2).unwrap();
    b.transact(|tx| tx.splice_text(&text, 0, 0, "123")).unwrap();
    merge_both(&mut a, &mut b);

    assert_eq!(a.get_cursor_position(&text, &cursor).unwrap(), 5);
    // The same cursor means the same thing on the other replica.
    assert_eq!(b.get_cursor_position(&text, &cursor).unwrap(), 5);
}

#[test]
fn test_cursor_on_a_deleted_character_falls_back_left() {
    let (mut a, _, text) = text_replicas("t", "abcdef");
    let cursor = a.get_cursor(&text, 4).unwrap();
    a.transact(|tx| tx.splice_text(&text, 2, 2, "")).unwrap();
    assert_eq!(a.get_cursor_position(&text, &cursor).unwrap(), 2);
}

#[test]
fn test_start_cursor_and_textual_form() {
    let (a, _, text) = text_replicas("t", "abc");
    let start = a.get_cursor(&text, 0).unwrap();
    assert_eq!(start, Cursor::Start);
    assert_eq!(start.to_string(), "_start");

    let cursor = a.get_cursor(&text, 3).unwrap();
    let parsed: Cursor = cursor.to_string().parse().unwrap();
    assert_eq!(parsed, cursor);
    assert_eq!(a.get_cursor_position(&text, &parsed).unwrap(), 3);

    assert!(a.get_cursor(&text, 4).unwrap_err().is_index_out_of_range());
}

#[test]
fn test_cursors_work_on_lists() {
    let mut doc = test_doc(1);
    let list = doc
        .transact(|tx| {
            let list = tx.put_object(&ROOT, "list", accord::ObjType::List)?;
            for i in 0..3 {
                tx.push(&list, i)?;
            }
            Ok::<_, accord::Error>(list)
        })
        .unwrap()
        .0;
    let cursor = doc.get_cursor(&list, 2).unwrap();
    doc.transact(|tx| tx.insert(&list, 0, -1)).unwrap();
    assert_eq!(doc.get_cursor_position(&list, &cursor).unwrap(), 3);
}
