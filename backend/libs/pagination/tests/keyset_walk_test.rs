//! End-to-end pagination properties over an in-memory row set.
//!
//! The store is simulated with a sorted Vec and the same
//! `(sort_key, id) DESC` predicate the SQL queries bind; the properties
//! checked here are the contract every listing endpoint relies on.

use pagination::{is_below_cursor, resolve_tiers, Cursor, Page, SortKeyed};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    key: i64,
    id: Uuid,
}

impl SortKeyed for Row {
    fn sort_key(&self) -> i64 {
        self.key
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

fn row(key: i64, id: u128) -> Row {
    Row {
        key,
        id: Uuid::from_u128(id),
    }
}

/// Descending `(key, id)` order, the way every listing query sorts.
fn sort_desc(rows: &mut [Row]) {
    rows.sort_by(|a, b| b.key.cmp(&a.key).then(b.id.cmp(&a.id)));
}

/// Simulate one store query: rows strictly below the cursor, up to `limit`.
fn query(rows: &[Row], cursor: Option<&Cursor>, limit: usize) -> Vec<Row> {
    rows.iter()
        .filter(|r| cursor.map_or(true, |c| is_below_cursor(*r, c)))
        .take(limit)
        .cloned()
        .collect()
}

/// Follow `next_cursor` until exhaustion, concatenating the pages.
fn walk_all(rows: &[Row], limit: i64) -> Vec<Row> {
    let mut collected = Vec::new();
    let mut cursor: Option<Cursor> = None;
    loop {
        let page = Page::from_rows(query(rows, cursor.as_ref(), limit as usize), limit);
        collected.extend(page.items.iter().cloned());
        match page.next_cursor.as_deref() {
            Some(token) => cursor = Some(Cursor::decode(token).unwrap()),
            None => return collected,
        }
    }
}

#[test]
fn test_walk_is_strictly_decreasing_with_no_duplicates_or_gaps() {
    let mut rows: Vec<Row> = (0..57)
        .map(|i| row((i % 9) as i64, 1000 + i as u128))
        .collect();
    sort_desc(&mut rows);

    let collected = walk_all(&rows, 10);

    // No gaps relative to a single non-paginated query of the same filter
    assert_eq!(collected, rows);

    // Strictly decreasing under (key, id): total order, no duplicates
    for pair in collected.windows(2) {
        let ahead = (pair[0].key, pair[0].id);
        let behind = (pair[1].key, pair[1].id);
        assert!(ahead > behind, "ordering violated: {ahead:?} !> {behind:?}");
    }
}

#[test]
fn test_walk_with_limit_larger_than_set() {
    let mut rows: Vec<Row> = (0..5).map(|i| row(i as i64, i as u128)).collect();
    sort_desc(&mut rows);
    assert_eq!(walk_all(&rows, 50), rows);
}

#[test]
fn test_page_boundary_exactly_at_end_of_set() {
    // 6 rows, limit 3: the second page is full, so it hands out a cursor;
    // the third query comes back empty with a null cursor.
    let mut rows: Vec<Row> = (0..6).map(|i| row(1, 10 + i as u128)).collect();
    sort_desc(&mut rows);

    let first = Page::from_rows(query(&rows, None, 3), 3);
    let c1 = Cursor::decode(first.next_cursor.as_deref().unwrap()).unwrap();
    let second = Page::from_rows(query(&rows, Some(&c1), 3), 3);
    let c2 = Cursor::decode(second.next_cursor.as_deref().unwrap()).unwrap();
    let third = Page::from_rows(query(&rows, Some(&c2), 3), 3);

    assert!(third.items.is_empty());
    assert!(third.next_cursor.is_none());
    assert_eq!(first.items.len() + second.items.len(), rows.len());
}

#[test]
fn test_concurrent_head_insert_does_not_shift_pages() {
    let mut rows: Vec<Row> = (0..8).map(|i| row(i as i64, 100 + i as u128)).collect();
    sort_desc(&mut rows);

    let first = Page::from_rows(query(&rows, None, 4), 4);
    let cursor = Cursor::decode(first.next_cursor.as_deref().unwrap()).unwrap();

    // A newer row lands at the head between the two requests.
    rows.push(row(99, 999));
    sort_desc(&mut rows);

    let second = Page::from_rows(query(&rows, Some(&cursor), 4), 4);

    // The new row is not in the continuation, and nothing already seen
    // repeats.
    assert!(second.items.iter().all(|r| r.id != Uuid::from_u128(999)));
    for seen in &first.items {
        assert!(second.items.iter().all(|r| r.id != seen.id));
    }
}

#[tokio::test]
async fn test_cascade_page_is_terminal() {
    // An under-filled primary tier widens; the resulting page must not
    // continue (its rows span tiers, so no cursor can anchor it).
    let tier0 = vec![row(5, 1)];
    let tier1 = vec![row(5, 1), row(4, 2), row(3, 3)];

    let outcome = resolve_tiers::<_, std::convert::Infallible, _, _>(2, 3, |tier| {
        let rows = if tier == 0 { tier0.clone() } else { tier1.clone() };
        async move { Ok(rows) }
    })
    .await
    .unwrap();

    assert!(outcome.widened);
    let page = if outcome.widened {
        Page::without_cursor(outcome.rows)
    } else {
        Page::from_rows(outcome.rows, 3)
    };
    assert_eq!(page.items.len(), 3);
    assert!(page.next_cursor.is_none());
}
