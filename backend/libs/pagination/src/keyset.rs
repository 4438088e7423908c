//! Page assembly for keyset-ordered result sets.

use serde::Serialize;
use uuid::Uuid;

use crate::cursor::Cursor;

/// Rows that can anchor a keyset cursor: the value of the active ordering
/// attribute plus the row id as the tie-break.
pub trait SortKeyed {
    fn sort_key(&self) -> i64;
    fn row_id(&self) -> Uuid;
}

/// Validated listing parameters: a clamped limit plus the decoded cursor.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub limit: i64,
    pub cursor: Option<Cursor>,
}

impl PageParams {
    /// Clamp the requested limit into the endpoint's documented range.
    /// Out-of-range limits are clamped, not rejected.
    pub fn clamped(requested: i64, min: i64, max: i64, cursor: Option<Cursor>) -> Self {
        Self {
            limit: requested.clamp(min, max),
            cursor,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }
}

/// One page of a listing. `next_cursor` is present iff the page was filled
/// to exactly `limit` rows, anchored to the last row returned.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// A widened (fallback) page or a single-shot listing: items only,
    /// pagination does not continue.
    pub fn without_cursor(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// Convert the row type while keeping the cursor (view-model mapping).
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }

    /// Assemble a page for a row type that participates in more than one
    /// ordering; `key_of` names the active dimension.
    pub fn from_rows_by<F>(rows: Vec<T>, limit: i64, key_of: F) -> Self
    where
        F: Fn(&T) -> (i64, Uuid),
    {
        let next_cursor = if rows.len() as i64 == limit {
            rows.last().map(|last| {
                let (sort_key, id) = key_of(last);
                Cursor::new(sort_key, id).encode()
            })
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }
}

impl<T: SortKeyed> Page<T> {
    /// Assemble a page from rows the store returned for a `LIMIT limit`
    /// query. A full page may have more rows below it, so it carries a
    /// cursor; a short page is the end of the set.
    pub fn from_rows(rows: Vec<T>, limit: i64) -> Self {
        let next_cursor = if rows.len() as i64 == limit {
            rows.last()
                .map(|last| Cursor::new(last.sort_key(), last.row_id()).encode())
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }
}

/// The keyset predicate as plain logic, for callers that filter in memory
/// (and for asserting that pages drawn through SQL and pages drawn through
/// this function agree): a row is below the cursor iff
/// `sort < cursor.sort OR (sort = cursor.sort AND id < cursor.id)`.
pub fn is_below_cursor<T: SortKeyed>(row: &T, cursor: &Cursor) -> bool {
    row.sort_key() < cursor.sort_key
        || (row.sort_key() == cursor.sort_key && row.row_id() < cursor.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestRow {
        key: i64,
        id: Uuid,
    }

    impl SortKeyed for TestRow {
        fn sort_key(&self) -> i64 {
            self.key
        }
        fn row_id(&self) -> Uuid {
            self.id
        }
    }

    fn row(key: i64, id: u128) -> TestRow {
        TestRow {
            key,
            id: Uuid::from_u128(id),
        }
    }

    #[test]
    fn test_full_page_carries_cursor_of_last_row() {
        let rows = vec![row(5, 3), row(5, 2)];
        let page = Page::from_rows(rows, 2);
        let cursor = Cursor::decode(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(cursor.sort_key, 5);
        assert_eq!(cursor.id, Uuid::from_u128(2));
    }

    #[test]
    fn test_short_page_has_no_cursor() {
        let page = Page::from_rows(vec![row(3, 1)], 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_empty_page() {
        let page: Page<TestRow> = Page::from_rows(vec![], 10);
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_clamped_limits() {
        assert_eq!(PageParams::clamped(0, 1, 60, None).limit, 1);
        assert_eq!(PageParams::clamped(500, 1, 60, None).limit, 60);
        assert_eq!(PageParams::clamped(20, 1, 60, None).limit, 20);
    }

    #[test]
    fn test_keyset_predicate_orders_by_key_then_id() {
        let cursor = Cursor::new(5, Uuid::from_u128(2));
        assert!(is_below_cursor(&row(3, 9), &cursor));
        assert!(is_below_cursor(&row(5, 1), &cursor));
        assert!(!is_below_cursor(&row(5, 2), &cursor));
        assert!(!is_below_cursor(&row(5, 3), &cursor));
        assert!(!is_below_cursor(&row(7, 1), &cursor));
    }

    // The end-to-end walk from the product contract: rows
    // [(t=5,c),(t=5,b),(t=3,a)] with limit=2 yield page [(5,c),(5,b)] with a
    // cursor anchored at (5,b), then page [(3,a)] with no cursor.
    #[test]
    fn test_two_page_walk() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);
        let all = vec![row(5, 3), row(5, 2), row(3, 1)];

        let first = Page::from_rows(all[..2].to_vec(), 2);
        assert_eq!(first.items[0].id, c);
        assert_eq!(first.items[1].id, b);
        let cursor = Cursor::decode(first.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!((cursor.sort_key, cursor.id), (5, b));

        let remaining: Vec<TestRow> = all
            .iter()
            .filter(|r| is_below_cursor(*r, &cursor))
            .cloned()
            .collect();
        let second = Page::from_rows(remaining, 2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, a);
        assert!(second.next_cursor.is_none());
    }

    // A row inserted above an already-issued cursor must not show up when
    // paging on with that cursor.
    #[test]
    fn test_concurrent_insert_does_not_leak_into_older_pages() {
        let cursor = Cursor::new(5, Uuid::from_u128(2));
        let inserted = row(9, 100);
        assert!(!is_below_cursor(&inserted, &cursor));
    }
}
