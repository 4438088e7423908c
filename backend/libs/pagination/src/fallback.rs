//! First-page fallback cascade.
//!
//! Some listings filter down to a window that can under-populate (users
//! registered this week, photos liked today — thin late at night and early
//! in the product's life). For those, the first page widens through ordered
//! tiers until it fills or the tiers run out.
//!
//! The cascade only ever runs on the first page. A paginating client keeps
//! receiving rows from the tier it started with or none at all; widening
//! mid-scroll would reorder and duplicate items under the reader. Callers
//! enforce that by not invoking the resolver when a cursor is present, and
//! by returning a null next-cursor whenever the outcome is widened.

use std::collections::HashSet;
use std::future::Future;

use uuid::Uuid;

use crate::keyset::SortKeyed;

/// Rows gathered across tiers plus whether any tier past the first ran.
/// `widened` pages must not carry a next-cursor.
#[derive(Debug)]
pub struct CascadeOutcome<T> {
    pub rows: Vec<T>,
    pub widened: bool,
}

/// Run tiers in order until the page fills.
///
/// `fetch(i)` executes tier `i` (0 = primary, each later tier strictly
/// wider) and returns up to `limit` rows in `(sort_key, id)` descending
/// order. Wider tiers are supersets of narrower ones, so rows already taken
/// are dropped by id before appending; within each tier the store's
/// ordering is preserved, which keeps the page globally ordered,
/// tier-1 rows first.
///
/// Every tier empty is a valid outcome: the page is simply empty.
pub async fn resolve_tiers<T, E, F, Fut>(
    tier_count: usize,
    limit: i64,
    mut fetch: F,
) -> Result<CascadeOutcome<T>, E>
where
    T: SortKeyed,
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let limit = limit as usize;
    let mut rows = fetch(0).await?;
    if rows.len() >= limit || tier_count <= 1 {
        rows.truncate(limit);
        return Ok(CascadeOutcome {
            rows,
            widened: false,
        });
    }

    let mut seen: HashSet<Uuid> = rows.iter().map(|r| r.row_id()).collect();
    let mut widened = false;

    for tier in 1..tier_count {
        widened = true;
        let wider = fetch(tier).await?;
        for row in wider {
            if rows.len() >= limit {
                break;
            }
            if seen.insert(row.row_id()) {
                rows.push(row);
            }
        }
        if rows.len() >= limit {
            break;
        }
    }

    Ok(CascadeOutcome { rows, widened })
}
