//! Keyset pagination shared across the listing endpoints.
//!
//! Every listing in the product orders rows by a compound `(sort_key, id)`
//! descending key and pages through them with an opaque cursor anchored to
//! the last row of the previous page. Anchoring to a value instead of an
//! offset keeps pages stable while new rows are inserted at the head: a row
//! newer than the cursor can never leak into an older page, and no
//! already-seen row repeats.
//!
//! The crate provides the cursor codec, page assembly, and the first-page
//! fallback cascade. It never talks to the store itself; repositories run
//! the actual queries and feed rows through here.

pub mod cursor;
pub mod fallback;
pub mod keyset;

pub use cursor::{Cursor, CursorError};
pub use fallback::{resolve_tiers, CascadeOutcome};
pub use keyset::{is_below_cursor, Page, PageParams, SortKeyed};
