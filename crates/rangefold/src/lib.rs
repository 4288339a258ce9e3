#![forbid(unsafe_code)]

//! Range-aggregate tree with deferred range updates.
//!
//! `rangefold` answers aggregate queries over contiguous index ranges and
//! applies whole-range delta updates, both in O(log n). The engine owns a
//! flat arena of cached aggregates over an implicit binary partition of
//! `[0, n - 1]`; updates targeting a whole partition range are deferred and
//! pushed toward the leaves only when a later operation needs to look
//! underneath them.
//!
//! # Primary pieces
//!
//! - [`RangeTree`]: the engine — build once, then query and update in place.
//! - [`Aggregate`] / [`Update`]: the capability contract the caller
//!   supplies (how ranges summarize, how deltas apply and compose).
//! - [`presets`]: ready-made min/max and sum instantiations with
//!   set/add/no-op range updates.
//!
//! # Design principles
//!
//! - **No pointers**: positions are arena slots addressed by index
//!   arithmetic; no per-node allocation.
//! - **Deterministic**: identical operation sequences always produce
//!   identical state; combine order is fixed left-to-right.
//! - **Single-threaded**: every operation runs to completion on the calling
//!   thread; callers needing shared access serialize externally.
//!
//! # Example
//! ```
//! use rangefold::RangeTree;
//! use rangefold::presets::{MinMax, Patch};
//!
//! let mut tree: RangeTree<MinMax, Patch> = RangeTree::build(8, &[0; 8]).unwrap();
//! tree.update(0, 3, Patch::Set(5)).unwrap();
//! tree.update(2, 5, Patch::Add(3)).unwrap();
//! assert_eq!(tree.query(0, 7).unwrap().max, 8);
//! assert_eq!(tree.query(6, 7).unwrap().max, 0);
//! ```

pub mod error;
pub mod ops;
pub mod presets;
pub mod tree;

pub use error::RangeTreeError;
pub use ops::{Aggregate, Update};
pub use tree::RangeTree;
