//! Ready-made aggregate and update instantiations.
//!
//! Covers the common min/max and sum trees with set/add range updates.
//! These are one possible instantiation of the [`ops`](crate::ops)
//! contract, not a privileged one — domain-specific trees implement the
//! traits directly.

use crate::ops::{Aggregate, Update};

/// Minimum and maximum over a range of `i64` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMax {
    /// Smallest value in the range.
    pub min: i64,
    /// Largest value in the range.
    pub max: i64,
}

impl Aggregate for MinMax {
    type Element = i64;

    fn identity() -> Self {
        Self {
            min: i64::MAX,
            max: i64::MIN,
        }
    }

    fn leaf(_index: usize, element: &i64) -> Self {
        Self {
            min: *element,
            max: *element,
        }
    }

    fn combine(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Sum over a range of `i64` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sum(pub i64);

impl Aggregate for Sum {
    type Element = i64;

    fn identity() -> Self {
        Self(0)
    }

    fn leaf(_index: usize, element: &i64) -> Self {
        Self(*element)
    }

    fn combine(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }
}

/// Range update over `i64` elements: overwrite, accumulate, or nothing.
///
/// Composition follows "first, then later": a later [`Set`](Patch::Set)
/// fully determines future values and discards whatever was pending; a
/// later [`Add`](Patch::Add) folds into a pending `Set`'s value or merges
/// with a pending `Add` by summing deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch {
    /// Leave the range untouched.
    #[default]
    Noop,
    /// Set every element in the range to the value.
    Set(i64),
    /// Add the delta to every element in the range.
    Add(i64),
}

impl Patch {
    fn composed(self, later: Self) -> Self {
        match (self, later) {
            (first, Self::Noop) => first,
            (_, Self::Set(v)) => Self::Set(v),
            (Self::Noop, later) => later,
            (Self::Set(v), Self::Add(d)) => Self::Set(v + d),
            (Self::Add(a), Self::Add(d)) => Self::Add(a + d),
        }
    }
}

impl Update<MinMax> for Patch {
    fn apply(&self, agg: &mut MinMax, _lo: usize, _hi: usize) {
        match *self {
            Self::Noop => {}
            Self::Set(v) => {
                agg.min = v;
                agg.max = v;
            }
            Self::Add(d) => {
                agg.min += d;
                agg.max += d;
            }
        }
    }

    fn compose(&self, later: &Self, _lo: usize, _hi: usize) -> Self {
        self.composed(*later)
    }
}

impl Update<Sum> for Patch {
    fn apply(&self, agg: &mut Sum, lo: usize, hi: usize) {
        let width = (hi - lo + 1) as i64;
        match *self {
            Self::Noop => {}
            Self::Set(v) => agg.0 = v * width,
            Self::Add(d) => agg.0 += d * width,
        }
    }

    fn compose(&self, later: &Self, _lo: usize, _hi: usize) -> Self {
        self.composed(*later)
    }
}
