//! The user's current amenity and distance-interval choice.

use proximity_amenity_models::AmenityCategory;
use serde::Serialize;

use crate::CrossfilterError;

/// A closed distance interval `[lo, hi]` in kilometers.
///
/// Both bounds are finite and `lo <= hi`; `lo == hi` is a valid
/// single-value interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceInterval {
    lo: f64,
    hi: f64,
}

impl DistanceInterval {
    /// Validates and creates an interval.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::InvalidRange`] if either bound is
    /// non-finite or `lo > hi`.
    pub fn new(lo: f64, hi: f64) -> Result<Self, CrossfilterError> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(CrossfilterError::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// Lower bound (km).
    #[must_use]
    pub const fn lo(self) -> f64 {
        self.lo
    }

    /// Upper bound (km).
    #[must_use]
    pub const fn hi(self) -> f64 {
        self.hi
    }

    /// Whether `km` lies inside the interval, both ends included.
    #[must_use]
    pub fn contains(self, km: f64) -> bool {
        self.lo <= km && km <= self.hi
    }
}

/// Which blocks the brush selects.
///
/// A cleared brush and a brush that was never drawn are the same thing:
/// [`SelectionRange::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectionRange {
    /// No filter; every block is selected.
    #[default]
    Unbounded,
    /// Only blocks whose distance lies in the interval.
    Bounded(DistanceInterval),
}

impl SelectionRange {
    /// Builds a range from optional `(lo, hi)` bounds as reported by a
    /// chart brush; `None` means the brush was cleared.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::InvalidRange`] if the bounds are invalid.
    pub fn from_bounds(bounds: Option<(f64, f64)>) -> Result<Self, CrossfilterError> {
        match bounds {
            None => Ok(Self::Unbounded),
            Some((lo, hi)) => Ok(Self::Bounded(DistanceInterval::new(lo, hi)?)),
        }
    }

    /// Whether a block at `km` is selected.
    #[must_use]
    pub fn contains(self, km: f64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(interval) => interval.contains(km),
        }
    }

    /// Whether this is the no-filter range.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

/// The complete selection state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Amenity whose distances are shown.
    pub category: AmenityCategory,
    /// Brushed distance range on that amenity's chart.
    pub range: SelectionRange,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            category: AmenityCategory::first(),
            range: SelectionRange::Unbounded,
        }
    }
}
