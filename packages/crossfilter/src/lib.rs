#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection-driven cross-filter for the proximity dashboard.
//!
//! A user picks an amenity and brushes a distance interval on that
//! amenity's ECDF chart; the map highlights the blocks whose distance falls
//! in the interval. This crate owns that logic:
//!
//! * [`selection`] — the amenity + interval the user has chosen.
//! * [`filter`] — maps an interval to the set of matching blocks.
//! * [`view_model`] — pure builders for the map and chart descriptions.
//! * [`controller`] — the single owner of the selection, reacting to
//!   amenity and brush events and rebuilding the view models.
//!
//! Nothing here performs I/O or rendering. The dataset is loaded by
//! `proximity_dataset` and the view models are drawn by whatever consumes
//! them.

pub mod controller;
pub mod filter;
pub mod selection;
pub mod view_model;

pub use controller::{BrushSource, ChartKind, InteractionController, Rebuilt, Stimulus};
pub use filter::filter_blocks;
pub use selection::{DistanceInterval, Selection, SelectionRange};
pub use view_model::{
    DistributionPoint, DistributionViewModel, MapViewModel, build_distribution, build_map,
};

use proximity_amenity_models::AmenityCategory;

/// Errors produced by the cross-filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrossfilterError {
    /// An event named an amenity outside the known set.
    #[error("Invalid amenity category '{0}'")]
    InvalidCategory(String),

    /// A brushed interval had `lo > hi` or a non-finite bound.
    #[error("Invalid distance range [{lo}, {hi}]")]
    InvalidRange {
        /// Lower bound as received.
        lo: f64,
        /// Upper bound as received.
        hi: f64,
    },

    /// The dataset lacks a value that must be present.
    #[error("Data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),
}

impl CrossfilterError {
    /// Whether this error came from a bad event rather than bad data.
    ///
    /// Validation errors leave the previous selection in place and are safe
    /// to report back to the user; data-integrity errors belong to whoever
    /// supplied the dataset.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidCategory(_) | Self::InvalidRange { .. })
    }
}

/// A gap in the dataset found while filtering or building a view model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
    /// A block has no distance for the requested amenity.
    #[error("block {geoid} has no {category} distance")]
    MissingDistance {
        /// Block GEOID.
        geoid: String,
        /// Amenity whose distance is missing.
        category: AmenityCategory,
    },

    /// The ECDF table has no samples for the requested amenity.
    #[error("no ECDF samples for {category}")]
    MissingSamples {
        /// Amenity whose curve is missing.
        category: AmenityCategory,
    },
}

/// Parses an amenity name as sent by the UI.
///
/// # Errors
///
/// Returns [`CrossfilterError::InvalidCategory`] if `name` is not one of
/// the known amenities.
pub fn parse_category(name: &str) -> Result<AmenityCategory, CrossfilterError> {
    name.trim()
        .parse()
        .map_err(|_| CrossfilterError::InvalidCategory(name.to_string()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use proximity_amenity_models::AmenityCategory;
    use proximity_dataset::DatasetStore;
    use proximity_dataset_models::{BlockRecord, DestinationPoint, DistributionSample};

    /// Three blocks with distances for every amenity, two ECDF samples per
    /// amenity and a couple of destinations.
    pub fn store() -> DatasetStore {
        let block = |geoid: &str, hospital: f64, school: f64| {
            BlockRecord::new(geoid)
                .with_distance(AmenityCategory::Hospital, hospital)
                .with_distance(AmenityCategory::Supermarket, 0.8)
                .with_distance(AmenityCategory::School, school)
                .with_distance(AmenityCategory::Library, 2.0)
        };

        let samples = AmenityCategory::all()
            .iter()
            .flat_map(|category| {
                [
                    DistributionSample {
                        category: *category,
                        distance: 0.5,
                        percentile: 25.0,
                    },
                    DistributionSample {
                        category: *category,
                        distance: 3.4,
                        percentile: 100.0,
                    },
                ]
            })
            .collect();

        DatasetStore::new(
            vec![block("A", 1.2, 0.3), block("B", 3.4, 0.9), block("C", 0.5, 2.5)],
            vec![
                DestinationPoint {
                    category: AmenityCategory::Hospital,
                    lat: 39.29,
                    lon: -76.59,
                },
                DestinationPoint {
                    category: AmenityCategory::School,
                    lat: 39.30,
                    lon: -76.60,
                },
                DestinationPoint {
                    category: AmenityCategory::Hospital,
                    lat: 39.31,
                    lon: -76.62,
                },
            ],
            samples,
            Vec::new(),
        )
    }
}
