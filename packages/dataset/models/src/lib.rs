#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types for the precomputed proximity tables.
//!
//! These are the already-tabulated inputs the dashboard works from: one
//! distance row per residential block, the amenity locations, the ECDF
//! curve samples, and the block polygons. All are immutable after load.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use proximity_amenity_models::AmenityCategory;
use serde::{Deserialize, Serialize};

/// Distance-to-nearest values for one residential block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    /// Census block GEOID (e.g. "245100101001000").
    pub geoid: String,
    /// Kilometers to the nearest instance of each amenity. A category
    /// absent from this map is a gap in the source data.
    pub distances: BTreeMap<AmenityCategory, f64>,
}

impl BlockRecord {
    /// Creates a block with no distances recorded yet.
    #[must_use]
    pub fn new(geoid: impl Into<String>) -> Self {
        Self {
            geoid: geoid.into(),
            distances: BTreeMap::new(),
        }
    }

    /// Builder-style helper to record the distance for one category.
    #[must_use]
    pub fn with_distance(mut self, category: AmenityCategory, km: f64) -> Self {
        self.distances.insert(category, km);
        self
    }

    /// Kilometers to the nearest `category`, if the source provided one.
    #[must_use]
    pub fn distance(&self, category: AmenityCategory) -> Option<f64> {
        self.distances.get(&category).copied()
    }
}

/// One physical amenity location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPoint {
    /// What kind of amenity this is.
    pub category: AmenityCategory,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
}

/// One point on a category's precomputed ECDF curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSample {
    /// Category this curve belongs to.
    pub category: AmenityCategory,
    /// Distance in kilometers.
    pub distance: f64,
    /// Percent of residents (0-100) living within `distance`.
    pub percentile: f64,
}

/// Polygon outline of a residential block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGeometry {
    /// Same GEOID as the matching [`BlockRecord`].
    pub geoid: String,
    /// Block outline. Single polygons are stored as a one-member
    /// multipolygon.
    pub polygon: MultiPolygon<f64>,
}
