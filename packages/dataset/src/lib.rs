#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only store of the precomputed proximity tables.
//!
//! [`DatasetStore`] holds the four tables the dashboard draws from and is
//! shared immutably for the lifetime of the process. The [`loader`] module
//! builds one from the CSV and `GeoJSON` files on disk; [`geometry`]
//! converts the block outlines back to `GeoJSON` for the map renderer.

pub mod geometry;
pub mod loader;

use std::collections::{BTreeMap, BTreeSet};

use proximity_amenity_models::AmenityCategory;
use proximity_dataset_models::{BlockGeometry, BlockRecord, DestinationPoint, DistributionSample};

/// Errors that can occur while loading the dataset files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A dataset file could not be opened or read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The block geometry file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// A row or feature held a value outside what the table allows.
    #[error("Invalid {table} data: {message}")]
    Parse {
        /// Which table the bad value came from.
        table: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A row named an amenity outside the known set.
    #[error("Unknown amenity category '{value}' in {table}")]
    UnknownCategory {
        /// Which table the bad value came from.
        table: &'static str,
        /// The unrecognized category name.
        value: String,
    },
}

/// The four immutable proximity tables.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    blocks: Vec<BlockRecord>,
    destinations: Vec<DestinationPoint>,
    samples: Vec<DistributionSample>,
    geometry: Vec<BlockGeometry>,
}

/// Mismatches between the distance table and the block outlines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Blocks with distances but no outline.
    pub missing_geometry: Vec<String>,
    /// Outlines with no distance row.
    pub orphan_geometry: Vec<String>,
    /// GEOIDs that appear more than once in the distance table.
    pub duplicate_blocks: Vec<String>,
}

impl ConsistencyReport {
    /// Whether every block has exactly one distance row and one outline.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.missing_geometry.is_empty()
            && self.orphan_geometry.is_empty()
            && self.duplicate_blocks.is_empty()
    }
}

impl DatasetStore {
    /// Assembles a store from already-tabulated rows. Row order is kept as
    /// given.
    #[must_use]
    pub const fn new(
        blocks: Vec<BlockRecord>,
        destinations: Vec<DestinationPoint>,
        samples: Vec<DistributionSample>,
        geometry: Vec<BlockGeometry>,
    ) -> Self {
        Self {
            blocks,
            destinations,
            samples,
            geometry,
        }
    }

    /// All block distance rows, in load order.
    #[must_use]
    pub fn blocks(&self) -> &[BlockRecord] {
        &self.blocks
    }

    /// All amenity locations, in load order.
    #[must_use]
    pub fn destinations(&self) -> &[DestinationPoint] {
        &self.destinations
    }

    /// All ECDF samples, in load order.
    #[must_use]
    pub fn samples(&self) -> &[DistributionSample] {
        &self.samples
    }

    /// All block outlines, in load order.
    #[must_use]
    pub fn geometry(&self) -> &[BlockGeometry] {
        &self.geometry
    }

    /// Number of blocks in the distance table.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Every block GEOID.
    #[must_use]
    pub fn geoids(&self) -> BTreeSet<String> {
        self.blocks.iter().map(|b| b.geoid.clone()).collect()
    }

    /// Amenity locations of one category, order preserved.
    pub fn destinations_for(
        &self,
        category: AmenityCategory,
    ) -> impl Iterator<Item = &DestinationPoint> + '_ {
        self.destinations
            .iter()
            .filter(move |d| d.category == category)
    }

    /// ECDF samples of one category, order preserved.
    pub fn samples_for(
        &self,
        category: AmenityCategory,
    ) -> impl Iterator<Item = &DistributionSample> + '_ {
        self.samples.iter().filter(move |s| s.category == category)
    }

    /// Checks the 1:1 pairing of distance rows and outlines.
    ///
    /// The pairing is a precondition supplied by whoever produced the data;
    /// this only reports where it does not hold.
    #[must_use]
    pub fn consistency_report(&self) -> ConsistencyReport {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for block in &self.blocks {
            *counts.entry(block.geoid.as_str()).or_default() += 1;
        }

        let outlined: BTreeSet<&str> = self.geometry.iter().map(|g| g.geoid.as_str()).collect();

        ConsistencyReport {
            missing_geometry: counts
                .keys()
                .filter(|geoid| !outlined.contains(*geoid))
                .map(|geoid| (*geoid).to_string())
                .collect(),
            orphan_geometry: outlined
                .iter()
                .filter(|geoid| !counts.contains_key(*geoid))
                .map(|geoid| (*geoid).to_string())
                .collect(),
            duplicate_blocks: counts
                .iter()
                .filter(|(_, n)| **n > 1)
                .map(|(geoid, _)| (*geoid).to_string())
                .collect(),
        }
    }
}
