//! Renderer-facing descriptions of the map and the ECDF chart.
//!
//! Both builders are pure projections of the dataset: identical inputs
//! always produce identical outputs.

use std::collections::{BTreeMap, BTreeSet};

use proximity_amenity_models::{
    AmenityCategory, ColorStop, DEFAULT_VIEWPORT, DISTANCE_COLOR_RANGE_KM, DISTANCE_PALETTE,
    MapViewport,
};
use proximity_dataset::DatasetStore;
use proximity_dataset_models::DestinationPoint;
use serde::Serialize;

use crate::{CrossfilterError, DataIntegrityError};

/// Y-axis title of the ECDF chart.
pub const PERCENT_AXIS_TITLE: &str = "% of residents";

/// Everything needed to draw the choropleth and the amenity markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewModel {
    /// Amenity the map shows.
    pub category: AmenityCategory,
    /// Legend label for the destination markers.
    pub legend_name: &'static str,
    /// Marker color.
    pub marker_color: &'static str,
    /// Choropleth color scale.
    pub color_scale: &'static [ColorStop],
    /// Distances mapped to the ends of the color scale.
    pub color_range_km: (f64, f64),
    /// Initial camera.
    pub viewport: MapViewport,
    /// Distance of every block, regardless of the brush.
    pub per_block_distance: BTreeMap<String, f64>,
    /// Blocks emphasized by the brush.
    pub highlighted: BTreeSet<String>,
    /// Locations of the amenity, in dataset order.
    pub destinations: Vec<DestinationPoint>,
}

/// One plotted point of the ECDF curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPoint {
    /// Distance (km).
    pub distance: f64,
    /// Percent of residents within `distance`.
    pub percentile: f64,
    /// Tooltip text.
    pub hover_text: String,
}

/// Everything needed to draw a category's ECDF chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionViewModel {
    /// Amenity the curve describes.
    pub category: AmenityCategory,
    /// Curve color.
    pub color: &'static str,
    /// X-axis title.
    pub x_axis_title: String,
    /// Y-axis title.
    pub y_axis_title: &'static str,
    /// Curve points, ascending by distance.
    pub points: Vec<DistributionPoint>,
}

/// Builds the map description.
///
/// `highlighted` is exactly `selected`; the choropleth values cover every
/// block so the unselected ones keep their spatial context.
///
/// # Errors
///
/// Returns [`CrossfilterError::DataIntegrity`] if any block lacks a
/// distance for `category`.
pub fn build_map(
    category: AmenityCategory,
    selected: BTreeSet<String>,
    store: &DatasetStore,
) -> Result<MapViewModel, CrossfilterError> {
    let per_block_distance = store
        .blocks()
        .iter()
        .map(|block| {
            block
                .distance(category)
                .map(|km| (block.geoid.clone(), km))
                .ok_or_else(|| DataIntegrityError::MissingDistance {
                    geoid: block.geoid.clone(),
                    category,
                })
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(MapViewModel {
        category,
        legend_name: category.display_name(),
        marker_color: category.color(),
        color_scale: &DISTANCE_PALETTE,
        color_range_km: DISTANCE_COLOR_RANGE_KM,
        viewport: DEFAULT_VIEWPORT,
        per_block_distance,
        highlighted: selected,
        destinations: store.destinations_for(category).copied().collect(),
    })
}

/// Builds the ECDF chart description for `category`.
///
/// The curve does not depend on the brushed range: the chart is where the
/// range is chosen, not something it filters.
///
/// # Errors
///
/// Returns [`CrossfilterError::DataIntegrity`] if the dataset has no ECDF
/// samples for `category`.
pub fn build_distribution(
    category: AmenityCategory,
    store: &DatasetStore,
) -> Result<DistributionViewModel, CrossfilterError> {
    let points: Vec<DistributionPoint> = store
        .samples_for(category)
        .map(|sample| DistributionPoint {
            distance: sample.distance,
            percentile: sample.percentile,
            hover_text: hover_text(category, sample.distance, sample.percentile),
        })
        .collect();

    if points.is_empty() {
        return Err(DataIntegrityError::MissingSamples { category }.into());
    }

    Ok(DistributionViewModel {
        category,
        color: category.color(),
        x_axis_title: format!("distance to nearest {category} (km)"),
        y_axis_title: PERCENT_AXIS_TITLE,
        points,
    })
}

fn hover_text(category: AmenityCategory, distance: f64, percentile: f64) -> String {
    format!("{percentile:.2}% of residents live within {distance:.1}km of a {category}")
}
