#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the proximity server.
//!
//! Incoming events are kept as loosely-typed wire structs (amenity names as
//! strings, brush bounds as an optional pair) and validated into
//! [`Stimulus`] values, so a bad name or range surfaces as a
//! [`CrossfilterError`] rather than a deserialization failure.

use proximity_amenity_models::AmenityCategory;
use proximity_crossfilter::{
    BrushSource, ChartKind, CrossfilterError, Rebuilt, Selection, Stimulus, parse_category,
};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// An entry in the amenity dropdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAmenity {
    /// Value sent back in `amenityChanged` events.
    pub value: AmenityCategory,
    /// Dropdown label.
    pub label: String,
    /// Legend name.
    pub name: &'static str,
    /// Marker and curve color.
    pub color: &'static str,
}

impl From<AmenityCategory> for ApiAmenity {
    fn from(category: AmenityCategory) -> Self {
        Self {
            value: category,
            label: category.dropdown_label(),
            name: category.display_name(),
            color: category.color(),
        }
    }
}

/// Chart identifiers as sent by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiChart {
    /// The ECDF chart.
    Ecdf,
    /// The choropleth map.
    Map,
    /// Anything else; brushes from it are ignored.
    #[serde(other)]
    Other,
}

impl From<ApiChart> for ChartKind {
    fn from(chart: ApiChart) -> Self {
        match chart {
            ApiChart::Ecdf => Self::Distribution,
            ApiChart::Map => Self::Map,
            ApiChart::Other => Self::Other,
        }
    }
}

/// The widget a brush was drawn on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBrushSource {
    /// Chart identifier.
    pub chart: ApiChart,
    /// Amenity that chart was showing.
    pub amenity: String,
}

/// One UI event in a `POST /api/events` batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ApiEvent {
    /// The amenity dropdown changed.
    AmenityChanged {
        /// New amenity name.
        amenity: String,
    },
    /// A range was brushed on a chart; `range: null` clears it.
    RangeBrushed {
        /// Where the brush came from.
        source: ApiBrushSource,
        /// `[lo, hi]` in kilometers.
        #[serde(default)]
        range: Option<[f64; 2]>,
    },
}

impl ApiEvent {
    /// Validates the event into a [`Stimulus`].
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::InvalidCategory`] for unknown amenity
    /// names and [`CrossfilterError::InvalidRange`] for bad bounds.
    pub fn into_stimulus(self) -> Result<Stimulus, CrossfilterError> {
        match self {
            Self::AmenityChanged { amenity } => Stimulus::amenity_changed(&amenity),
            Self::RangeBrushed { source, range } => {
                let source = BrushSource {
                    chart: source.chart.into(),
                    category: parse_category(&source.amenity)?,
                };
                Stimulus::range_brushed(source, range.map(|[lo, hi]| (lo, hi)))
            }
        }
    }
}

/// Response to an event batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDispatchResponse {
    /// Selection after the batch.
    pub selection: Selection,
    /// Which view models changed and should be refetched.
    pub rebuilt: Rebuilt,
}

/// Error body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity_crossfilter::SelectionRange;

    fn parse(json: &str) -> Vec<ApiEvent> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_mixed_batch() {
        let events = parse(
            r#"[
                {"type": "amenityChanged", "amenity": "school"},
                {"type": "rangeBrushed", "source": {"chart": "ecdf", "amenity": "school"}, "range": [0.5, 1.2]}
            ]"#,
        );
        let stimuli: Vec<Stimulus> = events
            .into_iter()
            .map(|e| e.into_stimulus().unwrap())
            .collect();

        assert_eq!(stimuli[0], Stimulus::AmenityChanged(AmenityCategory::School));
        assert_eq!(
            stimuli[1],
            Stimulus::range_brushed(
                BrushSource::distribution(AmenityCategory::School),
                Some((0.5, 1.2))
            )
            .unwrap()
        );
    }

    #[test]
    fn missing_range_clears_brush() {
        let events = parse(
            r#"[{"type": "rangeBrushed", "source": {"chart": "ecdf", "amenity": "hospital"}}]"#,
        );
        let Stimulus::RangeBrushed { range, .. } =
            events.into_iter().next().unwrap().into_stimulus().unwrap()
        else {
            panic!("expected a brush");
        };
        assert_eq!(range, SelectionRange::Unbounded);
    }

    #[test]
    fn unknown_chart_maps_to_other() {
        let events = parse(
            r#"[{"type": "rangeBrushed", "source": {"chart": "legend", "amenity": "hospital"}, "range": [0, 1]}]"#,
        );
        let Stimulus::RangeBrushed { source, .. } =
            events.into_iter().next().unwrap().into_stimulus().unwrap()
        else {
            panic!("expected a brush");
        };
        assert_eq!(source.chart, ChartKind::Other);
    }

    #[test]
    fn invalid_values_surface_as_crossfilter_errors() {
        let events = parse(
            r#"[
                {"type": "amenityChanged", "amenity": "museum"},
                {"type": "rangeBrushed", "source": {"chart": "ecdf", "amenity": "school"}, "range": [3, 1]}
            ]"#,
        );
        let errors: Vec<CrossfilterError> = events
            .into_iter()
            .map(|e| e.into_stimulus().unwrap_err())
            .collect();
        assert_eq!(
            errors[0],
            CrossfilterError::InvalidCategory("museum".to_string())
        );
        assert_eq!(errors[1], CrossfilterError::InvalidRange { lo: 3.0, hi: 1.0 });
    }

    #[test]
    fn amenity_entry_uses_display_metadata() {
        let entry = ApiAmenity::from(AmenityCategory::Supermarket);
        assert_eq!(entry.label, "SUPERMARKETS");
        assert_eq!(entry.name, "Supermarkets");
        assert_eq!(entry.color, "#E4AE36");
    }
}
