#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Amenity category taxonomy and display metadata.
//!
//! Defines the closed set of urban amenities the proximity dashboard
//! measures distances to, along with the fixed display name and marker
//! color for each, and the palette used to shade blocks by distance.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// An urban amenity whose nearest instance each residential block is
/// measured against.
///
/// The variant order is the order shown to users; the first variant is the
/// default selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AmenityCategory {
    /// Hospitals
    Hospital,
    /// Supermarkets
    Supermarket,
    /// Schools
    School,
    /// Public libraries
    Library,
}

impl AmenityCategory {
    /// Returns all variants of this enum, in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Hospital, Self::Supermarket, Self::School, Self::Library]
    }

    /// The category selected before the user has picked one.
    #[must_use]
    pub const fn first() -> Self {
        Self::Hospital
    }

    /// Plural display name, used as the map legend label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Hospital => "Hospitals",
            Self::Supermarket => "Supermarkets",
            Self::School => "Schools",
            Self::Library => "Libraries",
        }
    }

    /// Label shown in the amenity dropdown.
    #[must_use]
    pub fn dropdown_label(self) -> String {
        self.display_name().to_uppercase()
    }

    /// Hex color for destination markers and the distribution curve.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Hospital => "#EA5138",
            Self::Supermarket => "#E4AE36",
            Self::School => "#1F386B",
            Self::Library => "#507332",
        }
    }
}

/// A single stop of a continuous color scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStop {
    /// Position on the normalized scale, `0.0..=1.0`.
    pub position: f64,
    /// CSS color at this position.
    pub color: &'static str,
}

/// Sequential palette for shading blocks by distance, light (near) to dark
/// (far).
pub const DISTANCE_PALETTE: [ColorStop; 11] = [
    ColorStop { position: 0.0, color: "rgb(253, 253, 204)" },
    ColorStop { position: 0.1, color: "rgb(201, 235, 177)" },
    ColorStop { position: 0.2, color: "rgb(145, 216, 163)" },
    ColorStop { position: 0.3, color: "rgb(102, 194, 163)" },
    ColorStop { position: 0.4, color: "rgb(81, 168, 162)" },
    ColorStop { position: 0.5, color: "rgb(72, 141, 157)" },
    ColorStop { position: 0.6, color: "rgb(64, 117, 152)" },
    ColorStop { position: 0.7, color: "rgb(61, 90, 146)" },
    ColorStop { position: 0.8, color: "rgb(65, 64, 123)" },
    ColorStop { position: 0.9, color: "rgb(55, 44, 80)" },
    ColorStop { position: 1.0, color: "rgb(39, 26, 44)" },
];

/// Distances (km) mapped to the ends of [`DISTANCE_PALETTE`]. Values beyond
/// the upper bound saturate.
pub const DISTANCE_COLOR_RANGE_KM: (f64, f64) = (0.0, 5.0);

/// Initial map camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewport {
    /// Center latitude.
    pub center_lat: f64,
    /// Center longitude.
    pub center_lon: f64,
    /// Web-mercator zoom level.
    pub zoom: f64,
}

/// Baltimore, MD.
pub const DEFAULT_VIEWPORT: MapViewport = MapViewport {
    center_lat: 39.292_126,
    center_lon: -76.613_632,
    zoom: 10.5,
};
