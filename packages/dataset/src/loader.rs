//! Loads the proximity tables from CSV and `GeoJSON` files.
//!
//! The distance table stores meters; everything downstream works in
//! kilometers, so the conversion happens here once.

use std::io::Read;
use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use geojson::{GeoJson, feature::Id};
use proximity_amenity_models::AmenityCategory;
use proximity_dataset_models::{BlockGeometry, BlockRecord, DestinationPoint, DistributionSample};
use serde::Deserialize;

use crate::{DatasetStore, LoadError};

/// Column holding the block GEOID in the distance table and the feature
/// property holding it in the block outlines.
pub const GEOID_COLUMN: &str = "geoid10";

const METERS_PER_KM: f64 = 1000.0;

/// Locations of the four dataset files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Per-block distance-to-nearest table (meters).
    pub distances: PathBuf,
    /// Amenity locations.
    pub destinations: PathBuf,
    /// ECDF samples.
    pub ecdf: PathBuf,
    /// Block outlines (`GeoJSON` `FeatureCollection`).
    pub blocks: PathBuf,
}

impl DatasetPaths {
    /// Uses the standard file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            distances: dir.join("distance_to_nearest.csv"),
            destinations: dir.join("destinations.csv"),
            ecdf: dir.join("ecdf.csv"),
            blocks: dir.join("block.geojson"),
        }
    }
}

/// Loads all four tables into a [`DatasetStore`].
///
/// # Errors
///
/// Returns [`LoadError`] if any file cannot be read or holds invalid data.
pub fn load(paths: &DatasetPaths) -> Result<DatasetStore, LoadError> {
    let blocks = read_distances(open(&paths.distances)?)?;
    log::info!("Loaded {} block distance rows", blocks.len());

    let destinations = read_destinations(open(&paths.destinations)?)?;
    log::info!("Loaded {} amenity destinations", destinations.len());

    let samples = read_ecdf(open(&paths.ecdf)?)?;
    log::info!("Loaded {} ECDF samples", samples.len());

    let geojson_str = std::fs::read_to_string(&paths.blocks).map_err(|e| LoadError::Io {
        path: paths.blocks.display().to_string(),
        source: e,
    })?;
    let geometry = read_block_geometry(&geojson_str)?;
    log::info!("Loaded {} block outlines", geometry.len());

    let store = DatasetStore::new(blocks, destinations, samples, geometry);

    let report = store.consistency_report();
    if !report.is_consistent() {
        log::warn!(
            "Dataset inconsistencies: {} blocks without outline, {} outlines without block, {} duplicate blocks",
            report.missing_geometry.len(),
            report.orphan_geometry.len(),
            report.duplicate_blocks.len(),
        );
    }

    Ok(store)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parses the distance table.
///
/// The GEOID column is kept as text so leading zeros survive. One column per
/// amenity holds meters; an empty cell becomes a missing distance rather
/// than zero. A missing amenity column leaves that amenity missing on every
/// block.
///
/// # Errors
///
/// Returns [`LoadError`] if the CSV is malformed, the GEOID column is
/// absent, or a distance is unparseable, negative, or non-finite.
pub fn read_distances(reader: impl Read) -> Result<Vec<BlockRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let geoid_idx = headers
        .iter()
        .position(|h| h.trim() == GEOID_COLUMN)
        .ok_or_else(|| LoadError::Parse {
            table: "distance",
            message: format!("missing '{GEOID_COLUMN}' column"),
        })?;

    let mut columns = Vec::new();
    for category in AmenityCategory::all() {
        match headers.iter().position(|h| h.trim() == category.as_ref()) {
            Some(idx) => columns.push((*category, idx)),
            None => log::warn!("Distance table has no '{category}' column"),
        }
    }

    let mut blocks = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let geoid = record.get(geoid_idx).unwrap_or_default().trim();
        if geoid.is_empty() {
            log::trace!("  skipping distance row {row}: empty GEOID");
            continue;
        }

        let mut block = BlockRecord::new(geoid);
        for (category, idx) in &columns {
            let cell = record.get(*idx).unwrap_or_default().trim();
            if cell.is_empty() {
                continue;
            }
            let meters = parse_distance(cell).map_err(|message| LoadError::Parse {
                table: "distance",
                message: format!("block {geoid}, {category}: {message}"),
            })?;
            block.distances.insert(*category, meters / METERS_PER_KM);
        }
        blocks.push(block);
    }

    Ok(blocks)
}

fn parse_distance(cell: &str) -> Result<f64, String> {
    let value: f64 = cell
        .parse()
        .map_err(|e| format!("'{cell}' is not a number: {e}"))?;
    if !value.is_finite() {
        return Err(format!("'{cell}' is not finite"));
    }
    if value < 0.0 {
        return Err(format!("'{cell}' is negative"));
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
struct DestinationRow {
    dest_type: String,
    lat: f64,
    lon: f64,
}

/// Parses the amenity locations table. Extra columns are ignored.
///
/// # Errors
///
/// Returns [`LoadError`] if the CSV is malformed or a row names an unknown
/// amenity.
pub fn read_destinations(reader: impl Read) -> Result<Vec<DestinationPoint>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut points = Vec::new();
    for result in csv_reader.deserialize::<DestinationRow>() {
        let row = result?;
        let category = parse_category(&row.dest_type, "destinations")?;
        points.push(DestinationPoint {
            category,
            lat: row.lat,
            lon: row.lon,
        });
    }

    Ok(points)
}

#[derive(Debug, Deserialize)]
struct EcdfRow {
    amenity: String,
    distance: f64,
    perc: f64,
}

/// Parses the ECDF samples table, keeping file order.
///
/// # Errors
///
/// Returns [`LoadError`] if the CSV is malformed or a row names an unknown
/// amenity.
pub fn read_ecdf(reader: impl Read) -> Result<Vec<DistributionSample>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut samples: Vec<DistributionSample> = Vec::new();
    for result in csv_reader.deserialize::<EcdfRow>() {
        let row = result?;
        let category = parse_category(&row.amenity, "ecdf")?;

        if let Some(prev) = samples.iter().rev().find(|s| s.category == category)
            && row.distance < prev.distance
        {
            log::warn!(
                "ECDF samples for {category} are not ascending ({} after {})",
                row.distance,
                prev.distance
            );
        }

        samples.push(DistributionSample {
            category,
            distance: row.distance,
            percentile: row.perc,
        });
    }

    Ok(samples)
}

fn parse_category(value: &str, table: &'static str) -> Result<AmenityCategory, LoadError> {
    value
        .trim()
        .parse()
        .map_err(|_| LoadError::UnknownCategory {
            table,
            value: value.to_string(),
        })
}

/// Parses the block outlines from a `GeoJSON` `FeatureCollection`.
///
/// Each feature is keyed by its `id`, falling back to the `geoid10`
/// property. Features without a key or with non-polygonal geometry are
/// skipped.
///
/// # Errors
///
/// Returns [`LoadError`] if the text is not `GeoJSON` or is not a
/// `FeatureCollection`.
pub fn read_block_geometry(geojson_str: &str) -> Result<Vec<BlockGeometry>, LoadError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(LoadError::Parse {
            table: "block geometry",
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let mut outlines = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(geoid) = feature_geoid(&feature) else {
            log::warn!("Skipping block feature without an identifier");
            continue;
        };

        let Some(polygon) = feature.geometry.and_then(to_multipolygon) else {
            log::warn!("Skipping block {geoid}: missing or non-polygon geometry");
            continue;
        };

        outlines.push(BlockGeometry { geoid, polygon });
    }

    Ok(outlines)
}

fn feature_geoid(feature: &geojson::Feature) -> Option<String> {
    let geoid = match &feature.id {
        Some(Id::String(s)) => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => match feature.property(GEOID_COLUMN)? {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        },
    };
    if geoid.is_empty() { None } else { Some(geoid) }
}

/// Converts a `GeoJSON` geometry to a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geom: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
