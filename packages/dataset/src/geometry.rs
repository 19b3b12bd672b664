//! Converts block outlines back to `GeoJSON` for the choropleth renderer.

use geojson::{Feature, FeatureCollection, JsonObject, feature::Id};
use proximity_dataset_models::BlockGeometry;

use crate::loader::GEOID_COLUMN;

/// Builds a `FeatureCollection` whose feature ids are the block GEOIDs, so
/// the renderer can join it against per-block distances.
#[must_use]
pub fn to_feature_collection(outlines: &[BlockGeometry]) -> FeatureCollection {
    let features = outlines
        .iter()
        .map(|outline| {
            let mut properties = JsonObject::new();
            properties.insert(
                GEOID_COLUMN.to_string(),
                serde_json::Value::String(outline.geoid.clone()),
            );

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &outline.polygon,
                ))),
                id: Some(Id::String(outline.geoid.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_block_geometry;

    #[test]
    fn feature_collection_reloads_with_same_ids() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"geoid10": "245100101001000"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
                }
            ]
        }"#;
        let outlines = read_block_geometry(geojson).unwrap();
        let collection = to_feature_collection(&outlines);

        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].id,
            Some(Id::String("245100101001000".to_string()))
        );

        let reloaded = read_block_geometry(&serde_json::to_string(&collection).unwrap()).unwrap();
        assert_eq!(reloaded, outlines);
    }
}
