//! Maps a brushed distance range to the blocks it selects.

use std::collections::BTreeSet;

use proximity_amenity_models::AmenityCategory;
use proximity_dataset::DatasetStore;

use crate::{CrossfilterError, DataIntegrityError, SelectionRange};

/// Returns the GEOIDs of blocks whose `category` distance lies in `range`.
///
/// An unbounded range selects every block. Bounds are inclusive. An empty
/// store yields an empty set.
///
/// # Errors
///
/// Returns [`CrossfilterError::DataIntegrity`] if any block lacks a
/// distance for `category`.
pub fn filter_blocks(
    category: AmenityCategory,
    range: SelectionRange,
    store: &DatasetStore,
) -> Result<BTreeSet<String>, CrossfilterError> {
    let mut selected = BTreeSet::new();

    for block in store.blocks() {
        let km = block
            .distance(category)
            .ok_or_else(|| DataIntegrityError::MissingDistance {
                geoid: block.geoid.clone(),
                category,
            })?;

        if range.contains(km) {
            selected.insert(block.geoid.clone());
        }
    }

    log::trace!(
        "filter_blocks: {category} {range:?} selected {}/{} blocks",
        selected.len(),
        store.block_count()
    );

    Ok(selected)
}
