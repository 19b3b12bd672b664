//! The interaction controller: sole owner of the [`Selection`].
//!
//! The UI reports two kinds of events, an amenity pick and a brush on a
//! chart. The controller applies one at a time, decides whether it actually
//! changes anything, and rebuilds only the view models that depend on what
//! changed. A rebuild that fails leaves the previous selection and view
//! models in place.

use std::sync::Arc;

use proximity_amenity_models::AmenityCategory;
use proximity_dataset::DatasetStore;
use serde::Serialize;

use crate::{
    CrossfilterError, DistributionViewModel, MapViewModel, Selection, SelectionRange,
    build_distribution, build_map, filter_blocks, parse_category,
};

/// Which chart a brush was drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    /// The ECDF chart.
    Distribution,
    /// The choropleth map.
    Map,
    /// Any other widget.
    Other,
}

/// Where a brush event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushSource {
    /// Chart the brush was drawn on.
    pub chart: ChartKind,
    /// Amenity that chart was showing when the brush was drawn.
    pub category: AmenityCategory,
}

impl BrushSource {
    /// A brush on the ECDF chart for `category`.
    #[must_use]
    pub const fn distribution(category: AmenityCategory) -> Self {
        Self {
            chart: ChartKind::Distribution,
            category,
        }
    }
}

/// A UI event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stimulus {
    /// The amenity dropdown changed.
    AmenityChanged(AmenityCategory),
    /// A range was brushed (or cleared) on a chart.
    RangeBrushed {
        /// Where the brush came from.
        source: BrushSource,
        /// The brushed range.
        range: SelectionRange,
    },
}

impl Stimulus {
    /// Builds an [`Stimulus::AmenityChanged`] from an amenity name.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::InvalidCategory`] for unknown names.
    pub fn amenity_changed(name: &str) -> Result<Self, CrossfilterError> {
        Ok(Self::AmenityChanged(parse_category(name)?))
    }

    /// Builds a [`Stimulus::RangeBrushed`] from raw brush bounds; `None`
    /// means the brush was cleared.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::InvalidRange`] if the bounds are invalid.
    pub fn range_brushed(
        source: BrushSource,
        bounds: Option<(f64, f64)>,
    ) -> Result<Self, CrossfilterError> {
        Ok(Self::RangeBrushed {
            source,
            range: SelectionRange::from_bounds(bounds)?,
        })
    }
}

/// Which view models an event rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rebuilt {
    /// The map view model was rebuilt.
    pub map: bool,
    /// The distribution view model was rebuilt.
    pub distribution: bool,
}

impl Rebuilt {
    /// Nothing changed.
    pub const NONE: Self = Self {
        map: false,
        distribution: false,
    };

    /// Whether anything was rebuilt.
    #[must_use]
    pub const fn any(self) -> bool {
        self.map || self.distribution
    }

    const fn merge(self, other: Self) -> Self {
        Self {
            map: self.map || other.map,
            distribution: self.distribution || other.distribution,
        }
    }
}

/// Owns the selection and the current view models.
#[derive(Debug, Clone)]
pub struct InteractionController {
    store: Arc<DatasetStore>,
    selection: Selection,
    map: MapViewModel,
    distribution: DistributionViewModel,
}

impl InteractionController {
    /// Starts with the first amenity selected and no brush.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::DataIntegrity`] if the dataset cannot
    /// produce the initial view models.
    pub fn new(store: Arc<DatasetStore>) -> Result<Self, CrossfilterError> {
        let selection = Selection::default();
        let map = derive_map(selection, &store)?;
        let distribution = build_distribution(selection.category, &store)?;

        Ok(Self {
            store,
            selection,
            map,
            distribution,
        })
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Current map view model.
    #[must_use]
    pub const fn map(&self) -> &MapViewModel {
        &self.map
    }

    /// Current distribution view model.
    #[must_use]
    pub const fn distribution(&self) -> &DistributionViewModel {
        &self.distribution
    }

    /// The dataset this controller reads from.
    #[must_use]
    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::DataIntegrity`] if a rebuild fails; the
    /// previous state is kept.
    pub fn dispatch(&mut self, stimulus: Stimulus) -> Result<Rebuilt, CrossfilterError> {
        match stimulus {
            Stimulus::AmenityChanged(category) => self.on_amenity_changed(category),
            Stimulus::RangeBrushed { source, range } => self.on_range_brushed(source, range),
        }
    }

    /// Applies a batch of events in order, skipping those that change
    /// nothing.
    ///
    /// Stops at the first error; events before it stay applied.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn dispatch_batch(&mut self, stimuli: &[Stimulus]) -> Result<Rebuilt, CrossfilterError> {
        stimuli.iter().try_fold(Rebuilt::NONE, |acc, stimulus| {
            Ok(acc.merge(self.dispatch(*stimulus)?))
        })
    }

    /// Switches amenity and clears the brush, since a range on one
    /// amenity's distances means nothing on another's.
    ///
    /// Naming the amenity that is already selected is a stale value, not a
    /// change, and leaves the brush alone.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::DataIntegrity`] if a rebuild fails; the
    /// previous state is kept.
    pub fn on_amenity_changed(
        &mut self,
        category: AmenityCategory,
    ) -> Result<Rebuilt, CrossfilterError> {
        if category == self.selection.category {
            log::trace!("Ignoring unchanged amenity {category}");
            return Ok(Rebuilt::NONE);
        }

        let next = Selection {
            category,
            range: SelectionRange::Unbounded,
        };
        let map = self.logged(derive_map(next, &self.store))?;
        let distribution = self.logged(build_distribution(category, &self.store))?;

        log::debug!(
            "Amenity {} -> {category}, range cleared",
            self.selection.category
        );
        self.selection = next;
        self.map = map;
        self.distribution = distribution;

        Ok(Rebuilt {
            map: true,
            distribution: true,
        })
    }

    /// Sets the brushed range if the brush came from the ECDF chart of the
    /// current amenity; brushes from anywhere else are ignored. Only the map
    /// is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`CrossfilterError::DataIntegrity`] if the rebuild fails; the
    /// previous state is kept.
    pub fn on_range_brushed(
        &mut self,
        source: BrushSource,
        range: SelectionRange,
    ) -> Result<Rebuilt, CrossfilterError> {
        if source != BrushSource::distribution(self.selection.category) {
            log::trace!("Ignoring brush from {source:?}");
            return Ok(Rebuilt::NONE);
        }

        if range == self.selection.range {
            log::trace!("Ignoring unchanged range {range:?}");
            return Ok(Rebuilt::NONE);
        }

        let next = Selection {
            category: self.selection.category,
            range,
        };
        let map = self.logged(derive_map(next, &self.store))?;

        log::debug!("Range for {} -> {range:?}", next.category);
        self.selection = next;
        self.map = map;

        Ok(Rebuilt {
            map: true,
            distribution: false,
        })
    }

    fn logged<T>(&self, result: Result<T, CrossfilterError>) -> Result<T, CrossfilterError> {
        result.inspect_err(|e| {
            log::error!("Rebuild failed, keeping {:?}: {e}", self.selection);
        })
    }
}

fn derive_map(
    selection: Selection,
    store: &DatasetStore,
) -> Result<MapViewModel, CrossfilterError> {
    let selected = filter_blocks(selection.category, selection.range, store)?;
    build_map(selection.category, selected, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DistanceInterval;
    use crate::test_support::store;
    use proximity_dataset_models::{BlockRecord, DistributionSample};

    fn controller() -> InteractionController {
        InteractionController::new(Arc::new(store())).unwrap()
    }

    fn bounded(lo: f64, hi: f64) -> SelectionRange {
        SelectionRange::Bounded(DistanceInterval::new(lo, hi).unwrap())
    }

    fn brush(category: AmenityCategory, lo: f64, hi: f64) -> Stimulus {
        Stimulus::RangeBrushed {
            source: BrushSource::distribution(category),
            range: bounded(lo, hi),
        }
    }

    #[test]
    fn starts_on_first_amenity_unbounded() {
        let controller = controller();
        assert_eq!(controller.selection(), Selection::default());
        assert_eq!(controller.map().highlighted, controller.store().geoids());
        assert_eq!(controller.distribution().category, AmenityCategory::Hospital);
    }

    #[test]
    fn brushing_highlights_matching_blocks() {
        let mut controller = controller();
        let rebuilt = controller
            .dispatch(brush(AmenityCategory::Hospital, 0.5, 1.2))
            .unwrap();

        assert_eq!(
            rebuilt,
            Rebuilt {
                map: true,
                distribution: false
            }
        );
        let highlighted: Vec<&str> = controller
            .map()
            .highlighted
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(highlighted, vec!["A", "C"]);
        assert_eq!(controller.map().per_block_distance.len(), 3);
    }

    #[test]
    fn amenity_change_resets_range() {
        let mut controller = controller();
        controller
            .dispatch(brush(AmenityCategory::Hospital, 0.5, 1.2))
            .unwrap();

        let rebuilt = controller
            .dispatch(Stimulus::AmenityChanged(AmenityCategory::School))
            .unwrap();

        assert_eq!(
            rebuilt,
            Rebuilt {
                map: true,
                distribution: true
            }
        );
        assert_eq!(controller.selection().category, AmenityCategory::School);
        assert!(controller.selection().range.is_unbounded());
        assert_eq!(controller.map().highlighted, controller.store().geoids());
        assert_eq!(controller.distribution().category, AmenityCategory::School);
    }

    #[test]
    fn stale_amenity_in_batch_keeps_new_brush() {
        let mut controller = controller();
        let batch = [
            brush(AmenityCategory::Hospital, 0.5, 1.2),
            Stimulus::AmenityChanged(AmenityCategory::Hospital),
        ];
        let rebuilt = controller.dispatch_batch(&batch).unwrap();

        assert_eq!(
            rebuilt,
            Rebuilt {
                map: true,
                distribution: false
            }
        );
        assert_eq!(controller.selection().range, bounded(0.5, 1.2));
        let highlighted: Vec<&str> = controller
            .map()
            .highlighted
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(highlighted, vec!["A", "C"]);
    }

    #[test]
    fn unchanged_batch_rebuilds_nothing() {
        let mut controller = controller();
        controller
            .dispatch(brush(AmenityCategory::Hospital, 0.5, 1.2))
            .unwrap();

        let batch = [
            Stimulus::AmenityChanged(AmenityCategory::Hospital),
            brush(AmenityCategory::Hospital, 0.5, 1.2),
        ];
        let rebuilt = controller.dispatch_batch(&batch).unwrap();

        assert_eq!(rebuilt, Rebuilt::NONE);
        assert_eq!(controller.selection().range, bounded(0.5, 1.2));
    }

    #[test]
    fn brush_from_other_source_is_ignored() {
        let mut controller = controller();
        controller
            .dispatch(brush(AmenityCategory::Hospital, 0.5, 1.2))
            .unwrap();
        let before = controller.selection();

        let stale_chart = controller
            .dispatch(brush(AmenityCategory::School, 0.0, 10.0))
            .unwrap();
        let map_brush = controller
            .dispatch(Stimulus::RangeBrushed {
                source: BrushSource {
                    chart: ChartKind::Map,
                    category: AmenityCategory::Hospital,
                },
                range: SelectionRange::Unbounded,
            })
            .unwrap();

        assert_eq!(stale_chart, Rebuilt::NONE);
        assert_eq!(map_brush, Rebuilt::NONE);
        assert_eq!(controller.selection(), before);
    }

    #[test]
    fn distribution_ignores_range() {
        let mut controller = controller();
        let before = controller.distribution().clone();
        controller
            .dispatch(brush(AmenityCategory::Hospital, 1.0, 2.0))
            .unwrap();
        assert_eq!(controller.distribution(), &before);
        controller
            .dispatch(brush(AmenityCategory::Hospital, 0.0, 0.4))
            .unwrap();
        assert_eq!(controller.distribution(), &before);
    }

    #[test]
    fn clearing_brush_restores_full_highlight() {
        let mut controller = controller();
        controller
            .dispatch(brush(AmenityCategory::Hospital, 0.5, 1.2))
            .unwrap();
        let cleared = Stimulus::range_brushed(
            BrushSource::distribution(AmenityCategory::Hospital),
            None,
        )
        .unwrap();
        controller.dispatch(cleared).unwrap();

        assert!(controller.selection().range.is_unbounded());
        assert_eq!(controller.map().highlighted, controller.store().geoids());
    }

    #[test]
    fn batch_skips_unchanged_stimuli() {
        let mut controller = controller();
        let batch = [
            Stimulus::AmenityChanged(AmenityCategory::Hospital),
            brush(AmenityCategory::Hospital, 0.5, 1.2),
        ];
        let rebuilt = controller.dispatch_batch(&batch).unwrap();
        assert_eq!(
            rebuilt,
            Rebuilt {
                map: true,
                distribution: false
            }
        );

        let rebuilt = controller.dispatch_batch(&batch[1..]).unwrap();
        assert!(!rebuilt.any());
    }

    #[test]
    fn batch_applies_in_order() {
        let mut controller = controller();
        let batch = [
            Stimulus::AmenityChanged(AmenityCategory::School),
            brush(AmenityCategory::School, 0.5, 1.2),
        ];
        controller.dispatch_batch(&batch).unwrap();

        assert_eq!(controller.selection().category, AmenityCategory::School);
        assert_eq!(controller.selection().range, bounded(0.5, 1.2));
        let highlighted: Vec<&str> = controller
            .map()
            .highlighted
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(highlighted, vec!["B"]);
    }

    #[test]
    fn invalid_events_are_rejected_before_dispatch() {
        assert_eq!(
            Stimulus::amenity_changed("museum"),
            Err(CrossfilterError::InvalidCategory("museum".to_string()))
        );
        assert_eq!(
            Stimulus::range_brushed(
                BrushSource::distribution(AmenityCategory::Hospital),
                Some((2.0, 1.0))
            ),
            Err(CrossfilterError::InvalidRange { lo: 2.0, hi: 1.0 })
        );
    }

    #[test]
    fn failed_rebuild_keeps_previous_state() {
        let store = DatasetStore::new(
            vec![BlockRecord::new("A").with_distance(AmenityCategory::Hospital, 1.0)],
            Vec::new(),
            vec![DistributionSample {
                category: AmenityCategory::Hospital,
                distance: 1.0,
                percentile: 100.0,
            }],
            Vec::new(),
        );
        let mut controller = InteractionController::new(Arc::new(store)).unwrap();
        let before_map = controller.map().clone();

        let err = controller
            .dispatch(Stimulus::AmenityChanged(AmenityCategory::Library))
            .unwrap_err();

        assert!(!err.is_validation());
        assert_eq!(controller.selection(), Selection::default());
        assert_eq!(controller.map(), &before_map);
    }

    #[test]
    fn new_fails_without_samples() {
        let store = DatasetStore::new(
            vec![BlockRecord::new("A").with_distance(AmenityCategory::Hospital, 1.0)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert!(InteractionController::new(Arc::new(store)).is_err());
    }
}
