// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! R-tree over ground-truth bounding boxes.

use crate::geometry::{Bounds, Region};
use itertools::Itertools;
use rstar::{
    AABB, RTree,
    primitives::{GeomWithData, Rectangle},
};

type IndexedBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Read-only spatial index mapping bounding boxes to region ids.
///
/// Ids are the positions of the regions in the slice passed to
/// [`SpatialIndex::build`]. Regions without bounds are skipped.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<IndexedBox>,
}

impl SpatialIndex {
    /// Bulk-load the bounding boxes of `regions`.
    pub fn build<R: Region>(regions: &[R]) -> Self {
        let boxes = regions
            .iter()
            .enumerate()
            .filter_map(|(id, region)| {
                let bounds = region.bounds()?;
                let rect = Rectangle::from_corners(
                    [bounds.min_x, bounds.min_y],
                    [bounds.max_x, bounds.max_y],
                );
                Some(GeomWithData::new(rect, id))
            })
            .collect::<Vec<_>>();

        if boxes.len() < regions.len() {
            log::debug!(
                "Skipped {} regions without bounds while building spatial index",
                regions.len() - boxes.len()
            );
        }

        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Ids whose bounding box intersects (or touches) `bounds`, ascending.
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let envelope =
            AABB::from_corners([bounds.min_x, bounds.min_y], [bounds.max_x, bounds.max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Number of indexed boxes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
