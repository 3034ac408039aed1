// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # Polygon IoU Matching
//!
//! Matches predicted polygons to ground-truth polygons and reports the
//! Intersection over Union (IoU) of every matched pair. Matching is one-to-one
//! and globally optimal: the pairing maximizes total overlap area rather than
//! greedily taking the best prediction for each ground truth.
//!
//! ## Pipeline
//!
//! 1. **Spatial index**: ground-truth bounding boxes are bulk-loaded into an
//!    R-tree ([`SpatialIndex`]).
//! 2. **Overlap discovery**: each prediction queries the index and only the
//!    candidates are intersected exactly ([`find_overlaps`]), producing a
//!    dense [`OverlapMatrix`].
//! 3. **Assignment**: the Hungarian algorithm picks the pairing with the
//!    largest total overlap ([`solve`]).
//! 4. **Scoring**: exact IoU is computed for matched pairs only ([`score`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use geo::Rect;
//! use polygon_iou::compute_iou;
//!
//! # fn main() -> Result<(), polygon_iou::Error> {
//! let truths = vec![Rect::new((0.0, 0.0), (2.0, 2.0)).to_polygon()];
//! let predictions = vec![Rect::new((1.0, 1.0), (3.0, 3.0)).to_polygon()];
//!
//! let rows = compute_iou(&truths, &predictions)?;
//! assert_eq!(rows[0].prediction_id, Some(0));
//! assert!((rows[0].iou - 1.0 / 7.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional Features
//!
//! - `polars`: [`results_dataframe`] turns result rows into a Polars
//!   DataFrame.
//! - `profiling`: tracing spans around each pipeline stage.

mod assignment;
mod error;
mod geometry;
mod index;
mod overlap;
mod pipeline;
mod score;

#[cfg(feature = "polars")]
mod frame;

pub mod instrument;

pub use crate::{
    assignment::{Assignment, solve},
    error::{Error, Result},
    geometry::{Bounds, Region, polygon_from_rings},
    index::SpatialIndex,
    overlap::{OverlapEntry, OverlapMatrix, find_overlaps, overlap_matrix},
    pipeline::{Evaluation, MatchOptions, compute_iou, compute_iou_with, evaluate},
    score::{ResultRow, iou, score},
};

#[cfg(feature = "polars")]
pub use crate::frame::results_dataframe;

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, Polygon, Rect, polygon};

    #[ctor::ctor]
    fn init() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        Rect::new((x, y), (x + size, y + size)).to_polygon()
    }

    #[test]
    fn test_single_pair_iou() -> Result<(), Error> {
        let truths = vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ]];
        let predictions = vec![polygon![
            (x: 1.0, y: 1.0),
            (x: 3.0, y: 1.0),
            (x: 3.0, y: 3.0),
            (x: 1.0, y: 3.0),
        ]];

        let rows = compute_iou(&truths, &predictions)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].truth_id, 0);
        assert_eq!(rows[0].prediction_id, Some(0));
        assert!((rows[0].iou - 1.0 / 7.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_distant_truth_is_unmatched() -> Result<(), Error> {
        let truths = vec![square(0.0, 0.0, 2.0), square(100.0, 100.0, 2.0)];
        let predictions = vec![square(0.5, 0.5, 2.0)];

        let rows = compute_iou(&truths, &predictions)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].prediction_id, Some(0));
        assert!(rows[0].iou > 0.0);
        assert_eq!(rows[1].prediction_id, None);
        assert_eq!(rows[1].iou, 0.0);
        Ok(())
    }

    #[test]
    fn test_optimal_assignment_beats_greedy() -> Result<(), Error> {
        // Truth 0 and truth 1 are unit-height strips; the predictions are cut
        // so that A covers 0.9 of truth 0 and 0.85 of truth 1, while B covers
        // 0.95 of truth 1 only.
        let truths = vec![
            Rect::new((0.0, 0.0), (1.0, 1.0)).to_polygon(),
            Rect::new((0.0, 2.0), (1.0, 3.0)).to_polygon(),
        ];
        let a = MultiPolygon::new(vec![
            Rect::new((0.0, 0.0), (0.9, 1.0)).to_polygon(),
            Rect::new((0.0, 2.0), (0.85, 3.0)).to_polygon(),
        ]);
        let b = MultiPolygon::new(vec![Rect::new((0.05, 2.0), (1.0, 3.0)).to_polygon()]);
        let truths: Vec<MultiPolygon<f64>> =
            truths.into_iter().map(|t| MultiPolygon::new(vec![t])).collect();
        let predictions = vec![a, b];

        let evaluation = evaluate(&truths, &predictions, &MatchOptions::default())?;
        assert!((evaluation.overlaps[(0, 0)] - 0.9).abs() < 1e-9);
        assert!((evaluation.overlaps[(1, 0)] - 0.85).abs() < 1e-9);
        assert!((evaluation.overlaps[(1, 1)] - 0.95).abs() < 1e-9);
        assert_eq!(evaluation.overlaps[(0, 1)], 0.0);

        assert_eq!(evaluation.rows[0].prediction_id, Some(0));
        assert_eq!(evaluation.rows[1].prediction_id, Some(1));
        assert!((evaluation.total_overlap() - 1.85).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_empty_inputs() -> Result<(), Error> {
        let none: Vec<Polygon<f64>> = vec![];
        let truths = vec![square(0.0, 0.0, 1.0), square(3.0, 3.0, 1.0)];

        assert!(compute_iou(&none, &truths)?.is_empty());
        assert!(compute_iou(&none, &none)?.is_empty());

        let rows = compute_iou(&truths, &none)?;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.prediction_id.is_none() && row.iou == 0.0));
        Ok(())
    }

    #[test]
    fn test_degenerate_geometries_do_not_fail() -> Result<(), Error> {
        let line = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        let truths = vec![line.clone(), square(0.0, 0.0, 1.0)];
        let predictions = vec![line, square(0.0, 0.0, 1.0)];

        let rows = compute_iou(&truths, &predictions)?;
        assert_eq!(rows[0].iou, 0.0);
        assert_eq!(rows[1].prediction_id, Some(1));
        assert!((rows[1].iou - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_invalid_geometry_propagates() {
        let truths = vec![square(0.0, 0.0, 1.0)];
        let predictions = vec![polygon![
            (x: 0.0, y: 0.0),
            (x: f64::INFINITY, y: 0.0),
            (x: 1.0, y: 1.0),
        ]];
        let result = compute_iou(&truths, &predictions);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));

        // An invalid ground truth fails even when no prediction is near it.
        let truths = vec![polygon![
            (x: 500.0, y: 500.0),
            (x: f64::NAN, y: 500.0),
            (x: 501.0, y: 501.0),
        ]];
        let predictions = vec![square(0.0, 0.0, 1.0)];
        let result = compute_iou(&truths, &predictions);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_sequential_matches_parallel() -> Result<(), Error> {
        let truths: Vec<_> = (0..30)
            .map(|i| square((i % 6) as f64 * 3.0, (i / 6) as f64 * 3.0, 2.0))
            .collect();
        let predictions: Vec<_> = (0..30)
            .map(|i| square((i % 6) as f64 * 3.0 + 0.4, (i / 6) as f64 * 3.0 - 0.3, 2.1))
            .collect();

        let parallel = compute_iou(&truths, &predictions)?;
        let sequential =
            compute_iou_with(&truths, &predictions, &MatchOptions::default().with_parallel(false))?;
        assert_eq!(parallel, sequential);
        assert!(parallel.iter().all(|row| row.prediction_id == Some(row.truth_id)));
        Ok(())
    }
}
