// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! End-to-end matching: index → overlaps → assignment → IoU.

use crate::{
    Result,
    assignment::{Assignment, solve},
    geometry::{Region, validate_all},
    index::SpatialIndex,
    overlap::{OverlapMatrix, find_overlaps},
    score::{ResultRow, score},
};
use std::fmt;

/// Options controlling how a matching run executes.
///
/// None of the options change the result; they only affect how the work is
/// scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// Run overlap discovery and scoring on the rayon thread pool.
    pub parallel: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl MatchOptions {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Full outcome of a matching run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// One row per ground truth, in ground-truth input order.
    pub rows: Vec<ResultRow>,
    /// Dense overlap areas used for the assignment.
    pub overlaps: OverlapMatrix,
    /// The optimal assignment that produced `rows`.
    pub assignment: Assignment,
}

impl Evaluation {
    pub fn ground_truth_count(&self) -> usize {
        self.overlaps.rows()
    }

    pub fn prediction_count(&self) -> usize {
        self.overlaps.columns()
    }

    pub fn matched(&self) -> usize {
        self.rows.iter().filter(|row| row.is_matched()).count()
    }

    pub fn unmatched(&self) -> usize {
        self.rows.len() - self.matched()
    }

    /// Sum of overlap areas over matched pairs.
    pub fn total_overlap(&self) -> f64 {
        self.assignment.total_overlap(&self.overlaps)
    }

    /// Mean IoU over matched rows, zero when nothing matched.
    pub fn mean_matched_iou(&self) -> f64 {
        let matched = self.matched();
        if matched == 0 {
            return 0.0;
        }
        self.rows
            .iter()
            .filter(|row| row.is_matched())
            .map(|row| row.iou)
            .sum::<f64>()
            / matched as f64
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ground truths:     {}", self.ground_truth_count())?;
        writeln!(f, "Predictions:       {}", self.prediction_count())?;
        writeln!(f, "Overlapping pairs: {}", self.overlaps.nonzero())?;
        writeln!(f, "Matched:           {}", self.matched())?;
        writeln!(f, "Unmatched:         {}", self.unmatched())?;
        writeln!(f, "Total overlap:     {:.6}", self.total_overlap())?;
        write!(f, "Mean IoU:          {:.6}", self.mean_matched_iou())
    }
}

/// Run the full pipeline and keep the intermediate overlap matrix and
/// assignment alongside the result rows.
///
/// Ids are positions in the input slices. Geometry errors from either set
/// abort the run.
#[cfg_attr(
    feature = "profiling",
    tracing::instrument(skip_all, fields(ground_truths = ground_truths.len(), predictions = predictions.len()))
)]
pub fn evaluate<R: Region>(
    ground_truths: &[R],
    predictions: &[R],
    options: &MatchOptions,
) -> Result<Evaluation> {
    validate_all(ground_truths)?;

    let index = SpatialIndex::build(ground_truths);
    log::debug!("Indexed {} ground-truth boxes", index.len());

    let entries = find_overlaps(predictions, ground_truths, &index, options)?;
    let overlaps = OverlapMatrix::from_entries(ground_truths.len(), predictions.len(), entries)?;
    let assignment = solve(&overlaps)?;
    let rows = score(&assignment, predictions, ground_truths, options)?;

    Ok(Evaluation {
        rows,
        overlaps,
        assignment,
    })
}

/// Match `predictions` to `ground_truths` and return one IoU row per ground
/// truth.
pub fn compute_iou<R: Region>(ground_truths: &[R], predictions: &[R]) -> Result<Vec<ResultRow>> {
    compute_iou_with(ground_truths, predictions, &MatchOptions::default())
}

/// [`compute_iou`] with explicit options.
pub fn compute_iou_with<R: Region>(
    ground_truths: &[R],
    predictions: &[R],
    options: &MatchOptions,
) -> Result<Vec<ResultRow>> {
    Ok(evaluate(ground_truths, predictions, options)?.rows)
}
