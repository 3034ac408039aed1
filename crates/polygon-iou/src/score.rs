// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Exact IoU for matched pairs.

use crate::{MatchOptions, Result, assignment::Assignment, geometry::Region};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome for a single ground truth.
///
/// Rows are produced in ground-truth input order, so row `i` always describes
/// the `i`-th ground-truth region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub truth_id: usize,
    /// Matched prediction, `None` when the ground truth went unmatched.
    pub prediction_id: Option<usize>,
    /// Intersection over union in `[0, 1]`; zero when unmatched.
    #[serde(rename = "IoU")]
    pub iou: f64,
}

impl ResultRow {
    pub fn is_matched(&self) -> bool {
        self.prediction_id.is_some()
    }
}

/// Intersection over union of two regions.
///
/// Two degenerate regions have a union of zero area; their IoU is defined as
/// zero instead of dividing by zero.
pub fn iou<R: Region>(prediction: &R, truth: &R) -> Result<f64> {
    let intersection = prediction.intersection_area(truth)?;
    let union = prediction.union_area(truth)?;
    if union == 0.0 {
        return Ok(0.0);
    }
    Ok((intersection / union).clamp(0.0, 1.0))
}

fn score_row<R: Region>(
    truth_id: usize,
    truth: &R,
    assignment: &Assignment,
    predictions: &[R],
) -> Result<ResultRow> {
    match assignment.prediction_for(truth_id) {
        Some(prediction_id) => Ok(ResultRow {
            truth_id,
            prediction_id: Some(prediction_id),
            iou: iou(&predictions[prediction_id], truth)?,
        }),
        None => Ok(ResultRow {
            truth_id,
            prediction_id: None,
            iou: 0.0,
        }),
    }
}

/// Score every ground truth against its assigned prediction.
#[cfg_attr(
    feature = "profiling",
    tracing::instrument(skip_all, fields(matched = assignment.len()))
)]
pub fn score<R: Region>(
    assignment: &Assignment,
    predictions: &[R],
    ground_truths: &[R],
    options: &MatchOptions,
) -> Result<Vec<ResultRow>> {
    if options.parallel {
        ground_truths
            .par_iter()
            .enumerate()
            .map(|(truth_id, truth)| score_row(truth_id, truth, assignment, predictions))
            .collect()
    } else {
        ground_truths
            .iter()
            .enumerate()
            .map(|(truth_id, truth)| score_row(truth_id, truth, assignment, predictions))
            .collect()
    }
}
