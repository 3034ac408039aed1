// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Optimal one-to-one assignment between ground truths and predictions.
//!
//! The solver maximizes total overlap area with the Kuhn-Munkres (Hungarian)
//! algorithm from `pathfinding`.

use crate::{Error, Result, overlap::OverlapMatrix};
use itertools::Itertools;
use pathfinding::{kuhn_munkres::kuhn_munkres, matrix::Matrix};

/// Partial injective mapping from truth id to prediction id.
///
/// Only pairs with a strictly positive overlap are kept: a zero-overlap pair
/// adds nothing to the objective, so the ground truth is reported unmatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    truth_to_prediction: Vec<Option<usize>>,
}

impl Assignment {
    /// Prediction matched to `truth_id`, if any.
    pub fn prediction_for(&self, truth_id: usize) -> Option<usize> {
        self.truth_to_prediction.get(truth_id).copied().flatten()
    }

    /// Matched `(truth_id, prediction_id)` pairs in truth order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.truth_to_prediction
            .iter()
            .enumerate()
            .filter_map(|(truth_id, prediction)| prediction.map(|p| (truth_id, p)))
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.truth_to_prediction.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the matrix entries selected by this assignment.
    pub fn total_overlap(&self, matrix: &OverlapMatrix) -> f64 {
        self.pairs()
            .filter_map(|(t, p)| matrix.get(t, p))
            .sum()
    }
}

/// Fixed-point resolution of the largest overlap in a matrix.
const WEIGHT_SCALE: f64 = 1e12;

/// Integer weight for `area`, relative to the largest area in the matrix.
fn weight(area: f64, max_area: f64) -> i64 {
    (area / max_area * WEIGHT_SCALE).round() as i64
}

/// Find the assignment maximizing total overlap.
///
/// Areas are scaled to `i64` weights relative to the largest entry and handed
/// to Kuhn-Munkres, which needs no more rows than columns, so a matrix with
/// more ground truths than predictions is solved transposed. When several
/// assignments reach the optimum any one of them may be returned. A matrix
/// without rows, columns or positive entries yields an empty assignment.
#[cfg_attr(
    feature = "profiling",
    tracing::instrument(skip_all, fields(rows = matrix.rows(), columns = matrix.columns()))
)]
pub fn solve(matrix: &OverlapMatrix) -> Result<Assignment> {
    let truths = matrix.rows();
    let predictions = matrix.columns();
    let mut truth_to_prediction = vec![None; truths];

    let max_area = matrix.max_area();
    if matrix.is_empty() || max_area <= 0.0 {
        return Ok(Assignment {
            truth_to_prediction,
        });
    }

    let transposed = truths > predictions;
    let (rows, columns) = if transposed {
        (predictions, truths)
    } else {
        (truths, predictions)
    };
    let weights = (0..rows)
        .cartesian_product(0..columns)
        .map(|(row, column)| {
            let area = if transposed {
                matrix[(column, row)]
            } else {
                matrix[(row, column)]
            };
            weight(area, max_area)
        })
        .collect::<Vec<_>>();
    let weights = Matrix::from_vec(rows, columns, weights)
        .map_err(|err| Error::InvalidMatrix(format!("{:?}", err)))?;
    let (_, column_for) = kuhn_munkres(&weights);

    for (row, column) in column_for.into_iter().enumerate() {
        let (truth_id, prediction_id) = if transposed {
            (column, row)
        } else {
            (row, column)
        };
        if matrix[(truth_id, prediction_id)] > 0.0 {
            truth_to_prediction[truth_id] = Some(prediction_id);
        }
    }

    let assignment = Assignment {
        truth_to_prediction,
    };
    log::debug!(
        "Assigned {} of {} ground truths to {} predictions",
        assignment.len(),
        truths,
        predictions
    );
    Ok(assignment)
}
