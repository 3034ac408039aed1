// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Candidate overlap discovery.
//!
//! Each prediction queries the [`SpatialIndex`] with its bounding box and only
//! the returned ground truths are intersected exactly. The result is a sparse
//! list of [`OverlapEntry`] values which [`OverlapMatrix::from_entries`] turns
//! into the dense matrix consumed by the assignment solver.

use crate::{
    Error, MatchOptions, Result,
    geometry::{Region, validate_all},
    index::SpatialIndex,
};
use rayon::prelude::*;
use std::ops::Index;

/// Exact intersection area between one ground truth and one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapEntry {
    pub truth_id: usize,
    pub prediction_id: usize,
    pub area: f64,
}

/// Dense ground-truth × prediction matrix of overlap areas.
///
/// Rows are truth ids, columns are prediction ids. Every value is finite and
/// non-negative; pairs never reported by the spatial index hold `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapMatrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl OverlapMatrix {
    /// All-zero matrix.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Materialize sparse entries into a dense matrix, filling absent pairs
    /// with zero. A pair listed more than once keeps its last value.
    pub fn from_entries<I>(rows: usize, columns: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = OverlapEntry>,
    {
        let mut matrix = Self::zeros(rows, columns);
        for entry in entries {
            matrix.set(entry.truth_id, entry.prediction_id, entry.area)?;
        }
        Ok(matrix)
    }

    /// Build from row-major values, mainly useful for feeding the solver
    /// directly.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        let mut matrix = Self::zeros(rows.len(), columns);
        for (truth_id, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(Error::InvalidMatrix(format!(
                    "row {} has {} columns, expected {}",
                    truth_id,
                    row.len(),
                    columns
                )));
            }
            for (prediction_id, &area) in row.iter().enumerate() {
                matrix.set(truth_id, prediction_id, area)?;
            }
        }
        Ok(matrix)
    }

    fn set(&mut self, truth_id: usize, prediction_id: usize, area: f64) -> Result<()> {
        if truth_id >= self.rows || prediction_id >= self.columns {
            return Err(Error::InvalidMatrix(format!(
                "entry ({}, {}) outside {}x{} matrix",
                truth_id, prediction_id, self.rows, self.columns
            )));
        }
        if !area.is_finite() || area < 0.0 {
            return Err(Error::InvalidMatrix(format!(
                "entry ({}, {}) has invalid area {}",
                truth_id, prediction_id, area
            )));
        }
        self.data[truth_id * self.columns + prediction_id] = area;
        Ok(())
    }

    /// Number of ground truths.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of predictions.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }

    pub fn get(&self, truth_id: usize, prediction_id: usize) -> Option<f64> {
        if truth_id < self.rows && prediction_id < self.columns {
            Some(self.data[truth_id * self.columns + prediction_id])
        } else {
            None
        }
    }

    /// Overlaps of one ground truth against every prediction, or `None` when
    /// `truth_id` is out of range.
    pub fn row(&self, truth_id: usize) -> Option<&[f64]> {
        if truth_id < self.rows {
            Some(&self.data[truth_id * self.columns..(truth_id + 1) * self.columns])
        } else {
            None
        }
    }

    /// Number of strictly positive cells.
    pub fn nonzero(&self) -> usize {
        self.data.iter().filter(|&&area| area > 0.0).count()
    }

    /// Largest cell, `0.0` for an empty matrix.
    pub fn max_area(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}

impl Index<(usize, usize)> for OverlapMatrix {
    type Output = f64;

    fn index(&self, (truth_id, prediction_id): (usize, usize)) -> &f64 {
        assert!(
            truth_id < self.rows && prediction_id < self.columns,
            "index ({}, {}) outside {}x{} matrix",
            truth_id,
            prediction_id,
            self.rows,
            self.columns
        );
        &self.data[truth_id * self.columns + prediction_id]
    }
}

fn overlaps_for<R: Region>(
    prediction_id: usize,
    prediction: &R,
    ground_truths: &[R],
    index: &SpatialIndex,
) -> Result<Vec<OverlapEntry>> {
    prediction.validate()?;
    let Some(bounds) = prediction.bounds() else {
        return Ok(vec![]);
    };

    let mut entries = Vec::new();
    for truth_id in index.query(&bounds) {
        let area = prediction.intersection_area(&ground_truths[truth_id])?;
        if area > 0.0 {
            entries.push(OverlapEntry {
                truth_id,
                prediction_id,
                area,
            });
        }
    }
    Ok(entries)
}

/// Compute exact intersection areas for every candidate pair.
///
/// `index` must have been built from `ground_truths`. Every ground truth and
/// prediction is validated, including ground truths far from any prediction.
/// Pairs that the index prunes, and pairs whose exact intersection is empty, produce no entry.
/// Entries are ordered by prediction id, then truth id, independent of
/// whether the work ran in parallel.
#[cfg_attr(
    feature = "profiling",
    tracing::instrument(skip_all, fields(predictions = predictions.len(), ground_truths = ground_truths.len()))
)]
pub fn find_overlaps<R: Region>(
    predictions: &[R],
    ground_truths: &[R],
    index: &SpatialIndex,
    options: &MatchOptions,
) -> Result<Vec<OverlapEntry>> {
    validate_all(ground_truths)?;

    let per_prediction = if options.parallel {
        predictions
            .par_iter()
            .enumerate()
            .map(|(id, prediction)| overlaps_for(id, prediction, ground_truths, index))
            .collect::<Result<Vec<_>>>()?
    } else {
        predictions
            .iter()
            .enumerate()
            .map(|(id, prediction)| overlaps_for(id, prediction, ground_truths, index))
            .collect::<Result<Vec<_>>>()?
    };

    let entries: Vec<OverlapEntry> = per_prediction.into_iter().flatten().collect();
    log::debug!(
        "Found {} overlapping pairs among {} predictions and {} ground truths",
        entries.len(),
        predictions.len(),
        ground_truths.len()
    );
    Ok(entries)
}

/// Build the index, discover overlaps, and densify them in one step.
///
/// Ground truths are validated before the index is built.
pub fn overlap_matrix<R: Region>(
    ground_truths: &[R],
    predictions: &[R],
    options: &MatchOptions,
) -> Result<OverlapMatrix> {
    validate_all(ground_truths)?;
    let index = SpatialIndex::build(ground_truths);
    let entries = find_overlaps(predictions, ground_truths, &index, options)?;
    OverlapMatrix::from_entries(ground_truths.len(), predictions.len(), entries)
}
