// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Polars view of a result table.

use crate::{Result, score::ResultRow};
use itertools::Itertools;
use polars::prelude::*;

/// Create a DataFrame from IoU result rows.
///
/// # Schema
///
/// | column          | type          | notes                         |
/// |-----------------|---------------|-------------------------------|
/// | `prediction_id` | `u32`, null   | null when the truth unmatched |
/// | `truth_id`      | `u32`         | ground-truth input position   |
/// | `IoU`           | `f64`         | in `[0, 1]`                   |
///
/// Row order is preserved, so row `i` describes ground truth `i` when `rows`
/// comes straight from [`crate::compute_iou`].
pub fn results_dataframe(rows: &[ResultRow]) -> Result<DataFrame> {
    let (predictions, truths, scores) = rows
        .iter()
        .map(|row| {
            (
                row.prediction_id.map(|id| id as u32),
                row.truth_id as u32,
                row.iou,
            )
        })
        .multiunzip::<(Vec<_>, Vec<_>, Vec<_>)>();

    let predictions = Series::new("prediction_id".into(), predictions).into();
    let truths = Series::new("truth_id".into(), truths).into();
    let scores = Series::new("IoU".into(), scores).into();

    Ok(DataFrame::new(vec![predictions, truths, scores])?)
}
