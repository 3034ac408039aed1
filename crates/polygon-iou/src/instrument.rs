// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies. All Rights Reserved.

//! Conditional tracing support for profiling matching runs.
//!
//! Pipeline stages carry their own spans when the `profiling` feature is
//! enabled, using the `#[cfg_attr]` pattern:
//!
//! ```rust,ignore
//! #[cfg_attr(feature = "profiling", tracing::instrument(skip_all))]
//! pub fn find_overlaps<R: Region>(/* ... */) -> Result<Vec<OverlapEntry>> {
//!     // ...
//! }
//! ```
//!
//! The re-exports below are public API for callers: they let an application
//! open its own spans around a run (per tile, per file) without depending on
//! `tracing` directly. The `polygon-iou` CLI uses them for its top-level
//! span. Without the feature this module is empty.
//!
//! ```rust,ignore
//! use polygon_iou::instrument::*;
//!
//! let rows = info_span!("tile", id = tile_id)
//!     .in_scope(|| polygon_iou::compute_iou(&truths, &predictions))?;
//! ```

#[cfg(feature = "profiling")]
pub use tracing::{Instrument, Level, Span, debug_span, info_span, trace_span};
