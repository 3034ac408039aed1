// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Area primitives for the regions being matched.
//!
//! The matching pipeline only needs three operations from a geometry: its
//! axis-aligned bounds, the area it shares with another geometry, and the area
//! of their union. [`Region`] captures exactly that, and is implemented for the
//! `geo` polygon types so the exact boolean operations come from `geo`.

use crate::{Error, Result};
use geo::{Area, BooleanOps, BoundingRect, CoordsIter, LineString, MultiPolygon, Polygon, Rect};

/// Axis-aligned bounding box (min_x, min_y, max_x, max_y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True when the boxes overlap or touch.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// A read-only 2D region that can be matched against another of its kind.
///
/// Implementations must use the same intersection routine for
/// [`Region::intersection_area`] regardless of caller, so the overlap used for
/// assignment and the overlap used for scoring never drift apart.
pub trait Region: Sync {
    /// Bounding box, or `None` for a geometry without coordinates.
    fn bounds(&self) -> Option<Bounds>;

    /// Exact area shared by `self` and `other`.
    fn intersection_area(&self, other: &Self) -> Result<f64>;

    /// Exact area covered by `self`, `other`, or both.
    ///
    /// Must agree with the boolean-op areas behind
    /// [`Region::intersection_area`], also for disjoint inputs.
    fn union_area(&self, other: &Self) -> Result<f64>;

    /// Reject geometries the area primitives cannot work with.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

fn ensure_finite<G>(geometry: &G) -> Result<()>
where
    G: CoordsIter<Scalar = f64>,
{
    match geometry
        .coords_iter()
        .find(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        Some(c) => Err(Error::InvalidGeometry(format!(
            "non-finite coordinate ({}, {})",
            c.x, c.y
        ))),
        None => Ok(()),
    }
}

/// Validate every region, failing on the first invalid one.
pub(crate) fn validate_all<R: Region>(regions: &[R]) -> Result<()> {
    regions.iter().try_for_each(|region| region.validate())
}

fn disjoint(a: Option<Bounds>, b: Option<Bounds>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.intersects(&b),
        _ => true,
    }
}

impl Region for Polygon<f64> {
    fn bounds(&self) -> Option<Bounds> {
        self.bounding_rect().map(Bounds::from)
    }

    fn validate(&self) -> Result<()> {
        ensure_finite(self)
    }

    fn intersection_area(&self, other: &Self) -> Result<f64> {
        ensure_finite(self)?;
        ensure_finite(other)?;
        if disjoint(self.bounds(), other.bounds()) {
            return Ok(0.0);
        }
        Ok(self.intersection(other).unsigned_area())
    }

    fn union_area(&self, other: &Self) -> Result<f64> {
        ensure_finite(self)?;
        ensure_finite(other)?;
        Ok(self.union(other).unsigned_area())
    }
}

impl Region for MultiPolygon<f64> {
    fn bounds(&self) -> Option<Bounds> {
        self.bounding_rect().map(Bounds::from)
    }

    fn validate(&self) -> Result<()> {
        ensure_finite(self)
    }

    fn intersection_area(&self, other: &Self) -> Result<f64> {
        ensure_finite(self)?;
        ensure_finite(other)?;
        if disjoint(self.bounds(), other.bounds()) {
            return Ok(0.0);
        }
        Ok(self.intersection(other).unsigned_area())
    }

    fn union_area(&self, other: &Self) -> Result<f64> {
        ensure_finite(self)?;
        ensure_finite(other)?;
        Ok(self.union(other).unsigned_area())
    }
}

/// Build a polygon from rings of `[x, y]` points.
///
/// The first ring is the exterior and any further rings are holes. Rings do
/// not need to be explicitly closed. An empty ring list produces an empty
/// polygon, which has no bounds and zero area.
pub fn polygon_from_rings(rings: &[Vec<[f64; 2]>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(|ring| LineString::from(ring.clone()));
    let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
    Polygon::new(exterior, rings.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        Rect::new((x, y), (x + size, y + size)).to_polygon()
    }

    #[test]
    fn test_bounds_of_square() {
        let bounds = square(1.0, 2.0, 3.0).bounds().unwrap();
        assert_eq!(bounds, Bounds::new(1.0, 2.0, 4.0, 5.0));
    }

    #[test]
    fn test_bounds_touching_edges_intersect() {
        let a = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let b = Bounds::new(1.0, 0.0, 2.0, 1.0);
        let c = Bounds::new(1.5, 1.5, 2.0, 2.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_partial_overlap_areas() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        assert!((a.intersection_area(&b).unwrap() - 1.0).abs() < 1e-9);
        assert!((a.union_area(&b).unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_areas() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(10.0, 10.0, 2.0);
        assert_eq!(a.intersection_area(&b).unwrap(), 0.0);
        assert!((a.union_area(&b).unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_intersecting_union_uses_boolean_area() {
        // Bowtie: two unit triangles meeting at (1, 1); the shoelace area is 0.
        let bowtie: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ];
        assert!(bowtie.unsigned_area() < 1e-12);

        let far = square(10.0, 10.0, 1.0);
        let near = square(1.5, -1.0, 1.0);
        let bowtie_area = bowtie.union(&bowtie).unsigned_area();
        assert!((bowtie_area - 2.0).abs() < 1e-9);
        assert!((bowtie.union_area(&far).unwrap() - (bowtie_area + 1.0)).abs() < 1e-9);
        assert!((far.union_area(&bowtie).unwrap() - (bowtie_area + 1.0)).abs() < 1e-9);
        assert!(bowtie.union_area(&near).unwrap() > 2.0);
    }

    #[test]
    fn test_validate_all_stops_at_invalid() {
        let bad = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: f64::INFINITY), (x: 1.0, y: 1.0)];
        assert!(validate_all(&[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]).is_ok());
        assert!(matches!(
            validate_all(&[square(0.0, 0.0, 1.0), bad]),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_triangle_inside_square() {
        let outer = square(0.0, 0.0, 10.0);
        let triangle = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 5.0, y: 10.0)];
        assert!((outer.intersection_area(&triangle).unwrap() - 50.0).abs() < 1e-9);
        assert!((outer.union_area(&triangle).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_polygon_has_zero_area() {
        let line = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        assert!(line.bounds().is_some());
        assert_eq!(line.intersection_area(&line).unwrap(), 0.0);
        assert_eq!(line.union_area(&line).unwrap(), 0.0);
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let bad = polygon![(x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0)];
        let good = square(0.0, 0.0, 1.0);
        assert!(matches!(
            good.intersection_area(&bad),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            bad.union_area(&good),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_polygon_from_rings_with_hole() {
        let poly = polygon_from_rings(&[
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]],
        ]);
        assert!((poly.unsigned_area() - 12.0).abs() < 1e-9);

        let empty = polygon_from_rings(&[]);
        assert!(empty.bounds().is_none());
    }

    #[test]
    fn test_multipolygon_overlap() {
        let a = MultiPolygon::new(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]);
        let b = MultiPolygon::new(vec![square(0.5, 0.0, 1.0)]);
        assert!((a.intersection_area(&b).unwrap() - 0.5).abs() < 1e-9);
        assert!((a.union_area(&b).unwrap() - 2.5).abs() < 1e-9);
    }
}
