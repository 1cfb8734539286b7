use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Point, Vec4i, Vector},
    imgproc,
    prelude::*,
};

use crate::types::{BoundingBox, Polygon};

/// Extracts the convex outline of every connected region in a binary mask.
pub struct ConvexContourExtractor {
    epsilon: f64,
}

impl ConvexContourExtractor {
    pub const DEFAULT_EPSILON: f64 = 20.;

    pub fn new() -> Self {
        Self::with_epsilon(Self::DEFAULT_EPSILON)
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        ConvexContourExtractor { epsilon }
    }

    fn find_convex_contours(&self, mask: &Mat) -> Result<Vec<Vector<Point>>> {
        let mut contours = Vector::<Vector<Point>>::new();
        let mut hierarchy = Vector::<Vec4i>::new();
        imgproc::find_contours_with_hierarchy(
            mask,
            &mut contours,
            &mut hierarchy,
            imgproc::RETR_CCOMP,
            imgproc::CHAIN_APPROX_TC89_KCOS,
            Point::new(0, 0),
        )
        .context("Failed to find contours")?;

        // Two-level hierarchy: contours without a parent are outer boundaries, the rest are holes.
        contours
            .iter()
            .zip(hierarchy.iter())
            .filter(|(_, indices)| indices[3] < 0)
            .map(|(contour, _)| -> Result<Vector<Point>> {
                let mut hull = Vector::<Point>::new();
                imgproc::convex_hull(&contour, &mut hull, true, true)?;
                Ok(hull)
            })
            .collect()
    }

    fn approx_polygon(&self, hull: &Vector<Point>) -> Result<Polygon> {
        let rect = imgproc::bounding_rect(hull)?;

        let mut simplified = Vector::<Point>::new();
        imgproc::approx_poly_dp(hull, &mut simplified, self.epsilon, true)?;

        Ok(Polygon {
            points: simplified.iter().map(|point| (point.x, point.y)).collect(),
            bounds: BoundingBox {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            },
        })
    }

    /// An empty mask yields an empty list. Order of the returned polygons is unspecified.
    pub fn extract_from(&self, mask: &Mat) -> Result<Vec<Polygon>> {
        self.find_convex_contours(mask)?
            .iter()
            .map(|hull| self.approx_polygon(hull))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use opencv::core::{Rect, Scalar, CV_8UC1};

    fn mask_with(rects: &[Rect]) -> Mat {
        let mut mask = Mat::new_rows_cols_with_default(480, 640, CV_8UC1, Scalar::all(0.)).unwrap();

        for rect in rects {
            imgproc::rectangle(
                &mut mask,
                *rect,
                Scalar::all(255.),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )
            .unwrap();
        }

        mask
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let extractor = ConvexContourExtractor::new();
        assert!(extractor.extract_from(&mask_with(&[])).unwrap().is_empty());
    }

    #[test]
    fn each_region_becomes_one_polygon() {
        let extractor = ConvexContourExtractor::new();
        let mut polygons = extractor
            .extract_from(&mask_with(&[
                Rect::new(100, 100, 8, 60),
                Rect::new(300, 200, 40, 6),
            ]))
            .unwrap();
        polygons.sort_by_key(|polygon| polygon.bounds.x);

        assert_eq!(polygons.len(), 2);
        assert_eq!(
            polygons[0].bounds,
            BoundingBox {
                x: 100,
                y: 100,
                width: 8,
                height: 60
            }
        );
        assert_eq!(
            polygons[1].bounds,
            BoundingBox {
                x: 300,
                y: 200,
                width: 40,
                height: 6
            }
        );
    }

    #[test]
    fn concave_region_is_reported_by_its_hull() {
        // An L shape: the hull spans both arms.
        let extractor = ConvexContourExtractor::with_epsilon(1.);
        let polygons = extractor
            .extract_from(&mask_with(&[
                Rect::new(50, 50, 10, 100),
                Rect::new(50, 140, 100, 10),
            ]))
            .unwrap();

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].width(), 100);
        assert_eq!(polygons[0].height(), 100);
        // Triangle-like hull, so the inner corner of the L is not a vertex.
        assert!(!polygons[0].points.contains(&(59, 139)));
    }

    #[test]
    fn holes_do_not_produce_polygons() {
        let mut mask = mask_with(&[Rect::new(100, 100, 80, 80)]);
        imgproc::rectangle(
            &mut mask,
            Rect::new(120, 120, 40, 40),
            Scalar::all(0.),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let polygons = ConvexContourExtractor::new().extract_from(&mask).unwrap();

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].width(), 80);
    }

    #[test]
    fn simplification_reduces_vertices() {
        let mut mask = mask_with(&[]);
        imgproc::circle(
            &mut mask,
            Point::new(320, 240),
            80,
            Scalar::all(255.),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let fine = ConvexContourExtractor::with_epsilon(1.)
            .extract_from(&mask)
            .unwrap();
        let coarse = ConvexContourExtractor::new().extract_from(&mask).unwrap();

        assert_eq!(fine.len(), 1);
        assert_eq!(coarse.len(), 1);
        assert!(coarse[0].points.len() < fine[0].points.len());
        assert_eq!(coarse[0].bounds, fine[0].bounds);
    }
}
