use std::fmt;

use anyhow::{Context, Result};
use log::debug;
use opencv::core::Mat;
use serde::Serialize;

use crate::{
    classify::{Classification, TargetClassifier},
    config::CalibrationConfig,
    distance::target_distance,
    extraction::ConvexContourExtractor,
    pairing::pair_targets,
    segmentation::{MorphologyFilter, Segmenter},
    types::{Side, Target, TargetPair},
};

/// Everything the pipeline learned from one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameResult {
    pub horizontal: Vec<Target>,
    pub vertical: Vec<Target>,
    pub pairs: Vec<TargetPair>,
    /// Range in feet to the first vertical target.
    pub distance: Option<f64>,
    /// Center column of the first vertical target.
    pub target_x: Option<f64>,
    /// Side of the first accepted pair.
    pub side: Option<Side>,
}

impl fmt::Display for FrameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distance {
            Some(distance) => write!(
                f,
                "H: {} V: {} D: {}",
                self.horizontal.len(),
                self.vertical.len(),
                distance
            )?,
            None => write!(f, "no vertical targets")?,
        }

        if let Some(side) = self.side {
            write!(f, " ({:?}, {} pairs)", side, self.pairs.len())?;
        }

        Ok(())
    }
}

pub struct VisionPipeline {
    segmenter: Segmenter,
    morphology: MorphologyFilter,
    extractor: ConvexContourExtractor,
    last_result: FrameResult,
}

impl VisionPipeline {
    pub fn new() -> Result<Self> {
        Ok(VisionPipeline {
            segmenter: Segmenter::new(),
            morphology: MorphologyFilter::new()?,
            extractor: ConvexContourExtractor::new(),
            last_result: FrameResult::default(),
        })
    }

    pub fn process_frame(&mut self, frame: &Mat, config: &CalibrationConfig) -> Result<FrameResult> {
        let mask = self
            .segmenter
            .threshold_image(frame, config)
            .context("Segmentation failed")?;

        self.morphology
            .close(mask)
            .context("Morphological filtering failed")?;

        let polygons = self
            .extractor
            .extract_from(mask)
            .context("Contour extraction failed")?;

        debug!("Found {} convex contours", polygons.len());

        let Classification {
            horizontal,
            vertical,
        } = TargetClassifier::new(config).classify(polygons);

        let pairs = pair_targets(&vertical, &horizontal, config);

        let first_vertical = vertical.first();
        let result = FrameResult {
            distance: first_vertical.and_then(|target| {
                target_distance(target, config.vertical_fov(), config.resolution.1)
            }),
            target_x: first_vertical.map(|target| target.polygon.center().0),
            side: pairs.first().map(|pair| pair.side),
            horizontal,
            vertical,
            pairs,
        };

        debug!("{}", result);

        self.last_result = result.clone();

        Ok(result)
    }

    pub fn last_result(&self) -> &FrameResult {
        &self.last_result
    }

    /// Closed binary mask from the most recent frame.
    pub fn mask(&self) -> &Mat {
        self.segmenter.mask()
    }

    /// The image to show for the most recent frame: the mask when `show_binary` is set,
    /// otherwise the frame itself.
    pub fn display_image<'a>(&'a self, frame: &'a Mat, config: &CalibrationConfig) -> &'a Mat {
        if config.show_binary {
            self.mask()
        } else {
            frame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use opencv::{
        core::{Rect, Scalar, CV_8UC3},
        imgproc,
        prelude::*,
    };

    use crate::distance::estimate_distance;

    fn frame_with(rects: &[Rect]) -> Mat {
        let mut frame = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.)).unwrap();

        for rect in rects {
            imgproc::rectangle(
                &mut frame,
                *rect,
                Scalar::new(0., 255., 0., 0.),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )
            .unwrap();
        }

        frame
    }

    #[test]
    fn empty_frame_finds_nothing() {
        let mut pipeline = VisionPipeline::new().unwrap();
        let result = pipeline
            .process_frame(&frame_with(&[]), &CalibrationConfig::default())
            .unwrap();

        assert!(result.horizontal.is_empty());
        assert!(result.vertical.is_empty());
        assert!(result.pairs.is_empty());
        assert_eq!(result.distance, None);
        assert_eq!(result.target_x, None);
        assert_eq!(result.side, None);
        assert_eq!(result.to_string(), "no vertical targets");
    }

    #[test]
    fn goal_markers_are_found_and_paired() {
        let config = CalibrationConfig::default();
        let mut pipeline = VisionPipeline::new().unwrap();

        let frame = frame_with(&[Rect::new(100, 100, 8, 60), Rect::new(139, 132, 40, 6)]);
        let result = pipeline.process_frame(&frame, &config).unwrap();

        assert_eq!(result.horizontal.len(), 1);
        assert_eq!(result.vertical.len(), 1);
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.side, Some(Side::Right));
        assert_eq!(result.target_x, Some(104.));
        assert_abs_diff_eq!(
            result.distance.unwrap(),
            estimate_distance(60, config.vertical_fov(), 480),
            epsilon = 1e-12
        );
        assert_eq!(result.to_string(), "H: 1 V: 1 D: 23.4 (Right, 1 pairs)");
        assert_eq!(pipeline.last_result(), &result);
    }

    #[test]
    fn lone_vertical_reports_distance_without_side() {
        let mut pipeline = VisionPipeline::new().unwrap();
        let result = pipeline
            .process_frame(
                &frame_with(&[Rect::new(300, 200, 8, 60)]),
                &CalibrationConfig::default(),
            )
            .unwrap();

        assert_eq!(result.vertical.len(), 1);
        assert!(result.pairs.is_empty());
        assert_eq!(result.side, None);
        assert!(result.distance.is_some());
        assert_eq!(result.to_string(), "H: 0 V: 1 D: 23.4");
    }

    #[test]
    fn frame_size_change_is_handled() {
        let config = CalibrationConfig::default();
        let mut pipeline = VisionPipeline::new().unwrap();

        pipeline.process_frame(&frame_with(&[]), &config).unwrap();

        let mut small = Mat::new_rows_cols_with_default(240, 320, CV_8UC3, Scalar::all(0.)).unwrap();
        imgproc::rectangle(
            &mut small,
            Rect::new(50, 50, 8, 60),
            Scalar::new(0., 255., 0., 0.),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let result = pipeline.process_frame(&small, &config).unwrap();

        assert_eq!(result.vertical.len(), 1);
        assert_eq!(pipeline.mask().rows(), 240);
        assert_eq!(pipeline.mask().cols(), 320);
    }

    #[test]
    fn display_follows_show_binary() {
        let frame = frame_with(&[Rect::new(100, 100, 8, 60)]);
        let mut pipeline = VisionPipeline::new().unwrap();

        let config = CalibrationConfig::default();
        pipeline.process_frame(&frame, &config).unwrap();
        assert_eq!(pipeline.display_image(&frame, &config).channels(), 3);

        let config = CalibrationConfig {
            show_binary: true,
            ..config
        };
        pipeline.process_frame(&frame, &config).unwrap();
        assert_eq!(pipeline.display_image(&frame, &config).channels(), 1);
    }
}
