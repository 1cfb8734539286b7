use anyhow::{Context, Result};
use log::debug;
use opencv::{
    core::{self, Mat, Point, Scalar, Size, BORDER_CONSTANT, CV_8UC1, CV_8UC3},
    imgproc,
    prelude::*,
};

use crate::config::CalibrationConfig;

/// HSV band thresholding into a reusable binary mask.
pub struct Segmenter {
    size: Option<Size>,
    hsv: Mat,
    mask: Mat,
}

impl Segmenter {
    pub fn new() -> Self {
        Segmenter {
            size: None,
            hsv: Mat::default(),
            mask: Mat::default(),
        }
    }

    fn provision(&mut self, size: Size) -> Result<()> {
        if self.size == Some(size) {
            return Ok(());
        }

        debug!(
            "Re-provisioning segmentation buffers for {}x{} frames",
            size.width, size.height
        );

        self.hsv =
            Mat::new_rows_cols_with_default(size.height, size.width, CV_8UC3, Scalar::all(0.))?;
        self.mask =
            Mat::new_rows_cols_with_default(size.height, size.width, CV_8UC1, Scalar::all(0.))?;
        self.size = Some(size);

        Ok(())
    }

    /// Marks every pixel whose hue, saturation and value all fall inside the configured
    /// inclusive bounds.
    pub fn threshold_image(&mut self, frame: &Mat, config: &CalibrationConfig) -> Result<&mut Mat> {
        self.provision(frame.size()?)?;

        imgproc::cvt_color_def(frame, &mut self.hsv, imgproc::COLOR_BGR2HSV)
            .context("Failed to convert frame to HSV")?;

        let lower = Scalar::new(
            config.hue.min as f64,
            config.saturation.min as f64,
            config.value.min as f64,
            0.,
        );
        let upper = Scalar::new(
            config.hue.max as f64,
            config.saturation.max as f64,
            config.value.max as f64,
            0.,
        );

        core::in_range(&self.hsv, &lower, &upper, &mut self.mask)
            .context("Failed to threshold HSV frame")?;

        Ok(&mut self.mask)
    }

    pub fn mask(&self) -> &Mat {
        &self.mask
    }
}

/// Single-iteration closing with a centered 3x3 rectangle.
pub struct MorphologyFilter {
    kernel: Mat,
    scratch: Mat,
}

impl MorphologyFilter {
    pub fn new() -> Result<Self> {
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(3, 3),
            Point::new(1, 1),
        )?;

        Ok(MorphologyFilter {
            kernel,
            scratch: Mat::default(),
        })
    }

    pub fn close(&mut self, mask: &mut Mat) -> Result<()> {
        imgproc::morphology_ex(
            &*mask,
            &mut self.scratch,
            imgproc::MORPH_CLOSE,
            &self.kernel,
            Point::new(-1, -1),
            1,
            BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )
        .context("Failed to close binary mask")?;

        std::mem::swap(mask, &mut self.scratch);

        Ok(())
    }
}
