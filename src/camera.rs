use anyhow::{anyhow, bail, Context, Result};
use opencv::{core::Mat, prelude::*, videoio};

use crate::config::CalibrationConfig;

/// Anything that can hand the pipeline one BGR frame at a time.
pub trait FrameSource {
    fn grab_frame(&mut self) -> Result<Mat>;
}

pub struct CaptureCamera {
    capture: videoio::VideoCapture,
}

impl CaptureCamera {
    /// Opens camera `index` at the configured resolution.
    pub fn new(index: i32, config: &CalibrationConfig) -> Result<Self> {
        let mut capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open camera {}", index))?;

        if !capture.is_opened()? {
            bail!("Camera {} is not available", index);
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, config.resolution.0 as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, config.resolution.1 as f64)?;

        Ok(CaptureCamera { capture })
    }

    pub fn set_exposure(&mut self, exposure: f64) -> Result<()> {
        if !self.capture.set(videoio::CAP_PROP_EXPOSURE, exposure)? {
            bail!("Camera rejected exposure {}", exposure);
        }

        Ok(())
    }

    pub fn exposure(&self) -> Result<f64> {
        Ok(self.capture.get(videoio::CAP_PROP_EXPOSURE)?)
    }
}

impl FrameSource for CaptureCamera {
    fn grab_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();

        if !self.capture.read(&mut frame)? || frame.empty() {
            return Err(anyhow!("Camera returned no frame"));
        }

        Ok(frame)
    }
}
