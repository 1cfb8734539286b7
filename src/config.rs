use std::{fmt::Display, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{field}: min ({min}) is greater than max ({max})")]
    InvertedBounds {
        field: &'static str,
        min: String,
        max: String,
    },
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
    #[error("{field}: field of view must be within (0, 180) degrees, got {value}")]
    FieldOfView { field: &'static str, value: f64 },
}

/// Inclusive `[min, max]` interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Bounds { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        contains(self.min, self.max, value)
    }
}

impl<T: PartialOrd + Copy + Display> Bounds<T> {
    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedBounds {
                field,
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }

        Ok(())
    }
}

pub fn contains<T: PartialOrd>(lower: T, upper: T, value: T) -> bool {
    lower <= value && upper >= value
}

/// Expected horizontal-target offset from the vertical target, in inches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairOffset {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub resolution: (u32, u32),
    pub horizontal_fov_deg: f64,
    pub vertical_fov_deg: f64,

    pub hue: Bounds<u8>,
    pub saturation: Bounds<u8>,
    pub value: Bounds<u8>,

    pub horizontal_width: Bounds<i32>,
    pub vertical_height: Bounds<i32>,

    pub max_horizontal_error: f64,
    pub max_vertical_error: f64,
    pub max_pair_error: f64,
    pub left_offset: PairOffset,
    pub right_offset: PairOffset,

    pub crosshair_offset_deg: f64,
    pub show_binary: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            resolution: (640, 480),
            // Axis M1013
            horizontal_fov_deg: 67.,
            vertical_fov_deg: 49.,

            hue: Bounds::new(45, 85),
            saturation: Bounds::new(200, 255),
            value: Bounds::new(55, 255),

            horizontal_width: Bounds::new(30, 150),
            vertical_height: Bounds::new(45, 200),

            max_horizontal_error: 0.9,
            max_vertical_error: 0.6,
            max_pair_error: 0.3,
            left_offset: PairOffset { x: -9.5, y: 2.5 },
            right_offset: PairOffset { x: 29.5, y: 2.5 },

            crosshair_offset_deg: 0.,
            show_binary: false,
        }
    }
}

impl CalibrationConfig {
    /// Reads a JSON config, filling absent fields with defaults, and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;

        let config: CalibrationConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        Ok(config)
    }

    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref()).context("Failed to create config file")?;
        serde_json::to_writer_pretty(file, &CalibrationConfig::default())?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hue.check("hue")?;
        self.saturation.check("saturation")?;
        self.value.check("value")?;
        self.horizontal_width.check("horizontal_width")?;
        self.vertical_height.check("vertical_height")?;

        if self.resolution.0 == 0 {
            return Err(ConfigError::NonPositive {
                field: "resolution.width",
            });
        }
        if self.resolution.1 == 0 {
            return Err(ConfigError::NonPositive {
                field: "resolution.height",
            });
        }

        for (field, value) in [
            ("horizontal_fov_deg", self.horizontal_fov_deg),
            ("vertical_fov_deg", self.vertical_fov_deg),
        ] {
            if !(value > 0. && value < 180.) {
                return Err(ConfigError::FieldOfView { field, value });
            }
        }

        for (field, value) in [
            ("max_horizontal_error", self.max_horizontal_error),
            ("max_vertical_error", self.max_vertical_error),
            ("max_pair_error", self.max_pair_error),
        ] {
            if !(value > 0.) {
                return Err(ConfigError::NonPositive { field });
            }
        }

        Ok(())
    }

    pub fn vertical_fov(&self) -> f64 {
        self.vertical_fov_deg.to_radians()
    }

    /// Column of the aiming line for a frame `width` pixels wide.
    pub fn crosshair_x(&self, width: i32) -> i32 {
        let offset = (self.crosshair_offset_deg * width as f64 / self.horizontal_fov_deg).round();
        width / 2 + offset as i32
    }
}
