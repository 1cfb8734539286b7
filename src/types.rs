use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.,
            self.y as f64 + self.height as f64 / 2.,
        )
    }
}

/// Simplified convex outline of one foreground region.
///
/// `bounds` is taken from the region's full convex hull so that simplification does not shrink
/// the measured extent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<(i32, i32)>,
    pub bounds: BoundingBox,
}

impl Polygon {
    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    pub fn height(&self) -> i32 {
        self.bounds.height
    }

    pub fn center(&self) -> (f64, f64) {
        self.bounds.center()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub polygon: Polygon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetPair {
    pub vertical: Target,
    pub horizontal: Target,
    pub side: Side,
    /// Horizontal target center relative to the vertical target center, in inches.
    pub offset_in: (f64, f64),
    pub accepted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_box_midpoint() {
        let bounds = BoundingBox {
            x: 100,
            y: 100,
            width: 8,
            height: 60,
        };

        assert_eq!(bounds.center(), (104., 130.));
    }
}
