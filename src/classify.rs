use crate::{
    config::CalibrationConfig,
    types::{Polygon, Target, TargetKind},
};

/// Height over width of the horizontal tape strip (4 in x 23.5 in).
pub const HORIZONTAL_RATIO: f64 = 4. / 23.5;
/// Height over width of the vertical tape strip (32 in x 4 in).
pub const VERTICAL_RATIO: f64 = 32. / 4.;

/// `|result - expected| / |expected|`
pub fn relative_error(result: f64, expected: f64) -> f64 {
    ((result - expected) / expected).abs()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub horizontal: Vec<Target>,
    pub vertical: Vec<Target>,
}

pub struct TargetClassifier<'a> {
    config: &'a CalibrationConfig,
}

impl<'a> TargetClassifier<'a> {
    pub fn new(config: &'a CalibrationConfig) -> Self {
        TargetClassifier { config }
    }

    fn is_horizontal(&self, polygon: &Polygon, ratio: f64) -> bool {
        relative_error(ratio, HORIZONTAL_RATIO) < self.config.max_horizontal_error
            && self.config.horizontal_width.contains(polygon.width())
    }

    fn is_vertical(&self, polygon: &Polygon, ratio: f64) -> bool {
        relative_error(ratio, VERTICAL_RATIO) < self.config.max_vertical_error
            && self.config.vertical_height.contains(polygon.height())
    }

    /// The horizontal test runs first, so a polygon passing both tests is horizontal.
    pub fn kind_of(&self, polygon: &Polygon) -> Option<TargetKind> {
        if polygon.width() < 1 || polygon.height() < 1 {
            return None;
        }

        let ratio = polygon.height() as f64 / polygon.width() as f64;

        if self.is_horizontal(polygon, ratio) {
            Some(TargetKind::Horizontal)
        } else if self.is_vertical(polygon, ratio) {
            Some(TargetKind::Vertical)
        } else {
            None
        }
    }

    pub fn classify(&self, polygons: Vec<Polygon>) -> Classification {
        let mut classification = Classification::default();

        for polygon in polygons {
            match self.kind_of(&polygon) {
                Some(kind @ TargetKind::Horizontal) => {
                    classification.horizontal.push(Target { kind, polygon })
                }
                Some(kind @ TargetKind::Vertical) => {
                    classification.vertical.push(Target { kind, polygon })
                }
                None => {}
            }
        }

        classification
    }
}
