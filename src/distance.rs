use crate::types::{Target, TargetKind};

/// Real height of the vertical tape strip.
pub const VERTICAL_TARGET_HEIGHT_IN: f64 = 32.;

/// Range in feet to a target that appears `pixel_height` pixels tall, truncated to hundredths.
pub fn estimate_distance(pixel_height: i32, vertical_fov: f64, vertical_resolution: u32) -> f64 {
    let distance = (vertical_resolution as f64 * VERTICAL_TARGET_HEIGHT_IN / 12.)
        / (2. * pixel_height as f64 * (vertical_fov / 2.).tan());

    (distance * 100.).floor() / 100.
}

/// Range to a vertical target, `None` for any other kind.
pub fn target_distance(target: &Target, vertical_fov: f64, vertical_resolution: u32) -> Option<f64> {
    match target.kind {
        TargetKind::Vertical => Some(estimate_distance(
            target.polygon.height(),
            vertical_fov,
            vertical_resolution,
        )),
        TargetKind::Horizontal => None,
    }
}
