use crate::{
    classify::relative_error,
    config::CalibrationConfig,
    distance::VERTICAL_TARGET_HEIGHT_IN,
    types::{Side, Target, TargetPair},
};

/// Measures where `horizontal` sits relative to `vertical`, using the vertical strip's known
/// height as the pixel-to-inch scale, and checks it against the offset expected for that side.
pub fn evaluate_pair(vertical: &Target, horizontal: &Target, config: &CalibrationConfig) -> TargetPair {
    let (vx, vy) = vertical.polygon.center();
    let (hx, hy) = horizontal.polygon.center();

    let dx = hx - vx;
    let dy = hy - vy;

    let px_per_inch = vertical.polygon.height() as f64 / VERTICAL_TARGET_HEIGHT_IN;
    let offset_in = (dx / px_per_inch, dy / px_per_inch);

    let side = if dx > 0. { Side::Right } else { Side::Left };
    let expected = match side {
        Side::Left => config.left_offset,
        Side::Right => config.right_offset,
    };

    let accepted = relative_error(offset_in.0, expected.x) <= config.max_pair_error
        && relative_error(offset_in.1, expected.y) <= config.max_pair_error;

    TargetPair {
        vertical: vertical.clone(),
        horizontal: horizontal.clone(),
        side,
        offset_in,
        accepted,
    }
}

/// Every accepted (vertical, horizontal) combination. A target may appear in several pairs.
pub fn pair_targets(
    vertical: &[Target],
    horizontal: &[Target],
    config: &CalibrationConfig,
) -> Vec<TargetPair> {
    vertical
        .iter()
        .flat_map(|v| horizontal.iter().map(move |h| evaluate_pair(v, h, config)))
        .filter(|pair| pair.accepted)
        .collect()
}
