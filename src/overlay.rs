use anyhow::Result;
use opencv::{
    core::{Mat, Point, Scalar, Vector},
    imgproc,
    prelude::*,
};

use crate::{config::CalibrationConfig, pipeline::FrameResult, types::Target};

const HORIZONTAL_COLOR: (f64, f64, f64) = (255., 0., 0.);
const VERTICAL_COLOR: (f64, f64, f64) = (0., 0., 255.);
const PAIR_COLOR: (f64, f64, f64) = (0., 255., 255.);
const CROSSHAIR_COLOR: (f64, f64, f64) = (255., 255., 255.);

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.)
}

fn center_point(target: &Target) -> Point {
    let (x, y) = target.polygon.center();
    Point::new(x.round() as i32, y.round() as i32)
}

fn draw_targets(image: &mut Mat, targets: &[Target], color: Scalar) -> Result<()> {
    let outlines = Vector::<Vector<Point>>::from_iter(targets.iter().map(|target| {
        let polygon = &target.polygon;

        if polygon.points.len() >= 3 {
            polygon
                .points
                .iter()
                .map(|&(x, y)| Point::new(x, y))
                .collect::<Vector<Point>>()
        } else {
            // Simplification can leave slivers with fewer than three vertices.
            let b = polygon.bounds;
            Vector::from_iter([
                Point::new(b.x, b.y),
                Point::new(b.x + b.width - 1, b.y),
                Point::new(b.x + b.width - 1, b.y + b.height - 1),
                Point::new(b.x, b.y + b.height - 1),
            ])
        }
    }));

    imgproc::polylines(image, &outlines, true, color, 2, imgproc::LINE_8, 0)?;

    Ok(())
}

/// Builds a BGR copy of `display` with detections, the aiming line and the status line drawn
/// on top. `display` may be the color frame or the single-channel mask.
pub fn annotate(display: &Mat, result: &FrameResult, config: &CalibrationConfig) -> Result<Mat> {
    let mut image = Mat::default();
    if display.channels() == 1 {
        imgproc::cvt_color_def(display, &mut image, imgproc::COLOR_GRAY2BGR)?;
    } else {
        display.copy_to(&mut image)?;
    }

    let width = image.cols();
    let height = image.rows();

    let crosshair_x = config.crosshair_x(width);
    imgproc::line(
        &mut image,
        Point::new(crosshair_x, height - 1),
        Point::new(crosshair_x, 0),
        bgr(CROSSHAIR_COLOR),
        1,
        imgproc::LINE_8,
        0,
    )?;

    draw_targets(&mut image, &result.horizontal, bgr(HORIZONTAL_COLOR))?;
    draw_targets(&mut image, &result.vertical, bgr(VERTICAL_COLOR))?;

    for pair in &result.pairs {
        imgproc::line(
            &mut image,
            center_point(&pair.vertical),
            center_point(&pair.horizontal),
            bgr(PAIR_COLOR),
            2,
            imgproc::LINE_8,
            0,
        )?;
    }

    imgproc::put_text(
        &mut image,
        &result.to_string(),
        Point::new(10, 20),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        bgr(CROSSHAIR_COLOR),
        1,
        imgproc::LINE_AA,
        false,
    )?;

    Ok(image)
}
