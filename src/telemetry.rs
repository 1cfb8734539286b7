use anyhow::Result;
use log::info;

use crate::pipeline::FrameResult;

/// Published for `distance` when no vertical target is visible.
pub const NO_DISTANCE: f64 = -1.;

/// Key/value channel to the robot control loop.
pub trait TelemetrySink {
    fn put_number(&mut self, key: &str, value: f64) -> Result<()>;
}

/// Writes `x` when a vertical target exists and `distance` (or [`NO_DISTANCE`]) every frame.
pub fn publish<S: TelemetrySink + ?Sized>(sink: &mut S, result: &FrameResult) -> Result<()> {
    if let Some(x) = result.target_x {
        sink.put_number("x", x)?;
    }

    sink.put_number("distance", result.distance.unwrap_or(NO_DISTANCE))
}

pub struct LogSink;

impl TelemetrySink for LogSink {
    fn put_number(&mut self, key: &str, value: f64) -> Result<()> {
        info!("{} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use crate::types::{BoundingBox, Polygon, Target, TargetKind};

    #[derive(Default)]
    struct RecordingSink {
        values: HashMap<String, f64>,
        writes: usize,
    }

    impl TelemetrySink for RecordingSink {
        fn put_number(&mut self, key: &str, value: f64) -> Result<()> {
            self.values.insert(key.to_string(), value);
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn empty_result_publishes_sentinel_only() {
        let mut sink = RecordingSink::default();
        publish(&mut sink, &FrameResult::default()).unwrap();

        assert_eq!(sink.writes, 1);
        assert_eq!(sink.values.get("distance"), Some(&NO_DISTANCE));
        assert!(!sink.values.contains_key("x"));
    }

    #[test]
    fn vertical_target_publishes_position_and_range() {
        let result = FrameResult {
            vertical: vec![Target {
                kind: TargetKind::Vertical,
                polygon: Polygon {
                    points: Vec::new(),
                    bounds: BoundingBox {
                        x: 100,
                        y: 100,
                        width: 8,
                        height: 60,
                    },
                },
            }],
            distance: Some(23.4),
            target_x: Some(104.),
            ..FrameResult::default()
        };

        let mut sink = RecordingSink::default();
        publish(&mut sink, &result).unwrap();

        assert_eq!(sink.values.get("x"), Some(&104.));
        assert_eq!(sink.values.get("distance"), Some(&23.4));
    }
}
