//! Detection of the 2014 goal's retro-reflective tape strips.
//!
//! Each frame is thresholded in HSV, closed, reduced to convex polygons, and the polygons are
//! sorted into horizontal and vertical strips. Vertical strips give range through their known
//! height; vertical/horizontal pairs give which side of the goal the camera is looking at.

pub mod camera;
pub mod classify;
pub mod config;
pub mod distance;
pub mod extraction;
pub mod overlay;
pub mod pairing;
pub mod pipeline;
pub mod segmentation;
pub mod telemetry;
pub mod types;
pub mod udp;
