use std::{path::PathBuf, thread, time::Duration};

use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use vision_2014::{
    camera::{CaptureCamera, FrameSource},
    config::CalibrationConfig,
    pipeline::VisionPipeline,
};

#[derive(Debug, Parser)]
#[command(about = "Find the camera exposure that most reliably shows a vertical target")]
struct Args {
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[arg(long, default_value_t = 0)]
    camera: i32,

    #[arg(long, default_value_t = 3.)]
    start: f64,

    #[arg(long, default_value_t = 1.)]
    step: f64,

    /// Frames sampled per exposure setting.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    frames: u32,

    /// Give up after this many settings without improvement.
    #[arg(long, default_value_t = 10)]
    patience: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        CalibrationConfig::load(&args.config)?
    } else {
        CalibrationConfig::default()
    };

    let mut camera = CaptureCamera::new(args.camera, &config)?;
    let mut pipeline = VisionPipeline::new()?;

    let mut exposure = args.start;
    let mut best_exposure = exposure;
    let mut min_miss_rate = 1.;
    let mut steps_since_min = 0;

    while steps_since_min < args.patience {
        camera.set_exposure(exposure)?;
        // Let auto-adjustment settle before sampling.
        thread::sleep(Duration::from_millis(100));

        let mut misses = 0;
        for _ in 0..args.frames {
            let frame = camera.grab_frame()?;
            if pipeline.process_frame(&frame, &config)?.vertical.is_empty() {
                misses += 1;
            }
        }

        let miss_rate = misses as f64 / args.frames as f64;
        debug!(
            "exposure {} ({} reported): miss rate {}",
            exposure,
            camera.exposure()?,
            miss_rate
        );

        if miss_rate < min_miss_rate {
            min_miss_rate = miss_rate;
            best_exposure = exposure;
            steps_since_min = 0;
        } else {
            steps_since_min += 1;
        }

        exposure += args.step;
    }

    info!("Best exposure {} (miss rate {})", best_exposure, min_miss_rate);
    println!("{}", best_exposure);
    println!("{}", min_miss_rate);

    Ok(())
}
