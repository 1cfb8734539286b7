use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use vision_2014::{
    camera::{CaptureCamera, FrameSource},
    config::CalibrationConfig,
    pipeline::VisionPipeline,
    telemetry::{self, LogSink, TelemetrySink},
    udp::UdpSender,
};

#[derive(Debug, Parser)]
#[command(about = "Track the goal tape and publish range and position")]
struct Args {
    /// JSON calibration file. Written with defaults if missing.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// `host:port` to send telemetry to. Values are only logged when omitted.
    #[arg(long)]
    telemetry: Option<String>,

    #[arg(long, default_value_t = 4904)]
    source_port: u16,

    #[arg(long, default_value_t = 200)]
    interval_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.config.exists() {
        warn!(
            "{} not found, writing defaults",
            args.config.to_string_lossy()
        );
        CalibrationConfig::write_default(&args.config)?;
    }
    let config = CalibrationConfig::load(&args.config)?;

    let mut camera = CaptureCamera::new(args.camera, &config)?;
    let mut pipeline = VisionPipeline::new()?;

    let mut sink: Box<dyn TelemetrySink> = match &args.telemetry {
        // This will block until the hostname appears on the network.
        Some(address) => Box::new(
            UdpSender::new(args.source_port, address)
                .with_context(|| format!("Failed to open telemetry socket to {}", address))?,
        ),
        None => Box::new(LogSink),
    };

    loop {
        let frame = camera
            .grab_frame()
            .context("Failed to read frame from camera")?;

        let result = pipeline.process_frame(&frame, &config)?;
        info!("{}", result);

        telemetry::publish(sink.as_mut(), &result)?;

        thread::sleep(Duration::from_millis(args.interval_ms));
    }
}
