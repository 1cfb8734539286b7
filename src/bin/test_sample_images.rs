use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use opencv::{
    core::Vector,
    imgcodecs::{self, IMREAD_COLOR},
    prelude::*,
};

use vision_2014::{config::CalibrationConfig, overlay, pipeline::VisionPipeline};

#[derive(Debug, Parser)]
#[command(about = "Run the pipeline over saved frames and write annotated copies")]
struct Args {
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Directory for annotated images.
    #[arg(long, default_value = "annotated")]
    out_dir: PathBuf,

    /// Also write each frame's result as JSON next to the annotated image.
    #[arg(long)]
    json: bool,

    #[arg(required = true)]
    image_paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        CalibrationConfig::load(&args.config)?
    } else {
        info!("No config at {}, using defaults", args.config.display());
        CalibrationConfig::default()
    };

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let mut pipeline = VisionPipeline::new()?;

    for path in &args.image_paths {
        let path_str = path.to_string_lossy();
        let frame = imgcodecs::imread(&path_str, IMREAD_COLOR)
            .with_context(|| format!("Failed to read {}", path_str))?;

        if frame.empty() {
            bail!("{} is not a readable image", path_str);
        }

        let result = pipeline.process_frame(&frame, &config)?;
        println!("{}: {}", path_str, result);

        let annotated =
            overlay::annotate(pipeline.display_image(&frame, &config), &result, &config)?;

        let file_name = path
            .file_name()
            .with_context(|| format!("{} has no file name", path_str))?;
        let out_path = args.out_dir.join(file_name);

        imgcodecs::imwrite(&out_path.to_string_lossy(), &annotated, &Vector::<i32>::new())
            .with_context(|| format!("Failed to write {}", out_path.display()))?;

        if args.json {
            let json_file = fs::File::create(out_path.with_extension("json"))?;
            serde_json::to_writer_pretty(json_file, &result)?;
        }
    }

    Ok(())
}
