use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cardglow::config::{default_regions, load_regions};
use cardglow::roi::ocr::init_recognizer;
use cardglow::{load_image, Pipeline, TextRecognizer, UnavailableRecognizer};

#[derive(Parser)]
#[command(name = "cardglow")]
#[command(about = "Find playable cards and read fixed screen regions in a card-game screenshot")]
struct Cli {
    /// Path to the screenshot
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON file with the regions to extract (replaces the built-in list)
    #[arg(long, value_name = "FILE")]
    regions: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Directory holding the ocrs models (default: ~/.cache/ocrs)
    #[arg(long, value_name = "DIR", env = "CARDGLOW_OCR_MODELS")]
    models: Option<PathBuf>,

    /// Skip OCR; regions that request it report an error instead
    #[arg(long)]
    skip_ocr: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // stdout carries the JSON result, logs go to stderr
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let img = load_image(&args.image_path)?;

    let regions = match &args.regions {
        Some(path) => load_regions(path)?,
        None => default_regions(),
    };

    let recognizer: Box<dyn TextRecognizer> = if args.skip_ocr || regions.iter().all(|r| !r.ocr) {
        Box::new(UnavailableRecognizer)
    } else {
        init_recognizer(args.models.as_deref())
    };

    let mut pipeline = Pipeline::new()
        .with_regions(regions)
        .with_recognizer(recognizer);

    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let result = pipeline.run(&img);
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
