//! Batch renderer: analyze one clip range and save the plot as PNG.

use anyhow::{bail, Context, Result};
use clap::Parser;
use hand_motion_analysis::{
    config::Config,
    dataset::{CoordinateStore, MetadataStore},
    keypoints::KeypointId,
    pipeline::{AnalysisRequest, Analyzer},
    render::{caption, output_path, render_analysis, save_png, PlotRenderer},
    signal::AnalysisMethod,
    time_range::TimeRange,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Movie name, without extension. ex) sync_1
    #[arg(long)]
    movie: String,

    /// Range of the movie. ex) --range 1m25s 1m35s
    #[arg(long, num_args = 1.., required = true)]
    range: Vec<String>,

    /// Method of analysis
    #[arg(long, value_parser = ["track", "distance", "angle"])]
    method: String,

    /// Keypoint indices: one for track, two for distance, three for angle. ex) --keypoints 2 3 4
    #[arg(long, num_args = 1.., required = true)]
    keypoints: Vec<usize>,

    /// Directory holding meta.json and the coordinate arrays
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory receiving <method>/<file>.png
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = Config::load_or_default(args.config.as_deref()).with_dirs(args.data_dir, args.output_dir);
    config.validate()?;

    if args.range.len() != 2 {
        bail!("The number of --range should be 2. ex) --range 1m25s 1m35s");
    }
    let range = TimeRange::parse(&args.range[0], &args.range[1])?;
    let method: AnalysisMethod = args.method.parse()?;
    let keypoints = args
        .keypoints
        .iter()
        .map(|&index| KeypointId::new(index))
        .collect::<hand_motion_analysis::Result<Vec<_>>>()?;

    let request = AnalysisRequest::new(args.movie, range, method, keypoints);
    request.validate()?;

    let metadata_path = config.data.metadata_path();
    let metadata = MetadataStore::from_file(&metadata_path)
        .with_context(|| format!("Failed to load metadata from {}", metadata_path.display()))?;
    let store = CoordinateStore::new(&config.data.coordinate_dir);
    let analyzer = Analyzer::new(&metadata, &store, config.analysis.angle_policy);

    let analysis = analyzer.run(&request)?;
    info!("{}", caption(&analysis));

    let image = render_analysis(&mut PlotRenderer::new(config.render.clone()), &analysis)?;
    let path = output_path(&config.output.output_dir, &request.clip_id, &request.range, &analysis.selection);
    save_png(&image, &path)?;

    Ok(())
}
