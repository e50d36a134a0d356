//! Interactive hand motion analysis: a form on the terminal, one plot per round.

use anyhow::{Context, Result};
use clap::Parser;
use hand_motion_analysis::{
    config::Config,
    dataset::{CachedCoordinateStore, CoordinateSource, CoordinateStore, MetadataStore},
    interactive::{Prompt, Session, TerminalPrompt},
    pipeline::Analyzer,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding meta.json and the coordinate arrays
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory receiving the preview image
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn run_session<P: Prompt, S: CoordinateSource>(prompt: P, metadata: &MetadataStore, source: &S, config: &Config) -> Result<()> {
    let analyzer = Analyzer::new(metadata, source, config.analysis.angle_policy);
    let mut session = Session::new(prompt, analyzer, config);
    let rendered = session.run()?;
    info!("Rendered {rendered} plots");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Motion Analysis - interactive");

    let config = Config::load_or_default(args.config.as_deref()).with_dirs(args.data_dir, args.output_dir);
    config.validate()?;

    let metadata_path = config.data.metadata_path();
    let metadata = MetadataStore::from_file(&metadata_path)
        .with_context(|| format!("Failed to load metadata from {}", metadata_path.display()))?;
    let store = CoordinateStore::new(&config.data.coordinate_dir);
    let prompt = TerminalPrompt::new()?;

    if config.interactive.cache_coordinates {
        run_session(prompt, &metadata, &CachedCoordinateStore::new(store), &config)
    } else {
        run_session(prompt, &metadata, &store, &config)
    }
}
