use anyhow::{Context, Result};
use clap::Parser;
use facet_renderer::{InFlightPolicy, RenderSession};
use log::info;

mod cli;
mod demo;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let params = args.render_parameters()?;
    let config = args.render_config();
    let meshes = demo::meshes();

    info!(
        "Facet: {}x{}, {:?} projection, output {}",
        config.width,
        config.height,
        params.projection,
        args.output.display()
    );

    let mut session = RenderSession::new(config.width, config.height);
    session
        .request(&meshes, &params, config, InFlightPolicy::Discard)
        .context("Failed to start render")?;
    session.wait().context("Render failed")?;

    session
        .front()
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
