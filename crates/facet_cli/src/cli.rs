use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use facet_core::{Projection, RenderParameters};
use facet_renderer::{RenderConfig, DEFAULT_MAX_BOUNCES};
use log::LevelFilter;

use crate::demo;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "facet")]
#[command(about = "Raytrace a demo mesh scene to a PNG")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Render parameters JSON (projection, toggles, camera, lights)
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Orthographic instead of perspective projection
    #[arg(long)]
    pub ortho: bool,

    /// Show interpolated normals as colors
    #[arg(long)]
    pub normals: bool,

    /// Blinn-Phong lighting
    #[arg(long)]
    pub phong: bool,

    /// Blinn-Phong lighting with shadow rays
    #[arg(long)]
    pub shadows: bool,

    /// Mirror reflections (implies shadows)
    #[arg(long)]
    pub reflections: bool,

    /// Maximum reflection bounces
    #[arg(long, default_value_t = DEFAULT_MAX_BOUNCES)]
    pub bounces: u32,

    /// Worker threads (defaults to one per hardware thread)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    /// Parameters from `--params` (or the demo defaults), with flags layered on top.
    pub fn render_parameters(&self) -> Result<RenderParameters> {
        let mut params = match &self.params {
            Some(path) => RenderParameters::load(path)
                .with_context(|| format!("Failed to load render parameters from {}", path.display()))?,
            None => RenderParameters {
                lights: demo::lights(),
                ..Default::default()
            },
        };

        if self.ortho {
            params.projection = Projection::Orthographic;
        }
        params.interpolation_rendering |= self.normals;
        params.phong_enabled |= self.phong;
        params.shadows_enabled |= self.shadows;
        params.reflections_enabled |= self.reflections;

        Ok(params)
    }

    pub fn render_config(&self) -> RenderConfig {
        let config = RenderConfig::default()
            .with_resolution(self.width, self.height)
            .with_max_bounces(self.bounces);

        match self.threads {
            Some(threads) => config.with_threads(threads),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["facet"]);
        assert_eq!((args.width, args.height), (640, 480));
        assert_eq!(args.bounces, DEFAULT_MAX_BOUNCES);
        assert_eq!(args.output, PathBuf::from("render.png"));

        let params = args.render_parameters().expect("params");
        assert!(params.is_perspective());
        assert!(!params.reflections_enabled);
        assert_eq!(params.lights.len(), demo::lights().len());
    }

    #[test]
    fn test_flags_override_parameters() {
        let args = Args::parse_from([
            "facet", "--ortho", "--shadows", "--reflections", "--bounces", "2", "--threads", "3",
            "--width", "32", "--height", "16",
        ]);

        let params = args.render_parameters().expect("params");
        assert_eq!(params.projection, Projection::Orthographic);
        assert!(params.shadows_enabled);
        assert!(params.reflections_enabled);
        assert!(!params.phong_enabled);

        let config = args.render_config();
        assert_eq!((config.width, config.height), (32, 16));
        assert_eq!(config.max_bounces, 2);
        assert_eq!(config.threads, Some(3));
    }

    #[test]
    fn test_missing_params_file_is_an_error() {
        let args = Args::parse_from(["facet", "--params", "/nonexistent/facet-params.json"]);
        assert!(args.render_parameters().is_err());
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::Debug);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::Error);
    }
}
