use crate::config::{Config, WeightTransform, load_config};
use crate::geometry::{ClipPolygon, Region};
use crate::ir::parse_records;
use crate::layout::{LayoutEngine, LayoutRequest};
use crate::layout_dump::write_layout_dump;
use crate::raster::BlockRasterizer;
use crate::theme::Palette;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "vwc", version, about = "Voronoi treemap word cloud layout")]
pub struct Args {
    /// Input file (JSON5 array of {label, weight, cluster}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Clip region preset
    #[arg(short = 'r', long = "region", value_enum)]
    pub region: Option<Region>,

    #[arg(long = "fontFamily")]
    pub font_family: Option<String>,

    #[arg(long = "fontSize")]
    pub font_size: Option<f64>,

    #[arg(short = 'p', long = "palette", value_enum)]
    pub palette: Option<Palette>,

    /// Rotation increment in degrees
    #[arg(long = "rotationStep", conflicts_with = "no_rotation")]
    pub rotation_step: Option<f64>,

    /// Keep every label horizontal
    #[arg(long = "noRotation")]
    pub no_rotation: bool,

    /// Allow breaking labels at hyphenation points
    #[arg(long = "hyphenation")]
    pub hyphenation: bool,

    /// Place labels at cell centroids without size optimization
    #[arg(long = "noOptimization")]
    pub no_optimization: bool,

    #[arg(short = 'w', long = "weightTransform", value_enum)]
    pub weight_transform: Option<WeightTransformArg>,

    /// Tessellation random seed
    #[arg(long = "seed")]
    pub seed: Option<u32>,

    #[arg(long = "rasterizer", value_enum, default_value = "font")]
    pub rasterizer: RasterizerArg,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum WeightTransformArg {
    Identity,
    Sqrt,
    /// Linear map onto [1, 30]
    Linear,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RasterizerArg {
    /// System font outlines
    Font,
    /// Solid blocks per character
    Block,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = apply_args(load_config(args.config.as_deref())?, &args);

    let input = read_input(args.input.as_deref())?;
    let records = parse_records(&input).context("failed to parse input records")?;
    tracing::info!(records = records.len(), region = ?config.region, "computing layout");

    let mut engine = LayoutEngine::new();
    if matches!(args.rasterizer, RasterizerArg::Block) {
        engine = engine.with_rasterizer(BlockRasterizer);
    }
    let request = LayoutRequest {
        records,
        clip: ClipPolygon::from(config.region),
        config: config.layout,
    };
    let layout = engine.compute(&request)?;
    write_layout_dump(args.output.as_deref(), &layout)
}

fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(region) = args.region {
        config.region = region;
    }
    let layout = &mut config.layout;
    if let Some(family) = &args.font_family {
        layout.text.font_family = family.clone();
    }
    if let Some(size) = args.font_size.filter(|s| *s > 0.0) {
        layout.text.font_size = size;
    }
    if let Some(palette) = args.palette {
        layout.palette = palette;
    }
    if let Some(step) = args.rotation_step {
        layout.fit.rotation_step = (step > 0.0).then_some(step);
    }
    if args.no_rotation {
        layout.fit.rotation_step = None;
    }
    if args.hyphenation {
        layout.fit.hyphenation = true;
    }
    if args.no_optimization {
        layout.fit.enabled = false;
    }
    if let Some(transform) = args.weight_transform {
        layout.weight_transform = match transform {
            WeightTransformArg::Identity => WeightTransform::Identity,
            WeightTransformArg::Sqrt => WeightTransform::Sqrt,
            WeightTransformArg::Linear => WeightTransform::Linear { min: 1.0, max: 30.0 },
        };
    }
    if let Some(seed) = args.seed {
        layout.tessellation.seed = seed;
    }
    config
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
