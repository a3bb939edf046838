use crate::geometry::Region;
use crate::hyphenate::DEFAULT_MAX_BREAK_POINTS;
use crate::theme::Palette;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    pub font_family: String,
    pub font_size: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
        }
    }
}

/// Size optimization of leaf labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// When false, labels are placed at cell centroids without searching.
    pub enabled: bool,
    /// Rotation increment in degrees; `None` keeps every label horizontal.
    pub rotation_step: Option<f64>,
    pub hyphenation: bool,
    /// Half-size of the square each ink pixel contributes to the hull.
    pub hull_margin: f64,
    /// Inset from the cell edges for centroid placement.
    pub centering_margin: f64,
    pub center_translation: bool,
    pub centering_slack: f64,
    /// Hyphenation points considered per label; each one doubles the candidates.
    /// Defaults to [`DEFAULT_MAX_BREAK_POINTS`]; `None` lifts the cap.
    pub max_break_points: Option<usize>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation_step: Some(30.0),
            hyphenation: false,
            hull_margin: 1.5,
            centering_margin: 2.0,
            center_translation: true,
            centering_slack: 1e-6,
            max_break_points: Some(DEFAULT_MAX_BREAK_POINTS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TessellationConfig {
    pub convergence_ratio: f64,
    pub max_iteration_count: usize,
    pub min_weight_ratio: f64,
    pub seed: u32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            convergence_ratio: 0.001,
            max_iteration_count: 50,
            min_weight_ratio: 0.01,
            seed: 0,
        }
    }
}

/// Maps raw leaf weights to the values the tessellation balances cell areas by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WeightTransform {
    Identity,
    #[default]
    Sqrt,
    /// Linear map of the raw weight extent onto `[min, max]`.
    Linear { min: f64, max: f64 },
}

impl WeightTransform {
    /// Transformed weight of `weight`, given the extent of all raw weights.
    pub fn apply(self, weight: f64, extent: (f64, f64)) -> f64 {
        match self {
            WeightTransform::Identity => weight,
            WeightTransform::Sqrt => weight.sqrt(),
            WeightTransform::Linear { min, max } => {
                let (lo, hi) = extent;
                if hi > lo {
                    min + (weight - lo) / (hi - lo) * (max - min)
                } else {
                    (min + max) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub text: TextConfig,
    pub fit: FitConfig,
    pub tessellation: TessellationConfig,
    pub weight_transform: WeightTransform,
    pub palette: Palette,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub region: Region,
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SizeOptimizationFile {
    enabled: Option<bool>,
    rotation_step: Option<f64>,
    hyphenation: Option<bool>,
    hull_margin: Option<f64>,
    centering_margin: Option<f64>,
    center_translation: Option<bool>,
    centering_slack: Option<f64>,
    max_break_points: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TessellationFile {
    convergence_ratio: Option<f64>,
    max_iteration_count: Option<usize>,
    min_weight_ratio: Option<f64>,
    seed: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    region: Option<Region>,
    font_family: Option<String>,
    font_size: Option<f64>,
    palette: Option<Palette>,
    weight_transform: Option<WeightTransform>,
    size_optimization: Option<SizeOptimizationFile>,
    tessellation: Option<TessellationFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(region) = parsed.region {
        config.region = region;
    }
    let layout = &mut config.layout;
    if let Some(v) = parsed.font_family {
        layout.text.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        anyhow::ensure!(v > 0.0, "fontSize must be positive, got {v}");
        layout.text.font_size = v;
    }
    if let Some(v) = parsed.palette {
        layout.palette = v;
    }
    if let Some(v) = parsed.weight_transform {
        layout.weight_transform = v;
    }

    if let Some(fit) = parsed.size_optimization {
        if let Some(v) = fit.enabled {
            layout.fit.enabled = v;
        }
        if let Some(v) = fit.rotation_step {
            // Zero or negative steps disable rotation.
            layout.fit.rotation_step = (v > 0.0).then_some(v);
        }
        if let Some(v) = fit.hyphenation {
            layout.fit.hyphenation = v;
        }
        if let Some(v) = fit.hull_margin {
            layout.fit.hull_margin = v;
        }
        if let Some(v) = fit.centering_margin {
            layout.fit.centering_margin = v;
        }
        if let Some(v) = fit.center_translation {
            layout.fit.center_translation = v;
        }
        if let Some(v) = fit.centering_slack {
            layout.fit.centering_slack = v;
        }
        if let Some(v) = fit.max_break_points {
            layout.fit.max_break_points = Some(v);
        }
    }

    if let Some(tess) = parsed.tessellation {
        if let Some(v) = tess.convergence_ratio {
            layout.tessellation.convergence_ratio = v;
        }
        if let Some(v) = tess.max_iteration_count {
            layout.tessellation.max_iteration_count = v;
        }
        if let Some(v) = tess.min_weight_ratio {
            layout.tessellation.min_weight_ratio = v;
        }
        if let Some(v) = tess.seed {
            layout.tessellation.seed = v;
        }
    }

    Ok(config)
}
