#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod fit;
pub mod geometry;
pub mod hyphenate;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod raster;
pub mod theme;
pub mod worker;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, FitConfig, LayoutConfig, TessellationConfig, TextConfig, WeightTransform, load_config};
pub use fit::{AffineFit, FitError};
pub use geometry::{ClipPolygon, Point, Region};
pub use ir::{LeafRecord, parse_records};
pub use layout::{Layout, LayoutEngine, LayoutError, LayoutRequest, compute_layout};
pub use worker::{LayoutWorker, RequestId};
