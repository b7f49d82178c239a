// file: src/visualization/mod.rs
// description: SVG charts and network maps
// reference: internal module structure

pub mod charts;
pub mod style;
pub mod svg;

pub use charts::{MapStyle, plot_author_map, plot_keywords, plot_theme_clusters, plot_vos_map};
pub use style::SizingMode;
pub use svg::SvgCanvas;
