//! sprite-export library
//!
//! Converts PNG sprites into C headers holding RGB565 pixel arrays, with a
//! color key standing in for transparency. Usable from other tools without
//! going through the CLI.

pub mod batch;
pub mod color;
pub mod config;
pub mod header;
pub mod naming;
pub mod sanitize;

// Re-export the pure conversion core
pub use color::{
    pack_pixel, pack_rgb565, ColorKey, Rgba, DEFAULT_ALPHA_THRESHOLD, DEFAULT_COLOR_KEY,
};
pub use header::{
    build_header, HeaderArtifact, HeaderError, HeaderIdentifiers, HeaderOptions, HeaderSource,
};
pub use sanitize::sanitize_identifier;

// Re-export batch entry points
pub use batch::{convert_single, run_batch, BatchSummary, ItemError};
pub use config::{ConfigOverrides, ExportConfig};
pub use naming::{AnimationMap, NamingError, NamingMode};
