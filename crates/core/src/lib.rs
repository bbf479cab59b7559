//! Fontaweswimm Core - the icon font build pipeline.
//!
//! Reads a base config and a directory of SVG icons, compiles them into a
//! font, and renders the demo page and stylesheet from templates.

pub mod config;
pub mod glyphs;
pub mod io;
pub mod naming;
pub mod pipeline;
pub mod templates;

pub use config::{BaseConfig, DEFAULT_START_CODEPOINT, OutputFont, ResolvedConfig};
pub use glyphs::{GlyphEntry, GlyphMap, collect_glyphs, list_icons};
pub use pipeline::{
    BUILD_STEPS, CHECK_STEPS, PipelineContext, build, build_with_timestamp, check, clean,
};
