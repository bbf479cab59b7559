//! # SVG Import
//!
//! Turn SVG icons into filled outlines that can be compiled into a font.
//!
//! Every filled shape in the document is flattened into a single
//! [`kurbo::BezPath`] in SVG user space, with group and element transforms
//! applied. [`SvgIcon::place`] then maps the viewport into the em square of
//! the target font.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use svg_import::{EmBox, SvgIcon};
//!
//! let icon = SvgIcon::load(Path::new("icons/home.svg")).unwrap();
//! let outline = icon.place(EmBox { units_per_em: 1000, ascent: 800 });
//! println!("advance: {}", outline.advance_width);
//! ```

mod document;
mod error;
mod shapes;
mod transform;

pub use document::{EmBox, PlacedOutline, SvgIcon};
pub use error::{Error, Result};
pub use transform::parse_transform;
