//! Error types for font compilation.

use std::result;

use write_fonts::BuilderError;

use crate::cmap::Encoding;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unitsPerEm must be between 16 and 16384, got {0}")]
    InvalidUnitsPerEm(u16),

    #[error("codepoint U+{0:04X} is assigned to more than one glyph")]
    DuplicateCodepoint(u32),

    #[error("U+{0:04X} is not a valid Unicode scalar value")]
    InvalidCodepoint(u32),

    #[error("U+{codepoint:04X} is outside the {encoding:?} encoding")]
    CodepointOutsideEncoding { codepoint: u32, encoding: Encoding },

    #[error("glyph '{glyph}' has a point at ({x}, {y}) outside the 16-bit coordinate range")]
    CoordinateOutOfRange { glyph: String, x: f64, y: f64 },

    #[error("a font holds at most 65535 glyphs, got {0}")]
    TooManyGlyphs(usize),

    #[error("failed to build cmap table")]
    CmapBuildError,

    #[error("failed to serialize glyph: {0}")]
    Glyph(#[from] write_fonts::error::Error),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),
}

pub type Result<T> = result::Result<T, Error>;
