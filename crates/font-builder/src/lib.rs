//! # Font Builder
//!
//! Compile a set of icon outlines into a TrueType font.
//!
//! Glyph 0 is always a hollow `.notdef` box; the icons follow in the order
//! they were added, each mapped to one codepoint.
//!
//! ## Example
//!
//! ```no_run
//! use font_builder::{FontInfo, GlyphSpec, IconFontBuilder};
//! use kurbo::{Rect, Shape};
//!
//! let mut builder = IconFontBuilder::new(FontInfo::default());
//! builder
//!     .add_glyph(GlyphSpec {
//!         name: "square".into(),
//!         codepoint: 0xE900,
//!         outline: Rect::new(100.0, 0.0, 900.0, 800.0).to_path(0.1),
//!         advance_width: 1000.0,
//!     })
//!     .unwrap();
//! let ttf: Vec<u8> = builder.build().unwrap();
//! ```

pub mod cmap;
mod error;
pub mod names;
pub mod outline;
pub mod tables;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use font_types::GlyphId;
use kurbo::{BezPath, Rect, Shape};
use log::debug;
use write_fonts::{FontBuilder, tables::glyf::GlyfLocaBuilder};

pub use cmap::Encoding;
pub use error::{Error, Result};
pub use names::NameEntry;
pub use outline::CompiledGlyph;

use crate::{
    cmap::build_cmap,
    names::{build_name_table, unique_glyph_names},
    outline::compile_outline,
    tables::{
        FontMetrics, build_head, build_hhea, build_hmtx, build_maxp, build_os2, build_post,
    },
};

const NOTDEF: &str = ".notdef";

/// Naming and vertical metrics for the generated font.
#[derive(Debug, Clone)]
pub struct FontInfo {
    pub family_name: String,
    pub style_name: String,
    pub full_name: String,
    pub postscript_name: String,
    pub version: String,
    pub copyright: Option<String>,
    pub units_per_em: u16,
    pub ascent: u16,
    pub descent: u16,
    pub weight_class: u16,
    pub width_class: u16,
    pub vendor_id: [u8; 4],
    pub panose: [u8; 10],
    pub italic_angle: f64,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub encoding: Encoding,
    /// Written to `head.created` and `head.modified`.
    pub timestamp: DateTime<Utc>,
    pub extra_names: Vec<NameEntry>,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            family_name: "Untitled".to_string(),
            style_name: "Regular".to_string(),
            full_name: "Untitled".to_string(),
            postscript_name: "Untitled".to_string(),
            version: "1.0".to_string(),
            copyright: None,
            units_per_em: 1000,
            ascent: 800,
            descent: 200,
            weight_class: 400,
            width_class: 5,
            vendor_id: *b"NONE",
            panose: [0; 10],
            italic_angle: 0.0,
            underline_position: -100,
            underline_thickness: 50,
            encoding: Encoding::default(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            extra_names: Vec::new(),
        }
    }
}

/// One icon in font units.
#[derive(Debug, Clone)]
pub struct GlyphSpec {
    pub name: String,
    pub codepoint: u32,
    pub outline: BezPath,
    pub advance_width: f64,
}

pub struct IconFontBuilder {
    info: FontInfo,
    glyphs: Vec<GlyphSpec>,
    codepoints: HashSet<u32>,
}

impl IconFontBuilder {
    pub fn new(info: FontInfo) -> Self {
        Self { info, glyphs: Vec::new(), codepoints: HashSet::new() }
    }

    pub fn add_glyph(&mut self, glyph: GlyphSpec) -> Result<&mut Self> {
        if !self.codepoints.insert(glyph.codepoint) {
            return Err(Error::DuplicateCodepoint(glyph.codepoint));
        }
        self.glyphs.push(glyph);
        Ok(self)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Serialize the font to TrueType bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        let info = &self.info;
        if !(16..=16384).contains(&info.units_per_em) {
            return Err(Error::InvalidUnitsPerEm(info.units_per_em));
        }
        let num_glyphs = self.glyphs.len() + 1;
        let num_glyphs_u16 =
            u16::try_from(num_glyphs).map_err(|_| Error::TooManyGlyphs(num_glyphs))?;

        let mut compiled = Vec::with_capacity(num_glyphs);
        let mut advances = Vec::with_capacity(num_glyphs);

        let (notdef, notdef_advance) = notdef_outline(info);
        compiled.push(compile_outline(NOTDEF, &notdef)?);
        advances.push(notdef_advance);

        for glyph in &self.glyphs {
            compiled.push(compile_outline(&glyph.name, &glyph.outline)?);
            advances.push(glyph.advance_width.round().clamp(0.0, f64::from(u16::MAX)) as u16);
        }

        let glyph_names = std::iter::once(NOTDEF.to_string())
            .chain(unique_glyph_names(self.glyphs.iter().map(|g| g.name.as_str())))
            .collect::<Vec<_>>();

        let mut mappings: Vec<(u32, GlyphId)> = (1..)
            .zip(&self.glyphs)
            .map(|(gid, glyph)| (glyph.codepoint, GlyphId::new(gid)))
            .collect();
        mappings.sort_by_key(|&(codepoint, _)| codepoint);
        let cmap = build_cmap(&mappings, info.encoding)?;

        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &compiled {
            glyf_builder.add_glyph(&glyph.glyph)?;
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let metrics = FontMetrics::collect(&compiled, &advances);
        let codepoints: Vec<u32> = self.glyphs.iter().map(|g| g.codepoint).collect();
        debug!(
            "compiling {} glyphs, bbox ({}, {}) - ({}, {})",
            num_glyphs, metrics.x_min, metrics.y_min, metrics.x_max, metrics.y_max
        );

        let mut builder = FontBuilder::new();
        builder.add_table(&build_head(info, &metrics, loca_format))?;
        builder.add_table(&build_hhea(info, &metrics, num_glyphs_u16))?;
        builder.add_table(&build_maxp(&metrics, num_glyphs_u16))?;
        builder.add_table(&build_os2(info, &metrics, &codepoints))?;
        builder.add_table(&build_hmtx(&compiled, &advances))?;
        builder.add_table(&cmap)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        builder.add_table(&build_name_table(info))?;
        builder.add_table(&build_post(info, &glyph_names))?;

        Ok(builder.build())
    }
}

/// A hollow rectangle half an em wide, standing on the baseline.
fn notdef_outline(info: &FontInfo) -> (BezPath, u16) {
    let em = f64::from(info.units_per_em);
    let advance = (em / 2.0).round();
    let margin = (em / 20.0).round();
    let height = f64::from(info.ascent).min(em * 0.7).round();

    let outer = Rect::new(margin, 0.0, advance - margin, height);
    let inner = outer.inset(-margin);

    let mut path = outer.to_path(0.1);
    path.extend(inner.path_elements(0.1));
    (path, advance as u16)
}
