//! SVG font export.
//!
//! Legacy `<font>` documents are still consumed by some icon tooling; outlines
//! are drawn unhinted in font units.

use std::fmt::Write;

use anyhow::{Context, Result, anyhow};
use skrifa::{
    FontRef, GlyphId, MetadataProvider,
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
    raw::{TableProvider, types::GlyphId16},
    string::StringId,
};

/// Collects outline commands as SVG path data.
#[derive(Default)]
struct SvgPathPen {
    d: String,
}

fn num(v: f32) -> String {
    if v.fract() == 0.0 { format!("{}", v as i32) } else { format!("{}", (v * 100.0).round() / 100.0) }
}

impl SvgPathPen {
    fn push(&mut self, command: char, coords: &[f32]) {
        self.d.push(command);
        let coords: Vec<String> = coords.iter().map(|v| num(*v)).collect();
        self.d.push_str(&coords.join(" "));
    }
}

impl OutlinePen for SvgPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push('M', &[x, y]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push('L', &[x, y]);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.push('Q', &[cx0, cy0, x, y]);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.push('C', &[cx0, cy0, cx1, cy1, x, y]);
    }

    fn close(&mut self) {
        self.d.push('Z');
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn english_string(font: &FontRef, id: StringId) -> Option<String> {
    font.localized_strings(id).english_or_first().map(|s| s.to_string())
}

/// Convert a TrueType font into an SVG font document.
pub fn encode_svg_font(ttf: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(ttf).context("Failed to parse font")?;
    let metrics = font.metrics(Size::unscaled(), LocationRef::default());
    let glyph_metrics = font.glyph_metrics(Size::unscaled(), LocationRef::default());
    let outlines = font.outline_glyphs();
    let post = font.post().ok();

    let family = english_string(&font, StringId::FAMILY_NAME).unwrap_or_default();
    let font_id = english_string(&font, StringId::POSTSCRIPT_NAME).unwrap_or_else(|| family.clone());
    let weight = font.os2().map(|os2| os2.us_weight_class()).unwrap_or(400);

    let draw = |gid: GlyphId| -> Result<String> {
        let mut pen = SvgPathPen::default();
        if let Some(glyph) = outlines.get(gid) {
            let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
            glyph
                .draw(settings, &mut pen)
                .map_err(|e| anyhow!("Failed to draw glyph {}: {e}", gid.to_u32()))?;
        }
        Ok(pen.d)
    };
    let advance = |gid: GlyphId| num(glyph_metrics.advance_width(gid).unwrap_or(0.0));

    let mut svg = String::new();
    writeln!(svg, r#"<?xml version="1.0" standalone="no"?>"#)?;
    writeln!(
        svg,
        r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#
    )?;
    writeln!(svg, r#"<svg xmlns="http://www.w3.org/2000/svg">"#)?;
    writeln!(svg, "<defs>")?;
    writeln!(
        svg,
        r#"<font id="{}" horiz-adv-x="{}">"#,
        escape_xml(&font_id),
        metrics.units_per_em
    )?;
    writeln!(
        svg,
        r#"<font-face font-family="{}" font-weight="{weight}" font-stretch="normal" units-per-em="{}" ascent="{}" descent="{}" />"#,
        escape_xml(&family),
        metrics.units_per_em,
        num(metrics.ascent),
        num(metrics.descent),
    )?;

    let notdef = GlyphId::new(0);
    writeln!(svg, r#"<missing-glyph horiz-adv-x="{}" d="{}" />"#, advance(notdef), draw(notdef)?)?;

    for (codepoint, gid) in font.charmap().mappings() {
        let name = post
            .as_ref()
            .and_then(|post| post.glyph_name(GlyphId16::new(gid.to_u32() as u16)))
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("uni{codepoint:04X}"));
        let d = draw(gid)?;
        write!(
            svg,
            r#"<glyph glyph-name="{}" unicode="&#x{codepoint:x};" horiz-adv-x="{}""#,
            escape_xml(&name),
            advance(gid)
        )?;
        if d.is_empty() {
            writeln!(svg, " />")?;
        } else {
            writeln!(svg, r#" d="{d}" />"#)?;
        }
    }

    writeln!(svg, "</font>")?;
    writeln!(svg, "</defs>")?;
    writeln!(svg, "</svg>")?;
    Ok(svg.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(100.0), "100");
        assert_eq!(num(-200.0), "-200");
        assert_eq!(num(12.345), "12.35");
    }

    #[test]
    fn pen_emits_path_data() {
        let mut pen = SvgPathPen::default();
        pen.move_to(0.0, 0.0);
        pen.line_to(10.0, 0.0);
        pen.quad_to(10.0, 10.0, 0.0, 10.0);
        pen.close();
        assert_eq!(pen.d, "M0 0L10 0Q10 10 0 10Z");
    }

    #[test]
    fn xml_escaping() {
        assert_eq!(escape_xml(r#"A & "B" <C>"#), "A &amp; &quot;B&quot; &lt;C&gt;");
    }
}
