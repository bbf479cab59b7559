//! Construction of the fixed-layout sfnt tables.

use chrono::{DateTime, Utc};
use font_types::{FWord, Fixed, LongDateTime, Tag, UfWord};
use write_fonts::tables::{
    head::{Flags, Head, MacStyle},
    hhea::Hhea,
    hmtx::{Hmtx, LongMetric},
    loca::LocaFormat,
    maxp::Maxp,
    os2::{Os2, SelectionFlags},
    post::Post,
};

use crate::{FontInfo, outline::CompiledGlyph};

/// Seconds between the TrueType epoch (1904-01-01) and the Unix epoch.
const SECONDS_1904_TO_1970: i64 = 2_082_844_800;

/// `ulUnicodeRange2` bit for the Private Use Area (bit 60 overall).
const UNICODE_RANGE_2_PUA: u32 = 1 << 28;

/// `ulCodePageRange1` bit for Latin 1.
const CODE_PAGE_LATIN_1: u32 = 1;

const PUA_START: u32 = 0xE000;
const PUA_END: u32 = 0xF8FF;

/// Aggregate outline statistics shared by several tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMetrics {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub avg_char_width: i16,
    pub max_points: u16,
    pub max_contours: u16,
}

impl FontMetrics {
    pub fn collect(glyphs: &[CompiledGlyph], advances: &[u16]) -> Self {
        let mut metrics = Self::default();
        let mut any_bbox = false;

        for (glyph, &advance) in glyphs.iter().zip(advances) {
            metrics.advance_width_max = metrics.advance_width_max.max(advance);
            metrics.max_points = metrics.max_points.max(glyph.num_points);
            metrics.max_contours = metrics.max_contours.max(glyph.num_contours);

            let Some(bbox) = glyph.bbox else { continue };
            let rsb = (i32::from(advance) - i32::from(bbox.x_max)).clamp(-32768, 32767) as i16;
            if any_bbox {
                metrics.x_min = metrics.x_min.min(bbox.x_min);
                metrics.y_min = metrics.y_min.min(bbox.y_min);
                metrics.x_max = metrics.x_max.max(bbox.x_max);
                metrics.y_max = metrics.y_max.max(bbox.y_max);
                metrics.min_left_side_bearing = metrics.min_left_side_bearing.min(bbox.x_min);
                metrics.min_right_side_bearing = metrics.min_right_side_bearing.min(rsb);
                metrics.x_max_extent = metrics.x_max_extent.max(bbox.x_max);
            } else {
                metrics.x_min = bbox.x_min;
                metrics.y_min = bbox.y_min;
                metrics.x_max = bbox.x_max;
                metrics.y_max = bbox.y_max;
                metrics.min_left_side_bearing = bbox.x_min;
                metrics.min_right_side_bearing = rsb;
                metrics.x_max_extent = bbox.x_max;
                any_bbox = true;
            }
        }

        let nonzero: Vec<u32> = advances.iter().filter(|a| **a > 0).map(|a| u32::from(*a)).collect();
        if !nonzero.is_empty() {
            let avg = nonzero.iter().sum::<u32>() as f64 / nonzero.len() as f64;
            metrics.avg_char_width = avg.round().min(f64::from(i16::MAX)) as i16;
        }

        metrics
    }
}

/// Style bits derived from the style name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleBits {
    pub bold: bool,
    pub italic: bool,
}

impl StyleBits {
    pub fn from_style_name(style: &str) -> Self {
        let lower = style.to_ascii_lowercase();
        Self {
            bold: lower.contains("bold"),
            italic: lower.contains("italic") || lower.contains("oblique"),
        }
    }
}

pub fn long_date_time(timestamp: DateTime<Utc>) -> LongDateTime {
    LongDateTime::new(timestamp.timestamp() + SECONDS_1904_TO_1970)
}

/// Read a leading `major.minor` number from a free-form version string.
pub fn font_revision(version: &str) -> Fixed {
    let numeric: String = version
        .trim_start_matches("Version ")
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value = numeric.trim_end_matches('.').parse::<f64>().unwrap_or(1.0);
    Fixed::from_f64(value)
}

pub fn build_head(info: &FontInfo, metrics: &FontMetrics, loca_format: LocaFormat) -> Head {
    let style = StyleBits::from_style_name(&info.style_name);
    let mac_style = u16::from(style.bold) | (u16::from(style.italic) << 1);
    let timestamp = long_date_time(info.timestamp);

    Head {
        font_revision: font_revision(&info.version),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        // baseline at y=0, integer ppem
        flags: Flags::from_bits_truncate(0x0001 | 0x0008),
        units_per_em: info.units_per_em,
        created: timestamp,
        modified: timestamp,
        x_min: metrics.x_min,
        y_min: metrics.y_min,
        x_max: metrics.x_max,
        y_max: metrics.y_max,
        mac_style: MacStyle::from_bits_truncate(mac_style),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    }
}

pub fn build_hhea(info: &FontInfo, metrics: &FontMetrics, num_glyphs: u16) -> Hhea {
    Hhea {
        ascender: FWord::new(info.ascent as i16),
        descender: FWord::new(-(info.descent as i16)),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(metrics.advance_width_max),
        min_left_side_bearing: FWord::new(metrics.min_left_side_bearing),
        min_right_side_bearing: FWord::new(metrics.min_right_side_bearing),
        x_max_extent: FWord::new(metrics.x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    }
}

pub fn build_hmtx(glyphs: &[CompiledGlyph], advances: &[u16]) -> Hmtx {
    let h_metrics = glyphs
        .iter()
        .zip(advances)
        .map(|(glyph, &advance)| LongMetric {
            advance,
            side_bearing: glyph.bbox.map(|b| b.x_min).unwrap_or(0),
        })
        .collect();
    Hmtx { h_metrics, left_side_bearings: vec![] }
}

pub fn build_maxp(metrics: &FontMetrics, num_glyphs: u16) -> Maxp {
    Maxp {
        num_glyphs,
        max_points: Some(metrics.max_points),
        max_contours: Some(metrics.max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    }
}

pub fn build_os2(info: &FontInfo, metrics: &FontMetrics, codepoints: &[u32]) -> Os2 {
    let style = StyleBits::from_style_name(&info.style_name);
    let fs_selection = match (style.bold, style.italic) {
        (false, false) => SelectionFlags::REGULAR,
        (true, false) => SelectionFlags::BOLD,
        (false, true) => SelectionFlags::ITALIC,
        (true, true) => SelectionFlags::BOLD | SelectionFlags::ITALIC,
    };

    let has_pua = codepoints.iter().any(|cp| (PUA_START..=PUA_END).contains(cp));
    let first_char = codepoints.iter().min().map(|cp| (*cp).min(0xFFFF) as u16).unwrap_or(0);
    let last_char = codepoints.iter().max().map(|cp| (*cp).min(0xFFFF) as u16).unwrap_or(0);

    let ascent = i32::from(info.ascent);
    let descent = i32::from(info.descent);
    let em = i32::from(info.units_per_em);
    let em_fraction = |num: i32, den: i32| (em * num / den) as i16;

    Os2 {
        x_avg_char_width: metrics.avg_char_width,
        us_weight_class: info.weight_class,
        us_width_class: info.width_class,
        fs_type: 0,
        y_subscript_x_size: em_fraction(13, 20),
        y_subscript_y_size: em_fraction(3, 5),
        y_subscript_x_offset: 0,
        y_subscript_y_offset: em_fraction(3, 40),
        y_superscript_x_size: em_fraction(13, 20),
        y_superscript_y_size: em_fraction(3, 5),
        y_superscript_x_offset: 0,
        y_superscript_y_offset: em_fraction(7, 20),
        y_strikeout_size: info.underline_thickness,
        y_strikeout_position: (ascent * 2 / 5) as i16,
        s_family_class: 0,
        panose_10: info.panose,
        ul_unicode_range_1: 0,
        ul_unicode_range_2: if has_pua { UNICODE_RANGE_2_PUA } else { 0 },
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: Tag::new(&info.vendor_id),
        fs_selection,
        us_first_char_index: first_char,
        us_last_char_index: last_char,
        s_typo_ascender: ascent as i16,
        s_typo_descender: -descent as i16,
        s_typo_line_gap: 0,
        us_win_ascent: ascent.max(i32::from(metrics.y_max)).clamp(0, 0xFFFF) as u16,
        us_win_descent: descent.max(-i32::from(metrics.y_min)).clamp(0, 0xFFFF) as u16,
        ul_code_page_range_1: Some(CODE_PAGE_LATIN_1),
        ul_code_page_range_2: Some(0),
        sx_height: Some(0),
        s_cap_height: Some(0),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    }
}

pub fn build_post(info: &FontInfo, glyph_names: &[String]) -> Post {
    let mut post = Post::new_v2(glyph_names.iter().map(String::as_str));
    post.italic_angle = Fixed::from_f64(info.italic_angle);
    post.underline_position = FWord::new(info.underline_position);
    post.underline_thickness = FWord::new(info.underline_thickness);
    post.is_fixed_pitch = 0;
    post
}
