//! Character map construction.

use font_types::GlyphId;
use write_fonts::tables::cmap::{
    Cmap, Cmap12, CmapSubtable, EncodingRecord, PlatformId, SequentialMapGroup,
};

use crate::{Error, Result};

/// Which Unicode range the font's character map covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Format 4 subtables only; codepoints must lie in the BMP.
    UnicodeBmp,
    /// Format 4 subtables plus format 12 full-repertoire subtables.
    #[default]
    UnicodeFull,
}

impl Encoding {
    pub fn max_codepoint(self) -> u32 {
        match self {
            Self::UnicodeBmp => 0xFFFF,
            Self::UnicodeFull => 0x10FFFF,
        }
    }
}

/// Build the `cmap` table for `(codepoint, glyph)` pairs sorted by codepoint.
pub fn build_cmap(mappings: &[(u32, GlyphId)], encoding: Encoding) -> Result<Cmap> {
    let chars = mappings
        .iter()
        .map(|&(codepoint, gid)| {
            if codepoint > encoding.max_codepoint() {
                return Err(Error::CodepointOutsideEncoding { codepoint, encoding });
            }
            let ch = char::from_u32(codepoint).ok_or(Error::InvalidCodepoint(codepoint))?;
            Ok((ch, gid))
        })
        .collect::<Result<Vec<_>>>()?;
    let cmap = Cmap::from_mappings(chars).map_err(|_| Error::CmapBuildError)?;
    if encoding == Encoding::UnicodeBmp {
        return Ok(cmap);
    }

    let cmap12 = Cmap12 { language: 0, groups: build_sequential_groups(mappings) };
    let (mut unicode, mut windows) = (None, None);
    for record in cmap.encoding_records {
        match (record.platform_id, record.encoding_id) {
            (PlatformId::Unicode, 3) => unicode = Some(record),
            (PlatformId::Windows, 1) => windows = Some(record),
            _ => {}
        }
    }

    // Records stay sorted by platform, then encoding.
    let mut records = Vec::with_capacity(4);
    records.extend(unicode);
    records.push(EncodingRecord::new(
        PlatformId::Unicode,
        4,
        CmapSubtable::Format12(cmap12.clone()),
    ));
    records.extend(windows);
    records.push(EncodingRecord::new(PlatformId::Windows, 10, CmapSubtable::Format12(cmap12)));
    Ok(Cmap::new(records))
}

/// Group runs of consecutive codepoints mapped to consecutive glyphs.
fn build_sequential_groups(mappings: &[(u32, GlyphId)]) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::with_capacity(mappings.len());
    for &(cp, gid) in mappings {
        let gid = gid.to_u32();
        if let Some(last) = groups.last_mut() {
            let expected_gid = last.start_glyph_id + (last.end_char_code + 1 - last.start_char_code);
            if cp == last.end_char_code + 1 && gid == expected_gid {
                last.end_char_code = cp;
                continue;
            }
        }
        groups.push(SequentialMapGroup::new(cp, cp, gid));
    }
    groups
}
