//! Glyph naming and the `name` table.

use std::collections::{BTreeMap, HashSet};

use read_fonts::types::NameId;
use write_fonts::tables::name::{Name, NameRecord};

use crate::FontInfo;

/// Windows platform, Unicode BMP encoding.
const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;

/// English (United States).
pub const LANGUAGE_EN_US: u16 = 0x0409;

/// Longest glyph name the post table format 2 accepts in practice.
const MAX_GLYPH_NAME_LEN: usize = 63;

/// A `name` table record in addition to the ones derived from [`FontInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub language_id: u16,
    pub name_id: u16,
    pub value: String,
}

impl NameEntry {
    pub fn new(language_id: u16, name_id: u16, value: impl Into<String>) -> Self {
        Self { language_id, name_id, value: value.into() }
    }
}

/// Reduce an arbitrary label to a PostScript-safe glyph name.
///
/// Keeps ASCII letters, digits, `.` and `_`; everything else becomes `_`.
/// Names may not start with a digit or a period.
pub fn sanitize_glyph_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '_' })
        .collect();

    if name.is_empty() {
        name.push_str("glyph");
    }
    if name.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        name.insert(0, 'g');
    }
    name.truncate(MAX_GLYPH_NAME_LEN);
    name
}

/// Sanitize names and disambiguate collisions with `.1`, `.2`, ... suffixes.
pub fn unique_glyph_names<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for raw_name in raw {
        let base = sanitize_glyph_name(raw_name);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

/// Build the `name` table.
///
/// Standard records come from `info`; `info.extra_names` are applied on top,
/// later entries replacing earlier ones for the same language and name ID.
pub fn build_name_table(info: &FontInfo) -> Name {
    let version_string = if info.version.starts_with("Version ") {
        info.version.clone()
    } else {
        format!("Version {}", info.version)
    };
    let vendor = String::from_utf8_lossy(&info.vendor_id).trim().to_string();
    let unique_id = format!("{};{};{}", info.version, vendor, info.postscript_name);

    let mut records: BTreeMap<(u16, u16), String> = BTreeMap::new();
    let mut set = |name_id: u16, value: String| {
        records.insert((LANGUAGE_EN_US, name_id), value);
    };

    if let Some(copyright) = &info.copyright {
        set(0, copyright.clone());
    }
    set(1, info.family_name.clone());
    set(2, info.style_name.clone());
    set(3, unique_id);
    set(4, info.full_name.clone());
    set(5, version_string);
    set(6, info.postscript_name.clone());

    for entry in &info.extra_names {
        records.insert((entry.language_id, entry.name_id), entry.value.clone());
    }

    let name_records = records
        .into_iter()
        .map(|((language_id, name_id), value)| {
            NameRecord::new(
                PLATFORM_WINDOWS,
                ENCODING_UNICODE_BMP,
                language_id,
                NameId::new(name_id),
                value.into(),
            )
        })
        .collect();

    Name::new(name_records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_glyph_name("arrow-left"), "arrow_left");
        assert_eq!(sanitize_glyph_name("home.alt"), "home.alt");
        assert_eq!(sanitize_glyph_name("3d"), "g3d");
        assert_eq!(sanitize_glyph_name(".hidden"), "g.hidden");
        assert_eq!(sanitize_glyph_name("café"), "caf_");
        assert_eq!(sanitize_glyph_name(""), "glyph");
        assert_eq!(sanitize_glyph_name(&"x".repeat(100)).len(), MAX_GLYPH_NAME_LEN);
    }

    #[test]
    fn collisions_get_suffixes() {
        let names = unique_glyph_names(["a-b", "a_b", "a b", "c"]);
        assert_eq!(names, vec!["a_b", "a_b.1", "a_b.2", "c"]);
    }
}
