//! Icon discovery and codepoint assignment.

use std::{
    fs::read_dir,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::debug;

/// Last codepoint of the BMP Private Use Area.
pub const PRIVATE_USE_END: u32 = 0xF8FF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphEntry {
    /// Glyph and CSS class name: the icon's file stem.
    pub name: String,
    pub path: PathBuf,
}

/// Icons keyed by codepoint, in file-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMap {
    entries: IndexMap<u32, GlyphEntry>,
}

impl GlyphMap {
    /// Assign consecutive codepoints from `start` to `paths`, in the order given.
    pub fn assign(paths: Vec<PathBuf>, start: u32) -> Result<Self> {
        let mut entries = IndexMap::with_capacity(paths.len());
        for (offset, path) in paths.into_iter().enumerate() {
            let codepoint = start.saturating_add(offset as u32);
            if codepoint > PRIVATE_USE_END {
                bail!(
                    "Too many icons: {} would be assigned U+{codepoint:04X}, past the end of the \
                     Private Use Area (U+{PRIVATE_USE_END:04X})",
                    path.display()
                );
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .with_context(|| format!("Icon file name is not valid UTF-8: {}", path.display()))?
                .to_string();
            debug!("UTF:{} - {}", hex_code(codepoint), absolute_or_given(&path).display());
            entries.insert(codepoint, GlyphEntry { name, path });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, codepoint: u32) -> Option<&GlyphEntry> {
        self.entries.get(&codepoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &GlyphEntry)> {
        self.entries.iter().map(|(cp, entry)| (*cp, entry))
    }
}

fn absolute_or_given(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// `0xe900`, as the build log prints codepoints.
pub fn hex_code(codepoint: u32) -> String {
    format!("{codepoint:#x}")
}

/// `e900`, as CSS escapes and HTML entities use codepoints.
pub fn utf_code(codepoint: u32) -> String {
    format!("{codepoint:x}")
}

/// List the SVG icons in `icon_dir`, sorted by file name.
///
/// Hidden files are skipped; anything else that is not an `.svg` file is an
/// error.
pub fn list_icons(icon_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = read_dir(icon_dir)
        .with_context(|| format!("Failed to read icon directory: {}", icon_dir.display()))?;

    let mut icons = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", icon_dir.display()))?;
        let path = entry.path();
        let file_name = entry.file_name();
        if file_name.to_string_lossy().starts_with('.') {
            debug!("skipping hidden file {}", path.display());
            continue;
        }
        let is_svg = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if !path.is_file() || !is_svg {
            bail!("Not an SVG icon: {}", path.display());
        }
        icons.push(path);
    }
    icons.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if icons.is_empty() {
        bail!("No SVG icons found in {}", icon_dir.display());
    }
    Ok(icons)
}

/// Discover icons and assign their codepoints.
pub fn collect_glyphs(icon_dir: &Path, start: u32) -> Result<GlyphMap> {
    GlyphMap::assign(list_icons(icon_dir)?, start)
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir, write};

    use super::*;

    #[test]
    fn codepoints_follow_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["star.svg", "arrow.svg", "home.svg", ".DS_Store"] {
            write(dir.path().join(name), "<svg/>").unwrap();
        }

        let glyphs = collect_glyphs(dir.path(), 0xE900).unwrap();
        let names: Vec<_> = glyphs.iter().map(|(cp, g)| (cp, g.name.as_str())).collect();
        assert_eq!(names, vec![(0xE900, "arrow"), (0xE901, "home"), (0xE902, "star")]);
        assert_eq!(glyphs.get(0xE901).unwrap().path, dir.path().join("home.svg"));
    }

    #[test]
    fn non_svg_entries_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("a.svg"), "<svg/>").unwrap();
        write(dir.path().join("notes.txt"), "").unwrap();
        assert!(collect_glyphs(dir.path(), 0xE900).is_err());

        let dir = tempfile::tempdir().unwrap();
        create_dir(dir.path().join("nested.svg")).unwrap();
        assert!(collect_glyphs(dir.path(), 0xE900).is_err());
    }

    #[test]
    fn empty_or_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_glyphs(dir.path(), 0xE900).is_err());
        assert!(collect_glyphs(&dir.path().join("missing"), 0xE900).is_err());
    }

    #[test]
    fn private_use_area_overflow() {
        let paths = vec![PathBuf::from("a.svg"), PathBuf::from("b.svg")];
        assert!(GlyphMap::assign(paths.clone(), 0xF8FE).is_ok());
        assert!(GlyphMap::assign(paths, 0xF8FF).is_err());
    }

    #[test]
    fn logged_paths_are_absolute() {
        let relative = Path::new("icons").join("home.svg");
        let shown = absolute_or_given(&relative);
        assert!(shown.is_absolute());
        assert!(shown.ends_with("icons/home.svg"));

        let already = std::env::temp_dir().join("home.svg");
        assert_eq!(absolute_or_given(&already), already);
    }

    #[test]
    fn code_formats() {
        assert_eq!(hex_code(0xE900), "0xe900");
        assert_eq!(utf_code(0xE90A), "e90a");
    }
}
