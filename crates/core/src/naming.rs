//! Font naming: `name` table identifiers and derived names.

use anyhow::{Result, bail};

/// Standard `name` table string IDs, by the labels config files use.
const STRING_IDS: &[(&str, u16)] = &[
    ("Copyright", 0),
    ("Family", 1),
    ("SubFamily", 2),
    ("UniqueID", 3),
    ("Fullname", 4),
    ("Version", 5),
    ("PostScriptName", 6),
    ("Trademark", 7),
    ("Manufacturer", 8),
    ("Designer", 9),
    ("Descriptor", 10),
    ("Vendor URL", 11),
    ("Designer URL", 12),
    ("License", 13),
    ("License URL", 14),
    ("Preferred Family", 16),
    ("Preferred Styles", 17),
    ("Compatible Full", 18),
    ("Sample Text", 19),
    ("CID findfont Name", 20),
    ("WWS Family", 21),
    ("WWS Subfamily", 22),
];

/// Windows language IDs, by name.
const LANGUAGES: &[(&str, u16)] = &[
    ("English (US)", 0x0409),
    ("English (British)", 0x0809),
    ("English (UK)", 0x0809),
    ("English (Canada)", 0x1009),
    ("English (Australian)", 0x0c09),
    ("French French", 0x040c),
    ("French", 0x040c),
    ("German German", 0x0407),
    ("German", 0x0407),
    ("Italian", 0x0410),
    ("Spanish", 0x0c0a),
    ("Portuguese (Brazil)", 0x0416),
    ("Portuguese", 0x0816),
    ("Dutch", 0x0413),
    ("Swedish", 0x041d),
    ("Danish", 0x0406),
    ("Norwegian", 0x0414),
    ("Finnish", 0x040b),
    ("Polish", 0x0415),
    ("Czech", 0x0405),
    ("Hungarian", 0x040e),
    ("Greek", 0x0408),
    ("Russian", 0x0419),
    ("Ukrainian", 0x0422),
    ("Turkish", 0x041f),
    ("Hebrew", 0x040d),
    ("Arabic", 0x0401),
    ("Japanese", 0x0411),
    ("Korean", 0x0412),
    ("Chinese (Taiwan)", 0x0404),
    ("Chinese (PRC)", 0x0804),
];

fn normalize(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}

fn parse_numeric(value: &str) -> Option<u16> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Resolve a string ID label (`"License"`, `"Vendor URL"`) or number.
///
/// Labels match case-insensitively, ignoring whitespace.
pub fn string_id(label: &str) -> Result<u16> {
    if let Some(id) = parse_numeric(label) {
        return Ok(id);
    }
    let wanted = normalize(label);
    match STRING_IDS.iter().find(|(name, _)| normalize(name) == wanted) {
        Some((_, id)) => Ok(*id),
        None => bail!("Unknown SFNT string id: {label}"),
    }
}

/// Resolve a language name (`"English (US)"`) or numeric Windows language ID.
pub fn language_id(label: &str) -> Result<u16> {
    if let Some(id) = parse_numeric(label) {
        return Ok(id);
    }
    let wanted = normalize(label);
    match LANGUAGES.iter().find(|(name, _)| normalize(name) == wanted) {
        Some((_, id)) => Ok(*id),
        None => bail!("Unknown SFNT language: {label}"),
    }
}

/// PostScript names may not contain spaces.
pub fn postscript_name(family: &str, style: &str) -> String {
    format!("{}-{}", family.replace(' ', ""), style.replace(' ', ""))
}

pub fn full_name(family: &str, style: &str) -> String {
    format!("{family} {style}")
}

/// Map a PostScript weight name to an OS/2 weight class.
pub fn weight_class(weight: &str) -> Option<u16> {
    let class = match normalize(weight).as_str() {
        "thin" | "hairline" => 100,
        "extralight" | "ultralight" => 200,
        "light" => 300,
        "regular" | "normal" | "book" | "roman" => 400,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => return None,
    };
    Some(class)
}
