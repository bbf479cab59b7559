//! Base configuration shared by every generated font.
//!
//! ```json
//! {
//!   "props": {
//!     "family": "Fontaweswimm",
//!     "copyright": "(c) Swimm",
//!     "em": 1000,
//!     "License": "MIT"
//!   },
//!   "sfnt_names": [["English (US)", "Vendor URL", "https://swimm.io"]],
//!   "output_fonts": ["fontaweswimm.ttf", "fontaweswimm.woff2"]
//! }
//! ```
//!
//! `props` first yields `lang`, `family`, `style` and `encoding`. Every other
//! key is either a font attribute or, failing that, the label of a `name`
//! table string in `lang`.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use font_builder::{Encoding, FontInfo, NameEntry};
use font_web::OutputFormat;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    io::read_text,
    naming::{full_name, language_id, postscript_name, string_id, weight_class},
};

pub const DEFAULT_LANGUAGE: &str = "English (US)";
pub const DEFAULT_FAMILY: &str = "Untitled";
pub const DEFAULT_STYLE: &str = "Regular";
pub const DEFAULT_ENCODING: &str = "UnicodeFull";

/// First codepoint handed out to icons.
pub const DEFAULT_START_CODEPOINT: u32 = 0xE900;

pub const FONT_DIR_NAME: &str = "fonts";
pub const DEMO_FILE_NAME: &str = "demo.html";
pub const STYLE_FILE_NAME: &str = "style.css";
pub const HTML_TEMPLATE_FILE: &str = "html_template.html";
pub const CSS_TEMPLATE_FILE: &str = "css_template.css";

/// Name ID of the font description string.
const DESCRIPTION_NAME_ID: u16 = 10;

fn default_start_codepoint() -> u32 {
    DEFAULT_START_CODEPOINT
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseConfig {
    #[serde(default)]
    pub props: IndexMap<String, Value>,
    #[serde(default)]
    pub sfnt_names: Vec<SfntName>,
    pub output_fonts: Vec<String>,
    #[serde(default = "default_start_codepoint")]
    pub start_codepoint: u32,
}

/// `[language, string id, value]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SfntName(pub NameKey, pub NameKey, pub String);

/// A language or string ID given either by label or by number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NameKey {
    Id(u16),
    Label(String),
}

impl NameKey {
    fn resolve(&self, by_label: fn(&str) -> Result<u16>) -> Result<u16> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Label(label) => by_label(label),
        }
    }
}

/// Map a config `encoding` name onto the cmap layout it selects.
pub fn parse_encoding(name: &str) -> Result<Encoding> {
    match name.to_ascii_lowercase().as_str() {
        "unicodefull" | "ucs4" => Ok(Encoding::UnicodeFull),
        "unicodebmp" | "unicode" | "iso10646-1" => Ok(Encoding::UnicodeBmp),
        _ => bail!("Unsupported encoding: {name}"),
    }
}

/// A font file to emit under the fonts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFont {
    pub file_name: PathBuf,
    pub format: OutputFormat,
}

/// Everything later pipeline steps need from the config.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub font_info: FontInfo,
    pub output_fonts: Vec<OutputFont>,
    pub start_codepoint: u32,
}

impl BaseConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        Self::from_json(&text).with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn resolve(&self, timestamp: DateTime<Utc>) -> Result<ResolvedConfig> {
        let mut props = self.props.clone();
        let lang = take_string(&mut props, "lang")?.unwrap_or_else(|| DEFAULT_LANGUAGE.into());
        let family = take_string(&mut props, "family")?.unwrap_or_else(|| DEFAULT_FAMILY.into());
        let style = take_string(&mut props, "style")?.unwrap_or_else(|| DEFAULT_STYLE.into());
        let encoding = take_string(&mut props, "encoding")?;
        let encoding = parse_encoding(encoding.as_deref().unwrap_or(DEFAULT_ENCODING))?;
        let lang_id = language_id(&lang)?;

        let mut info = FontInfo {
            postscript_name: postscript_name(&family, &style),
            full_name: full_name(&family, &style),
            family_name: family,
            style_name: style,
            encoding,
            timestamp,
            ..FontInfo::default()
        };

        let mut attributes = AttributeState::default();
        for (key, value) in &props {
            if attributes.apply(&mut info, lang_id, key, value)? {
                debug!("font attribute {key} = {value}");
                continue;
            }
            let name_id = string_id(key)
                .with_context(|| format!("'{key}' is neither a font attribute nor a name label"))?;
            info.extra_names.push(NameEntry::new(lang_id, name_id, value_text(key, value)?));
        }
        attributes.finish(&mut info)?;

        for SfntName(lang, id, value) in &self.sfnt_names {
            let language = lang.resolve(language_id)?;
            let name_id = id.resolve(string_id)?;
            info.extra_names.push(NameEntry::new(language, name_id, value.clone()));
        }

        if self.output_fonts.is_empty() {
            warn!("Config lists no output_fonts; only demo.html and style.css will be written");
        }
        let output_fonts = self
            .output_fonts
            .iter()
            .map(|name| {
                let file_name = PathBuf::from(name);
                let format = OutputFormat::from_path(&file_name)?;
                Ok(OutputFont { file_name, format })
            })
            .collect::<Result<Vec<_>>>()?;

        if self.start_codepoint > encoding.max_codepoint() {
            bail!(
                "start_codepoint U+{:04X} is outside the {encoding:?} encoding",
                self.start_codepoint
            );
        }

        Ok(ResolvedConfig {
            font_info: info,
            output_fonts,
            start_codepoint: self.start_codepoint,
        })
    }
}

/// Tracks attributes whose effect depends on what else was set.
#[derive(Default)]
struct AttributeState {
    em: Option<u16>,
    ascent: bool,
    descent: bool,
    os2_weight: bool,
    weight_name: Option<String>,
}

impl AttributeState {
    /// Apply `key` if it names a font attribute; `false` means it does not.
    fn apply(&mut self, info: &mut FontInfo, lang_id: u16, key: &str, value: &Value) -> Result<bool> {
        match key {
            "fontname" => info.postscript_name = value_text(key, value)?,
            "familyname" => info.family_name = value_text(key, value)?,
            "fullname" => info.full_name = value_text(key, value)?,
            "copyright" => info.copyright = Some(value_text(key, value)?),
            "version" => info.version = value_text(key, value)?,
            "em" => {
                let em = value_int(key, value)?;
                info.units_per_em = em;
                self.em = Some(em);
            }
            "ascent" => {
                info.ascent = value_int(key, value)?;
                self.ascent = true;
            }
            "descent" => {
                info.descent = value_int(key, value)?;
                self.descent = true;
            }
            "weight" => self.weight_name = Some(value_text(key, value)?),
            "os2_weight" => {
                info.weight_class = value_int(key, value)?;
                self.os2_weight = true;
            }
            "os2_width" => info.width_class = value_int(key, value)?,
            "os2_vendor" => info.vendor_id = vendor_id(&value_text(key, value)?)?,
            "os2_panose" => info.panose = panose(value)?,
            "italicangle" => info.italic_angle = value_f64(key, value)?,
            "upos" => info.underline_position = value_int(key, value)?,
            "uwidth" => info.underline_thickness = value_int(key, value)?,
            "comment" => {
                info.extra_names.push(NameEntry::new(
                    lang_id,
                    DESCRIPTION_NAME_ID,
                    value_text(key, value)?,
                ));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self, info: &mut FontInfo) -> Result<()> {
        if let Some(em) = self.em {
            if !(16..=16384).contains(&em) {
                bail!("em must be between 16 and 16384, got {em}");
            }
            // Keep the default 4:1 ascent/descent split when only the em changes.
            if !self.ascent && !self.descent {
                info.ascent = (f64::from(em) * 0.8).round() as u16;
                info.descent = em - info.ascent;
            }
        }
        if info.ascent > i16::MAX as u16 || info.descent > i16::MAX as u16 {
            bail!("ascent and descent must fit in 16-bit signed font units");
        }
        if let Some(weight) = &self.weight_name
            && !self.os2_weight
        {
            match weight_class(weight) {
                Some(class) => info.weight_class = class,
                None => warn!("Unrecognised weight name '{weight}', keeping {}", info.weight_class),
            }
        }
        Ok(())
    }
}

fn take_string(props: &mut IndexMap<String, Value>, key: &str) -> Result<Option<String>> {
    props.shift_remove(key).map(|value| value_text(key, &value)).transpose()
}

fn value_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => bail!("'{key}' must be a string, got {value}"),
    }
}

fn value_int<T: TryFrom<i64>>(key: &str, value: &Value) -> Result<T> {
    let number = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let number = number.with_context(|| format!("'{key}' must be an integer, got {value}"))?;
    T::try_from(number).map_err(|_| anyhow::anyhow!("'{key}' is out of range: {number}"))
}

fn value_f64(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .with_context(|| format!("'{key}' must be a number, got {value}"))
}

fn vendor_id(value: &str) -> Result<[u8; 4]> {
    if !value.is_ascii() || value.len() > 4 {
        bail!("os2_vendor must be at most four ASCII characters, got '{value}'");
    }
    let mut id = *b"    ";
    id[..value.len()].copy_from_slice(value.as_bytes());
    Ok(id)
}

fn panose(value: &Value) -> Result<[u8; 10]> {
    let Value::Array(items) = value else {
        bail!("os2_panose must be a list of ten integers, got {value}");
    };
    if items.len() != 10 {
        bail!("os2_panose must have ten entries, got {}", items.len());
    }
    let mut panose = [0u8; 10];
    for (slot, item) in panose.iter_mut().zip(items) {
        *slot = value_int("os2_panose", item)?;
    }
    Ok(panose)
}

/// Honour `SOURCE_DATE_EPOCH` so repeated builds produce identical fonts.
pub fn build_timestamp() -> Result<DateTime<Utc>> {
    timestamp_or_now(env::var("SOURCE_DATE_EPOCH").ok().as_deref())
}

fn timestamp_or_now(epoch: Option<&str>) -> Result<DateTime<Utc>> {
    match epoch {
        Some(value) => timestamp_from_epoch(value),
        None => Ok(Utc::now()),
    }
}

pub fn timestamp_from_epoch(value: &str) -> Result<DateTime<Utc>> {
    let seconds: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("SOURCE_DATE_EPOCH is not an integer: {value}"))?;
    DateTime::from_timestamp(seconds, 0)
        .with_context(|| format!("SOURCE_DATE_EPOCH is out of range: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(json: &str) -> Result<ResolvedConfig> {
        BaseConfig::from_json(json)?.resolve(DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn family_and_style_derive_names() {
        let config = resolve(
            r#"{"props": {"family": "Swimm Icons", "style": "Bold"}, "output_fonts": ["a.ttf"]}"#,
        )
        .unwrap();
        let info = &config.font_info;
        assert_eq!(info.family_name, "Swimm Icons");
        assert_eq!(info.style_name, "Bold");
        assert_eq!(info.full_name, "Swimm Icons Bold");
        assert_eq!(info.postscript_name, "SwimmIcons-Bold");
        assert_eq!(config.start_codepoint, DEFAULT_START_CODEPOINT);
        assert_eq!(config.font_info.encoding, Encoding::UnicodeFull);
    }

    #[test]
    fn defaults_without_family() {
        let config = resolve(r#"{"props": {}, "output_fonts": []}"#).unwrap();
        assert_eq!(config.font_info.family_name, "Untitled");
        assert_eq!(config.font_info.postscript_name, "Untitled-Regular");
        assert_eq!(config.font_info.units_per_em, 1000);
    }

    #[test]
    fn attributes_and_name_fallback() {
        let config = resolve(
            r#"{
                "props": {
                    "family": "Swimm",
                    "copyright": "(c) Swimm",
                    "version": 2.5,
                    "os2_vendor": "SWM",
                    "os2_panose": [2, 0, 5, 3, 0, 0, 0, 0, 0, 0],
                    "weight": "Bold",
                    "License": "MIT"
                },
                "sfnt_names": [["English (US)", "Vendor URL", "https://swimm.io"], [1041, 1, "Swimm JP"]],
                "output_fonts": ["swimm.ttf", "swimm.woff", "swimm.woff2", "swimm.svg"]
            }"#,
        )
        .unwrap();
        let info = &config.font_info;
        assert_eq!(info.copyright.as_deref(), Some("(c) Swimm"));
        assert_eq!(info.version, "2.5");
        assert_eq!(&info.vendor_id, b"SWM ");
        assert_eq!(info.panose[2], 5);
        assert_eq!(info.weight_class, 700);
        assert_eq!(
            info.extra_names,
            vec![
                NameEntry::new(0x0409, 13, "MIT"),
                NameEntry::new(0x0409, 11, "https://swimm.io"),
                NameEntry::new(0x0411, 1, "Swimm JP"),
            ]
        );
        let formats: Vec<_> = config.output_fonts.iter().map(|f| f.format).collect();
        assert_eq!(
            formats,
            vec![OutputFormat::Ttf, OutputFormat::Woff, OutputFormat::Woff2, OutputFormat::Svg]
        );
    }

    #[test]
    fn em_rescales_vertical_metrics() {
        let config = resolve(r#"{"props": {"em": 2048}, "output_fonts": []}"#).unwrap();
        assert_eq!(config.font_info.units_per_em, 2048);
        assert_eq!(config.font_info.ascent, 1638);
        assert_eq!(config.font_info.descent, 410);

        let config =
            resolve(r#"{"props": {"em": 1024, "ascent": 900}, "output_fonts": []}"#).unwrap();
        assert_eq!(config.font_info.ascent, 900);
        assert_eq!(config.font_info.descent, 200);
    }

    #[test]
    fn encoding_names() {
        let bmp = resolve(r#"{"props": {"encoding": "ISO10646-1"}, "output_fonts": []}"#).unwrap();
        assert_eq!(bmp.font_info.encoding, Encoding::UnicodeBmp);
        let full = resolve(r#"{"props": {"encoding": "UnicodeFull"}, "output_fonts": []}"#).unwrap();
        assert_eq!(full.font_info.encoding, Encoding::UnicodeFull);

        let past_bmp = r#"{"props": {"encoding": "UnicodeBmp"}, "output_fonts": [], "start_codepoint": 65536}"#;
        assert!(resolve(past_bmp).is_err());
    }

    #[test]
    fn rejects_bad_config() {
        assert!(resolve(r#"{"props": {"Shoe Size": "44"}, "output_fonts": []}"#).is_err());
        assert!(resolve(r#"{"props": {"lang": "Klingon"}, "output_fonts": []}"#).is_err());
        assert!(resolve(r#"{"props": {"encoding": "Latin1"}, "output_fonts": []}"#).is_err());
        assert!(resolve(r#"{"props": {"em": "huge"}, "output_fonts": []}"#).is_err());
        assert!(resolve(r#"{"props": {"em": 4}, "output_fonts": []}"#).is_err());
        assert!(resolve(r#"{"props": {"os2_vendor": "TOOLONG"}, "output_fonts": []}"#).is_err());
        assert!(resolve(r#"{"props": {}, "output_fonts": ["icons.eot"]}"#).is_err());
        assert!(resolve(r#"{"props": {}}"#).is_err());
    }

    #[test]
    fn source_date_epoch() {
        let ts = timestamp_from_epoch("1700000000").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert!(timestamp_from_epoch("yesterday").is_err());

        let pinned = timestamp_or_now(Some(" 86400 ")).unwrap();
        assert_eq!(pinned, DateTime::from_timestamp(86_400, 0).unwrap());
        let before = Utc::now();
        assert!(timestamp_or_now(None).unwrap() >= before);
        assert!(timestamp_or_now(Some("")).is_err());
    }
}
