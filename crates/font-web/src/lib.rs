//! # Font Web
//!
//! Re-encode a compiled TrueType font for the web.
//!
//! The output format is picked from the target file extension, so a build
//! config can list `icons.ttf`, `icons.woff`, `icons.woff2` and `icons.svg`
//! side by side.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use font_web::OutputFormat;
//!
//! let ttf = std::fs::read("icons.ttf").unwrap();
//! let format = OutputFormat::from_path(Path::new("icons.woff2")).unwrap();
//! let woff2 = format.encode(&ttf).unwrap();
//! ```

mod svg_font;
mod woff;
mod woff2;

use std::{fmt, path::Path};

use anyhow::{Result, bail};

pub use svg_font::encode_svg_font;
pub use woff::encode_woff;
pub use woff2::encode_woff2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ttf,
    Woff,
    Woff2,
    Svg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Ttf, Self::Woff, Self::Woff2, Self::Svg];

    pub fn from_path(path: &Path) -> Result<Self> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            bail!("Output font {} has no file extension", path.display());
        };
        match ext.to_ascii_lowercase().as_str() {
            "ttf" => Ok(Self::Ttf),
            "woff" => Ok(Self::Woff),
            "woff2" => Ok(Self::Woff2),
            "svg" => Ok(Self::Svg),
            other => bail!(
                "Unsupported output font format '.{other}' for {} (expected one of: {})",
                path.display(),
                Self::ALL.map(|f| f.extension()).join(", ")
            ),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ttf => "ttf",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
            Self::Svg => "svg",
        }
    }

    /// Encode TrueType bytes into this format.
    pub fn encode(self, ttf: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Ttf => Ok(ttf.to_vec()),
            Self::Woff => encode_woff(ttf),
            Self::Woff2 => encode_woff2(ttf),
            Self::Svg => encode_svg_font(ttf),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
