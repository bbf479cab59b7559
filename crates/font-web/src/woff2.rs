//! WOFF 2.0 encoding.

use anyhow::{Result, anyhow};
use log::debug;
use ttf2woff2::{BrotliQuality, encode};

/// Compress a TrueType font to WOFF2 at the encoder's default Brotli quality.
pub fn encode_woff2(ttf: &[u8]) -> Result<Vec<u8>> {
    let woff2 =
        encode(ttf, BrotliQuality::default()).map_err(|e| anyhow!("WOFF2 conversion failed: {e}"))?;
    debug!("woff2: {} -> {} bytes", ttf.len(), woff2.len());
    Ok(woff2)
}
