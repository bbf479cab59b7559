//! WOFF 1.0 encoding.

use std::io::Write;

use anyhow::{Context, Result};
use flate2::{Compression, write::ZlibEncoder};
use log::debug;
use read_fonts::FontRef;

const WOFF_SIGNATURE: u32 = 0x774F_4646; // 'wOFF'
const HEADER_SIZE: usize = 44;
const TABLE_ENTRY_SIZE: usize = 20;
const SFNT_HEADER_SIZE: usize = 12;
const SFNT_TABLE_ENTRY_SIZE: usize = 16;

struct EncodedTable {
    tag: [u8; 4],
    checksum: u32,
    orig_length: u32,
    data: Vec<u8>,
}

fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Wrap a TrueType font in a WOFF 1.0 container.
///
/// Each table is zlib-compressed, or stored as-is when compression does not
/// make it smaller. Tables appear in tag order.
pub fn encode_woff(ttf: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(ttf).context("Failed to parse font")?;
    let directory = &font.table_directory;

    let mut tables = Vec::new();
    for record in directory.table_records() {
        let tag = record.tag();
        let data = font
            .table_data(tag)
            .with_context(|| format!("Missing data for table '{tag}'"))?
            .as_bytes();
        let compressed = compress(data).with_context(|| format!("Failed to compress '{tag}'"))?;
        let data = if compressed.len() < data.len() {
            debug!("{tag}: {} -> {} bytes (zlib)", data.len(), compressed.len());
            compressed
        } else {
            debug!("{tag}: {} bytes (stored)", data.len());
            data.to_vec()
        };
        tables.push(EncodedTable {
            tag: tag.to_be_bytes(),
            checksum: record.checksum(),
            orig_length: record.length(),
            data,
        });
    }
    tables.sort_by_key(|t| t.tag);

    let total_sfnt_size = SFNT_HEADER_SIZE
        + SFNT_TABLE_ENTRY_SIZE * tables.len()
        + tables.iter().map(|t| pad4(t.orig_length as usize)).sum::<usize>();

    let mut offset = HEADER_SIZE + TABLE_ENTRY_SIZE * tables.len();
    let mut offsets = Vec::with_capacity(tables.len());
    for table in &tables {
        offsets.push(offset);
        offset += pad4(table.data.len());
    }
    let length = offset;

    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&directory.sfnt_version().to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    // metaOffset, metaLength, metaOrigLength, privOffset, privLength
    out.extend_from_slice(&[0u8; 20]);

    for (table, offset) in tables.iter().zip(&offsets) {
        out.extend_from_slice(&table.tag);
        out.extend_from_slice(&(*offset as u32).to_be_bytes());
        out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&table.orig_length.to_be_bytes());
        out.extend_from_slice(&table.checksum.to_be_bytes());
    }

    for table in &tables {
        out.extend_from_slice(&table.data);
        out.resize(pad4(out.len()), 0);
    }

    debug_assert_eq!(out.len(), length);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        assert_eq!(pad4(0), 0);
        assert_eq!(pad4(1), 4);
        assert_eq!(pad4(4), 4);
        assert_eq!(pad4(5), 8);
    }

    #[test]
    fn compression_shrinks_repetitive_data() {
        let data = vec![0u8; 1024];
        assert!(compress(&data).unwrap().len() < data.len());
    }

    #[test]
    fn rejects_garbage() {
        assert!(encode_woff(b"not a font").is_err());
    }
}
