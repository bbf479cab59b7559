use std::io::Read;

use flate2::read::ZlibDecoder;
use font_builder::{FontInfo, GlyphSpec, IconFontBuilder};
use font_web::{OutputFormat, encode_svg_font, encode_woff, encode_woff2};
use kurbo::{Rect, Shape};
use read_fonts::{FontRef, types::Tag};

fn make_test_font() -> Vec<u8> {
    let info = FontInfo {
        family_name: "Swimm".to_string(),
        postscript_name: "Swimm-Regular".to_string(),
        ..FontInfo::default()
    };
    let mut builder = IconFontBuilder::new(info);
    for (i, name) in ["home", "star"].iter().enumerate() {
        builder
            .add_glyph(GlyphSpec {
                name: name.to_string(),
                codepoint: 0xE900 + i as u32,
                outline: Rect::new(100.0, 0.0, 900.0, 700.0).to_path(0.1),
                advance_width: 1000.0,
            })
            .unwrap();
    }
    builder.build().unwrap()
}

fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap())
}

fn be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes(data[offset..offset + 2].try_into().unwrap())
}

#[test]
fn test_woff_header_and_tables() {
    let ttf = make_test_font();
    let font = FontRef::new(&ttf).unwrap();
    let woff = encode_woff(&ttf).unwrap();

    assert_eq!(&woff[0..4], b"wOFF");
    assert_eq!(be_u32(&woff, 4), 0x0001_0000);
    assert_eq!(be_u32(&woff, 8) as usize, woff.len());
    let num_tables = be_u16(&woff, 12) as usize;
    assert_eq!(num_tables, font.table_directory.table_records().len());

    let mut previous_tag = [0u8; 4];
    for i in 0..num_tables {
        let entry = 44 + i * 20;
        let tag: [u8; 4] = woff[entry..entry + 4].try_into().unwrap();
        assert!(tag > previous_tag, "tables must be sorted by tag");
        previous_tag = tag;

        let offset = be_u32(&woff, entry + 4) as usize;
        let comp_length = be_u32(&woff, entry + 8) as usize;
        let orig_length = be_u32(&woff, entry + 12) as usize;
        assert_eq!(offset % 4, 0);

        let stored = &woff[offset..offset + comp_length];
        let table = if comp_length < orig_length {
            let mut inflated = Vec::new();
            ZlibDecoder::new(stored).read_to_end(&mut inflated).unwrap();
            inflated
        } else {
            stored.to_vec()
        };
        let original = font.table_data(Tag::new(&tag)).unwrap();
        assert_eq!(table, original.as_bytes());
    }
}

#[test]
fn test_woff2_signature() {
    let woff2 = encode_woff2(&make_test_font()).unwrap();
    assert_eq!(&woff2[0..4], b"wOF2");
}

#[test]
fn test_svg_font_contents() {
    let svg = String::from_utf8(encode_svg_font(&make_test_font()).unwrap()).unwrap();

    assert!(svg.contains(r#"<font id="Swimm-Regular" horiz-adv-x="1000">"#));
    assert!(svg.contains(r#"font-family="Swimm""#));
    assert!(svg.contains(r#"units-per-em="1000" ascent="800" descent="-200""#));
    assert!(svg.contains("<missing-glyph"));
    assert!(svg.contains(r#"<glyph glyph-name="home" unicode="&#xe900;" horiz-adv-x="1000" d="M"#));
    assert!(svg.contains(r#"<glyph glyph-name="star" unicode="&#xe901;""#));
    assert!(elements_balanced(&svg));
}

/// Every opened container element is closed.
fn elements_balanced(svg: &str) -> bool {
    svg.matches("<font ").count() == svg.matches("</font>").count()
        && svg.matches("<svg ").count() == svg.matches("</svg>").count()
}

#[test]
fn test_ttf_passthrough() {
    let ttf = make_test_font();
    assert_eq!(OutputFormat::Ttf.encode(&ttf).unwrap(), ttf);
}
