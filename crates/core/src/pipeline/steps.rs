//! Pipeline step definitions.

use std::fs::create_dir_all;

use anyhow::{Context, Result};
use font_builder::{GlyphSpec, IconFontBuilder};
use log::{debug, info, warn};
use svg_import::{EmBox, SvgIcon};

use super::PipelineContext;
use crate::{
    config::{BaseConfig, build_timestamp},
    glyphs::{GlyphEntry, collect_glyphs, hex_code},
    io::{
        OutputFile, check_results_with_paths, collect_parallel_with_paths, into_values, read_text,
        write_text,
    },
    templates::{render_demo_html, render_style_css},
};

pub type PipelineStep = (&'static str, fn(&mut PipelineContext) -> Result<()>);

pub const BUILD_STEPS: &[PipelineStep] = &[
    ("load-config", step_load_config),
    ("load-glyphs", step_load_glyphs),
    ("import-outlines", step_import_outlines),
    ("compile-font", step_compile_font),
    ("generate-fonts", step_generate_fonts),
    ("generate-demo-html", step_generate_demo_html),
    ("generate-style-css", step_generate_style_css),
];

pub const CHECK_STEPS: &[PipelineStep] = &[
    ("load-config", step_load_config),
    ("load-glyphs", step_load_glyphs),
    ("import-outlines", step_import_outlines),
];

fn step_load_config(ctx: &mut PipelineContext) -> Result<()> {
    println!("  Loading basic config from {}...", ctx.base_conf.display());
    let config = BaseConfig::load(&ctx.base_conf)?;
    let timestamp = match ctx.timestamp {
        Some(timestamp) => timestamp,
        None => build_timestamp()?,
    };
    let resolved = config.resolve(timestamp)?;

    let info = &resolved.font_info;
    println!(
        "  Family: {} ({}), em {}, ascent {}, descent {}",
        info.family_name, info.style_name, info.units_per_em, info.ascent, info.descent
    );
    ctx.config = Some(resolved);
    Ok(())
}

fn step_load_glyphs(ctx: &mut PipelineContext) -> Result<()> {
    println!("  Loading glyphs from {}...", ctx.icon_dir.display());
    let start = ctx.config()?.start_codepoint;
    ctx.glyphs = collect_glyphs(&ctx.icon_dir, start)?;

    if let Some((first, _)) = ctx.glyphs.iter().next() {
        let last = first + ctx.glyphs.len() as u32 - 1;
        println!("  {} icons: {} ..= {}", ctx.glyphs.len(), hex_code(first), hex_code(last));
    }
    Ok(())
}

fn step_import_outlines(ctx: &mut PipelineContext) -> Result<()> {
    let info = &ctx.config()?.font_info;
    let em = EmBox {
        units_per_em: info.units_per_em,
        ascent: i16::try_from(info.ascent).context("ascent does not fit in font units")?,
    };

    let entries: Vec<&GlyphEntry> = ctx.glyphs.iter().map(|(_, entry)| entry).collect();
    println!("  Importing {} outlines...", entries.len());

    let results = collect_parallel_with_paths(
        &entries,
        |entry| entry.path.clone(),
        |entry| {
            let icon = SvgIcon::load(&entry.path)?;
            if icon.contour_count() == 0 {
                warn!("{} has no filled shapes; its glyph will be blank", entry.path.display());
            }
            debug!("{}: {} contours", entry.name, icon.contour_count());
            Ok(icon.place(em))
        },
    );
    check_results_with_paths(&results, "import outlines")?;

    ctx.outlines = into_values(results)?;
    Ok(())
}

fn step_compile_font(ctx: &mut PipelineContext) -> Result<()> {
    let config = ctx.config()?;
    let mut builder = IconFontBuilder::new(config.font_info.clone());

    for ((codepoint, entry), outline) in ctx.glyphs.iter().zip(&ctx.outlines) {
        builder
            .add_glyph(GlyphSpec {
                name: entry.name.clone(),
                codepoint,
                outline: outline.path.clone(),
                advance_width: outline.advance_width,
            })
            .with_context(|| format!("Failed to add {}", entry.path.display()))?;
    }

    println!("  Compiling {} glyphs...", builder.glyph_count());
    let data = builder.build().context("Failed to compile font")?;
    println!("  TrueType: {} bytes", data.len());
    ctx.font_data = Some(data);
    Ok(())
}

fn step_generate_fonts(ctx: &mut PipelineContext) -> Result<()> {
    let font_dir = ctx.font_dir();
    create_dir_all(&font_dir)
        .with_context(|| format!("Failed to create directory: {}", font_dir.display()))?;

    let outputs = &ctx.config()?.output_fonts;
    let ttf = ctx.font_data()?;
    info!("Generating {} output fonts in {}", outputs.len(), font_dir.display());

    let results = collect_parallel_with_paths(
        outputs,
        |output| font_dir.join(&output.file_name),
        |output| {
            let file = OutputFile::new(font_dir.join(&output.file_name));
            debug!("Generating {}", file.path().display());
            let data = output.format.encode(ttf)?;
            file.write(&data)?;
            Ok(file.path().to_path_buf())
        },
    );
    check_results_with_paths(&results, "generate fonts")?;

    let written = into_values(results)?;
    for path in &written {
        println!("  {}", path.display());
    }
    ctx.written.extend(written);
    Ok(())
}

fn step_generate_demo_html(ctx: &mut PipelineContext) -> Result<()> {
    let template = read_text(&ctx.html_template())?;
    let html = render_demo_html(&template, &ctx.glyphs);
    let output = ctx.demo_output();
    write_text(&output, &html)?;
    println!("  {}", output.display());
    ctx.written.push(output);
    Ok(())
}

fn step_generate_style_css(ctx: &mut PipelineContext) -> Result<()> {
    let template = read_text(&ctx.css_template())?;
    let css = render_style_css(&template, &ctx.glyphs);
    let output = ctx.style_output();
    write_text(&output, &css)?;
    println!("  {}", output.display());
    ctx.written.push(output);
    Ok(())
}
