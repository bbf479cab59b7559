//! Icon font build pipeline.

mod clean;
mod steps;

pub use clean::clean;
pub use steps::{BUILD_STEPS, CHECK_STEPS, PipelineStep};

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use svg_import::PlacedOutline;

use crate::{
    config::{
        CSS_TEMPLATE_FILE, DEMO_FILE_NAME, FONT_DIR_NAME, HTML_TEMPLATE_FILE, ResolvedConfig,
        STYLE_FILE_NAME,
    },
    glyphs::GlyphMap,
};

const RULE: &str =
    "═══════════════════════════════════════════════════════════════════════════════";

/// Inputs of a build plus the state handed from one step to the next.
#[derive(Debug)]
pub struct PipelineContext {
    pub base_conf: PathBuf,
    pub icon_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Font creation time; `SOURCE_DATE_EPOCH` or the current time when unset.
    pub timestamp: Option<DateTime<Utc>>,

    config: Option<ResolvedConfig>,
    glyphs: GlyphMap,
    outlines: Vec<PlacedOutline>,
    font_data: Option<Vec<u8>>,
    written: Vec<PathBuf>,
}

impl PipelineContext {
    pub fn new(
        base_conf: impl Into<PathBuf>,
        icon_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_conf: base_conf.into(),
            icon_dir: icon_dir.into(),
            template_dir: template_dir.into(),
            output_dir: output_dir.into(),
            timestamp: None,
            config: None,
            glyphs: GlyphMap::default(),
            outlines: Vec::new(),
            font_data: None,
            written: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> Result<&ResolvedConfig> {
        self.config.as_ref().context("Config has not been loaded")
    }

    pub fn glyphs(&self) -> &GlyphMap {
        &self.glyphs
    }

    pub fn outlines(&self) -> &[PlacedOutline] {
        &self.outlines
    }

    pub fn font_data(&self) -> Result<&[u8]> {
        self.font_data.as_deref().context("Font has not been compiled")
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn font_dir(&self) -> PathBuf {
        self.output_dir.join(FONT_DIR_NAME)
    }

    pub fn demo_output(&self) -> PathBuf {
        self.output_dir.join(DEMO_FILE_NAME)
    }

    pub fn style_output(&self) -> PathBuf {
        self.output_dir.join(STYLE_FILE_NAME)
    }

    pub fn html_template(&self) -> PathBuf {
        self.template_dir.join(HTML_TEMPLATE_FILE)
    }

    pub fn css_template(&self) -> PathBuf {
        self.template_dir.join(CSS_TEMPLATE_FILE)
    }
}

pub fn run_step(
    name: &str,
    step_num: usize,
    total: usize,
    ctx: &mut PipelineContext,
    f: impl Fn(&mut PipelineContext) -> Result<()>,
) -> Result<()> {
    println!("\n[{step_num}/{total}] {name}");
    let start = Instant::now();
    f(ctx).with_context(|| format!("Step '{name}' failed"))?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(())
}

pub fn run_steps(steps: &[PipelineStep], ctx: &mut PipelineContext) -> Result<()> {
    let total = steps.len();
    for (i, (name, step_fn)) in steps.iter().enumerate() {
        run_step(name, i + 1, total, ctx, step_fn)?;
    }
    Ok(())
}

/// Generate fonts, `demo.html` and `style.css` into `output_dir`.
pub fn build(
    base_conf: &Path,
    icon_dir: &Path,
    template_dir: &Path,
    output_dir: &Path,
) -> Result<PipelineContext> {
    run_build(PipelineContext::new(base_conf, icon_dir, template_dir, output_dir))
}

/// Like [`build`], with a fixed font creation time.
pub fn build_with_timestamp(
    base_conf: &Path,
    icon_dir: &Path,
    template_dir: &Path,
    output_dir: &Path,
    timestamp: DateTime<Utc>,
) -> Result<PipelineContext> {
    let ctx = PipelineContext::new(base_conf, icon_dir, template_dir, output_dir)
        .with_timestamp(timestamp);
    run_build(ctx)
}

fn run_build(mut ctx: PipelineContext) -> Result<PipelineContext> {
    let start = Instant::now();

    println!("{RULE}");
    println!("Fontaweswimm Icon Font Build");
    println!("{RULE}");

    run_steps(BUILD_STEPS, &mut ctx)?;

    println!("\n{RULE}");
    println!("✨ Build complete in {:.2}s", start.elapsed().as_secs_f64());
    println!("   Output: {}", ctx.output_dir.display());
    println!("   Glyphs: {}", ctx.glyphs.len());
    for path in &ctx.written {
        println!("   - {}", path.display());
    }
    println!("{RULE}");

    Ok(ctx)
}

/// Validate the config and every icon without writing anything.
pub fn check(base_conf: &Path, icon_dir: &Path) -> Result<PipelineContext> {
    let mut ctx = PipelineContext::new(base_conf, icon_dir, PathBuf::new(), PathBuf::new());
    let start = Instant::now();

    println!("{RULE}");
    println!("Fontaweswimm Icon Check");
    println!("{RULE}");

    run_steps(CHECK_STEPS, &mut ctx)?;

    println!("\n{RULE}");
    println!(
        "✨ {} icons OK in {:.2}s",
        ctx.glyphs.len(),
        start.elapsed().as_secs_f64()
    );
    println!("{RULE}");

    Ok(ctx)
}
