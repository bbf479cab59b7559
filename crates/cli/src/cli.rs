//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fontaweswimm_core::{
    DEFAULT_START_CODEPOINT, build, check, clean, collect_glyphs, glyphs::hex_code,
};
use log::info;

#[derive(Parser)]
#[command(name = "fontaweswimm")]
#[command(about = "Generate an icon font, demo page and stylesheet from SVG icons")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn parse_codepoint(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("U+")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid codepoint '{value}': {e}"))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate fonts, demo.html and style.css
    Build {
        /// Path to the base config
        base_conf: PathBuf,
        /// Path to the icons directory
        icon_dir: PathBuf,
        /// Path to the templates directory
        template_dir: PathBuf,
        /// Path to resource output directory
        #[arg(short, long = "output-dir", alias = "output_dir", default_value = "output")]
        output_dir: PathBuf,
    },
    /// Validate the config and every icon without writing anything
    Check {
        base_conf: PathBuf,
        icon_dir: PathBuf,
    },
    /// Print the codepoint each icon will be assigned
    List {
        icon_dir: PathBuf,
        /// First codepoint (decimal, 0x-prefixed or U+ hex)
        #[arg(long, default_value_t = DEFAULT_START_CODEPOINT, value_parser = parse_codepoint)]
        start: u32,
    },
    /// Remove the output directory
    Clean {
        #[arg(short, long = "output-dir", alias = "output_dir", default_value = "output")]
        output_dir: PathBuf,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { base_conf, icon_dir, template_dir, output_dir } => {
                build(&base_conf, &icon_dir, &template_dir, &output_dir)?;
            }
            Commands::Check { base_conf, icon_dir } => {
                check(&base_conf, &icon_dir)?;
            }
            Commands::List { icon_dir, start } => {
                let glyphs = collect_glyphs(&icon_dir, start)?;
                for (codepoint, glyph) in glyphs.iter() {
                    println!("{}\t{}\t{}", hex_code(codepoint), glyph.name, glyph.path.display());
                }
                info!("{} icons", glyphs.len());
            }
            Commands::Clean { output_dir } => {
                clean(&output_dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_takes_positional_paths() {
        let cli = Cli::try_parse_from([
            "fontaweswimm",
            "build",
            "config.json",
            "icons",
            "templates",
            "-o",
            "out",
        ])
        .unwrap();
        let Commands::Build { base_conf, icon_dir, template_dir, output_dir } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(base_conf, PathBuf::from("config.json"));
        assert_eq!(icon_dir, PathBuf::from("icons"));
        assert_eq!(template_dir, PathBuf::from("templates"));
        assert_eq!(output_dir, PathBuf::from("out"));
    }

    #[test]
    fn output_dir_defaults_and_aliases() {
        let cli = Cli::try_parse_from(["fontaweswimm", "build", "c.json", "i", "t"]).unwrap();
        let Commands::Build { output_dir, .. } = cli.command else { panic!("expected build") };
        assert_eq!(output_dir, PathBuf::from("output"));

        let cli =
            Cli::try_parse_from(["fontaweswimm", "clean", "--output_dir", "dist"]).unwrap();
        let Commands::Clean { output_dir } = cli.command else { panic!("expected clean") };
        assert_eq!(output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn build_requires_all_paths() {
        assert!(Cli::try_parse_from(["fontaweswimm", "build", "c.json", "i"]).is_err());
    }

    #[test]
    fn codepoint_forms() {
        assert_eq!(parse_codepoint("0xE900"), Ok(0xE900));
        assert_eq!(parse_codepoint("U+F000"), Ok(0xF000));
        assert_eq!(parse_codepoint("59648"), Ok(0xE900));
        assert!(parse_codepoint("0xZZ").is_err());
    }
}
