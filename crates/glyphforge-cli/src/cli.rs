//! CLI argument definitions using Clap v4

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use glyphforge::types::{FontMethod, FontStyle};
use glyphforge::{AtlasConfig, FontConfig};

/// Glyphforge - shape text and build glyph atlases from the command line
#[derive(Parser, Debug)]
#[command(name = "glyphforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log cache activity at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the metrics and names of a font
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Print the glyph clusters a run of text shapes to
    #[command(alias = "s")]
    Shape(ShapeArgs),

    /// Rasterize a run into atlas pages and write them as PNG
    #[command(alias = "p")]
    Prepare(PrepareArgs),
}

/// Font selection shared by every command
#[derive(Args, Debug)]
pub struct FontArgs {
    /// Font file path (.ttf, .otf)
    pub font: PathBuf,

    /// Font size in pixels per em
    #[arg(short = 's', long = "size", default_value_t = 32)]
    pub size: u32,

    /// Requested style; bold and italic are synthesized when the face lacks them
    #[arg(long = "style", value_enum, default_value_t = StyleArg::Regular)]
    pub style: StyleArg,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub font: FontArgs,
}

#[derive(Args, Debug)]
pub struct ShapeArgs {
    #[command(flatten)]
    pub font: FontArgs,

    /// Text to shape
    pub text: String,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub font: FontArgs,

    /// Text to prepare
    pub text: String,

    /// Rasterization method of the glyph cache
    #[arg(short = 'm', long = "method", value_enum, default_value_t = MethodArg::Bitmap)]
    pub method: MethodArg,

    /// Distance-field padding in pixels (SDF and MSDF)
    #[arg(short = 'b', long = "buffer", default_value_t = 3)]
    pub buffer: u32,

    /// Atlas page edge in pixels [default: GLYPHFORGE_ATLAS_PAGE_SIZE or 1024]
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,

    /// Maximum atlas pages [default: GLYPHFORGE_ATLAS_MAX_PAGES or 16]
    #[arg(long = "max-pages")]
    pub max_pages: Option<u32>,

    /// Directory for the page images
    #[arg(short = 'o', long = "out", default_value = ".")]
    pub out: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl From<StyleArg> for FontStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Regular => FontStyle::Regular,
            StyleArg::Bold => FontStyle::Bold,
            StyleArg::Italic => FontStyle::Italic,
            StyleArg::BoldItalic => FontStyle::BoldItalic,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodArg {
    Bitmap,
    Sdf,
    Msdf,
}

impl From<MethodArg> for FontMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Bitmap => FontMethod::Bitmap,
            MethodArg::Sdf => FontMethod::Sdf,
            MethodArg::Msdf => FontMethod::Msdf,
        }
    }
}

impl FontArgs {
    pub fn config(&self) -> FontConfig {
        FontConfig::new(self.size).with_style(self.style.into())
    }
}

impl PrepareArgs {
    pub fn font_config(&self) -> FontConfig {
        self.font
            .config()
            .with_method(self.method.into())
            .with_buffer(self.buffer)
    }

    /// Environment defaults with command-line overrides on top
    pub fn atlas_config(&self) -> AtlasConfig {
        let mut atlas = AtlasConfig::from_env();
        if let Some(page_size) = self.page_size {
            atlas.page_size = page_size;
        }
        if let Some(max_pages) = self.max_pages {
            atlas.max_pages = max_pages;
        }
        atlas
    }
}
