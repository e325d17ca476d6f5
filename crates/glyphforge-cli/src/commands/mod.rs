//! One module per subcommand

pub mod info;
pub mod prepare;
pub mod shape;

use anyhow::{bail, Result};
use glyphforge::fontdb::FileSystemProvider;
use glyphforge::{AtlasConfig, FontConfig, FontData};

use crate::cli::FontArgs;

/// Load the font named on the command line, turning a failed load into an
/// error
pub fn load_font(args: &FontArgs, config: FontConfig, atlas: AtlasConfig) -> Result<FontData> {
    let path = args.font.to_string_lossy();
    let font = FontData::load(&FileSystemProvider::new(), &path, config, atlas);
    if let Some(err) = font.load_error() {
        bail!("cannot load {}: {}", path, err);
    }
    Ok(font)
}
