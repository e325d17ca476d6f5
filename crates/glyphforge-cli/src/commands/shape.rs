//! Shape command implementation

use anyhow::Result;
use glyphforge::AtlasConfig;

use crate::cli::ShapeArgs;

pub fn run(args: &ShapeArgs) -> Result<()> {
    let font = super::load_font(&args.font, args.font.config(), AtlasConfig::default())?;

    for cluster in font.glyph_clusters(&args.text) {
        let source = source_text(&args.text, cluster.cluster as usize);
        let info = font.glyph_info(cluster.glyph);
        let advance = info.map_or(0.0, |info| info.metrics.advance);
        println!(
            "cluster {:>4}  glyph {:>5}  advance {:>7.2}  {:?}",
            cluster.cluster, cluster.glyph, advance, source
        );
    }

    Ok(())
}

/// The character starting at byte `offset`, if the offset is a boundary
fn source_text(text: &str, offset: usize) -> Option<char> {
    text.get(offset..).and_then(|rest| rest.chars().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_bytes() {
        assert_eq!(source_text("aé b", 1), Some('é'));
        assert_eq!(source_text("aé b", 2), None);
        assert_eq!(source_text("aé b", 3), Some(' '));
        assert_eq!(source_text("ab", 9), None);
    }
}
