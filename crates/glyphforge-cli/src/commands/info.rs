//! Info command implementation

use anyhow::{Context, Result};
use glyphforge::AtlasConfig;

use crate::cli::InfoArgs;

pub fn run(args: &InfoArgs) -> Result<()> {
    let font = super::load_font(&args.font, args.font.config(), AtlasConfig::default())?;
    let property = font.property().context("font has no face")?;

    println!("Family:       {}", property.family_name);
    println!("Style name:   {}", property.style_name);
    println!("Glyphs:       {}", property.glyph_count);
    println!("Units per em: {}", property.units_per_em);
    println!("Size:         {}px", property.size);
    println!("Ascender:     {:.2}", property.ascender);
    println!("Descender:    {:.2}", property.descender);
    println!("Line gap:     {:.2}", property.line_gap);
    println!("Line height:  {:.2}", property.height);
    println!("Style:        {:?}", property.style);
    println!(
        "Synthetic:    bold={} italic={}",
        property.synthetic_bold(),
        property.synthetic_italic()
    );

    Ok(())
}
