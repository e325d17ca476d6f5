//! Prepare command implementation
//!
//! Prepares a run through the glyph cache, prints where every cluster landed
//! and writes each atlas page as `page-<id>.png` in the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glyphforge::atlas::AtlasPage;
use glyphforge::{FontData, PageId};
use image::{GrayImage, RgbImage};

use crate::cli::PrepareArgs;

pub fn run(args: &PrepareArgs) -> Result<()> {
    let font = super::load_font(&args.font, args.font_config(), args.atlas_config())?;
    let prepared = font
        .prepare(&args.text)
        .with_context(|| format!("preparing {:?}", args.text))?;

    println!("cluster  glyph   page  x     y     w    h    bearing     advance");
    for glyph in &prepared {
        let entry = &glyph.entry;
        let m = &entry.metrics;
        match entry.slot {
            Some(slot) => println!(
                "{:>7}  {:>5}  {:>5}  {:>4}  {:>4}  {:>3}  {:>3}  ({:>3},{:>3})  {:>7.2}",
                glyph.cluster,
                entry.glyph,
                slot.page.0,
                slot.rect.x,
                slot.rect.y,
                slot.rect.width,
                slot.rect.height,
                m.bearing_x,
                m.bearing_y,
                m.advance
            ),
            None => println!(
                "{:>7}  {:>5}  {:>5}  {:>34}  {:>7.2}",
                glyph.cluster, entry.glyph, "-", "(empty)", m.advance
            ),
        }
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let written = write_pages(&font, &args.out)?;

    let stats = font.stats();
    println!();
    println!(
        "{} glyphs rendered into {} page(s); wrote {}",
        stats.renders,
        stats.pages,
        written
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

fn write_pages(font: &FontData, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for id in 0..font.page_count() as u32 {
        let id = PageId(id);
        let path = dir.join(format!("page-{}.png", id.0));
        font.with_page(id, |page| save_page(page, &path))
            .context("atlas page vanished")??;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn save_page(page: &AtlasPage, path: &Path) -> Result<()> {
    let size = page.size();
    let pixels = page.pixels().to_vec();
    match page.channels() {
        1 => GrayImage::from_raw(size, size, pixels)
            .context("page buffer does not match its size")?
            .save(path)?,
        3 => RgbImage::from_raw(size, size, pixels)
            .context("page buffer does not match its size")?
            .save(path)?,
        n => bail!("cannot encode a {}-channel page", n),
    }
    Ok(())
}
