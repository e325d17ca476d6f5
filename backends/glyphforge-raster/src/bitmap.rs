//! Coverage bitmaps through zeno
//!
//! The SVG path data recorded during capture goes straight to zeno's
//! scan converter; kurbo's bounding box decides the canvas. zeno fills
//! rows in the outline's own y-up orientation, so rows are flipped at the
//! end to give a top-down image.

use glyphforge_core::traits::FontRef;
use glyphforge_core::types::{BitmapGlyph, GlyphIndex, RenderMethod, RenderedGlyph};
use glyphforge_core::RasterizationError;
use zeno::Mask;

use crate::capture::{capture, CapturedGlyph, PixelBox};

/// 8-bit antialiased coverage
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRenderer;

impl BitmapRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_glyph(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
    ) -> Result<RenderedGlyph, RasterizationError> {
        let captured = capture(font, glyph)?;
        let Some(bounds) = captured.pixel_box() else {
            return Ok(RenderedGlyph::empty(
                RenderMethod::Bitmap,
                glyph,
                captured.advance,
                0,
            ));
        };

        let bold = font.property().synthetic_bold();
        let image = image_box(bounds, bold);
        image.image_len(1)?;

        let mut pixels = rasterize(&captured, &bounds)?;
        if bold {
            pixels = dilate(&pixels, bounds.width(), bounds.height());
        }

        Ok(RenderedGlyph::Bitmap(BitmapGlyph {
            index: glyph,
            metrics: image.metrics(captured.advance),
            pixels,
        }))
    }
}

/// Output box for an outline covering `bounds`; dilation adds a pixel
pub(crate) fn image_box(bounds: PixelBox, bold: bool) -> PixelBox {
    if bold {
        bounds.grow(1)
    } else {
        bounds
    }
}

/// Scan-convert `captured` over `bounds`, top row first
pub(crate) fn rasterize(
    captured: &CapturedGlyph,
    bounds: &PixelBox,
) -> Result<Vec<u8>, RasterizationError> {
    let (width, height) = (bounds.width(), bounds.height());
    let mut mask = vec![0u8; bounds.image_len(1)?];
    let _placement = Mask::new(captured.svg.as_str())
        .size(width, height)
        .offset((-bounds.x0, -bounds.y0))
        .render_into(&mut mask, None);

    // Font coordinates are y-up, bitmaps are y-down
    let row = width as usize;
    for y in 0..(height as usize / 2) {
        let top = y * row;
        let bottom = (height as usize - 1 - y) * row;
        for x in 0..row {
            mask.swap(top + x, bottom + x);
        }
    }

    Ok(mask)
}

/// Grow coverage by one pixel on every side (3x3 maximum filter)
pub(crate) fn dilate(src: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (w, h) = (width as i64, height as i64);
    let out_w = w + 2;
    let out_h = h + 2;
    let mut out = vec![0u8; (out_w * out_h) as usize];

    for oy in 0..out_h {
        for ox in 0..out_w {
            let mut value = 0u8;
            for sy in (oy - 2)..=oy {
                if sy < 0 || sy >= h {
                    continue;
                }
                for sx in (ox - 2)..=ox {
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    value = value.max(src[(sy * w + sx) as usize]);
                }
            }
            out[(oy * out_w + ox) as usize] = value;
        }
    }

    out
}
