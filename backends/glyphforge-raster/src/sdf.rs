//! Single-channel signed distance fields
//!
//! Every pixel centre in the padded glyph box stores its exact distance to
//! the nearest outline segment, positive inside. The sign comes from the
//! non-zero winding rule, which matches how the bitmap path fills.

use glyphforge_core::traits::FontRef;
use glyphforge_core::types::{GlyphIndex, RenderMethod, RenderedGlyph, SdfGlyph};
use glyphforge_core::RasterizationError;
use kurbo::{BezPath, Shape};

use crate::capture::{capture, PixelBox};
use crate::edges::{contours, encode, nearest_distance, plain_edges};

/// Distance added to every sample when faking a bold face
pub(crate) const BOLD_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SdfRenderer;

impl SdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render `glyph` with `buffer` pixels of padding on each side
    pub fn render_glyph(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
        buffer: u32,
    ) -> Result<RenderedGlyph, RasterizationError> {
        let captured = capture(font, glyph)?;
        let Some(bounds) = captured.pixel_box() else {
            return Ok(RenderedGlyph::empty(
                RenderMethod::Sdf,
                glyph,
                captured.advance,
                buffer,
            ));
        };

        let bold = font.property().synthetic_bold();
        let bounds = padded_box(bounds, buffer, bold);
        bounds.image_len(1)?;
        let offset = if bold { BOLD_OFFSET } else { 0.0 };
        let pixels = distance_field(&captured.path, &bounds, buffer, offset);

        Ok(RenderedGlyph::Sdf(SdfGlyph {
            index: glyph,
            metrics: bounds.metrics(captured.advance),
            buffer,
            pixels,
        }))
    }
}

/// Glyph box grown by the padding, plus one more pixel for synthetic bold
pub(crate) fn padded_box(bounds: PixelBox, buffer: u32, bold: bool) -> PixelBox {
    let extra = u32::from(bold);
    bounds.grow(buffer.saturating_add(extra))
}

/// Signed distance to `path` at every pixel centre of `bounds`, top row first
pub(crate) fn distance_field(path: &BezPath, bounds: &PixelBox, buffer: u32, offset: f64) -> Vec<u8> {
    let edges = plain_edges(&contours(path));
    let (width, height) = (bounds.width(), bounds.height());
    let mut pixels = Vec::with_capacity(width as usize * height as usize);

    for row in 0..height {
        for col in 0..width {
            let p = bounds.sample_point(col, row);
            let distance = nearest_distance(&edges, p);
            let signed = if path.winding(p) != 0 {
                distance
            } else {
                -distance
            };
            pixels.push(encode(signed + offset, buffer));
        }
    }

    pixels
}
