//! Multi-channel signed distance fields
//!
//! Edges are coloured so that the two segments meeting at a corner share
//! only one channel. Each channel then stores the signed pseudo-distance to
//! its own closest edge; a shader taking the median of the three channels
//! reconstructs the sharp corner that a single-channel field would round
//! off.
//!
//! Pixels whose median disagrees with the winding test (the classic MSDF
//! artifact where two channels cross inside a thin stem) fall back to the
//! true distance on all three channels.

use glyphforge_core::traits::FontRef;
use glyphforge_core::types::{GlyphIndex, MsdfGlyph, RenderMethod, RenderedGlyph};
use glyphforge_core::RasterizationError;
use kurbo::{BezPath, Shape};

use crate::capture::{capture, PixelBox};
use crate::edges::{
    channel_hits, colored_edges, contours, encode, inside_sign, median, nearest_distance,
    plain_edges, signed_pseudo_distance,
};
use crate::sdf::{padded_box, BOLD_OFFSET};

#[derive(Debug, Clone, Copy, Default)]
pub struct MsdfRenderer;

impl MsdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render `glyph` as interleaved RGB with `buffer` pixels of padding
    pub fn render_glyph(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
        buffer: u32,
    ) -> Result<RenderedGlyph, RasterizationError> {
        let captured = capture(font, glyph)?;
        let Some(bounds) = captured.pixel_box() else {
            return Ok(RenderedGlyph::empty(
                RenderMethod::Msdf,
                glyph,
                captured.advance,
                buffer,
            ));
        };

        let bold = font.property().synthetic_bold();
        let bounds = padded_box(bounds, buffer, bold);
        bounds.image_len(3)?;
        let offset = if bold { BOLD_OFFSET } else { 0.0 };
        let pixels = multi_distance_field(&captured.path, &bounds, buffer, offset);

        Ok(RenderedGlyph::Msdf(MsdfGlyph {
            index: glyph,
            metrics: bounds.metrics(captured.advance),
            buffer,
            pixels,
        }))
    }
}

/// RGB distances to `path` at every pixel centre of `bounds`, top row first
pub(crate) fn multi_distance_field(
    path: &BezPath,
    bounds: &PixelBox,
    buffer: u32,
    offset: f64,
) -> Vec<u8> {
    let contours = contours(path);
    let sign = inside_sign(&contours);
    let colored = colored_edges(&contours);
    let plain = plain_edges(&contours);

    let (width, height) = (bounds.width(), bounds.height());
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);

    for row in 0..height {
        for col in 0..width {
            let p = bounds.sample_point(col, row);
            let inside = path.winding(p) != 0;
            let true_distance = {
                let d = nearest_distance(&plain, p);
                if inside {
                    d
                } else {
                    -d
                }
            };

            let hits = channel_hits(&colored, p);
            let mut channels = [true_distance; 3];
            for (value, hit) in channels.iter_mut().zip(hits.iter()) {
                if let Some(hit) = hit {
                    *value = sign * signed_pseudo_distance(&colored, hit, p);
                }
            }

            let m = median(channels[0], channels[1], channels[2]);
            if (m > 0.0) != inside && m != 0.0 {
                channels = [true_distance; 3];
            }

            for value in channels {
                pixels.push(encode(value + offset, buffer));
            }
        }
    }

    pixels
}
