//! Vector outlines as flattened point rings

use glyphforge_core::traits::FontRef;
use glyphforge_core::types::{
    CloseRing, GlyphIndex, OutlineGlyph, Point, RenderMethod, RenderedGlyph, Ring,
};
use glyphforge_core::RasterizationError;
use kurbo::{BezPath, PathEl};

use crate::capture::capture;

/// Maximum distance between a curve and its flattened polyline, in pixels
pub const FLATTEN_TOLERANCE: f64 = 0.25;

/// Point rings straight from the font's contours.
///
/// Points are relative to the pen position with y pointing down, so a
/// consumer can add them to a screen-space origin directly. Outlines are
/// never emboldened.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

impl OutlineRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_glyph(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
        close: CloseRing,
    ) -> Result<RenderedGlyph, RasterizationError> {
        let captured = capture(font, glyph)?;
        let Some(bounds) = captured.pixel_box() else {
            return Ok(RenderedGlyph::empty(
                RenderMethod::Outline,
                glyph,
                captured.advance,
                0,
            ));
        };

        Ok(RenderedGlyph::Outline(OutlineGlyph {
            index: glyph,
            metrics: bounds.metrics(captured.advance),
            rings: rings(&captured.path, close),
        }))
    }
}

/// Flatten `path` into rings, applying the closure policy
pub(crate) fn rings(path: &BezPath, close: CloseRing) -> Vec<Ring> {
    let mut rings = Vec::new();
    let mut current = Ring::default();

    let finish = |ring: &mut Ring, rings: &mut Vec<Ring>| {
        let mut ring = std::mem::take(ring);
        if close == CloseRing::ForceClosed {
            if let (Some(&first), Some(&last)) = (ring.points.first(), ring.points.last()) {
                if first != last {
                    ring.points.push(first);
                }
            }
            ring.closed = true;
        }
        if ring.points.len() >= 2 {
            rings.push(ring);
        }
    };

    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            finish(&mut current, &mut rings);
            current.points.push(to_screen(p));
        },
        PathEl::LineTo(p) => current.points.push(to_screen(p)),
        PathEl::ClosePath => {
            current.closed = true;
            finish(&mut current, &mut rings);
        },
        // flatten only emits the three variants above
        PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => current.points.push(to_screen(p)),
    });
    finish(&mut current, &mut rings);

    rings
}

fn to_screen(p: kurbo::Point) -> Point {
    Point::new(p.x as f32, -p.y as f32)
}
