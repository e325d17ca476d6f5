//! Glyphforge Raster: every way a glyph becomes an image
//!
//! All four renderers start from the same place. skrifa draws the glyph at
//! the face's pixel size into a pen that records both SVG path data and a
//! kurbo path, then each method takes what it needs:
//!
//! | Method | Built from | Output |
//! |--------|------------|--------|
//! | Bitmap | zeno scan conversion of the SVG data | 8-bit coverage |
//! | Outline | kurbo flattening | point rings |
//! | SDF | exact segment distances + winding sign | 8-bit distance |
//! | MSDF | coloured edges + pseudo-distances | RGB distances |
//!
//! Renderers keep no state between calls and never take the face's scaler
//! lock; whoever calls [`GlyphRenderer::render`] holds it.
//!
//! Rasterization failures come back as [`RasterizationError`]; the cache
//! decides to turn them into empty glyphs.

mod bitmap;
mod capture;
mod edges;
mod msdf;
mod outline;
mod sdf;

pub use bitmap::BitmapRenderer;
pub use capture::{ITALIC_SHEAR, MAX_GLYPH_EXTENT};
pub use msdf::MsdfRenderer;
pub use outline::{OutlineRenderer, FLATTEN_TOLERANCE};
pub use sdf::SdfRenderer;

use glyphforge_core::{
    error::Result,
    traits::{FontRef, GlyphRenderer},
    types::{FontMethod, GlyphIndex, GlyphInfo, GlyphMetrics, RenderMethod, RenderedGlyph},
    RenderParams,
};

/// The closed set of rasterization strategies, picked once per font
#[derive(Debug, Clone, Copy)]
pub enum Renderer {
    Bitmap(BitmapRenderer),
    Outline(OutlineRenderer),
    Sdf(SdfRenderer),
    Msdf(MsdfRenderer),
}

impl Renderer {
    pub fn for_method(method: RenderMethod) -> Self {
        match method {
            RenderMethod::Bitmap => Self::Bitmap(BitmapRenderer::new()),
            RenderMethod::Outline => Self::Outline(OutlineRenderer::new()),
            RenderMethod::Sdf => Self::Sdf(SdfRenderer::new()),
            RenderMethod::Msdf => Self::Msdf(MsdfRenderer::new()),
        }
    }

    pub fn for_font_method(method: FontMethod) -> Self {
        Self::for_method(method.render_method())
    }
}

impl GlyphRenderer for Renderer {
    fn name(&self) -> &'static str {
        match self {
            Self::Bitmap(_) => "bitmap",
            Self::Outline(_) => "outline",
            Self::Sdf(_) => "sdf",
            Self::Msdf(_) => "msdf",
        }
    }

    fn method(&self) -> RenderMethod {
        match self {
            Self::Bitmap(_) => RenderMethod::Bitmap,
            Self::Outline(_) => RenderMethod::Outline,
            Self::Sdf(_) => RenderMethod::Sdf,
            Self::Msdf(_) => RenderMethod::Msdf,
        }
    }

    fn render(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
        params: &RenderParams,
    ) -> Result<RenderedGlyph> {
        let rendered = match self {
            Self::Bitmap(r) => r.render_glyph(font, glyph),
            Self::Outline(r) => r.render_glyph(font, glyph, params.close_ring),
            Self::Sdf(r) => r.render_glyph(font, glyph, params.buffer),
            Self::Msdf(r) => r.render_glyph(font, glyph, params.buffer),
        }?;
        log::trace!(
            "{} rendered glyph {} at {}x{}",
            self.name(),
            glyph,
            rendered.metrics().width,
            rendered.metrics().height
        );
        Ok(rendered)
    }

    fn extent(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
        params: &RenderParams,
    ) -> Result<Option<(u32, u32)>> {
        let captured = capture::capture(font, glyph)?;
        let Some(bounds) = captured.pixel_box() else {
            return Ok(None);
        };
        let bold = font.property().synthetic_bold();
        let image = match self {
            // Point rings have no pixel footprint
            Self::Outline(_) => return Ok(None),
            Self::Bitmap(_) => bitmap::image_box(bounds, bold),
            Self::Sdf(_) | Self::Msdf(_) => sdf::padded_box(bounds, params.buffer, bold),
        };
        Ok(Some((image.width(), image.height())))
    }
}

/// Advance and unpadded ink bounds of `glyph`, without rasterizing.
///
/// Blank glyphs report zero bounds and keep their advance. Like `render`,
/// the caller holds the scaler lock.
pub fn glyph_info(font: &dyn FontRef, glyph: GlyphIndex) -> Result<GlyphInfo> {
    let captured = capture::capture(font, glyph)?;
    let metrics = match captured.pixel_box() {
        Some(bounds) => bounds.metrics(captured.advance),
        None => GlyphMetrics {
            advance: captured.advance,
            ..GlyphMetrics::default()
        },
    };
    Ok(GlyphInfo {
        index: glyph,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphforge_core::traits::ScalerLock;
    use glyphforge_core::types::{CloseRing, FaceProperty};

    struct GarbageFont {
        property: FaceProperty,
        scaler: ScalerLock,
    }

    impl FontRef for GarbageFont {
        fn data(&self) -> &[u8] {
            b"definitely not sfnt"
        }

        fn property(&self) -> &FaceProperty {
            &self.property
        }

        fn glyph_id(&self, _ch: char) -> Option<GlyphIndex> {
            None
        }

        fn scaler_lock(&self) -> &ScalerLock {
            &self.scaler
        }
    }

    fn garbage() -> GarbageFont {
        GarbageFont {
            property: FaceProperty {
                size: 16,
                ..FaceProperty::default()
            },
            scaler: ScalerLock::new(),
        }
    }

    #[test]
    fn dispatch_follows_the_method() {
        for method in [
            RenderMethod::Bitmap,
            RenderMethod::Outline,
            RenderMethod::Sdf,
            RenderMethod::Msdf,
        ] {
            assert_eq!(Renderer::for_method(method).method(), method);
        }
        assert_eq!(
            Renderer::for_font_method(FontMethod::Msdf).method(),
            RenderMethod::Msdf
        );
    }

    #[test]
    fn unparsable_font_is_a_rasterization_error() {
        let font = garbage();
        let params = RenderParams {
            buffer: 2,
            close_ring: CloseRing::AsAuthored,
        };
        for method in [RenderMethod::Bitmap, RenderMethod::Sdf] {
            let err = Renderer::for_method(method)
                .render(&font, 5, &params)
                .unwrap_err();
            assert!(matches!(
                err,
                glyphforge_core::GlyphError::Rasterization(_)
            ));
        }
        assert!(glyph_info(&font, 5).is_err());
    }

    #[test]
    fn extent_of_an_unparsable_font_is_an_error() {
        let font = garbage();
        let params = RenderParams {
            buffer: 2,
            close_ring: CloseRing::AsAuthored,
        };
        assert!(Renderer::for_method(RenderMethod::Sdf)
            .extent(&font, 5, &params)
            .is_err());
    }
}
