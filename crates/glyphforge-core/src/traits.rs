//! The contracts that bind every backend together
//!
//! - [`FontRef`] - your window into one loaded face
//! - [`Shaper`] - where characters become glyph clusters
//! - [`GlyphRenderer`] - where one glyph becomes one image
//!
//! None of these memoize anything. Caching lives in
//! [`crate::glyph_cache::GlyphCache`], which calls through them on a miss.

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::types::{
    FaceProperty, GlyphCluster, GlyphIndex, RenderMethod, RenderedGlyph, NOTDEF,
};
use crate::RenderParams;

/// Serializes shaping and rasterization against one face.
///
/// A face's scaler is not assumed to be re-entrant, so every shape or render
/// call holds this lock for its duration. The lock is taken by the caller of
/// [`Shaper::shape`] or [`GlyphRenderer::render`], never by the
/// implementation. Callers that also hold a cache lock take the cache lock
/// first.
#[derive(Debug, Default)]
pub struct ScalerLock(Mutex<()>);

impl ScalerLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until this face's scaler is free
    pub fn hold(&self) -> MutexGuard<'_, ()> {
        self.0.lock()
    }
}

/// One loaded face at one pixel size and style
///
/// ```ignore
/// struct MyFont {
///     data: Vec<u8>,
///     property: FaceProperty,
///     scaler: ScalerLock,
/// }
///
/// impl FontRef for MyFont {
///     fn data(&self) -> &[u8] {
///         &self.data
///     }
///
///     fn property(&self) -> &FaceProperty {
///         &self.property
///     }
///
///     fn glyph_id(&self, ch: char) -> Option<GlyphIndex> {
///         None
///     }
///
///     fn scaler_lock(&self) -> &ScalerLock {
///         &self.scaler
///     }
/// }
/// ```
pub trait FontRef: Send + Sync {
    /// Raw font bytes as they live in the file
    fn data(&self) -> &[u8];

    /// Face index inside a collection file (0 for single fonts)
    fn face_index(&self) -> u32 {
        0
    }

    /// Metrics, names and style of the face
    fn property(&self) -> &FaceProperty;

    /// Character map lookup; `None` when the font has no glyph for `ch`
    fn glyph_id(&self, ch: char) -> Option<GlyphIndex>;

    /// The lock every shaping and rendering call against this face holds
    fn scaler_lock(&self) -> &ScalerLock;
}

/// Where characters learn which glyphs draw them
pub trait Shaper: Send + Sync {
    /// Identify yourself in logs
    fn name(&self) -> &'static str;

    /// Map `text` to an ordered cluster sequence.
    ///
    /// Implementations resolve unmappable input to glyph 0 rather than
    /// failing; an `Err` is reserved for conditions where no sequence at all
    /// can be produced.
    fn shape(&self, text: &str, font: &dyn FontRef) -> Result<Vec<GlyphCluster>>;
}

/// Where a single glyph becomes visible
///
/// Rendering is a pure function of (face, glyph, params): two calls with the
/// same inputs yield bit-identical output.
pub trait GlyphRenderer: Send + Sync {
    /// Your renderer's signature
    fn name(&self) -> &'static str;

    /// Which representation `render` produces
    fn method(&self) -> RenderMethod;

    /// Render one glyph. Glyph 0 and blank outlines come back as
    /// [`RenderedGlyph::empty`], not as errors.
    fn render(
        &self,
        font: &dyn FontRef,
        glyph: GlyphIndex,
        params: &RenderParams,
    ) -> Result<RenderedGlyph>;

    /// Width and height of the image `render` would produce, without
    /// rasterizing it.
    ///
    /// `Ok(None)` means blank output or a renderer that cannot tell in
    /// advance. The cache uses this to refuse glyphs no atlas page can hold
    /// before paying for them; the same locking rules as `render` apply.
    fn extent(
        &self,
        _font: &dyn FontRef,
        _glyph: GlyphIndex,
        _params: &RenderParams,
    ) -> Result<Option<(u32, u32)>> {
        Ok(None)
    }
}

/// Shape `text` while holding the face's scaler lock.
///
/// A shaper error never reaches the caller: every character of the run
/// becomes its own cluster on glyph 0 and a warning is logged.
pub fn shape_run(shaper: &dyn Shaper, font: &dyn FontRef, text: &str) -> Vec<GlyphCluster> {
    let shaped = {
        let _scaler = font.scaler_lock().hold();
        shaper.shape(text, font)
    };

    match shaped {
        Ok(clusters) => clusters,
        Err(err) => {
            log::warn!(
                "{} could not shape {:?}: {}; falling back to notdef",
                shaper.name(),
                text,
                err
            );
            text.char_indices()
                .map(|(offset, _)| GlyphCluster {
                    glyph: NOTDEF,
                    cluster: offset as u32,
                })
                .collect()
        },
    }
}
