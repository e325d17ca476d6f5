//! One font, one rasterization method, one cache

use std::sync::Arc;

use glyphforge_core::atlas::AtlasPage;
use glyphforge_core::error::{GlyphError, Result};
use glyphforge_core::traits::{shape_run, FontRef, GlyphRenderer, Shaper};
use glyphforge_core::types::{
    BitmapGlyph, CloseRing, FaceProperty, FontMethod, GlyphCluster, GlyphIndex, GlyphInfo,
    GlyphMetrics, MsdfGlyph, OutlineGlyph, RenderMethod, RenderedGlyph, SdfGlyph, NOTDEF,
};
use glyphforge_core::{
    AtlasConfig, AtlasSlot, CacheStats, CachedGlyph, FontConfig, GlyphCache, PageId,
    PreparedGlyph, RenderParams,
};
use glyphforge_fontdb::{FontFace, FontProvider};
use glyphforge_raster::Renderer;
use glyphforge_shape_hr::HarfrustShaper;

/// Where a `FontData` is in its life
///
/// `Loading` is only ever reported by a [`crate::PendingFont`]; a
/// `FontData` in hand is always `Null`, `Ready` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontState {
    /// Deliberately empty; every query returns an empty result
    Null,
    /// Construction is still running on a loader thread
    Loading,
    /// Face loaded and cache bound to its method
    Ready,
    /// Construction gave up; behaves exactly like `Null`
    Failed,
}

struct ReadyFont {
    face: Arc<dyn FontRef>,
    shaper: Arc<dyn Shaper>,
    cache: GlyphCache<Renderer>,
    config: FontConfig,
}

enum Inner {
    Null,
    Ready(Box<ReadyFont>),
    Failed(GlyphError),
}

/// A loaded font bound to a glyph cache.
///
/// The rasterization method is fixed at construction. All methods take
/// `&self`, so one `FontData` can be shared between threads preparing draw
/// lists; shaping and rendering against the face are serialized internally.
pub struct FontData {
    inner: Inner,
}

impl FontData {
    /// The explicit "no font" value
    pub fn null() -> Self {
        Self { inner: Inner::Null }
    }

    pub(crate) fn failed(err: impl Into<GlyphError>) -> Self {
        Self {
            inner: Inner::Failed(err.into()),
        }
    }

    /// Load `path` through `provider` and shape with harfrust.
    ///
    /// Never fails: a missing file, corrupt data or invalid configuration
    /// gives a `Failed` font whose error is kept in [`load_error`].
    ///
    /// [`load_error`]: Self::load_error
    pub fn load(
        provider: &dyn FontProvider,
        path: &str,
        config: FontConfig,
        atlas: AtlasConfig,
    ) -> Self {
        match Self::try_load(provider, path, config, atlas) {
            Ok(font) => font,
            Err(err) => {
                log::warn!("Font {} failed to load: {}", path, err);
                Self::failed(err)
            },
        }
    }

    fn try_load(
        provider: &dyn FontProvider,
        path: &str,
        config: FontConfig,
        atlas: AtlasConfig,
    ) -> Result<Self> {
        config.validate()?;
        atlas.validate()?;
        let face = FontFace::from_provider(provider, path, 0, config.size, config.style)?;
        Self::from_face(Arc::new(face), Arc::new(HarfrustShaper::new()), config, atlas)
    }

    /// Build a ready font from collaborators the caller already has
    pub fn from_face(
        face: Arc<dyn FontRef>,
        shaper: Arc<dyn Shaper>,
        config: FontConfig,
        atlas: AtlasConfig,
    ) -> Result<Self> {
        config.validate()?;
        atlas.validate()?;

        let params = RenderParams {
            buffer: config.buffer,
            ..RenderParams::default()
        };
        let cache = GlyphCache::new(Renderer::for_font_method(config.method), params, atlas)?;

        log::info!(
            "FontData ready: {} at {}px, {:?} via {}, shaped by {}",
            face.property().family_name,
            config.size,
            config.method,
            cache.renderer().name(),
            shaper.name()
        );

        Ok(Self {
            inner: Inner::Ready(Box::new(ReadyFont {
                face,
                shaper,
                cache,
                config,
            })),
        })
    }

    fn ready(&self) -> Option<&ReadyFont> {
        match &self.inner {
            Inner::Ready(ready) => Some(ready),
            Inner::Null | Inner::Failed(_) => None,
        }
    }

    pub fn state(&self) -> FontState {
        match self.inner {
            Inner::Null => FontState::Null,
            Inner::Ready(_) => FontState::Ready,
            Inner::Failed(_) => FontState::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == FontState::Ready
    }

    /// Why construction failed, if it did
    pub fn load_error(&self) -> Option<&GlyphError> {
        match &self.inner {
            Inner::Failed(err) => Some(err),
            Inner::Null | Inner::Ready(_) => None,
        }
    }

    pub fn property(&self) -> Option<&FaceProperty> {
        self.ready().map(|ready| ready.face.property())
    }

    pub fn config(&self) -> Option<FontConfig> {
        self.ready().map(|ready| ready.config)
    }

    pub fn method(&self) -> Option<FontMethod> {
        self.ready().map(|ready| ready.config.method)
    }

    /// Shape `text`; empty for a null font
    pub fn glyph_clusters(&self, text: &str) -> Vec<GlyphCluster> {
        match self.ready() {
            Some(ready) => shape_run(ready.shaper.as_ref(), ready.face.as_ref(), text),
            None => Vec::new(),
        }
    }

    /// The glyph for a single character or grapheme.
    ///
    /// 0 unless shaping `text` yields exactly one cluster.
    pub fn glyph_index(&self, text: &str) -> GlyphIndex {
        match self.glyph_clusters(text).as_slice() {
            [only] => only.glyph,
            _ => NOTDEF,
        }
    }

    /// Whether `text` shapes to exactly one real glyph
    pub fn has_glyph(&self, text: &str) -> bool {
        self.glyph_index(text) != NOTDEF
    }

    /// Make every glyph of `text` resident in the atlas.
    ///
    /// Returns one entry per cluster in shaping order. Only atlas limits
    /// are reported as errors; a null font prepares nothing.
    pub fn prepare(&self, text: &str) -> Result<Vec<PreparedGlyph>> {
        match self.ready() {
            Some(ready) => ready
                .cache
                .prepare(ready.face.as_ref(), ready.shaper.as_ref(), text),
            None => Ok(Vec::new()),
        }
    }

    /// Cache entry for one glyph, rendering on a miss
    pub fn get_or_render(&self, glyph: GlyphIndex) -> Result<Option<CachedGlyph>> {
        match self.ready() {
            Some(ready) => ready
                .cache
                .get_or_render(ready.face.as_ref(), glyph)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Cached entry for `glyph` at this font's parameters, without rendering
    pub fn lookup(&self, glyph: GlyphIndex) -> Option<CachedGlyph> {
        let ready = self.ready()?;
        ready.cache.lookup(&ready.cache.key(glyph))
    }

    /// Advance and ink bounds of `glyph` without touching the cache
    pub fn glyph_info(&self, glyph: GlyphIndex) -> Option<GlyphInfo> {
        let ready = self.ready()?;
        let info = {
            let _scaler = ready.face.scaler_lock().hold();
            glyphforge_raster::glyph_info(ready.face.as_ref(), glyph)
        };
        Some(info.unwrap_or_else(|err| {
            log::warn!("No metrics for glyph {}: {}", glyph, err);
            GlyphInfo {
                index: glyph,
                metrics: GlyphMetrics::default(),
            }
        }))
    }

    /// Render outside the cache with any method, degrading failures to the
    /// empty glyph
    fn render_direct(
        &self,
        method: RenderMethod,
        glyph: GlyphIndex,
        params: RenderParams,
    ) -> Option<RenderedGlyph> {
        let ready = self.ready()?;
        let renderer = Renderer::for_method(method);
        let rendered = {
            let _scaler = ready.face.scaler_lock().hold();
            renderer.render(ready.face.as_ref(), glyph, &params)
        };
        Some(rendered.unwrap_or_else(|err| {
            log::warn!(
                "{} failed on glyph {}: {}; returning an empty glyph",
                renderer.name(),
                glyph,
                err
            );
            RenderedGlyph::empty(method, glyph, 0.0, params.buffer)
        }))
    }

    /// Vector contours of one glyph
    pub fn render_outline(&self, glyph: GlyphIndex, close: CloseRing) -> Option<OutlineGlyph> {
        let params = RenderParams {
            close_ring: close,
            ..RenderParams::default()
        };
        match self.render_direct(RenderMethod::Outline, glyph, params)? {
            RenderedGlyph::Outline(outline) => Some(outline),
            _ => None,
        }
    }

    /// Shape `text` and return the contours of every cluster, in order
    pub fn render_outlines(&self, text: &str, close: CloseRing) -> Vec<OutlineGlyph> {
        self.glyph_clusters(text)
            .into_iter()
            .filter_map(|cluster| self.render_outline(cluster.glyph, close))
            .collect()
    }

    /// Coverage bitmap of one glyph, uncached
    pub fn render_bitmap(&self, glyph: GlyphIndex) -> Option<BitmapGlyph> {
        match self.render_direct(RenderMethod::Bitmap, glyph, RenderParams::default())? {
            RenderedGlyph::Bitmap(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    /// Signed distance field of one glyph with `buffer` pixels of padding,
    /// uncached
    pub fn render_sdf(&self, glyph: GlyphIndex, buffer: u32) -> Option<SdfGlyph> {
        match self.render_direct(RenderMethod::Sdf, glyph, RenderParams::with_buffer(buffer))? {
            RenderedGlyph::Sdf(sdf) => Some(sdf),
            _ => None,
        }
    }

    /// Multi-channel distance field of one glyph, uncached
    pub fn render_msdf(&self, glyph: GlyphIndex, buffer: u32) -> Option<MsdfGlyph> {
        match self.render_direct(RenderMethod::Msdf, glyph, RenderParams::with_buffer(buffer))? {
            RenderedGlyph::Msdf(msdf) => Some(msdf),
            _ => None,
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.ready()
            .map(|ready| ready.cache.stats())
            .unwrap_or_default()
    }

    pub fn cached_glyphs(&self) -> usize {
        self.ready().map_or(0, |ready| ready.cache.len())
    }

    pub fn page_count(&self) -> usize {
        self.ready().map_or(0, |ready| ready.cache.page_count())
    }

    /// Run `f` against one atlas page
    pub fn with_page<T>(&self, id: PageId, f: impl FnOnce(&AtlasPage) -> T) -> Option<T> {
        self.ready()?.cache.with_page(id, f)
    }

    /// Copy one slot's pixels out of the atlas
    pub fn read_slot(&self, slot: &AtlasSlot) -> Option<Vec<u8>> {
        self.ready()?.cache.read_slot(slot)
    }

    /// Pages written since the previous call
    pub fn take_dirty_pages(&self) -> Vec<PageId> {
        self.ready()
            .map(|ready| ready.cache.take_dirty_pages())
            .unwrap_or_default()
    }
}

impl Default for FontData {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("FontData");
        out.field("state", &self.state());
        match &self.inner {
            Inner::Ready(ready) => out
                .field("family", &ready.face.property().family_name)
                .field("config", &ready.config)
                .field("cache", &ready.cache),
            Inner::Failed(err) => out.field("error", err),
            Inner::Null => &mut out,
        };
        out.finish()
    }
}
