//! Atlas-backed glyph cache
//!
//! One cache serves one face with one renderer. Entries are keyed by glyph
//! index plus the render parameters that shape the image, created on first
//! request and never mutated or evicted afterwards: pages only grow until
//! `AtlasConfig::max_pages` is reached.
//!
//! Every `get_or_render` call runs under the cache lock from lookup to
//! atlas insert, so concurrent callers observe an entry either fully
//! inserted or absent. The face's scaler lock is taken inside it, around the
//! renderer call only.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::atlas::{Atlas, AtlasPage, AtlasRect, AtlasSlot, PageId};
use crate::config::AtlasConfig;
use crate::error::{GlyphError, Result};
use crate::traits::{shape_run, FontRef, GlyphRenderer, Shaper};
use crate::types::{GlyphIndex, GlyphMetrics, RenderMethod, RenderedGlyph};
use crate::RenderParams;

/// Content address of one cached image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub glyph: GlyphIndex,
    pub params: RenderParams,
}

/// What the draw backend needs to place one glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedGlyph {
    pub glyph: GlyphIndex,
    /// Shading tag for the draw backend
    pub method: RenderMethod,
    /// `None` for zero-area glyphs, which occupy no atlas space
    pub slot: Option<AtlasSlot>,
    pub metrics: GlyphMetrics,
    /// Distance-field padding baked into the image; 0 for bitmaps
    pub buffer: u32,
}

impl CachedGlyph {
    pub fn page(&self) -> Option<PageId> {
        self.slot.map(|slot| slot.page)
    }

    pub fn rect(&self) -> Option<AtlasRect> {
        self.slot.map(|slot| slot.rect)
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

/// One cluster of a prepared run with its resident atlas entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreparedGlyph {
    /// Byte offset of the source text this glyph came from
    pub cluster: u32,
    pub entry: CachedGlyph,
}

/// Cache effectiveness counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: u64,
    /// Requests that found no entry
    pub misses: u64,
    /// Renderer invocations
    pub renders: u64,
    /// Atlas pages currently allocated
    pub pages: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<GlyphKey, CachedGlyph>,
    atlas: Atlas,
    stats: CacheStats,
}

/// Memoizes one renderer's output in fixed-size atlas pages
pub struct GlyphCache<R> {
    renderer: R,
    params: RenderParams,
    state: Mutex<CacheState>,
}

impl<R: GlyphRenderer> GlyphCache<R> {
    /// Bind a renderer to a fresh, empty atlas.
    ///
    /// Fails with `GlyphError::Config` for an invalid atlas geometry or a
    /// renderer whose output has no pixel representation.
    pub fn new(renderer: R, params: RenderParams, atlas: AtlasConfig) -> Result<Self> {
        atlas.validate()?;

        let method = renderer.method();
        let channels = method.channels();
        if channels == 0 {
            return Err(GlyphError::Config(format!(
                "{} renders {:?} glyphs, which cannot live in an atlas",
                renderer.name(),
                method
            )));
        }

        Ok(Self {
            renderer,
            params,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                atlas: Atlas::new(atlas, channels),
                stats: CacheStats::default(),
            }),
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn method(&self) -> RenderMethod {
        self.renderer.method()
    }

    pub fn params(&self) -> RenderParams {
        self.params
    }

    /// The key this cache files `glyph` under
    pub fn key(&self, glyph: GlyphIndex) -> GlyphKey {
        GlyphKey {
            glyph,
            params: self.params,
        }
    }

    /// Return the resident entry for `glyph`, rendering it on a miss
    pub fn get_or_render(&self, font: &dyn FontRef, glyph: GlyphIndex) -> Result<CachedGlyph> {
        self.get_or_render_key(font, self.key(glyph))
    }

    /// Like [`get_or_render`](Self::get_or_render) with explicit parameters.
    ///
    /// A rasterization failure is stored as an empty entry, so it is not
    /// retried. Atlas errors leave the cache unchanged and are returned;
    /// a glyph whose [`GlyphRenderer::extent`] can never fit a page is
    /// refused with `GlyphTooLarge` before it is rendered.
    pub fn get_or_render_key(&self, font: &dyn FontRef, key: GlyphKey) -> Result<CachedGlyph> {
        let mut state = self.state.lock();

        if let Some(entry) = state.entries.get(&key).copied() {
            state.stats.hits += 1;
            return Ok(entry);
        }
        state.stats.misses += 1;

        let method = self.renderer.method();
        let rendered = {
            let _scaler = font.scaler_lock().hold();
            // An extent error is left for `render` to report and degrade
            if let Ok(Some((width, height))) = self.renderer.extent(font, key.glyph, &key.params)
            {
                state.atlas.check_fits(width, height)?;
            }
            self.renderer.render(font, key.glyph, &key.params)
        };
        state.stats.renders += 1;

        let rendered = match rendered {
            Ok(glyph) => glyph,
            Err(GlyphError::Rasterization(err)) => {
                log::warn!(
                    "{} failed on glyph {}: {}; caching it as empty",
                    self.renderer.name(),
                    key.glyph,
                    err
                );
                RenderedGlyph::empty(method, key.glyph, 0.0, key.params.buffer)
            },
            Err(err) => return Err(err),
        };

        let metrics = *rendered.metrics();
        let slot = match rendered.pixels() {
            Some(pixels) if !rendered.is_empty() => {
                Some(state.atlas.insert(metrics.width, metrics.height, pixels)?)
            },
            _ => None,
        };

        let entry = CachedGlyph {
            glyph: key.glyph,
            method,
            slot,
            metrics,
            buffer: if method.is_distance_field() {
                key.params.buffer
            } else {
                0
            },
        };
        state.entries.insert(key, entry);

        log::debug!(
            "GlyphCache miss: glyph {} rendered by {} into {:?}",
            key.glyph,
            self.renderer.name(),
            slot
        );

        Ok(entry)
    }

    /// Read-only lookup; never renders
    pub fn lookup(&self, key: &GlyphKey) -> Option<CachedGlyph> {
        let mut state = self.state.lock();
        let found = state.entries.get(key).copied();
        if found.is_some() {
            state.stats.hits += 1;
        } else {
            state.stats.misses += 1;
        }
        found
    }

    /// Shape `text` and make every distinct glyph it references resident.
    ///
    /// The result follows cluster order. Once this returns, drawing the run
    /// needs no further renders; a full atlas aborts with `AtlasExhausted`
    /// and keeps whatever glyphs were inserted before it.
    pub fn prepare(
        &self,
        font: &dyn FontRef,
        shaper: &dyn Shaper,
        text: &str,
    ) -> Result<Vec<PreparedGlyph>> {
        let clusters = shape_run(shaper, font, text);

        let mut resident: HashMap<GlyphIndex, CachedGlyph> = HashMap::new();
        let mut prepared = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            let entry = match resident.get(&cluster.glyph) {
                Some(entry) => *entry,
                None => {
                    let entry = self.get_or_render(font, cluster.glyph)?;
                    resident.insert(cluster.glyph, entry);
                    entry
                },
            };
            prepared.push(PreparedGlyph {
                cluster: cluster.cluster,
                entry,
            });
        }

        Ok(prepared)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.state.lock().atlas.page_count()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            pages: state.atlas.page_count(),
            ..state.stats
        }
    }

    pub fn atlas_config(&self) -> AtlasConfig {
        *self.state.lock().atlas.config()
    }

    /// Run `f` against one page while the cache lock is held
    pub fn with_page<T>(&self, id: PageId, f: impl FnOnce(&AtlasPage) -> T) -> Option<T> {
        let state = self.state.lock();
        state.atlas.page(id).map(f)
    }

    /// Copy the pixels of one slot out of its page
    pub fn read_slot(&self, slot: &AtlasSlot) -> Option<Vec<u8>> {
        self.state.lock().atlas.read_slot(slot)
    }

    /// Pages written since the previous call, for incremental texture upload
    pub fn take_dirty_pages(&self) -> Vec<PageId> {
        self.state.lock().atlas.take_dirty_pages()
    }
}

impl<R> std::fmt::Debug for GlyphCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("GlyphCache")
            .field("params", &self.params)
            .field("entries", &state.entries.len())
            .field("pages", &state.atlas.page_count())
            .finish()
    }
}
