//! Glyphforge Core: from a run of text to atlas-resident glyph images
//!
//! This crate holds everything the glyph engine agrees on, independent of
//! which font parser, shaper, or rasterizer sits behind it.
//!
//! ## The Flow
//!
//! ```text
//! text ──Shaper──▶ [GlyphCluster] ──GlyphCache──▶ [CachedGlyph] ──▶ draw backend
//!                                      │ miss
//!                                      ▼
//!                                GlyphRenderer ──▶ RenderedGlyph ──▶ Atlas page
//! ```
//!
//! ## The Traits
//!
//! - [`traits::FontRef`] - one loaded font face at one pixel size
//! - [`traits::Shaper`] - Unicode text to glyph clusters
//! - [`traits::GlyphRenderer`] - one glyph to one pixel or vector image
//!
//! The cache in [`glyph_cache`] memoizes renderer output in fixed-size
//! [`atlas`] pages that only ever grow.

pub mod atlas;
pub mod config;
pub mod error;
pub mod glyph_cache;
pub mod traits;

pub use atlas::{AtlasRect, AtlasSlot, PageId};
pub use config::{AtlasConfig, FontConfig};
pub use error::{FontLoadError, GlyphError, RasterizationError, Result, ShapingError};
pub use glyph_cache::{CacheStats, CachedGlyph, GlyphCache, GlyphKey, PreparedGlyph};
pub use traits::{shape_run, FontRef, GlyphRenderer, ScalerLock, Shaper};

/// The data structures shared by every stage
pub mod types {
    /// Font-internal identifier of one glyph shape.
    ///
    /// Only meaningful relative to the face that produced it.
    pub type GlyphIndex = u32;

    /// Reserved index meaning "glyph not present" (the notdef glyph).
    pub const NOTDEF: GlyphIndex = 0;

    /// One shaping output unit: a glyph plus the UTF-8 byte offset of the
    /// source text it came from.
    ///
    /// A ligature makes several codepoints share one cluster; a decomposed
    /// mark makes several clusters share one offset.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GlyphCluster {
        pub glyph: GlyphIndex,
        pub cluster: u32,
    }

    /// Requested style of a face
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum FontStyle {
        #[default]
        Regular,
        Bold,
        Italic,
        BoldItalic,
    }

    impl FontStyle {
        pub const fn is_bold(self) -> bool {
            matches!(self, Self::Bold | Self::BoldItalic)
        }

        pub const fn is_italic(self) -> bool {
            matches!(self, Self::Italic | Self::BoldItalic)
        }
    }

    /// Rasterization method a `FontData` commits to at load time.
    ///
    /// Only atlas-backed methods appear here; outlines are always rendered
    /// on demand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum FontMethod {
        #[default]
        Bitmap,
        Sdf,
        Msdf,
    }

    impl FontMethod {
        pub const fn render_method(self) -> RenderMethod {
            match self {
                Self::Bitmap => RenderMethod::Bitmap,
                Self::Sdf => RenderMethod::Sdf,
                Self::Msdf => RenderMethod::Msdf,
            }
        }
    }

    /// Output representation of a renderer, and the shading tag the draw
    /// backend switches on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum RenderMethod {
        /// 8-bit coverage, blended directly
        Bitmap,
        /// Vector point rings, no pixels
        Outline,
        /// Single-channel distance field, threshold antialiasing
        Sdf,
        /// Three-channel distance field, median-of-three threshold
        Msdf,
    }

    impl RenderMethod {
        /// Bytes per pixel in an atlas page; zero for vector output.
        pub const fn channels(self) -> u8 {
            match self {
                Self::Bitmap | Self::Sdf => 1,
                Self::Msdf => 3,
                Self::Outline => 0,
            }
        }

        pub const fn is_distance_field(self) -> bool {
            matches!(self, Self::Sdf | Self::Msdf)
        }
    }

    /// Whether open contours get force-closed when outlines are extracted
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum CloseRing {
        /// Every ring ends on its starting point
        #[default]
        ForceClosed,
        /// Rings keep exactly the points and closure the font authored
        AsAuthored,
    }

    /// A point in pen-relative pixel space, y growing downwards
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Point {
        pub x: f32,
        pub y: f32,
    }

    impl Point {
        pub const fn new(x: f32, y: f32) -> Self {
            Self { x, y }
        }
    }

    /// One flattened contour of an outline glyph
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Ring {
        pub points: Vec<Point>,
        pub closed: bool,
    }

    /// Placement metrics shared by every rendered representation
    ///
    /// `bearing_x` is the offset from the pen position to the left edge of
    /// the image; `bearing_y` the distance from the baseline up to its top
    /// edge. Distance-field images include their padding buffer in all four
    /// numbers.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GlyphMetrics {
        pub bearing_x: i32,
        pub bearing_y: i32,
        pub advance: f32,
        pub width: u32,
        pub height: u32,
    }

    impl GlyphMetrics {
        pub const fn is_empty(&self) -> bool {
            self.width == 0 || self.height == 0
        }
    }

    /// Metrics of a glyph without its image
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GlyphInfo {
        pub index: GlyphIndex,
        pub metrics: GlyphMetrics,
    }

    /// 8-bit coverage raster
    #[derive(Debug, Clone, PartialEq)]
    pub struct BitmapGlyph {
        pub index: GlyphIndex,
        pub metrics: GlyphMetrics,
        pub pixels: Vec<u8>,
    }

    /// Vector contours, flattened to point rings
    #[derive(Debug, Clone, PartialEq)]
    pub struct OutlineGlyph {
        pub index: GlyphIndex,
        pub metrics: GlyphMetrics,
        pub rings: Vec<Ring>,
    }

    /// Single-channel signed distance field
    ///
    /// Each byte encodes `0.5 + distance / (2 * buffer)`; values above 127
    /// are inside the glyph.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SdfGlyph {
        pub index: GlyphIndex,
        pub metrics: GlyphMetrics,
        pub buffer: u32,
        pub pixels: Vec<u8>,
    }

    /// Multi-channel signed distance field, RGB8 interleaved
    #[derive(Debug, Clone, PartialEq)]
    pub struct MsdfGlyph {
        pub index: GlyphIndex,
        pub metrics: GlyphMetrics,
        pub buffer: u32,
        pub pixels: Vec<u8>,
    }

    /// The output of one renderer call, tagged by method
    #[derive(Debug, Clone, PartialEq)]
    pub enum RenderedGlyph {
        Bitmap(BitmapGlyph),
        Outline(OutlineGlyph),
        Sdf(SdfGlyph),
        Msdf(MsdfGlyph),
    }

    impl RenderedGlyph {
        /// The canonical zero-area result for glyph 0, blank glyphs and
        /// rasterizer failures.
        pub fn empty(method: RenderMethod, index: GlyphIndex, advance: f32, buffer: u32) -> Self {
            let metrics = GlyphMetrics {
                advance,
                ..GlyphMetrics::default()
            };
            match method {
                RenderMethod::Bitmap => Self::Bitmap(BitmapGlyph {
                    index,
                    metrics,
                    pixels: Vec::new(),
                }),
                RenderMethod::Outline => Self::Outline(OutlineGlyph {
                    index,
                    metrics,
                    rings: Vec::new(),
                }),
                RenderMethod::Sdf => Self::Sdf(SdfGlyph {
                    index,
                    metrics,
                    buffer,
                    pixels: Vec::new(),
                }),
                RenderMethod::Msdf => Self::Msdf(MsdfGlyph {
                    index,
                    metrics,
                    buffer,
                    pixels: Vec::new(),
                }),
            }
        }

        pub fn method(&self) -> RenderMethod {
            match self {
                Self::Bitmap(_) => RenderMethod::Bitmap,
                Self::Outline(_) => RenderMethod::Outline,
                Self::Sdf(_) => RenderMethod::Sdf,
                Self::Msdf(_) => RenderMethod::Msdf,
            }
        }

        pub fn index(&self) -> GlyphIndex {
            match self {
                Self::Bitmap(g) => g.index,
                Self::Outline(g) => g.index,
                Self::Sdf(g) => g.index,
                Self::Msdf(g) => g.index,
            }
        }

        pub fn metrics(&self) -> &GlyphMetrics {
            match self {
                Self::Bitmap(g) => &g.metrics,
                Self::Outline(g) => &g.metrics,
                Self::Sdf(g) => &g.metrics,
                Self::Msdf(g) => &g.metrics,
            }
        }

        /// Pixel payload for atlas-backed methods, row-major, top row first
        pub fn pixels(&self) -> Option<&[u8]> {
            match self {
                Self::Bitmap(g) => Some(&g.pixels),
                Self::Sdf(g) => Some(&g.pixels),
                Self::Msdf(g) => Some(&g.pixels),
                Self::Outline(_) => None,
            }
        }

        pub fn is_empty(&self) -> bool {
            match self {
                Self::Outline(g) => g.rings.is_empty(),
                _ => self.metrics().is_empty(),
            }
        }
    }

    /// Everything known about a loaded face, scaled to its pixel size
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct FaceProperty {
        pub family_name: String,
        pub style_name: String,
        pub units_per_em: u16,
        /// Pixels per em
        pub size: u32,
        pub ascender: f32,
        /// Negative below the baseline
        pub descender: f32,
        pub line_gap: f32,
        pub height: f32,
        pub glyph_count: u32,
        pub style: FontStyle,
        /// The face itself is bold, so bold requests need no synthesis
        pub native_bold: bool,
        /// The face itself is italic or oblique
        pub native_italic: bool,
    }

    impl FaceProperty {
        pub fn synthetic_bold(&self) -> bool {
            self.style.is_bold() && !self.native_bold
        }

        pub fn synthetic_italic(&self) -> bool {
            self.style.is_italic() && !self.native_italic
        }
    }
}

/// Per-render parameters that take part in a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderParams {
    /// Distance-field padding in pixels; ignored by Bitmap and Outline
    pub buffer: u32,
    /// Ring closure policy; only Outline reads it
    pub close_ring: types::CloseRing,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            buffer: config::DEFAULT_BUFFER,
            close_ring: types::CloseRing::ForceClosed,
        }
    }
}

impl RenderParams {
    pub fn with_buffer(buffer: u32) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }
}
