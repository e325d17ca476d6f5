//! Glyphforge - text to atlas-resident glyph images
//!
//! [`FontData`] is the one object the rest of an engine talks to. It owns a
//! loaded face, a harfrust shaper and a glyph cache bound to the
//! rasterization method chosen at load time:
//!
//! ```text
//! text ─▶ Shaper ─▶ clusters ─▶ GlyphCache ─▶ atlas slot + metrics ─▶ draw backend
//!                                   │ miss
//!                                   ▼
//!                          Bitmap / SDF / MSDF renderer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use glyphforge::prelude::*;
//!
//! let font = FontData::load(
//!     &FileSystemProvider::new(),
//!     "fonts/Inter.ttf",
//!     FontConfig::new(32).with_method(FontMethod::Sdf).with_buffer(4),
//!     AtlasConfig::from_env(),
//! );
//!
//! // Make the run resident before drawing it
//! for glyph in font.prepare("Hello")? {
//!     // glyph.entry.slot, glyph.entry.metrics ...
//! }
//! ```
//!
//! A font that fails to load is still a `FontData`; every query on it
//! returns an empty result, so callers never special-case "no font".

mod font_data;
mod pending;

pub use font_data::{FontData, FontState};
pub use pending::PendingFont;

pub use glyphforge_core::{
    atlas, error, traits, types, AtlasConfig, AtlasSlot, CacheStats, CachedGlyph, FontConfig,
    PageId, PreparedGlyph,
};
pub use glyphforge_fontdb as fontdb;
pub use glyphforge_raster as raster;
pub use glyphforge_shape_hr as shape_hr;

/// Common imports for typical usage
pub mod prelude {
    pub use crate::{FontData, FontState, PendingFont};
    pub use glyphforge_core::{
        error::{FontLoadError, GlyphError, Result},
        traits::{FontRef, GlyphRenderer, Shaper},
        types::{CloseRing, FontMethod, FontStyle, GlyphCluster, GlyphIndex, RenderMethod},
        AtlasConfig, AtlasSlot, CachedGlyph, FontConfig, PageId, PreparedGlyph,
    };
    pub use glyphforge_fontdb::{
        ChainProvider, EmbeddedProvider, FileSystemProvider, FontFace, FontProvider,
    };
}
