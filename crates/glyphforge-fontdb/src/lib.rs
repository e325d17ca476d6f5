// this_file: crates/glyphforge-fontdb/src/lib.rs

//! Where font bytes become faces: loading and metrics for Glyphforge
//!
//! A [`FontFace`] owns the raw bytes of one face and parses them on demand,
//! the same way every backend does: read-fonts for table access, skrifa for
//! scaled metrics and names. The character map is read once at load time so
//! per-character lookups never reparse the font. The face is immutable once
//! constructed.
//!
//! Bytes come from a [`FontProvider`], so callers decide whether fonts live
//! on disk, inside the binary, or both.

pub mod provider;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use read_fonts::types::Tag;
use skrifa::attribute::Style;
use skrifa::instance::{LocationRef, Size};
use skrifa::string::StringId;
use skrifa::{FontRef as SkrifaFontRef, MetadataProvider};

use glyphforge_core::traits::{FontRef, ScalerLock};
use glyphforge_core::types::{FaceProperty, FontStyle, GlyphIndex};
use glyphforge_core::FontLoadError;

pub use provider::{
    ChainProvider, EmbeddedProvider, FileSystemProvider, FontProvider, MAX_FONT_FILE_SIZE,
};

/// Tables that carry glyph contours; a face needs at least one of them
const OUTLINE_TABLES: [&[u8; 4]; 3] = [b"glyf", b"CFF ", b"CFF2"];

/// Weight class from which a face counts as natively bold
const BOLD_WEIGHT: f32 = 600.0;

/// One loaded face at one pixel size and requested style
pub struct FontFace {
    data: Arc<[u8]>,
    face_index: u32,
    property: FaceProperty,
    /// Codepoint to glyph, notdef mappings left out
    cmap: HashMap<u32, GlyphIndex>,
    scaler: ScalerLock,
}

impl FontFace {
    /// Parse a face out of raw font bytes.
    ///
    /// `size` is in pixels per em. Fails with `InvalidData` when the bytes
    /// are not a font and `NotSupported` when the face lacks outlines or a
    /// character map.
    pub fn from_data(
        data: impl Into<Arc<[u8]>>,
        face_index: u32,
        size: u32,
        style: FontStyle,
    ) -> Result<Self, FontLoadError> {
        let data: Arc<[u8]> = data.into();
        let (property, cmap) = read_face(&data, face_index, size, style)?;

        log::info!(
            "Loaded font face {} {} ({} glyphs, {}px, {:?})",
            property.family_name,
            property.style_name,
            property.glyph_count,
            size,
            style
        );

        Ok(Self {
            data,
            face_index,
            property,
            cmap,
            scaler: ScalerLock::new(),
        })
    }

    /// Read a face from disk through the file-system provider
    pub fn from_file(
        path: impl AsRef<Path>,
        face_index: u32,
        size: u32,
        style: FontStyle,
    ) -> Result<Self, FontLoadError> {
        let path = path.as_ref().to_string_lossy();
        let data = FileSystemProvider::new().load(&path)?;
        Self::from_data(data, face_index, size, style)
    }

    /// Load `path` through any provider
    pub fn from_provider(
        provider: &dyn FontProvider,
        path: &str,
        face_index: u32,
        size: u32,
        style: FontStyle,
    ) -> Result<Self, FontLoadError> {
        let data = provider.load(path)?;
        Self::from_data(data, face_index, size, style)
    }

    /// Shared handle to the raw bytes
    pub fn shared_data(&self) -> Arc<[u8]> {
        self.data.clone()
    }

    pub fn size(&self) -> u32 {
        self.property.size
    }

    pub fn style(&self) -> FontStyle {
        self.property.style
    }

    /// Number of characters the face maps to a real glyph
    pub fn mapped_chars(&self) -> usize {
        self.cmap.len()
    }
}

impl FontRef for FontFace {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn face_index(&self) -> u32 {
        self.face_index
    }

    fn property(&self) -> &FaceProperty {
        &self.property
    }

    fn glyph_id(&self, ch: char) -> Option<GlyphIndex> {
        self.cmap.get(&u32::from(ch)).copied()
    }

    fn scaler_lock(&self) -> &ScalerLock {
        &self.scaler
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.property.family_name)
            .field("style", &self.property.style_name)
            .field("face_index", &self.face_index)
            .field("size", &self.property.size)
            .field("mapped_chars", &self.mapped_chars())
            .finish()
    }
}

fn read_face(
    data: &[u8],
    face_index: u32,
    size: u32,
    style: FontStyle,
) -> Result<(FaceProperty, HashMap<u32, GlyphIndex>), FontLoadError> {
    let font =
        SkrifaFontRef::from_index(data, face_index).map_err(|_| FontLoadError::InvalidData)?;

    let has_outlines = OUTLINE_TABLES
        .iter()
        .any(|tag| font.table_data(Tag::new(tag)).is_some());
    if !has_outlines {
        return Err(FontLoadError::NotSupported(
            "face has no glyf, CFF or CFF2 outlines".into(),
        ));
    }
    if font.table_data(Tag::new(b"cmap")).is_none() {
        return Err(FontLoadError::NotSupported(
            "face has no character map".into(),
        ));
    }

    let metrics = font.metrics(Size::new(size as f32), LocationRef::default());
    let attributes = font.attributes();

    let name = |id: StringId| {
        font.localized_strings(id)
            .english_or_first()
            .map(|s| s.to_string())
            .unwrap_or_default()
    };

    let cmap = font
        .charmap()
        .mappings()
        .map(|(codepoint, gid)| (codepoint, gid.to_u32()))
        .filter(|&(_, gid)| gid != 0)
        .collect();

    let property = FaceProperty {
        family_name: name(StringId::FAMILY_NAME),
        style_name: name(StringId::SUBFAMILY_NAME),
        units_per_em: metrics.units_per_em,
        size,
        ascender: metrics.ascent,
        descender: metrics.descent,
        line_gap: metrics.leading,
        height: metrics.ascent - metrics.descent + metrics.leading,
        glyph_count: u32::from(metrics.glyph_count),
        style,
        native_bold: attributes.weight.value() >= BOLD_WEIGHT,
        native_italic: attributes.style != Style::Normal,
    };

    Ok((property, cmap))
}
