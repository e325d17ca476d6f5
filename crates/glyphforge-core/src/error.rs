//! Error types for Glyphforge
//!
//! Construction-time failures (`FontLoadError`) are terminal for the font
//! that hit them. Per-glyph failures (`ShapingError`, `RasterizationError`)
//! are logged and degrade to glyph 0 or an empty glyph. Atlas exhaustion is
//! the one steady-state failure handed back to the caller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlyphError>;

/// Main error type for Glyphforge
#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Shaping failed: {0}")]
    Shaping(#[from] ShapingError),

    #[error("Rasterization failed: {0}")]
    Rasterization(#[from] RasterizationError),

    #[error("Atlas exhausted: all {max_pages} pages of {page_size}x{page_size} are full")]
    AtlasExhausted { max_pages: u32, page_size: u32 },

    #[error("Glyph of {width}x{height} can never fit a {page_size}x{page_size} atlas page")]
    GlyphTooLarge {
        width: u32,
        height: u32,
        page_size: u32,
    },

    #[error("Pixel buffer of {actual} bytes does not fill a {expected} byte slot")]
    PixelBufferMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Font loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Embedded font resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Font file {path} is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Invalid font data")]
    InvalidData,

    #[error("Font not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Background font loader panicked")]
    LoaderPanicked,
}

/// Shaping errors
#[derive(Debug, Error)]
pub enum ShapingError {
    #[error("Font data could not be parsed for shaping")]
    InvalidFont,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Rasterization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterizationError {
    #[error("Font data could not be parsed for rasterization")]
    InvalidFont,

    #[error("Glyph {0} not found in font")]
    GlyphNotFound(u32),

    #[error("Outline extraction failed")]
    OutlineExtractionFailed,

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_load_error_converts_into_glyph_error() {
        let err: GlyphError = FontLoadError::InvalidData.into();
        assert!(matches!(err, GlyphError::FontLoad(FontLoadError::InvalidData)));
        assert_eq!(err.to_string(), "Font loading failed: Invalid font data");
    }

    #[test]
    fn atlas_exhausted_names_the_limit() {
        let err = GlyphError::AtlasExhausted {
            max_pages: 2,
            page_size: 64,
        };
        assert_eq!(
            err.to_string(),
            "Atlas exhausted: all 2 pages of 64x64 are full"
        );
    }
}
