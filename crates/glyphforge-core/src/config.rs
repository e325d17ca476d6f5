//! Font and atlas configuration
//!
//! Both structs are plain values validated once, at `FontData` construction.
//! Atlas limits can also be overridden from the environment:
//!
//! ```bash
//! GLYPHFORGE_ATLAS_PAGE_SIZE=2048 GLYPHFORGE_ATLAS_MAX_PAGES=4 ./my_app
//! ```

use crate::error::{GlyphError, Result};
use crate::types::{FontMethod, FontStyle};

/// Default distance-field padding in pixels
pub const DEFAULT_BUFFER: u32 = 3;

/// Default font size in pixels per em
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Default atlas page edge in pixels
pub const DEFAULT_PAGE_SIZE: u32 = 1024;

/// Largest accepted page edge; also bounds any single glyph image
pub const MAX_PAGE_SIZE: u32 = 8192;

/// Default page ceiling per cache
pub const DEFAULT_MAX_PAGES: u32 = 16;

pub const ENV_PAGE_SIZE: &str = "GLYPHFORGE_ATLAS_PAGE_SIZE";
pub const ENV_MAX_PAGES: &str = "GLYPHFORGE_ATLAS_MAX_PAGES";
pub const ENV_PADDING: &str = "GLYPHFORGE_ATLAS_PADDING";

/// What to load and how to rasterize it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontConfig {
    /// Pixels per em
    pub size: u32,
    pub style: FontStyle,
    pub method: FontMethod,
    /// Distance-field padding in pixels; only read for SDF and MSDF
    pub buffer: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            style: FontStyle::Regular,
            method: FontMethod::Bitmap,
            buffer: DEFAULT_BUFFER,
        }
    }
}

impl FontConfig {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_method(mut self, method: FontMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_buffer(mut self, buffer: u32) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(GlyphError::Config("font size must be positive".into()));
        }
        if self.method != FontMethod::Bitmap && self.buffer == 0 {
            return Err(GlyphError::Config(
                "distance-field buffer must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Fixed geometry of a cache's atlas pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Edge length of every (square) page in pixels
    pub page_size: u32,
    /// Page count at which the cache reports `AtlasExhausted`
    pub max_pages: u32,
    /// Empty pixels kept between neighbouring slots
    pub padding: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            padding: 1,
        }
    }
}

impl AtlasConfig {
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            page_size,
            max_pages,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Defaults overridden by `GLYPHFORGE_ATLAS_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = read_u32(&lookup, ENV_PAGE_SIZE) {
            config.page_size = value;
        }
        if let Some(value) = read_u32(&lookup, ENV_MAX_PAGES) {
            config.max_pages = value;
        }
        if let Some(value) = read_u32(&lookup, ENV_PADDING) {
            config.padding = value;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(GlyphError::Config("atlas page size must be positive".into()));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(GlyphError::Config(format!(
                "atlas page size {} exceeds the {}px limit",
                self.page_size, MAX_PAGE_SIZE
            )));
        }
        if self.max_pages == 0 {
            return Err(GlyphError::Config("atlas needs at least one page".into()));
        }
        if self.padding.saturating_mul(2) >= self.page_size {
            return Err(GlyphError::Config(format!(
                "atlas padding {} leaves no room in a {}px page",
                self.padding, self.page_size
            )));
        }
        Ok(())
    }
}

fn read_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u32> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u32>() {
        Ok(value) => {
            log::info!("Glyphforge atlas override {}={}", name, value);
            Some(value)
        },
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not an unsigned integer", name, raw);
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FontConfig::default().validate().is_ok());
        assert!(AtlasConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_size_is_rejected() {
        let err = FontConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, GlyphError::Config(_)));
    }

    #[test]
    fn zero_buffer_only_matters_for_distance_fields() {
        let bitmap = FontConfig::new(12).with_buffer(0);
        assert!(bitmap.validate().is_ok());

        let sdf = bitmap.with_method(FontMethod::Sdf);
        assert!(sdf.validate().is_err());
    }

    #[test]
    fn padding_must_leave_room() {
        let config = AtlasConfig::new(8, 1).with_padding(4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_pages_are_rejected() {
        assert!(AtlasConfig::new(MAX_PAGE_SIZE, 1).validate().is_ok());

        let err = AtlasConfig::new(MAX_PAGE_SIZE + 1, 1).validate().unwrap_err();
        assert!(matches!(err, GlyphError::Config(_)));

        let from_env = AtlasConfig::from_lookup(|name| {
            (name == ENV_PAGE_SIZE).then(|| u32::MAX.to_string())
        });
        assert_eq!(from_env.page_size, u32::MAX);
        assert!(from_env.validate().is_err());
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let config = AtlasConfig::from_lookup(|name| match name {
            ENV_PAGE_SIZE => Some("256".to_string()),
            ENV_MAX_PAGES => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.page_size, 256);
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.padding, 1);
    }
}
