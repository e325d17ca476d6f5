//! Pure Rust text shaping backend using harfrust
//!
//! Harfrust is a pure Rust port of HarfBuzz. This backend only needs the
//! first half of its output: which glyphs draw the text and which byte of
//! the input each one came from. Positioning is left to the draw backend,
//! which places glyphs from the advances in the cache.
//!
//! Cluster values are UTF-8 byte offsets into the shaped string. A ligature
//! such as "fi" comes back as one glyph on the cluster of its first
//! character. The script is guessed from the text itself, so a run picks up
//! the features its font registers for that script.

use glyphforge_core::{
    error::Result,
    traits::{FontRef, Shaper},
    types::{GlyphCluster, NOTDEF},
};
use harfrust::{Direction, Feature, FontRef as HrFontRef, ShaperData, Tag, UnicodeBuffer};

/// Text shaping powered by harfrust
#[derive(Debug, Clone, Default)]
pub struct HarfrustShaper {
    features: Vec<Feature>,
}

impl HarfrustShaper {
    /// Creates a shaper that applies each font's default features
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shaper with OpenType feature overrides.
    ///
    /// `"liga"` enables a feature for the whole run, `"-liga"` disables it.
    /// Entries that are not four-character tags are skipped with a warning.
    pub fn with_features<S: AsRef<str>>(features: &[S]) -> Self {
        let features = features
            .iter()
            .filter_map(|spec| {
                let spec = spec.as_ref();
                let parsed = Self::parse_feature(spec);
                if parsed.is_none() {
                    log::warn!("Ignoring malformed feature {:?}", spec);
                }
                parsed
            })
            .collect();
        Self { features }
    }

    /// Number of active feature overrides
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Parse a 4-character tag string into a harfrust Tag
    fn parse_tag(tag_str: &str) -> Option<Tag> {
        if tag_str.len() == 4 && tag_str.is_ascii() {
            let bytes = tag_str.as_bytes();
            Some(Tag::new(&[bytes[0], bytes[1], bytes[2], bytes[3]]))
        } else {
            None
        }
    }

    fn parse_feature(spec: &str) -> Option<Feature> {
        let (tag, value) = match spec.strip_prefix('-') {
            Some(tag) => (tag, 0),
            None => (spec.strip_prefix('+').unwrap_or(spec), 1),
        };
        Self::parse_tag(tag).map(|tag| Feature {
            tag,
            value,
            start: 0,
            end: u32::MAX,
        })
    }

    /// One cluster per character through the cmap, for data harfrust
    /// cannot parse
    fn fallback_shape(text: &str, font: &dyn FontRef) -> Vec<GlyphCluster> {
        text.char_indices()
            .map(|(offset, ch)| GlyphCluster {
                glyph: font.glyph_id(ch).unwrap_or(NOTDEF),
                cluster: offset as u32,
            })
            .collect()
    }
}

impl Shaper for HarfrustShaper {
    fn name(&self) -> &'static str {
        "Harfrust"
    }

    fn shape(&self, text: &str, font: &dyn FontRef) -> Result<Vec<GlyphCluster>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let hr_font = match HrFontRef::from_index(font.data(), font.face_index()) {
            Ok(f) => f,
            Err(err) => {
                log::warn!(
                    "Harfrust cannot parse the font ({}); mapping characters one by one",
                    err
                );
                return Ok(Self::fallback_shape(text, font));
            },
        };

        let shaper_data = ShaperData::new(&hr_font);
        let shaper = shaper_data
            .shaper(&hr_font)
            .point_size(Some(font.property().size as f32))
            .build();

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(Direction::LeftToRight);
        // Fonts often register liga and friends under a script, not DFLT
        buffer.guess_segment_properties();

        let output = shaper.shape(buffer, &self.features);

        Ok(output
            .glyph_infos()
            .iter()
            .map(|info| GlyphCluster {
                glyph: info.glyph_id,
                cluster: info.cluster,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphforge_core::traits::ScalerLock;
    use glyphforge_core::types::{FaceProperty, GlyphIndex};

    /// Unparsable bytes with a tiny cmap
    struct StubFont {
        property: FaceProperty,
        scaler: ScalerLock,
    }

    impl StubFont {
        fn new() -> Self {
            Self {
                property: FaceProperty {
                    size: 16,
                    ..FaceProperty::default()
                },
                scaler: ScalerLock::new(),
            }
        }
    }

    impl FontRef for StubFont {
        fn data(&self) -> &[u8] {
            b"not a font"
        }

        fn property(&self) -> &FaceProperty {
            &self.property
        }

        fn glyph_id(&self, ch: char) -> Option<GlyphIndex> {
            match ch {
                'a'..='z' => Some(ch as u32 - 'a' as u32 + 1),
                _ => None,
            }
        }

        fn scaler_lock(&self) -> &ScalerLock {
            &self.scaler
        }
    }

    #[test]
    fn empty_text_shapes_to_nothing() {
        let shaper = HarfrustShaper::new();
        assert!(shaper.shape("", &StubFont::new()).unwrap().is_empty());
    }

    #[test]
    fn unparsable_font_falls_back_to_cmap_with_byte_clusters() {
        let shaper = HarfrustShaper::new();
        let clusters = shaper.shape("aé b", &StubFont::new()).unwrap();

        assert_eq!(
            clusters,
            vec![
                GlyphCluster { glyph: 1, cluster: 0 },
                GlyphCluster { glyph: 0, cluster: 1 },
                GlyphCluster { glyph: 0, cluster: 3 },
                GlyphCluster { glyph: 2, cluster: 4 },
            ]
        );
    }

    #[test]
    fn feature_specs_parse_on_and_off() {
        let on = HarfrustShaper::parse_feature("liga").unwrap();
        assert_eq!(on.value, 1);
        assert_eq!(on.tag, Tag::new(b"liga"));

        let off = HarfrustShaper::parse_feature("-kern").unwrap();
        assert_eq!(off.value, 0);
        assert_eq!(off.tag, Tag::new(b"kern"));

        assert!(HarfrustShaper::parse_feature("ligature").is_none());
        assert!(HarfrustShaper::parse_feature("-").is_none());
    }

    #[test]
    fn malformed_features_are_dropped() {
        let shaper = HarfrustShaper::with_features(&["liga", "bogus-tag", "-calt"]);
        assert_eq!(shaper.feature_count(), 2);
    }
}
