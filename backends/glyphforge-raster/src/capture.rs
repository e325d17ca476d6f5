// this_file: backends/glyphforge-raster/src/capture.rs

//! Outline capture shared by every renderer
//!
//! skrifa draws the glyph at the face's pixel size into [`GlyphPen`], which
//! records two forms at once: SVG path data for zeno and a kurbo `BezPath`
//! for bounds, flattening and distance queries. Both stay in font
//! orientation (y up, origin at the pen position on the baseline).

use glyphforge_core::config::MAX_PAGE_SIZE;
use glyphforge_core::traits::FontRef;
use glyphforge_core::types::{GlyphIndex, GlyphMetrics, NOTDEF};
use glyphforge_core::RasterizationError;
use kurbo::{BezPath, Point, Shape};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{GlyphId, MetadataProvider};

/// Horizontal shear applied for synthetic italics
pub const ITALIC_SHEAR: f32 = 0.2;

/// Longest image edge any renderer will allocate, matching the largest
/// atlas page
pub const MAX_GLYPH_EXTENT: u32 = MAX_PAGE_SIZE;

/// Records a glyph outline as SVG path data and a kurbo path
pub(crate) struct GlyphPen {
    commands: Vec<String>,
    path: BezPath,
    shear: f32,
}

impl GlyphPen {
    pub(crate) fn new(shear: f32) -> Self {
        Self {
            commands: Vec::new(),
            path: BezPath::new(),
            shear,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (x + y * self.shear, y)
    }

    pub(crate) fn finish(self) -> (String, BezPath) {
        (self.commands.join(" "), self.path)
    }
}

impl OutlinePen for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.commands.push(format!("M {:.3},{:.3}", x, y));
        self.path.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.commands.push(format!("L {:.3},{:.3}", x, y));
        self.path.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let (cx, cy) = self.point(cx, cy);
        let (x, y) = self.point(x, y);
        self.commands
            .push(format!("Q {:.3},{:.3} {:.3},{:.3}", cx, cy, x, y));
        self.path
            .quad_to((cx as f64, cy as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.point(cx0, cy0);
        let (cx1, cy1) = self.point(cx1, cy1);
        let (x, y) = self.point(x, y);
        self.commands.push(format!(
            "C {:.3},{:.3} {:.3},{:.3} {:.3},{:.3}",
            cx0, cy0, cx1, cy1, x, y
        ));
        self.path.curve_to(
            (cx0 as f64, cy0 as f64),
            (cx1 as f64, cy1 as f64),
            (x as f64, y as f64),
        );
    }

    fn close(&mut self) {
        self.commands.push("Z".to_string());
        self.path.close_path();
    }
}

/// Integer pixel bounds in font orientation (y up)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBox {
    pub(crate) fn width(&self) -> u32 {
        span(self.x0, self.x1)
    }

    pub(crate) fn height(&self) -> u32 {
        span(self.y0, self.y1)
    }

    /// Grow by `by` pixels on every side, saturating at the `i32` range
    pub(crate) fn grow(self, by: u32) -> Self {
        let by = i32::try_from(by).unwrap_or(i32::MAX);
        Self {
            x0: self.x0.saturating_sub(by),
            y0: self.y0.saturating_sub(by),
            x1: self.x1.saturating_add(by),
            y1: self.y1.saturating_add(by),
        }
    }

    /// Byte length of a `channels`-deep image over this box.
    ///
    /// Refuses empty boxes and edges beyond [`MAX_GLYPH_EXTENT`], so callers
    /// can allocate the result without further checks.
    pub(crate) fn image_len(&self, channels: usize) -> Result<usize, RasterizationError> {
        let (width, height) = (self.width(), self.height());
        let invalid = RasterizationError::InvalidDimensions { width, height };
        if width == 0 || height == 0 || width > MAX_GLYPH_EXTENT || height > MAX_GLYPH_EXTENT {
            return Err(invalid);
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|len| len.checked_mul(channels))
            .ok_or(invalid)
    }

    /// Placement metrics for an image covering this box
    pub(crate) fn metrics(&self, advance: f32) -> GlyphMetrics {
        GlyphMetrics {
            bearing_x: self.x0,
            bearing_y: self.y1,
            advance,
            width: self.width(),
            height: self.height(),
        }
    }

    /// Font-space centre of image pixel (`col`, `row`), rows counted from
    /// the top edge
    pub(crate) fn sample_point(&self, col: u32, row: u32) -> Point {
        Point::new(
            self.x0 as f64 + col as f64 + 0.5,
            self.y1 as f64 - row as f64 - 0.5,
        )
    }
}

fn span(from: i32, to: i32) -> u32 {
    u32::try_from(i64::from(to) - i64::from(from)).unwrap_or(0)
}

/// A glyph outline at pixel scale plus its advance
pub(crate) struct CapturedGlyph {
    pub path: BezPath,
    pub svg: String,
    pub advance: f32,
}

impl CapturedGlyph {
    /// Pixel-aligned bounds, or `None` for a blank outline
    pub(crate) fn pixel_box(&self) -> Option<PixelBox> {
        if self.path.elements().is_empty() {
            return None;
        }
        let bbox = self.path.bounding_box();
        if !(bbox.x0.is_finite() && bbox.y0.is_finite() && bbox.x1.is_finite() && bbox.y1.is_finite())
            || bbox.width() <= 0.0
            || bbox.height() <= 0.0
        {
            return None;
        }
        Some(PixelBox {
            x0: bbox.x0.floor() as i32,
            y0: bbox.y0.floor() as i32,
            x1: bbox.x1.ceil() as i32,
            y1: bbox.y1.ceil() as i32,
        })
    }
}

/// Draw `glyph` at the face's pixel size.
///
/// Glyph 0 is never drawn; it comes back with its advance and an empty
/// path. Synthetic italics are applied here so every method sees the same
/// sheared outline.
pub(crate) fn capture(
    font: &dyn FontRef,
    glyph: GlyphIndex,
) -> Result<CapturedGlyph, RasterizationError> {
    let font_ref = skrifa::FontRef::from_index(font.data(), font.face_index())
        .map_err(|_| RasterizationError::InvalidFont)?;

    let property = font.property();
    let size = Size::new(property.size as f32);
    let location = LocationRef::default();
    let glyph_id = GlyphId::new(glyph);

    let advance = font_ref
        .glyph_metrics(size, location)
        .advance_width(glyph_id)
        .unwrap_or(0.0);

    let shear = if property.synthetic_italic() {
        ITALIC_SHEAR
    } else {
        0.0
    };
    let mut pen = GlyphPen::new(shear);

    if glyph != NOTDEF {
        let outline = font_ref
            .outline_glyphs()
            .get(glyph_id)
            .ok_or(RasterizationError::GlyphNotFound(glyph))?;
        outline
            .draw(DrawSettings::unhinted(size, location), &mut pen)
            .map_err(|_| RasterizationError::OutlineExtractionFailed)?;
    }

    let (svg, path) = pen.finish();
    Ok(CapturedGlyph { path, svg, advance })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(pen: &mut GlyphPen) {
        pen.move_to(0.0, 0.0);
        pen.line_to(10.0, 0.0);
        pen.line_to(10.0, 10.0);
        pen.line_to(0.0, 10.0);
        pen.close();
    }

    #[test]
    fn pen_records_svg_and_path_together() {
        let mut pen = GlyphPen::new(0.0);
        square(&mut pen);
        let (svg, path) = pen.finish();

        assert_eq!(
            svg,
            "M 0.000,0.000 L 10.000,0.000 L 10.000,10.000 L 0.000,10.000 Z"
        );
        assert_eq!(path.elements().len(), 5);
    }

    #[test]
    fn shear_leans_the_top_to_the_right() {
        let mut pen = GlyphPen::new(ITALIC_SHEAR);
        square(&mut pen);
        let (_, path) = pen.finish();
        let glyph = CapturedGlyph {
            path,
            svg: String::new(),
            advance: 10.0,
        };

        let bounds = glyph.pixel_box().unwrap();
        assert_eq!((bounds.x0, bounds.x1), (0, 12));
        assert_eq!((bounds.y0, bounds.y1), (0, 10));
    }

    #[test]
    fn blank_outline_has_no_box() {
        let glyph = CapturedGlyph {
            path: BezPath::new(),
            svg: String::new(),
            advance: 4.0,
        };
        assert!(glyph.pixel_box().is_none());
    }

    #[test]
    fn image_len_refuses_oversized_boxes() {
        let small = PixelBox {
            x0: -2,
            y0: 0,
            x1: 2,
            y1: 3,
        };
        assert_eq!(small.image_len(3), Ok(36));
        assert!(small.grow(0).image_len(1).is_ok());

        let huge = PixelBox {
            x0: 0,
            y0: 0,
            x1: 70_000,
            y1: 70_000,
        };
        assert_eq!(
            huge.image_len(1),
            Err(RasterizationError::InvalidDimensions {
                width: 70_000,
                height: 70_000
            })
        );

        let limit = MAX_GLYPH_EXTENT as i32;
        let edge = PixelBox {
            x0: 0,
            y0: 0,
            x1: limit,
            y1: limit,
        };
        assert!(edge.image_len(3).is_ok());
        assert!(edge.grow(1).image_len(1).is_err());
    }

    #[test]
    fn growth_saturates_instead_of_wrapping() {
        let bounds = PixelBox {
            x0: -10,
            y0: -10,
            x1: 10,
            y1: 10,
        };
        let grown = bounds.grow(u32::MAX);
        assert_eq!((grown.x0, grown.x1), (i32::MIN, i32::MAX));
        assert_eq!(grown.width(), u32::MAX);
        assert!(grown.image_len(1).is_err());
    }

    #[test]
    fn sample_points_run_top_down() {
        let bounds = PixelBox {
            x0: -2,
            y0: -3,
            x1: 4,
            y1: 7,
        };
        assert_eq!(bounds.sample_point(0, 0), Point::new(-1.5, 6.5));
        assert_eq!(bounds.sample_point(5, 9), Point::new(3.5, -2.5));

        let metrics = bounds.metrics(6.0);
        assert_eq!((metrics.bearing_x, metrics.bearing_y), (-2, 7));
        assert_eq!((metrics.width, metrics.height), (6, 10));
    }
}
