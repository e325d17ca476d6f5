//! Rendering real glyphs, skipped when no font is installed.

use std::path::PathBuf;

use glyphforge_core::traits::{FontRef, GlyphRenderer};
use glyphforge_core::types::{CloseRing, FontStyle, RenderMethod, RenderedGlyph};
use glyphforge_core::RenderParams;
use glyphforge_fontdb::FontFace;
use glyphforge_core::error::{GlyphError, RasterizationError};
use glyphforge_raster::{glyph_info, Renderer, MAX_GLYPH_EXTENT};

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn test_face(size: u32, style: FontStyle) -> Option<FontFace> {
    let path = std::env::var_os("GLYPHFORGE_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .find(|path| path.is_file());
    match path {
        Some(path) => Some(FontFace::from_file(path, 0, size, style).unwrap()),
        None => {
            eprintln!("no test font available; set GLYPHFORGE_TEST_FONT to run this test");
            None
        },
    }
}

fn render(face: &FontFace, method: RenderMethod, glyph: u32, params: &RenderParams) -> RenderedGlyph {
    let _scaler = face.scaler_lock().hold();
    Renderer::for_method(method)
        .render(face, glyph, params)
        .unwrap()
}

const ALL_METHODS: [RenderMethod; 4] = [
    RenderMethod::Bitmap,
    RenderMethod::Outline,
    RenderMethod::Sdf,
    RenderMethod::Msdf,
];

#[test]
fn rendering_is_deterministic() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('g').unwrap();
    let params = RenderParams::with_buffer(4);

    for method in ALL_METHODS {
        let first = render(&face, method, glyph, &params);
        let second = render(&face, method, glyph, &params);
        assert_eq!(first, second, "{:?} output changed between calls", method);
        assert!(!first.is_empty());
    }
}

#[test]
fn space_is_empty_but_advances() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let space = face.glyph_id(' ').unwrap();

    for method in ALL_METHODS {
        let glyph = render(&face, method, space, &RenderParams::default());
        assert!(glyph.is_empty(), "{:?}", method);
        assert!(glyph.metrics().advance > 0.0);
    }
}

#[test]
fn notdef_is_the_empty_glyph() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    for method in ALL_METHODS {
        let glyph = render(&face, method, 0, &RenderParams::default());
        assert!(glyph.is_empty(), "{:?}", method);
        assert_eq!(glyph.index(), 0);
        assert_eq!(glyph.method(), method);
    }
}

#[test]
fn bitmap_has_ink_and_matching_size() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('A').unwrap();
    let rendered = render(&face, RenderMethod::Bitmap, glyph, &RenderParams::default());

    let metrics = rendered.metrics();
    let pixels = rendered.pixels().unwrap();
    assert_eq!(pixels.len(), (metrics.width * metrics.height) as usize);
    assert!(pixels.iter().any(|&p| p > 200));
    assert!(metrics.bearing_y > 0);
}

#[test]
fn bitmap_rows_run_top_down() {
    let Some(face) = test_face(48, FontStyle::Regular) else { return };
    // 'T' is wide at the top and narrow at the bottom
    let glyph = face.glyph_id('T').unwrap();
    let rendered = render(&face, RenderMethod::Bitmap, glyph, &RenderParams::default());
    let metrics = rendered.metrics();
    let pixels = rendered.pixels().unwrap();
    let width = metrics.width as usize;

    let ink = |row: usize| {
        pixels[row * width..(row + 1) * width]
            .iter()
            .filter(|&&p| p > 127)
            .count()
    };
    let height = metrics.height as usize;
    assert!(ink(1) > ink(height - 2));
}

#[test]
fn sdf_is_positive_inside_the_stem() {
    let Some(face) = test_face(48, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('l').unwrap();
    let buffer = 4;
    let rendered = render(&face, RenderMethod::Sdf, glyph, &RenderParams::with_buffer(buffer));

    let metrics = rendered.metrics();
    let pixels = rendered.pixels().unwrap();
    assert_eq!(pixels.len(), (metrics.width * metrics.height) as usize);

    // Padding ring is outside; the middle of the stem is inside
    assert!(pixels[0] < 128);
    let centre = (metrics.height / 2 * metrics.width + metrics.width / 2) as usize;
    assert!(pixels[centre] > 127);
}

#[test]
fn sdf_box_includes_the_buffer() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('o').unwrap();
    let info = {
        let _scaler = face.scaler_lock().hold();
        glyph_info(&face, glyph).unwrap()
    };
    let rendered = render(&face, RenderMethod::Sdf, glyph, &RenderParams::with_buffer(5));
    let metrics = rendered.metrics();

    assert_eq!(metrics.width, info.metrics.width + 10);
    assert_eq!(metrics.height, info.metrics.height + 10);
    assert_eq!(metrics.bearing_x, info.metrics.bearing_x - 5);
    assert_eq!(metrics.advance, info.metrics.advance);
}

#[test]
fn msdf_has_three_channels() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('M').unwrap();
    let rendered = render(&face, RenderMethod::Msdf, glyph, &RenderParams::with_buffer(3));
    let metrics = rendered.metrics();
    assert_eq!(
        rendered.pixels().unwrap().len(),
        (metrics.width * metrics.height * 3) as usize
    );
}

#[test]
fn outline_rings_follow_the_closure_policy() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('O').unwrap();

    let closed = render(&face, RenderMethod::Outline, glyph, &RenderParams::default());
    let RenderedGlyph::Outline(closed) = closed else {
        panic!("outline renderer returned another representation");
    };
    // Outer and inner contour
    assert_eq!(closed.rings.len(), 2);
    for ring in &closed.rings {
        assert!(ring.closed);
        assert_eq!(ring.points.first(), ring.points.last());
    }

    let params = RenderParams {
        close_ring: CloseRing::AsAuthored,
        ..RenderParams::default()
    };
    let authored = render(&face, RenderMethod::Outline, glyph, &params);
    assert!(!authored.is_empty());
}

#[test]
fn synthetic_italic_leans_and_widens() {
    let Some(upright) = test_face(48, FontStyle::Regular) else { return };
    let Some(italic) = test_face(48, FontStyle::Italic) else { return };
    if !italic.property().synthetic_italic() {
        eprintln!("test font is natively italic; shear not exercised");
        return;
    }
    let glyph = upright.glyph_id('I').unwrap();
    let plain = render(&upright, RenderMethod::Bitmap, glyph, &RenderParams::default());
    let sheared = render(&italic, RenderMethod::Bitmap, glyph, &RenderParams::default());
    assert!(sheared.metrics().width > plain.metrics().width);
    assert_eq!(sheared.metrics().advance, plain.metrics().advance);
}

#[test]
fn synthetic_bold_grows_the_bitmap() {
    let Some(regular) = test_face(32, FontStyle::Regular) else { return };
    let Some(bold) = test_face(32, FontStyle::Bold) else { return };
    if !bold.property().synthetic_bold() {
        eprintln!("test font is natively bold; dilation not exercised");
        return;
    }
    let glyph = regular.glyph_id('x').unwrap();
    let plain = render(&regular, RenderMethod::Bitmap, glyph, &RenderParams::default());
    let heavy = render(&bold, RenderMethod::Bitmap, glyph, &RenderParams::default());
    assert_eq!(heavy.metrics().width, plain.metrics().width + 2);

    let ink = |g: &RenderedGlyph| g.pixels().unwrap().iter().map(|&p| p as u64).sum::<u64>();
    assert!(ink(&heavy) > ink(&plain));
}

#[test]
fn extent_matches_the_rendered_image() {
    let Some(face) = test_face(32, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('g').unwrap();
    let params = RenderParams::with_buffer(4);
    let _scaler = face.scaler_lock().hold();

    for method in [RenderMethod::Bitmap, RenderMethod::Sdf, RenderMethod::Msdf] {
        let renderer = Renderer::for_method(method);
        let rendered = renderer.render(&face, glyph, &params).unwrap();
        let metrics = rendered.metrics();
        assert_eq!(
            renderer.extent(&face, glyph, &params).unwrap(),
            Some((metrics.width, metrics.height)),
            "{:?}",
            method
        );
    }
    let space = face.glyph_id(' ').unwrap();
    assert_eq!(
        Renderer::for_method(RenderMethod::Bitmap)
            .extent(&face, space, &params)
            .unwrap(),
        None
    );
    assert_eq!(
        Renderer::for_method(RenderMethod::Outline)
            .extent(&face, glyph, &params)
            .unwrap(),
        None
    );
}

#[test]
fn huge_sizes_fail_instead_of_allocating() {
    let Some(face) = test_face(100_000, FontStyle::Regular) else { return };
    let glyph = face.glyph_id('M').unwrap();
    let params = RenderParams::with_buffer(2);
    let _scaler = face.scaler_lock().hold();

    let (width, height) = Renderer::for_method(RenderMethod::Bitmap)
        .extent(&face, glyph, &params)
        .unwrap()
        .unwrap();
    assert!(width.max(height) > MAX_GLYPH_EXTENT);

    for method in [RenderMethod::Bitmap, RenderMethod::Sdf, RenderMethod::Msdf] {
        let err = Renderer::for_method(method)
            .render(&face, glyph, &params)
            .unwrap_err();
        assert!(
            matches!(
                err,
                GlyphError::Rasterization(RasterizationError::InvalidDimensions { .. })
            ),
            "{:?}: {}",
            method,
            err
        );
    }
}
