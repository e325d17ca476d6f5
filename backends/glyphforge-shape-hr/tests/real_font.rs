//! Shaping against a real font file, skipped when none is installed.
//!
//! Ligature checks use `GLYPHFORGE_LIGATURE_FONT`, or DejaVu, whose Latin
//! `liga` feature merges "fi"; the font must ligate "fi" by default.

use std::path::PathBuf;

use glyphforge_core::traits::{FontRef, Shaper};
use glyphforge_core::types::{FontStyle, GlyphCluster};
use glyphforge_fontdb::FontFace;
use glyphforge_shape_hr::HarfrustShaper;

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn test_face() -> Option<FontFace> {
    let path = std::env::var_os("GLYPHFORGE_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .find(|path| path.is_file());
    match path {
        Some(path) => Some(FontFace::from_file(path, 0, 24, FontStyle::Regular).unwrap()),
        None => {
            eprintln!("no test font available; set GLYPHFORGE_TEST_FONT to run this test");
            None
        },
    }
}

/// DejaVu registers its fi ligature under the Latin script only
const LIGATURE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
];

fn ligature_face() -> Option<FontFace> {
    let path = std::env::var_os("GLYPHFORGE_LIGATURE_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(LIGATURE_FONTS.iter().map(PathBuf::from))
        .find(|path| path.is_file());
    match path {
        Some(path) => Some(FontFace::from_file(path, 0, 24, FontStyle::Regular).unwrap()),
        None => {
            eprintln!("no ligating font available; set GLYPHFORGE_LIGATURE_FONT to run this test");
            None
        },
    }
}

#[test]
fn simple_latin_is_one_cluster_per_char() {
    let Some(face) = test_face() else { return };
    let clusters = HarfrustShaper::new().shape("AB AB", &face).unwrap();

    assert_eq!(clusters.len(), 5);
    assert_eq!(
        clusters.iter().map(|c| c.cluster).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
    assert_eq!(clusters[0].glyph, face.glyph_id('A').unwrap());
    assert_eq!(clusters[0].glyph, clusters[3].glyph);
    assert_eq!(clusters[1].glyph, clusters[4].glyph);
}

#[test]
fn unmapped_codepoint_shapes_to_notdef() {
    let Some(face) = test_face() else { return };
    let clusters = HarfrustShaper::new().shape("\u{10FFFD}", &face).unwrap();
    assert_eq!(clusters, vec![GlyphCluster { glyph: 0, cluster: 0 }]);
}

#[test]
fn combining_mark_stays_in_its_base_cluster() {
    let Some(face) = test_face() else { return };
    let clusters = HarfrustShaper::new().shape("e\u{301}", &face).unwrap();

    assert!(!clusters.is_empty());
    assert!(clusters.iter().all(|c| c.cluster == 0));
}

#[test]
fn ligature_shares_one_cluster() {
    let Some(face) = ligature_face() else { return };

    let separate = HarfrustShaper::with_features(&["-liga"])
        .shape("fi", &face)
        .unwrap();
    assert_eq!(
        separate.iter().map(|c| c.cluster).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(separate[0].glyph, face.glyph_id('f').unwrap());

    let shaped = HarfrustShaper::new().shape("fi", &face).unwrap();
    assert_eq!(shaped.len(), 1, "fi did not ligate: {:?}", shaped);
    assert_eq!(shaped[0].cluster, 0);
    assert_ne!(shaped[0].glyph, 0);
    assert_ne!(shaped[0].glyph, separate[0].glyph);
}

#[test]
fn ligature_keeps_later_clusters_at_their_byte_offsets() {
    let Some(face) = ligature_face() else { return };

    let shaped = HarfrustShaper::new().shape("fix", &face).unwrap();
    assert_eq!(
        shaped.iter().map(|c| c.cluster).collect::<Vec<_>>(),
        vec![0, 2]
    );
    assert_eq!(shaped[1].glyph, face.glyph_id('x').unwrap());
}
