//! Contour edges and the distance queries the SDF and MSDF renderers share

use kurbo::{
    BezPath, CubicBez, Line, ParamCurve, ParamCurveArea, ParamCurveExtrema, ParamCurveNearest,
    PathEl, PathSeg, Point, QuadBez, Rect, Vec2,
};

/// Precision handed to kurbo's nearest-point solver, in pixels
const NEAREST_ACCURACY: f64 = 1e-4;

/// sin of the smallest angle between tangents that counts as a corner
const CORNER_CROSS_THRESHOLD: f64 = 0.141;

pub(crate) const RED: u8 = 0b001;
pub(crate) const GREEN: u8 = 0b010;
pub(crate) const BLUE: u8 = 0b100;
pub(crate) const CYAN: u8 = GREEN | BLUE;
pub(crate) const MAGENTA: u8 = RED | BLUE;
pub(crate) const YELLOW: u8 = RED | GREEN;
pub(crate) const WHITE: u8 = RED | GREEN | BLUE;

pub(crate) const CHANNELS: [u8; 3] = [RED, GREEN, BLUE];

/// One contour segment with its cached bounds and channel mask
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    pub seg: PathSeg,
    pub bounds: Rect,
    pub color: u8,
}

/// Split a path into closed contours of non-degenerate segments.
///
/// Open subpaths get the implicit closing line a non-zero fill would use.
pub(crate) fn contours(path: &BezPath) -> Vec<Vec<PathSeg>> {
    let mut contours = Vec::new();
    let mut current: Vec<PathSeg> = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;

    let mut finish = |current: &mut Vec<PathSeg>, last: Point, start: Point| {
        if last != start && !current.is_empty() {
            current.push(PathSeg::Line(Line::new(last, start)));
        }
        if !current.is_empty() {
            contours.push(std::mem::take(current));
        }
    };

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish(&mut current, last, start);
                start = p;
                last = p;
            },
            PathEl::LineTo(p) => {
                if p != last {
                    current.push(PathSeg::Line(Line::new(last, p)));
                }
                last = p;
            },
            PathEl::QuadTo(p1, p2) => {
                if !(p1 == last && p2 == last) {
                    current.push(PathSeg::Quad(QuadBez::new(last, p1, p2)));
                }
                last = p2;
            },
            PathEl::CurveTo(p1, p2, p3) => {
                if !(p1 == last && p2 == last && p3 == last) {
                    current.push(PathSeg::Cubic(CubicBez::new(last, p1, p2, p3)));
                }
                last = p3;
            },
            PathEl::ClosePath => {
                finish(&mut current, last, start);
                last = start;
            },
        }
    }
    finish(&mut current, last, start);

    contours
}

/// +1 when the outline runs counter-clockwise (filled side on the left of
/// each edge), -1 when it runs clockwise.
pub(crate) fn inside_sign(contours: &[Vec<PathSeg>]) -> f64 {
    let area: f64 = contours
        .iter()
        .flatten()
        .map(|seg| seg.signed_area())
        .sum();
    if area >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 {
        v / len
    } else {
        v
    }
}

fn chord(seg: &PathSeg) -> Vec2 {
    seg.end() - seg.start()
}

/// Direction of travel where the segment begins
pub(crate) fn start_tangent(seg: &PathSeg) -> Vec2 {
    let v = match *seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) if q.p1 != q.p0 => q.p1 - q.p0,
        PathSeg::Quad(q) => q.p2 - q.p0,
        PathSeg::Cubic(c) if c.p1 != c.p0 => c.p1 - c.p0,
        PathSeg::Cubic(c) if c.p2 != c.p0 => c.p2 - c.p0,
        PathSeg::Cubic(c) => c.p3 - c.p0,
    };
    unit(v)
}

/// Direction of travel where the segment ends
pub(crate) fn end_tangent(seg: &PathSeg) -> Vec2 {
    let v = match *seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) if q.p2 != q.p1 => q.p2 - q.p1,
        PathSeg::Quad(q) => q.p2 - q.p0,
        PathSeg::Cubic(c) if c.p3 != c.p2 => c.p3 - c.p2,
        PathSeg::Cubic(c) if c.p3 != c.p1 => c.p3 - c.p1,
        PathSeg::Cubic(c) => c.p3 - c.p0,
    };
    unit(v)
}

/// Direction of travel at parameter `t`
pub(crate) fn tangent_at(seg: &PathSeg, t: f64) -> Vec2 {
    if t <= 0.0 {
        return start_tangent(seg);
    }
    if t >= 1.0 {
        return end_tangent(seg);
    }
    let mt = 1.0 - t;
    let v = match *seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => ((q.p1 - q.p0) * mt + (q.p2 - q.p1) * t) * 2.0,
        PathSeg::Cubic(c) => {
            ((c.p1 - c.p0) * (mt * mt) + (c.p2 - c.p1) * (2.0 * mt * t) + (c.p3 - c.p2) * (t * t))
                * 3.0
        },
    };
    if v.hypot2() > 1e-18 {
        unit(v)
    } else {
        unit(chord(seg))
    }
}

fn is_corner(a: Vec2, b: Vec2) -> bool {
    a.dot(b) <= 0.0 || a.cross(b).abs() > CORNER_CROSS_THRESHOLD
}

/// Assign channel masks to the segments of one contour.
///
/// Contours with fewer than two corners are smooth enough for a plain
/// distance field and use all three channels. Otherwise the splines between
/// corners cycle through cyan, magenta and yellow, so the two edges meeting
/// at any corner share exactly one channel.
pub(crate) fn color_contour(contour: &[PathSeg]) -> Vec<u8> {
    let n = contour.len();
    let corners: Vec<usize> = (0..n)
        .filter(|&i| {
            let prev = &contour[(i + n - 1) % n];
            is_corner(end_tangent(prev), start_tangent(&contour[i]))
        })
        .collect();

    if corners.len() < 2 {
        return vec![WHITE; n];
    }

    const PALETTE: [u8; 3] = [CYAN, MAGENTA, YELLOW];
    let splines = corners.len();
    let mut spline_colors: Vec<u8> = Vec::with_capacity(splines);
    for k in 0..splines {
        let mut color = PALETTE[k % 3];
        if k == splines - 1 && color == spline_colors[0] {
            let first = spline_colors[0];
            let prev = spline_colors[k - 1];
            color = PALETTE
                .iter()
                .copied()
                .find(|&c| c != first && c != prev)
                .unwrap_or(WHITE);
        }
        spline_colors.push(color);
    }

    let mut colors = vec![WHITE; n];
    let mut spline = 0;
    for step in 0..n {
        let index = (corners[0] + step) % n;
        if spline + 1 < splines && index == corners[spline + 1] {
            spline += 1;
        }
        colors[index] = spline_colors[spline];
    }
    colors
}

/// Flatten contours into edges, all white
pub(crate) fn plain_edges(contours: &[Vec<PathSeg>]) -> Vec<Edge> {
    contours
        .iter()
        .flatten()
        .map(|&seg| Edge {
            seg,
            bounds: seg.bounding_box(),
            color: WHITE,
        })
        .collect()
}

/// Flatten contours into edges carrying their MSDF channel masks
pub(crate) fn colored_edges(contours: &[Vec<PathSeg>]) -> Vec<Edge> {
    contours
        .iter()
        .flat_map(|contour| {
            contour
                .iter()
                .zip(color_contour(contour))
                .map(|(&seg, color)| Edge {
                    seg,
                    bounds: seg.bounding_box(),
                    color,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lower bound on the distance from `p` to anything inside `rect`
pub(crate) fn rect_distance(rect: &Rect, p: Point) -> f64 {
    let dx = (rect.x0 - p.x).max(0.0).max(p.x - rect.x1);
    let dy = (rect.y0 - p.y).max(0.0).max(p.y - rect.y1);
    dx.hypot(dy)
}

/// Unsigned distance from `p` to the closest edge
pub(crate) fn nearest_distance(edges: &[Edge], p: Point) -> f64 {
    let mut best = f64::INFINITY;
    for edge in edges {
        if rect_distance(&edge.bounds, p) >= best {
            continue;
        }
        let d = edge.seg.nearest(p, NEAREST_ACCURACY).distance_sq.sqrt();
        if d < best {
            best = d;
        }
    }
    best
}

/// Closest point on one edge, with how squarely `p` faces it
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeHit {
    pub index: usize,
    pub distance: f64,
    pub t: f64,
    /// |cos| of the angle between the edge and the offset to `p`; lower is
    /// a better match when distances tie
    pub obliqueness: f64,
}

impl EdgeHit {
    fn beats(&self, other: &EdgeHit) -> bool {
        let tie = (self.distance - other.distance).abs() <= 1e-9 * (1.0 + other.distance);
        if tie {
            self.obliqueness < other.obliqueness
        } else {
            self.distance < other.distance
        }
    }
}

pub(crate) fn hit(edges: &[Edge], index: usize, p: Point) -> EdgeHit {
    let seg = &edges[index].seg;
    let nearest = seg.nearest(p, NEAREST_ACCURACY);
    let t = nearest.t.clamp(0.0, 1.0);
    let q = seg.eval(t);
    let offset = p - q;
    let obliqueness = tangent_at(seg, t).dot(unit(offset)).abs();
    EdgeHit {
        index,
        distance: nearest.distance_sq.sqrt(),
        t,
        obliqueness,
    }
}

/// Per-channel closest edge for the three MSDF channels
pub(crate) fn channel_hits(edges: &[Edge], p: Point) -> [Option<EdgeHit>; 3] {
    let mut best: [Option<EdgeHit>; 3] = [None; 3];

    for (index, edge) in edges.iter().enumerate() {
        let floor = rect_distance(&edge.bounds, p);
        let worth_it = CHANNELS.iter().zip(best.iter()).any(|(&channel, current)| {
            edge.color & channel != 0 && current.map_or(true, |h| floor <= h.distance)
        });
        if !worth_it {
            continue;
        }

        let candidate = hit(edges, index, p);
        for (slot, &channel) in best.iter_mut().zip(CHANNELS.iter()) {
            if edge.color & channel == 0 {
                continue;
            }
            if slot.map_or(true, |current| candidate.beats(&current)) {
                *slot = Some(candidate);
            }
        }
    }

    best
}

/// Signed pseudo-distance from `p` to the edge in `hit`.
///
/// Positive on the left of the direction of travel. When the closest point
/// is an endpoint and `p` lies beyond it, the distance to the tangent line
/// through that endpoint is used instead, which is what keeps corners sharp.
pub(crate) fn signed_pseudo_distance(edges: &[Edge], hit: &EdgeHit, p: Point) -> f64 {
    let seg = &edges[hit.index].seg;
    let q = seg.eval(hit.t);
    let offset = p - q;
    let dir = tangent_at(seg, hit.t);
    let side = if dir.cross(offset) >= 0.0 { 1.0 } else { -1.0 };
    let mut distance = side * hit.distance;

    if hit.t <= 0.0 || hit.t >= 1.0 {
        let (anchor, dir) = if hit.t <= 0.0 {
            (seg.start(), start_tangent(seg))
        } else {
            (seg.end(), end_tangent(seg))
        };
        let along = (p - anchor).dot(dir);
        let beyond = if hit.t <= 0.0 { along < 0.0 } else { along > 0.0 };
        if beyond {
            let pseudo = dir.cross(p - anchor);
            if pseudo.abs() <= distance.abs() {
                distance = pseudo;
            }
        }
    }

    distance
}

/// Map a signed distance onto a byte, 128 on the contour
pub(crate) fn encode(distance: f64, buffer: u32) -> u8 {
    let range = 2.0 * buffer.max(1) as f64;
    let value = (0.5 + distance / range).clamp(0.0, 1.0);
    (value * 255.0).round() as u8
}

pub(crate) fn median(a: f64, b: f64, c: f64) -> f64 {
    a.min(b).max(a.max(b).min(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clockwise 10x10 square, the way TrueType draws outer contours
    fn square() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((0.0, 10.0));
        path.line_to((10.0, 10.0));
        path.line_to((10.0, 0.0));
        path.close_path();
        path
    }

    #[test]
    fn contour_gets_closing_edge() {
        let contours = contours(&square());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
        assert_eq!(contours[0][3].end(), Point::ZERO);
    }

    #[test]
    fn clockwise_outline_is_filled_on_the_right() {
        assert_eq!(inside_sign(&contours(&square())), -1.0);
    }

    #[test]
    fn square_has_four_corners_and_no_equal_neighbours() {
        let contours = contours(&square());
        let colors = color_contour(&contours[0]);
        assert_eq!(colors.len(), 4);
        for i in 0..4 {
            let next = colors[(i + 1) % 4];
            assert_ne!(colors[i], next);
            // Neighbours still share one channel
            assert_eq!((colors[i] & next).count_ones(), 1);
        }
    }

    #[test]
    fn smooth_contour_is_white() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 5.0), (10.0, 5.0), (10.0, 0.0));
        path.curve_to((10.0, -5.0), (0.0, -5.0), (0.0, 0.0));
        path.close_path();
        let contours = contours(&path);
        assert_eq!(contours[0].len(), 2);
        assert!(color_contour(&contours[0]).iter().all(|&c| c == WHITE));
    }

    #[test]
    fn distance_to_square_edges() {
        let edges = plain_edges(&contours(&square()));
        let d = nearest_distance(&edges, Point::new(5.0, 5.0));
        assert!((d - 5.0).abs() < 1e-6);
        let d = nearest_distance(&edges, Point::new(13.0, 14.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn pseudo_distance_extends_past_corners() {
        let edges = plain_edges(&contours(&square()));
        // Beyond the top-right corner, diagonally out
        let p = Point::new(12.0, 13.0);
        let hits = channel_hits(&edges, p);
        let hit = hits[0].unwrap();
        let d = signed_pseudo_distance(&edges, &hit, p);
        // Orthogonal distance to one of the extended sides, outside (right
        // of travel is inside for this orientation, so outside is positive)
        assert!(d > 0.0);
        assert!(d <= 3.0 + 1e-9);
    }

    #[test]
    fn encoding_is_centred_on_the_contour() {
        assert_eq!(encode(0.0, 4), 128);
        assert_eq!(encode(4.0, 4), 255);
        assert_eq!(encode(-4.0, 4), 0);
        assert_eq!(encode(100.0, 4), 255);
    }

    #[test]
    fn median_of_three() {
        assert_eq!(median(1.0, 3.0, 2.0), 2.0);
        assert_eq!(median(-1.0, -3.0, 0.0), -1.0);
    }
}
