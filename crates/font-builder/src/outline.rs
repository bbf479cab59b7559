//! Outline preparation for the glyf table.
//!
//! TrueType outlines are quadratic, integer-valued, and wound clockwise for
//! filled regions. Icons arrive as arbitrary cubic paths with whatever winding
//! the drawing tool produced, so every outline goes through:
//!
//! 1. cubic to quadratic approximation ([`to_quadratic`]),
//! 2. splitting into closed contours and dropping zero-area ones,
//! 3. direction correction by nesting depth ([`correct_directions`]),
//! 4. rounding into glyf points.

use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, PathSeg, Point, Rect, Shape};
use read_fonts::tables::glyf::CurvePoint;
use write_fonts::tables::glyf::{Bbox, Contour, Glyph, SimpleGlyph};

use crate::{Error, Result};

/// Maximum distance between a cubic and its quadratic approximation, in font units.
pub const QUADRATIC_ACCURACY: f64 = 1.0;

/// Replace every cubic segment with a quadratic spline within `accuracy`.
pub fn to_quadratic(path: &BezPath, accuracy: f64) -> BezPath {
    let mut out = BezPath::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to(p);
                current = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                out.quad_to(c, p);
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                for (_, _, quad) in CubicBez::new(current, c1, c2, p).to_quads(accuracy) {
                    out.quad_to(quad.p1, quad.p2);
                }
                current = p;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }

    out
}

/// Split a path into explicitly closed contours, dropping those without area.
pub fn split_contours(path: &BezPath) -> Vec<BezPath> {
    let mut contours = Vec::new();
    let mut current = BezPath::new();

    let mut finish = |contour: &mut BezPath| {
        let mut contour = std::mem::take(contour);
        if contour.elements().len() < 2 {
            return;
        }
        if !matches!(contour.elements().last(), Some(PathEl::ClosePath)) {
            contour.close_path();
        }
        if contour.area().abs() > f64::EPSILON {
            contours.push(contour);
        }
    };

    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                finish(&mut current);
                current.push(*el);
            }
            PathEl::ClosePath => {
                current.push(*el);
                finish(&mut current);
            }
            _ => current.push(*el),
        }
    }
    finish(&mut current);

    contours
}

/// Rewind contours so that filled regions are clockwise and holes
/// counter-clockwise, judged by how many other contours enclose each one.
///
/// With consistent winding, non-zero and even-odd fills of the source
/// artwork render the same, and overlapping shapes at the same depth union.
pub fn correct_directions(contours: Vec<BezPath>) -> Vec<BezPath> {
    let bounds: Vec<Rect> = contours.iter().map(Shape::bounding_box).collect();

    contours
        .iter()
        .enumerate()
        .map(|(i, contour)| {
            let depth = match first_point(contour) {
                Some(probe) => contours
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| {
                        *j != i && encloses(bounds[*j], bounds[i]) && other.winding(probe) != 0
                    })
                    .count(),
                None => 0,
            };
            // Positive area is counter-clockwise with y growing upwards.
            let clockwise = contour.area() < 0.0;
            let want_clockwise = depth % 2 == 0;
            if clockwise == want_clockwise { contour.clone() } else { reverse(contour) }
        })
        .collect()
}

fn encloses(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

fn first_point(contour: &BezPath) -> Option<Point> {
    match contour.elements().first() {
        Some(PathEl::MoveTo(p)) => Some(*p),
        _ => None,
    }
}

fn reverse(contour: &BezPath) -> BezPath {
    let segments: Vec<PathSeg> = contour.segments().collect();
    let mut reversed = BezPath::new();
    let Some(last) = segments.last() else {
        return reversed;
    };

    reversed.move_to(last.end());
    for seg in segments.iter().rev() {
        match seg.reverse() {
            PathSeg::Line(line) => reversed.line_to(line.p1),
            PathSeg::Quad(quad) => reversed.quad_to(quad.p1, quad.p2),
            PathSeg::Cubic(cubic) => reversed.curve_to(cubic.p1, cubic.p2, cubic.p3),
        }
    }
    reversed.close_path();
    reversed
}

/// A glyph ready for the glyf table, with the statistics maxp and hhea need.
#[derive(Debug, Clone)]
pub struct CompiledGlyph {
    pub glyph: Glyph,
    pub bbox: Option<Bbox>,
    pub num_points: u16,
    pub num_contours: u16,
}

impl CompiledGlyph {
    pub fn empty() -> Self {
        Self { glyph: Glyph::Empty, bbox: None, num_points: 0, num_contours: 0 }
    }
}

/// Compile a font-unit outline into a TrueType glyph.
pub fn compile_outline(name: &str, path: &BezPath) -> Result<CompiledGlyph> {
    let quadratic = to_quadratic(path, QUADRATIC_ACCURACY);
    let contours = correct_directions(split_contours(&quadratic));

    let mut glyf_contours = Vec::new();
    for contour in &contours {
        let points = contour_points(name, contour)?;
        if points.len() >= 3 {
            glyf_contours.push(points);
        }
    }

    if glyf_contours.is_empty() {
        return Ok(CompiledGlyph::empty());
    }

    let all_points = glyf_contours.iter().flatten();
    let bbox = Bbox {
        x_min: all_points.clone().map(|p| p.x).min().unwrap_or(0),
        y_min: all_points.clone().map(|p| p.y).min().unwrap_or(0),
        x_max: all_points.clone().map(|p| p.x).max().unwrap_or(0),
        y_max: all_points.map(|p| p.y).max().unwrap_or(0),
    };
    let num_points = glyf_contours.iter().map(Vec::len).sum::<usize>() as u16;
    let num_contours = glyf_contours.len() as u16;

    let contours: Vec<Contour> = glyf_contours.into_iter().map(Contour::from).collect();
    let glyph = SimpleGlyph { bbox, contours, instructions: vec![] };

    Ok(CompiledGlyph { glyph: Glyph::Simple(glyph), bbox: Some(bbox), num_points, num_contours })
}

fn round_point(name: &str, p: Point, on_curve: bool) -> Result<CurvePoint> {
    let (x, y) = (p.x.round(), p.y.round());
    let range = f64::from(i16::MIN)..=f64::from(i16::MAX);
    if !range.contains(&x) || !range.contains(&y) {
        return Err(Error::CoordinateOutOfRange { glyph: name.to_string(), x: p.x, y: p.y });
    }
    Ok(CurvePoint::new(x as i16, y as i16, on_curve))
}

/// Emit glyf points for a closed contour.
///
/// The contour's start point comes out last, as the end of the closing
/// segment. Zero-length segments left over after rounding are dropped.
fn contour_points(name: &str, contour: &BezPath) -> Result<Vec<CurvePoint>> {
    fn push_on(points: &mut Vec<CurvePoint>, point: CurvePoint) {
        let duplicate =
            points.last().is_some_and(|last| last.on_curve && last.x == point.x && last.y == point.y);
        if !duplicate {
            points.push(point);
        }
    }

    let mut points: Vec<CurvePoint> = Vec::new();

    for seg in contour.segments() {
        match seg {
            PathSeg::Line(line) => push_on(&mut points, round_point(name, line.p1, true)?),
            PathSeg::Quad(quad) => {
                points.push(round_point(name, quad.p1, false)?);
                push_on(&mut points, round_point(name, quad.p2, true)?);
            }
            PathSeg::Cubic(cubic) => {
                for (_, _, quad) in cubic.to_quads(QUADRATIC_ACCURACY) {
                    points.push(round_point(name, quad.p1, false)?);
                    push_on(&mut points, round_point(name, quad.p2, true)?);
                }
            }
        }
    }

    // The closing point may coincide with the first emitted one.
    if points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if first.on_curve && last.on_curve && first.x == last.x && first.y == last.y {
            points.pop();
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Rect::new(x0, y0, x1, y1).to_path(0.1)
    }

    fn signed_area(points: &[CurvePoint]) -> i64 {
        let n = points.len();
        (0..n)
            .map(|i| {
                let (a, b) = (points[i], points[(i + 1) % n]);
                i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
            })
            .sum()
    }

    #[test]
    fn cubics_become_quadratics() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 500.0), (500.0, 500.0), (500.0, 0.0));
        path.close_path();

        let quadratic = to_quadratic(&path, QUADRATIC_ACCURACY);
        assert!(!quadratic.elements().iter().any(|el| matches!(el, PathEl::CurveTo(..))));
        assert!(quadratic.elements().iter().any(|el| matches!(el, PathEl::QuadTo(..))));
        assert!((quadratic.area() - path.area()).abs() / path.area().abs() < 0.01);
    }

    #[test]
    fn split_closes_open_subpaths_and_drops_flat_ones() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        path.line_to((100.0, 100.0));
        path.move_to((200.0, 0.0));
        path.line_to((300.0, 0.0));
        path.close_path();

        let contours = split_contours(&path);
        assert_eq!(contours.len(), 1);
        assert!(matches!(contours[0].elements().last(), Some(PathEl::ClosePath)));
    }

    #[test]
    fn outer_clockwise_inner_counter_clockwise() {
        // Both drawn counter-clockwise, as an even-odd SVG might.
        let contours = vec![square(0.0, 0.0, 100.0, 100.0), square(25.0, 25.0, 75.0, 75.0)];
        let corrected = correct_directions(contours);
        assert!(corrected[0].area() < 0.0);
        assert!(corrected[1].area() > 0.0);
    }

    #[test]
    fn overlapping_siblings_are_both_filled() {
        let contours = vec![square(0.0, 0.0, 100.0, 100.0), square(50.0, 50.0, 150.0, 150.0)];
        let corrected = correct_directions(contours);
        assert!(corrected.iter().all(|c| c.area() < 0.0));
    }

    #[test]
    fn compiled_square_points() {
        let compiled = compile_outline("box", &square(10.0, 0.0, 110.0, 100.0)).unwrap();
        assert_eq!(compiled.num_contours, 1);
        assert_eq!(compiled.num_points, 4);
        let bbox = compiled.bbox.unwrap();
        assert_eq!((bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max), (10, 0, 110, 100));

        assert!(matches!(compiled.glyph, Glyph::Simple(_)));

        let contours = correct_directions(split_contours(&square(10.0, 0.0, 110.0, 100.0)));
        let points = contour_points("box", &contours[0]).unwrap();
        assert_eq!(points.len(), 4);
        assert!(signed_area(&points) < 0, "outer contour must be clockwise");
    }

    #[test]
    fn empty_outline_is_empty_glyph() {
        let compiled = compile_outline("space", &BezPath::new()).unwrap();
        assert!(matches!(compiled.glyph, Glyph::Empty));
        assert!(compiled.bbox.is_none());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let result = compile_outline("huge", &square(0.0, 0.0, 40000.0, 10.0));
        assert!(matches!(result, Err(Error::CoordinateOutOfRange { .. })));
    }
}
