//! Conversion of SVG basic shapes into Bézier paths.

use kurbo::{BezPath, Circle, Ellipse, Point, Rect, Shape};
use roxmltree::Node;

use crate::{
    Result,
    transform::{parse_length, parse_numbers},
};

/// Tolerance used when flattening kurbo shapes into paths, in user units.
const SHAPE_TOLERANCE: f64 = 0.01;

/// Control point distance for a quarter-ellipse cubic, as a fraction of the radius.
const KAPPA: f64 = 0.552_284_749_830_793_6;

fn length_attr(node: Node, name: &str) -> Result<f64> {
    match node.attribute(name) {
        Some(value) => parse_length(name, value),
        None => Ok(0.0),
    }
}

/// Build the local-space outline of a geometry element.
///
/// Returns `None` for elements that are not geometry, and for geometry that
/// encloses no area (zero-sized rects, empty path data, `line`).
pub(crate) fn element_path(node: Node) -> Result<Option<BezPath>> {
    let path = match node.tag_name().name() {
        "path" => match node.attribute("d").map(str::trim) {
            Some(d) if !d.is_empty() => BezPath::from_svg(d)?,
            _ => return Ok(None),
        },
        "rect" => {
            let (x, y) = (length_attr(node, "x")?, length_attr(node, "y")?);
            let (w, h) = (length_attr(node, "width")?, length_attr(node, "height")?);
            if w <= 0.0 || h <= 0.0 {
                return Ok(None);
            }
            let rx = node.attribute("rx").map(|v| parse_length("rx", v)).transpose()?;
            let ry = node.attribute("ry").map(|v| parse_length("ry", v)).transpose()?;
            let (rx, ry) = match (rx, ry) {
                (Some(rx), Some(ry)) => (rx, ry),
                (Some(r), None) | (None, Some(r)) => (r, r),
                (None, None) => (0.0, 0.0),
            };
            let rect = Rect::new(x, y, x + w, y + h);
            rounded_rect(rect, rx.clamp(0.0, w / 2.0), ry.clamp(0.0, h / 2.0))
        }
        "circle" => {
            let r = length_attr(node, "r")?;
            if r <= 0.0 {
                return Ok(None);
            }
            let center = Point::new(length_attr(node, "cx")?, length_attr(node, "cy")?);
            Circle::new(center, r).to_path(SHAPE_TOLERANCE)
        }
        "ellipse" => {
            let (rx, ry) = (length_attr(node, "rx")?, length_attr(node, "ry")?);
            if rx <= 0.0 || ry <= 0.0 {
                return Ok(None);
            }
            let center = Point::new(length_attr(node, "cx")?, length_attr(node, "cy")?);
            Ellipse::new(center, (rx, ry), 0.0).to_path(SHAPE_TOLERANCE)
        }
        // A filled polyline is painted as if it were closed.
        "polygon" | "polyline" => {
            let value = node.attribute("points").unwrap_or_default();
            let coords = parse_numbers(value).ok_or_else(|| crate::Error::InvalidLength {
                attribute: "points".to_string(),
                value: value.to_string(),
            })?;
            let points: Vec<Point> =
                coords.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1])).collect();
            if points.len() < 3 {
                return Ok(None);
            }
            let mut path = BezPath::new();
            path.move_to(points[0]);
            for point in &points[1..] {
                path.line_to(*point);
            }
            path.close_path();
            path
        }
        _ => return Ok(None),
    };

    Ok(Some(path))
}

/// Rectangle with elliptical corners, drawn clockwise in SVG's y-down space.
fn rounded_rect(rect: Rect, rx: f64, ry: f64) -> BezPath {
    if rx == 0.0 || ry == 0.0 {
        return rect.to_path(SHAPE_TOLERANCE);
    }

    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let Rect { x0, y0, x1, y1 } = rect;

    let mut path = BezPath::new();
    path.move_to((x0 + rx, y0));
    path.line_to((x1 - rx, y0));
    path.curve_to((x1 - rx + kx, y0), (x1, y0 + ry - ky), (x1, y0 + ry));
    path.line_to((x1, y1 - ry));
    path.curve_to((x1, y1 - ry + ky), (x1 - rx + kx, y1), (x1 - rx, y1));
    path.line_to((x0 + rx, y1));
    path.curve_to((x0 + rx - kx, y1), (x0, y1 - ry + ky), (x0, y1 - ry));
    path.line_to((x0, y0 + ry));
    path.curve_to((x0, y0 + ry - ky), (x0 + rx - kx, y0), (x0 + rx, y0));
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use kurbo::{PathEl, Shape};
    use roxmltree::Document;

    use super::*;

    fn path_of(element: &str) -> Option<BezPath> {
        let text = format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{element}</svg>"#);
        let doc = Document::parse(&text).unwrap();
        let node = doc.root_element().first_element_child().unwrap();
        element_path(node).unwrap()
    }

    #[test]
    fn plain_rect_area() {
        let path = path_of(r#"<rect x="2" y="2" width="20" height="10"/>"#).unwrap();
        assert!((path.area().abs() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn rounded_rect_is_smaller_than_plain() {
        let path = path_of(r#"<rect width="20" height="20" rx="5"/>"#).unwrap();
        // 400 - (4 - pi) * 25
        let area = path.area().abs();
        assert!((area - 378.54).abs() < 0.5, "unexpected area {area}");
        assert!(path.elements().iter().any(|el| matches!(el, PathEl::CurveTo(..))));
    }

    #[test]
    fn polygon_is_closed() {
        let path = path_of(r#"<polyline points="0,0 10,0 10,10"/>"#).unwrap();
        assert!(matches!(path.elements().last(), Some(PathEl::ClosePath)));
        assert!((path.area().abs() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_shapes_are_ignored() {
        assert!(path_of(r#"<rect width="0" height="10"/>"#).is_none());
        assert!(path_of(r#"<circle r="0"/>"#).is_none());
        assert!(path_of(r#"<line x1="0" y1="0" x2="5" y2="5"/>"#).is_none());
        assert!(path_of(r#"<path d=" "/>"#).is_none());
    }

    #[test]
    fn circle_area() {
        let path = path_of(r#"<circle cx="12" cy="12" r="10"/>"#).unwrap();
        let expected = std::f64::consts::PI * 100.0;
        assert!((path.area().abs() - expected).abs() < 0.5);
    }
}
