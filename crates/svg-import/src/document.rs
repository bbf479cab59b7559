//! SVG document traversal.

use std::{fs::read_to_string, path::Path};

use kurbo::{Affine, BezPath, PathEl, Rect};
use log::debug;
use roxmltree::{Document, Node, ParsingOptions};

use crate::{
    Error, Result,
    shapes::element_path,
    transform::{parse_length, parse_numbers, parse_transform},
};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Elements whose content is never rendered directly.
const NON_RENDERED: &[&str] = &[
    "clipPath",
    "defs",
    "desc",
    "linearGradient",
    "marker",
    "mask",
    "metadata",
    "pattern",
    "radialGradient",
    "style",
    "symbol",
    "title",
];

/// A parsed icon: every filled shape merged into one path in SVG user space.
#[derive(Debug, Clone)]
pub struct SvgIcon {
    /// The viewport the outline was drawn in (y grows downwards).
    pub view_box: Rect,
    /// Filled outline with all transforms applied.
    pub path: BezPath,
}

/// Target metrics for placing an icon inside the em square.
#[derive(Debug, Clone, Copy)]
pub struct EmBox {
    pub units_per_em: u16,
    pub ascent: i16,
}

/// An icon outline in font units (y grows upwards).
#[derive(Debug, Clone)]
pub struct PlacedOutline {
    pub path: BezPath,
    pub advance_width: f64,
}

impl SvgIcon {
    /// Read and parse an SVG file.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    /// Parse SVG source text.
    pub fn parse(text: &str) -> Result<Self> {
        let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
        let doc = Document::parse_with_options(text, options)?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::NotSvg(root.tag_name().name().to_string()));
        }

        let view_box = parse_viewport(root)?;
        let mut walker = Walker { doc: &doc, path: BezPath::new(), active_uses: Vec::new() };
        if property(root, "display") != Some("none") {
            let style = Inherited { transform: Affine::IDENTITY, fill: true }.for_element(root)?;
            walker.visit_children(root, style)?;
        }

        Ok(Self { view_box, path: walker.path })
    }

    /// Number of subpaths in the outline.
    pub fn contour_count(&self) -> usize {
        self.path.elements().iter().filter(|el| matches!(el, PathEl::MoveTo(_))).count()
    }

    /// Scale the icon so the viewport height fills the em, with the top of the
    /// viewport at the ascender.
    pub fn place(&self, em: EmBox) -> PlacedOutline {
        let scale = f64::from(em.units_per_em) / self.view_box.height();
        let to_font = Affine::translate((0.0, f64::from(em.ascent)))
            * Affine::scale_non_uniform(scale, -scale)
            * Affine::translate((-self.view_box.x0, -self.view_box.y0));

        let mut path = self.path.clone();
        path.apply_affine(to_font);
        PlacedOutline { path, advance_width: self.view_box.width() * scale }
    }
}

fn parse_viewport(root: Node) -> Result<Rect> {
    if let Some(value) = root.attribute("viewBox") {
        return parse_view_box(value);
    }

    match (root.attribute("width"), root.attribute("height")) {
        (Some(w), Some(h)) => {
            let (w, h) = (parse_length("width", w)?, parse_length("height", h)?);
            if w <= 0.0 || h <= 0.0 {
                return Err(Error::NoViewport);
            }
            Ok(Rect::new(0.0, 0.0, w, h))
        }
        _ => Err(Error::NoViewport),
    }
}

fn parse_view_box(value: &str) -> Result<Rect> {
    match parse_numbers(value).as_deref() {
        Some(&[x, y, w, h]) if w > 0.0 && h > 0.0 => Ok(Rect::new(x, y, x + w, y + h)),
        _ => Err(Error::InvalidViewBox(value.to_string())),
    }
}

/// Map a nested viewport's `viewBox` onto its `width` x `height` box.
///
/// Without `preserveAspectRatio="none"` the content is scaled uniformly and
/// centred (`xMidYMid meet`). A zero-sized viewport renders nothing.
fn view_box_transform(node: Node, view_box: Rect) -> Result<Option<Affine>> {
    // Percentages resolve against the parent viewport, which is not tracked.
    let extent = |name: &str, fallback: f64| match node.attribute(name) {
        Some(v) if !v.trim_end().ends_with('%') => parse_length(name, v),
        _ => Ok(fallback),
    };
    let width = extent("width", view_box.width())?;
    let height = extent("height", view_box.height())?;
    if width <= 0.0 || height <= 0.0 {
        return Ok(None);
    }
    let (sx, sy) = (width / view_box.width(), height / view_box.height());

    let fit = if node.attribute("preserveAspectRatio").map(str::trim) == Some("none") {
        Affine::scale_non_uniform(sx, sy)
    } else {
        let scale = sx.min(sy);
        Affine::translate((
            (width - view_box.width() * scale) / 2.0,
            (height - view_box.height() * scale) / 2.0,
        )) * Affine::scale(scale)
    };
    Ok(Some(fit * Affine::translate((-view_box.x0, -view_box.y0))))
}

/// Presentation state inherited from ancestors.
#[derive(Debug, Clone, Copy)]
struct Inherited {
    transform: Affine,
    fill: bool,
}

impl Inherited {
    fn for_element(self, node: Node) -> Result<Self> {
        let transform = match node.attribute("transform") {
            Some(value) => self.transform * parse_transform(value)?,
            None => self.transform,
        };
        let fill = match property(node, "fill") {
            Some(value) => value != "none",
            None => self.fill,
        };
        Ok(Self { transform, fill })
    }
}

/// Look up a presentation property, preferring the `style` attribute.
fn property<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    let from_style = node.attribute("style").and_then(|style| {
        style.split(';').find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            (key.trim() == name).then(|| value.trim())
        })
    });
    from_style.or_else(|| node.attribute(name).map(str::trim))
}

struct Walker<'a, 'input> {
    doc: &'a Document<'input>,
    path: BezPath,
    active_uses: Vec<String>,
}

impl Walker<'_, '_> {
    fn visit_children(&mut self, node: Node, style: Inherited) -> Result<()> {
        for child in node.children().filter(Node::is_element) {
            if NON_RENDERED.contains(&child.tag_name().name()) {
                continue;
            }
            self.visit(child, style)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: Node, parent: Inherited) -> Result<()> {
        if property(node, "display") == Some("none") {
            return Ok(());
        }
        let style = parent.for_element(node)?;

        match node.tag_name().name() {
            "g" | "a" | "switch" | "symbol" => self.visit_children(node, style),
            "svg" => {
                let mut offset = Affine::translate((
                    node.attribute("x").map(|v| parse_length("x", v)).transpose()?.unwrap_or(0.0),
                    node.attribute("y").map(|v| parse_length("y", v)).transpose()?.unwrap_or(0.0),
                ));
                if let Some(value) = node.attribute("viewBox") {
                    match view_box_transform(node, parse_view_box(value)?)? {
                        Some(fit) => offset = offset * fit,
                        None => return Ok(()),
                    }
                }
                let style = Inherited { transform: style.transform * offset, ..style };
                self.visit_children(node, style)
            }
            "use" => self.visit_use(node, style),
            name => {
                let Some(mut path) = element_path(node)? else {
                    return Ok(());
                };
                if !style.fill {
                    debug!("skipping unfilled <{name}>");
                    return Ok(());
                }
                path.apply_affine(style.transform);
                for el in path.elements() {
                    self.path.push(*el);
                }
                Ok(())
            }
        }
    }

    fn visit_use(&mut self, node: Node, style: Inherited) -> Result<()> {
        let Some(href) = node.attribute("href").or_else(|| node.attribute((XLINK_NS, "href")))
        else {
            return Ok(());
        };
        let id = href.strip_prefix('#').unwrap_or(href);

        if self.active_uses.iter().any(|active| active == id) {
            return Err(Error::ReferenceCycle(id.to_string()));
        }
        let target = self
            .doc
            .descendants()
            .find(|n| n.attribute("id") == Some(id))
            .ok_or_else(|| Error::UnresolvedReference(id.to_string()))?;

        let x = node.attribute("x").map(|v| parse_length("x", v)).transpose()?.unwrap_or(0.0);
        let y = node.attribute("y").map(|v| parse_length("y", v)).transpose()?.unwrap_or(0.0);
        let style = Inherited { transform: style.transform * Affine::translate((x, y)), ..style };

        self.active_uses.push(id.to_string());
        let result = self.visit(target, style);
        self.active_uses.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Shape;

    use super::*;

    fn svg(body: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 24 24">{body}</svg>"#
        )
    }

    #[test]
    fn view_box_and_shapes() {
        let icon = SvgIcon::parse(&svg(r#"<rect width="24" height="12"/><circle cx="12" cy="18" r="4"/>"#))
            .unwrap();
        assert_eq!(icon.view_box, Rect::new(0.0, 0.0, 24.0, 24.0));
        assert_eq!(icon.contour_count(), 2);
    }

    #[test]
    fn width_height_fallback() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32px" height="16"><rect width="1" height="1"/></svg>"#;
        let icon = SvgIcon::parse(text).unwrap();
        assert_eq!(icon.view_box, Rect::new(0.0, 0.0, 32.0, 16.0));
    }

    #[test]
    fn missing_viewport_is_an_error() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1"/></svg>"#;
        assert!(matches!(SvgIcon::parse(text), Err(Error::NoViewport)));
    }

    #[test]
    fn not_an_svg() {
        assert!(matches!(SvgIcon::parse("<html/>"), Err(Error::NotSvg(_))));
        assert!(matches!(SvgIcon::parse("<svg"), Err(Error::Xml(_))));
    }

    #[test]
    fn group_transforms_compose() {
        let icon = SvgIcon::parse(&svg(
            r#"<g transform="translate(10 0)"><rect transform="scale(2)" width="1" height="1"/></g>"#,
        ))
        .unwrap();
        let bounds = icon.path.bounding_box();
        assert_eq!(bounds, Rect::new(10.0, 0.0, 12.0, 2.0));
    }

    #[test]
    fn unfilled_and_hidden_shapes_are_skipped() {
        let icon = SvgIcon::parse(&svg(concat!(
            r#"<rect width="5" height="5" fill="none"/>"#,
            r#"<g style="fill: none"><rect width="5" height="5"/></g>"#,
            r#"<g fill="none"><rect width="5" height="5" fill="black"/></g>"#,
            r#"<rect width="5" height="5" display="none"/>"#,
            r#"<defs><rect id="r" width="5" height="5"/></defs>"#,
        )))
        .unwrap();
        assert_eq!(icon.contour_count(), 1);
    }

    #[test]
    fn root_presentation_attributes_are_inherited() {
        let outline = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor"><path d="M2 2L22 2L22 22Z"/></svg>"#;
        assert_eq!(SvgIcon::parse(outline).unwrap().contour_count(), 0);

        let refilled = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" style="fill:none"><path d="M2 2L22 2L22 22Z" fill="black"/></svg>"#;
        assert_eq!(SvgIcon::parse(refilled).unwrap().contour_count(), 1);

        let hidden = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" display="none"><rect width="4" height="4"/></svg>"#;
        let icon = SvgIcon::parse(hidden).unwrap();
        assert_eq!(icon.contour_count(), 0);
        assert_eq!(icon.view_box, Rect::new(0.0, 0.0, 24.0, 24.0));
    }

    #[test]
    fn nested_svg_view_box_scales_content() {
        let icon = SvgIcon::parse(&svg(
            r#"<svg width="24" height="24" viewBox="0 0 12 12"><rect width="12" height="12"/></svg>"#,
        ))
        .unwrap();
        assert_eq!(icon.path.bounding_box(), Rect::new(0.0, 0.0, 24.0, 24.0));

        let offset = SvgIcon::parse(&svg(
            r#"<svg x="2" y="2" width="10" height="10" viewBox="5 5 20 20"><rect x="5" y="5" width="20" height="20"/></svg>"#,
        ))
        .unwrap();
        assert_eq!(offset.path.bounding_box(), Rect::new(2.0, 2.0, 12.0, 12.0));

        let centred = SvgIcon::parse(&svg(
            r#"<svg width="24" height="12" viewBox="0 0 12 12"><rect width="12" height="12"/></svg>"#,
        ))
        .unwrap();
        assert_eq!(centred.path.bounding_box(), Rect::new(6.0, 0.0, 18.0, 12.0));

        let stretched = SvgIcon::parse(&svg(
            r#"<svg width="24" height="12" viewBox="0 0 12 12" preserveAspectRatio="none"><rect width="12" height="12"/></svg>"#,
        ))
        .unwrap();
        assert_eq!(stretched.path.bounding_box(), Rect::new(0.0, 0.0, 24.0, 12.0));
    }

    #[test]
    fn use_references_are_resolved() {
        let icon = SvgIcon::parse(&svg(concat!(
            r#"<defs><rect id="dot" width="2" height="2"/></defs>"#,
            r##"<use href="#dot" x="4"/>"##,
            r##"<use xlink:href="#dot" y="8"/>"##,
        )))
        .unwrap();
        assert_eq!(icon.contour_count(), 2);
        assert_eq!(icon.path.bounding_box(), Rect::new(0.0, 0.0, 6.0, 10.0));
    }

    #[test]
    fn use_errors() {
        let missing = SvgIcon::parse(&svg(r##"<use href="#nope"/>"##));
        assert!(matches!(missing, Err(Error::UnresolvedReference(_))));

        let cycle = SvgIcon::parse(&svg(r##"<g id="loop"><use href="#loop"/></g>"##));
        assert!(matches!(cycle, Err(Error::ReferenceCycle(_))));
    }

    #[test]
    fn place_flips_into_em() {
        let icon = SvgIcon::parse(&svg(r#"<rect width="24" height="6"/>"#)).unwrap();
        let placed = icon.place(EmBox { units_per_em: 1000, ascent: 800 });
        assert!((placed.advance_width - 1000.0).abs() < 1e-9);

        let bounds = placed.path.bounding_box();
        assert!((bounds.y1 - 800.0).abs() < 1e-9);
        assert!((bounds.y0 - 550.0).abs() < 1e-9);
        assert!((bounds.x1 - 1000.0).abs() < 1e-9);
    }
}
