//! Parsing of SVG number lists, lengths and `transform` attributes.

use kurbo::{Affine, Point};

use crate::{Error, Result};

/// CSS pixels per unit for the absolute length units SVG allows.
const UNIT_SCALES: &[(&str, f64)] = &[
    ("px", 1.0),
    ("pt", 4.0 / 3.0),
    ("pc", 16.0),
    ("mm", 96.0 / 25.4),
    ("cm", 96.0 / 2.54),
    ("in", 96.0),
];

/// Split an SVG number list.
///
/// Separators may be whitespace, commas, or nothing at all when the next
/// number starts with a sign or a second decimal point (`"10-5"`, `"1.5.5"`).
pub(crate) fn parse_numbers(s: &str) -> Option<Vec<f64>> {
    let bytes = s.as_bytes();
    let mut numbers = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() || c == b',' {
            i += 1;
            continue;
        }

        let start = i;
        if c == b'+' || c == b'-' {
            i += 1;
        }

        let mut seen_dot = false;
        let mut digits = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'0'..=b'9' => {
                    digits += 1;
                    i += 1;
                }
                b'.' if !seen_dot => {
                    seen_dot = true;
                    i += 1;
                }
                _ => break,
            }
        }
        if digits == 0 {
            return None;
        }

        if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            let mut j = i + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            let exponent_start = j;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > exponent_start {
                i = j;
            }
        }

        numbers.push(s[start..i].parse().ok()?);
    }

    Some(numbers)
}

/// Parse a length attribute into user units.
///
/// Relative units (`%`, `em`, `ex`) have no meaning without a layout context
/// and are rejected.
pub(crate) fn parse_length(attribute: &str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let invalid = || Error::InvalidLength {
        attribute: attribute.to_string(),
        value: value.to_string(),
    };

    let (number, scale) = UNIT_SCALES
        .iter()
        .find_map(|(unit, scale)| trimmed.strip_suffix(unit).map(|n| (n, *scale)))
        .unwrap_or((trimmed, 1.0));

    let parsed: f64 = number.trim_end().parse().map_err(|_| invalid())?;
    if !parsed.is_finite() {
        return Err(invalid());
    }
    Ok(parsed * scale)
}

/// Parse an SVG `transform` attribute.
///
/// Transform lists apply right to left: `translate(10) scale(2)` scales first.
pub fn parse_transform(value: &str) -> Result<Affine> {
    let invalid = || Error::InvalidTransform(value.to_string());
    let mut result = Affine::IDENTITY;
    let mut rest = value.trim_start();

    while !rest.is_empty() {
        let name_end = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
        let (name, after_name) = rest.split_at(name_end);
        if name.is_empty() {
            return Err(invalid());
        }

        let after_name = after_name.trim_start();
        let args_str = after_name.strip_prefix('(').ok_or_else(invalid)?;
        let close = args_str.find(')').ok_or_else(invalid)?;
        let args = parse_numbers(&args_str[..close]).ok_or_else(invalid)?;

        let step = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
            ("translate", &[tx]) => Affine::translate((tx, 0.0)),
            ("translate", &[tx, ty]) => Affine::translate((tx, ty)),
            ("scale", &[s]) => Affine::scale(s),
            ("scale", &[sx, sy]) => Affine::scale_non_uniform(sx, sy),
            ("rotate", &[angle]) => Affine::rotate(angle.to_radians()),
            ("rotate", &[angle, cx, cy]) => {
                Affine::rotate_about(angle.to_radians(), Point::new(cx, cy))
            }
            ("skewX", &[angle]) => Affine::skew(angle.to_radians().tan(), 0.0),
            ("skewY", &[angle]) => Affine::skew(0.0, angle.to_radians().tan()),
            _ => return Err(invalid()),
        };
        result = result * step;

        rest = args_str[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(value: &str, x: f64, y: f64) -> Point {
        parse_transform(value).unwrap() * Point::new(x, y)
    }

    fn assert_close(actual: Point, expected: (f64, f64)) {
        assert!(
            (actual.x - expected.0).abs() < 1e-9 && (actual.y - expected.1).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn numbers_without_separators() {
        assert_eq!(parse_numbers("10-5"), Some(vec![10.0, -5.0]));
        assert_eq!(parse_numbers("1.5.5"), Some(vec![1.5, 0.5]));
        assert_eq!(parse_numbers(" 1e2, -3 "), Some(vec![100.0, -3.0]));
        assert_eq!(parse_numbers("1 x"), None);
    }

    #[test]
    fn lengths_with_units() {
        assert_eq!(parse_length("width", "24").unwrap(), 24.0);
        assert_eq!(parse_length("width", "24px").unwrap(), 24.0);
        assert_eq!(parse_length("width", "1in").unwrap(), 96.0);
        assert!(parse_length("width", "100%").is_err());
        assert!(parse_length("width", "2em").is_err());
    }

    #[test]
    fn translate_then_scale() {
        // scale applies first, then translate
        assert_close(apply("translate(10, 20) scale(2)", 1.0, 1.0), (12.0, 22.0));
    }

    #[test]
    fn rotate_about_center() {
        assert_close(apply("rotate(90 10 10)", 20.0, 10.0), (10.0, 20.0));
    }

    #[test]
    fn matrix_and_skew() {
        assert_close(apply("matrix(1 0 0 1 5 6)", 0.0, 0.0), (5.0, 6.0));
        assert_close(apply("skewX(45)", 0.0, 10.0), (10.0, 10.0));
    }

    #[test]
    fn rejects_unknown_or_malformed() {
        assert!(parse_transform("wobble(3)").is_err());
        assert!(parse_transform("translate(1, 2").is_err());
        assert!(parse_transform("scale()").is_err());
    }
}
