// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f64::consts::PI;

use flatpath::Transform;

use crate::value::parse_float;

const FUNCTIONS: &[&str] = &["translate", "matrix", "rotate", "skewX", "skewY", "scale"];

/// A single transform function parsed from a `transform` attribute.
#[derive(Clone, PartialEq, Debug)]
pub struct ParsedTransform {
    /// The resulting matrix.
    ///
    /// Malformed parts degrade to their default values.
    pub transform: Transform,
    /// Syntax errors.
    pub errors: Vec<String>,
    /// Arity and parameter issues.
    pub warnings: Vec<String>,
}

impl ParsedTransform {
    fn new(transform: Transform) -> Self {
        ParsedTransform {
            transform,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn with_error(msg: String) -> Self {
        ParsedTransform {
            errors: vec![msg],
            ..ParsedTransform::new(Transform::default())
        }
    }
}

/// Parses an SVG `transform` attribute.
///
/// Returns one matrix per transform function, in the declaration order.
/// Leftover text produces an extra identity matrix with an error attached.
///
/// `tag_name` is used only in messages.
pub fn parse_transform(text: &str, tag_name: Option<&str>) -> Vec<ParsedTransform> {
    let mut list = Vec::new();
    let mut unused = Vec::new();

    let mut pos = 0;
    while let Some((start, end)) = find_function(text, pos) {
        unused.push(&text[pos..start]);
        list.push(parse_function(&text[start..end], tag_name));
        pos = end;
    }
    unused.push(&text[pos..]);

    let unused: Vec<_> = unused
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ",")
        .map(|s| format!("\"{}\"", s))
        .collect();

    if !unused.is_empty() {
        list.push(ParsedTransform::with_error(format!(
            "Malformed transform, unmatched characters: [ {} ].",
            unused.join(", ")
        )));
    }

    list
}

// Finds the next `name ( params )` substring.
// The params may be padded with any whitespace, but cannot contain a line break.
fn find_function(text: &str, from: usize) -> Option<(usize, usize)> {
    text[from..]
        .char_indices()
        .find_map(|(i, _)| match_function(&text[from + i..]).map(|len| (from + i, from + i + len)))
}

fn match_function(s: &str) -> Option<usize> {
    let name = FUNCTIONS.iter().find(|name| {
        s.get(..name.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(name))
    })?;

    let rest = s[name.len()..].trim_start().strip_prefix('(')?;
    let close = rest.find(')')?;
    if rest[..close].trim().contains(is_line_terminator) {
        return None;
    }

    Some(s.len() - rest.len() + close + 1)
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn parse_function(text: &str, tag_name: Option<&str>) -> ParsedTransform {
    // Runs of parentheses are a single separator.
    let mut parts: Vec<&str> = text
        .split(|c| c == '(' || c == ')')
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() == 1 {
        parts.push("");
    }

    if parts.len() != 2 {
        return ParsedTransform::with_error(format!("Malformed transform: \"{}\".", text));
    }

    let name = parts[0].trim().to_ascii_lowercase();
    let params = split_params(parts[1].trim());
    let numbers: Vec<f64> = params
        .iter()
        .map(|p| {
            let n = parse_float(p);
            if n.is_infinite() {
                f64::NAN
            } else {
                n
            }
        })
        .collect();
    let p = |i: usize| numbers.get(i).copied();

    let mut ts = Transform::default();
    let expected: &[usize] = match name.as_str() {
        "translate" => {
            ts.e = or(p(0), 0.0);
            ts.f = or(p(1), 0.0);
            &[1, 2]
        }
        "scale" => {
            ts.a = or_zero(p(0), 1.0);
            ts.d = or_zero(p(1), ts.a);
            &[1, 2]
        }
        "rotate" => {
            let angle = or(p(0), 0.0) * PI / 180.0;
            if angle != 0.0 {
                let x = or(p(1), 0.0);
                let y = or(p(2), 0.0);
                let (sin, cos) = angle.sin_cos();
                ts = Transform::new(
                    cos,
                    sin,
                    -sin,
                    cos,
                    -x * cos + y * sin + x,
                    -x * sin - y * cos + y,
                );
            }
            &[1, 3]
        }
        "skewx" => {
            let angle = or(p(0), 0.0) * PI / 180.0;
            if angle != 0.0 {
                ts.c = angle.tan();
            }
            &[1]
        }
        "skewy" => {
            let angle = or(p(0), 0.0) * PI / 180.0;
            if angle != 0.0 {
                ts.b = angle.tan();
            }
            &[1]
        }
        _ => {
            // `find_function` matches known names only.
            ts.a = or_zero(p(0), 1.0);
            ts.b = or(p(1), 0.0);
            ts.c = or(p(2), 0.0);
            ts.d = or_zero(p(3), 1.0);
            ts.e = or(p(4), 0.0);
            ts.f = or(p(5), 0.0);
            &[6]
        }
    };

    let mut parsed = ParsedTransform::new(ts);

    let tag = tag_name.map(|t| format!("{} ", t)).unwrap_or_default();
    let count = if params.len() == 1 && params[0].is_empty() {
        0
    } else {
        params.len()
    };

    if !expected.contains(&count) {
        let list: Vec<_> = expected.iter().map(|n| n.to_string()).collect();
        let plural = if expected.last().map_or(false, |n| *n > 1) {
            "s"
        } else {
            ""
        };

        parsed.warnings.push(format!(
            "Found {}element with malformed transform: \"{}\" containing {} parameters, \
             expected {} parameter{}.",
            tag,
            text,
            count,
            list.join(" or "),
            plural
        ));
    } else if numbers.iter().any(|n| n.is_nan()) {
        parsed.warnings.push(format!(
            "Found {}element with invalid transform: \"{}\", \
             transform parameters must be finite numbers.",
            tag, text
        ));
    }

    parsed
}

fn split_params(text: &str) -> Vec<&str> {
    let params: Vec<&str> = text.split(',').collect();
    if params.len() > 1 || text.is_empty() {
        return params;
    }

    text.split_whitespace().collect()
}

// Missing, zero and NaN parameters fall back to the default.
fn or(n: Option<f64>, default: f64) -> f64 {
    match n {
        Some(n) if n != 0.0 && !n.is_nan() => n,
        _ => default,
    }
}

// Like `or`, but zero is a legal value.
fn or_zero(n: Option<f64>, default: f64) -> f64 {
    match n {
        Some(n) if n == 0.0 => 0.0,
        _ => or(n, default),
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test {
        ($name:ident, $text:expr, $ts:expr) => (
            #[test]
            fn $name() {
                let list = parse_transform($text, None);
                assert_eq!(list.len(), 1);
                let (a, b) = (list[0].transform, $ts);
                for (x, y) in [(a.a, b.a), (a.b, b.b), (a.c, b.c), (a.d, b.d), (a.e, b.e), (a.f, b.f)] {
                    assert!((x - y).abs() < 1e-6, "{:?} != {:?}", a, b);
                }
                assert!(list[0].errors.is_empty());
                assert!(list[0].warnings.is_empty());
            }
        )
    }

    fn ts(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Transform {
        Transform::new(a, b, c, d, e, f)
    }

    test!(translate_1, "translate(20)", ts(1.0, 0.0, 0.0, 1.0, 20.0, 0.0));
    test!(translate_2, "translate(20,-50)", ts(1.0, 0.0, 0.0, 1.0, 20.0, -50.0));
    test!(translate_3, "translate(-4.3 0.001)", ts(1.0, 0.0, 0.0, 1.0, -4.3, 0.001));
    test!(translate_4, "translate(-004.03000,.001)", ts(1.0, 0.0, 0.0, 1.0, -4.03, 0.001));
    test!(translate_5, "translate(+65.8,-0)", ts(1.0, 0.0, 0.0, 1.0, 65.8, 0.0));
    test!(translate_6, "translate(-4.3px,0.001in)", ts(1.0, 0.0, 0.0, 1.0, -4.3, 0.001));
    test!(translate_7, "  translate\t\t ( \n20.4 ,   -50 \t) \n", ts(1.0, 0.0, 0.0, 1.0, 20.4, -50.0));
    test!(translate_8, "TRANSLATE(20.4, -50)", ts(1.0, 0.0, 0.0, 1.0, 20.4, -50.0));
    test!(scale_1, "scale(20)", ts(20.0, 0.0, 0.0, 20.0, 0.0, 0.0));
    test!(scale_2, "scale(0)", ts(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    test!(scale_3, "scale(20,-50)", ts(20.0, 0.0, 0.0, -50.0, 0.0, 0.0));
    test!(rotate_1, "rotate(90)", ts(0.0, 1.0, -1.0, 0.0, 0.0, 0.0));
    test!(rotate_2, "rotate(30)", ts(0.8660254037844387, 0.5, -0.5, 0.8660254037844387, 0.0, 0.0));
    test!(rotate_3, "rotate(20,-50,10.5)", ts(0.9396926207859084, 0.3420201433256687, -0.3420201433256687,
                                              0.9396926207859084, 0.5758425442149431, 17.734234648031396));
    test!(rotate_4, "rotate(20 -50 10.5)", ts(0.9396926207859084, 0.3420201433256687, -0.3420201433256687,
                                              0.9396926207859084, 0.5758425442149431, 17.734234648031396));
    test!(rotate_5, "rotate(0,1,1)", Transform::default());
    test!(rotate_6, "rotate(360rad)", Transform::default());
    test!(skew_x, "skewX(45)", ts(1.0, 0.0, 1.0, 1.0, 0.0, 0.0));
    test!(skew_y, "skewy(45)", ts(1.0, 1.0, 0.0, 1.0, 0.0, 0.0));
    test!(matrix_1, "matrix(3.4,-6,2.4,0.005,-75,21)", ts(3.4, -6.0, 2.4, 0.005, -75.0, 21.0));
    test!(matrix_2, "matrix(0 0 0 0 0 0)", ts(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));

    #[test]
    fn empty() {
        assert!(parse_transform("", None).is_empty());
        assert!(parse_transform("  \n\n\t\t", None).is_empty());
    }

    #[test]
    fn missing_params() {
        let list = parse_transform("translate( )", Some("rect"));
        assert_eq!(list[0].transform, Transform::default());
        assert_eq!(list[0].warnings, [
            "Found rect element with malformed transform: \"translate( )\" containing 0 parameters, \
             expected 1 or 2 parameters."
        ]);
    }

    #[test]
    fn extra_params() {
        let list = parse_transform("skewX(1,2)", None);
        assert_eq!(list[0].warnings, [
            "Found element with malformed transform: \"skewX(1,2)\" containing 2 parameters, \
             expected 1 parameter."
        ]);
    }

    #[test]
    fn invalid_params() {
        let list = parse_transform("translate(,4)", None);
        assert_eq!(list[0].transform, Transform::new_translate(0.0, 4.0));
        assert_eq!(list[0].warnings, [
            "Found element with invalid transform: \"translate(,4)\", transform parameters must be finite numbers."
        ]);

        let list = parse_transform("scale(Infinity)", None);
        assert_eq!(list[0].transform, Transform::default());
        assert_eq!(list[0].warnings.len(), 1);

        let list = parse_transform("rotate ( 360 , \t,  0\n\n)", None);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].warnings.len(), 1);
    }

    #[test]
    fn unclosed() {
        let list = parse_transform("translate(20.4, -50", None);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].errors, ["Malformed transform, unmatched characters: [ \"translate(20.4, -50\" ]."]);
    }

    #[test]
    fn nested() {
        let list = parse_transform("translate(20.4, -50 rotate(34)", None);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].transform, Transform::default());
        assert_eq!(list[0].errors, ["Malformed transform: \"translate(20.4, -50 rotate(34)\"."]);
    }

    #[test]
    fn line_break_in_params() {
        let list = parse_transform("translate(1\n2)", None);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].errors.len(), 1);
    }

    #[test]
    fn unmatched_between() {
        let list = parse_transform("translate(20.4, -50) --- rotate(34)", None);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].transform, Transform::new_translate(20.4, -50.0));
        assert!((list[1].transform.a - 0.8290375725550416).abs() < 1e-9);
        assert_eq!(list[2].transform, Transform::default());
        assert_eq!(list[2].errors, ["Malformed transform, unmatched characters: [ \"---\" ]."]);
    }

    #[test]
    fn chain() {
        let list = parse_transform("translate(-004.03000,.001), matrix(3.4,-6,2.4,0.005,-75,21), skewX(0) ", None);
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|t| t.errors.is_empty() && t.warnings.is_empty()));
        assert_eq!(list[2].transform, Transform::default());
    }
}
