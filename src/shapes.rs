// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use flatpath::{Num, PathData, PathSegment, Transform};

use crate::cascade::FlatElement;
use crate::error::Diagnostics;
use crate::value::{json_object, parse_float, Properties, Value};
use crate::Options;

/// A geometry element converted into a single path.
#[derive(Clone, PartialEq, Debug)]
pub struct FlatPath {
    /// Element's properties with shape attributes replaced by `d`.
    pub properties: Properties,
}

impl FlatPath {
    /// Returns the path data string.
    pub fn d(&self) -> &str {
        self.properties
            .get("d")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// A converted shape.
enum Shape {
    /// A path data string built from a list of points.
    Simple(String),
    /// A parsed path data that can be reused later.
    Parsed(PathData),
}

/// Converts elements into absolute paths with transforms applied.
///
/// Returns paths along with their parsed data, when available.
/// Elements that cannot be converted are skipped.
pub(crate) fn convert(
    elements: &[FlatElement],
    opt: &Options,
) -> (Vec<FlatPath>, Vec<Option<PathData>>, Diagnostics) {
    let mut paths = Vec::new();
    let mut path_data = Vec::new();
    let mut diagnostics = Diagnostics::default();

    for element in elements {
        let props = &element.properties;
        let ts = element.transform.as_ref();

        let tag = element.tag_name.as_str();
        let shape = match tag {
            "line" => convert_line(props, ts, &mut diagnostics),
            "rect" => convert_rect(props, ts, &mut diagnostics),
            "polygon" | "polyline" => convert_points(props, tag, ts, &mut diagnostics),
            "circle" => convert_circle(props, opt, ts, &mut diagnostics),
            "ellipse" => convert_ellipse(props, opt, ts, &mut diagnostics),
            "path" => convert_path(props, opt, ts, &mut diagnostics),
            _ => {
                diagnostics.warn(format!("Unsupported tagname: \"{}\".", tag));
                continue;
            }
        };

        let (d, data) = match shape {
            Some(Shape::Simple(d)) => (d, None),
            Some(Shape::Parsed(data)) => (data.to_string(), Some(data)),
            None => continue,
        };

        if d.is_empty() {
            continue;
        }

        let mut properties = props.clone();
        for key in shape_keys(tag) {
            properties.remove(key);
        }
        properties.insert("d", Value::String(d));

        paths.push(FlatPath { properties });
        path_data.push(data);
    }

    log::debug!("Converted {} of {} elements into paths.", paths.len(), elements.len());

    (paths, path_data, diagnostics)
}

// Attributes folded into `d`.
fn shape_keys(tag: &str) -> &'static [&'static str] {
    match tag {
        "line" => &["x1", "y1", "x2", "y2"],
        "rect" => &["x", "y", "width", "height"],
        "polygon" | "polyline" => &["points"],
        "circle" => &["cx", "cy", "r"],
        "ellipse" => &["cx", "cy", "rx", "ry"],
        _ => &["d"],
    }
}

fn convert_line(
    props: &Properties,
    ts: Option<&Transform>,
    diagnostics: &mut Diagnostics,
) -> Option<Shape> {
    let fields = defaults(props, &["x1", "y1", "x2", "y2"]);
    let coords = numbers(&fields, |_| false);
    let (x1, y1, x2, y2) = match coords.as_deref() {
        Some(&[x1, y1, x2, y2]) => (x1, y1, x2, y2),
        _ => {
            diagnostics.error(format!("Invalid <line> properties: {}.", to_json(&fields)));
            return None;
        }
    };

    let mut d = String::new();
    move_to(&mut d, ts, x1, y1);
    line_to(&mut d, ts, x2, y2);
    Some(Shape::Simple(d))
}

fn convert_rect(
    props: &Properties,
    ts: Option<&Transform>,
    diagnostics: &mut Diagnostics,
) -> Option<Shape> {
    let mut fields = defaults(props, &["x", "y"]);
    fields.push(("width", props.get("width").cloned()));
    fields.push(("height", props.get("height").cloned()));

    let coords = numbers(&fields, |i| i >= 2);
    let (x, y, w, h) = match coords.as_deref() {
        Some(&[x, y, w, h]) => (x, y, w, h),
        _ => {
            diagnostics.error(format!("Invalid <rect> properties: {}.", to_json(&fields)));
            return None;
        }
    };

    let mut d = String::new();
    move_to(&mut d, ts, x, y);
    line_to(&mut d, ts, x + w, y);
    line_to(&mut d, ts, x + w, y + h);
    line_to(&mut d, ts, x, y + h);
    d.push_str(" z");
    Some(Shape::Simple(d))
}

fn convert_points(
    props: &Properties,
    tag: &str,
    ts: Option<&Transform>,
    diagnostics: &mut Diagnostics,
) -> Option<Shape> {
    let text = match props.get("points") {
        Some(Value::String(text)) => text,
        value => {
            let fields = [("points", value.cloned())];
            diagnostics.error(format!("Invalid <{}> properties: {}.", tag, to_json(&fields)));
            return None;
        }
    };

    let points = match parse_points(text) {
        Some(points) => points,
        None => {
            diagnostics.error(format!(
                "Unable to parse points string: \"{}\" in <{}>.",
                text, tag
            ));
            return None;
        }
    };

    let mut d = String::new();
    for (i, (x, y)) in points.into_iter().enumerate() {
        if i == 0 {
            move_to(&mut d, ts, x, y);
        } else {
            line_to(&mut d, ts, x, y);
        }
    }

    if tag == "polygon" {
        d.push_str(" z");
    }

    Some(Shape::Simple(d))
}

// Points are separated by single spaces. Coordinates are separated by a comma,
// or by a space when there is no comma.
fn parse_points(text: &str) -> Option<Vec<(f64, f64)>> {
    let mut tokens = text.trim().split(' ').collect::<std::collections::VecDeque<_>>();
    let mut points = Vec::new();
    while let Some(token) = tokens.pop_front() {
        let mut point: Vec<&str> = token.split(',').collect();
        if point.len() == 1 && tokens.len() % 2 == 1 {
            point.extend(tokens.pop_front());
        }

        if point.len() != 2 {
            return None;
        }

        let x = parse_float(point[0]);
        let y = parse_float(point[1]);
        if x.is_nan() || y.is_nan() {
            return None;
        }

        points.push((x, y));
    }

    Some(points)
}

fn convert_circle(
    props: &Properties,
    opt: &Options,
    ts: Option<&Transform>,
    diagnostics: &mut Diagnostics,
) -> Option<Shape> {
    let fields = defaults(props, &["cx", "cy", "r"]);
    let coords = numbers(&fields, |i| i == 2);
    match coords.as_deref() {
        Some(&[cx, cy, r]) => Some(Shape::Parsed(ellipse_to_path(cx, cy, r, r, opt, ts))),
        _ => {
            diagnostics.error(format!("Invalid <circle> properties: {}.", to_json(&fields)));
            None
        }
    }
}

fn convert_ellipse(
    props: &Properties,
    opt: &Options,
    ts: Option<&Transform>,
    diagnostics: &mut Diagnostics,
) -> Option<Shape> {
    let fields = defaults(props, &["cx", "cy", "rx", "ry"]);
    let coords = numbers(&fields, |i| i >= 2);
    match coords.as_deref() {
        Some(&[cx, cy, rx, ry]) => Some(Shape::Parsed(ellipse_to_path(cx, cy, rx, ry, opt, ts))),
        _ => {
            diagnostics.error(format!("Invalid <ellipse> properties: {}.", to_json(&fields)));
            None
        }
    }
}

// Two half-ellipse arcs, starting at the leftmost point.
fn ellipse_to_path(
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    opt: &Options,
    ts: Option<&Transform>,
) -> PathData {
    let arc = |dx: f64| PathSegment::EllipticalArc {
        abs: false,
        rx,
        ry,
        x_axis_rotation: 0.0,
        large_arc: true,
        sweep: false,
        x: dx,
        y: 0.0,
    };

    let path = PathData::from(vec![
        PathSegment::MoveTo {
            abs: true,
            x: cx - rx,
            y: cy,
        },
        arc(rx * 2.0),
        arc(-rx * 2.0),
    ]);

    finish(path.abs(), opt, ts)
}

fn convert_path(
    props: &Properties,
    opt: &Options,
    ts: Option<&Transform>,
    diagnostics: &mut Diagnostics,
) -> Option<Shape> {
    let fields = [("d", props.get("d").cloned())];
    let text = match props.get("d") {
        Some(Value::String(text)) => text,
        _ => {
            diagnostics.error(format!("Invalid <path> properties: {}.", to_json(&fields)));
            return None;
        }
    };

    match text.parse::<PathData>() {
        Ok(path) => Some(Shape::Parsed(finish(path.abs().unshort(), opt, ts))),
        Err(e) => {
            diagnostics.error(format!(
                "Problem parsing <path> {} with {}.",
                to_json(&fields),
                e
            ));
            None
        }
    }
}

fn finish(path: PathData, opt: &Options, ts: Option<&Transform>) -> PathData {
    let path = if opt.preserve_arcs { path } else { path.unarc() };
    match ts {
        Some(ts) => path.matrix(ts),
        None => path,
    }
}

// Missing coordinates default to zero.
fn defaults(props: &Properties, keys: &[&'static str]) -> Vec<(&'static str, Option<Value>)> {
    keys.iter()
        .map(|key| {
            let value = props.get(key).cloned().unwrap_or(Value::Number(0.0));
            (*key, Some(value))
        })
        .collect()
}

// Returns `None` when any field is not a number,
// or when a field for which `non_negative(idx)` holds is negative.
fn numbers(
    fields: &[(&str, Option<Value>)],
    non_negative: impl Fn(usize) -> bool,
) -> Option<Vec<f64>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, (_, value))| {
            let n = value.as_ref()?.as_number()?;
            if non_negative(i) && n < 0.0 {
                None
            } else {
                Some(n)
            }
        })
        .collect()
}

fn to_json(fields: &[(&str, Option<Value>)]) -> String {
    let fields: Vec<_> = fields.iter().map(|(k, v)| (*k, v.as_ref())).collect();
    json_object(&fields)
}

fn move_to(d: &mut String, ts: Option<&Transform>, x: f64, y: f64) {
    let (x, y) = apply(ts, x, y);
    d.push_str(&format!("M{},{}", Num(x), Num(y)));
}

fn line_to(d: &mut String, ts: Option<&Transform>, x: f64, y: f64) {
    let (x, y) = apply(ts, x, y);
    d.push_str(&format!(" L{},{}", Num(x), Num(y)));
}

fn apply(ts: Option<&Transform>, x: f64, y: f64) -> (f64, f64) {
    match ts {
        Some(ts) => ts.apply(x, y),
        None => (x, y),
    }
}
