// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::Write;

use flatpath::Num;
use xmlwriter::XmlWriter;

use crate::cascade::FlatElement;
use crate::segments::{FlatSegment, Segment};
use crate::shapes::FlatPath;
use crate::tree::Node;
use crate::value::Properties;

pub(crate) fn write_elements<'a, I>(root: &Node, elements: I) -> String
where
    I: IntoIterator<Item = &'a FlatElement>,
{
    let mut xml = start_document(root);
    for element in elements {
        xml.start_element(&element.tag_name);
        xml.write_properties(&element.properties);
        if let Some(ts) = element.transform {
            xml.write_attribute("transform", &ts);
        }
        xml.end_element();
    }

    xml.end_document()
}

pub(crate) fn write_paths<'a, I>(root: &Node, paths: I) -> String
where
    I: IntoIterator<Item = &'a FlatPath>,
{
    let mut xml = start_document(root);
    for path in paths {
        xml.start_element("path");
        xml.write_properties(&path.properties);
        xml.end_element();
    }

    xml.end_document()
}

pub(crate) fn write_segments<'a, I>(root: &Node, segments: I) -> String
where
    I: IntoIterator<Item = &'a FlatSegment>,
{
    let mut xml = start_document(root);
    for segment in segments {
        match segment.segment {
            Segment::Line { p1, p2 } => {
                xml.start_element("line");
                xml.write_number("x1", p1.x);
                xml.write_number("y1", p1.y);
                xml.write_number("x2", p2.x);
                xml.write_number("y2", p2.y);
            }
            Segment::Bezier {
                p1,
                p2,
                ref control_points,
            } => {
                let cmd = if control_points.len() == 1 { 'Q' } else { 'C' };
                let mut d = format!("M {} {} {} ", Num(p1.x), Num(p1.y), cmd);
                for p in control_points {
                    let _ = write!(d, "{} {} ", Num(p.x), Num(p.y));
                }
                let _ = write!(d, "{} {} ", Num(p2.x), Num(p2.y));

                xml.start_element("path");
                xml.write_attribute("d", &d);
            }
            Segment::Arc {
                p1,
                p2,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
            } => {
                let d = format!(
                    "M {} {} A {} {} {} {} {} {} {}",
                    Num(p1.x),
                    Num(p1.y),
                    Num(rx),
                    Num(ry),
                    Num(x_axis_rotation),
                    large_arc as u8,
                    sweep as u8,
                    Num(p2.x),
                    Num(p2.y)
                );

                xml.start_element("path");
                xml.write_attribute("d", &d);
            }
        }

        xml.write_properties(&segment.properties);
        xml.end_element();
    }

    xml.end_document()
}

fn start_document(root: &Node) -> XmlWriter {
    let mut xml = XmlWriter::new(xmlwriter::Options {
        use_single_quote: false,
        indent: xmlwriter::Indent::Spaces(0),
        attributes_indent: xmlwriter::Indent::None,
    });

    xml.start_element("svg");
    xml.write_properties(root.attributes());
    xml
}

trait XmlWriterExt {
    fn write_properties(&mut self, props: &Properties);
    fn write_number(&mut self, name: &str, n: f64);
}

impl XmlWriterExt for XmlWriter {
    fn write_properties(&mut self, props: &Properties) {
        for (name, value) in props.iter() {
            self.write_attribute(name, value);
        }
    }

    #[inline(never)]
    fn write_number(&mut self, name: &str, n: f64) {
        self.write_attribute(name, &Num(n));
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::Point;
    use crate::tree::Document;
    use crate::value::Value;
    use flatpath::Transform;

    fn root() -> Node {
        Document::parse("<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 10 10'/>").unwrap().root
    }

    fn props(list: &[(&str, Value)]) -> Properties {
        let mut props = Properties::new();
        for (k, v) in list {
            props.insert(k, v.clone());
        }
        props
    }

    #[test]
    fn elements() {
        let elements = [FlatElement {
            tag_name: "rect".to_string(),
            properties: props(&[("width", Value::Number(5.0)), ("fill", Value::from("red"))]),
            transform: Some(Transform::new_translate(1.0, 2.0)),
        }];

        assert_eq!(write_elements(&root(), &elements).trim_end(),
"<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 10 10\">
<rect width=\"5\" fill=\"red\" transform=\"matrix(1 0 0 1 1 2)\"/>
</svg>");
    }

    #[test]
    fn paths() {
        let paths = [FlatPath { properties: props(&[("d", Value::from("M0,0 L1,1"))]) }];
        assert_eq!(write_paths(&root(), &paths).trim_end(),
"<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 10 10\">
<path d=\"M0,0 L1,1\"/>
</svg>");
    }

    #[test]
    fn segments() {
        let p = Point::new;
        let stroke = props(&[("stroke", Value::from("red"))]);
        let segments = [
            FlatSegment { segment: Segment::Line { p1: p(0.0, 0.0), p2: p(1.5, 0.0) }, properties: stroke.clone() },
            FlatSegment {
                segment: Segment::Bezier { p1: p(0.0, 0.0), p2: p(2.0, 0.0), control_points: vec![p(1.0, 1.0)] },
                properties: stroke.clone(),
            },
            FlatSegment {
                segment: Segment::Arc {
                    p1: p(0.0, 0.0), p2: p(10.0, 0.0), rx: 5.0, ry: 5.0,
                    x_axis_rotation: 0.0, large_arc: false, sweep: true,
                },
                properties: stroke,
            },
        ];

        assert_eq!(write_segments(&root(), &segments).trim_end(),
"<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 10 10\">
<line x1=\"0\" y1=\"0\" x2=\"1.5\" y2=\"0\" stroke=\"red\"/>
<path d=\"M 0 0 Q 1 1 2 0 \" stroke=\"red\"/>
<path d=\"M 0 0 A 5 5 0 0 1 10 0\" stroke=\"red\"/>
</svg>");
    }
}
