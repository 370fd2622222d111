use float_cmp::approx_eq;

use flatsvg::{FlatSvg, Options, Point, Segment, Value};

fn parse(text: &str) -> FlatSvg {
    FlatSvg::from_str(text).unwrap()
}

fn assert_point(p: Point, x: f64, y: f64) {
    assert!(approx_eq!(f64, p.x, x, epsilon = 1e-9), "{:?} != ({}, {})", p, x, y);
    assert!(approx_eq!(f64, p.y, y, epsilon = 1e-9), "{:?} != ({}, {})", p, x, y);
}

#[test]
fn rect_round_trip() {
    let svg = parse(
        "<svg viewBox=\"0 0 10 10\"><rect x=\"0\" y=\"0\" width=\"10\" height=\"10\" fill=\"red\"/></svg>",
    );

    assert_eq!(svg.elements().len(), 1);
    assert_eq!(svg.paths()[0].d(), "M0,0 L10,0 L10,10 L0,10 z");
    assert_eq!(svg.segments().len(), 4);
    assert!(svg.errors().is_empty());
    assert!(svg.warnings().is_empty());
    assert_eq!(svg.view_box(), [0.0, 0.0, 10.0, 10.0]);
    assert_eq!(svg.units(), "px");
}

#[test]
fn invalid_circle_is_skipped() {
    let svg = parse("<svg><circle cx=\"0\" cy=\"NaN\" r=\"5\"/></svg>");

    assert_eq!(svg.elements().len(), 1);
    assert_eq!(svg.paths().len(), 0);
    let errors = svg.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Invalid <circle> properties"), "{}", errors[0]);
}

#[test]
fn nested_opacity_is_multiplied() {
    let svg = parse(
        "<svg>\
            <g opacity=\"0.5\"><g opacity=\"0.5\">\
                <rect width=\"1\" height=\"1\" opacity=\"0.5\"/>\
            </g></g>\
        </svg>",
    );

    let opacity = svg.elements()[0].properties.number("opacity").unwrap();
    assert!(approx_eq!(f64, opacity, 0.125));
}

#[test]
fn transform_chain_order() {
    let line = "<line x1=\"0\" y1=\"0\" x2=\"1\" y2=\"0\"/>";

    let svg = parse(&format!("<svg><g transform=\"translate(10,0) scale(2)\">{}</g></svg>", line));
    assert_point(svg.segments()[0].segment.p1(), 10.0, 0.0);
    assert_point(svg.segments()[0].segment.p2(), 12.0, 0.0);

    let svg = parse(&format!("<svg><g transform=\"scale(2) translate(10,0)\">{}</g></svg>", line));
    assert_point(svg.segments()[0].segment.p1(), 20.0, 0.0);
    assert_point(svg.segments()[0].segment.p2(), 22.0, 0.0);
}

#[test]
fn nested_transforms_are_merged() {
    let svg = parse(
        "<svg><g transform=\"translate(5,5)\"><g transform=\"rotate(90)\">\
            <rect width=\"2\" height=\"1\"/>\
        </g></g></svg>",
    );

    let ts = svg.elements()[0].transform.unwrap();
    let (x, y) = ts.apply(2.0, 0.0);
    assert!(approx_eq!(f64, x, 5.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, y, 7.0, epsilon = 1e-9));
}

#[test]
fn segments_are_continuous() {
    let svg = parse(
        "<svg><path d=\"M0,0 L10,0 Q15,5 10,10 C5,15 0,15 0,10 A5,5 0 0,1 -5,5 h-3 v-3 z\"/></svg>",
    );

    let segments = svg.segments();
    assert!(segments.len() > 6);
    for pair in segments.windows(2) {
        assert_eq!(pair[0].segment.p2(), pair[1].segment.p1());
    }

    assert_point(segments[0].segment.p1(), 0.0, 0.0);
    assert_point(segments[segments.len() - 1].segment.p2(), 0.0, 0.0);
}

#[test]
fn closing_at_start_adds_nothing() {
    let svg = parse("<svg><path d=\"M0,0 L10,0 L10,10 L0,0 Z\"/><polygon points=\"0,0 5,0 5,5\"/></svg>");

    // A polygon is closed by `z` from its last point.
    assert_eq!(svg.segments().len(), 6);
    for s in svg.segments() {
        assert_ne!(s.segment.p1(), s.segment.p2());
    }
}

#[test]
fn arc_is_mirrored() {
    let opt = Options { preserve_arcs: true };
    let svg = FlatSvg::from_str_with_options(
        "<svg><g transform=\"scale(-1,1)\"><path d=\"M0,0 A5,5 0 0,1 10,0\"/></g></svg>",
        &opt,
    )
    .unwrap();

    match svg.segments()[0].segment {
        Segment::Arc { p2, sweep, large_arc, .. } => {
            assert_point(p2, -10.0, 0.0);
            assert!(!sweep);
            assert!(!large_arc);
        }
        ref s => panic!("expected an arc, got {:?}", s),
    }
}

#[test]
fn arcs_become_curves_by_default() {
    let svg = parse("<svg><ellipse cx=\"5\" cy=\"5\" rx=\"5\" ry=\"2\"/></svg>");
    assert!(!svg.paths()[0].d().contains('A'));
    assert!(svg
        .segments()
        .iter()
        .all(|s| matches!(s.segment, Segment::Bezier { ref control_points, .. } if control_points.len() == 2)));
}

#[test]
fn css_is_applied() {
    let svg = parse(
        "<svg>\
            <style>.a { stroke: blue; stroke-width: 2px } #b { fill: green }</style>\
            <rect class=\"a\" id=\"b\" width=\"1\" height=\"1\" fill=\"red\" style=\"stroke-width: 3\"/>\
        </svg>",
    );

    let props = &svg.elements()[0].properties;
    assert_eq!(props.get("stroke"), Some(&Value::from("blue")));
    assert_eq!(props.get("fill"), Some(&Value::from("green")));
    assert_eq!(props.number("stroke-width"), Some(3.0));
}

#[test]
fn unsupported_elements_are_reported() {
    let svg = parse("<svg><text>Hello</text><rect width=\"1\" height=\"1\"/></svg>");
    assert_eq!(svg.elements().len(), 2);
    assert_eq!(svg.paths().len(), 1);
    assert_eq!(svg.warnings(), ["Unsupported tagname: \"text\"."]);
}

#[test]
fn segments_as_svg() {
    let svg = parse(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\"><line x1=\"0\" y1=\"0\" x2=\"5\" y2=\"0\" stroke=\"red\"/></svg>",
    );

    assert_eq!(
        svg.segments_as_svg().trim_end(),
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\">\n\
         <line x1=\"0\" y1=\"0\" x2=\"5\" y2=\"0\" stroke=\"red\"/>\n\
         </svg>"
    );
}
