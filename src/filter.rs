// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cell::RefCell;

use flatpath::Num;

use crate::cascade::FlatElement;
use crate::color::Rgba;
use crate::error::Error;
use crate::segments::FlatSegment;
use crate::shapes::FlatPath;
use crate::value::{json_number, json_string, parse_float, Properties, Value};

/// A filter value.
#[derive(Clone, PartialEq, Debug)]
pub enum FilterValue {
    /// A number.
    Number(f64),
    /// A string, like a color.
    String(String),
    /// A list of numbers, like a dash array.
    List(Vec<f64>),
}

impl FilterValue {
    fn type_name(&self) -> &'static str {
        match *self {
            FilterValue::Number(_) => "number",
            FilterValue::String(_) => "string",
            FilterValue::List(_) => "object",
        }
    }

    fn to_json(&self) -> String {
        match *self {
            FilterValue::Number(n) => json_number(n),
            FilterValue::String(ref s) => json_string(s),
            FilterValue::List(ref list) => list_to_json(list),
        }
    }
}

impl From<f64> for FilterValue {
    #[inline]
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<&str> for FilterValue {
    #[inline]
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<Vec<f64>> for FilterValue {
    #[inline]
    fn from(list: Vec<f64>) -> Self {
        FilterValue::List(list)
    }
}

impl From<&Value> for FilterValue {
    fn from(value: &Value) -> Self {
        match *value {
            Value::Number(n) => FilterValue::Number(n),
            Value::String(ref s) => FilterValue::String(s.clone()),
        }
    }
}

/// A style predicate.
///
/// # Keys
///
/// - `fill`, `stroke` and `color` compare colors using a perceived
///   color difference in the 0..1 range.
///   Subject's `opacity` is multiplied into its color alpha.
/// - `opacity` compares the stroke color alpha.
/// - `stroke-dasharray` compares dash arrays. Odd-length arrays are repeated,
///   so `[6]` and `[6, 6]` are equal.
/// - Any other key compares plain numbers.
#[derive(Clone, PartialEq, Debug)]
pub struct PropertiesFilter {
    /// A property name.
    pub key: String,
    /// An expected value.
    pub value: FilterValue,
    /// A maximum allowed difference.
    ///
    /// Default: 0
    pub tolerance: f64,
}

impl PropertiesFilter {
    /// Creates a new filter with zero tolerance.
    pub fn new(key: &str, value: impl Into<FilterValue>) -> Self {
        PropertiesFilter {
            key: key.to_string(),
            value: value.into(),
            tolerance: 0.0,
        }
    }

    /// Sets the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Per-object values derived while filtering.
#[derive(Clone, Default, Debug)]
pub(crate) struct ComputedProperties {
    fill: Option<Rgba>,
    stroke: Option<Rgba>,
    color: Option<Rgba>,
    dash_array: Option<Vec<f64>>,
}

impl ComputedProperties {
    fn color_mut(&mut self, key: &str) -> &mut Option<Rgba> {
        match key {
            "fill" => &mut self.fill,
            "color" => &mut self.color,
            _ => &mut self.stroke,
        }
    }
}

/// An object with style properties.
pub(crate) trait Styled {
    fn properties(&self) -> &Properties;
}

impl Styled for FlatElement {
    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Styled for FlatPath {
    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Styled for FlatSegment {
    fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// A filter with a preprocessed value.
enum Predicate<'a> {
    Color { key: &'a str, color: Rgba },
    Opacity(Option<f64>),
    DashArray(Vec<f64>),
    Number { key: &'a str, value: f64 },
}

/// Returns objects that match all filters.
///
/// `cache` holds values computed for `objects` and must not be shared
/// between different lists. Objects marked in `exclude` never match.
pub(crate) fn filter_by_style<'a, T: Styled>(
    objects: &'a [T],
    filters: &[PropertiesFilter],
    cache: &RefCell<Vec<ComputedProperties>>,
    exclude: Option<&[bool]>,
) -> Result<Vec<&'a T>, Error> {
    let predicates = filters
        .iter()
        .map(prepare)
        .collect::<Result<Vec<_>, Error>>()?;

    let mut cache = cache.borrow_mut();
    if cache.len() != objects.len() {
        cache.clear();
        cache.resize_with(objects.len(), ComputedProperties::default);
    }

    let mut matches = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        if exclude.and_then(|list| list.get(i)).copied().unwrap_or(false) {
            continue;
        }

        let mut passed = true;
        for (predicate, filter) in predicates.iter().zip(filters) {
            if !is_match(
                object.properties(),
                predicate,
                filter.tolerance,
                &mut cache[i],
            )? {
                passed = false;
                break;
            }
        }

        if passed {
            matches.push(object);
        }
    }

    Ok(matches)
}

fn prepare(filter: &PropertiesFilter) -> Result<Predicate, Error> {
    let key = filter.key.as_str();
    let predicate = match key {
        "fill" | "stroke" | "color" => {
            let color = match filter.value {
                FilterValue::String(ref s) => Rgba::parse(s).unwrap_or(Rgba::BLACK),
                _ => Rgba::BLACK,
            };

            Predicate::Color { key, color }
        }
        "opacity" => match filter.value {
            FilterValue::Number(n) => Predicate::Opacity(Some(n)),
            _ => Predicate::Opacity(None),
        },
        "stroke-dasharray" => Predicate::DashArray(convert_to_dash_array(Some(&filter.value))?),
        _ => match filter.value {
            FilterValue::Number(value) => Predicate::Number { key, value },
            ref value => {
                return Err(Error::InvalidFilter(format!(
                    "flat-svg cannot handle filters with key \"{}\" and value {} of type {}.",
                    key,
                    value.to_json(),
                    value.type_name()
                )));
            }
        },
    };

    Ok(predicate)
}

fn is_match(
    props: &Properties,
    predicate: &Predicate,
    tolerance: f64,
    computed: &mut ComputedProperties,
) -> Result<bool, Error> {
    let passed = match *predicate {
        Predicate::Color { key, ref color } => {
            let subject = computed_color(props, key, computed);
            subject.delta(color) <= tolerance
        }
        Predicate::Opacity(value) => {
            let subject = computed_color(props, "stroke", computed);
            match value {
                Some(value) => (subject.alpha - value).abs() <= tolerance,
                None => false,
            }
        }
        Predicate::DashArray(ref expected) => {
            if computed.dash_array.is_none() {
                let value = props.get("stroke-dasharray").map(FilterValue::from);
                computed.dash_array = Some(convert_to_dash_array(value.as_ref())?);
            }

            let subject = computed.dash_array.as_deref().unwrap_or_default();
            dash_arrays_match(subject, expected, tolerance)
        }
        Predicate::Number { key, value } => match props.get(key).and_then(strict_number) {
            Some(n) => (n - value).abs() <= tolerance,
            None => false,
        },
    };

    Ok(passed)
}

fn computed_color(props: &Properties, key: &str, computed: &mut ComputedProperties) -> Rgba {
    let slot = computed.color_mut(key);
    if let Some(color) = *slot {
        return color;
    }

    let mut color = Rgba::from_value(props.get(key));
    if let Some(opacity) = props.number("opacity") {
        color = color.with_alpha(opacity * color.alpha);
    }

    *slot = Some(color);
    color
}

fn dash_arrays_match(subject: &[f64], expected: &[f64], tolerance: f64) -> bool {
    let (subject, expected) = if subject.len() == expected.len() {
        (subject.to_vec(), expected.to_vec())
    } else if subject.len() == expected.len() * 2 {
        (subject.to_vec(), expected.repeat(2))
    } else if subject.len() * 2 == expected.len() {
        (subject.repeat(2), expected.to_vec())
    } else {
        return false;
    };

    subject
        .iter()
        .zip(&expected)
        .all(|(a, b)| (a - b).abs() <= tolerance)
}

/// Normalizes a `stroke-dasharray` value.
///
/// A missing or empty value is an empty array. Odd-length arrays are repeated.
pub(crate) fn convert_to_dash_array(value: Option<&FilterValue>) -> Result<Vec<f64>, Error> {
    let mut list = match value {
        None => Vec::new(),
        Some(FilterValue::String(s)) if s.is_empty() => Vec::new(),
        Some(&FilterValue::Number(n)) => {
            if !is_positive(n) {
                return Err(Error::InvalidDashArray(format!(
                    "Expected positive number for stroke-dasharray value, got {}.",
                    Num(n)
                )));
            }

            vec![n]
        }
        Some(FilterValue::String(s)) => {
            let mut list = Vec::new();
            for item in s.split(' ') {
                let n = parse_float(item);
                if !is_positive(n) {
                    return Err(Error::InvalidDashArray(format!(
                        "Expected positive number for stroke-dasharray value, \
                         got {} from string \"{}\".",
                        Num(n),
                        item
                    )));
                }

                list.push(n);
            }

            list
        }
        Some(FilterValue::List(items)) => {
            for n in items {
                if !is_positive(*n) {
                    return Err(Error::InvalidDashArray(format!(
                        "Expected positive number for stroke-dasharray value, \
                         got {} from array {}.",
                        Num(*n),
                        list_to_json(items)
                    )));
                }
            }

            items.clone()
        }
    };

    if list.len() % 2 == 1 {
        list = list.repeat(2);
    }

    Ok(list)
}

fn is_positive(n: f64) -> bool {
    n.is_finite() && n > 0.0
}

// Only plain numbers are accepted in strings.
fn strict_number(value: &Value) -> Option<f64> {
    match *value {
        Value::Number(n) => Some(n),
        Value::String(ref s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
    }
}

fn list_to_json(list: &[f64]) -> String {
    let items: Vec<_> = list.iter().map(|n| json_number(*n)).collect();
    format!("[{}]", items.join(","))
}
