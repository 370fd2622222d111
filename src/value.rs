// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use flatpath::Num;

/// A property value.
///
/// Attributes that look like plain numbers are stored as numbers,
/// everything else is kept as is.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    /// A finite number.
    Number(f64),
    /// A raw string.
    String(String),
}

impl Value {
    /// Creates a value from a raw XML attribute.
    ///
    /// Only strict decimal numbers, like `10`, `-.5` or `1e3`, are converted.
    pub(crate) fn from_attribute(text: &str) -> Self {
        if is_decimal(text.trim()) {
            if let Ok(n) = text.trim().parse::<f64>() {
                if n.is_finite() {
                    return Value::Number(n);
                }
            }
        }

        Value::String(text.to_string())
    }

    /// Creates a value from a CSS declaration.
    ///
    /// `px` suffixes are stripped. Short numbers are converted.
    pub(crate) fn from_css(text: &str) -> Self {
        let text = strip_px(text);
        if !text.is_empty() && is_css_number(&text) {
            let n = parse_float(&text);
            if !n.is_nan() {
                return Value::Number(n);
            }
        }

        Value::String(text)
    }

    /// Returns a number, if any.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Value::Number(n) => Some(n),
            Value::String(_) => None,
        }
    }

    /// Returns a string, if any.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Number(_) => None,
            Value::String(ref s) => Some(s),
        }
    }

    /// Returns the value type name as used in diagnostics.
    pub(crate) fn type_name(&self) -> &'static str {
        match *self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Formats the value as JSON.
    pub(crate) fn to_json(&self) -> String {
        match *self {
            Value::Number(n) => json_number(n),
            Value::String(ref s) => json_string(s),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Value::Number(n) => write!(f, "{}", Num(n)),
            Value::String(ref s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// An insertion-ordered properties map.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Properties {
    list: Vec<(String, Value)>,
}

impl Properties {
    /// Creates an empty map.
    #[inline]
    pub fn new() -> Self {
        Properties::default()
    }

    /// Returns a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.list.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a numeric value by key.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }

    /// Checks that the key is present.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets a value.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: &str, value: Value) {
        match self.list.iter_mut().find(|(k, _)| k == key) {
            Some(item) => item.1 = value,
            None => self.list.push((key.to_string(), value)),
        }
    }

    /// Removes a value by key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.list.iter().position(|(k, _)| k == key)?;
        Some(self.list.remove(idx).1)
    }

    /// Returns an iterator over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.list.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of properties.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Checks that there are no properties.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Parses a number prefix the way browsers' `parseFloat` does.
///
/// Leading whitespaces are skipped and trailing garbage is ignored.
/// Returns `NaN` when there is no number at all.
pub(crate) fn parse_float(text: &str) -> f64 {
    let s = text.trim_start().as_bytes();
    let mut i = 0;

    if i < s.len() && (s[i] == b'+' || s[i] == b'-') {
        i += 1;
    }

    if s[i..].starts_with(b"Infinity") {
        return if s[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = i;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
    }

    let mut has_digits = i > digits_start;
    if i < s.len() && s[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }

        if j > frac_start || has_digits {
            has_digits = has_digits || j > frac_start;
            i = j;
        }
    }

    if !has_digits {
        return f64::NAN;
    }

    // An exponent counts only when it has digits.
    if i < s.len() && (s[i] == b'e' || s[i] == b'E') {
        let mut j = i + 1;
        if j < s.len() && (s[j] == b'+' || s[j] == b'-') {
            j += 1;
        }

        let exp_start = j;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }

        if j > exp_start {
            i = j;
        }
    }

    let prefix = &s[..i];
    std::str::from_utf8(prefix)
        .ok()
        .and_then(|s| s.trim_end_matches('.').parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Formats a number as JSON. Non-finite numbers become `null`.
pub(crate) fn json_number(n: f64) -> String {
    if n.is_finite() {
        Num(n).to_string()
    } else {
        "null".to_string()
    }
}

/// Formats a string as a JSON string literal.
pub(crate) fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}

/// Formats a list of fields as a JSON object.
///
/// Missing fields are omitted.
pub(crate) fn json_object(fields: &[(&str, Option<&Value>)]) -> String {
    let mut out = String::from("{");
    for (name, value) in fields {
        let value = match value {
            Some(v) => v,
            None => continue,
        };

        if out.len() > 1 {
            out.push(',');
        }

        out.push_str(&json_string(name));
        out.push(':');
        out.push_str(&value.to_json());
    }
    out.push('}');
    out
}

// sign? (digits (. digits?)? | . digits) (e sign? digits)?
fn is_decimal(text: &str) -> bool {
    let s = text.as_bytes();
    let mut i = 0;

    if i < s.len() && (s[i] == b'+' || s[i] == b'-') {
        i += 1;
    }

    let int_start = i;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < s.len() && s[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < s.len() && (s[i] == b'e' || s[i] == b'E') {
        i += 1;
        if i < s.len() && (s[i] == b'+' || s[i] == b'-') {
            i += 1;
        }

        let exp_start = i;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }

        if i == exp_start {
            return false;
        }
    }

    i == s.len()
}

// -?[0-9]?([0-9]+e-?[0-9]+)?(\.[0-9]+)?
fn is_css_number(text: &str) -> bool {
    let s = text.as_bytes();
    let digits_at = |mut i: usize| {
        let start = i;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        (i, i - start)
    };

    // Matches a `\.[0-9]+` tail at `i` up to the end.
    let fraction_tail = |i: usize| {
        if i == s.len() {
            return true;
        }

        if s[i] != b'.' {
            return false;
        }

        let (end, n) = digits_at(i + 1);
        n > 0 && end == s.len()
    };

    // Matches `[0-9]+e-?[0-9]+` followed by a fraction tail.
    let exponent_tail = |i: usize| {
        let (mut j, n) = digits_at(i);
        if n == 0 || j >= s.len() || s[j] != b'e' {
            return false;
        }

        j += 1;
        if j < s.len() && s[j] == b'-' {
            j += 1;
        }

        let (j, n) = digits_at(j);
        n > 0 && fraction_tail(j)
    };

    let mut i = 0;
    if i < s.len() && s[i] == b'-' {
        i += 1;
    }

    let tails = |i: usize| fraction_tail(i) || exponent_tail(i);

    // The optional single digit may be taken or skipped.
    if i < s.len() && s[i].is_ascii_digit() && tails(i + 1) {
        return true;
    }

    tails(i)
}

// Removes `px` units, like `10px` or `1px 2px`.
fn strip_px(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("px") {
        let after = &rest[idx + 2..];
        let is_boundary = after
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));

        out.push_str(&rest[..idx]);
        if !is_boundary {
            out.push_str("px");
        }

        rest = after;
    }

    out.push_str(rest);
    out
}
