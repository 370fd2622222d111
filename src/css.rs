// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::error::Diagnostics;
use crate::value::{Properties, Value};

/// Global style rules.
///
/// Rules are matched against a single `id` or `class` token at a time,
/// so only id, class and universal selectors can match.
pub(crate) struct StyleSheet<'a> {
    sheet: simplecss::StyleSheet<'a>,
}

impl<'a> StyleSheet<'a> {
    pub fn parse(text: &'a str) -> Self {
        StyleSheet {
            sheet: simplecss::StyleSheet::parse(text),
        }
    }

    /// Writes declarations of rules matching `#token` into `props`.
    pub fn apply_id(&self, token: &str, props: &mut Properties) {
        self.apply(Token::Id(token), props);
    }

    /// Writes declarations of rules matching `.token` into `props`.
    pub fn apply_class(&self, token: &str, props: &mut Properties) {
        self.apply(Token::Class(token), props);
    }

    fn apply(&self, token: Token, props: &mut Properties) {
        for rule in &self.sheet.rules {
            if rule.selector.matches(&token) {
                for declaration in &rule.declarations {
                    props.insert(declaration.name, Value::from_css(declaration.value));
                }
            }
        }
    }
}

/// Parses an inline `style` attribute.
pub(crate) fn parse_declarations(text: &str, diagnostics: &mut Diagnostics) -> Properties {
    let mut props = Properties::new();

    // The tokenizer stops at the first malformed declaration,
    // so each one is tokenized separately.
    for item in text.split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        if !item.contains(':') {
            diagnostics.error(format!("Malformed CSS: property missing ':' in \"{}\".", item));
            continue;
        }

        for declaration in simplecss::DeclarationTokenizer::from(item) {
            props.insert(declaration.name, Value::from_css(declaration.value));
        }
    }

    props
}

/// Checks that braces in a style sheet are balanced.
pub(crate) fn check_style_sheet(text: &str, diagnostics: &mut Diagnostics) {
    let mut depth = 0i32;
    let mut quote = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }

            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }

                    prev = c;
                }
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    diagnostics.error("Malformed CSS: unexpected '}'.".to_string());
                    depth = 0;
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        diagnostics.error("Malformed CSS: missing '}'.".to_string());
    }
}

/// A fake element that has only an `id` or a `class` attribute.
#[derive(Clone, Copy)]
enum Token<'a> {
    Id(&'a str),
    Class(&'a str),
}

impl simplecss::Element for Token<'_> {
    fn parent_element(&self) -> Option<Self> {
        None
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        None
    }

    fn has_local_name(&self, _: &str) -> bool {
        false
    }

    fn attribute_matches(&self, local_name: &str, operator: simplecss::AttributeOperator) -> bool {
        match (*self, local_name) {
            (Token::Id(value), "id") | (Token::Class(value), "class") => operator.matches(value),
            _ => false,
        }
    }

    fn pseudo_class_matches(&self, _: simplecss::PseudoClass) -> bool {
        false
    }
}
