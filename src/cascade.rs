// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use flatpath::Transform;

use crate::css::{self, StyleSheet};
use crate::error::Diagnostics;
use crate::transform::parse_transform;
use crate::tree::Node;
use crate::value::{Properties, Value};

/// A geometry element with a resolved style and transform.
#[derive(Clone, PartialEq, Debug)]
pub struct FlatElement {
    /// Element's tag name.
    pub tag_name: String,
    /// Own and inherited properties.
    ///
    /// Accumulated ids and classes are stored under the `ids` and `class` keys.
    pub properties: Properties,
    /// Accumulated transform.
    ///
    /// `None` when neither the element nor its ancestors have one.
    pub transform: Option<Transform>,
}

/// A state inherited from ancestors.
#[derive(Clone, Default)]
struct Context {
    transform: Option<Transform>,
    ids: String,
    classes: String,
    properties: Properties,
}

/// Flattens children of the root element.
///
/// Groups are not emitted, but pass their state down to their children.
pub(crate) fn resolve(root: &Node, css: &str) -> (Vec<FlatElement>, Diagnostics) {
    let sheet = StyleSheet::parse(css);
    let mut elements = Vec::new();
    let mut diagnostics = Diagnostics::default();
    resolve_children(
        root,
        &Context::default(),
        &sheet,
        &mut elements,
        &mut diagnostics,
    );

    (elements, diagnostics)
}

fn resolve_children(
    parent: &Node,
    ctx: &Context,
    sheet: &StyleSheet,
    elements: &mut Vec<FlatElement>,
    diagnostics: &mut Diagnostics,
) {
    for node in parent.children() {
        let ctx = resolve_node(node, ctx, sheet, diagnostics);

        if node.tag_name() != "g" {
            let mut properties = ctx.properties.clone();
            if !ctx.ids.is_empty() {
                properties.insert("ids", Value::String(ctx.ids.clone()));
            }
            if !ctx.classes.is_empty() {
                properties.insert("class", Value::String(ctx.classes.clone()));
            }

            elements.push(FlatElement {
                tag_name: node.tag_name().to_string(),
                properties,
                transform: ctx.transform,
            });
        }

        resolve_children(node, &ctx, sheet, elements, diagnostics);
    }
}

fn resolve_node(
    node: &Node,
    parent: &Context,
    sheet: &StyleSheet,
    diagnostics: &mut Diagnostics,
) -> Context {
    let mut own = Properties::new();
    for (name, value) in node.attributes().iter() {
        if !matches!(name, "transform" | "id" | "class" | "style") {
            own.insert(name, value.clone());
        }
    }

    let mut transform = parent.transform;
    if let Some(value) = node.attribute("transform") {
        let parsed = parse_transform(&value.to_string(), Some(node.tag_name()));
        for item in &parsed {
            for msg in &item.errors {
                diagnostics.error(msg.clone());
            }
            for msg in &item.warnings {
                diagnostics.warn(msg.clone());
            }
        }

        if !parsed.is_empty() {
            let list: Vec<Transform> = parent
                .transform
                .into_iter()
                .chain(parsed.iter().map(|p| p.transform))
                .collect();
            transform = Some(Transform::flatten(&list));
        }
    }

    let mut ids = parent.ids.clone();
    if let Some(value) = node.attribute("id") {
        let value = value.to_string();
        for token in value.split(' ') {
            sheet.apply_id(token, &mut own);
        }
        append_token(&mut ids, &value);
    }

    let mut classes = parent.classes.clone();
    if let Some(value) = node.attribute("class") {
        let value = value.to_string();
        for token in value.split(' ') {
            sheet.apply_class(token, &mut own);
        }
        append_token(&mut classes, &value);
    }

    if let Some(value) = node.attribute("style") {
        let inline = css::parse_declarations(&value.to_string(), diagnostics);
        for (name, value) in inline.iter() {
            own.insert(name, value.clone());
        }
    }

    let mut properties = parent.properties.clone();
    for (name, value) in own.iter() {
        if name == "opacity" {
            match value.as_number() {
                Some(n) => {
                    let inherited = properties.number("opacity").unwrap_or(1.0);
                    properties.insert(name, Value::Number(n * inherited));
                }
                None => {
                    diagnostics.error(format!("Opacity is not number: \"{}\".", value.to_json()));
                }
            }
        } else {
            properties.insert(name, value.clone());
        }
    }

    Context {
        transform,
        ids,
        classes,
        properties,
    }
}

fn append_token(list: &mut String, value: &str) {
    if value.is_empty() {
        return;
    }

    if !list.is_empty() {
        list.push(' ');
    }
    list.push_str(value);
}
