// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::css;
use crate::error::{Diagnostics, Error};
use crate::value::{Properties, Value};

const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// An owned SVG element.
///
/// Only elements are kept. Text is preserved only for the `style` elements.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    tag_name: String,
    attributes: Properties,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    /// Returns the element's local name.
    #[inline]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Returns attributes in the source order.
    #[inline]
    pub fn attributes(&self) -> &Properties {
        &self.attributes
    }

    /// Returns an attribute value.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns child elements.
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the element's text content.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// A parsed document with global styles and `defs` pulled out.
#[derive(Debug)]
pub(crate) struct Document {
    pub root: Node,
    pub defs: Vec<Node>,
    pub css: String,
    pub diagnostics: Diagnostics,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Err(Error::EmptyString);
        }

        let opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let xml = roxmltree::Document::parse_with_options(text, opt)?;

        let svg = xml.root_element();
        if svg.tag_name().name() != "svg" {
            return Err(Error::MalformedSvg);
        }

        let mut root = convert_root(svg);
        let children = std::mem::take(&mut root.children);
        let mut doc = Document {
            root,
            defs: Vec::new(),
            css: String::new(),
            diagnostics: Diagnostics::default(),
        };

        for mut child in children {
            match child.tag_name.as_str() {
                "style" => {
                    collect_style(&child, &mut doc.css, &mut doc.diagnostics);
                }
                "defs" => {
                    child.children.retain(|c| {
                        if c.tag_name == "style" {
                            collect_style(c, &mut doc.css, &mut doc.diagnostics);
                            false
                        } else {
                            true
                        }
                    });

                    doc.defs.push(child);
                }
                _ => doc.root.children.push(child),
            }
        }

        if !doc.css.is_empty() {
            log::debug!("Collected {} bytes of global CSS.", doc.css.len());
        }

        Ok(doc)
    }
}

fn collect_style(node: &Node, css: &mut String, diagnostics: &mut Diagnostics) {
    if let Some(text) = node.text() {
        css::check_style_sheet(text, diagnostics);
        css.push_str(text);
        css.push('\n');
    }
}

fn convert_root(svg: roxmltree::Node) -> Node {
    let mut node = convert_element(svg);

    // Namespace declarations are not attributes in roxmltree,
    // but they must survive a round trip.
    let mut attributes = Properties::new();
    for ns in svg.namespaces() {
        let name = match ns.name() {
            Some("xml") => continue,
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };

        attributes.insert(&name, Value::String(ns.uri().to_string()));
    }

    for (name, value) in node.attributes.iter() {
        attributes.insert(name, value.clone());
    }

    node.attributes = attributes;
    node
}

fn convert_element(xml_node: roxmltree::Node) -> Node {
    let mut attributes = Properties::new();
    for attr in xml_node.attributes() {
        let prefix = match attr.namespace() {
            Some(XML_NAMESPACE_NS) => Some("xml"),
            Some(ns) => xml_node.lookup_prefix(ns),
            None => None,
        };

        let value = Value::from_attribute(attr.value());
        match prefix {
            Some(prefix) => attributes.insert(&format!("{}:{}", prefix, attr.name()), value),
            None => attributes.insert(attr.name(), value),
        }
    }

    let children = xml_node
        .children()
        .filter(|n| n.is_element())
        .map(convert_element)
        .collect();

    Node {
        tag_name: xml_node.tag_name().name().to_string(),
        attributes,
        children,
        text: xml_node.text().map(str::to_string),
    }
}
