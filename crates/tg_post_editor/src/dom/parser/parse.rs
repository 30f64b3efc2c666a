// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{PaDom, PaDomCreator, PaDomNode, PaNodeContainer};
use crate::dom::dom_creation_error::HtmlParseError;
use crate::dom::nodes::{
    ContainerNode, DomNode, EmojiKind, EmojiNode, LinkAttributes,
};
use crate::dom::registry::{emoji_id_attribute, role_for_tag, NodeRole};
use crate::dom::Dom;
use crate::EntityType;

/// Parse editor html into a normalized [Dom].
///
/// Markup html5ever reports errors for is still converted; the result is
/// then returned inside the error.
pub fn parse(html: &str) -> Result<Dom, HtmlParseError> {
    HtmlParser::default().parse(html)
}

/// Parse html the way a browser would: whatever the markup, a document
/// comes out.
pub fn parse_lenient(html: &str) -> Dom {
    parse(html).unwrap_or_else(|err| {
        tracing::debug!(
            errors = err.parse_errors.len(),
            "using recovered document for malformed html"
        );
        err.into_recovered()
    })
}

static SURROUNDING_INDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*\n\s*)+|(\s*\n\s*)+$").expect("valid indent regex")
});

static INTERNAL_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").expect("valid indent regex"));

/// Tags inside which whitespace and newlines are content.
const PREFORMATTED: [&str; 2] = ["pre", "textarea"];

#[derive(Default)]
struct HtmlParser {
    current_path: Vec<String>,
}

impl HtmlParser {
    fn parse(&mut self, html: &str) -> Result<Dom, HtmlParseError> {
        match PaDomCreator::parse(html) {
            Ok(padom) => Ok(self.padom_to_dom(&padom)),
            Err(err) => {
                let recovered = self.padom_to_dom(&err.dom);
                Err(HtmlParseError::new(err.parse_errors, recovered))
            }
        }
    }

    /// Convert a [PaDom] into a [Dom].
    ///
    /// [PaDom] only exists while html5ever parses: parents refer to their
    /// children by handle and all nodes live in one list, including nodes
    /// the parser dropped along the way. Conversion starts at the document
    /// so dropped nodes never show up.
    ///
    /// [Dom] owns its children, and is what the editor works on.
    fn padom_to_dom(&mut self, padom: &PaDom) -> Dom {
        self.current_path.clear();
        let mut document = ContainerNode::new_generic(Vec::new());
        if let PaDomNode::Document(padoc) = padom.get_document() {
            self.convert(padom, padoc, &mut document);
        }
        let mut dom = Dom::new(document.take_children());
        dom.normalize();
        dom
    }

    /// Copy all of panode's children into node.
    fn convert(
        &mut self,
        padom: &PaDom,
        panode: &PaNodeContainer,
        node: &mut ContainerNode,
    ) {
        for child_handle in &panode.children {
            match padom.get_node(child_handle) {
                PaDomNode::Container(child) | PaDomNode::Document(child) => {
                    self.convert_container(padom, child, node);
                }
                PaDomNode::Text(text) => {
                    convert_text(
                        &text.content,
                        node,
                        self.is_preformatted(),
                        panode.children.len() == 1,
                    );
                }
                PaDomNode::Comment(_) => {}
            }
        }
    }

    fn is_preformatted(&self) -> bool {
        self.current_path
            .iter()
            .any(|tag| PREFORMATTED.contains(&tag.as_str()))
    }

    /// Convert one element, looking its role up in the registry.
    fn convert_container(
        &mut self,
        padom: &PaDom,
        child: &PaNodeContainer,
        node: &mut ContainerNode,
    ) {
        let tag = child.tag().to_ascii_lowercase();
        let role = role_for_tag(&tag, |name| child.get_attr(name));
        match role {
            NodeRole::Block => self.convert_into(
                padom,
                child,
                node,
                ContainerNode::new_block(Vec::new()),
            ),
            NodeRole::Wrapper(EntityType::TextLink) => {
                self.convert_into(padom, child, node, Self::new_link(child))
            }
            NodeRole::Wrapper(EntityType::Bold)
                if child.has_style("font-weight", "normal") =>
            {
                // Office suites wrap whole documents in <b style="font-weight:normal">
                self.convert(padom, child, node);
            }
            NodeRole::Wrapper(entity_type) => self.convert_into(
                padom,
                child,
                node,
                ContainerNode::new_formatting(entity_type, Vec::new()),
            ),
            NodeRole::Atomic => {
                if let Some(emoji) = Self::new_emoji(padom, child, &tag) {
                    node.append_child(DomNode::Emoji(emoji));
                }
            }
            NodeRole::Break => node.append_child(DomNode::new_line_break()),
            NodeRole::Stripped => {}
            NodeRole::Transparent if tag == "span" => {
                let wrappers = Self::span_wrappers(child);
                self.convert_nested(padom, child, node, &wrappers);
            }
            NodeRole::Transparent => self.convert(padom, child, node),
        }
    }

    /// Append `container` to `node` and convert `child`'s children into it.
    fn convert_into(
        &mut self,
        padom: &PaDom,
        child: &PaNodeContainer,
        node: &mut ContainerNode,
        container: ContainerNode,
    ) {
        self.current_path.push(child.tag().to_ascii_lowercase());
        node.append_child(DomNode::Container(container));
        if let Some(new_node) = last_container_mut_in(node) {
            self.convert(padom, child, new_node);
        }
        self.current_path.pop();
    }

    /// Convert `child`'s children inside a chain of nested wrappers.
    fn convert_nested(
        &mut self,
        padom: &PaDom,
        child: &PaNodeContainer,
        node: &mut ContainerNode,
        wrappers: &[EntityType],
    ) {
        match wrappers.split_first() {
            None => self.convert(padom, child, node),
            Some((first, rest)) => {
                node.append_child(DomNode::new_formatting(*first, Vec::new()));
                if let Some(new_node) = last_container_mut_in(node) {
                    self.convert_nested(padom, child, new_node, rest);
                }
            }
        }
    }

    /// Formatting expressed through a span's inline style, as pasted from
    /// word processors and kept in older posts.
    fn span_wrappers(span: &PaNodeContainer) -> Vec<EntityType> {
        let mut wrappers = Vec::new();
        let weight = span.style_value("font-weight");
        if weight.is_some_and(|w| {
            matches!(w.as_str(), "bold" | "bolder" | "600" | "700" | "800" | "900")
        }) {
            wrappers.push(EntityType::Bold);
        }
        if span.has_style("font-style", "italic") {
            wrappers.push(EntityType::Italic);
        }
        if span.has_style("text-decoration", "underline") {
            wrappers.push(EntityType::Underline);
        }
        if span.has_style("text-decoration", "line-through") {
            wrappers.push(EntityType::Strikethrough);
        }
        wrappers
    }

    fn new_link(child: &PaNodeContainer) -> ContainerNode {
        ContainerNode::new_link(
            LinkAttributes {
                href: child.get_attr("href").unwrap_or("").to_owned(),
                target: child.get_attr("target").map(str::to_owned),
                rel: child.get_attr("rel").map(str::to_owned),
            },
            Vec::new(),
        )
    }

    /// Read a custom emoji from `img`, `video` or `tg-emoji` markup.
    fn new_emoji(
        padom: &PaDom,
        child: &PaNodeContainer,
        tag: &str,
    ) -> Option<EmojiNode> {
        let id = child.get_attr(emoji_id_attribute(tag)?)?.trim();
        let emoji = match tag {
            "img" => EmojiNode::new(
                id,
                child.get_attr("src").unwrap_or(""),
                EmojiKind::Static,
            )
            .with_alt(child.get_attr("alt").unwrap_or("")),
            "video" => {
                let src = child
                    .get_attr("src")
                    .or_else(|| source_src(padom, child))
                    .unwrap_or("");
                EmojiNode::new(id, src, EmojiKind::Video)
            }
            _ => EmojiNode::placeholder(id).with_alt(&text_content(padom, child)),
        };
        Some(emoji)
    }
}

fn last_container_mut_in(node: &mut ContainerNode) -> Option<&mut ContainerNode> {
    node.children_mut()
        .last_mut()
        .and_then(DomNode::as_container_mut)
}

/// The `src` of the first `<source>` inside a `<video>`.
fn source_src<'a>(padom: &'a PaDom, video: &PaNodeContainer) -> Option<&'a str> {
    video.children.iter().find_map(|h| match padom.get_node(h) {
        PaDomNode::Container(c) if c.tag().eq_ignore_ascii_case("source") => {
            c.get_attr("src")
        }
        _ => None,
    })
}

fn text_content(padom: &PaDom, node: &PaNodeContainer) -> String {
    node.children
        .iter()
        .map(|h| match padom.get_node(h) {
            PaDomNode::Text(t) => t.content.clone(),
            PaDomNode::Container(c) => text_content(padom, c),
            _ => String::new(),
        })
        .collect()
}

fn convert_text(
    text: &str,
    node: &mut ContainerNode,
    is_preformatted: bool,
    is_only_child_in_parent: bool,
) {
    if is_preformatted {
        let text = text.replace('\r', "");
        let lines: Vec<_> = text.split('\n').collect();
        let line_count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            if !line.is_empty() {
                node.append_child(DomNode::new_text(line));
            }
            if i + 1 < line_count {
                node.append_child(DomNode::new_line_break());
            }
        }
        return;
    }

    let is_nbsp = text == "\u{A0}";
    if is_nbsp && is_only_child_in_parent {
        return;
    }

    // Trim any surrounding indentation
    let contents = SURROUNDING_INDENT.replace_all(text, "");

    // Replace any internal indentation with a single space
    let contents = INTERNAL_INDENT.replace_all(&contents, " ");

    if !contents.is_empty() {
        node.append_child(DomNode::new_text(&contents));
    }
}
