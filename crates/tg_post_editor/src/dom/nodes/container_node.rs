// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::DomNode;
use crate::wrap_tag::normalize_link_url;
use crate::{Attribute, EntityType, WrapTag};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkAttributes {
    pub href: String,
    pub target: Option<String>,
    pub rel: Option<String>,
}

impl LinkAttributes {
    pub fn new(href: &str) -> Self {
        Self {
            href: href.to_owned(),
            ..Default::default()
        }
    }

    /// Build from toolbar attributes, normalizing the href. A link opening
    /// a new tab gets `rel="noopener noreferrer"` unless one is given.
    pub fn from_attributes(attrs: &[Attribute]) -> Self {
        let href = normalize_link_url(
            Attribute::find(attrs, "href").unwrap_or_default(),
        );
        let target = Attribute::find(attrs, "target").map(str::to_owned);
        let rel = Attribute::find(attrs, "rel").map(str::to_owned).or_else(
            || {
                target
                    .as_deref()
                    .filter(|t| *t == "_blank")
                    .map(|_| "noopener noreferrer".to_owned())
            },
        );
        Self { href, target, rel }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerNodeKind {
    /// The document root.
    Generic,
    /// One line of the post, written as `<div>`.
    Block,
    /// bold, italic, underline, strikethrough or blockquote.
    Format(EntityType),
    Link(LinkAttributes),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerNode {
    kind: ContainerNodeKind,
    children: Vec<DomNode>,
}

impl ContainerNode {
    pub fn new_generic(children: Vec<DomNode>) -> Self {
        Self {
            kind: ContainerNodeKind::Generic,
            children,
        }
    }

    pub fn new_block(children: Vec<DomNode>) -> Self {
        Self {
            kind: ContainerNodeKind::Block,
            children,
        }
    }

    /// Panics if `entity_type` is a link or an emoji: those are not plain
    /// formatting wrappers.
    pub fn new_formatting(
        entity_type: EntityType,
        children: Vec<DomNode>,
    ) -> Self {
        assert!(
            entity_type.is_wrapper() && entity_type != EntityType::TextLink,
            "{entity_type} is not a formatting type"
        );
        Self {
            kind: ContainerNodeKind::Format(entity_type),
            children,
        }
    }

    pub fn new_link(attributes: LinkAttributes, children: Vec<DomNode>) -> Self {
        Self {
            kind: ContainerNodeKind::Link(attributes),
            children,
        }
    }

    /// An empty wrapper for `tag`, with `attrs` applied for links.
    pub fn new_wrapper(tag: WrapTag, attrs: &[Attribute]) -> Self {
        match tag {
            WrapTag::Link => {
                Self::new_link(LinkAttributes::from_attributes(attrs), Vec::new())
            }
            _ => Self::new_formatting(tag.entity_type(), Vec::new()),
        }
    }

    pub fn kind(&self) -> &ContainerNodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[DomNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<DomNode> {
        &mut self.children
    }

    pub fn take_children(&mut self) -> Vec<DomNode> {
        std::mem::take(&mut self.children)
    }

    pub fn set_children(&mut self, children: Vec<DomNode>) {
        self.children = children;
    }

    pub fn append_child(&mut self, child: DomNode) {
        self.children.push(child);
    }

    pub fn clone_with_new_children(&self, children: Vec<DomNode>) -> Self {
        Self {
            kind: self.kind.clone(),
            children,
        }
    }

    pub fn is_block(&self) -> bool {
        self.kind == ContainerNodeKind::Block
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, ContainerNodeKind::Link(_))
    }

    /// The entity this container produces when serialized.
    pub fn entity_type(&self) -> Option<EntityType> {
        match &self.kind {
            ContainerNodeKind::Format(t) => Some(*t),
            ContainerNodeKind::Link(_) => Some(EntityType::TextLink),
            ContainerNodeKind::Generic | ContainerNodeKind::Block => None,
        }
    }

    pub fn link_attributes(&self) -> Option<&LinkAttributes> {
        match &self.kind {
            ContainerNodeKind::Link(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Replace a link's attributes in place. Returns false for other kinds.
    pub fn set_link_attributes(&mut self, attributes: LinkAttributes) -> bool {
        match &mut self.kind {
            ContainerNodeKind::Link(attrs) => {
                *attrs = attributes;
                true
            }
            _ => false,
        }
    }

    pub fn length(&self) -> usize {
        self.children.iter().map(DomNode::length).sum()
    }

    pub fn tag(&self) -> &'static str {
        match &self.kind {
            ContainerNodeKind::Generic => "",
            ContainerNodeKind::Block => "div",
            ContainerNodeKind::Link(_) => "a",
            ContainerNodeKind::Format(t) => match t {
                EntityType::Bold => "b",
                EntityType::Italic => "i",
                EntityType::Underline => "u",
                EntityType::Strikethrough => "s",
                EntityType::Blockquote => "blockquote",
                EntityType::TextLink => "a",
                EntityType::CustomEmoji => "",
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn link_attributes_from_toolbar() {
        let attrs = LinkAttributes::from_attributes(&[
            Attribute::new("href", "t.me/channel"),
            Attribute::new("target", "_blank"),
        ]);
        assert_eq!(attrs.href, "https://t.me/channel");
        assert_eq!(attrs.target.as_deref(), Some("_blank"));
        assert_eq!(attrs.rel.as_deref(), Some("noopener noreferrer"));
    }

    #[test]
    fn wrappers_report_their_entity_type() {
        let b = ContainerNode::new_wrapper(WrapTag::Bold, &[]);
        assert_eq!(b.entity_type(), Some(EntityType::Bold));
        assert_eq!(b.tag(), "b");

        let a = ContainerNode::new_wrapper(
            WrapTag::Link,
            &[Attribute::new("href", "https://x.org")],
        );
        assert_eq!(a.entity_type(), Some(EntityType::TextLink));
        assert_eq!(a.link_attributes().unwrap().href, "https://x.org");

        assert_eq!(ContainerNode::new_block(vec![]).entity_type(), None);
    }

    #[test]
    fn set_link_attributes_only_applies_to_links() {
        let mut a = ContainerNode::new_link(LinkAttributes::new("a"), vec![]);
        assert!(a.set_link_attributes(LinkAttributes::new("b")));
        assert_eq!(a.link_attributes().unwrap().href, "b");

        let mut b = ContainerNode::new_formatting(EntityType::Bold, vec![]);
        assert!(!b.set_link_attributes(LinkAttributes::new("b")));
    }
}
