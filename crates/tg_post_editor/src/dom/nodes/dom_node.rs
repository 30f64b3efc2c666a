// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::{ContainerNode, EmojiNode, LinkAttributes, TextNode};
use crate::EntityType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomNode {
    Container(ContainerNode),
    Text(TextNode),
    LineBreak,
    Emoji(EmojiNode),
}

impl DomNode {
    pub fn new_text(text: &str) -> DomNode {
        DomNode::Text(TextNode::from(text))
    }

    pub fn new_line_break() -> DomNode {
        DomNode::LineBreak
    }

    pub fn new_block(children: Vec<DomNode>) -> DomNode {
        DomNode::Container(ContainerNode::new_block(children))
    }

    pub fn new_formatting(
        entity_type: EntityType,
        children: Vec<DomNode>,
    ) -> DomNode {
        DomNode::Container(ContainerNode::new_formatting(entity_type, children))
    }

    pub fn new_link(href: &str, children: Vec<DomNode>) -> DomNode {
        DomNode::Container(ContainerNode::new_link(
            LinkAttributes::new(href),
            children,
        ))
    }

    pub fn new_emoji(emoji: EmojiNode) -> DomNode {
        DomNode::Emoji(emoji)
    }

    /// Width in editing locations. Block boundaries are not included.
    pub fn length(&self) -> usize {
        match self {
            DomNode::Container(c) => c.length(),
            DomNode::Text(t) => t.length(),
            DomNode::LineBreak => 1,
            DomNode::Emoji(_) => EmojiNode::LENGTH,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, DomNode::Container(c) if c.is_block())
    }

    pub fn is_container(&self) -> bool {
        matches!(self, DomNode::Container(_))
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self, DomNode::LineBreak)
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            DomNode::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut ContainerNode> {
        match self {
            DomNode::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            DomNode::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_emoji(&self) -> Option<&EmojiNode> {
        match self {
            DomNode::Emoji(e) => Some(e),
            _ => None,
        }
    }

    /// No emoji and no visible text. Line breaks do not make a node
    /// non-blank.
    pub fn is_blank(&self) -> bool {
        match self {
            DomNode::Container(c) => c.children().iter().all(DomNode::is_blank),
            DomNode::Text(t) => t.is_blank(),
            DomNode::LineBreak => true,
            DomNode::Emoji(_) => false,
        }
    }

    pub fn count_line_breaks(&self) -> usize {
        match self {
            DomNode::Container(c) => {
                c.children().iter().map(DomNode::count_line_breaks).sum()
            }
            DomNode::LineBreak => 1,
            _ => 0,
        }
    }

    /// Every emoji in this subtree, in document order.
    pub fn emojis(&self) -> Vec<&EmojiNode> {
        let mut out = Vec::new();
        self.collect_emojis(&mut out);
        out
    }

    fn collect_emojis<'a>(&'a self, out: &mut Vec<&'a EmojiNode>) {
        match self {
            DomNode::Container(c) => {
                for child in c.children() {
                    child.collect_emojis(out);
                }
            }
            DomNode::Emoji(e) => out.push(e),
            _ => {}
        }
    }

    pub fn for_each_emoji_mut(&mut self, f: &mut impl FnMut(&mut EmojiNode)) {
        match self {
            DomNode::Container(c) => {
                for child in c.children_mut() {
                    child.for_each_emoji_mut(f);
                }
            }
            DomNode::Emoji(e) => f(e),
            _ => {}
        }
    }

    /// The text of this subtree with emoji and breaks left out.
    pub fn text_content(&self) -> String {
        match self {
            DomNode::Container(c) => {
                c.children().iter().map(DomNode::text_content).collect()
            }
            DomNode::Text(t) => t.data().to_owned(),
            _ => String::new(),
        }
    }
}
