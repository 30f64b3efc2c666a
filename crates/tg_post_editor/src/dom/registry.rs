// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The closed table of element roles. Both the rehydrator and the paste
//! filter look tags up here. Adding a formatting kind is one table row.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::EntityType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
    /// A line of the post.
    Block,
    /// A formatting wrapper producing one entity.
    Wrapper(EntityType),
    /// A custom emoji element.
    Atomic,
    /// An explicit line break.
    Break,
    /// Unknown element: dropped, its content kept.
    Transparent,
    /// Dropped together with its content.
    Stripped,
}

static ROLES: Lazy<HashMap<&'static str, NodeRole>> = Lazy::new(|| {
    use NodeRole::*;
    HashMap::from([
        ("div", Block),
        ("p", Block),
        ("li", Block),
        ("h1", Block),
        ("h2", Block),
        ("h3", Block),
        ("h4", Block),
        ("h5", Block),
        ("h6", Block),
        ("pre", Block),
        ("section", Block),
        ("article", Block),
        ("header", Block),
        ("footer", Block),
        ("tr", Block),
        ("b", Wrapper(EntityType::Bold)),
        ("strong", Wrapper(EntityType::Bold)),
        ("i", Wrapper(EntityType::Italic)),
        ("em", Wrapper(EntityType::Italic)),
        ("u", Wrapper(EntityType::Underline)),
        ("ins", Wrapper(EntityType::Underline)),
        ("s", Wrapper(EntityType::Strikethrough)),
        ("strike", Wrapper(EntityType::Strikethrough)),
        ("del", Wrapper(EntityType::Strikethrough)),
        ("a", Wrapper(EntityType::TextLink)),
        ("blockquote", Wrapper(EntityType::Blockquote)),
        ("img", Atomic),
        ("video", Atomic),
        ("tg-emoji", Atomic),
        ("br", Break),
        ("script", Stripped),
        ("style", Stripped),
        ("template", Stripped),
        ("head", Stripped),
        ("title", Stripped),
        ("meta", Stripped),
        ("link", Stripped),
        ("iframe", Stripped),
        ("object", Stripped),
        ("embed", Stripped),
        ("canvas", Stripped),
        ("svg", Stripped),
        ("math", Stripped),
        ("audio", Stripped),
        ("picture", Stripped),
        ("source", Stripped),
        ("noscript", Stripped),
        ("textarea", Stripped),
        ("select", Stripped),
    ])
});

/// Tags that start a new line when reading visible text, beyond the
/// editor's own blocks.
const LINE_BOUNDARY_TAGS: [&str; 5] = ["blockquote", "ul", "ol", "table", "hr"];

/// The attribute carrying the emoji id for an atomic tag.
pub fn emoji_id_attribute(tag: &str) -> Option<&'static str> {
    match tag {
        "img" | "video" => Some("data-custom-emoji-id"),
        "tg-emoji" => Some("emoji-id"),
        _ => None,
    }
}

/// Look up the role of an element. `attr` reads the element's attributes;
/// media without an emoji id is not an emoji and gets stripped.
pub fn role_for_tag<'a>(
    tag: &str,
    attr: impl Fn(&str) -> Option<&'a str>,
) -> NodeRole {
    let tag = tag.to_ascii_lowercase();
    match ROLES.get(tag.as_str()).copied() {
        Some(NodeRole::Atomic) => {
            let has_id = emoji_id_attribute(&tag)
                .and_then(attr)
                .is_some_and(|id| !id.trim().is_empty());
            if has_id {
                NodeRole::Atomic
            } else {
                NodeRole::Stripped
            }
        }
        Some(role) => role,
        None => NodeRole::Transparent,
    }
}

/// Whether pasted markup loses this element and everything inside it.
/// Paste only ever yields plain text, so emoji and custom elements go too.
pub fn is_stripped_on_paste(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    tag.contains('-')
        || matches!(
            ROLES.get(tag.as_str()),
            Some(NodeRole::Stripped) | Some(NodeRole::Atomic)
        )
}

/// Whether the element starts and ends a line of visible text.
pub fn is_line_boundary(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    LINE_BOUNDARY_TAGS.contains(&tag.as_str())
        || ROLES.get(tag.as_str()) == Some(&NodeRole::Block)
}
