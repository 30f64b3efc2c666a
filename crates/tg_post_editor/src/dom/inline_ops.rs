// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Edits on the inline content of one block. Offsets are relative to the
//! start of the block and use the editing metric of [`DomNode::length`].
//!
//! Everything here works by splitting the node list at an offset, cloning
//! containers onto both sides, and gluing the pieces back together. The
//! caller runs [`normalize_inline`](super::normalize::normalize_inline)
//! afterwards to merge what was split.

use crate::dom::nodes::{ContainerNode, ContainerNodeKind, DomNode};
use crate::dom::unicode::{first_grapheme_width, last_grapheme_width};
use crate::dom::DomHandle;
use crate::EntityType;

pub fn nodes_len(nodes: &[DomNode]) -> usize {
    nodes.iter().map(DomNode::length).sum()
}

/// Split `nodes` at `offset`. Containers crossing the offset are cloned
/// onto both sides. An emoji or a character straddling the offset stays on
/// the left, so the left side can be slightly longer than `offset`.
pub fn split_at(
    nodes: Vec<DomNode>,
    offset: usize,
) -> (Vec<DomNode>, Vec<DomNode>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for node in nodes {
        let len = node.length();
        if pos + len <= offset {
            left.push(node);
        } else if pos >= offset {
            right.push(node);
        } else {
            match node {
                DomNode::Text(t) => {
                    let (l, r) = t.split_at(offset - pos);
                    if !l.is_empty() {
                        left.push(DomNode::Text(l));
                    }
                    if !r.is_empty() {
                        right.push(DomNode::Text(r));
                    }
                }
                DomNode::Container(mut c) => {
                    let (l, r) = split_at(c.take_children(), offset - pos);
                    left.push(DomNode::Container(c.clone_with_new_children(l)));
                    right.push(DomNode::Container(c.clone_with_new_children(r)));
                }
                leaf => left.push(leaf),
            }
        }
        pos += len;
    }
    (left, right)
}

/// Split into the parts before `start`, between `start` and `end`, and
/// after `end`.
fn split_range(
    nodes: Vec<DomNode>,
    start: usize,
    end: usize,
) -> (Vec<DomNode>, Vec<DomNode>, Vec<DomNode>) {
    let (left, rest) = split_at(nodes, start);
    let consumed = nodes_len(&left);
    let (middle, right) = split_at(rest, end.saturating_sub(consumed));
    (left, middle, right)
}

/// Insert `new_nodes` at `offset`, at the shallowest level where the offset
/// is a boundary between nodes. Descends only into a node the offset is
/// strictly inside of.
pub fn insert_nodes_at(
    nodes: &mut Vec<DomNode>,
    offset: usize,
    new_nodes: Vec<DomNode>,
) {
    let mut pos = 0;
    for i in 0..nodes.len() {
        if offset == pos {
            nodes.splice(i..i, new_nodes);
            return;
        }
        let len = nodes[i].length();
        if offset < pos + len {
            match &mut nodes[i] {
                DomNode::Container(c) => {
                    insert_nodes_at(c.children_mut(), offset - pos, new_nodes);
                }
                DomNode::Text(t) => {
                    let (l, r) = t.split_at(offset - pos);
                    let mut replacement = vec![DomNode::Text(l)];
                    replacement.extend(new_nodes);
                    replacement.push(DomNode::Text(r));
                    nodes.splice(i..=i, replacement);
                }
                _ => {
                    nodes.splice(i + 1..i + 1, new_nodes);
                }
            }
            return;
        }
        pos += len;
    }
    nodes.extend(new_nodes);
}

/// Type `text` at `offset`. The text joins the text node ending at the
/// offset, so typing after bold text continues in bold. Falls back to a new
/// text node where there is none (after an emoji, at a block start).
pub fn insert_text_at(nodes: &mut Vec<DomNode>, offset: usize, text: &str) {
    if !extend_text_in(nodes, offset, text) {
        insert_nodes_at(nodes, offset, vec![DomNode::new_text(text)]);
    }
}

fn extend_text_in(nodes: &mut [DomNode], offset: usize, text: &str) -> bool {
    let mut pos = 0;
    for (i, node) in nodes.iter_mut().enumerate() {
        let len = node.length();
        let here = if offset == 0 {
            i == 0
        } else {
            pos < offset && offset <= pos + len
        };
        if here {
            return match node {
                DomNode::Text(t) => {
                    t.insert_str(offset - pos, text);
                    true
                }
                DomNode::Container(c) => {
                    extend_text_in(c.children_mut(), offset - pos, text)
                }
                _ => false,
            };
        }
        pos += len;
    }
    false
}

pub fn delete_range(nodes: &mut Vec<DomNode>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let (mut left, _, right) = split_range(std::mem::take(nodes), start, end);
    left.extend(right);
    *nodes = left;
}

/// Wrap `[start, end)` in a clone of `wrapper`. Returns false when the
/// range is empty.
///
/// If one child container holds the whole range the wrap happens inside
/// it, so the surrounding wrapper is not cut in three. Wrapping content
/// already inside a wrapper of the same kind changes nothing. Links inside
/// the range are removed before wrapping in a link.
pub fn wrap_range(
    nodes: &mut Vec<DomNode>,
    start: usize,
    end: usize,
    wrapper: &ContainerNode,
) -> bool {
    if start >= end {
        return false;
    }
    let mut pos = 0;
    for node in nodes.iter_mut() {
        let len = node.length();
        if pos <= start && end <= pos + len {
            if let DomNode::Container(c) = node {
                if same_wrapper_kind(c.kind(), wrapper.kind()) {
                    return false;
                }
                return wrap_range(c.children_mut(), start - pos, end - pos, wrapper);
            }
        }
        pos += len;
    }

    let (mut left, mut middle, right) =
        split_range(std::mem::take(nodes), start, end);
    if wrapper.is_link() {
        middle = strip_containers(middle, &|k| {
            matches!(k, ContainerNodeKind::Link(_))
        });
    } else {
        let kind = wrapper.kind().clone();
        middle = strip_containers(middle, &|k| *k == kind);
    }
    let wrapped = nodes_len(&middle) > 0;
    if wrapped {
        left.push(DomNode::Container(wrapper.clone_with_new_children(middle)));
    } else {
        left.extend(middle);
    }
    left.extend(right);
    *nodes = left;
    wrapped
}

/// Remove containers matching `matches` from `[start, end)`, keeping their
/// content. Parts of a matching container outside the range keep it.
pub fn unwrap_range(
    nodes: &mut Vec<DomNode>,
    start: usize,
    end: usize,
    matches: &dyn Fn(&ContainerNodeKind) -> bool,
) {
    if start >= end {
        return;
    }
    let (mut left, middle, right) =
        split_range(std::mem::take(nodes), start, end);
    left.extend(strip_containers(middle, matches));
    left.extend(right);
    *nodes = left;
}

/// Replace every container matching `matches` with its children.
pub fn strip_containers(
    nodes: Vec<DomNode>,
    matches: &dyn Fn(&ContainerNodeKind) -> bool,
) -> Vec<DomNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            DomNode::Container(mut c) => {
                let children = strip_containers(c.take_children(), matches);
                if matches(c.kind()) {
                    out.extend(children);
                } else {
                    c.set_children(children);
                    out.push(DomNode::Container(c));
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn same_wrapper_kind(a: &ContainerNodeKind, b: &ContainerNodeKind) -> bool {
    match (a, b) {
        (ContainerNodeKind::Link(_), ContainerNodeKind::Link(_)) => true,
        _ => a == b,
    }
}

/// Find the innermost container matching `matches` that covers
/// `[start, end]`. With `start == end` the caret has to be strictly inside
/// the container. `parent` is the handle of the node owning `nodes`.
pub fn find_container_covering(
    nodes: &[DomNode],
    parent: &DomHandle,
    start: usize,
    end: usize,
    matches: &dyn Fn(&ContainerNodeKind) -> bool,
) -> Option<DomHandle> {
    let mut pos = 0;
    for (i, node) in nodes.iter().enumerate() {
        let len = node.length();
        let covers = if start == end {
            pos < start && start < pos + len
        } else {
            pos <= start && end <= pos + len
        };
        if covers {
            if let DomNode::Container(c) = node {
                let handle = parent.child_handle(i);
                let inner = find_container_covering(
                    c.children(),
                    &handle,
                    start - pos,
                    end - pos,
                    matches,
                );
                if inner.is_some() {
                    return inner;
                }
                if matches(c.kind()) {
                    return Some(handle);
                }
            }
        }
        pos += len;
    }
    None
}

/// Entity types applying to the content at `[start, end)`. A collapsed
/// range looks at the content just before the caret, as typing would.
pub fn formats_at(nodes: &[DomNode], start: usize, end: usize) -> Vec<EntityType> {
    let mut leaves = Vec::new();
    collect_leaf_formats(nodes, 0, &mut Vec::new(), &mut leaves);

    let touching: Vec<&(usize, usize, Vec<EntityType>)> = if start == end {
        leaves
            .iter()
            .filter(|(s, e, _)| *s < start && start <= *e)
            .take(1)
            .collect()
    } else {
        leaves
            .iter()
            .filter(|(s, e, _)| *s < end && start < *e)
            .collect()
    };

    let Some(((_, _, first), rest)) = touching.split_first() else {
        return Vec::new();
    };
    let mut formats: Vec<EntityType> = first
        .iter()
        .copied()
        .filter(|t| rest.iter().all(|(_, _, f)| f.contains(t)))
        .collect();
    formats.sort();
    formats.dedup();
    formats
}

fn collect_leaf_formats(
    nodes: &[DomNode],
    mut pos: usize,
    ancestors: &mut Vec<EntityType>,
    out: &mut Vec<(usize, usize, Vec<EntityType>)>,
) {
    for node in nodes {
        let len = node.length();
        match node {
            DomNode::Container(c) => match c.entity_type() {
                Some(t) => {
                    ancestors.push(t);
                    collect_leaf_formats(c.children(), pos, ancestors, out);
                    ancestors.pop();
                }
                None => collect_leaf_formats(c.children(), pos, ancestors, out),
            },
            leaf => {
                if len > 0 {
                    let mut formats = ancestors.clone();
                    if leaf.as_emoji().is_some() {
                        formats.push(EntityType::CustomEmoji);
                    }
                    out.push((pos, pos + len, formats));
                }
            }
        }
        pos += len;
    }
}

/// How far backspace at `offset` deletes: one grapheme of text, a whole
/// emoji or one line break.
pub fn width_before(nodes: &[DomNode], offset: usize) -> usize {
    let mut pos = 0;
    for node in nodes {
        let len = node.length();
        if pos < offset && offset <= pos + len {
            return match node {
                DomNode::Container(c) => width_before(c.children(), offset - pos),
                DomNode::Text(t) => {
                    let (before, _) = t.split_at(offset - pos);
                    last_grapheme_width(before.data())
                }
                _ => offset - pos,
            };
        }
        pos += len;
    }
    0
}

/// How far forward delete at `offset` deletes.
pub fn width_after(nodes: &[DomNode], offset: usize) -> usize {
    let mut pos = 0;
    for node in nodes {
        let len = node.length();
        if pos <= offset && offset < pos + len {
            return match node {
                DomNode::Container(c) => width_after(c.children(), offset - pos),
                DomNode::Text(t) => {
                    let (_, after) = t.split_at(offset - pos);
                    first_grapheme_width(after.data())
                }
                _ => pos + len - offset,
            };
        }
        pos += len;
    }
    0
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::nodes::{EmojiKind, EmojiNode};
    use crate::dom::normalize::normalize_inline;
    use crate::dom::to_html::ToHtml;

    fn emoji() -> DomNode {
        DomNode::new_emoji(EmojiNode::new("e1", "", EmojiKind::Static))
    }

    fn bold(children: Vec<DomNode>) -> DomNode {
        DomNode::new_formatting(EntityType::Bold, children)
    }

    fn html(nodes: &[DomNode]) -> String {
        nodes.iter().map(|n| n.to_html()).collect()
    }

    fn sample() -> Vec<DomNode> {
        vec![
            DomNode::new_text("ab"),
            bold(vec![DomNode::new_text("cd")]),
            DomNode::new_text("ef"),
        ]
    }

    #[test]
    fn split_clones_containers_on_both_sides() {
        let (l, r) = split_at(sample(), 3);
        assert_eq!(html(&l), "ab<b>c</b>");
        assert_eq!(html(&r), "<b>d</b>ef");
    }

    #[test]
    fn split_inside_an_emoji_keeps_it_left() {
        let (l, r) = split_at(vec![DomNode::new_text("a"), emoji()], 2);
        assert_eq!(nodes_len(&l), 3);
        assert!(r.is_empty());
    }

    #[test]
    fn insert_nodes_at_a_boundary_stays_shallow() {
        let mut nodes = sample();
        insert_nodes_at(&mut nodes, 4, vec![DomNode::new_text("|")]);
        assert_eq!(html(&nodes), "ab<b>cd</b>|ef");
    }

    #[test]
    fn insert_nodes_inside_text_splits_it() {
        let mut nodes = sample();
        insert_nodes_at(&mut nodes, 3, vec![emoji()]);
        assert_eq!(nodes_len(&nodes), 8);
        normalize_inline(&mut nodes);
        assert_eq!(
            html(&nodes),
            r#"ab<b>c<img src="" alt="" data-custom-emoji-id="e1" width="24" height="24">d</b>ef"#
        );
    }

    #[test]
    fn insert_text_continues_the_left_text_node() {
        let mut nodes = sample();
        insert_text_at(&mut nodes, 4, "X");
        assert_eq!(html(&nodes), "ab<b>cdX</b>ef");

        let mut nodes = sample();
        insert_text_at(&mut nodes, 0, "X");
        assert_eq!(html(&nodes), "Xab<b>cd</b>ef");
    }

    #[test]
    fn insert_text_after_emoji_makes_a_new_node() {
        let mut nodes = vec![DomNode::new_text("Hi "), emoji()];
        insert_text_at(&mut nodes, 5, " there");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes_len(&nodes), 11);
    }

    #[test]
    fn delete_across_a_container() {
        let mut nodes = sample();
        delete_range(&mut nodes, 1, 5);
        normalize_inline(&mut nodes);
        assert_eq!(html(&nodes), "af");
    }

    #[test]
    fn wrap_in_the_middle_of_text() {
        let mut nodes = vec![DomNode::new_text("hello")];
        let b = ContainerNode::new_formatting(EntityType::Italic, vec![]);
        assert!(wrap_range(&mut nodes, 1, 4, &b));
        assert_eq!(html(&nodes), "h<i>ell</i>o");
    }

    #[test]
    fn wrap_inside_an_enclosing_wrapper_does_not_cut_it() {
        let mut nodes = vec![DomNode::new_formatting(
            EntityType::Blockquote,
            vec![DomNode::new_text("hello")],
        )];
        let b = ContainerNode::new_formatting(EntityType::Bold, vec![]);
        assert!(wrap_range(&mut nodes, 1, 4, &b));
        assert_eq!(html(&nodes), "<blockquote>h<b>ell</b>o</blockquote>");
    }

    #[test]
    fn wrap_already_wrapped_content_is_a_no_op() {
        let mut nodes = sample();
        let b = ContainerNode::new_formatting(EntityType::Bold, vec![]);
        assert!(!wrap_range(&mut nodes, 2, 4, &b));
        assert_eq!(html(&nodes), "ab<b>cd</b>ef");
    }

    #[test]
    fn wrap_absorbs_same_kind_wrappers() {
        let mut nodes = sample();
        let b = ContainerNode::new_formatting(EntityType::Bold, vec![]);
        assert!(wrap_range(&mut nodes, 0, 6, &b));
        normalize_inline(&mut nodes);
        assert_eq!(html(&nodes), "<b>abcdef</b>");
    }

    #[test]
    fn wrapping_in_a_link_strips_inner_links() {
        let mut nodes = vec![
            DomNode::new_text("a"),
            DomNode::new_link("https://old", vec![DomNode::new_text("bc")]),
        ];
        let a = ContainerNode::new_link(
            crate::LinkAttributes::new("https://new"),
            vec![],
        );
        assert!(wrap_range(&mut nodes, 0, 2, &a));
        normalize_inline(&mut nodes);
        assert_eq!(
            html(&nodes),
            r#"<a href="https://new">ab</a><a href="https://old">c</a>"#
        );
    }

    #[test]
    fn unwrap_keeps_formatting_outside_the_range() {
        let mut nodes = vec![bold(vec![DomNode::new_text("hello")])];
        unwrap_range(&mut nodes, 1, 4, &|k| {
            *k == ContainerNodeKind::Format(EntityType::Bold)
        });
        normalize_inline(&mut nodes);
        assert_eq!(html(&nodes), "<b>h</b>ell<b>o</b>");
    }

    #[test]
    fn find_link_covering_a_selection() {
        let nodes = vec![
            DomNode::new_text("x"),
            bold(vec![DomNode::new_link(
                "https://t.me",
                vec![DomNode::new_text("link")],
            )]),
        ];
        let is_link = |k: &ContainerNodeKind| matches!(k, ContainerNodeKind::Link(_));
        let found =
            find_container_covering(&nodes, &DomHandle::root(), 2, 4, &is_link);
        assert_eq!(found, Some(DomHandle::from_raw(vec![1, 0])));
        assert_eq!(
            find_container_covering(&nodes, &DomHandle::root(), 0, 2, &is_link),
            None
        );
        // A caret at the edge of the link is not inside it.
        assert_eq!(
            find_container_covering(&nodes, &DomHandle::root(), 1, 1, &is_link),
            None
        );
        assert!(find_container_covering(&nodes, &DomHandle::root(), 3, 3, &is_link)
            .is_some());
    }

    #[test]
    fn formats_cover_the_whole_range() {
        let nodes = sample();
        assert_eq!(formats_at(&nodes, 2, 4), vec![EntityType::Bold]);
        assert_eq!(formats_at(&nodes, 1, 4), Vec::<EntityType>::new());
        assert_eq!(formats_at(&nodes, 4, 4), vec![EntityType::Bold]);
        assert!(formats_at(&nodes, 2, 2).is_empty());
    }

    #[test]
    fn backspace_and_delete_widths() {
        let nodes = vec![
            DomNode::new_text("a\u{1F469}\u{200D}\u{1F4BB}"),
            emoji(),
            DomNode::new_line_break(),
        ];
        assert_eq!(width_before(&nodes, 6), 5);
        assert_eq!(width_before(&nodes, 8), 2);
        assert_eq!(width_before(&nodes, 9), 1);
        assert_eq!(width_after(&nodes, 0), 1);
        assert_eq!(width_after(&nodes, 1), 5);
        assert_eq!(width_after(&nodes, 6), 2);
        assert_eq!(width_after(&nodes, 9), 0);
    }
}
