// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::{ContainerNode, ContainerNodeKind, DomNode};

/// Turn any list of nodes into a list of blocks holding only inline
/// content.
///
/// Blocks nested in wrappers are hoisted out, the wrapper being cloned
/// around each piece. Nested blocks are flattened. Stray inline content at
/// the top is grouped into synthetic blocks, dropping runs that are only
/// whitespace text (markup indentation).
pub fn normalize_blocks(nodes: Vec<DomNode>) -> Vec<DomNode> {
    let hoisted = hoist_blocks(nodes);
    let mut blocks = group_inline_nodes(hoisted);
    for block in blocks.iter_mut() {
        if let DomNode::Container(c) = block {
            normalize_inline(c.children_mut());
            canonicalize_block(c);
        }
    }
    blocks
}

/// A block holding nothing but one line break is the browser's empty-line
/// placeholder, stored as an empty block.
pub fn canonicalize_block(block: &mut ContainerNode) {
    if block.children().len() == 1 && block.children()[0].is_line_break() {
        block.children_mut().clear();
    }
}

fn contains_block(node: &DomNode) -> bool {
    match node {
        DomNode::Container(c) => {
            c.is_block() || c.children().iter().any(contains_block)
        }
        _ => false,
    }
}

/// Bring every block to the top of `nodes`. The result mixes blocks with
/// inline nodes, but no block is inside anything.
fn hoist_blocks(nodes: Vec<DomNode>) -> Vec<DomNode> {
    let mut out = Vec::new();
    for node in nodes {
        if !contains_block(&node) {
            out.push(node);
            continue;
        }
        let DomNode::Container(mut c) = node else {
            unreachable!("only containers can contain blocks");
        };
        let children = hoist_blocks(c.take_children());
        if c.is_block() {
            out.extend(flatten_block(&c, children));
        } else {
            out.extend(distribute_wrapper(&c, children));
        }
    }
    out
}

/// `children` contains top-level blocks. Inline runs between them become
/// blocks of their own.
fn flatten_block(block: &ContainerNode, children: Vec<DomNode>) -> Vec<DomNode> {
    if children.is_empty() {
        // An empty line.
        return vec![DomNode::Container(block.clone_with_new_children(children))];
    }
    let mut out = Vec::new();
    let mut run = Vec::new();
    for child in children {
        if child.is_block() {
            if !run.is_empty() {
                out.push(DomNode::Container(
                    block.clone_with_new_children(std::mem::take(&mut run)),
                ));
            }
            out.push(child);
        } else {
            run.push(child);
        }
    }
    if !run.is_empty() {
        out.push(DomNode::Container(block.clone_with_new_children(run)));
    }
    out
}

/// Clone `wrapper` around every inline run and inside every block of
/// `children`.
fn distribute_wrapper(
    wrapper: &ContainerNode,
    children: Vec<DomNode>,
) -> Vec<DomNode> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for child in children {
        match child {
            DomNode::Container(mut block) if block.is_block() => {
                if !run.is_empty() {
                    out.push(DomNode::Container(
                        wrapper.clone_with_new_children(std::mem::take(&mut run)),
                    ));
                }
                let inner = block.take_children();
                block.set_children(vec![DomNode::Container(
                    wrapper.clone_with_new_children(inner),
                )]);
                out.push(DomNode::Container(block));
            }
            inline => run.push(inline),
        }
    }
    if !run.is_empty() {
        out.push(DomNode::Container(wrapper.clone_with_new_children(run)));
    }
    out
}

/// Group consecutive inline nodes into blocks.
///
/// This accepts a list of nodes of any type, inline or block, e.g.
/// `[b, div, "text", i, div]`, and returns `[div, div, div, div]`.
fn group_inline_nodes(nodes: Vec<DomNode>) -> Vec<DomNode> {
    let mut output = Vec::new();
    let mut group: Vec<DomNode> = Vec::new();

    for node in nodes {
        if node.is_block() {
            flush_group(&mut group, &mut output);
            output.push(node);
        } else {
            group.push(node);
        }
    }
    flush_group(&mut group, &mut output);
    output
}

fn flush_group(group: &mut Vec<DomNode>, output: &mut Vec<DomNode>) {
    let group = std::mem::take(group);
    let only_whitespace = group
        .iter()
        .all(|n| n.as_text().is_some_and(|t| t.is_blank()));
    if !group.is_empty() && !only_whitespace {
        output.push(DomNode::new_block(group));
    }
}

/// Tidy the inline content of a block: drop empty text and empty wrappers,
/// merge adjacent text nodes and adjacent wrappers of the same kind.
pub fn normalize_inline(nodes: &mut Vec<DomNode>) {
    let mut out: Vec<DomNode> = Vec::with_capacity(nodes.len());
    for mut node in std::mem::take(nodes) {
        match &mut node {
            DomNode::Text(t) if t.is_empty() => continue,
            DomNode::Container(c) => {
                normalize_inline(c.children_mut());
                if c.children().is_empty()
                    && !matches!(c.kind(), ContainerNodeKind::Block)
                {
                    continue;
                }
            }
            _ => {}
        }
        match (out.last_mut(), node) {
            (Some(DomNode::Text(prev)), DomNode::Text(t)) => {
                prev.push_str(t.data());
            }
            (Some(DomNode::Container(prev)), DomNode::Container(mut c))
                if prev.kind() == c.kind() && !prev.is_block() =>
            {
                prev.children_mut().extend(c.take_children());
                normalize_inline(prev.children_mut());
            }
            (_, node) => out.push(node),
        }
    }
    *nodes = out;
}
