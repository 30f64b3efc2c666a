// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::inline_ops;
use crate::dom::nodes::{
    ContainerNode, ContainerNodeKind, DomNode, EmojiNode,
};
use crate::dom::normalize::{canonicalize_block, normalize_blocks, normalize_inline};
use crate::dom::to_html::ToHtml;
use crate::dom::to_tree::ToTree;
use crate::dom::DomHandle;
use crate::EntityType;

/// The document being edited: a root container whose children are blocks
/// once [`Dom::normalize`] has run.
///
/// Positions are document locations (see [`crate::Location`]): the block
/// lengths plus one unit for each boundary between two blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dom {
    document: ContainerNode,
}

impl Dom {
    pub fn new(top_level_items: Vec<DomNode>) -> Self {
        Self {
            document: ContainerNode::new_generic(top_level_items),
        }
    }

    pub fn new_empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn document(&self) -> &ContainerNode {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ContainerNode {
        &mut self.document
    }

    pub fn blocks(&self) -> &[DomNode] {
        self.document.children()
    }

    pub fn block_count(&self) -> usize {
        self.blocks().len()
    }

    /// True when there is nothing to see: no blocks, or blocks without
    /// emoji, text or breaks.
    pub fn is_empty(&self) -> bool {
        self.blocks().iter().all(|b| b.length() == 0)
    }

    /// Total length in locations.
    pub fn length(&self) -> usize {
        let blocks = self.blocks();
        let content: usize = blocks.iter().map(DomNode::length).sum();
        content + blocks.len().saturating_sub(1)
    }

    /// Location of the start of block `index`.
    pub fn block_start(&self, index: usize) -> usize {
        self.blocks()
            .iter()
            .take(index)
            .map(|b| b.length() + 1)
            .sum()
    }

    /// The block containing `location` and the offset inside it. A location
    /// on a boundary belongs to the block it ends. Locations past the end
    /// give `None`.
    pub fn locate(&self, location: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (i, block) in self.blocks().iter().enumerate() {
            let len = block.length();
            if location <= start + len {
                return Some((i, location - start));
            }
            start += len + 1;
        }
        None
    }

    /// Clamp a location to the document.
    pub fn clamp(&self, location: usize) -> usize {
        location.min(self.length())
    }

    pub fn lookup_node(&self, handle: &DomHandle) -> Option<&DomNode> {
        let (first, rest) = handle.raw().split_first()?;
        let mut node = self.document.children().get(*first)?;
        for i in rest {
            node = node.as_container()?.children().get(*i)?;
        }
        Some(node)
    }

    pub fn lookup_node_mut(&mut self, handle: &DomHandle) -> Option<&mut DomNode> {
        let (first, rest) = handle.raw().split_first()?;
        let mut node = self.document.children_mut().get_mut(*first)?;
        for i in rest {
            node = node.as_container_mut()?.children_mut().get_mut(*i)?;
        }
        Some(node)
    }

    /// Remove the container at `handle`, keeping its children in its place.
    pub fn replace_node_with_its_children(&mut self, handle: &DomHandle) {
        if handle.is_root() {
            return;
        }
        let parent = handle.parent_handle();
        let index = handle.index_in_parent();
        let siblings = if parent.is_root() {
            Some(self.document.children_mut())
        } else {
            self.lookup_node_mut(&parent)
                .and_then(DomNode::as_container_mut)
                .map(ContainerNode::children_mut)
        };
        let Some(siblings) = siblings else {
            return;
        };
        if let Some(DomNode::Container(container)) = siblings.get_mut(index) {
            let children = container.take_children();
            siblings.splice(index..=index, children);
        }
    }

    fn block_children_mut(&mut self, index: usize) -> Option<&mut Vec<DomNode>> {
        self.document
            .children_mut()
            .get_mut(index)
            .and_then(DomNode::as_container_mut)
            .map(ContainerNode::children_mut)
    }

    /// Make sure there is a block to type into.
    pub fn ensure_block(&mut self) {
        if self.blocks().is_empty() {
            self.document.append_child(DomNode::new_block(Vec::new()));
        }
    }

    /// Restore the block structure after an edit: stray inline nodes are
    /// grouped into blocks, nested blocks hoisted, inline content tidied.
    pub fn normalize(&mut self) {
        let children = self.document.take_children();
        self.document.set_children(normalize_blocks(children));
        self.assert_invariants();
    }

    /// Remove `[start, end)`. A range crossing blocks joins the first and
    /// the last block.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let Some((first, first_offset)) = self.locate(start) else {
            return;
        };
        let (last, last_offset) = self
            .locate(end)
            .unwrap_or_else(|| self.end_position());

        if first == last {
            if let Some(children) = self.block_children_mut(first) {
                inline_ops::delete_range(children, first_offset, last_offset);
                normalize_inline(children);
            }
            return;
        }

        let mut tail = Vec::new();
        if let Some(children) = self.block_children_mut(last) {
            let (_, right) =
                inline_ops::split_at(std::mem::take(children), last_offset);
            tail = right;
        }
        if let Some(children) = self.block_children_mut(first) {
            let (left, _) =
                inline_ops::split_at(std::mem::take(children), first_offset);
            *children = left;
            children.extend(tail);
            normalize_inline(children);
        }
        self.document.children_mut().drain(first + 1..=last);
    }

    fn end_position(&self) -> (usize, usize) {
        let last = self.block_count().saturating_sub(1);
        let len = self.blocks().last().map(DomNode::length).unwrap_or(0);
        (last, len)
    }

    /// Insert inline nodes at `location`.
    pub fn insert_nodes(&mut self, location: usize, nodes: Vec<DomNode>) {
        self.ensure_block();
        let (block, offset) =
            self.locate(location).unwrap_or_else(|| self.end_position());
        if let Some(children) = self.block_children_mut(block) {
            inline_ops::insert_nodes_at(children, offset, nodes);
            normalize_inline(children);
        }
    }

    /// Insert text at `location`, continuing the formatting of the text
    /// just before it.
    pub fn insert_text(&mut self, location: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ensure_block();
        let (block, offset) =
            self.locate(location).unwrap_or_else(|| self.end_position());
        if let Some(children) = self.block_children_mut(block) {
            inline_ops::insert_text_at(children, offset, text);
            normalize_inline(children);
        }
    }

    /// Split the block at `location` in two. Returns the location of the
    /// start of the new block.
    ///
    /// A trailing break does not show in a block, so when the first half
    /// ends in one, a second break is added to keep the empty line.
    pub fn split_block(&mut self, location: usize) -> usize {
        self.ensure_block();
        let (block, offset) =
            self.locate(location).unwrap_or_else(|| self.end_position());
        let Some(children) = self.block_children_mut(block) else {
            return location;
        };
        let (mut left, mut right) =
            inline_ops::split_at(std::mem::take(children), offset);
        normalize_inline(&mut left);
        normalize_inline(&mut right);
        if ends_with_line_break(&left) {
            left.push(DomNode::new_line_break());
        }
        *children = left;

        let mut new_block = ContainerNode::new_block(right);
        canonicalize_block(&mut new_block);
        self.document
            .children_mut()
            .insert(block + 1, DomNode::Container(new_block));
        self.block_start(block + 1)
    }

    /// Insert an explicit break at `location`. Returns the caret location
    /// after it. A break that would end its block gets a second one after
    /// it so the new line shows.
    pub fn insert_line_break(&mut self, location: usize) -> usize {
        self.ensure_block();
        let (block, offset) =
            self.locate(location).unwrap_or_else(|| self.end_position());
        let Some(children) = self.block_children_mut(block) else {
            return location;
        };
        let at_end = offset >= inline_ops::nodes_len(children);
        let mut breaks = vec![DomNode::new_line_break()];
        if at_end {
            breaks.push(DomNode::new_line_break());
        }
        inline_ops::insert_nodes_at(children, offset, breaks);
        self.block_start(block) + offset + 1
    }

    /// The parts of `[start, end)` falling in each block, as
    /// `(block, start, end)` with offsets relative to the block.
    pub fn block_segments(
        &self,
        start: usize,
        end: usize,
    ) -> Vec<(usize, usize, usize)> {
        let mut segments = Vec::new();
        let mut block_start = 0;
        for (i, block) in self.blocks().iter().enumerate() {
            let block_end = block_start + block.length();
            if block_start <= end && start <= block_end {
                let s = start.max(block_start) - block_start;
                let e = end.min(block_end) - block_start;
                segments.push((i, s, e));
            }
            block_start = block_end + 1;
        }
        segments
    }

    /// Wrap `[start, end)` in clones of `wrapper`, one per block. Returns
    /// whether anything was wrapped.
    pub fn wrap_range(
        &mut self,
        start: usize,
        end: usize,
        wrapper: &ContainerNode,
    ) -> bool {
        let mut wrapped = false;
        for (block, s, e) in self.block_segments(start, end) {
            if let Some(children) = self.block_children_mut(block) {
                wrapped |= inline_ops::wrap_range(children, s, e, wrapper);
                normalize_inline(children);
            }
        }
        wrapped
    }

    pub fn unwrap_range(
        &mut self,
        start: usize,
        end: usize,
        matches: &dyn Fn(&ContainerNodeKind) -> bool,
    ) {
        for (block, s, e) in self.block_segments(start, end) {
            if let Some(children) = self.block_children_mut(block) {
                inline_ops::unwrap_range(children, s, e, matches);
                normalize_inline(children);
            }
        }
    }

    /// The innermost link covering `[start, end]`, if the range lies inside
    /// a single link.
    pub fn find_link_covering(&self, start: usize, end: usize) -> Option<DomHandle> {
        let (block, s) = self.locate(start)?;
        let (end_block, e) = self.locate(end)?;
        if block != end_block {
            return None;
        }
        let handle = DomHandle::root().child_handle(block);
        let children = self.lookup_node(&handle)?.as_container()?.children();
        inline_ops::find_container_covering(children, &handle, s, e, &|k| {
            matches!(k, ContainerNodeKind::Link(_))
        })
    }

    /// The entity types applying to the whole of `[start, end)`.
    pub fn formats_at(&self, start: usize, end: usize) -> Vec<EntityType> {
        let segments = self.block_segments(start, end);
        let non_empty: Vec<_> =
            segments.iter().filter(|(_, s, e)| s < e).collect();
        let picked: Vec<_> = if non_empty.is_empty() {
            segments.iter().take(1).collect()
        } else {
            non_empty
        };

        let mut result: Option<Vec<EntityType>> = None;
        for (block, s, e) in picked {
            let Some(children) =
                self.blocks().get(*block).and_then(DomNode::as_container)
            else {
                continue;
            };
            let formats =
                inline_ops::formats_at(children.children(), *s, *e);
            result = Some(match result {
                None => formats,
                Some(prev) => {
                    prev.into_iter().filter(|t| formats.contains(t)).collect()
                }
            });
        }
        result.unwrap_or_default()
    }

    /// How far backspace deletes from `location`. A block boundary counts
    /// as one.
    pub fn width_before(&self, location: usize) -> usize {
        match self.locate(location) {
            Some((_, 0)) => usize::from(location > 0),
            Some((block, offset)) => self
                .blocks()
                .get(block)
                .and_then(DomNode::as_container)
                .map(|c| inline_ops::width_before(c.children(), offset))
                .unwrap_or(0),
            None => 0,
        }
    }

    /// How far forward delete removes from `location`.
    pub fn width_after(&self, location: usize) -> usize {
        let Some((block, offset)) = self.locate(location) else {
            return 0;
        };
        let Some(container) =
            self.blocks().get(block).and_then(DomNode::as_container)
        else {
            return 0;
        };
        if offset >= container.length() {
            usize::from(block + 1 < self.block_count())
        } else {
            inline_ops::width_after(container.children(), offset)
        }
    }

    pub fn emojis(&self) -> Vec<&EmojiNode> {
        self.blocks().iter().flat_map(DomNode::emojis).collect()
    }

    pub fn emoji_count(&self) -> usize {
        self.emojis().len()
    }

    pub fn for_each_emoji_mut(&mut self, mut f: impl FnMut(&mut EmojiNode)) {
        for block in self.document.children_mut() {
            block.for_each_emoji_mut(&mut f);
        }
    }

    /// Panic if the block structure is broken.
    pub fn explicitly_assert_invariants(&self) {
        for (i, block) in self.blocks().iter().enumerate() {
            let DomNode::Container(c) = block else {
                panic!("top-level node {i} is not a block: {block:?}");
            };
            assert!(c.is_block(), "top-level node {i} is not a block");
            assert!(
                !c.children().iter().any(contains_block),
                "block {i} contains a nested block"
            );
        }
    }

    #[cfg(feature = "assert-invariants")]
    fn assert_invariants(&self) {
        self.explicitly_assert_invariants();
    }

    #[cfg(not(feature = "assert-invariants"))]
    fn assert_invariants(&self) {}
}

fn contains_block(node: &DomNode) -> bool {
    match node {
        DomNode::Container(c) => {
            c.is_block() || c.children().iter().any(contains_block)
        }
        _ => false,
    }
}

fn ends_with_line_break(nodes: &[DomNode]) -> bool {
    match nodes.last() {
        Some(DomNode::LineBreak) => true,
        Some(DomNode::Container(c)) => ends_with_line_break(c.children()),
        _ => false,
    }
}

impl ToHtml for Dom {
    fn fmt_html(&self, buf: &mut String) {
        self.document.fmt_html(buf);
    }
}

impl ToTree for Dom {
    fn to_tree_display(
        &self,
        depth: usize,
        continuous_positions: &mut Vec<usize>,
    ) -> String {
        self.document.to_tree_display(depth, continuous_positions)
    }
}

impl std::fmt::Display for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_html())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::nodes::EmojiKind;

    fn text(s: &str) -> DomNode {
        DomNode::new_text(s)
    }

    fn two_blocks() -> Dom {
        Dom::new(vec![
            DomNode::new_block(vec![text("abc")]),
            DomNode::new_block(vec![
                text("d"),
                DomNode::new_emoji(EmojiNode::new("1", "", EmojiKind::Static)),
            ]),
        ])
    }

    #[test]
    fn length_counts_block_boundaries() {
        let dom = two_blocks();
        assert_eq!(dom.length(), 3 + 1 + 3);
        assert_eq!(dom.block_start(1), 4);
    }

    #[test]
    fn locate_prefers_the_block_ending_at_a_boundary() {
        let dom = two_blocks();
        assert_eq!(dom.locate(0), Some((0, 0)));
        assert_eq!(dom.locate(3), Some((0, 3)));
        assert_eq!(dom.locate(4), Some((1, 0)));
        assert_eq!(dom.locate(7), Some((1, 3)));
        assert_eq!(dom.locate(8), None);
    }

    #[test]
    fn delete_across_blocks_joins_them() {
        let mut dom = two_blocks();
        dom.delete_range(2, 5);
        assert_eq!(
            dom.to_html(),
            r#"<div>ab<img src="" alt="" data-custom-emoji-id="1" width="24" height="24"></div>"#
        );
    }

    #[test]
    fn delete_the_boundary_only() {
        let mut dom = two_blocks();
        dom.delete_range(3, 4);
        assert_eq!(dom.block_count(), 1);
        assert_eq!(dom.length(), 6);
    }

    #[test]
    fn split_block_moves_the_rest_to_a_new_block() {
        let mut dom = Dom::new(vec![DomNode::new_block(vec![
            DomNode::new_formatting(EntityType::Bold, vec![text("abcd")]),
        ])]);
        let caret = dom.split_block(2);
        assert_eq!(caret, 3);
        assert_eq!(dom.to_html(), "<div><b>ab</b></div><div><b>cd</b></div>");
    }

    #[test]
    fn split_at_the_end_makes_an_empty_block() {
        let mut dom = Dom::new(vec![DomNode::new_block(vec![text("ab")])]);
        assert_eq!(dom.split_block(2), 3);
        assert_eq!(dom.to_html(), "<div>ab</div><div><br></div>");
    }

    #[test]
    fn line_break_at_the_end_shows_a_new_line() {
        let mut dom = Dom::new(vec![DomNode::new_block(vec![text("ab")])]);
        assert_eq!(dom.insert_line_break(2), 3);
        assert_eq!(dom.to_html(), "<div>ab<br><br></div>");
        dom.insert_text(3, "c");
        assert_eq!(dom.to_html(), "<div>ab<br>c<br></div>");
    }

    #[test]
    fn line_break_in_the_middle() {
        let mut dom = Dom::new(vec![DomNode::new_block(vec![text("ab")])]);
        assert_eq!(dom.insert_line_break(1), 2);
        assert_eq!(dom.to_html(), "<div>a<br>b</div>");
    }

    #[test]
    fn wrap_range_wraps_each_block() {
        let mut dom = two_blocks();
        let bold = ContainerNode::new_formatting(EntityType::Bold, vec![]);
        assert!(dom.wrap_range(1, 5, &bold));
        assert_eq!(
            dom.to_html(),
            concat!(
                "<div>a<b>bc</b></div>",
                r#"<div><b>d</b><img src="" alt="" data-custom-emoji-id="1" width="24" height="24"></div>"#
            )
        );
        assert_eq!(dom.formats_at(1, 5), vec![EntityType::Bold]);
        assert_eq!(dom.formats_at(0, 5), Vec::<EntityType>::new());
    }

    #[test]
    fn find_link_covering_needs_one_block() {
        let dom = Dom::new(vec![
            DomNode::new_block(vec![DomNode::new_link(
                "https://t.me",
                vec![text("link")],
            )]),
            DomNode::new_block(vec![text("x")]),
        ]);
        assert_eq!(
            dom.find_link_covering(1, 3),
            Some(DomHandle::from_raw(vec![0, 0]))
        );
        assert_eq!(dom.find_link_covering(1, 6), None);
    }

    #[test]
    fn widths_at_block_boundaries() {
        let dom = two_blocks();
        assert_eq!(dom.width_before(4), 1);
        assert_eq!(dom.width_before(0), 0);
        assert_eq!(dom.width_after(3), 1);
        assert_eq!(dom.width_after(7), 0);
        assert_eq!(dom.width_before(7), 2);
    }

    #[test]
    fn normalize_keeps_invariants() {
        let mut dom = Dom::new(vec![
            text("loose"),
            DomNode::new_formatting(
                EntityType::Italic,
                vec![DomNode::new_block(vec![text("x")])],
            ),
        ]);
        dom.normalize();
        dom.explicitly_assert_invariants();
        assert_eq!(dom.to_html(), "<div>loose</div><div><i>x</i></div>");
    }

    #[test]
    fn emptiness() {
        assert!(Dom::new_empty().is_empty());
        assert!(Dom::new(vec![DomNode::new_block(vec![])]).is_empty());
        assert!(!two_blocks().is_empty());
    }
}
