// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Block-aware projection layer.
//!
//! Produces a flat list of [`BlockProjection`]s from the nested DOM tree:
//! one per block, each holding the inline runs of that block with the
//! wrappers above them flattened into an [`AttributeSet`]. The tree is only
//! read; the projection is a view for toolbars and previews that want the
//! post without going through HTML.
//!
//! Offsets are document locations, the same metric as the selection.

use serde::Serialize;

use crate::dom::nodes::{ContainerNodeKind, DomNode, EmojiKind, EmojiNode};
use crate::dom::{Dom, DomHandle};
use crate::EntityType;

/// The formatting applying to a run. Nested wrappers in the DOM are
/// flattened into this struct.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSet {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub blockquote: bool,
    /// Present when the run is inside a link.
    pub link_url: Option<String>,
}

impl AttributeSet {
    fn apply(&mut self, entity_type: EntityType) {
        match entity_type {
            EntityType::Bold => self.bold = true,
            EntityType::Italic => self.italic = true,
            EntityType::Underline => self.underline = true,
            EntityType::Strikethrough => self.strikethrough = true,
            EntityType::Blockquote => self.blockquote = true,
            EntityType::TextLink | EntityType::CustomEmoji => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineRunKind {
    Text {
        text: String,
        attributes: AttributeSet,
    },
    /// A custom emoji, two locations wide.
    #[serde(rename_all = "camelCase")]
    Emoji {
        emoji_id: String,
        media_url: String,
        is_video: bool,
        attributes: AttributeSet,
    },
    LineBreak,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineRun {
    /// Handle of the leaf node the run starts at.
    #[serde(skip)]
    pub node_handle: DomHandle,
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub kind: InlineRunKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockProjection {
    pub block_index: usize,
    /// The block shows as an empty line.
    pub blank: bool,
    pub start: usize,
    /// Exclusive, and not counting the boundary to the next block.
    pub end: usize,
    pub inline_runs: Vec<InlineRun>,
}

impl Dom {
    /// One projection per block, in order.
    ///
    /// Handles in the result go stale on the next structural edit; call
    /// again after every change.
    pub fn get_block_projections(&self) -> Vec<BlockProjection> {
        let mut projections = Vec::with_capacity(self.block_count());
        let mut cursor = 0;
        for (index, block) in self.blocks().iter().enumerate() {
            if index > 0 {
                cursor += 1;
            }
            let start = cursor;
            let mut runs = Vec::new();
            if let DomNode::Container(c) = block {
                let handle = DomHandle::root().child_handle(index);
                for (i, child) in c.children().iter().enumerate() {
                    collect_inline_runs(
                        child,
                        handle.child_handle(i),
                        AttributeSet::default(),
                        &mut cursor,
                        &mut runs,
                    );
                }
            }
            merge_adjacent_runs(&mut runs);
            projections.push(BlockProjection {
                block_index: index,
                blank: block.is_blank(),
                start,
                end: cursor,
                inline_runs: runs,
            });
        }
        projections
    }
}

fn collect_inline_runs(
    node: &DomNode,
    handle: DomHandle,
    inherited: AttributeSet,
    cursor: &mut usize,
    runs: &mut Vec<InlineRun>,
) {
    let start = *cursor;
    match node {
        DomNode::Text(t) => {
            *cursor += t.length();
            runs.push(InlineRun {
                node_handle: handle,
                start,
                end: *cursor,
                kind: InlineRunKind::Text {
                    text: t.data().to_owned(),
                    attributes: inherited,
                },
            });
        }
        DomNode::Emoji(e) => {
            *cursor += EmojiNode::LENGTH;
            runs.push(InlineRun {
                node_handle: handle,
                start,
                end: *cursor,
                kind: InlineRunKind::Emoji {
                    emoji_id: e.emoji_id().to_owned(),
                    media_url: e.media_url().to_owned(),
                    is_video: e.kind() == EmojiKind::Video,
                    attributes: inherited,
                },
            });
        }
        DomNode::LineBreak => {
            *cursor += 1;
            runs.push(InlineRun {
                node_handle: handle,
                start,
                end: *cursor,
                kind: InlineRunKind::LineBreak,
            });
        }
        DomNode::Container(c) => {
            let mut attrs = inherited;
            match c.kind() {
                ContainerNodeKind::Format(entity_type) => attrs.apply(*entity_type),
                ContainerNodeKind::Link(link) => {
                    attrs.link_url = Some(link.href.clone());
                }
                // Blocks and the root never appear inside a block.
                ContainerNodeKind::Block | ContainerNodeKind::Generic => {}
            }
            for (i, child) in c.children().iter().enumerate() {
                collect_inline_runs(
                    child,
                    handle.child_handle(i),
                    attrs.clone(),
                    cursor,
                    runs,
                );
            }
        }
    }
}

/// Merge adjacent text runs with identical attributes.
fn merge_adjacent_runs(runs: &mut Vec<InlineRun>) {
    let mut merged: Vec<InlineRun> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        if let Some(prev) = merged.last_mut() {
            if let (
                InlineRunKind::Text {
                    text,
                    attributes: a1,
                },
                InlineRunKind::Text {
                    text: next_text,
                    attributes: a2,
                },
            ) = (&mut prev.kind, &run.kind)
            {
                if a1 == a2 {
                    text.push_str(next_text);
                    prev.end = run.end;
                    continue;
                }
            }
        }
        merged.push(run);
    }
    *runs = merged;
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::parser::parse;

    fn text_of(run: &InlineRun) -> Option<(&str, &AttributeSet)> {
        match &run.kind {
            InlineRunKind::Text { text, attributes } => {
                Some((text.as_str(), attributes))
            }
            _ => None,
        }
    }

    #[test]
    fn one_projection_per_block_with_boundaries_counted() {
        let dom = parse("<div>ab</div><div><br></div><div>cd</div>").unwrap();
        let projections = dom.get_block_projections();
        assert_that!(projections).has_length(3);
        assert_eq!((projections[0].start, projections[0].end), (0, 2));
        assert_eq!((projections[1].start, projections[1].end), (3, 3));
        assert!(projections[1].blank);
        assert_eq!((projections[2].start, projections[2].end), (4, 6));
    }

    #[test]
    fn nested_wrappers_flatten_into_attributes() {
        let dom = parse(
            r#"<div>a<b>b<a href="https://t.me"><i>c</i></a></b></div>"#,
        )
        .unwrap();
        let runs = &dom.get_block_projections()[0].inline_runs;
        assert_that!(*runs).has_length(3);

        let (text, attrs) = text_of(&runs[2]).unwrap();
        assert_eq!(text, "c");
        assert!(attrs.bold && attrs.italic);
        assert_eq!(attrs.link_url.as_deref(), Some("https://t.me"));
        assert_eq!(runs[2].node_handle.raw(), &[0, 1, 1, 0, 0]);
    }

    #[test]
    fn emoji_and_break_runs() {
        let dom = parse(
            r#"<div>x<img src="u" data-custom-emoji-id="7"><br>y</div>"#,
        )
        .unwrap();
        let runs = &dom.get_block_projections()[0].inline_runs;
        assert!(matches!(
            &runs[1].kind,
            InlineRunKind::Emoji { emoji_id, is_video: false, .. } if emoji_id == "7"
        ));
        assert_eq!((runs[1].start, runs[1].end), (1, 3));
        assert_eq!(runs[2].kind, InlineRunKind::LineBreak);
        assert_eq!((runs[3].start, runs[3].end), (4, 5));
    }

    #[test]
    fn adjacent_runs_with_same_attributes_merge() {
        let dom = Dom::new(vec![DomNode::new_block(vec![
            DomNode::new_formatting(EntityType::Bold, vec![DomNode::new_text("a")]),
            DomNode::new_formatting(EntityType::Italic, vec![]),
            DomNode::new_formatting(EntityType::Bold, vec![DomNode::new_text("b")]),
        ])]);
        let runs = &dom.get_block_projections()[0].inline_runs;
        assert_that!(*runs).has_length(1);
        assert_eq!(text_of(&runs[0]).map(|(t, _)| t), Some("ab"));
        assert_eq!((runs[0].start, runs[0].end), (0, 2));
    }
}
