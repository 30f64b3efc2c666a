// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::{ContainerNode, ContainerNodeKind, DomNode};

/// A debugging view of a node and its descendants, one node per line.
pub trait ToTree {
    fn to_tree(&self) -> String {
        self.to_tree_display(0, &mut Vec::new())
    }

    /// `continuous_positions` holds the depths at which a sibling still
    /// follows, so the vertical line keeps going there.
    fn to_tree_display(
        &self,
        depth: usize,
        continuous_positions: &mut Vec<usize>,
    ) -> String;

    fn tree_line(
        &self,
        description: &str,
        depth: usize,
        continuous_positions: &[usize],
    ) -> String {
        let mut line = String::new();
        for i in 0..depth {
            let last = i + 1 == depth;
            let continues = continuous_positions.contains(&i);
            line.push_str(match (last, continues) {
                (true, true) => "├>",
                (true, false) => "└>",
                (false, true) => "│ ",
                (false, false) => "  ",
            });
        }
        line.push_str(description);
        line.push('\n');
        line
    }
}

impl ToTree for DomNode {
    fn to_tree_display(
        &self,
        depth: usize,
        continuous_positions: &mut Vec<usize>,
    ) -> String {
        match self {
            DomNode::Container(c) => c.to_tree_display(depth, continuous_positions),
            DomNode::Text(t) => self.tree_line(
                &format!("\"{}\"", t.data()),
                depth,
                continuous_positions,
            ),
            DomNode::LineBreak => {
                self.tree_line("br", depth, continuous_positions)
            }
            DomNode::Emoji(e) => self.tree_line(
                &format!("emoji {}", e.emoji_id()),
                depth,
                continuous_positions,
            ),
        }
    }
}

impl ToTree for ContainerNode {
    fn to_tree_display(
        &self,
        depth: usize,
        continuous_positions: &mut Vec<usize>,
    ) -> String {
        let description = match self.kind() {
            ContainerNodeKind::Link(attrs) => format!("a \"{}\"", attrs.href),
            _ => self.tag().to_owned(),
        };
        let mut tree = self.tree_line(&description, depth, continuous_positions);
        let count = self.children().len();
        for (i, child) in self.children().iter().enumerate() {
            let has_next = i + 1 < count;
            if has_next {
                continuous_positions.push(depth);
            }
            tree.push_str(&child.to_tree_display(depth + 1, continuous_positions));
            if has_next {
                continuous_positions.pop();
            }
        }
        tree
    }
}
