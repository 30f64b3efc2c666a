// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Dom to wire conversion: the flat `text`, its Telegram `entities` and the
//! block-normalized `html`.

use std::cmp::Reverse;

use widestring::Utf16String;

use crate::dom::nodes::{ContainerNode, ContainerNodeKind, DomNode, EmojiNode};
use crate::dom::to_html::ToHtml;
use crate::dom::Dom;
use crate::{
    Entity, EntityType, SerializedResult, SerializerConfig, WhitespacePolicy,
};

/// Stands in for every custom emoji in `text`. Two UTF-16 code units wide,
/// like the entity that points at it.
pub const EMOJI_PLACEHOLDER: &str = "\u{1F98F}";

const LF: u16 = b'\n' as u16;
const CR: u16 = b'\r' as u16;

/// Serialize `dom` with the given policies.
pub fn serialize(dom: &Dom, config: &SerializerConfig) -> SerializedResult {
    Serializer::new(*config).serialize(dom)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Serializer {
    config: SerializerConfig,
}

impl Serializer {
    pub fn new(config: SerializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Produce the wire form of `dom`. The document is normalized on a copy,
    /// so the caller's tree and any selection over it are left alone.
    ///
    /// A break at the very end of a block does not show, so it adds no
    /// newline: `<div>a<br></div>` is the line `a`, and `<div>a<br><br></div>`
    /// is `a` followed by an empty line.
    pub fn serialize(&self, dom: &Dom) -> SerializedResult {
        let mut dom = dom.clone();
        dom.normalize();
        let html = dom.to_html();

        let mut state = SerializerState::new(&self.config);
        for (i, block) in dom.blocks().iter().enumerate() {
            if i > 0 {
                state.push_newline();
            }
            if block.is_blank() {
                // One line per explicit break, at least one, the boundary
                // just pushed being the first.
                let lines = block.count_line_breaks().max(1);
                for _ in 1..lines {
                    state.push_newline();
                }
            } else if let DomNode::Container(container) = block {
                let mut container = container.clone();
                drop_trailing_break(container.children_mut());
                state.walk_children(&container);
            }
        }

        let SerializerState { text, mut entities, .. } = state;
        entities.sort_by_key(|e| (e.offset, Reverse(e.length)));
        for entity in &mut entities {
            entity.strip_irrelevant_fields();
        }

        tracing::trace!(
            blocks = dom.block_count(),
            entities = entities.len(),
            "serialized document"
        );

        SerializedResult {
            html,
            text: text.to_string(),
            entities,
        }
    }
}

/// Remove the last break of a block's content, if that is what it ends
/// with, along with any wrapper left empty by it.
fn drop_trailing_break(nodes: &mut Vec<DomNode>) -> bool {
    if matches!(nodes.last(), Some(DomNode::LineBreak)) {
        nodes.pop();
        return true;
    }
    let dropped = match nodes.last_mut() {
        Some(DomNode::Container(c)) => drop_trailing_break(c.children_mut()),
        _ => false,
    };
    if dropped
        && matches!(nodes.last(), Some(DomNode::Container(c)) if c.children().is_empty())
    {
        nodes.pop();
    }
    dropped
}

struct SerializerState<'a> {
    config: &'a SerializerConfig,
    text: Utf16String,
    entities: Vec<Entity>,
}

impl<'a> SerializerState<'a> {
    fn new(config: &'a SerializerConfig) -> Self {
        Self {
            config,
            text: Utf16String::new(),
            entities: Vec::new(),
        }
    }

    fn offset(&self) -> usize {
        self.text.len()
    }

    fn push_newline(&mut self) {
        self.text.push_str(self.config.newline.as_str());
    }

    fn walk_children(&mut self, container: &ContainerNode) {
        for child in container.children() {
            self.walk(child);
        }
    }

    fn walk(&mut self, node: &DomNode) {
        match node {
            DomNode::Text(text) => self.push_text(text.data()),
            DomNode::LineBreak => self.push_newline(),
            DomNode::Emoji(emoji) => self.push_emoji(emoji),
            DomNode::Container(container) => self.push_container(container),
        }
    }

    fn push_text(&mut self, data: &str) {
        if self.config.whitespace == WhitespacePolicy::SkipWhitespaceOnly
            && data.chars().all(char::is_whitespace)
        {
            return;
        }
        for c in data.chars() {
            match c {
                '\u{A0}' => self.text.push(' '),
                '\n' => self.push_newline(),
                '\r' => {}
                c => self.text.push(c),
            }
        }
    }

    fn push_emoji(&mut self, emoji: &EmojiNode) {
        let offset = self.offset();
        self.text.push_str(EMOJI_PLACEHOLDER);
        self.entities
            .push(Entity::custom_emoji(offset, emoji.emoji_id()));
    }

    fn push_container(&mut self, container: &ContainerNode) {
        let url = match container.kind() {
            ContainerNodeKind::Link(attrs) => Some(attrs.href.as_str()),
            _ => None,
        };
        let Some(entity_type) = container.entity_type() else {
            self.walk_children(container);
            return;
        };

        // Outer wrappers come before the wrappers nested inside them.
        let index = self.entities.len();
        let start = self.offset();
        self.walk_children(container);
        let length = self.trimmed_end(start) - start;

        if length == 0 {
            return;
        }
        let entity = match (entity_type, url) {
            (EntityType::TextLink, Some(url)) if !url.is_empty() => {
                Entity::text_link(start, length, url)
            }
            (EntityType::TextLink, _) => return,
            (entity_type, _) => Entity::new(entity_type, start, length),
        };
        self.entities.insert(index, entity);
    }

    /// The end of the text written since `start`, minus trailing newlines.
    fn trimmed_end(&self, start: usize) -> usize {
        let units = self.text.as_slice();
        let mut end = units.len();
        while end > start && matches!(units[end - 1], LF | CR) {
            end -= 1;
        }
        end
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;
    use crate::dom::parser::parse;
    use crate::{EmojiKind, NewlineStyle};

    fn ser(html: &str) -> SerializedResult {
        serialize(&parse(html).unwrap(), &SerializerConfig::default())
    }

    fn ser_with(html: &str, config: SerializerConfig) -> SerializedResult {
        serialize(&parse(html).unwrap(), &config)
    }

    fn emoji(id: &str) -> DomNode {
        DomNode::new_emoji(EmojiNode::new(
            id,
            &format!("https://cdn/{id}.png"),
            EmojiKind::Static,
        ))
    }

    #[test]
    fn empty_document_serializes_to_nothing() {
        let result = serialize(&Dom::new_empty(), &SerializerConfig::default());
        assert_eq!(result, SerializedResult::default());
    }

    #[test]
    fn emoji_and_bold_after_it() {
        let dom = Dom::new(vec![DomNode::new_block(vec![
            DomNode::new_text("Hi "),
            emoji("e1"),
            DomNode::new_text(" "),
            DomNode::new_formatting(
                EntityType::Bold,
                vec![DomNode::new_text("there")],
            ),
        ])]);
        let result = serialize(&dom, &SerializerConfig::default());
        assert_eq!(result.text, "Hi \u{1F98F} there");
        assert_eq!(
            result.entities,
            vec![
                Entity::custom_emoji(3, "e1"),
                Entity::new(EntityType::Bold, 6, 5),
            ]
        );
        assert_that!(result.validate()).is_ok();
    }

    #[test]
    fn blocks_are_joined_by_one_newline() {
        let result = ser("<div>a</div><div>b</div><div>c</div>");
        assert_eq!(result.text, "a\nb\nc");
        assert_eq!(result.html, "<div>a</div><div>b</div><div>c</div>");
    }

    #[test]
    fn blank_block_is_one_empty_line() {
        assert_eq!(ser("<div>a</div><div><br></div><div>b</div>").text, "a\n\nb");
        assert_eq!(ser("<div>a</div><div> </div><div>b</div>").text, "a\n\nb");
        assert_eq!(ser("<div><br></div><div>b</div>").text, "\nb");
    }

    #[test]
    fn blank_block_with_several_breaks() {
        assert_eq!(
            ser("<div>a</div><div><br><br></div><div>b</div>").text,
            "a\n\n\nb"
        );
    }

    #[test]
    fn break_at_the_end_of_a_block_does_not_show() {
        assert_eq!(ser("<div>a<br><br></div><div>b</div>").text, "a\n\nb");
        assert_eq!(ser("<div>a<br></div><div>b</div>").text, "a\nb");
        assert_eq!(ser("<div>a<br>b</div><div>c</div>").text, "a\nb\nc");
        assert_eq!(ser("<div>a<br>b<br></div>").text, "a\nb");
    }

    #[test]
    fn trailing_break_inside_a_wrapper_does_not_show() {
        let result = ser("<div><blockquote>a<br>b<br></blockquote></div>");
        assert_eq!(result.text, "a\nb");
        assert_eq!(
            result.entities,
            vec![Entity::new(EntityType::Blockquote, 0, 3)]
        );
        assert_eq!(
            result.html,
            "<div><blockquote>a<br>b<br></blockquote></div>"
        );
    }

    #[test]
    fn stray_inline_content_gets_its_own_block() {
        let dom = Dom::new(vec![DomNode::new_text("loose")]);
        let result = serialize(&dom, &SerializerConfig::default());
        assert_eq!(result.html, "<div>loose</div>");
        assert_eq!(result.text, "loose");
    }

    #[test]
    fn wrapper_span_does_not_cover_trailing_breaks() {
        let result = ser("<div><b>a<br></b>b</div>");
        assert_eq!(result.text, "a\nb");
        assert_eq!(result.entities, vec![Entity::new(EntityType::Bold, 0, 1)]);
    }

    #[test]
    fn wrapper_around_only_a_break_is_dropped() {
        let result = ser("<div>a<i><br></i>b</div>");
        assert_eq!(result.text, "a\nb");
        assert_that!(result.entities).is_empty();
    }

    #[test]
    fn nested_wrappers_are_sorted_outer_first() {
        let result =
            ser(r#"<div>x <a href="https://t.me"><b>bold</b> link</a></div>"#);
        assert_eq!(result.text, "x bold link");
        assert_eq!(
            result.entities,
            vec![
                Entity::text_link(2, 9, "https://t.me"),
                Entity::new(EntityType::Bold, 2, 4),
            ]
        );
    }

    #[test]
    fn link_without_href_has_no_entity() {
        let dom = Dom::new(vec![DomNode::new_block(vec![DomNode::new_link(
            "",
            vec![DomNode::new_text("x")],
        )])]);
        let result = serialize(&dom, &SerializerConfig::default());
        assert_eq!(result.text, "x");
        assert_that!(result.entities).is_empty();
    }

    #[test]
    fn entities_across_blocks_count_the_join() {
        let result = ser("<div><b>one</b></div><div><i>two</i></div>");
        assert_eq!(
            result.entities,
            vec![
                Entity::new(EntityType::Bold, 0, 3),
                Entity::new(EntityType::Italic, 4, 3),
            ]
        );
    }

    #[test]
    fn crlf_newlines_count_two_units() {
        let config = SerializerConfig::default().with_newline(NewlineStyle::CrLf);
        let result =
            ser_with("<div><b>x</b></div><div>a<br><i>y</i></div>", config);
        assert_eq!(result.text, "x\r\na\r\ny");
        assert_eq!(
            result.entities,
            vec![
                Entity::new(EntityType::Bold, 0, 1),
                Entity::new(EntityType::Italic, 6, 1),
            ]
        );
    }

    #[test]
    fn whitespace_policy_changes_offsets() {
        let html = "<div><b>a</b> <i>b</i></div>";
        let preserved = ser(html);
        assert_eq!(preserved.text, "a b");
        assert_eq!(preserved.entities[1], Entity::new(EntityType::Italic, 2, 1));

        let skipped = ser_with(
            html,
            SerializerConfig::default()
                .with_whitespace(WhitespacePolicy::SkipWhitespaceOnly),
        );
        assert_eq!(skipped.text, "ab");
        assert_eq!(skipped.entities[1], Entity::new(EntityType::Italic, 1, 1));
    }

    #[test]
    fn non_breaking_spaces_become_spaces() {
        assert_eq!(ser("<div>a&nbsp;b</div>").text, "a b");
    }

    #[test]
    fn one_placeholder_per_emoji() {
        let dom = Dom::new(vec![
            DomNode::new_block(vec![emoji("1"), emoji("2")]),
            DomNode::new_block(vec![DomNode::new_formatting(
                EntityType::Italic,
                vec![emoji("3")],
            )]),
        ]);
        let result = serialize(&dom, &SerializerConfig::default());
        assert_eq!(result.text.matches(EMOJI_PLACEHOLDER).count(), 3);
        assert_eq!(
            result.entities,
            vec![
                Entity::custom_emoji(0, "1"),
                Entity::custom_emoji(2, "2"),
                Entity::new(EntityType::Italic, 5, 2),
                Entity::custom_emoji(5, "3"),
            ]
        );
    }

    #[test]
    fn serializing_twice_gives_the_same_result() {
        let dom = parse(
            r#"<div>a <b>b</b></div><div><br></div><div><a href="https://x.org">c</a></div>"#,
        )
        .unwrap();
        let serializer = Serializer::default();
        assert_eq!(serializer.serialize(&dom), serializer.serialize(&dom));
    }
}
