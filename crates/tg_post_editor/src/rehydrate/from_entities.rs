// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use tg_custom_emoji::EmojiCatalog;

use crate::dom::nodes::{DomNode, EmojiNode};
use crate::dom::Dom;
use crate::{Entity, EntityType};

const LF: u16 = b'\n' as u16;
const CR: u16 = b'\r' as u16;

/// Build a document from Telegram text and entities.
///
/// Each line of `text` becomes a block, except that lines joined by a
/// formatting entity running over their line ending share one block, with
/// a break between them. Within a block, the text is cut at every entity
/// edge; each piece is then wrapped in the entities covering it, outermost
/// first. Entities that cross each other are split at the crossing.
pub(super) fn dom_from_entities(
    text: &str,
    entities: &[Entity],
    catalog: &EmojiCatalog,
) -> Dom {
    if text.is_empty() {
        return Dom::new_empty();
    }
    let units: Vec<u16> = text.encode_utf16().collect();
    let spans = CheckedSpans::new(entities, &units);

    let blocks = paragraphs(&lines(&units), &spans)
        .into_iter()
        .map(|lines| {
            let paragraph = Paragraph {
                units: &units,
                spans: &spans,
                catalog,
                lines: &lines,
            };
            DomNode::new_block(paragraph.build())
        })
        .collect();

    let mut dom = Dom::new(blocks);
    dom.normalize();
    dom
}

/// `(start, end)` of every line, without its line ending.
fn lines(units: &[u16]) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, unit) in units.iter().enumerate() {
        if *unit == LF {
            let end = if i > start && units[i - 1] == CR { i - 1 } else { i };
            lines.push((start, end));
            start = i + 1;
        }
    }
    lines.push((start, units.len()));
    lines
}

/// Group consecutive lines that a formatting entity runs across: the entity
/// covers the whole line ending and goes on past it.
fn paragraphs(lines: &[(usize, usize)], spans: &CheckedSpans) -> Vec<Vec<(usize, usize)>> {
    let mut paragraphs: Vec<Vec<(usize, usize)>> = Vec::new();
    for (i, &line) in lines.iter().enumerate() {
        let joined = i > 0 && {
            let (line_ending_start, line_ending_end) = (lines[i - 1].1, line.0);
            spans.wrappers.iter().any(|(_, e)| {
                e.offset <= line_ending_start && e.end() > line_ending_end
            })
        };
        match paragraphs.last_mut() {
            Some(paragraph) if joined => paragraph.push(line),
            _ => paragraphs.push(vec![line]),
        }
    }
    paragraphs
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

/// The entities that can be applied, split into wrappers and emoji.
struct CheckedSpans<'e> {
    /// With their index in the original list.
    wrappers: Vec<(usize, &'e Entity)>,
    /// Sorted by offset, never overlapping.
    emoji: Vec<&'e Entity>,
}

impl<'e> CheckedSpans<'e> {
    fn new(entities: &'e [Entity], units: &[u16]) -> Self {
        let mut wrappers = Vec::new();
        let mut emoji: Vec<&Entity> = Vec::new();
        for (index, e) in entities.iter().enumerate() {
            if e.length == 0 || e.end() > units.len() {
                tracing::warn!(
                    index,
                    entity_type = %e.entity_type,
                    offset = e.offset,
                    length = e.length,
                    text_length = units.len(),
                    "skipping entity outside the text"
                );
                continue;
            }
            match e.entity_type {
                EntityType::CustomEmoji => {
                    let crosses_line = units[e.offset..e.end()].contains(&LF);
                    let overlaps = emoji
                        .iter()
                        .any(|o| o.offset < e.end() && e.offset < o.end());
                    if e.length != EmojiNode::LENGTH
                        || e.custom_emoji_id.is_none()
                        || crosses_line
                        || overlaps
                    {
                        tracing::warn!(index, "skipping malformed custom_emoji entity");
                        continue;
                    }
                    emoji.push(e);
                }
                EntityType::TextLink
                    if e.url.as_deref().map_or(true, str::is_empty) =>
                {
                    tracing::warn!(index, "skipping text_link entity without url");
                }
                _ => wrappers.push((index, e)),
            }
        }
        emoji.sort_by_key(|e| e.offset);
        Self { wrappers, emoji }
    }

    /// Outer wrappers first: earlier start, then longer span, then list
    /// order.
    fn priority(&self, wrapper: usize) -> (usize, Reverse<usize>, usize) {
        let (index, e) = self.wrappers[wrapper];
        (e.offset, Reverse(e.length), index)
    }
}

/// A piece of a paragraph with no entity edge inside it: text, an emoji or
/// a line ending.
struct Segment<'e> {
    start: usize,
    end: usize,
    emoji: Option<&'e Entity>,
    /// Indexes into [CheckedSpans::wrappers] of the wrappers over the
    /// segment. Edges never fall inside a segment except where they were
    /// dropped for cutting an emoji or a surrogate pair; the wrapper then
    /// grows to the whole segment.
    active: Vec<usize>,
}

/// The lines that go into one block, as `(start, end)` without their line
/// endings.
struct Paragraph<'a, 'e> {
    units: &'a [u16],
    spans: &'a CheckedSpans<'e>,
    catalog: &'a EmojiCatalog,
    lines: &'a [(usize, usize)],
}

impl<'a, 'e> Paragraph<'a, 'e> {
    fn start(&self) -> usize {
        self.lines.first().map_or(0, |line| line.0)
    }

    fn end(&self) -> usize {
        self.lines.last().map_or(0, |line| line.1)
    }

    /// The line endings inside the paragraph, as `(start, end)`.
    fn line_endings(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.lines.windows(2).map(|pair| (pair[0].1, pair[1].0))
    }

    fn build(&self) -> Vec<DomNode> {
        let segments = self.segments();
        let mut nodes = self.nest(&segments, &mut Vec::new());
        // A closing break does not show, so an empty last line needs one
        // more.
        if self.lines.len() > 1 && self.lines.last().is_some_and(|l| l.0 == l.1) {
            nodes.push(DomNode::new_line_break());
        }
        nodes
    }

    fn segments(&self) -> Vec<Segment<'e>> {
        let line_emoji: Vec<&'e Entity> = self
            .spans
            .emoji
            .iter()
            .copied()
            .filter(|e| e.offset >= self.start() && e.end() <= self.end())
            .collect();

        let (start, end) = (self.start(), self.end());
        let mut bounds = BTreeSet::from([start, end]);
        for (line_ending_start, line_ending_end) in self.line_endings() {
            bounds.insert(line_ending_start);
            bounds.insert(line_ending_end);
        }
        let edges = self
            .spans
            .wrappers
            .iter()
            .flat_map(|(_, e)| [e.offset, e.end()])
            .chain(line_emoji.iter().flat_map(|e| [e.offset, e.end()]));
        for edge in edges {
            if start < edge && edge < end {
                bounds.insert(edge);
            }
        }
        bounds.retain(|&b| {
            let inside_emoji =
                line_emoji.iter().any(|e| e.offset < b && b < e.end());
            let inside_line_ending =
                self.line_endings().any(|(s, e)| s < b && b < e);
            !inside_emoji && !inside_line_ending && !self.splits_surrogate(b)
        });

        let bounds: Vec<usize> = bounds.into_iter().collect();
        bounds
            .windows(2)
            .map(|pair| {
                let (start, end) = (pair[0], pair[1]);
                let active = self
                    .spans
                    .wrappers
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, e))| e.offset < end && start < e.end())
                    .map(|(i, _)| i)
                    .collect();
                let emoji = line_emoji
                    .iter()
                    .copied()
                    .find(|e| e.offset == start && e.end() == end);
                Segment {
                    start,
                    end,
                    emoji,
                    active,
                }
            })
            .collect()
    }

    fn splits_surrogate(&self, at: usize) -> bool {
        at > 0
            && at < self.units.len()
            && is_high_surrogate(self.units[at - 1])
            && is_low_surrogate(self.units[at])
    }

    /// Wrap `segments` in every active wrapper not in `opened`, highest
    /// priority outermost, each wrapper spanning as many consecutive
    /// segments as it covers.
    fn nest(&self, segments: &[Segment<'e>], opened: &mut Vec<usize>) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        let mut k = 0;
        while k < segments.len() {
            let next = segments[k]
                .active
                .iter()
                .copied()
                .filter(|w| !opened.contains(w))
                .min_by_key(|&w| self.spans.priority(w));
            let Some(wrapper) = next else {
                nodes.push(self.leaf(&segments[k]));
                k += 1;
                continue;
            };
            let run = segments[k..]
                .iter()
                .take_while(|s| s.active.contains(&wrapper))
                .count();
            opened.push(wrapper);
            let children = self.nest(&segments[k..k + run], opened);
            opened.pop();
            nodes.push(self.wrap(wrapper, children));
            k += run;
        }
        nodes
    }

    fn wrap(&self, wrapper: usize, children: Vec<DomNode>) -> DomNode {
        let (_, entity) = self.spans.wrappers[wrapper];
        match (entity.entity_type, &entity.url) {
            (EntityType::TextLink, Some(url)) => DomNode::new_link(url, children),
            (entity_type, _) => DomNode::new_formatting(entity_type, children),
        }
    }

    fn leaf(&self, segment: &Segment) -> DomNode {
        if self
            .line_endings()
            .any(|(s, e)| s == segment.start && e == segment.end)
        {
            return DomNode::new_line_break();
        }
        let text = String::from_utf16_lossy(&self.units[segment.start..segment.end]);
        match segment.emoji.and_then(|e| e.custom_emoji_id.as_deref()) {
            Some(id) => DomNode::new_emoji(self.emoji_node(id, &text)),
            None => DomNode::new_text(&text),
        }
    }

    fn emoji_node(&self, id: &str, text: &str) -> EmojiNode {
        match self.catalog.get(id) {
            Some(emoji) => EmojiNode::from_custom_emoji(emoji),
            None => {
                tracing::debug!(emoji_id = id, "custom emoji not in catalog");
                EmojiNode::placeholder(id).with_alt(text)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use tg_custom_emoji::CustomEmoji;

    use super::*;
    use crate::dom::to_html::ToHtml;

    fn html(text: &str, entities: &[Entity]) -> String {
        let catalog =
            EmojiCatalog::new([CustomEmoji::new("e1", "cat", "https://cdn/cat.png")]);
        dom_from_entities(text, entities, &catalog).to_html()
    }

    #[test]
    fn empty_text_is_an_empty_document() {
        assert_eq!(html("", &[]), "");
    }

    #[test]
    fn lines_become_blocks() {
        assert_eq!(
            html("a\n\nb", &[]),
            "<div>a</div><div><br></div><div>b</div>"
        );
        assert_eq!(html("a\r\nb\n", &[]), "<div>a</div><div>b</div><div><br></div>");
    }

    #[test]
    fn emoji_and_bold() {
        assert_eq!(
            html(
                "Hi \u{1F98F} there",
                &[
                    Entity::custom_emoji(3, "e1"),
                    Entity::new(EntityType::Bold, 6, 5),
                ]
            ),
            r#"<div>Hi <img src="https://cdn/cat.png" alt="cat" data-custom-emoji-id="e1" width="24" height="24"> <b>there</b></div>"#
        );
    }

    #[test]
    fn unknown_emoji_is_an_empty_placeholder() {
        assert_eq!(
            html("\u{1F98F}", &[Entity::custom_emoji(0, "nope")]),
            "<div><img src=\"\" alt=\"\u{1F98F}\" data-custom-emoji-id=\"nope\" width=\"24\" height=\"24\"></div>"
        );
    }

    #[test]
    fn wrapper_around_an_emoji() {
        let out = html(
            "x\u{1F98F}y",
            &[
                Entity::new(EntityType::Italic, 0, 4),
                Entity::custom_emoji(1, "e1"),
            ],
        );
        assert!(out.starts_with("<div><i>x<img "));
        assert!(out.ends_with(">y</i></div>"));
    }

    #[test]
    fn longer_span_is_outermost() {
        assert_eq!(
            html(
                "abc",
                &[
                    Entity::new(EntityType::Italic, 0, 1),
                    Entity::text_link(0, 3, "https://t.me"),
                ]
            ),
            r#"<div><a href="https://t.me"><i>a</i>bc</a></div>"#
        );
    }

    #[test]
    fn crossing_spans_are_split() {
        assert_eq!(
            html(
                "abcd",
                &[
                    Entity::new(EntityType::Bold, 0, 3),
                    Entity::new(EntityType::Italic, 1, 3),
                ]
            ),
            "<div><b>a<i>bc</i></b><i>d</i></div>"
        );
    }

    #[test]
    fn spans_over_a_line_ending_keep_their_lines_together() {
        assert_eq!(
            html("one\ntwo", &[Entity::new(EntityType::Underline, 2, 3)]),
            "<div>on<u>e<br>t</u>wo</div>"
        );
    }

    #[test]
    fn multi_line_blockquote_is_one_wrapper() {
        assert_eq!(
            html(
                "q1\nq2\nafter",
                &[Entity::new(EntityType::Blockquote, 0, 5)]
            ),
            "<div><blockquote>q1<br>q2</blockquote></div><div>after</div>"
        );
    }

    #[test]
    fn crlf_line_endings_inside_a_span_are_one_break() {
        assert_eq!(
            html("a\r\nb", &[Entity::new(EntityType::Bold, 0, 4)]),
            "<div><b>a<br>b</b></div>"
        );
    }

    #[test]
    fn empty_lines_inside_a_span_stay_empty_lines() {
        assert_eq!(
            html("a\n\nb", &[Entity::new(EntityType::Italic, 0, 4)]),
            "<div><i>a<br><br>b</i></div>"
        );
        assert_eq!(
            html("a\n\nb", &[Entity::new(EntityType::Italic, 0, 2)]),
            "<div><i>a</i></div><div><br></div><div>b</div>"
        );
    }

    #[test]
    fn span_ending_at_an_empty_line_keeps_it_visible() {
        assert_eq!(
            html("a\n\nb", &[Entity::new(EntityType::Bold, 0, 3)]),
            "<div><b>a<br></b><br></div><div>b</div>"
        );
    }

    #[test]
    fn invalid_entities_are_skipped() {
        let link_without_url = Entity::new(EntityType::TextLink, 0, 1);
        assert_eq!(
            html(
                "abc",
                &[
                    Entity::new(EntityType::Bold, 2, 10),
                    link_without_url,
                    Entity::new(EntityType::Italic, 1, 0),
                    Entity {
                        length: 3,
                        ..Entity::custom_emoji(0, "e1")
                    },
                ]
            ),
            "<div>abc</div>"
        );
    }

    #[test]
    fn edges_inside_a_surrogate_pair_are_ignored() {
        // The bold edge at 1 would cut the rhino in half.
        assert_eq!(
            html("\u{1F98F}a", &[Entity::new(EntityType::Bold, 1, 2)]),
            "<div><b>\u{1F98F}a</b></div>"
        );
    }
}
