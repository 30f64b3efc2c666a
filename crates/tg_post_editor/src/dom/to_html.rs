// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::dom::nodes::{
    ContainerNode, ContainerNodeKind, DomNode, EmojiKind, EmojiNode, TextNode,
};

/// Rendered size of a custom emoji, in CSS pixels.
const EMOJI_SIZE: &str = "24";

pub trait ToHtml {
    fn fmt_html(&self, buf: &mut String);

    fn to_html(&self) -> String {
        let mut buf = String::new();
        self.fmt_html(&mut buf);
        buf
    }
}

impl ToHtml for DomNode {
    fn fmt_html(&self, buf: &mut String) {
        match self {
            DomNode::Container(c) => c.fmt_html(buf),
            DomNode::Text(t) => t.fmt_html(buf),
            DomNode::LineBreak => buf.push_str("<br>"),
            DomNode::Emoji(e) => e.fmt_html(buf),
        }
    }
}

impl ToHtml for TextNode {
    fn fmt_html(&self, buf: &mut String) {
        buf.push_str(&encode_text(self.data()));
    }
}

impl ToHtml for ContainerNode {
    fn fmt_html(&self, buf: &mut String) {
        let tag = self.tag();
        match self.kind() {
            ContainerNodeKind::Generic => {
                fmt_children(self.children(), buf);
                return;
            }
            ContainerNodeKind::Block if self.children().is_empty() => {
                // An empty line needs a break to keep its height.
                buf.push_str("<div><br></div>");
                return;
            }
            ContainerNodeKind::Link(attrs) => {
                buf.push_str("<a href=\"");
                buf.push_str(&encode_double_quoted_attribute(&attrs.href));
                buf.push('"');
                if let Some(target) = &attrs.target {
                    push_attr(buf, "target", target);
                }
                if let Some(rel) = &attrs.rel {
                    push_attr(buf, "rel", rel);
                }
                buf.push('>');
            }
            ContainerNodeKind::Block | ContainerNodeKind::Format(_) => {
                buf.push('<');
                buf.push_str(tag);
                buf.push('>');
            }
        }
        fmt_children(self.children(), buf);
        buf.push_str("</");
        buf.push_str(tag);
        buf.push('>');
    }
}

impl ToHtml for EmojiNode {
    fn fmt_html(&self, buf: &mut String) {
        match self.kind() {
            EmojiKind::Static => {
                buf.push_str("<img");
                push_attr(buf, "src", self.media_url());
                push_attr(buf, "alt", self.alt());
                push_attr(buf, "data-custom-emoji-id", self.emoji_id());
                push_attr(buf, "width", EMOJI_SIZE);
                push_attr(buf, "height", EMOJI_SIZE);
                buf.push('>');
            }
            EmojiKind::Video => {
                buf.push_str("<video");
                push_attr(buf, "src", self.media_url());
                buf.push_str(" autoplay loop muted playsinline");
                push_attr(buf, "width", EMOJI_SIZE);
                push_attr(buf, "height", EMOJI_SIZE);
                push_attr(buf, "data-custom-emoji-id", self.emoji_id());
                buf.push_str("></video>");
            }
        }
    }
}

fn fmt_children(children: &[DomNode], buf: &mut String) {
    for child in children {
        child.fmt_html(buf);
    }
}

fn push_attr(buf: &mut String, name: &str, value: &str) {
    buf.push(' ');
    buf.push_str(name);
    buf.push_str("=\"");
    buf.push_str(&encode_double_quoted_attribute(value));
    buf.push('"');
}
