// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Loading stored posts back into an editable [Dom].

mod from_entities;

use once_cell::sync::Lazy;
use regex::Regex;
use tg_custom_emoji::EmojiCatalog;

use crate::dom::parser::parse_lenient;
use crate::dom::Dom;
use crate::{Entity, SerializedResult};

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<meta[^>]*>").expect("valid meta regex"));

/// Rebuild a document from stored `html`, resolving emoji against `catalog`.
pub fn rehydrate_html(html: &str, catalog: &EmojiCatalog) -> Dom {
    Rehydrator::new(catalog).from_html(html)
}

/// Rebuild a document from `text` and its Telegram `entities`.
pub fn rehydrate_entities(
    text: &str,
    entities: &[Entity],
    catalog: &EmojiCatalog,
) -> Dom {
    Rehydrator::new(catalog).from_entities(text, entities)
}

/// Builds documents from the wire forms, looking custom emoji up in one
/// catalog. Unknown ids never fail a load: the emoji keeps its id and
/// renders as an empty image.
#[derive(Clone, Copy, Debug)]
pub struct Rehydrator<'a> {
    catalog: &'a EmojiCatalog,
}

impl<'a> Rehydrator<'a> {
    pub fn new(catalog: &'a EmojiCatalog) -> Self {
        Self { catalog }
    }

    /// Malformed markup is recovered the way a browser would, never
    /// rejected.
    pub fn from_html(&self, html: &str) -> Dom {
        let html = META_TAG.replace_all(html, "");
        let mut dom = parse_lenient(&html);
        self.resolve_emoji(&mut dom);
        dom
    }

    pub fn from_entities(&self, text: &str, entities: &[Entity]) -> Dom {
        from_entities::dom_from_entities(text, entities, self.catalog)
    }

    /// `html` when there is any, `text` and `entities` otherwise.
    pub fn from_serialized(&self, serialized: &SerializedResult) -> Dom {
        if serialized.html.trim().is_empty() {
            self.from_entities(&serialized.text, &serialized.entities)
        } else {
            self.from_html(&serialized.html)
        }
    }

    fn resolve_emoji(&self, dom: &mut Dom) {
        dom.for_each_emoji_mut(|emoji| {
            if !emoji.resolve(self.catalog) {
                tracing::debug!(
                    emoji_id = emoji.emoji_id(),
                    placeholder = emoji.is_placeholder(),
                    "custom emoji not in catalog"
                );
            }
        });
    }
}
