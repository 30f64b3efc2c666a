// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use url::Url;

use crate::EntityType;

/// The formatting tags a selection can be wrapped in.
///
/// Parsing accepts the usual HTML aliases (`strong`, `em`, `del`, ...);
/// displaying gives the tag the editor writes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum WrapTag {
    #[strum(to_string = "b", serialize = "strong")]
    Bold,
    #[strum(to_string = "i", serialize = "em")]
    Italic,
    #[strum(to_string = "u", serialize = "ins")]
    Underline,
    #[strum(to_string = "s", serialize = "strike", serialize = "del")]
    Strikethrough,
    #[strum(to_string = "a")]
    Link,
    #[strum(to_string = "blockquote")]
    Blockquote,
}

impl WrapTag {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Bold => EntityType::Bold,
            Self::Italic => EntityType::Italic,
            Self::Underline => EntityType::Underline,
            Self::Strikethrough => EntityType::Strikethrough,
            Self::Link => EntityType::TextLink,
            Self::Blockquote => EntityType::Blockquote,
        }
    }

    pub fn from_entity_type(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Bold => Some(Self::Bold),
            EntityType::Italic => Some(Self::Italic),
            EntityType::Underline => Some(Self::Underline),
            EntityType::Strikethrough => Some(Self::Strikethrough),
            EntityType::TextLink => Some(Self::Link),
            EntityType::Blockquote => Some(Self::Blockquote),
            EntityType::CustomEmoji => None,
        }
    }
}

/// A key-value attribute pair passed alongside a [`WrapTag`], e.g. the
/// `href` of a link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }

    pub(crate) fn find<'a>(attrs: &'a [Attribute], key: &str) -> Option<&'a str> {
        attrs
            .iter()
            .find(|a| a.key.eq_ignore_ascii_case(key))
            .map(|a| a.value.as_str())
    }
}

const KNOWN_SCHEMES: [&str; 6] = ["http", "https", "mailto", "tg", "tel", "ftp"];

/// Turn what a user typed into the link dialog into an href.
///
/// Bare email addresses get `mailto:`, scheme-less hosts get `https://`.
/// Anything else is kept as typed.
pub(crate) fn normalize_link_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if EmailAddress::is_valid(url) {
        return format!("mailto:{url}");
    }
    if let Ok(parsed) = Url::parse(url) {
        if KNOWN_SCHEMES.contains(&parsed.scheme()) {
            return url.to_owned();
        }
    }
    let with_scheme = format!("https://{url}");
    match Url::parse(&with_scheme) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| h.contains('.')) => {
            with_scheme
        }
        _ => url.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_tag_aliases() {
        assert_eq!(WrapTag::from_str("strong").unwrap(), WrapTag::Bold);
        assert_eq!(WrapTag::from_str("EM").unwrap(), WrapTag::Italic);
        assert_eq!(WrapTag::from_str("del").unwrap(), WrapTag::Strikethrough);
        assert_eq!(WrapTag::from_str("a").unwrap(), WrapTag::Link);
        assert!(WrapTag::from_str("marquee").is_err());
    }

    #[test]
    fn displays_canonical_tag() {
        assert_eq!(WrapTag::Bold.to_string(), "b");
        assert_eq!(WrapTag::Strikethrough.to_string(), "s");
        assert_eq!(WrapTag::Blockquote.to_string(), "blockquote");
    }

    #[test]
    fn link_maps_to_text_link() {
        assert_eq!(WrapTag::Link.entity_type(), EntityType::TextLink);
        assert_eq!(
            WrapTag::from_entity_type(EntityType::CustomEmoji),
            None
        );
    }

    #[test]
    fn urls_are_normalized() {
        assert_eq!(normalize_link_url("https://t.me/x"), "https://t.me/x");
        assert_eq!(normalize_link_url(" t.me/durov "), "https://t.me/durov");
        assert_eq!(
            normalize_link_url("someone@example.com"),
            "mailto:someone@example.com"
        );
        assert_eq!(normalize_link_url("tg://resolve?domain=x"), "tg://resolve?domain=x");
        assert_eq!(normalize_link_url("not a url"), "not a url");
        assert_eq!(normalize_link_url("   "), "");
    }
}
