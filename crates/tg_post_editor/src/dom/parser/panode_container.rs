// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use html5ever::QualName;

use super::PaDomHandle;

/// An element of pasted or stored markup, before it is mapped to a role.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaNodeContainer {
    pub(crate) name: QualName,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<PaDomHandle>,
}

impl PaNodeContainer {
    pub(crate) fn tag(&self) -> &str {
        self.name.local.as_ref()
    }

    /// Attribute lookup. Names are matched without regard to case.
    pub(crate) fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The value of the last `property` declaration in the inline style,
    /// without any `!important`.
    pub(crate) fn style_value(&self, property: &str) -> Option<String> {
        self.get_attr("style")?
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| {
                let value = value.trim();
                value
                    .strip_suffix("!important")
                    .unwrap_or(value)
                    .trim()
                    .to_ascii_lowercase()
            })
            .last()
    }

    /// Whether the inline style gives `property` the keyword `keyword`,
    /// alone or among others (`text-decoration: underline line-through`).
    pub(crate) fn has_style(&self, property: &str, keyword: &str) -> bool {
        self.style_value(property).is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|word| word.eq_ignore_ascii_case(keyword))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::parser::paqual_name;

    fn span(style: &str) -> PaNodeContainer {
        PaNodeContainer {
            name: paqual_name("span"),
            attrs: vec![("STYLE".into(), style.into())],
            children: Vec::new(),
        }
    }

    #[test]
    fn style_values_are_read_from_declarations() {
        let node = span("color: red; font-weight:700;font-style: Italic");
        assert_eq!(node.style_value("font-weight").as_deref(), Some("700"));
        assert_eq!(node.style_value("font-style").as_deref(), Some("italic"));
        assert_eq!(node.style_value("weight"), None);
    }

    #[test]
    fn later_declarations_win() {
        let node = span("font-weight: bold; font-weight: normal !important;");
        assert!(node.has_style("font-weight", "normal"));
        assert!(!node.has_style("font-weight", "bold"));
    }

    #[test]
    fn keywords_can_share_a_declaration() {
        let node = span("text-decoration: underline line-through");
        assert!(node.has_style("text-decoration", "underline"));
        assert!(node.has_style("text-decoration", "line-through"));
        assert!(!node.has_style("text-decoration", "overline"));
    }
}
