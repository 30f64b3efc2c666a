// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::{ContainerNode, ContainerNodeKind, DomNode};
use crate::{
    Attribute, DomHandle, EditorModel, EditorUpdate, EntityType,
    LinkAttributes, WrapTag,
};

impl EditorModel {
    pub fn bold(&mut self) -> EditorUpdate {
        self.toggle_format(WrapTag::Bold)
    }

    pub fn italic(&mut self) -> EditorUpdate {
        self.toggle_format(WrapTag::Italic)
    }

    pub fn underline(&mut self) -> EditorUpdate {
        self.toggle_format(WrapTag::Underline)
    }

    pub fn strike_through(&mut self) -> EditorUpdate {
        self.toggle_format(WrapTag::Strikethrough)
    }

    pub fn quote(&mut self) -> EditorUpdate {
        self.toggle_format(WrapTag::Blockquote)
    }

    fn toggle_format(&mut self, tag: WrapTag) -> EditorUpdate {
        if self.active_formats().contains(&tag.entity_type()) {
            self.unwrap_selection(tag)
        } else {
            self.wrap_selection(tag, &[])
        }
    }

    /// Wrap the selection in `tag`. The caret ends up just after the
    /// wrapped content.
    ///
    /// Links never nest: with the selection inside one link, that link gets
    /// the new attributes; otherwise links inside the selection are
    /// removed before wrapping. A collapsed selection is left alone, unless
    /// it sits inside a link being retargeted.
    pub fn wrap_selection(
        &mut self,
        tag: WrapTag,
        attributes: &[Attribute],
    ) -> EditorUpdate {
        let (start, end) = self.selection_range();
        if tag == WrapTag::Link {
            if let Some(link) = self.dom.find_link_covering(start, end) {
                return self.retarget_link(&link, attributes);
            }
        }
        if start == end {
            tracing::debug!(%tag, "nothing selected to wrap");
            return EditorUpdate::keep();
        }

        let wrapper = ContainerNode::new_wrapper(tag, attributes);
        if wrapper.link_attributes().is_some_and(|a| a.href.is_empty()) {
            tracing::debug!("not wrapping in a link without a target");
            return EditorUpdate::keep();
        }
        if !self.dom.wrap_range(start, end, &wrapper) {
            return EditorUpdate::keep();
        }
        self.after_edit(end)
    }

    fn retarget_link(
        &mut self,
        link: &DomHandle,
        attributes: &[Attribute],
    ) -> EditorUpdate {
        let attributes = LinkAttributes::from_attributes(attributes);
        if attributes.href.is_empty() {
            self.dom.replace_node_with_its_children(link);
        } else if let Some(container) = self
            .dom
            .lookup_node_mut(link)
            .and_then(DomNode::as_container_mut)
        {
            container.set_link_attributes(attributes);
        }
        self.dom.normalize();
        self.create_update_replace_all()
    }

    /// Link the selection to `url`, or point the link around it there.
    pub fn set_link(&mut self, url: &str) -> EditorUpdate {
        self.wrap_selection(WrapTag::Link, &[Attribute::new("href", url)])
    }

    /// Remove `tag` from the selected content. Parts of a wrapper outside
    /// the selection keep it. The selection is kept.
    pub fn unwrap_selection(&mut self, tag: WrapTag) -> EditorUpdate {
        let (start, end) = self.selection_range();
        if start == end {
            return EditorUpdate::keep();
        }
        let entity_type = tag.entity_type();
        self.dom.unwrap_range(start, end, &|kind| match kind {
            ContainerNodeKind::Link(_) => entity_type == EntityType::TextLink,
            ContainerNodeKind::Format(t) => *t == entity_type,
            _ => false,
        });
        self.dom.normalize();
        self.create_update_replace_all()
    }

    /// Remove the link the caret is in, or every link in the selection.
    pub fn remove_links(&mut self) -> EditorUpdate {
        let (start, end) = self.selection_range();
        if start == end {
            let Some(link) = self.dom.find_link_covering(start, end) else {
                return EditorUpdate::keep();
            };
            self.dom.replace_node_with_its_children(&link);
            self.dom.normalize();
            return self.create_update_replace_all();
        }
        self.unwrap_selection(WrapTag::Link)
    }

    /// The attributes of the link holding the whole selection, for the
    /// link dialog.
    pub fn current_link(&self) -> Option<LinkAttributes> {
        let (start, end) = self.selection_range();
        let link = self.dom.find_link_covering(start, end)?;
        self.dom
            .lookup_node(&link)?
            .as_container()?
            .link_attributes()
            .cloned()
    }

    /// The formats applying to the whole selection, for toolbar state.
    pub fn active_formats(&self) -> Vec<EntityType> {
        let (start, end) = self.selection_range();
        self.dom.formats_at(start, end)
    }
}
