// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use super::{
    paqual_name, PaDom, PaDomCreationError, PaDomHandle, PaDomNode,
    PaNodeText,
};
use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{parse_fragment, Attribute, QualName};
use std::cell::{Ref, RefCell};

pub(crate) type DomCreationResult = Result<PaDom, PaDomCreationError>;

pub(crate) struct PaDomCreator {
    state: RefCell<PaDomCreationError>,
}

impl PaDomCreator {
    pub(crate) fn parse(html: &str) -> DomCreationResult {
        parse_fragment(
            PaDomCreator::default(),
            Default::default(),
            paqual_name(""),
            vec![],
        )
        .from_utf8()
        .one(html.as_bytes())
    }
}

impl Default for PaDomCreator {
    fn default() -> Self {
        Self {
            state: RefCell::new(PaDomCreationError::new()),
        }
    }
}

impl PaDomCreator {
    /// Append text to `parent`, merging with a trailing text child.
    fn append_text(dom: &mut PaDom, parent: &PaDomHandle, text: &str) {
        let last_text = match dom.get_node(parent) {
            PaDomNode::Text(_) => Some(parent.clone()),
            node => node
                .children()
                .last()
                .filter(|h| matches!(dom.get_node(h), PaDomNode::Text(_)))
                .cloned(),
        };
        if let Some(handle) = last_text {
            if let PaDomNode::Text(t) = dom.get_mut_node(&handle) {
                t.content += text;
            }
            return;
        }
        let new_handle = dom.add_node(PaDomNode::Text(PaNodeText {
            content: text.to_owned(),
        }));
        if let Some(children) = dom.get_mut_node(parent).children_mut() {
            children.push(new_handle);
        }
    }

    fn detach(dom: &mut PaDom, target: &PaDomHandle) {
        if let Some(parent) = dom.parent_of(target) {
            if let Some(children) = dom.get_mut_node(&parent).children_mut() {
                children.retain(|c| c != target);
            }
        }
    }
}

impl TreeSink for PaDomCreator {
    type Handle = PaDomHandle;
    type Output = DomCreationResult;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        let state = self.state.into_inner();
        if state.parse_errors.is_empty() {
            Ok(state.dom)
        } else {
            Err(state)
        }
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        self.state.borrow_mut().parse_errors.push(String::from(msg));
    }

    fn get_document(&self) -> Self::Handle {
        self.state.borrow().dom.document_handle().clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.state.borrow(), |map| map.dom.get_node(target).name())
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> Self::Handle {
        self.state
            .borrow_mut()
            .dom
            .create_element(name, attrs, flags)
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.state
            .borrow_mut()
            .dom
            .add_node(PaDomNode::Comment(text.as_ref().to_owned()))
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        self.create_comment(data)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let dom = &mut self.state.borrow_mut().dom;
        match child {
            NodeOrText::AppendNode(child) => {
                if let Some(children) = dom.get_mut_node(parent).children_mut() {
                    children.push(child);
                }
            }
            NodeOrText::AppendText(tendril) => {
                Self::append_text(dom, parent, tendril.as_ref());
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.state.borrow().dom.parent_of(element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Doctypes carry nothing the editor keeps
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template content is stripped on conversion, so the element itself
        // can hold it.
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        sibling: &Self::Handle,
        new_node: NodeOrText<Self::Handle>,
    ) {
        let dom = &mut self.state.borrow_mut().dom;
        let Some(parent) = dom.parent_of(sibling) else {
            return;
        };
        let Some(index) = dom
            .get_node(&parent)
            .children()
            .iter()
            .position(|c| c == sibling)
        else {
            return;
        };
        let child = match new_node {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(tendril) => {
                let previous = index
                    .checked_sub(1)
                    .map(|i| dom.get_node(&parent).children()[i].clone());
                if let Some(previous) = previous {
                    if let PaDomNode::Text(t) = dom.get_mut_node(&previous) {
                        t.content += tendril.as_ref();
                        return;
                    }
                }
                dom.add_node(PaDomNode::Text(PaNodeText {
                    content: tendril.as_ref().to_owned(),
                }))
            }
        };
        Self::detach(dom, &child);
        if let Some(children) = dom.get_mut_node(&parent).children_mut() {
            let index = children
                .iter()
                .position(|c| c == sibling)
                .unwrap_or(children.len());
            children.insert(index, child);
        }
    }

    fn add_attrs_if_missing(
        &self,
        target: &Self::Handle,
        attrs: Vec<Attribute>,
    ) {
        let dom = &mut self.state.borrow_mut().dom;
        if let PaDomNode::Container(node) = dom.get_mut_node(target) {
            for attr in attrs {
                let name = attr.name.local.as_ref();
                if !node.attrs.iter().any(|(n, _)| n == name) {
                    node.attrs
                        .push((name.to_owned(), attr.value.as_ref().to_owned()));
                }
            }
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        Self::detach(&mut self.state.borrow_mut().dom, target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let dom = &mut self.state.borrow_mut().dom;
        let moved = dom
            .get_mut_node(node)
            .children_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        if let Some(children) = dom.get_mut_node(new_parent).children_mut() {
            children.extend(moved);
        }
    }

    fn is_mathml_annotation_xml_integration_point(
        &self,
        _handle: &Self::Handle,
    ) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(
        &self,
        _intended_parent: &Self::Handle,
    ) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        Err(String::from("declarative shadow roots are not supported"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// The tree as nested tags, with text quoted.
    fn shape(dom: &PaDom, handle: &PaDomHandle) -> String {
        match dom.get_node(handle) {
            PaDomNode::Text(t) => format!("{:?}", t.content),
            PaDomNode::Comment(_) => String::from("#comment"),
            node => {
                let children: Vec<String> =
                    node.children().iter().map(|c| shape(dom, c)).collect();
                format!("{}[{}]", node.name().local, children.join(","))
            }
        }
    }

    fn parsed(html: &str) -> String {
        let dom = PaDomCreator::parse(html).unwrap();
        shape(&dom, dom.document_handle())
    }

    /// Markup html5ever complains about, as far as it recovered it.
    fn recovered(html: &str) -> String {
        let err = PaDomCreator::parse(html).unwrap_err();
        assert!(!err.parse_errors.is_empty());
        shape(&err.dom, err.dom.document_handle())
    }

    #[test]
    fn empty_input_gives_an_empty_fragment() {
        assert_eq!(parsed(""), "[html[]]");
    }

    #[test]
    fn plain_text_is_one_node() {
        assert_eq!(parsed("Hi"), r#"[html["Hi"]]"#);
    }

    #[test]
    fn post_markup_keeps_its_nesting() {
        assert_eq!(
            parsed("<div>A<b>B<i>C</i></b></div><div><br></div>"),
            r#"[html[div["A",b["B",i["C"]]],div[br[]]]]"#
        );
    }

    #[test]
    fn attributes_are_kept_in_order() {
        let dom =
            PaDomCreator::parse(r#"<img src="u" data-custom-emoji-id="5">"#)
                .unwrap();
        let html = dom.get_document().children()[0].clone();
        let img = dom.get_node(&html).children()[0].clone();
        let PaDomNode::Container(img) = dom.get_node(&img) else {
            panic!("expected an element");
        };
        assert_eq!(
            img.attrs,
            vec![
                ("src".to_owned(), "u".to_owned()),
                ("data-custom-emoji-id".to_owned(), "5".to_owned()),
            ]
        );
    }

    #[test]
    fn character_references_are_decoded() {
        assert_eq!(
            parsed("aaa&lt;b&gt;bbb&lt;/b&gt;&amp;"),
            r#"[html["aaa<b>bbb</b>&"]]"#
        );
    }

    #[test]
    fn adjacent_text_is_merged() {
        assert_eq!(parsed("a&amp;b"), r#"[html["a&b"]]"#);
    }

    #[test]
    fn misnested_formatting_is_repaired() {
        assert_eq!(
            recovered("<b>1<p>2</b>3</p>"),
            r#"[html[b["1"],p[b["2"],"3"]]]"#
        );
    }

    #[test]
    fn comments_are_kept_apart_from_text() {
        assert_eq!(parsed("a<!-- note -->b"), r#"[html["a",#comment,"b"]]"#);
    }

    #[test]
    fn truncated_markup_still_builds_a_tree() {
        let dom = PaDomCreator::parse("<div>open <b>bold")
            .unwrap_or_else(|e| e.dom);
        assert_eq!(
            shape(&dom, dom.document_handle()),
            r#"[html[div["open ",b["bold"]]]]"#
        );
    }
}
