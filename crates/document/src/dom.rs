//! Small helpers over the `markup5ever_rcdom` tree.
//!
//! The tree is a plain `Rc` graph: children are owned through
//! `Node::children`, and every node points back at its parent through a weak
//! reference. Every helper here keeps those two links consistent.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;
use tendril::StrTendril;

pub(crate) fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Parses `markup` as the content of a `<head>` or `<body>` element and
/// returns the resulting top-level nodes, detached and ready to be inserted
/// into another tree.
pub(crate) fn fragment(markup: &str, container: &str) -> Vec<Handle> {
    let html = match container {
        "head" => format!("<!DOCTYPE html><html><head>{markup}</head><body></body></html>"),
        _ => format!("<!DOCTYPE html><html><head></head><body>{markup}</body></html>"),
    };
    let dom = parse(&html);
    let Some(parent) = descendants(&dom.document).into_iter().find(|node| local_name(node) == Some(container)) else {
        return Vec::new();
    };
    let children: Vec<Handle> = parent.children.borrow().clone();
    children.iter().for_each(detach);
    children
}

/// The node itself followed by every descendant, in document order.
pub(crate) fn descendants(root: &Handle) -> Vec<Handle> {
    let mut nodes = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        stack.extend(node.children.borrow().iter().rev().cloned());
        nodes.push(node);
    }
    nodes
}

pub(crate) fn local_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub(crate) fn is_element(node: &Handle, tag: &str) -> bool {
    local_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

pub(crate) fn attribute(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            attrs.borrow().iter().find(|attr| &*attr.name.local == name).map(|attr| attr.value.to_string())
        },
        _ => None,
    }
}

/// Replaces the value of an existing attribute. Returns `false` when the node
/// is not an element or has no such attribute.
pub(crate) fn set_attribute(node: &Handle, name: &str, value: &str) -> bool {
    let NodeData::Element { attrs, .. } = &node.data else {
        return false;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
        Some(attr) => {
            attr.value = StrTendril::from_slice(value);
            true
        },
        None => false,
    }
}

pub(crate) fn detach(node: &Handle) {
    if let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) {
        parent.children.borrow_mut().retain(|child| !Rc::ptr_eq(child, node));
    }
}

pub(crate) fn append(parent: &Handle, children: Vec<Handle>) {
    for child in children {
        detach(&child);
        child.parent.set(Some(Rc::downgrade(parent)));
        parent.children.borrow_mut().push(child);
    }
}

/// Inserts `children` before the current first child, keeping their order.
pub(crate) fn prepend(parent: &Handle, children: Vec<Handle>) {
    for (position, child) in children.into_iter().enumerate() {
        detach(&child);
        child.parent.set(Some(Rc::downgrade(parent)));
        parent.children.borrow_mut().insert(position, child);
    }
}
