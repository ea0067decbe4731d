//! Arena-backed document tree.
//!
//! Models just enough of the DOM for the binder to run outside a browser:
//! elements with attributes, classes and a form value, text nodes, click
//! dispatch and child-list observation. Inner HTML is stored verbatim and never
//! parsed into child nodes.
//!
//! Mutation records queue up per observer and are only delivered by
//! [`MemoryDocument::flush_mutations`], which stands in for the turn in which a
//! browser runs `MutationObserver` callbacks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{ClickHandler, Dom, MutationBatch, MutationCallback};
use crate::config::HostSelector;
use crate::error::DomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    value: String,
    inner_html: String,
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Observer {
    scope: NodeId,
    pending: Vec<MutationBatch<NodeId>>,
    // Taken out while the callback runs so it can touch the document.
    callback: Option<MutationCallback<NodeId>>,
}

struct Tree {
    nodes: Vec<NodeData>,
    body: NodeId,
    observers: Vec<Observer>,
    click_handlers: HashMap<NodeId, Vec<ClickHandler>>,
}

impl Tree {
    fn new() -> Self {
        let body = NodeData {
            kind: NodeKind::Element(ElementData {
                tag: "body".to_string(),
                ..ElementData::default()
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            observers: Vec::new(),
            click_handlers: HashMap::new(),
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.element(parent).is_none() {
            return Err(DomError::Operation {
                op: "insert",
                message: "text nodes cannot have children".to_string(),
            });
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Operation {
                op: "insert",
                message: "node would become its own ancestor".to_string(),
            });
        }
        Ok(())
    }

    fn record_insert(&mut self, parent: NodeId, child: NodeId) {
        let scopes: Vec<bool> = self
            .observers
            .iter()
            .map(|observer| self.is_inclusive_ancestor(observer.scope, parent))
            .collect();
        for (observer, observed) in self.observers.iter_mut().zip(scopes) {
            if observed {
                observer.pending.push(MutationBatch { added: vec![child] });
            }
        }
    }

    fn collect_matches(&self, scope: NodeId, selector: &HostSelector, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[scope.0].children {
            if self.matches(child, selector) {
                out.push(child);
            }
            self.collect_matches(child, selector, out);
        }
    }

    fn matches(&self, node: NodeId, selector: &HostSelector) -> bool {
        self.element(node).is_some_and(|data| {
            data.tag.eq_ignore_ascii_case(&selector.tag)
                && data
                    .attributes
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(&selector.attribute))
        })
    }
}

/// Shared handle to an in-memory document.
#[derive(Clone)]
pub struct MemoryDocument {
    tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("MemoryDocument")
            .field("nodes", &tree.nodes.len())
            .field("observers", &tree.observers.len())
            .finish()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
        }
    }

    pub fn body(&self) -> NodeId {
        self.tree.borrow().body
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        self.tree.borrow_mut().push(NodeKind::Text(text.to_string()))
    }

    /// Removes `node` from its parent. Not reported to observers.
    pub fn detach(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().element(node).map(|data| data.tag.clone())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let data = tree.element(node)?;
        data.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .element(node)
            .map(|data| data.inner_html.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .nodes
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let parent = tree.nodes.get(node.0)?.parent?;
        let siblings = &tree.nodes[parent.0].children;
        let index = siblings.iter().position(|child| *child == node)?;
        siblings.get(index + 1).copied()
    }

    /// Dispatches a click to every handler registered on `node`.
    ///
    /// Returns false when nothing listens on the node.
    pub fn click(&self, node: NodeId) -> bool {
        let handlers = self.tree.borrow_mut().click_handlers.remove(&node);
        let Some(mut handlers) = handlers else {
            return false;
        };
        for handler in handlers.iter_mut() {
            handler();
        }
        let mut tree = self.tree.borrow_mut();
        let slot = tree.click_handlers.entry(node).or_default();
        let added = std::mem::take(slot);
        *slot = handlers;
        slot.extend(added);
        true
    }

    /// Number of batches waiting for delivery across all observers.
    pub fn pending_mutations(&self) -> usize {
        self.tree
            .borrow()
            .observers
            .iter()
            .map(|observer| observer.pending.len())
            .sum()
    }

    /// Delivers queued mutation batches until the queues stay empty.
    ///
    /// Mutations made by a callback are delivered in a later round, after the
    /// batches that were already queued. Returns the number of batches
    /// delivered.
    pub fn flush_mutations(&self) -> usize {
        let mut delivered = 0;
        loop {
            let ready: Vec<_> = {
                let mut tree = self.tree.borrow_mut();
                tree.observers
                    .iter_mut()
                    .enumerate()
                    .filter(|(_, observer)| !observer.pending.is_empty())
                    .filter_map(|(index, observer)| {
                        let callback = observer.callback.take()?;
                        Some((index, callback, std::mem::take(&mut observer.pending)))
                    })
                    .collect()
            };
            if ready.is_empty() {
                return delivered;
            }
            for (index, mut callback, batches) in ready {
                delivered += batches.len();
                callback(batches);
                self.tree.borrow_mut().observers[index].callback = Some(callback);
            }
        }
    }
}

fn valid_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

impl Dom for MemoryDocument {
    type Node = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(self.body())
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.tree.borrow().element(*node).is_some()
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        let tree = self.tree.borrow();
        tree.nodes.get(node.0).is_some() && tree.is_inclusive_ancestor(tree.body, *node)
    }

    fn matches(&self, node: &NodeId, selector: &HostSelector) -> bool {
        self.tree.borrow().matches(*node, selector)
    }

    fn query_all(&self, scope: &NodeId, selector: &HostSelector) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut found = Vec::new();
        if tree.nodes.get(scope.0).is_some() {
            tree.collect_matches(*scope, selector, &mut found);
        }
        found
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::CreateElement {
                tag: tag.to_string(),
                message: "invalid tag name".to_string(),
            });
        }
        Ok(self.tree.borrow_mut().push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        })))
    }

    fn id(&self, node: &NodeId) -> String {
        self.attribute(*node, "id").unwrap_or_default()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        if !valid_token(name) {
            return Err(DomError::Operation {
                op: "setAttribute",
                message: format!("invalid attribute name {name:?}"),
            });
        }
        let mut tree = self.tree.borrow_mut();
        let data = tree.element_mut(*node).ok_or(DomError::Operation {
            op: "setAttribute",
            message: "not an element".to_string(),
        })?;
        match data.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn set_class(&self, node: &NodeId, class: &str, on: bool) -> Result<(), DomError> {
        if !valid_token(class) {
            return Err(DomError::Operation {
                op: "classList",
                message: format!("invalid class token {class:?}"),
            });
        }
        let mut tree = self.tree.borrow_mut();
        let data = tree.element_mut(*node).ok_or(DomError::Operation {
            op: "classList",
            message: "not an element".to_string(),
        })?;
        let present = data.classes.iter().any(|existing| existing == class);
        if on && !present {
            data.classes.push(class.to_string());
        } else if !on && present {
            data.classes.retain(|existing| existing != class);
        }
        Ok(())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .element(*node)
            .is_some_and(|data| data.classes.iter().any(|existing| existing == class))
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        if let Some(data) = self.tree.borrow_mut().element_mut(*node) {
            data.inner_html = html.to_string();
        }
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.check_insert(*parent, *child)?;
        tree.detach(*child);
        tree.nodes[parent.0].children.push(*child);
        tree.nodes[child.0].parent = Some(*parent);
        tree.record_insert(*parent, *child);
        Ok(())
    }

    fn insert_after(&self, reference: &NodeId, node: &NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let parent = tree.nodes[reference.0].parent.ok_or(DomError::Detached)?;
        tree.check_insert(parent, *node)?;
        tree.detach(*node);
        let siblings = &mut tree.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|child| child == reference)
            .ok_or(DomError::Detached)?;
        siblings.insert(index + 1, *node);
        tree.nodes[node.0].parent = Some(parent);
        tree.record_insert(parent, *node);
        Ok(())
    }

    fn value(&self, node: &NodeId) -> String {
        self.tree
            .borrow()
            .element(*node)
            .map(|data| data.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        if let Some(data) = self.tree.borrow_mut().element_mut(*node) {
            data.value = value.to_string();
        }
    }

    fn on_click(&self, node: &NodeId, handler: ClickHandler) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        if tree.element(*node).is_none() {
            return Err(DomError::Operation {
                op: "addEventListener",
                message: "not an element".to_string(),
            });
        }
        tree.click_handlers.entry(*node).or_default().push(handler);
        Ok(())
    }

    fn observe(&self, scope: &NodeId, callback: MutationCallback<NodeId>) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        if tree.element(*scope).is_none() {
            return Err(DomError::Operation {
                op: "observe",
                message: "scope is not an element".to_string(),
            });
        }
        tree.observers.push(Observer {
            scope: *scope,
            pending: Vec::new(),
            callback: Some(callback),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host(doc: &MemoryDocument) -> NodeId {
        let node = doc.create_element("textarea").unwrap();
        doc.set_attribute(&node, "data-wysiwyg-editor", "").unwrap();
        node
    }

    #[test]
    fn query_all_is_document_order() {
        let doc = MemoryDocument::new();
        let selector = HostSelector::default();
        let form = doc.create_element("form").unwrap();
        let first = host(&doc);
        let nested = host(&doc);
        let last = host(&doc);
        let wrapper = doc.create_element("div").unwrap();
        doc.append_child(&doc.body(), &form).unwrap();
        doc.append_child(&form, &first).unwrap();
        doc.append_child(&form, &wrapper).unwrap();
        doc.append_child(&wrapper, &nested).unwrap();
        doc.append_child(&doc.body(), &last).unwrap();

        assert_eq!(doc.query_all(&doc.body(), &selector), vec![first, nested, last]);
        assert_eq!(doc.query_all(&wrapper, &selector), vec![nested]);
        assert!(doc.matches(&first, &selector));
        assert!(!doc.matches(&wrapper, &selector));
    }

    #[test]
    fn insert_after_places_next_sibling() {
        let doc = MemoryDocument::new();
        let a = doc.create_element("p").unwrap();
        let b = doc.create_element("p").unwrap();
        let c = doc.create_element("div").unwrap();
        doc.append_child(&doc.body(), &a).unwrap();
        doc.append_child(&doc.body(), &b).unwrap();
        doc.insert_after(&a, &c).unwrap();
        assert_eq!(doc.children(doc.body()), vec![a, c, b]);
        assert_eq!(doc.next_sibling(a), Some(c));
    }

    #[test]
    fn insert_after_detached_reference_fails() {
        let doc = MemoryDocument::new();
        let a = doc.create_element("p").unwrap();
        let b = doc.create_element("p").unwrap();
        assert!(matches!(doc.insert_after(&a, &b), Err(DomError::Detached)));
    }

    #[test]
    fn cannot_append_ancestor() {
        let doc = MemoryDocument::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("div").unwrap();
        doc.append_child(&outer, &inner).unwrap();
        assert!(doc.append_child(&inner, &outer).is_err());
    }

    #[test]
    fn class_toggling_is_idempotent() {
        let doc = MemoryDocument::new();
        let node = doc.create_element("button").unwrap();
        doc.set_class(&node, "active", true).unwrap();
        doc.set_class(&node, "active", true).unwrap();
        assert!(doc.has_class(&node, "active"));
        doc.set_class(&node, "active", false).unwrap();
        doc.set_class(&node, "active", false).unwrap();
        assert!(!doc.has_class(&node, "active"));
        assert!(doc.set_class(&node, "two words", true).is_err());
    }

    #[test]
    fn mutations_are_delivered_on_flush_in_order() {
        let doc = MemoryDocument::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.observe(
            &doc.body(),
            Box::new(move |batches| {
                for batch in batches {
                    sink.borrow_mut().extend(batch.added);
                }
            }),
        )
        .unwrap();

        let a = doc.create_element("div").unwrap();
        let b = doc.create_element("div").unwrap();
        let detached = doc.create_element("div").unwrap();
        let orphan = doc.create_element("span").unwrap();
        doc.append_child(&doc.body(), &a).unwrap();
        doc.append_child(&a, &b).unwrap();
        // Outside the observed subtree.
        doc.append_child(&detached, &orphan).unwrap();

        assert!(seen.borrow().is_empty());
        assert_eq!(doc.pending_mutations(), 2);
        assert_eq!(doc.flush_mutations(), 2);
        assert_eq!(*seen.borrow(), vec![a, b]);
    }

    #[test]
    fn callback_mutations_arrive_in_a_later_round() {
        let doc = MemoryDocument::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let inner = doc.clone();
        doc.observe(
            &doc.body(),
            Box::new(move |batches| {
                for batch in batches {
                    for node in batch.added {
                        sink.borrow_mut().push(node);
                        if inner.tag(node).as_deref() == Some("section") {
                            let marker = inner.create_element("hr").unwrap();
                            inner.append_child(&node, &marker).unwrap();
                        }
                    }
                }
            }),
        )
        .unwrap();

        let section = doc.create_element("section").unwrap();
        doc.append_child(&doc.body(), &section).unwrap();
        assert_eq!(doc.flush_mutations(), 2);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], section);
    }

    #[test]
    fn click_runs_handlers_and_allows_reentry() {
        let doc = MemoryDocument::new();
        let button = doc.create_element("button").unwrap();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let inner = doc.clone();
        doc.on_click(
            &button,
            Box::new(move || {
                *counter.borrow_mut() += 1;
                inner.set_class(&button, "clicked", true).unwrap();
            }),
        )
        .unwrap();

        assert!(doc.click(button));
        assert!(doc.click(button));
        assert_eq!(*count.borrow(), 2);
        assert!(doc.has_class(&button, "clicked"));
        assert!(!doc.click(doc.body()));
    }

    #[test]
    fn connection_follows_the_body() {
        let doc = MemoryDocument::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("span").unwrap();
        doc.append_child(&outer, &inner).unwrap();
        assert!(!doc.is_connected(&inner));

        doc.append_child(&doc.body(), &outer).unwrap();
        assert!(doc.is_connected(&inner));
        assert!(doc.is_connected(&doc.body()));

        doc.detach(outer);
        assert!(!doc.is_connected(&inner));
    }

    #[test]
    fn text_nodes_are_not_elements() {
        let doc = MemoryDocument::new();
        let text = doc.create_text("hello");
        assert!(!doc.is_element(&text));
        let child = doc.create_element("b").unwrap();
        assert!(doc.append_child(&text, &child).is_err());
    }
}
