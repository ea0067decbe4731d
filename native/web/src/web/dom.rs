//! [`Dom`] over the browser document.
//!
//! Nodes are `web_sys::Node` handles; equality is JS reference identity.
//! Click handlers and the mutation observer callback are leaked into JS with
//! `Closure::forget`, since bound editors live as long as the page.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlInputElement, HtmlTextAreaElement, MutationObserver,
    MutationObserverInit, MutationRecord, Node, NodeList,
};

use crate::config::HostSelector;
use crate::dom::{ClickHandler, Dom, MutationBatch, MutationCallback};
use crate::error::DomError;

/// Best-effort text of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

fn failed(op: &'static str) -> impl Fn(JsValue) -> DomError {
    move |err| DomError::Operation {
        op,
        message: js_message(&err),
    }
}

fn nodes(list: &NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|index| list.item(index)).collect()
}

#[derive(Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element<'a>(&self, node: &'a Node) -> Result<&'a Element, DomError> {
        node.dyn_ref::<Element>().ok_or(DomError::Operation {
            op: "element",
            message: "node is not an element".to_string(),
        })
    }
}

impl Dom for WebDom {
    type Node = Node;

    fn root(&self) -> Option<Node> {
        self.document.body().map(Into::into)
    }

    fn is_element(&self, node: &Node) -> bool {
        node.node_type() == Node::ELEMENT_NODE
    }

    fn is_connected(&self, node: &Node) -> bool {
        node.is_connected()
    }

    fn matches(&self, node: &Node, selector: &HostSelector) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|element| element.matches(&selector.css()).unwrap_or(false))
    }

    fn query_all(&self, scope: &Node, selector: &HostSelector) -> Vec<Node> {
        let Some(scope) = scope.dyn_ref::<Element>() else {
            return Vec::new();
        };
        match scope.query_selector_all(&selector.css()) {
            Ok(list) => nodes(&list),
            Err(err) => {
                tracing::warn!(
                    selector = %selector.css(),
                    error = %js_message(&err),
                    "query failed"
                );
                Vec::new()
            }
        }
    }

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(|err| DomError::CreateElement {
                tag: tag.to_string(),
                message: js_message(&err),
            })
    }

    fn id(&self, node: &Node) -> String {
        node.dyn_ref::<Element>().map(Element::id).unwrap_or_default()
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        self.element(node)?
            .set_attribute(name, value)
            .map_err(failed("setAttribute"))
    }

    fn set_class(&self, node: &Node, class: &str, on: bool) -> Result<(), DomError> {
        let classes = self.element(node)?.class_list();
        if on {
            classes.add_1(class).map_err(failed("classList.add"))
        } else {
            classes.remove_1(class).map_err(failed("classList.remove"))
        }
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn set_inner_html(&self, node: &Node, html: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.set_inner_html(html);
        }
    }

    fn append_child(&self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(failed("appendChild"))
    }

    fn insert_after(&self, reference: &Node, node: &Node) -> Result<(), DomError> {
        let parent = reference.parent_node().ok_or(DomError::Detached)?;
        parent
            .insert_before(node, reference.next_sibling().as_ref())
            .map(drop)
            .map_err(failed("insertBefore"))
    }

    fn value(&self, node: &Node) -> String {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else {
            String::new()
        }
    }

    fn set_value(&self, node: &Node, value: &str) {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn on_click(&self, node: &Node, handler: ClickHandler) -> Result<(), DomError> {
        let closure = Closure::wrap(handler);
        node.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(failed("addEventListener"))?;
        closure.forget();
        Ok(())
    }

    fn observe(&self, scope: &Node, mut callback: MutationCallback<Node>) -> Result<(), DomError> {
        let closure = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            let batches: Vec<MutationBatch<Node>> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .filter(|record| record.type_() == "childList")
                .map(|record| MutationBatch {
                    added: nodes(&record.added_nodes()),
                })
                .collect();
            if !batches.is_empty() {
                callback(batches);
            }
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(failed("new MutationObserver"))?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer
            .observe_with_options(scope, &options)
            .map_err(failed("MutationObserver.observe"))?;
        closure.forget();
        Ok(())
    }
}
