//! Document tree capability consumed by the binder.
//!
//! The browser implementation lives in `crate::web::dom`; `memory` is an
//! arena document used natively and in tests. Every method takes `&self`:
//! handles are cheap clones of a shared document, the same way `web_sys`
//! element handles behave.

use std::fmt;

use crate::config::HostSelector;
use crate::error::DomError;

pub mod memory;

/// Invoked when a control is clicked.
pub type ClickHandler = Box<dyn FnMut()>;

/// Invoked once per delivery turn with every batch recorded since the last
/// delivery, oldest first.
pub type MutationCallback<N> = Box<dyn FnMut(Vec<MutationBatch<N>>)>;

/// Nodes inserted by one child-list change.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationBatch<N> {
    pub added: Vec<N>,
}

pub trait Dom: Clone + 'static {
    /// Reference-identity handle to a node.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// Root of the observed subtree (the document body).
    fn root(&self) -> Option<Self::Node>;

    fn is_element(&self, node: &Self::Node) -> bool;

    /// Whether `node` is currently inside the document.
    fn is_connected(&self, node: &Self::Node) -> bool;

    fn matches(&self, node: &Self::Node, selector: &HostSelector) -> bool;

    /// Descendants of `scope` (excluding `scope`) matching `selector`, in
    /// document order.
    fn query_all(&self, scope: &Self::Node, selector: &HostSelector) -> Vec<Self::Node>;

    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    /// Element id, empty when unset.
    fn id(&self, node: &Self::Node) -> String;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    /// Adds `class` when `on`, removes it otherwise. Idempotent.
    fn set_class(&self, node: &Self::Node, class: &str, on: bool) -> Result<(), DomError>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_inner_html(&self, node: &Self::Node, html: &str);

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Inserts `node` as the next sibling of `reference`.
    fn insert_after(&self, reference: &Self::Node, node: &Self::Node) -> Result<(), DomError>;

    /// Current value of a form control.
    fn value(&self, node: &Self::Node) -> String;

    fn set_value(&self, node: &Self::Node, value: &str);

    fn on_click(&self, node: &Self::Node, handler: ClickHandler) -> Result<(), DomError>;

    /// Subscribes to child-list insertions anywhere below `scope`.
    ///
    /// Deliveries happen after the mutating turn completes, in the order the
    /// batches occurred, and never drop an inserted node.
    fn observe(
        &self,
        scope: &Self::Node,
        callback: MutationCallback<Self::Node>,
    ) -> Result<(), DomError>;
}
