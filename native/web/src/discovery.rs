//! Finds host elements and binds each of them exactly once.
//!
//! [`Discovery::start`] subscribes to child-list insertions under the document
//! root, then binds every host already present in document order. Each
//! inserted element is checked itself and searched for nested hosts. The
//! [`HostRegistry`] claims a host before it is bound, so a host seen again in
//! a later batch (or one whose bind failed) is skipped. Hosts that left the
//! document before their batch was delivered are not claimed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::binder::{Binder, Binding};
use crate::dom::{Dom, MutationBatch};
use crate::error::DomError;

/// Hosts that have been claimed for binding, successfully or not.
#[derive(Debug)]
pub struct HostRegistry<N> {
    claimed: RefCell<Vec<N>>,
}

impl<N> Default for HostRegistry<N> {
    fn default() -> Self {
        Self {
            claimed: RefCell::new(Vec::new()),
        }
    }
}

impl<N: Clone + PartialEq> HostRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `host`; false if it was already claimed.
    pub fn claim(&self, host: &N) -> bool {
        let mut claimed = self.claimed.borrow_mut();
        if claimed.contains(host) {
            return false;
        }
        claimed.push(host.clone());
        true
    }

    pub fn contains(&self, host: &N) -> bool {
        self.claimed.borrow().contains(host)
    }

    pub fn len(&self) -> usize {
        self.claimed.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.borrow().is_empty()
    }
}

pub struct Discovery<D: Dom> {
    binder: Binder<D>,
    registry: Rc<HostRegistry<D::Node>>,
    bindings: RefCell<Vec<Rc<Binding<D>>>>,
    failures: Cell<usize>,
}

impl<D: Dom> Discovery<D> {
    /// Starts observing the document root and binds the hosts already in it.
    pub fn start(binder: Binder<D>) -> Result<Rc<Self>, DomError> {
        let dom = binder.dom().clone();
        let root = dom.root().ok_or(DomError::MissingRoot)?;
        let discovery = Rc::new(Self {
            binder,
            registry: Rc::new(HostRegistry::new()),
            bindings: RefCell::new(Vec::new()),
            failures: Cell::new(0),
        });

        let weak: Weak<Self> = Rc::downgrade(&discovery);
        dom.observe(
            &root,
            Box::new(move |batches| {
                if let Some(discovery) = weak.upgrade() {
                    discovery.on_mutations(batches);
                }
            }),
        )?;

        let hosts = dom.query_all(&root, &discovery.binder.config().host);
        debug!(count = hosts.len(), "hosts present at start");
        for host in hosts {
            discovery.consider(&host);
        }
        Ok(discovery)
    }

    /// Binds every unclaimed host among the inserted nodes, oldest batch
    /// first.
    pub fn on_mutations(&self, batches: Vec<MutationBatch<D::Node>>) {
        let dom = self.binder.dom();
        let selector = &self.binder.config().host;
        for batch in batches {
            for node in batch.added {
                if !dom.is_element(&node) {
                    continue;
                }
                if dom.matches(&node, selector) {
                    self.consider(&node);
                }
                for nested in dom.query_all(&node, selector) {
                    self.consider(&nested);
                }
            }
        }
    }

    fn consider(&self, host: &D::Node) {
        // Removed again before delivery; bound once it is reinserted.
        if !self.binder.dom().is_connected(host) {
            trace!(?host, "host no longer in the document");
            return;
        }
        if !self.registry.claim(host) {
            trace!(?host, "host already claimed");
            return;
        }
        match self.binder.bind(host) {
            Ok(binding) => self.bindings.borrow_mut().push(Rc::new(binding)),
            Err(err) => {
                self.failures.set(self.failures.get() + 1);
                warn!(?host, error = %err, "failed to bind editor");
            }
        }
    }

    pub fn registry(&self) -> &Rc<HostRegistry<D::Node>> {
        &self.registry
    }

    /// Successful bindings in the order they were made.
    pub fn bindings(&self) -> Vec<Rc<Binding<D>>> {
        self.bindings.borrow().clone()
    }

    pub fn binding_for(&self, host: &D::Node) -> Option<Rc<Binding<D>>> {
        self.bindings
            .borrow()
            .iter()
            .find(|binding| binding.host == *host)
            .cloned()
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.get()
    }
}
