//! Keeps each toolbar control's active class in step with the engine.
//!
//! A [`ToolbarState`] belongs to one toolbar. It listens to the engine it was
//! attached to and, on every selection update or transaction, re-evaluates
//! each control's predicate and sets the active class to match.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::command::{ActivationPredicate, CommandKind};
use crate::dom::Dom;
use crate::engine::{Engine, StateChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Inactive,
    Active,
}

impl From<bool> for ControlState {
    fn from(active: bool) -> Self {
        if active {
            ControlState::Active
        } else {
            ControlState::Inactive
        }
    }
}

/// Rendered button bound to one command's predicate.
pub struct Control<D: Dom> {
    pub kind: CommandKind,
    pub node: D::Node,
    predicate: ActivationPredicate,
    // `None` until the first synchronization.
    state: Cell<Option<ControlState>>,
}

impl<D: Dom> Control<D> {
    pub fn state(&self) -> Option<ControlState> {
        self.state.get()
    }
}

pub struct ToolbarState<D: Dom> {
    dom: D,
    active_class: String,
    controls: Vec<Control<D>>,
}

impl<D: Dom> ToolbarState<D> {
    pub fn new(dom: D, active_class: &str) -> Self {
        Self {
            dom,
            active_class: active_class.to_string(),
            controls: Vec::new(),
        }
    }

    pub fn register(&mut self, kind: CommandKind, node: D::Node, predicate: ActivationPredicate) {
        self.controls.push(Control {
            kind,
            node,
            predicate,
            state: Cell::new(None),
        });
    }

    pub fn controls(&self) -> &[Control<D>] {
        &self.controls
    }

    /// Re-evaluates every predicate against `engine` and sets or removes the
    /// active class on every control.
    pub fn refresh(&self, engine: &dyn Engine) {
        for control in &self.controls {
            let next = match (control.predicate)(engine) {
                Ok(active) => ControlState::from(active),
                Err(err) => {
                    warn!(command = ?control.kind, error = %err, "activation check failed");
                    ControlState::Inactive
                }
            };
            let on = next == ControlState::Active;
            if let Err(err) = self.dom.set_class(&control.node, &self.active_class, on) {
                warn!(command = ?control.kind, error = %err, "failed to update control");
                continue;
            }
            if control.state.replace(Some(next)) != Some(next) {
                trace!(command = ?control.kind, active = on, "control state changed");
            }
        }
    }

    /// Commands whose control is currently active, in toolbar order.
    pub fn active_kinds(&self) -> Vec<CommandKind> {
        self.controls
            .iter()
            .filter(|control| control.state.get() == Some(ControlState::Active))
            .map(|control| control.kind)
            .collect()
    }

    /// Subscribes to `engine` and runs the initial synchronization.
    pub fn attach(self: &Rc<Self>, engine: &dyn Engine) {
        let state = Rc::clone(self);
        engine.on_state_change(Box::new(move |engine, change: StateChange| {
            trace!(?change, "synchronizing toolbar");
            state.refresh(engine);
        }));
        self.refresh(engine);
    }
}
