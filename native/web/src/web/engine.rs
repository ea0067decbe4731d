//! Engine backed by an editor object living in JavaScript.
//!
//! The page hands [`crate::wysiwyg_start`] a factory function
//! `createEngine(element, content, onChange)` returning an object with:
//!
//! - `serialize(): string`
//! - `isCommandActive(name, params): boolean`
//! - `applyCommand(name, params)`
//! - `getAttributes(mark): object`
//! - `onStateChange(callback)`, called with `"selectionUpdate"` or `"transaction"`
//! - `focus()`
//!
//! Parameters and attributes cross the boundary as JSON-compatible objects.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::{trace, warn};
use wasm_bindgen::prelude::*;
use web_sys::Node;

use super::dom::{js_message, WebDom};
use crate::engine::{ChangeCallback, Engine, EngineFactory, StateChange, StateListener};
use crate::error::EngineError;

#[wasm_bindgen]
extern "C" {
    /// Editor object returned by the page's engine factory.
    #[derive(Clone)]
    pub type JsEditor;

    #[wasm_bindgen(method)]
    fn serialize(this: &JsEditor) -> String;

    #[wasm_bindgen(method, catch, js_name = isCommandActive)]
    fn is_command_active(this: &JsEditor, name: &str, params: &JsValue) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch, js_name = applyCommand)]
    fn apply_command(this: &JsEditor, name: &str, params: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getAttributes)]
    fn get_attributes(this: &JsEditor, mark: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = onStateChange)]
    fn on_state_change(this: &JsEditor, callback: &Closure<dyn FnMut(String)>);

    #[wasm_bindgen(method)]
    fn focus(this: &JsEditor);
}

fn to_js(value: &Value) -> JsValue {
    if value.is_null() {
        return JsValue::UNDEFINED;
    }
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::UNDEFINED)
}

fn from_js(value: &JsValue) -> Map<String, Value> {
    if value.is_null() || value.is_undefined() {
        return Map::new();
    }
    js_sys::JSON::stringify(value)
        .ok()
        .map(String::from)
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

fn host_error(call: &'static str) -> impl Fn(JsValue) -> EngineError {
    move |err| EngineError::Host {
        call,
        message: js_message(&err),
    }
}

type Listeners = Rc<RefCell<Vec<Rc<dyn Fn(&dyn Engine, StateChange)>>>>;

/// Rust-side handle of a [`JsEditor`]. Clones share listeners.
#[derive(Clone)]
pub struct JsEngine {
    editor: JsEditor,
    listeners: Listeners,
}

impl JsEngine {
    fn new(editor: JsEditor) -> Self {
        let engine = Self {
            editor,
            listeners: Rc::new(RefCell::new(Vec::new())),
        };
        let bridge = engine.clone();
        let closure = Closure::wrap(Box::new(move |event: String| {
            let Some(change) = StateChange::from_event_name(&event) else {
                trace!(%event, "ignoring engine event");
                return;
            };
            let listeners = bridge.listeners.borrow().clone();
            for listener in listeners {
                listener(&bridge, change);
            }
        }) as Box<dyn FnMut(String)>);
        engine.editor.on_state_change(&closure);
        closure.forget();
        engine
    }
}

impl Engine for JsEngine {
    fn serialize(&self) -> String {
        self.editor.serialize()
    }

    fn is_active(&self, name: &str, params: &Value) -> Result<bool, EngineError> {
        self.editor
            .is_command_active(name, &to_js(params))
            .map_err(host_error("isCommandActive"))
    }

    fn apply_command(&self, name: &str, params: &Value) -> Result<(), EngineError> {
        self.editor
            .apply_command(name, &to_js(params))
            .map_err(host_error("applyCommand"))
    }

    fn attributes(&self, mark: &str) -> Map<String, Value> {
        from_js(&self.editor.get_attributes(mark))
    }

    fn on_state_change(&self, listener: StateListener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }

    fn focus(&self) {
        self.editor.focus();
    }
}

/// Calls the page's `createEngine` function for every bound host.
pub struct JsEngineFactory {
    create: js_sys::Function,
}

impl JsEngineFactory {
    pub fn new(create: js_sys::Function) -> Self {
        Self { create }
    }
}

impl EngineFactory<WebDom> for JsEngineFactory {
    fn create(
        &self,
        _dom: &WebDom,
        container: &Node,
        content: &str,
        on_change: ChangeCallback,
    ) -> Result<Rc<dyn Engine>, EngineError> {
        // The editor may report changes before `createEngine` returns; those
        // precede the binding and are dropped.
        let slot: Rc<OnceCell<JsEngine>> = Rc::new(OnceCell::new());
        let changed = Rc::clone(&slot);
        let notify = Closure::wrap(Box::new(move || {
            if let Some(engine) = changed.get() {
                on_change(engine);
            }
        }) as Box<dyn FnMut()>);

        let created = self
            .create
            .call3(
                &JsValue::NULL,
                container.as_ref(),
                &JsValue::from_str(content),
                notify.as_ref(),
            )
            .map_err(host_error("createEngine"))?;
        notify.forget();

        if created.is_null() || created.is_undefined() {
            warn!("createEngine returned no editor");
            return Err(EngineError::Host {
                call: "createEngine",
                message: "factory returned no editor".to_string(),
            });
        }
        let engine = JsEngine::new(created.unchecked_into());
        let _ = slot.set(engine.clone());
        Ok(Rc::new(engine))
    }
}
