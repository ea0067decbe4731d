//! Rich-text editing surfaces for marked text inputs.
//!
//! Compiled to WASM via wasm-bindgen. On start it:
//! - Binds every `textarea[data-wysiwyg-editor]` already in the page
//! - Watches the document for hosts inserted later, at any depth
//! - Hides each host behind a generated toolbar + content container
//! - Mirrors editor content back into the host's value
//! - Keeps toolbar buttons' active state in step with the selection
//!
//! The core (`discovery`, `binder`, `toolbar`, `sync`) is written against
//! the [`dom::Dom`] and [`engine::Engine`] traits. `web` adapts them to the
//! browser; `dom::memory` and `engine::memory` run the same core natively.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use tracing::info;
use wasm_bindgen::prelude::*;

pub mod binder;
pub mod command;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod engine;
pub mod error;
pub mod glyphs;
pub mod prompt;
pub mod style;
pub mod sync;
pub mod toolbar;
pub mod web;

use binder::Binder;
use config::BinderConfig;
use discovery::Discovery;
use web::{JsEngineFactory, WebDom, WebSpawner, WindowPrompt};

thread_local! {
    static DISCOVERY: RefCell<Option<Rc<Discovery<WebDom>>>> = const { RefCell::new(None) };
}

/// Error message with its source chain, for throwing into JS.
fn to_js_error(err: &dyn Error) -> JsValue {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    JsValue::from_str(&message)
}

/// Start discovery. Returns the number of hosts bound at start.
///
/// `config_json` may be empty. `create_engine` is the page's
/// `createEngine(element, content, onChange)` factory.
#[wasm_bindgen]
pub fn wysiwyg_start(config_json: &str, create_engine: js_sys::Function) -> Result<usize, JsValue> {
    if let Some(running) = DISCOVERY.with(|slot| slot.borrow().clone()) {
        info!("discovery already running");
        return Ok(running.bound_count());
    }

    let config = BinderConfig::from_json(config_json).map_err(|err| to_js_error(&err))?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let dom = WebDom::new(document);

    if config.inject_styles {
        style::inject(&dom, &config).map_err(|err| to_js_error(&err))?;
    }

    let binder = Binder::new(
        dom,
        Rc::new(JsEngineFactory::new(create_engine)),
        Rc::new(WindowPrompt::new(window)),
        Rc::new(WebSpawner),
        config,
    );
    let discovery = Discovery::start(binder).map_err(|err| to_js_error(&err))?;
    let bound = discovery.bound_count();
    info!(bound, "discovery started");
    DISCOVERY.with(|slot| *slot.borrow_mut() = Some(discovery));
    Ok(bound)
}

/// Number of hosts bound so far, 0 before start.
#[wasm_bindgen]
pub fn wysiwyg_bound_count() -> usize {
    DISCOVERY.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(0, |discovery| discovery.bound_count())
    })
}
