//! Browser adapters: the document, a JS-hosted engine, `window.prompt` and a
//! spawner on the browser's microtask queue.

pub mod dom;
pub mod engine;
pub mod prompt;

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};

pub use dom::WebDom;
pub use engine::{JsEngine, JsEngineFactory};
pub use prompt::WindowPrompt;

/// Spawns futures with `wasm_bindgen_futures::spawn_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSpawner;

impl LocalSpawn for WebSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
