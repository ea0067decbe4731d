//! Upgrades one host element to a rich-text editing surface.
//!
//! The generated markup follows the host:
//!
//! ```text
//! <textarea class="!hidden">…</textarea>
//! <div id="{id}-wysiwyg-editor" class="wysiwyg-editor">
//!     <div id="{id}-wysiwyg-editor-toolbar" class="wysiwyg-editor-toolbar">…</div>
//!     <div id="{id}-wysiwyg-editor-content" class="wysiwyg-editor-content">…</div>
//! </div>
//! ```
//!
//! Everything is built detached and the engine is created before the
//! container goes into the document. The host is hidden last but one, and
//! shown again if the container cannot be inserted, so a failed bind leaves
//! the page as it was.

use std::rc::Rc;

use futures::task::LocalSpawn;
use tracing::{debug, info, warn};

use crate::config::BinderConfig;
use crate::dom::Dom;
use crate::engine::{Engine, EngineFactory};
use crate::error::{BindError, DomError};
use crate::prompt::Prompt;
use crate::toolbar::{Toolbar, ToolbarContext};

/// A bound host and everything generated for it.
pub struct Binding<D: Dom> {
    pub host: D::Node,
    pub container: D::Node,
    pub toolbar_region: D::Node,
    pub content_region: D::Node,
    pub engine: Rc<dyn Engine>,
    pub toolbar: Toolbar<D>,
}

pub struct Binder<D: Dom> {
    dom: D,
    factory: Rc<dyn EngineFactory<D>>,
    prompt: Rc<dyn Prompt>,
    spawner: Rc<dyn LocalSpawn>,
    config: Rc<BinderConfig>,
}

impl<D: Dom> Binder<D> {
    pub fn new(
        dom: D,
        factory: Rc<dyn EngineFactory<D>>,
        prompt: Rc<dyn Prompt>,
        spawner: Rc<dyn LocalSpawn>,
        config: BinderConfig,
    ) -> Self {
        Self {
            dom,
            factory,
            prompt,
            spawner,
            config: Rc::new(config),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    fn region(&self, class: &str, id: Option<&String>) -> Result<D::Node, DomError> {
        let node = self.dom.create_element("div")?;
        self.dom.set_class(&node, class, true)?;
        if let Some(id) = id {
            self.dom.set_attribute(&node, "id", id)?;
        }
        Ok(node)
    }

    /// Binds `host`. Callers guarantee the host is not bound yet.
    pub fn bind(&self, host: &D::Node) -> Result<Binding<D>, BindError> {
        let dom = &self.dom;
        let config = &self.config;
        let host_id = dom.id(host);
        let ids = config.region_ids(&host_id);
        let [container_id, toolbar_id, content_id] = match &ids {
            Some([container, toolbar, content]) => {
                [Some(container), Some(toolbar), Some(content)]
            }
            None => [None, None, None],
        };

        let container = self.region(&config.container_class, container_id)?;
        let toolbar_region = self.region(&config.toolbar_class, toolbar_id)?;
        let content_region = self.region(&config.content_class, content_id)?;
        dom.append_child(&container, &toolbar_region)?;
        dom.append_child(&container, &content_region)?;

        let mirror_dom = dom.clone();
        let mirror_host = host.clone();
        let engine = self.factory.create(
            dom,
            &content_region,
            &dom.value(host),
            Box::new(move |engine: &dyn Engine| {
                mirror_dom.set_value(&mirror_host, &engine.serialize());
            }),
        )?;
        debug!(host = %host_id, "engine created");

        let toolbar = Toolbar::build(
            dom,
            &toolbar_region,
            ToolbarContext {
                engine: Rc::clone(&engine),
                prompt: Rc::clone(&self.prompt),
                spawner: Rc::clone(&self.spawner),
                config: Rc::clone(config),
            },
        )?;

        dom.set_class(host, &config.hidden_class, true)?;
        if let Err(err) = dom.insert_after(host, &container) {
            if let Err(undo) = dom.set_class(host, &config.hidden_class, false) {
                warn!(host = %host_id, error = %undo, "failed to unhide host");
            }
            return Err(err.into());
        }
        info!(host = %host_id, "editor bound");

        Ok(Binding {
            host: host.clone(),
            container,
            toolbar_region,
            content_region,
            engine,
            toolbar,
        })
    }
}
