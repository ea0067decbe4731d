//! Page harness over the in-memory document and engine.

#![allow(dead_code)]

use std::rc::Rc;

use futures::executor::LocalPool;
use wysiwyg_web::binder::{Binder, Binding};
use wysiwyg_web::config::BinderConfig;
use wysiwyg_web::discovery::Discovery;
use wysiwyg_web::dom::memory::{MemoryDocument, NodeId};
use wysiwyg_web::dom::Dom;
use wysiwyg_web::engine::memory::{MemoryEngine, MemoryEngineFactory};
use wysiwyg_web::prompt::ScriptedPrompt;

pub struct Page {
    pub doc: MemoryDocument,
    pub factory: Rc<MemoryEngineFactory>,
    pub prompt: ScriptedPrompt,
    pub pool: LocalPool,
}

impl Page {
    pub fn new() -> Self {
        Self {
            doc: MemoryDocument::new(),
            factory: Rc::new(MemoryEngineFactory::new()),
            prompt: ScriptedPrompt::new(),
            pool: LocalPool::new(),
        }
    }

    /// Detached `<textarea data-wysiwyg-editor>` holding `value`.
    pub fn host(&self, id: &str, value: &str) -> NodeId {
        let host = self.doc.create_element("textarea").unwrap();
        if !id.is_empty() {
            self.doc.set_attribute(&host, "id", id).unwrap();
        }
        self.doc
            .set_attribute(&host, "data-wysiwyg-editor", "")
            .unwrap();
        self.doc.set_value(&host, value);
        host
    }

    pub fn element(&self, tag: &str) -> NodeId {
        self.doc.create_element(tag).unwrap()
    }

    pub fn append(&self, parent: NodeId, child: NodeId) {
        self.doc.append_child(&parent, &child).unwrap();
    }

    pub fn body(&self) -> NodeId {
        self.doc.body()
    }

    pub fn start(&self) -> Rc<Discovery<MemoryDocument>> {
        self.start_with(BinderConfig::default())
    }

    pub fn start_with(&self, config: BinderConfig) -> Rc<Discovery<MemoryDocument>> {
        let binder = Binder::new(
            self.doc.clone(),
            self.factory.clone(),
            Rc::new(self.prompt.clone()),
            Rc::new(self.pool.spawner()),
            config,
        );
        Discovery::start(binder).unwrap()
    }

    /// Delivers pending mutations and runs spawned prompt tasks until both
    /// are idle.
    pub fn settle(&mut self) {
        loop {
            let delivered = self.doc.flush_mutations();
            self.pool.run_until_stalled();
            if delivered == 0 && self.doc.pending_mutations() == 0 {
                return;
            }
        }
    }

    /// Engine created for the `index`th binding.
    pub fn engine(&self, index: usize) -> Rc<MemoryEngine> {
        self.factory.engines()[index].clone()
    }

    /// Clicks the toolbar button titled `label` in `binding`.
    pub fn click(&self, binding: &Binding<MemoryDocument>, label: &str) {
        let button = self
            .doc
            .children(binding.toolbar_region)
            .into_iter()
            .flat_map(|toolset| self.doc.children(toolset))
            .find(|button| self.doc.attribute(*button, "title").as_deref() == Some(label))
            .unwrap_or_else(|| panic!("no button titled {label}"));
        assert!(self.doc.click(button));
    }

    /// Titles of the active buttons in `binding`'s toolbar, read from the DOM.
    pub fn active_titles(&self, binding: &Binding<MemoryDocument>) -> Vec<String> {
        self.doc
            .children(binding.toolbar_region)
            .into_iter()
            .flat_map(|toolset| self.doc.children(toolset))
            .filter(|button| self.doc.has_class(button, "active"))
            .filter_map(|button| self.doc.attribute(button, "title"))
            .collect()
    }
}
