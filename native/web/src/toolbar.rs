//! Builds a command toolbar for one engine.
//!
//! Each toolset becomes a grouping `<div>`, each command a
//! `<button type="button">` carrying the command's glyph and label. Clicks
//! focus the engine and run the command; link and image first ask for a URL,
//! and the toolbar ignores clicks until that prompt resolves.

use std::cell::Cell;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use tracing::{debug, warn};

use crate::command::{toolsets, CommandAction, CommandKind};
use crate::config::BinderConfig;
use crate::dom::Dom;
use crate::engine::{Engine, EngineCommand};
use crate::error::DomError;
use crate::prompt::{Prompt, PromptOutcome};
use crate::sync::ToolbarState;

/// Services a toolbar runs its commands with.
#[derive(Clone)]
pub struct ToolbarContext {
    pub engine: Rc<dyn Engine>,
    pub prompt: Rc<dyn Prompt>,
    pub spawner: Rc<dyn LocalSpawn>,
    pub config: Rc<BinderConfig>,
}

struct Commands {
    context: ToolbarContext,
    // Set while a prompt is pending.
    busy: Cell<bool>,
}

impl Commands {
    fn invoke(self: &Rc<Self>, kind: CommandKind) {
        if self.busy.get() {
            debug!(command = ?kind, "toolbar busy, click ignored");
            return;
        }
        let engine = &self.context.engine;
        match kind.action() {
            CommandAction::Immediate(action) => {
                engine.focus();
                if let Err(err) = action(engine.as_ref()) {
                    warn!(command = ?kind, error = %err, "command failed");
                }
            }
            CommandAction::Prompted { request, answer } => {
                let request = request(engine.as_ref(), &self.context.config);
                debug!(command = ?kind, message = %request.message, "prompting");
                self.busy.set(true);
                let pending = self.context.prompt.request(request);
                let commands = Rc::clone(self);
                let task = async move {
                    let outcome = pending.await;
                    commands.busy.set(false);
                    match outcome {
                        PromptOutcome::Value(value) => match answer(&value) {
                            Some(command) => commands.run(kind, &command),
                            None => debug!(command = ?kind, "empty answer ignored"),
                        },
                        PromptOutcome::Cancelled => debug!(command = ?kind, "prompt cancelled"),
                    }
                };
                if let Err(err) = self.context.spawner.spawn_local(task) {
                    self.busy.set(false);
                    warn!(command = ?kind, error = %err, "failed to spawn prompt");
                }
            }
        }
    }

    fn run(&self, kind: CommandKind, command: &EngineCommand) {
        let engine = self.context.engine.as_ref();
        engine.focus();
        if let Err(err) = engine.apply(command) {
            warn!(command = ?kind, error = %err, "command failed");
        }
    }
}

/// A built toolbar. Dropping it does not detach its listeners; toolbars live
/// as long as the page.
pub struct Toolbar<D: Dom> {
    state: Rc<ToolbarState<D>>,
    commands: Rc<Commands>,
}

impl<D: Dom> Toolbar<D> {
    /// Renders the toolbar into `region` and starts synchronizing it.
    pub fn build(dom: &D, region: &D::Node, context: ToolbarContext) -> Result<Self, DomError> {
        let commands = Rc::new(Commands {
            context,
            busy: Cell::new(false),
        });
        let config = Rc::clone(&commands.context.config);
        let mut state = ToolbarState::new(dom.clone(), &config.active_class);

        for toolset in toolsets() {
            let group = dom.create_element("div")?;
            dom.set_class(&group, &config.toolset_class, true)?;
            for descriptor in toolset {
                let button = dom.create_element("button")?;
                dom.set_attribute(&button, "type", "button")?;
                dom.set_attribute(&button, "title", descriptor.label)?;
                dom.set_inner_html(&button, descriptor.glyph);

                let handler = Rc::clone(&commands);
                let kind = descriptor.kind;
                dom.on_click(&button, Box::new(move || handler.invoke(kind)))?;

                dom.append_child(&group, &button)?;
                state.register(kind, button, descriptor.predicate);
            }
            dom.append_child(region, &group)?;
        }

        let state = Rc::new(state);
        state.attach(commands.context.engine.as_ref());
        Ok(Self { state, commands })
    }

    pub fn state(&self) -> &ToolbarState<D> {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.commands.busy.get()
    }

    /// Runs `kind` as if its button had been clicked.
    pub fn invoke(&self, kind: CommandKind) {
        self.commands.invoke(kind);
    }

    pub fn control(&self, kind: CommandKind) -> Option<D::Node> {
        self.state
            .controls()
            .iter()
            .find(|control| control.kind == kind)
            .map(|control| control.node.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;
    use crate::engine::memory::MemoryEngine;
    use crate::prompt::ScriptedPrompt;
    use futures::executor::LocalPool;
    use pretty_assertions::assert_eq;

    struct Fixture {
        doc: MemoryDocument,
        engine: Rc<MemoryEngine>,
        prompt: ScriptedPrompt,
        pool: LocalPool,
        toolbar: Toolbar<MemoryDocument>,
        region: <MemoryDocument as Dom>::Node,
    }

    fn fixture(content: &str) -> Fixture {
        let doc = MemoryDocument::new();
        let region = doc.create_element("div").unwrap();
        let engine = Rc::new(MemoryEngine::new(content).unwrap());
        let prompt = ScriptedPrompt::new();
        let pool = LocalPool::new();
        let context = ToolbarContext {
            engine: engine.clone(),
            prompt: Rc::new(prompt.clone()),
            spawner: Rc::new(pool.spawner()),
            config: Rc::new(BinderConfig::default()),
        };
        let toolbar = Toolbar::build(&doc, &region, context).unwrap();
        Fixture {
            doc,
            engine,
            prompt,
            pool,
            toolbar,
            region,
        }
    }

    #[test]
    fn renders_toolsets_and_buttons_in_order() {
        let fx = fixture("<p>x</p>");
        let groups = fx.doc.children(fx.region);
        assert_eq!(groups.len(), 5);
        let titles: Vec<Vec<String>> = groups
            .iter()
            .map(|group| {
                assert!(fx.doc.has_class(group, "toolset"));
                fx.doc
                    .children(*group)
                    .iter()
                    .map(|button| {
                        assert_eq!(fx.doc.tag(*button).as_deref(), Some("button"));
                        assert_eq!(fx.doc.attribute(*button, "type").as_deref(), Some("button"));
                        fx.doc.attribute(*button, "title").unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        assert_eq!(titles[1], ["Bold", "Italic", "Underline", "Strikethrough", "Code"]);
        assert_eq!(titles[4], ["Link", "Image"]);
        let bold = fx.toolbar.control(CommandKind::Bold).unwrap();
        assert!(fx.doc.inner_html(bold).starts_with("<svg"));
    }

    #[test]
    fn click_focuses_and_toggles() {
        let fx = fixture("<p>word</p>");
        fx.engine.select(0, 0, 4);
        let bold = fx.toolbar.control(CommandKind::Bold).unwrap();

        assert!(fx.doc.click(bold));
        assert!(fx.engine.is_focused());
        assert_eq!(fx.engine.serialize(), "<p><strong>word</strong></p>");
        assert_eq!(fx.toolbar.state().active_kinds(), vec![CommandKind::Bold]);
        assert!(fx.doc.has_class(&bold, "active"));
    }

    #[test]
    fn pending_prompt_suspends_toolbar() {
        let mut fx = fixture("<p>word</p>");
        fx.engine.select(0, 0, 4);
        let answer = fx.prompt.defer();

        fx.toolbar.invoke(CommandKind::Link);
        fx.pool.run_until_stalled();
        assert!(fx.toolbar.is_busy());

        fx.toolbar.invoke(CommandKind::Bold);
        fx.toolbar.invoke(CommandKind::Image);
        assert_eq!(fx.engine.serialize(), "<p>word</p>");
        assert_eq!(fx.prompt.requests().len(), 1);

        answer.send(PromptOutcome::Value("/docs".to_string())).unwrap();
        fx.pool.run_until_stalled();
        assert!(!fx.toolbar.is_busy());
        assert!(fx.engine.is_focused());
        assert_eq!(
            fx.engine.serialize(),
            r#"<p><a target="_blank" rel="noopener noreferrer nofollow" href="/docs">word</a></p>"#
        );
        assert_eq!(fx.toolbar.state().active_kinds(), vec![CommandKind::Link]);
    }

    #[test]
    fn cancelled_prompt_changes_nothing() {
        let mut fx = fixture(r#"<p><a href="/a">word</a></p>"#);
        fx.engine.select(0, 2, 2);
        fx.prompt.cancel();

        fx.toolbar.invoke(CommandKind::Link);
        fx.pool.run_until_stalled();

        let asked = fx.prompt.requests();
        assert_eq!(asked[0].message, "URL");
        assert_eq!(asked[0].default, "/a");
        assert!(!fx.toolbar.is_busy());
        assert!(!fx.engine.is_focused());
        assert!(fx.engine.serialize().contains("href=\"/a\""));
    }
}
