//! In-memory editing engine.
//!
//! Keeps a [`Block`] document, a single-block selection and stored marks, and
//! renders its HTML into the container it was created for. Every dispatch
//! reports, in order: `Transaction`, then `Selection` if the selection moved,
//! then the change callback if the document changed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::{json, Map, Value};

use super::html;
use super::model::{Atom, Block, Marks, TextKind, Wrapper};
use super::{
    ChangeCallback, Engine, EngineCommand, EngineFactory, MarkKind, StateChange, StateListener,
};
use crate::dom::Dom;
use crate::error::EngineError;

/// Selection inside one block; `anchor` and `head` are atom positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub block: usize,
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

#[derive(Debug, Clone)]
struct EngineState {
    blocks: Vec<Block>,
    selection: Selection,
    // Marks for the next insertion at an empty selection, if toggled there.
    stored_marks: Option<Marks>,
}

impl EngineState {
    fn block(&self) -> &Block {
        &self.blocks[self.selection.block]
    }

    fn block_mut(&mut self) -> &mut Block {
        &mut self.blocks[self.selection.block]
    }

    fn effective_marks(&self) -> Marks {
        self.stored_marks
            .clone()
            .unwrap_or_else(|| self.block().marks_at(self.selection.head))
    }

    /// True when every character in the selection satisfies `test`, or, for
    /// an empty selection, when the cursor marks do.
    fn marks_active(&self, test: impl Fn(&Marks) -> bool) -> bool {
        if self.selection.is_empty() {
            return test(&self.effective_marks());
        }
        let atoms = &self.block().atoms[self.selection.from()..self.selection.to()];
        let mut chars = atoms.iter().filter_map(Atom::marks).peekable();
        chars.peek().is_some() && chars.all(test)
    }

    fn selected_image(&self) -> Option<&str> {
        let selection = self.selection;
        if selection.to() - selection.from() != 1 {
            return None;
        }
        match &self.block().atoms[selection.from()] {
            Atom::Image { src } => Some(src),
            _ => None,
        }
    }

    fn link_at_selection(&self) -> Option<String> {
        if self.selection.is_empty() {
            return self.effective_marks().link;
        }
        self.block().atoms[self.selection.from()..self.selection.to()]
            .iter()
            .find_map(|atom| atom.link().map(str::to_string))
    }

    fn toggle_mark(&mut self, mark: MarkKind) {
        if self.selection.is_empty() {
            let mut marks = self.effective_marks();
            marks.set(mark, !marks.has(mark));
            self.stored_marks = Some(marks);
            return;
        }
        let on = !self.marks_active(|marks| marks.has(mark));
        let (from, to) = (self.selection.from(), self.selection.to());
        for atom in &mut self.block_mut().atoms[from..to] {
            if let Some(marks) = atom.marks_mut() {
                marks.set(mark, on);
            }
        }
    }

    fn toggle_heading(&mut self, level: u8) {
        let level = level.clamp(1, 6);
        let block = self.block_mut();
        block.kind = if block.kind == TextKind::Heading(level) {
            TextKind::Paragraph
        } else {
            TextKind::Heading(level)
        };
    }

    fn toggle_wrapper(&mut self, wrapper: Wrapper) {
        let block = self.block_mut();
        block.wrapper = if block.wrapper == Some(wrapper) {
            None
        } else {
            Some(wrapper)
        };
    }

    fn set_link(&mut self, href: Option<String>) {
        let (from, to) = self
            .block()
            .extend_link_range(self.selection.from(), self.selection.to());
        for atom in &mut self.block_mut().atoms[from..to] {
            if let Some(marks) = atom.marks_mut() {
                marks.link = href.clone();
            }
        }
        if from != to {
            self.selection.anchor = from;
            self.selection.head = to;
        }
    }

    fn replace_selection(&mut self, atoms: Vec<Atom>) {
        let (from, to) = (self.selection.from(), self.selection.to());
        let inserted = atoms.len();
        self.block_mut().atoms.splice(from..to, atoms);
        self.selection.anchor = from + inserted;
        self.selection.head = from + inserted;
        self.stored_marks = None;
    }

    fn select(&mut self, block: usize, from: usize, to: usize) {
        let block = block.min(self.blocks.len() - 1);
        let len = self.blocks[block].len();
        self.selection = Selection {
            block,
            anchor: from.min(len),
            head: to.min(len),
        };
        self.stored_marks = None;
    }
}

pub struct MemoryEngine {
    state: RefCell<EngineState>,
    listeners: RefCell<Vec<Rc<dyn Fn(&dyn Engine, StateChange)>>>,
    on_change: ChangeCallback,
    view: Option<Box<dyn Fn(&str)>>,
    focused: Cell<bool>,
}

impl fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("state", &self.state.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .field("focused", &self.focused.get())
            .finish()
    }
}

impl MemoryEngine {
    /// Standalone engine with no view and no change callback.
    pub fn new(content: &str) -> Result<Self, EngineError> {
        Self::with_callbacks(content, Box::new(|_| {}), None)
    }

    fn with_callbacks(
        content: &str,
        on_change: ChangeCallback,
        view: Option<Box<dyn Fn(&str)>>,
    ) -> Result<Self, EngineError> {
        let engine = Self {
            state: RefCell::new(EngineState {
                blocks: html::parse(content)?,
                selection: Selection::default(),
                stored_marks: None,
            }),
            listeners: RefCell::new(Vec::new()),
            on_change,
            view,
            focused: Cell::new(false),
        };
        engine.render();
        Ok(engine)
    }

    fn render(&self) {
        if let Some(view) = &self.view {
            view(&self.serialize());
        }
    }

    fn emit(&self, change: StateChange) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(self, change);
        }
    }

    fn dispatch(&self, update: impl FnOnce(&mut EngineState)) {
        let (doc_changed, selection_changed) = {
            let mut state = self.state.borrow_mut();
            let blocks = state.blocks.clone();
            let selection = state.selection;
            update(&mut state);
            (state.blocks != blocks, state.selection != selection)
        };
        if doc_changed {
            self.render();
        }
        self.emit(StateChange::Transaction);
        if selection_changed {
            self.emit(StateChange::Selection);
        }
        if doc_changed {
            (self.on_change)(self);
        }
    }

    pub fn selection(&self) -> Selection {
        self.state.borrow().selection
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    /// Selects `from..to` in `block`, clamped to the document.
    pub fn select(&self, block: usize, from: usize, to: usize) {
        self.dispatch(|state| state.select(block, from, to));
    }

    /// Selects the first occurrence of `needle`. Returns false if absent.
    pub fn select_text(&self, needle: &str) -> bool {
        let found = {
            let state = self.state.borrow();
            state.blocks.iter().enumerate().find_map(|(index, block)| {
                let text: Vec<char> = block.text().chars().collect();
                let needle: Vec<char> = needle.chars().collect();
                if needle.is_empty() || needle.len() > text.len() {
                    return None;
                }
                text.windows(needle.len())
                    .position(|window| window == needle.as_slice())
                    .map(|start| (index, start, start + needle.len()))
            })
        };
        match found {
            Some((block, from, to)) => {
                self.select(block, from, to);
                true
            }
            None => false,
        }
    }

    /// Replaces the selection with `text`, carrying the cursor marks.
    pub fn insert_text(&self, text: &str) {
        self.dispatch(|state| {
            let marks = state.effective_marks();
            let atoms = text.chars().map(|c| Atom::Char(c, marks.clone())).collect();
            state.replace_selection(atoms);
        });
    }
}

impl Engine for MemoryEngine {
    fn serialize(&self) -> String {
        html::serialize(&self.state.borrow().blocks)
    }

    fn is_active(&self, name: &str, params: &Value) -> Result<bool, EngineError> {
        let state = self.state.borrow();
        let block = state.block();
        let active = match name {
            "heading" => match block.kind {
                TextKind::Heading(level) => params
                    .get("level")
                    .and_then(Value::as_u64)
                    .map_or(true, |wanted| wanted == u64::from(level)),
                TextKind::Paragraph => false,
            },
            "bulletList" => block.wrapper == Some(Wrapper::BulletList),
            "orderedList" => block.wrapper == Some(Wrapper::OrderedList),
            "blockquote" => block.wrapper == Some(Wrapper::Blockquote),
            "image" => state.selected_image().is_some(),
            "link" => {
                let wanted = params.get("href").and_then(Value::as_str);
                state.marks_active(|marks| match (&marks.link, wanted) {
                    (Some(href), Some(wanted)) => href == wanted,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
            }
            other => {
                let mark = MarkKind::from_name(other)
                    .ok_or_else(|| EngineError::UnknownCommand(other.to_string()))?;
                state.marks_active(|marks| marks.has(mark))
            }
        };
        Ok(active)
    }

    fn apply_command(&self, name: &str, params: &Value) -> Result<(), EngineError> {
        let command = EngineCommand::from_parts(name, params)?;
        self.dispatch(|state| match command {
            EngineCommand::ToggleHeading { level } => state.toggle_heading(level),
            EngineCommand::ToggleMark(mark) => state.toggle_mark(mark),
            EngineCommand::ToggleBulletList => state.toggle_wrapper(Wrapper::BulletList),
            EngineCommand::ToggleOrderedList => state.toggle_wrapper(Wrapper::OrderedList),
            EngineCommand::ToggleBlockquote => state.toggle_wrapper(Wrapper::Blockquote),
            EngineCommand::SetLink { href } => state.set_link(Some(href)),
            EngineCommand::UnsetLink => state.set_link(None),
            EngineCommand::SetImage { src } => state.replace_selection(vec![Atom::Image { src }]),
        });
        Ok(())
    }

    fn attributes(&self, mark: &str) -> Map<String, Value> {
        let state = self.state.borrow();
        let attributes = match mark {
            "link" => state.link_at_selection().map(|href| json!({ "href": href })),
            "image" => state.selected_image().map(|src| json!({ "src": src })),
            _ => None,
        };
        match attributes {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    fn on_state_change(&self, listener: StateListener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }

    fn focus(&self) {
        self.focused.set(true);
    }
}

/// Creates [`MemoryEngine`]s that render into their container's inner HTML.
///
/// Keeps every engine it created so callers can drive selection and typing.
#[derive(Debug, Default)]
pub struct MemoryEngineFactory {
    created: RefCell<Vec<Rc<MemoryEngine>>>,
}

impl MemoryEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engines(&self) -> Vec<Rc<MemoryEngine>> {
        self.created.borrow().clone()
    }
}

impl<D: Dom> EngineFactory<D> for MemoryEngineFactory {
    fn create(
        &self,
        dom: &D,
        container: &D::Node,
        content: &str,
        on_change: ChangeCallback,
    ) -> Result<Rc<dyn Engine>, EngineError> {
        let dom = dom.clone();
        let container = container.clone();
        let view: Box<dyn Fn(&str)> = Box::new(move |html| dom.set_inner_html(&container, html));
        let engine = Rc::new(MemoryEngine::with_callbacks(content, on_change, Some(view))?);
        self.created.borrow_mut().push(Rc::clone(&engine));
        Ok(engine)
    }
}
