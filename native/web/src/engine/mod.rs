//! Editing engine capability.
//!
//! The engine owns the rich document, its selection and its history; the
//! binder only drives it through this trait. Two implementations exist:
//! `memory::MemoryEngine` (native, used by tests) and `crate::web::engine`,
//! which forwards to an editor living in JavaScript.
//!
//! Notification ordering: every listener registered with
//! [`Engine::on_state_change`] and the change callback handed to
//! [`EngineFactory::create`] run synchronously, inside the engine call that
//! caused them, before that call returns.

use std::rc::Rc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::dom::Dom;
use crate::error::EngineError;

pub mod html;
pub mod memory;
pub mod model;

/// Kind of state change an engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The selection moved without a content change.
    Selection,
    /// A transaction was dispatched (content, stored marks or selection).
    Transaction,
}

impl StateChange {
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "selectionUpdate" => Some(Self::Selection),
            "transaction" => Some(Self::Transaction),
            _ => None,
        }
    }
}

/// Receives every state change together with the engine that produced it.
pub type StateListener = Box<dyn Fn(&dyn Engine, StateChange)>;

/// Receives the engine after each content change.
pub type ChangeCallback = Box<dyn Fn(&dyn Engine)>;

pub trait Engine {
    /// Current content as HTML.
    fn serialize(&self) -> String;

    /// Whether the node or mark `name` (with matching `params`) is active at
    /// the current selection.
    fn is_active(&self, name: &str, params: &Value) -> Result<bool, EngineError>;

    /// Runs a named command, see [`EngineCommand`] for the vocabulary.
    fn apply_command(&self, name: &str, params: &Value) -> Result<(), EngineError>;

    /// Attributes of `mark` (or inline node) at the selection, empty if absent.
    fn attributes(&self, mark: &str) -> Map<String, Value>;

    fn on_state_change(&self, listener: StateListener);

    fn focus(&self);
}

impl dyn Engine + '_ {
    pub fn apply(&self, command: &EngineCommand) -> Result<(), EngineError> {
        self.apply_command(command.name(), &command.params())
    }

    /// String attribute of a mark, e.g. the `href` of the current link.
    pub fn attribute(&self, mark: &str, key: &str) -> Option<String> {
        self.attributes(mark)
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

pub trait EngineFactory<D: Dom> {
    /// Creates an engine rendering into `container`, seeded with `content`.
    ///
    /// The seed is not reported through `on_change`.
    fn create(
        &self,
        dom: &D,
        container: &D::Node,
        content: &str,
        on_change: ChangeCallback,
    ) -> Result<Rc<dyn Engine>, EngineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
}

impl MarkKind {
    pub const ALL: [MarkKind; 5] = [
        MarkKind::Bold,
        MarkKind::Italic,
        MarkKind::Underline,
        MarkKind::Strike,
        MarkKind::Code,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strike => "strike",
            MarkKind::Code => "code",
        }
    }

    fn toggle_name(self) -> &'static str {
        match self {
            MarkKind::Bold => "toggleBold",
            MarkKind::Italic => "toggleItalic",
            MarkKind::Underline => "toggleUnderline",
            MarkKind::Strike => "toggleStrike",
            MarkKind::Code => "toggleCode",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mark| mark.name() == name)
    }
}

/// Typed form of the command vocabulary understood by engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    ToggleHeading { level: u8 },
    ToggleMark(MarkKind),
    ToggleBulletList,
    ToggleOrderedList,
    ToggleBlockquote,
    /// Sets the link over the selection extended to the existing link range.
    SetLink { href: String },
    /// Removes the link over the selection extended to the link range.
    UnsetLink,
    SetImage { src: String },
}

#[derive(Deserialize)]
struct LevelParams {
    level: u8,
}

#[derive(Deserialize)]
struct HrefParams {
    href: String,
}

#[derive(Deserialize)]
struct SrcParams {
    src: String,
}

fn params<T: for<'de> Deserialize<'de>>(name: &str, params: &Value) -> Result<T, EngineError> {
    serde_json::from_value(params.clone()).map_err(|source| EngineError::InvalidParams {
        name: name.to_string(),
        source,
    })
}

impl EngineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::ToggleHeading { .. } => "toggleHeading",
            EngineCommand::ToggleMark(mark) => mark.toggle_name(),
            EngineCommand::ToggleBulletList => "toggleBulletList",
            EngineCommand::ToggleOrderedList => "toggleOrderedList",
            EngineCommand::ToggleBlockquote => "toggleBlockquote",
            EngineCommand::SetLink { .. } => "setLink",
            EngineCommand::UnsetLink => "unsetLink",
            EngineCommand::SetImage { .. } => "setImage",
        }
    }

    pub fn params(&self) -> Value {
        match self {
            EngineCommand::ToggleHeading { level } => json!({ "level": level }),
            EngineCommand::SetLink { href } => json!({ "href": href }),
            EngineCommand::SetImage { src } => json!({ "src": src }),
            _ => Value::Null,
        }
    }

    pub fn from_parts(name: &str, value: &Value) -> Result<Self, EngineError> {
        let command = match name {
            "toggleHeading" => {
                let LevelParams { level } = params(name, value)?;
                EngineCommand::ToggleHeading { level }
            }
            "toggleBulletList" => EngineCommand::ToggleBulletList,
            "toggleOrderedList" => EngineCommand::ToggleOrderedList,
            "toggleBlockquote" => EngineCommand::ToggleBlockquote,
            "setLink" => {
                let HrefParams { href } = params(name, value)?;
                EngineCommand::SetLink { href }
            }
            "unsetLink" => EngineCommand::UnsetLink,
            "setImage" => {
                let SrcParams { src } = params(name, value)?;
                EngineCommand::SetImage { src }
            }
            other => {
                let mark = MarkKind::ALL
                    .into_iter()
                    .find(|mark| mark.toggle_name() == other)
                    .ok_or_else(|| EngineError::UnknownCommand(other.to_string()))?;
                EngineCommand::ToggleMark(mark)
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_survive_name_and_params() {
        let commands = [
            EngineCommand::ToggleHeading { level: 3 },
            EngineCommand::ToggleMark(MarkKind::Strike),
            EngineCommand::ToggleOrderedList,
            EngineCommand::SetLink {
                href: "https://example.com".to_string(),
            },
            EngineCommand::UnsetLink,
            EngineCommand::SetImage {
                src: "data:image/png;base64,AAAA".to_string(),
            },
        ];
        for command in commands {
            let parsed = EngineCommand::from_parts(command.name(), &command.params()).unwrap();
            assert_eq!(parsed, command);
        }
    }

    #[test]
    fn missing_params_are_reported() {
        let err = EngineCommand::from_parts("setLink", &Value::Null).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParams { ref name, .. } if name == "setLink"));
        assert!(matches!(
            EngineCommand::from_parts("explode", &Value::Null),
            Err(EngineError::UnknownCommand(_))
        ));
    }

    #[test]
    fn event_names_map_to_state_changes() {
        assert_eq!(
            StateChange::from_event_name("selectionUpdate"),
            Some(StateChange::Selection)
        );
        assert_eq!(
            StateChange::from_event_name("transaction"),
            Some(StateChange::Transaction)
        );
        assert_eq!(StateChange::from_event_name("blur"), None);
    }
}
