//! Toolbar command registry.
//!
//! Every command is a [`CommandKind`]; its label, glyph, action and
//! activation predicate come from exhaustive lookups on the kind, and
//! [`TOOLBAR`] orders the kinds into toolsets. Actions and predicates are
//! plain functions that receive the engine they run against.

use serde_json::{json, Value};

use crate::config::BinderConfig;
use crate::engine::{Engine, EngineCommand, MarkKind};
use crate::error::EngineError;
use crate::glyphs;
use crate::prompt::PromptRequest;

/// Whether a command is currently on for `engine`'s selection.
pub type ActivationPredicate = fn(&dyn Engine) -> Result<bool, EngineError>;

/// Runs a command that needs no input.
pub type ExecutionAction = fn(&dyn Engine) -> Result<(), EngineError>;

/// Builds the prompt shown before a prompted command runs.
pub type PromptBuilder = fn(&dyn Engine, &BinderConfig) -> PromptRequest;

/// Turns a prompt answer into the command to run; `None` means do nothing.
pub type AnswerHandler = fn(&str) -> Option<EngineCommand>;

#[derive(Clone, Copy)]
pub enum CommandAction {
    Immediate(ExecutionAction),
    Prompted {
        request: PromptBuilder,
        answer: AnswerHandler,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    Heading2,
    Heading3,
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    BulletList,
    OrderedList,
    Blockquote,
    Link,
    Image,
}

/// Toolsets in display order.
pub const TOOLBAR: &[&[CommandKind]] = &[
    &[CommandKind::Heading2, CommandKind::Heading3],
    &[
        CommandKind::Bold,
        CommandKind::Italic,
        CommandKind::Underline,
        CommandKind::Strike,
        CommandKind::Code,
    ],
    &[CommandKind::BulletList, CommandKind::OrderedList],
    &[CommandKind::Blockquote],
    &[CommandKind::Link, CommandKind::Image],
];

fn heading_active(engine: &dyn Engine, level: u8) -> Result<bool, EngineError> {
    engine.is_active("heading", &json!({ "level": level }))
}

fn mark_active(engine: &dyn Engine, mark: MarkKind) -> Result<bool, EngineError> {
    engine.is_active(mark.name(), &Value::Null)
}

fn toggle_mark(engine: &dyn Engine, mark: MarkKind) -> Result<(), EngineError> {
    engine.apply(&EngineCommand::ToggleMark(mark))
}

fn url_request(
    engine: &dyn Engine,
    mark: &str,
    key: &str,
    message: &str,
    config: &BinderConfig,
) -> PromptRequest {
    PromptRequest {
        message: message.to_string(),
        default: engine
            .attribute(mark, key)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| config.default_url.clone()),
    }
}

impl CommandKind {
    pub const ALL: [CommandKind; 12] = [
        CommandKind::Heading2,
        CommandKind::Heading3,
        CommandKind::Bold,
        CommandKind::Italic,
        CommandKind::Underline,
        CommandKind::Strike,
        CommandKind::Code,
        CommandKind::BulletList,
        CommandKind::OrderedList,
        CommandKind::Blockquote,
        CommandKind::Link,
        CommandKind::Image,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CommandKind::Heading2 => "Heading 2",
            CommandKind::Heading3 => "Heading 3",
            CommandKind::Bold => "Bold",
            CommandKind::Italic => "Italic",
            CommandKind::Underline => "Underline",
            CommandKind::Strike => "Strikethrough",
            CommandKind::Code => "Code",
            CommandKind::BulletList => "Bulleted List",
            CommandKind::OrderedList => "Numbered List",
            CommandKind::Blockquote => "Blockquote",
            CommandKind::Link => "Link",
            CommandKind::Image => "Image",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CommandKind::Heading2 => glyphs::HEADING_2,
            CommandKind::Heading3 => glyphs::HEADING_3,
            CommandKind::Bold => glyphs::BOLD,
            CommandKind::Italic => glyphs::ITALIC,
            CommandKind::Underline => glyphs::UNDERLINE,
            CommandKind::Strike => glyphs::STRIKE,
            CommandKind::Code => glyphs::CODE,
            CommandKind::BulletList => glyphs::BULLET_LIST,
            CommandKind::OrderedList => glyphs::ORDERED_LIST,
            CommandKind::Blockquote => glyphs::BLOCKQUOTE,
            CommandKind::Link => glyphs::LINK,
            CommandKind::Image => glyphs::IMAGE,
        }
    }

    pub fn predicate(self) -> ActivationPredicate {
        match self {
            CommandKind::Heading2 => |engine| heading_active(engine, 2),
            CommandKind::Heading3 => |engine| heading_active(engine, 3),
            CommandKind::Bold => |engine| mark_active(engine, MarkKind::Bold),
            CommandKind::Italic => |engine| mark_active(engine, MarkKind::Italic),
            CommandKind::Underline => |engine| mark_active(engine, MarkKind::Underline),
            CommandKind::Strike => |engine| mark_active(engine, MarkKind::Strike),
            CommandKind::Code => |engine| mark_active(engine, MarkKind::Code),
            CommandKind::BulletList => |engine| engine.is_active("bulletList", &Value::Null),
            CommandKind::OrderedList => |engine| engine.is_active("orderedList", &Value::Null),
            CommandKind::Blockquote => |engine| engine.is_active("blockquote", &Value::Null),
            CommandKind::Link => |engine| engine.is_active("link", &Value::Null),
            CommandKind::Image => |engine| engine.is_active("image", &Value::Null),
        }
    }

    pub fn action(self) -> CommandAction {
        use self::CommandAction::Immediate;

        match self {
            CommandKind::Heading2 => {
                Immediate(|engine| engine.apply(&EngineCommand::ToggleHeading { level: 2 }))
            }
            CommandKind::Heading3 => {
                Immediate(|engine| engine.apply(&EngineCommand::ToggleHeading { level: 3 }))
            }
            CommandKind::Bold => Immediate(|engine| toggle_mark(engine, MarkKind::Bold)),
            CommandKind::Italic => Immediate(|engine| toggle_mark(engine, MarkKind::Italic)),
            CommandKind::Underline => Immediate(|engine| toggle_mark(engine, MarkKind::Underline)),
            CommandKind::Strike => Immediate(|engine| toggle_mark(engine, MarkKind::Strike)),
            CommandKind::Code => Immediate(|engine| toggle_mark(engine, MarkKind::Code)),
            CommandKind::BulletList => {
                Immediate(|engine| engine.apply(&EngineCommand::ToggleBulletList))
            }
            CommandKind::OrderedList => {
                Immediate(|engine| engine.apply(&EngineCommand::ToggleOrderedList))
            }
            CommandKind::Blockquote => {
                Immediate(|engine| engine.apply(&EngineCommand::ToggleBlockquote))
            }
            CommandKind::Link => CommandAction::Prompted {
                request: |engine, config| {
                    url_request(engine, "link", "href", &config.link_prompt, config)
                },
                answer: |url| {
                    Some(if url.is_empty() {
                        EngineCommand::UnsetLink
                    } else {
                        EngineCommand::SetLink {
                            href: url.to_string(),
                        }
                    })
                },
            },
            CommandKind::Image => CommandAction::Prompted {
                request: |engine, config| {
                    url_request(engine, "image", "src", &config.image_prompt, config)
                },
                answer: |url| {
                    (!url.is_empty()).then(|| EngineCommand::SetImage {
                        src: url.to_string(),
                    })
                },
            },
        }
    }

    pub fn descriptor(self) -> CommandDescriptor {
        CommandDescriptor {
            kind: self,
            label: self.label(),
            glyph: self.glyph(),
            action: self.action(),
            predicate: self.predicate(),
        }
    }
}

/// Everything the toolbar needs to render and drive one command.
#[derive(Clone, Copy)]
pub struct CommandDescriptor {
    pub kind: CommandKind,
    pub label: &'static str,
    pub glyph: &'static str,
    pub action: CommandAction,
    pub predicate: ActivationPredicate,
}

/// Descriptors grouped by toolset, in display order.
pub fn toolsets() -> Vec<Vec<CommandDescriptor>> {
    TOOLBAR
        .iter()
        .map(|toolset| toolset.iter().map(|kind| kind.descriptor()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use pretty_assertions::assert_eq;

    fn labels() -> Vec<Vec<&'static str>> {
        toolsets()
            .iter()
            .map(|toolset| toolset.iter().map(|d| d.label).collect())
            .collect()
    }

    #[test]
    fn layout_matches_display_order() {
        assert_eq!(
            labels(),
            vec![
                vec!["Heading 2", "Heading 3"],
                vec!["Bold", "Italic", "Underline", "Strikethrough", "Code"],
                vec!["Bulleted List", "Numbered List"],
                vec!["Blockquote"],
                vec!["Link", "Image"],
            ]
        );
        let flattened: Vec<CommandKind> = TOOLBAR.iter().flat_map(|t| t.iter().copied()).collect();
        assert_eq!(flattened, CommandKind::ALL.to_vec());
    }

    #[test]
    fn glyphs_are_svg() {
        for kind in CommandKind::ALL {
            assert!(kind.glyph().starts_with("<svg"), "{kind:?}");
        }
    }

    #[test]
    fn immediate_actions_flip_their_predicate() {
        let engine = MemoryEngine::new("<p>text</p>").unwrap();
        engine.select(0, 0, 4);
        let engine: &dyn Engine = &engine;
        for kind in CommandKind::ALL {
            let CommandAction::Immediate(action) = kind.action() else {
                continue;
            };
            let before = (kind.predicate())(engine).unwrap();
            action(engine).unwrap();
            assert_eq!((kind.predicate())(engine).unwrap(), !before, "{kind:?}");
            action(engine).unwrap();
            assert_eq!((kind.predicate())(engine).unwrap(), before, "{kind:?}");
        }
        assert_eq!(engine.serialize(), "<p>text</p>");
    }

    #[test]
    fn link_answers() {
        let CommandAction::Prompted { answer, .. } = CommandKind::Link.action() else {
            panic!("link is prompted");
        };
        assert_eq!(answer(""), Some(EngineCommand::UnsetLink));
        assert_eq!(
            answer("/x"),
            Some(EngineCommand::SetLink {
                href: "/x".to_string()
            })
        );
    }

    #[test]
    fn empty_image_answer_does_nothing() {
        let CommandAction::Prompted { answer, .. } = CommandKind::Image.action() else {
            panic!("image is prompted");
        };
        assert_eq!(answer(""), None);
        assert_eq!(
            answer("/cat.png"),
            Some(EngineCommand::SetImage {
                src: "/cat.png".to_string()
            })
        );
    }

    #[test]
    fn prompt_defaults_to_current_url() {
        let config = BinderConfig::default();
        let memory = MemoryEngine::new(r#"<p><a href="/here">x</a> y</p>"#).unwrap();
        let CommandAction::Prompted { request, .. } = CommandKind::Link.action() else {
            panic!("link is prompted");
        };

        memory.select(0, 1, 1);
        let inside = request(&memory, &config);
        assert_eq!(inside.message, "URL");
        assert_eq!(inside.default, "/here");

        memory.select(0, 3, 3);
        assert_eq!(request(&memory, &config).default, "https://");
    }
}
