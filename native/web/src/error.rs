//! Error types shared by the binder, the toolbar and the engine adapters.

use thiserror::Error;

/// A document tree operation failed.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to create <{tag}> element: {message}")]
    CreateElement { tag: String, message: String },

    #[error("DOM operation `{op}` failed: {message}")]
    Operation { op: &'static str, message: String },

    #[error("node is not attached to a parent")]
    Detached,

    #[error("document has no root element to observe")]
    MissingRoot,
}

/// The editing engine rejected a call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed content at byte {offset}: {reason}")]
    MalformedContent { offset: usize, reason: &'static str },

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("invalid parameters for `{name}`")]
    InvalidParams {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Raised by an engine living outside Rust (for example a JS editor).
    #[error("engine call `{call}` failed: {message}")]
    Host { call: &'static str, message: String },
}

/// Binding one host element to an editing surface failed.
///
/// Always scoped to a single host; discovery logs it and moves on.
#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("editing engine could not be constructed")]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid binder configuration")]
    Json(#[from] serde_json::Error),
}
