//! Prompt over `window.prompt`.
//!
//! The browser dialog blocks, so the returned future is already resolved.

use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::warn;
use web_sys::Window;

use super::dom::js_message;
use crate::prompt::{Prompt, PromptOutcome, PromptRequest};

pub struct WindowPrompt {
    window: Window,
}

impl WindowPrompt {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Prompt for WindowPrompt {
    fn request(&self, request: PromptRequest) -> LocalBoxFuture<'static, PromptOutcome> {
        let outcome = match self
            .window
            .prompt_with_message_and_default(&request.message, &request.default)
        {
            Ok(answer) => PromptOutcome::from(answer),
            Err(err) => {
                warn!(error = %js_message(&err), "window.prompt failed");
                PromptOutcome::Cancelled
            }
        };
        future::ready(outcome).boxed_local()
    }
}
