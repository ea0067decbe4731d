//! URL prompt used by the link and image commands.
//!
//! A prompt is an async request that resolves to the entered text or to
//! cancellation. It never times out; the toolbar stays suspended until it
//! resolves.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub message: String,
    /// Pre-filled answer.
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Value(String),
    Cancelled,
}

impl From<Option<String>> for PromptOutcome {
    fn from(value: Option<String>) -> Self {
        value.map_or(PromptOutcome::Cancelled, PromptOutcome::Value)
    }
}

pub trait Prompt {
    fn request(&self, request: PromptRequest) -> LocalBoxFuture<'static, PromptOutcome>;
}

enum Answer {
    Ready(PromptOutcome),
    Deferred(oneshot::Receiver<PromptOutcome>),
}

#[derive(Default)]
struct Script {
    answers: VecDeque<Answer>,
    asked: Vec<PromptRequest>,
}

/// Prompt that replays queued answers in order and records what it was asked.
///
/// Runs out as cancellation. Clones share the same queue.
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    script: Rc<RefCell<Script>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, value: &str) {
        self.push(PromptOutcome::Value(value.to_string()));
    }

    pub fn cancel(&self) {
        self.push(PromptOutcome::Cancelled);
    }

    pub fn push(&self, outcome: PromptOutcome) {
        self.script
            .borrow_mut()
            .answers
            .push_back(Answer::Ready(outcome));
    }

    /// Queues an answer supplied later through the returned sender. Dropping
    /// the sender cancels the prompt.
    pub fn defer(&self) -> oneshot::Sender<PromptOutcome> {
        let (sender, receiver) = oneshot::channel();
        self.script
            .borrow_mut()
            .answers
            .push_back(Answer::Deferred(receiver));
        sender
    }

    pub fn requests(&self) -> Vec<PromptRequest> {
        self.script.borrow().asked.clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn request(&self, request: PromptRequest) -> LocalBoxFuture<'static, PromptOutcome> {
        let answer = {
            let mut script = self.script.borrow_mut();
            script.asked.push(request);
            script.answers.pop_front()
        };
        match answer {
            Some(Answer::Ready(outcome)) => future::ready(outcome).boxed_local(),
            Some(Answer::Deferred(receiver)) => receiver
                .map(|answer| answer.unwrap_or(PromptOutcome::Cancelled))
                .boxed_local(),
            None => future::ready(PromptOutcome::Cancelled).boxed_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    fn ask(prompt: &ScriptedPrompt) -> PromptOutcome {
        block_on(prompt.request(PromptRequest {
            message: "URL".to_string(),
            default: "https://".to_string(),
        }))
    }

    #[test]
    fn answers_replay_in_order_then_cancel() {
        let prompt = ScriptedPrompt::new();
        prompt.answer("/a");
        prompt.cancel();
        assert_eq!(ask(&prompt), PromptOutcome::Value("/a".to_string()));
        assert_eq!(ask(&prompt), PromptOutcome::Cancelled);
        assert_eq!(ask(&prompt), PromptOutcome::Cancelled);
        assert_eq!(prompt.requests().len(), 3);
    }

    #[test]
    fn dropped_sender_cancels() {
        let prompt = ScriptedPrompt::new();
        drop(prompt.defer());
        assert_eq!(ask(&prompt), PromptOutcome::Cancelled);

        let sender = prompt.defer();
        sender.send(PromptOutcome::Value(String::new())).unwrap();
        assert_eq!(ask(&prompt), PromptOutcome::Value(String::new()));
    }
}
