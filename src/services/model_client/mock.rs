//! Canned model client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{GenerationOptions, ModelClient, ProviderError};
use crate::message::ChatMessage;
use crate::schema::Schema;

/// What a stub call returns.
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(Value),
    Fail(String),
}

/// A recorded call.
#[derive(Debug, Clone)]
pub struct StubCall {
    pub conversation: Vec<ChatMessage>,
    pub options: GenerationOptions,
}

/// Replays queued replies in order; the last one repeats once the queue is
/// down to a single entry. Replies are validated against the requested shape
/// the same way the real client does it.
#[derive(Debug)]
pub struct StubModelClient {
    replies: Mutex<VecDeque<StubReply>>,
    calls: Mutex<Vec<StubCall>>,
}

impl StubModelClient {
    pub fn new(replies: impl IntoIterator<Item = StubReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(value: Value) -> Self {
        Self::new([StubReply::Json(value)])
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new([StubReply::Fail(message.into())])
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<StubReply> {
        let mut queue = self.replies.lock().ok()?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn generate_structured(
        &self,
        conversation: &[ChatMessage],
        target: &Schema,
        options: &GenerationOptions,
    ) -> Result<Value, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(StubCall {
                conversation: conversation.to_vec(),
                options: options.clone(),
            });
        }

        match self.next_reply() {
            Some(StubReply::Json(value)) => Ok(target.validate(&value)?),
            Some(StubReply::Fail(message)) => Err(ProviderError::Network(message)),
            None => Err(ProviderError::NotConfigured("stub has no replies".to_string())),
        }
    }
}
