#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use parley_llm::{ChatClient, GenerateRequest, LlmError, StreamEvent, TextStream};
use parley_persist::{ChatStore, InMemoryChatStore, PersistError};
use parley_types::{Chat, ChatMessage};

/// Failure flavor a scripted collaborator should produce.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Permission,
    Generic,
}

impl Fault {
    fn to_llm_error(self) -> LlmError {
        match self {
            Fault::Permission => LlmError::PermissionDenied("scripted denial".to_string()),
            Fault::Generic => LlmError::Stream("scripted failure".to_string()),
        }
    }

    fn to_persist_error(self) -> PersistError {
        match self {
            Fault::Permission => PersistError::PermissionDenied("scripted denial".to_string()),
            Fault::Generic => PersistError::Connection("scripted failure".to_string()),
        }
    }
}

/// One scripted inference exchange.
pub enum Script {
    /// Emit these chunks, then complete.
    Chunks(Vec<&'static str>),
    /// Emit these chunks, then fail mid-stream.
    FailAfter(Vec<&'static str>, Fault),
    /// Fail before the stream opens.
    FailToOpen(Fault),
}

/// Inference fake that plays back scripts in order and records every
/// request it receives.
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn single(chunks: &[&'static str]) -> Arc<Self> {
        Self::new(vec![Script::Chunks(chunks.to_vec())])
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_script(&self) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Chunks(Vec::new()))
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn generate(&self, request: GenerateRequest) -> parley_llm::Result<String> {
        self.requests.lock().unwrap().push(request);
        match self.next_script() {
            Script::Chunks(chunks) => Ok(chunks.concat()),
            Script::FailAfter(_, fault) | Script::FailToOpen(fault) => {
                Err(fault.to_llm_error())
            }
        }
    }

    async fn generate_stream(&self, request: GenerateRequest) -> parley_llm::Result<TextStream> {
        self.requests.lock().unwrap().push(request);

        let events: Vec<parley_llm::Result<StreamEvent>> = match self.next_script() {
            Script::Chunks(chunks) => {
                let mut events: Vec<parley_llm::Result<StreamEvent>> = chunks
                    .into_iter()
                    .map(|c| {
                        Ok(StreamEvent::Message {
                            content: c.to_string(),
                        })
                    })
                    .collect();
                events.push(Ok(StreamEvent::Done {
                    finish_reason: Some("STOP".to_string()),
                }));
                events
            }
            Script::FailAfter(chunks, fault) => {
                let mut events: Vec<parley_llm::Result<StreamEvent>> = chunks
                    .into_iter()
                    .map(|c| {
                        Ok(StreamEvent::Message {
                            content: c.to_string(),
                        })
                    })
                    .collect();
                events.push(Err(fault.to_llm_error()));
                events
            }
            Script::FailToOpen(fault) => return Err(fault.to_llm_error()),
        };

        Ok(Box::pin(stream::iter(events)))
    }
}

/// Chat store whose next load fails with the configured fault, then
/// delegates to an in-memory store. Writes always delegate.
pub struct FlakyStore {
    inner: InMemoryChatStore,
    fail_next_load: AtomicBool,
    fault: Fault,
}

impl FlakyStore {
    pub fn failing_load(fault: Fault) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryChatStore::new(),
            fail_next_load: AtomicBool::new(true),
            fault,
        })
    }

    pub fn inner(&self) -> &InMemoryChatStore {
        &self.inner
    }
}

#[async_trait]
impl ChatStore for FlakyStore {
    async fn load_chats(&self, user_id: &str) -> parley_persist::Result<Vec<Chat>> {
        if self.fail_next_load.swap(false, Ordering::SeqCst) {
            return Err(self.fault.to_persist_error());
        }
        self.inner.load_chats(user_id).await
    }

    async fn upsert_chat(&self, user_id: &str, chat: &Chat) -> parley_persist::Result<()> {
        self.inner.upsert_chat(user_id, chat).await
    }

    async fn update_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[ChatMessage],
    ) -> parley_persist::Result<()> {
        self.inner.update_messages(user_id, chat_id, messages).await
    }

    async fn update_title(
        &self,
        user_id: &str,
        chat_id: &str,
        title: &str,
    ) -> parley_persist::Result<()> {
        self.inner.update_title(user_id, chat_id, title).await
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> parley_persist::Result<()> {
        self.inner.delete_chat(user_id, chat_id).await
    }
}
