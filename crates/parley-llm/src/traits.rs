use crate::error::Result;
use crate::streaming::TextStream;
use async_trait::async_trait;

/// Trait for text-generation backends.
///
/// Provides both a single-shot completion and a streaming variant. The
/// streaming call yields a lazy, finite, non-restartable sequence of text
/// increments terminated by request completion.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming generation; returns the final text.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;

    /// Streaming generation.
    async fn generate_stream(&self, request: GenerateRequest) -> Result<TextStream>;
}

/// One conversational turn of the request history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    /// Full ordered history, oldest to newest.
    pub turns: Vec<Turn>,
    /// Fixed per-request behavior instruction; never part of the history.
    pub system_instruction: Option<String>,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            turns,
            system_instruction: None,
            options: GenerateOptions::default(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}
