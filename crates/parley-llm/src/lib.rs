pub mod config;
pub mod error;
pub mod gemini;
pub mod streaming;
pub mod traits;

pub use config::{GeminiConfig, DEFAULT_MODEL};
pub use error::{LlmError, Result};
pub use gemini::GeminiClient;
pub use streaming::{StreamEvent, TextStream};
pub use traits::{ChatClient, GenerateOptions, GenerateRequest, Turn, TurnRole};
