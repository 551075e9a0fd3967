//! Answer generation: prompt assembly, the Ollama chat client and final-answer extraction

pub mod extract;
pub mod ollama;
pub mod prompt;

pub use extract::extract_final_answer;
pub use ollama::{ChatMessage, OllamaClient};
pub use prompt::PromptBuilder;

/// Reply returned whenever the language model cannot be reached
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error connecting to the local LLM.";
