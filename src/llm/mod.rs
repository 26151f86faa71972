//! LLM provider clients
//!
//! Every travel agent talks to its model through [`LLMClient`]. Which backend
//! serves the calls is chosen by the `[provider]` table of `tripflow.toml`.
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use tripflow::llm::Provider;
//!
//! let provider = Provider::from_config(&config.provider)?;
//! let client = provider.create_client()?;
//! let answer = client.generate_with_system("Be brief.", "Best month for Kyoto?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
