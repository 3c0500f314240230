//! Resume-to-JD analysis: the LLM round-trip and its HTTP orchestration.

pub mod analyzer;
pub mod handlers;
