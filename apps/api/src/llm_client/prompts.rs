// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System instruction for calls whose output is parsed line by line.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a precise environmental assistant. \
    Respond in plain text only. \
    Do NOT use markdown, asterisks, bullets, or headings. \
    Do NOT include introductions, explanations, or apologies.";
