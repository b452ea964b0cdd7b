// Tree recommendations: prompt building, generation, and extraction of
// structured records from the model's free-text answer.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod service;
