// Tool recommendation flow: query model, prompt building, the provider call
// with defensive parsing, result normalization, and the /api/search handlers.
// All provider calls go through llm_client.

pub mod client;
pub mod handlers;
pub mod history;
pub mod normalize;
pub mod prompts;
pub mod query;
