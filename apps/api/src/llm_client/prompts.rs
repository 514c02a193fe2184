// Shared prompt fragments. Feature modules keep their own prompts.rs and
// pull these in where they need them.

/// Appended to prompts whose answer is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with the JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Asks the model to stick to products that exist today.
pub const ACCURACY_INSTRUCTION: &str = "IMPORTANT: Search for current, real tools that exist today. \
    Include accurate pricing, real websites, and factual information.";
