// Prompt template for tool recommendations.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{ACCURACY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::recommend::query::Query;

/// Recommendation prompt template.
/// Replace: {accuracy_instruction}, {json_instruction}, {budget}, {category},
///          {platform}, {privacy}, {use_case}, {additional}
pub const RECOMMEND_PROMPT_TEMPLATE: &str = r#"You are an expert tool recommendation system. Based on the following requirements, provide exactly 3-5 tool recommendations with detailed analysis. Use real-time search to ensure accuracy.

USER REQUIREMENTS:
- Use Case: {use_case}
- Budget: {budget}
- Category: {category}
- Platform: {platform}
- Privacy: {privacy}
- Additional Requirements: {additional}

{accuracy_instruction}

Provide your response in the following JSON format:
{
  "recommendations": [
    {
      "rank": 1,
      "name": "Tool Name",
      "tagline": "Brief description in one line",
      "description": "Detailed description of the tool and how it matches the requirements",
      "website": "https://actual-website.com",
      "pricing": "Specific pricing details (e.g., Free tier available, $19/month for Pro)",
      "trialAvailable": true,
      "pros": ["Pro 1 specific to use case", "Pro 2", "Pro 3"],
      "cons": ["Con 1 specific to use case", "Con 2"],
      "confidence": 85,
      "reasoning": "Why this tool is recommended for this specific use case",
      "keyFeatures": ["Feature 1", "Feature 2", "Feature 3", "Feature 4"],
      "alternativesConsidered": "Brief mention of why this was chosen over similar tools"
    }
  ],
  "summary": "Brief summary of the recommendations and any important considerations",
  "additionalNotes": "Any caveats, tips, or additional information the user should know"
}

"trialAvailable" is a boolean. "confidence" is an integer from 0 to 100. "rank" starts at 1.
{json_instruction}

Ensure all recommendations are real, currently available tools with accurate information."#;

/// Field names the model must return. Kept next to the template so tests can
/// check that every one of them is spelled out.
pub const RESPONSE_SCHEMA_FIELDS: &[&str] = &[
    "recommendations",
    "rank",
    "name",
    "tagline",
    "description",
    "website",
    "pricing",
    "trialAvailable",
    "pros",
    "cons",
    "confidence",
    "reasoning",
    "keyFeatures",
    "alternativesConsidered",
    "summary",
    "additionalNotes",
];

/// Builds the recommendation prompt. Pure: identical queries give identical text.
pub fn build_prompt(query: &Query) -> String {
    // Use case goes in last: it is the field most likely to contain braces.
    RECOMMEND_PROMPT_TEMPLATE
        .replace("{accuracy_instruction}", ACCURACY_INSTRUCTION)
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{budget}", query.budget.phrase())
        .replace("{privacy}", query.privacy.phrase())
        .replace("{category}", &query.category_phrase())
        .replace("{platform}", &query.platform_phrase())
        .replace("{additional}", query.additional_phrase())
        .replace("{use_case}", query.use_case.trim())
}
