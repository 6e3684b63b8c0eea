// Shared prompt fragments. Each agent keeps its own templates in
// agents/prompts.rs; this file holds the cross-cutting pieces.

/// Appended to every structured-mode prompt. The provider is already asked
/// for `application/json`, this keeps fenced or chatty output rare.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to free-text prompts that end up in an email body.
pub const NO_PLACEHOLDER_INSTRUCTION: &str = "Do not use bracketed placeholders like [Your Name]. \
    Use placeholder tags like <CANDIDATE_NAME> instead if needed.";
