// Cross-cutting prompt fragments. Each service keeps its own prompts.rs
// alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that sees candidate or job text.
pub const NEUTRALITY_INSTRUCTION: &str = "\
    Judge only demonstrable skills. Never reference or infer names, gender, age, \
    ethnicity, religion, photos, or the institution a person attended.";
