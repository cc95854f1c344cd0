// Shared prompt fragments.
// Each stage that needs LLM calls defines its own prompts.rs alongside it;
// this file holds only the cross-cutting pieces.

/// Closing instruction appended to every prompt that expects a JSON reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Return ONLY the JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or commentary.";

/// Substitutes `{key}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so a job description or resume that
/// happens to contain `{criteria}` is embedded literally. Braces that do not form
/// a known placeholder (the JSON examples in templates) pass through unchanged.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];

        let substitution = values.iter().find_map(|(key, value)| {
            let remainder = after_brace.strip_prefix(*key)?.strip_prefix('}')?;
            Some((*value, remainder))
        });

        match substitution {
            Some((value, remainder)) => {
                out.push_str(value);
                rest = remainder;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }

    out.push_str(rest);
    out
}
