//! Locates the JSON object inside a model reply.
//!
//! Models wrap their JSON in code fences or prose even when told not to. These
//! helpers cut out the candidate object span so `serde_json` sees only that.
//! They scan for braces and do not understand JSON strings, so a brace inside
//! surrounding prose or inside a string value can shift the span.

/// Span from the first `{` to the first `}` after it, inclusive.
///
/// Suitable for flat payloads such as `{"criteria": [...]}`.
pub fn narrow_object_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply[start..].find('}')? + start;
    Some(&reply[start..=end])
}

/// Span from the first `{` to the last `}`, inclusive.
///
/// Used for payloads that nest objects inside arrays.
pub fn wide_object_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}
