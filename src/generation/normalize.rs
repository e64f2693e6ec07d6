use serde_json::Value;

/// Pull plain text out of a provider reply without assuming one envelope
/// shape. Checked in fixed priority order: bare string, flat text field,
/// candidate/parts nesting, outputs nesting. An unrecognized envelope is
/// serialized as-is so the caller always gets something renderable.
pub fn normalize_reply(reply: &Value) -> String {
    if let Value::String(s) = reply {
        return s.clone();
    }

    for key in ["text", "outputText"] {
        if let Some(Value::String(s)) = reply.get(key) {
            return s.clone();
        }
    }

    if let Some(Value::Array(candidates)) = reply.get("candidates") {
        for candidate in candidates {
            let text = collect_text(candidate);
            if !text.is_empty() {
                return text;
            }
        }
    }

    if let Some(Value::Array(outputs)) = reply.get("outputs") {
        for output in outputs {
            let text = collect_text(output);
            if !text.is_empty() {
                return text;
            }
        }
    }

    reply.to_string()
}

/// Concatenate every nested `text` leaf under a candidate or output node.
/// Handles `content` as either a parts list or an object holding `parts`.
fn collect_text(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(collect_text).collect(),
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get("text") {
                return s.clone();
            }
            for key in ["content", "parts", "output"] {
                if let Some(inner) = map.get(key) {
                    let text = collect_text(inner);
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
            String::new()
        }
        _ => String::new(),
    }
}

/// Drop a surrounding triple-backtick block (with optional language tag)
/// so the stored code is the markup itself, not a markdown rendering of it.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // First line after the opening fence is the optional language tag.
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => return trimmed.to_string(),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_passes_through() {
        assert_eq!(normalize_reply(&json!("Z")), "Z");
    }

    #[test]
    fn flat_text_fields() {
        assert_eq!(normalize_reply(&json!({"text": "hello"})), "hello");
        assert_eq!(normalize_reply(&json!({"outputText": "hi"})), "hi");
    }

    #[test]
    fn candidates_with_parts_list_are_concatenated() {
        let reply = json!({"candidates": [{"content": [{"text": "X"}, {"text": "Y"}]}]});
        assert_eq!(normalize_reply(&reply), "XY");
    }

    #[test]
    fn candidates_with_parts_object() {
        // The shape the Gemini REST API actually returns.
        let reply = json!({
            "candidates": [{"content": {"parts": [{"text": "<div>hi</div>"}], "role": "model"}}]
        });
        assert_eq!(normalize_reply(&reply), "<div>hi</div>");
    }

    #[test]
    fn empty_candidate_falls_through_to_next() {
        let reply = json!({"candidates": [{"content": []}, {"content": [{"text": "B"}]}]});
        assert_eq!(normalize_reply(&reply), "B");
    }

    #[test]
    fn outputs_nesting() {
        let reply = json!({"outputs": [{"content": [{"text": "out"}]}]});
        assert_eq!(normalize_reply(&reply), "out");
    }

    #[test]
    fn unrecognized_shape_serializes_instead_of_panicking() {
        let reply = json!({"foo": 1});
        assert_eq!(normalize_reply(&reply), "{\"foo\":1}");
    }

    #[test]
    fn strips_fence_with_language_tag() {
        let text = "```html\n<div>x</div>\n```";
        assert_eq!(strip_code_fences(text), "<div>x</div>");
    }

    #[test]
    fn strips_bare_fence() {
        let text = "```\n<p>y</p>\n```";
        assert_eq!(strip_code_fences(text), "<p>y</p>");
    }

    #[test]
    fn unfenced_text_only_gets_trimmed() {
        assert_eq!(strip_code_fences("  <div>z</div>\n"), "<div>z</div>");
    }

    #[test]
    fn inner_backticks_survive() {
        let text = "```html\n<code>```js```</code>\n```";
        assert_eq!(strip_code_fences(text), "<code>```js```</code>");
    }
}
