use serde_json::Value;

pub const RESUME_CHAR_LIMIT: usize = 3000;
pub const CONTEXT_CHAR_LIMIT: usize = 5000;

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// 履歷篩選用提示詞，履歷內容只保留前 3000 字元
pub fn screening_prompt(instruction: &str, resume_text: &str, output_schema: &str) -> String {
    format!(
        "{instruction}\n\nResume:\n{resume}\n\nReturn a JSON object with this structure:\n{output_schema}\n\nReturn ONLY valid JSON, no additional text.",
        resume = truncate_chars(resume_text, RESUME_CHAR_LIMIT),
    )
}

fn render_context_value(value: &Value) -> String {
    match value {
        Value::String(text) if text.chars().count() > CONTEXT_CHAR_LIMIT => {
            format!(
                "{}\n... (truncated)",
                truncate_chars(text, CONTEXT_CHAR_LIMIT)
            )
        }
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub fn structured_prompt(
    instruction: &str,
    context: &[(&str, Value)],
    output_schema: &Value,
) -> String {
    let context_str: String = context
        .iter()
        .map(|(key, value)| {
            format!(
                "\n{}:\n{}\n",
                key.to_uppercase(),
                render_context_value(value)
            )
        })
        .collect();

    let schema_str =
        serde_json::to_string_pretty(output_schema).unwrap_or_else(|_| output_schema.to_string());

    format!(
        "{instruction}\n\n{context_str}\n\nReturn a JSON object with this exact structure:\n{schema_str}\n\nIMPORTANT: Return ONLY valid JSON, no additional text or markdown formatting."
    )
}

/// Strips whitespace and an optional ```json fence around model output.
pub fn extract_json_payload(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
