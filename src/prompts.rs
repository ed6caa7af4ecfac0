//! Prompts for the optional AI cleanup collaborator
//! ([`crate::pipeline::cleanup`]).
//!
//! The formatter and validator still run on the model's reply; these rules
//! only steer it towards text those stages leave unchanged.

/// System prompt sent with every cleanup request.
pub const CLEANUP_SYSTEM_PROMPT: &str =
    "You are a Braille formatting specialist. Format text exactly according to Braille standards.";

/// Rules given to the model ahead of the text.
pub const CLEANUP_RULES: &str = r#"Format this text for Braille conversion following these EXACT rules:

1. Titles must be in ALL CAPS with blank lines before and after
2. Start each paragraph with exactly 2 spaces
3. Each line must be {columns} characters or less
4. Put blank lines between sections
5. Format lists with dash (-) for bullets
6. Remove any remaining URLs or metadata"#;

/// Build the user message for one chunk of text.
///
/// `document_type` is a free-form hint ("textbook", "letter", …); "general"
/// adds nothing to the prompt.
pub fn cleanup_user_prompt(text: &str, document_type: &str, columns: usize) -> String {
    let rules = CLEANUP_RULES.replace("{columns}", &columns.to_string());
    let hint = match document_type.trim() {
        "" | "general" => String::new(),
        kind => format!("\n\nThe document is a {kind}; keep its conventional structure."),
    };
    format!(
        "{rules}{hint}\n\nTEXT TO FORMAT:\n{text}\n\nIMPORTANT: Return ONLY the formatted text. No explanations or markdown."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_contains_text_and_budget() {
        let p = cleanup_user_prompt("Hello there", "general", 40);
        assert!(p.contains("Hello there"));
        assert!(p.contains("40 characters or less"));
        assert!(!p.contains("{columns}"));
        assert!(!p.contains("The document is"));
    }

    #[test]
    fn test_document_type_hint() {
        let p = cleanup_user_prompt("x", "textbook", 32);
        assert!(p.contains("The document is a textbook"));
        assert!(p.contains("32 characters"));
    }
}
