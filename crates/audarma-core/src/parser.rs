//! Recovers the translated strings from a free-form LLM completion.
//!
//! Models wrap the JSON array in markdown fences, prepend `<think>` blocks,
//! or talk around it. Cleanup runs in a fixed order and each step is a no-op
//! when its pattern is absent:
//!
//! 1. trim whitespace
//! 2. strip a leading/trailing code fence (with optional language tag)
//! 3. drop `<think>`/`<thinking>` blocks, case-insensitive, across lines
//! 4. if the rest is not a bare array, take the span from the first `[` to the last `]`
//! 5. decode a JSON array of strings

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

#[allow(clippy::unwrap_used)]
static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap());

#[allow(clippy::unwrap_used)]
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n?```\s*$").unwrap());

#[allow(clippy::unwrap_used)]
static REASONING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think>.*?</think>|<thinking>.*?</thinking>").unwrap()
});

/// Parse a completion into its ordered list of strings.
///
/// Length is not checked against the request here; that is the caller's job.
pub fn parse_translations(raw: &str) -> Result<Vec<String>> {
    let cleaned = clean_completion(raw);

    let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|e| {
        Error::ResponseParse(format!("{e} in {:?}", crate::util::truncate_text(&cleaned, 120)))
    })?;

    let serde_json::Value::Array(values) = value else {
        return Err(Error::ResponseParse("response is not an array".to_string()));
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            serde_json::Value::String(text) => Ok(text),
            other => Err(Error::ResponseParse(format!(
                "element {index} is not a string: {other}"
            ))),
        })
        .collect()
}

/// Apply the cleanup steps, returning the candidate JSON text.
fn clean_completion(raw: &str) -> String {
    let trimmed = raw.trim();

    let unfenced = LEADING_FENCE.replace(trimmed, "");
    let unfenced = TRAILING_FENCE.replace(&unfenced, "");

    let without_reasoning = REASONING_BLOCK.replace_all(&unfenced, "");
    let candidate = without_reasoning.trim();

    if is_bare_array(candidate) {
        return candidate.to_string();
    }

    match (candidate.find('['), candidate.rfind(']')) {
        (Some(start), Some(end)) if start < end => candidate[start..=end].trim().to_string(),
        _ => candidate.to_string(),
    }
}

fn is_bare_array(text: &str) -> bool {
    text.starts_with('[') && text.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_plain_array() {
        assert_eq!(parse_translations(r#"["a","b"]"#).unwrap(), ab());
    }

    #[test]
    fn test_markdown_fence_with_language_tag() {
        assert_eq!(parse_translations("```json\n[\"a\",\"b\"]\n```").unwrap(), ab());
    }

    #[test]
    fn test_markdown_fence_without_language_tag() {
        assert_eq!(parse_translations("```\n[\"a\",\"b\"]\n```").unwrap(), ab());
    }

    #[test]
    fn test_think_block_removed() {
        assert_eq!(parse_translations("<think>reasoning</think>[\"a\",\"b\"]").unwrap(), ab());
    }

    #[test]
    fn test_thinking_block_multiline_case_insensitive() {
        let raw = "<THINKING>\nFirst, \"Hello\" is [greeting].\nThen...\n</Thinking>\n[\"a\",\"b\"]";
        assert_eq!(parse_translations(raw).unwrap(), ab());
    }

    #[test]
    fn test_think_block_inside_fence() {
        let raw = "```json\n<think>hmm [x]</think>\n[\"a\",\"b\"]\n```";
        assert_eq!(parse_translations(raw).unwrap(), ab());
    }

    #[test]
    fn test_surrounding_prose() {
        assert_eq!(parse_translations("noise before [\"a\",\"b\"] noise after").unwrap(), ab());
    }

    #[test]
    fn test_brackets_inside_strings_survive() {
        let raw = r#"Here you go: ["[beta] release", "b"] hope it helps"#;
        assert_eq!(
            parse_translations(raw).unwrap(),
            vec!["[beta] release".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_translations("[]").unwrap().is_empty());
    }

    #[test]
    fn test_non_unicode_scripts() {
        let raw = "```json\n[\"Сәлем\", \"nuqneH\", \"Aiya\"]\n```";
        assert_eq!(parse_translations(raw).unwrap(), vec!["Сәлем", "nuqneH", "Aiya"]);
    }

    #[test]
    fn test_object_is_rejected() {
        let err = parse_translations(r#"{"translations": 1}"#).unwrap_err();
        assert!(matches!(err, Error::ResponseParse(_)));
    }

    #[test]
    fn test_non_string_element_is_rejected() {
        assert!(matches!(parse_translations(r#"["a", 2]"#), Err(Error::ResponseParse(_))));
    }

    #[test]
    fn test_no_array_is_rejected() {
        assert!(matches!(
            parse_translations("I cannot translate that."),
            Err(Error::ResponseParse(_))
        ));
    }

    #[test]
    fn test_unclosed_think_is_rejected_cleanly() {
        assert!(parse_translations("<think>never finished").is_err());
    }
}
