//! Pulling a JSON object out of model prose

use memecoin_core::Violation;

/// Return the first balanced `{...}` substring of `text`.
///
/// Braces inside JSON string literals are ignored, so markdown fences,
/// leading chatter and trailing explanations all fall away. Fails with
/// [`Violation::NoJsonObject`] when no object opens, or when the first one
/// never closes.
pub fn extract_json_object(text: &str) -> Result<&str, Violation> {
    let start = text.find('{').ok_or(Violation::NoJsonObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    Err(Violation::NoJsonObject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object_is_returned_whole() {
        let text = r#"{"name":"CyberDog","symbol":"CDOG"}"#;
        assert_eq!(extract_json_object(text).unwrap(), text);
    }

    #[test]
    fn test_code_fence_and_prose_are_stripped() {
        let text = "Sure! Here you go:\n```json\n{\n  \"total_supply\": 500000000\n}\n```\nLet me know if you need more.";
        assert_eq!(
            extract_json_object(text).unwrap(),
            "{\n  \"total_supply\": 500000000\n}"
        );
    }

    #[test]
    fn test_braces_inside_strings_do_not_count() {
        let text = r#"prefix {"description":"to the moon } and {back","q":"say \"}\""} suffix {}"#;
        assert_eq!(
            extract_json_object(text).unwrap(),
            r#"{"description":"to the moon } and {back","q":"say \"}\""}"#
        );
    }

    #[test]
    fn test_nested_objects_are_kept() {
        let text = r#"{"a":{"b":1},"c":2} trailing"#;
        assert_eq!(extract_json_object(text).unwrap(), r#"{"a":{"b":1},"c":2}"#);
    }

    #[test]
    fn test_missing_or_unclosed_object_fails() {
        assert_eq!(extract_json_object("no json here"), Err(Violation::NoJsonObject));
        assert_eq!(extract_json_object(r#"{"name": "Cyber"#), Err(Violation::NoJsonObject));
    }
}
