use serde_json::Value;

/// Parses one value literal: string, integer, float, list, or mapping, in
/// JSON notation. Surrounding whitespace is tolerated; trailing garbage is
/// not. This is deliberately a data grammar, never an expression evaluator.
pub fn parse_literal(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text.trim())
}

/// Strips one layer of surrounding double quotes, if present.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::value::{parse_literal, strip_quotes};

    #[test_case("42", json!(42); "integer")]
    #[test_case("-7.5", json!(-7.5); "float")]
    #[test_case("\"hello world\"", json!("hello world"); "string")]
    #[test_case("[1, 2, 3]", json!([1, 2, 3]); "list")]
    #[test_case("{\"a\": 1}", json!({"a": 1}); "mapping")]
    #[test_case("  17  ", json!(17); "surrounding whitespace")]
    fn test_parse_literal(text: &str, expected: Value) {
        assert_eq!(expected, parse_literal(text).expect("Failed to parse literal"));
    }

    #[test_case("hello"; "bare word")]
    #[test_case("1 2"; "trailing garbage")]
    #[test_case("{'a': 1}"; "single quoted mapping")]
    #[test_case(""; "empty")]
    fn test_parse_literal_rejects(text: &str) {
        assert!(parse_literal(text).is_err());
    }

    #[test_case("\"John\"", "John"; "quoted")]
    #[test_case("John", "John"; "bare")]
    #[test_case("\"John", "John"; "unbalanced left")]
    #[test_case("John\"", "John"; "unbalanced right")]
    #[test_case("\"\"John\"\"", "\"John\""; "one layer only")]
    #[test_case("", ""; "empty")]
    fn test_strip_quotes(text: &str, expected: &str) {
        assert_eq!(expected, strip_quotes(text));
    }
}
