//! Raw fragment normalization: whitespace trimming and numeric parsing.

use std::sync::LazyLock;

use regex::Regex;

use reeltab_shared::{FieldKind, ReeltabError, Result, Value};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid regex"));

/// Strip leading/trailing whitespace and collapse interior runs (including
/// newlines) to single spaces.
pub fn trim_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the first numeric token from a string.
///
/// Thousands separators are removed first, so `"1,045,588"` is one token.
/// `field` is only used to name the offending column in the error.
pub fn parse_number(field: &str, text: &str) -> Result<f64> {
    let cleaned = text.replace(',', "");

    let token = NUMBER_RE
        .find(&cleaned)
        .ok_or_else(|| ReeltabError::NoNumericToken {
            field: field.to_string(),
            text: text.to_string(),
        })?;

    token
        .as_str()
        .parse::<f64>()
        .map_err(|e| ReeltabError::parse(format!("field '{field}': {e}")))
}

/// Normalize a raw field into typed values, preserving cardinality.
pub fn normalize(name: &str, kind: FieldKind, raw: &[String]) -> Result<Vec<Value>> {
    raw.iter()
        .map(|fragment| match kind {
            FieldKind::Text => Ok(Value::Text(trim_text(fragment))),
            FieldKind::Number => parse_number(name, fragment).map(Value::Number),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_collapses_newlines_and_runs() {
        assert_eq!(trim_text("\nAction, Adventure, Sci-Fi            "), "Action, Adventure, Sci-Fi");
        assert_eq!(trim_text("  The   Quiet\n\tDivide "), "The Quiet Divide");
        assert_eq!(trim_text(""), "");
    }

    #[test]
    fn parse_number_finds_first_token() {
        assert_eq!(parse_number("runtime", "141 min").unwrap(), 141.0);
        assert_eq!(parse_number("year", "(2016)").unwrap(), 2016.0);
        assert_eq!(parse_number("rating", "8.5").unwrap(), 8.5);
        // A TV-style year span still yields its first year.
        assert_eq!(parse_number("year", "(2014\u{2013}2016)").unwrap(), 2014.0);
    }

    #[test]
    fn parse_number_handles_thousands_separators() {
        assert_eq!(parse_number("votes", "1,045,588").unwrap(), 1_045_588.0);
    }

    #[test]
    fn parse_number_without_token_fails() {
        let err = parse_number("metascore", "N/A").unwrap_err();
        assert!(matches!(err, ReeltabError::NoNumericToken { .. }));
        assert!(err.to_string().contains("metascore"));
    }

    #[test]
    fn normalize_text_field() {
        let raw = vec!["\n  Drama  ".to_string(), "Crime, Drama".to_string()];
        let values = normalize("genre", FieldKind::Text, &raw).unwrap();
        assert_eq!(
            values,
            vec![Value::Text("Drama".into()), Value::Text("Crime, Drama".into())]
        );
    }

    #[test]
    fn normalize_number_field_preserves_cardinality() {
        let raw = vec!["76        ".to_string(), "81".to_string(), "54".to_string()];
        let values = normalize("metascore", FieldKind::Number, &raw).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Number(76.0),
                Value::Number(81.0),
                Value::Number(54.0)
            ]
        );
    }

    #[test]
    fn normalize_number_field_fails_fast_on_garbage() {
        let raw = vec!["76".to_string(), "coming soon".to_string()];
        let err = normalize("metascore", FieldKind::Number, &raw).unwrap_err();
        assert!(matches!(err, ReeltabError::NoNumericToken { .. }));
    }
}
