//! Placeholder expansion for deployment parameters.
//!
//! Templates reference deployed contracts by name:
//!
//! ```text
//! placeholder := '$' ident | '$' '{' name '}'
//! ident       := [A-Za-z_] [A-Za-z0-9_]*
//! name        := any non-empty run of characters other than '}'
//! ```
//!
//! A `$` that does not start a placeholder is copied as is. Substituted values
//! are never rescanned.

use crate::SolarError;

const SIGIL: char = '$';
const OPEN: char = '{';
const CLOSE: char = '}';

/// Expand every placeholder in `template` using `lookup`.
///
/// Stops at the first name `lookup` does not know and returns
/// [`SolarError::UnknownPlaceholder`] with that name.
pub fn expand<F>(template: &str, mut lookup: F) -> Result<String, SolarError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(SIGIL) {
        expanded.push_str(&rest[..pos]);
        let after = &rest[pos + SIGIL.len_utf8()..];

        match placeholder(after) {
            Some((name, consumed)) => {
                let value =
                    lookup(name).ok_or_else(|| SolarError::UnknownPlaceholder(name.to_string()))?;
                expanded.push_str(&value);
                rest = &after[consumed..];
            }
            None => {
                expanded.push(SIGIL);
                rest = after;
            }
        }
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// Parse the placeholder that follows a sigil.
///
/// Returns the name and the number of bytes it spans, delimiters included.
fn placeholder(input: &str) -> Option<(&str, usize)> {
    if let Some(body) = input.strip_prefix(OPEN) {
        let end = body.find(CLOSE)?;
        if end == 0 {
            return None;
        }
        return Some((&body[..end], OPEN.len_utf8() + end + CLOSE.len_utf8()));
    }

    let first = input.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }

    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    Some((&input[..end], end))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const TOKEN: &str = "0xabc0000000000000000000000000000000000001";

    fn lookup(name: &str) -> Option<String> {
        let known = HashMap::from([("Token", TOKEN), ("Wallet_2", "0xdef")]);
        known.get(name).map(|s| s.to_string())
    }

    #[test]
    fn test_bare_placeholder() {
        assert_eq!(expand("addr=$Token", lookup).unwrap(), format!("addr={}", TOKEN));
    }

    #[test]
    fn test_delimited_placeholder() {
        assert_eq!(expand("addr=${Token}", lookup).unwrap(), format!("addr={}", TOKEN));
    }

    #[test]
    fn test_unknown_placeholder() {
        match expand("addr=$Missing", lookup) {
            Err(SolarError::UnknownPlaceholder(name)) => assert_eq!(name, "Missing"),
            other => panic!("expected unknown placeholder, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(expand("no vars here", lookup).unwrap(), "no vars here");
        assert_eq!(expand("", lookup).unwrap(), "");
    }

    #[test]
    fn test_json_params() {
        let expanded = expand(r#"["$Token", "${Wallet_2}", 100]"#, lookup).unwrap();
        assert_eq!(expanded, format!(r#"["{}", "0xdef", 100]"#, TOKEN));
    }

    #[test]
    fn test_bare_identifier_stops_at_non_word_char() {
        assert_eq!(
            expand("$Token.address", lookup).unwrap(),
            format!("{}.address", TOKEN)
        );
    }

    #[test]
    fn test_lone_sigils_pass_through() {
        assert_eq!(expand("cost: $5", lookup).unwrap(), "cost: $5");
        assert_eq!(expand("trailing $", lookup).unwrap(), "trailing $");
        assert_eq!(expand("${}", lookup).unwrap(), "${}");
        assert_eq!(expand("${Token", lookup).unwrap(), "${Token");
    }

    #[test]
    fn test_substitution_not_rescanned() {
        let expanded = expand("$Token", |_| Some("$Token".to_string())).unwrap();
        assert_eq!(expanded, "$Token");
    }

    #[test]
    fn test_first_unknown_aborts() {
        let mut seen = Vec::new();
        let result = expand("$Token $Nope $Wallet_2", |name| {
            seen.push(name.to_string());
            lookup(name)
        });

        assert!(matches!(result, Err(SolarError::UnknownPlaceholder(name)) if name == "Nope"));
        assert_eq!(seen, vec!["Token", "Nope"]);
    }
}
