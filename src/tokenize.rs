//! Identifier tokenizer.
//!
//! Splits identifiers into lower-case words so naming rules can be judged
//! word by word: `getHTTPStatusV2` becomes `[get, http, status]`.

/// Split an identifier into lower-case word tokens.
///
/// Underscores, digits and any other non-letter characters separate words and
/// are never emitted. A lower-case letter followed by an upper-case one starts
/// a new word; an upper-case run stays one word unless its last letter begins a
/// lower-case word (`HTTPStatus` is `http`, `status`). A trailing upper-case
/// letter split off a camel-case word and followed by the digits that end the
/// identifier is a version marker and is dropped (`StatusV2` is `status`,
/// `getV2Status` is `get`, `v`, `status`).
pub fn tokenize(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut tokens = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        if !chars[start].is_alphabetic() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < chars.len() && chars[end].is_alphabetic() {
            end += 1;
        }
        let trailing_digits = chars.get(end).map(|c| c.is_ascii_digit()).unwrap_or(false)
            && chars[end..].iter().all(|c| c.is_ascii_digit() || *c == '_');

        let mut words = split_camel(&chars[start..end]);
        if trailing_digits && words.len() > 1 {
            let last = &words[words.len() - 1];
            let mut last_chars = last.chars();
            if let (Some(c), None) = (last_chars.next(), last_chars.next()) {
                if c.is_uppercase() {
                    words.pop();
                }
            }
        }
        tokens.extend(words.into_iter().map(|w| w.to_lowercase()));
        start = end;
    }

    tokens
}

/// [`tokenize`] for an identifier that may be absent.
pub fn tokenize_opt(name: Option<&str>) -> Vec<String> {
    name.map(tokenize).unwrap_or_default()
}

/// Render tokens as `[a, b, c]`.
pub fn format_tokens(tokens: &[String]) -> String {
    format!("[{}]", tokens.join(", "))
}

fn split_camel(letters: &[char]) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in letters.iter().enumerate() {
        if i > 0 && !current.is_empty() {
            let prev = letters[i - 1];
            let next_is_lower = letters.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase() && c.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize_opt(None).is_empty());
        assert!(tokenize("___").is_empty());
        assert!(tokenize("123").is_empty());
    }

    #[test]
    fn test_acronym_and_version_marker() {
        assert_eq!(tokenize("getHTTPStatusV2"), vec!["get", "http", "status"]);
        assert_eq!(tokenize("configV2"), vec!["config"]);
        assert_eq!(tokenize("configV2_"), vec!["config"]);
    }

    #[test]
    fn test_marker_inside_identifier_is_kept() {
        assert_eq!(tokenize("getV2Status"), vec!["get", "v", "status"]);
        assert_eq!(tokenize("getA1Value"), vec!["get", "a", "value"]);
        assert_eq!(tokenize("user2Config"), vec!["user", "config"]);
    }

    #[test]
    fn test_camel_and_snake() {
        assert_eq!(tokenize("userName"), vec!["user", "name"]);
        assert_eq!(tokenize("MAX_RETRY_COUNT"), vec!["max", "retry", "count"]);
        assert_eq!(tokenize("XMLHttpRequest"), vec!["xml", "http", "request"]);
        assert_eq!(tokenize("parseURL"), vec!["parse", "url"]);
        assert_eq!(tokenize("__private_value"), vec!["private", "value"]);
    }

    #[test]
    fn test_digits_separate_words() {
        assert_eq!(tokenize("user2name"), vec!["user", "name"]);
        assert_eq!(tokenize("x1"), vec!["x"]);
        assert_eq!(tokenize("V2"), vec!["v"]);
    }

    #[test]
    fn test_output_is_lowercase_and_stable() {
        let first = tokenize("SomeMixedCASEValue");
        let second = tokenize("SomeMixedCASEValue");
        assert_eq!(first, second);
        assert!(first.iter().all(|t| t.chars().all(|c| !c.is_uppercase())));
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(&tokenize("getUserName")), "[get, user, name]");
        assert_eq!(format_tokens(&[]), "[]");
    }
}
