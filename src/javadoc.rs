//! Javadoc description slicing.

use crate::ast::Comment;

/// Description part of a javadoc comment: the cleaned text before the first
/// block tag line, right-trimmed. Returns an empty string for non-javadoc.
pub fn description(comment: &Comment) -> String {
    if !comment.is_javadoc() {
        return String::new();
    }
    let mut lines: Vec<String> = comment
        .content()
        .split('\n')
        .map(clean_line)
        .collect();

    if let Some(first) = lines.first_mut() {
        if first.starts_with(' ') {
            first.remove(0);
        }
    }
    while lines.first().map(|l| l.is_empty()).unwrap_or(false) {
        lines.remove(0);
    }
    while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        lines.pop();
    }

    let description: Vec<&str> = lines
        .iter()
        .take_while(|l| !l.trim_start().starts_with('@'))
        .map(String::as_str)
        .collect();
    description.join("\n").trim_end().to_string()
}

/// Source line of the description's first line.
///
/// Found by locating the first raw comment line that contains the first
/// non-empty description line; falls back to the comment's opening line.
pub fn description_line(comment: &Comment, description: &str) -> usize {
    let Some(needle) = description
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
    else {
        return comment.line;
    };
    comment
        .content()
        .split('\n')
        .position(|raw| raw.contains(needle))
        .map(|offset| comment.line + offset)
        .unwrap_or(comment.line)
}

/// Strip the leading `*` decoration of one comment line.
fn clean_line(raw: &str) -> String {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    let trimmed = line.trim_start();
    let cleaned = match trimmed.strip_prefix('*') {
        Some(rest) => rest
            .strip_prefix(' ')
            .or_else(|| rest.strip_prefix('\t'))
            .unwrap_or(rest),
        None => line,
    };
    if cleaned.trim().is_empty() {
        String::new()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, line: usize) -> Comment {
        Comment {
            text: text.to_string(),
            line,
        }
    }

    #[test]
    fn test_inline_summary_with_tags() {
        let comment = doc("/** Summary line.\n * @param x the value */", 10);
        let desc = description(&comment);
        assert_eq!(desc, "Summary line.");
        assert_eq!(description_line(&comment, &desc), 10);
    }

    #[test]
    fn test_multiline_description() {
        let comment = doc(
            "/**\n     * Processes payment.\n     * This explanation should be extracted.\n     *\n     * @return status\n     */",
            5,
        );
        let desc = description(&comment);
        assert_eq!(desc, "Processes payment.\nThis explanation should be extracted.");
        assert_eq!(description_line(&comment, &desc), 6);
    }

    #[test]
    fn test_tags_only_is_empty() {
        let comment = doc("/**\n * @deprecated\n */", 1);
        assert_eq!(description(&comment), "");
        assert_eq!(description_line(&comment, ""), 1);
    }

    #[test]
    fn test_plain_block_comment_has_no_description() {
        assert_eq!(description(&doc("/* not javadoc */", 1)), "");
    }

    #[test]
    fn test_blank_decorated_lines_preserved_inside() {
        let comment = doc("/**\n * First.\n *\n * Second.\n */", 2);
        assert_eq!(description(&comment), "First.\n\nSecond.");
    }
}
