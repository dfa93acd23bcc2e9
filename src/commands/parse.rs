//! Splitting raw argument strings into tokens.

use regex::Regex;
use std::sync::LazyLock;

static SINGLE_OR_DOUBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*(?:"([^"]*)"|'([^']*)'|(\S+))\s*"#).expect("static regex")
});

static DOUBLE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*(?:"([^"]*)"|(\S+))\s*"#).expect("static regex"));

/// Replace typographic quotes with their plain equivalents.
pub fn remove_smart_quotes(text: &str, allow_single_quotes: bool) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' if allow_single_quotes => '\'',
            other => other,
        })
        .collect()
}

/// Strip one pair of surrounding quotes, if the whole string is quoted.
pub fn strip_quotes(text: &str, allow_single_quotes: bool) -> &str {
    let quotes: &[char] = if allow_single_quotes { &['"', '\''] } else { &['"'] };
    for &q in quotes {
        if text.len() >= 2
            && let Some(inner) = text.strip_prefix(q).and_then(|t| t.strip_suffix(q))
        {
            return inner;
        }
    }
    text
}

/// Split `arg_string` into whitespace-separated tokens.
///
/// Double-quoted (and, if allowed, single-quoted) groups form one token.
/// With `count`, at most `count` tokens are returned and the last one holds
/// the unconsumed remainder verbatim (minus one pair of surrounding quotes).
pub fn parse_args(arg_string: &str, count: Option<usize>, allow_single_quotes: bool) -> Vec<String> {
    let text = remove_smart_quotes(arg_string, allow_single_quotes);
    let re: &Regex = if allow_single_quotes { &SINGLE_OR_DOUBLE } else { &DOUBLE_ONLY };
    let limit = count.filter(|&c| c > 0).map(|c| c - 1);

    let mut result = Vec::new();
    let mut consumed = 0;
    for caps in re.captures_iter(&text) {
        if limit.is_some_and(|l| result.len() >= l) {
            break;
        }
        consumed = caps.get(0).map_or(consumed, |m| m.end());
        let token = caps
            .iter()
            .skip(1)
            .flatten()
            .next()
            .map_or("", |m| m.as_str());
        result.push(token.to_string());
    }

    if limit.is_some_and(|l| result.len() >= l) && consumed < text.len() {
        let rest = text[consumed..].trim();
        if !rest.is_empty() {
            result.push(strip_quotes(rest, allow_single_quotes).to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(parse_args("a b  c", None, true), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_groups() {
        assert_eq!(
            parse_args(r#"say "hello world" 'single quoted'"#, None, true),
            vec!["say", "hello world", "single quoted"]
        );
    }

    #[test]
    fn test_single_quotes_disabled() {
        assert_eq!(
            parse_args("don't 'stop' now", None, false),
            vec!["don't", "'stop'", "now"]
        );
    }

    #[test]
    fn test_smart_quotes_are_normalised() {
        assert_eq!(
            parse_args("\u{201C}two words\u{201D} x", None, true),
            vec!["two words", "x"]
        );
    }

    #[test]
    fn test_count_keeps_remainder() {
        assert_eq!(
            parse_args("ban  someone for being   rude", Some(2), true),
            vec!["ban", "someone for being   rude"]
        );
    }

    #[test]
    fn test_count_strips_quoted_remainder() {
        assert_eq!(parse_args(r#"a "b c""#, Some(2), true), vec!["a", "b c"]);
    }

    #[test]
    fn test_count_one_returns_whole_string() {
        assert_eq!(parse_args("one two", Some(1), true), vec!["one two"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_args("", None, true).is_empty());
        assert!(parse_args("   ", Some(3), true).is_empty());
    }

    #[test]
    fn test_empty_quotes_yield_empty_token() {
        assert_eq!(parse_args(r#""" x"#, None, true), vec!["", "x"]);
    }

    #[test]
    fn test_strip_quotes_needs_matching_pair() {
        assert_eq!(strip_quotes("\"abc\"", true), "abc");
        assert_eq!(strip_quotes("'abc'", false), "'abc'");
        assert_eq!(strip_quotes("\"", true), "\"");
    }
}
