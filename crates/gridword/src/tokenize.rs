//! Splits a typed console line into tokens.
//!
//! ```text
//! join "my lobby" bob        →  ["join", "my lobby", "bob"]
//! word 'it\'s'               →  ["word", "it's"]
//! ```
//!
//! - Runs of whitespace separate tokens.
//! - A token that starts with `"` or `'` runs to the next unescaped quote
//!   of the same kind, or to the end of the line. Inside it, `\` makes the
//!   next character literal and is itself dropped.
//! - Any other token runs to the next whitespace, taken verbatim.
//!
//! A closing quote ends the token even when no whitespace follows, so
//! `"ab"cd` is two tokens.

use std::iter::Peekable;
use std::str::Chars;

/// Splits `line` into tokens. Empty or blank input yields no tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek().copied() {
            None => break,
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                tokens.push(quoted(&mut chars, quote));
            }
            Some(_) => {
                let mut token = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    token.push(c);
                }
                tokens.push(token);
            }
        }
    }

    tokens
}

fn quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> String {
    let mut token = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    token.push(escaped);
                }
            }
            c if c == quote => break,
            c => token.push(c),
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_lobby_name() {
        assert_eq!(tokenize(r#"join "my lobby" bob"#), ["join", "my lobby", "bob"]);
    }

    #[test]
    fn test_blank_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(tokenize("  a \t b   c  "), ["a", "b", "c"]);
    }

    #[test]
    fn test_escapes_only_inside_quotes() {
        assert_eq!(tokenize(r"'a\ b' c"), ["a b", "c"]);
        assert_eq!(tokenize(r#""say \"hi\"""#), [r#"say "hi""#]);
        assert_eq!(tokenize(r"a\ b c"), [r"a\", "b", "c"]);
    }

    #[test]
    fn test_other_quote_kind_is_literal() {
        assert_eq!(tokenize(r#""it's""#), ["it's"]);
        assert_eq!(tokenize(r#"'say "x"'"#), [r#"say "x""#]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize(r#"join "my lobby"#), ["join", "my lobby"]);
        assert_eq!(tokenize(r#"x "trailing\"#), ["x", "trailing"]);
    }

    #[test]
    fn test_closing_quote_ends_token() {
        assert_eq!(tokenize(r#""ab"cd"#), ["ab", "cd"]);
        assert_eq!(tokenize(r#""""#), [""]);
    }

    #[test]
    fn test_rejoined_bare_tokens_tokenize_the_same() {
        let line = "  /join   lobby1\tpass  nick ";
        let tokens = tokenize(line);
        assert_eq!(tokenize(&tokens.join(" ")), tokens);
    }
}
