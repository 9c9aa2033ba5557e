//! Splits source text into tokens.
//!
//! Tokens are `(`, `)` and maximal runs of characters that are neither
//! whitespace nor parentheses. A `;` starts a comment that runs to the end of
//! its line.

pub const COMMENT: char = ';';

/// Tokenizes `source`, borrowing each token from it.
#[must_use]
pub fn tokenize(source: &str) -> Vec<&str> {
    let mut tokens = Vec::new();

    for line in source.lines() {
        let code = line.split_once(COMMENT).map_or(line, |(code, _)| code);
        let mut start: Option<usize> = None;

        for (i, c) in code.char_indices() {
            if c == '(' || c == ')' || c.is_whitespace() {
                if let Some(s) = start.take() {
                    tokens.push(&code[s..i]);
                }
                if !c.is_whitespace() {
                    tokens.push(&code[i..i + 1]);
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }

        if let Some(s) = start {
            tokens.push(&code[s..]);
        }
    }

    tokens
}
