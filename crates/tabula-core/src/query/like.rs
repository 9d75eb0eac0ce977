//! SQL LIKE pattern matching.
//!
//! - `%` matches zero or more characters
//! - `_` matches exactly one character
//! - every other character (including regex metacharacters and `\`) is literal
//!
//! Matching is anchored to the whole string and case-insensitive.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyChar,
    Literal(char),
}

/// A compiled LIKE pattern.
#[derive(Debug, Clone)]
pub struct LikePattern {
    source: String,
    tokens: Vec<Token>,
}

impl PartialEq for LikePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl LikePattern {
    /// Compiles a pattern.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let mut tokens: Vec<Token> = Vec::with_capacity(source.len());
        for ch in source.chars().flat_map(char::to_lowercase) {
            let token = match ch {
                '%' => Token::AnyRun,
                '_' => Token::AnyChar,
                c => Token::Literal(c),
            };
            // Consecutive % are equivalent to one.
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        Self { source, tokens }
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Tests whether `text` matches the whole pattern, ignoring case.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
        let m = text.len();
        let n = self.tokens.len();

        // dp[i][j] = true if text[0..i] matches tokens[0..j]
        let mut dp = vec![vec![false; n + 1]; m + 1];
        dp[0][0] = true;

        // Leading % runs can match the empty string.
        for j in 0..n {
            if self.tokens[j] != Token::AnyRun {
                break;
            }
            dp[0][j + 1] = true;
        }

        for i in 1..=m {
            for j in 1..=n {
                dp[i][j] = match self.tokens[j - 1] {
                    Token::AnyRun => dp[i][j - 1] || dp[i - 1][j],
                    Token::AnyChar => dp[i - 1][j - 1],
                    Token::Literal(c) => dp[i - 1][j - 1] && text[i - 1] == c,
                };
            }
        }

        dp[m][n]
    }
}

#[cfg(test)]
#[path = "like_tests.rs"]
mod tests;
