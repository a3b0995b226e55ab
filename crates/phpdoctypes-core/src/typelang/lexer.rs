// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for type-expression text.
//!
//! This module streams a documentation-comment payload as [`TypeToken`]s.
//! The lexer is hand-written and lookahead-driven: the parser asks for the
//! k-th upcoming token via [`TypeLexer::peek`] and the lexer grows an
//! internal queue on demand. That queue, together with the scan position,
//! is the whole of the lexer state, which makes speculative parsing a
//! matter of copying both and putting them back ([`TypeLexer::snapshot`] /
//! [`TypeLexer::restore`]).
//!
//! # Token classes
//!
//! The class of a token is decided by its first non-whitespace character:
//!
//! - **Identifier** — letter, underscore, `$`, `\`, or any non-ASCII
//!   character; continues over alphanumerics, underscores and non-ASCII,
//!   and also over `-` and `\` unless the token started with `$`.
//! - **Number** — optional `-` followed by a digit; digits, underscores
//!   and at most one `.`.
//! - **String** — `'` or `"` delimited, `\` escaping one character. An
//!   unterminated string ends the lexical stream.
//! - **Punctuation** — `...`, `::`, or a single character.
//!
//! At or past the end of input the lexer reports the end sentinel (a token
//! with no text).

use std::collections::VecDeque;

use ecow::EcoString;

use super::TypeToken;

/// A lookahead-capable lexer over type-expression text.
#[derive(Debug, Clone)]
pub struct TypeLexer<'src> {
    /// The payload text being lexed.
    source: &'src str,
    /// Byte position of the next unscanned character.
    scan: usize,
    /// Tokens fetched ahead of the parser.
    queue: VecDeque<TypeToken>,
}

/// A saved lexer position for speculative parsing.
#[derive(Debug, Clone)]
pub struct LexerSnapshot {
    scan: usize,
    queue: VecDeque<TypeToken>,
}

impl<'src> TypeLexer<'src> {
    /// Creates a new lexer for the given payload text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            scan: 0,
            queue: VecDeque::new(),
        }
    }

    /// Returns the text of the k-th upcoming token (0 = current), or
    /// `None` at or past the end of the stream.
    pub fn peek(&mut self, k: usize) -> Option<EcoString> {
        self.fill(k + 1);
        self.queue[k].as_str().map(EcoString::from)
    }

    /// Returns the k-th upcoming token itself.
    pub fn peek_token(&mut self, k: usize) -> TypeToken {
        self.fill(k + 1);
        self.queue[k].clone()
    }

    /// Consumes and returns the current token. At end of stream this keeps
    /// returning the end sentinel.
    pub fn next_token(&mut self) -> TypeToken {
        self.fill(1);
        let token = self.queue[0].clone();
        if !token.is_end() {
            self.queue.pop_front();
        }
        token
    }

    /// Returns `true` if the character immediately before the token's
    /// start is whitespace. A token at position zero has nothing before it.
    #[must_use]
    pub fn preceded_by_whitespace(&self, token: &TypeToken) -> bool {
        let start = token.span().start() as usize;
        start > 0
            && self.source[..start]
                .chars()
                .next_back()
                .is_some_and(is_space)
    }

    /// Returns the raw unconsumed text, starting at the current token.
    pub fn rest(&mut self) -> &'src str {
        self.fill(1);
        let front = &self.queue[0];
        if front.is_end() {
            ""
        } else {
            &self.source[front.span().start() as usize..]
        }
    }

    /// Saves the lexer position for a later [`TypeLexer::restore`].
    #[must_use]
    pub fn snapshot(&self) -> LexerSnapshot {
        LexerSnapshot {
            scan: self.scan,
            queue: self.queue.clone(),
        }
    }

    /// Rewinds the lexer to a previously saved position.
    pub fn restore(&mut self, snapshot: LexerSnapshot) {
        self.scan = snapshot.scan;
        self.queue = snapshot.queue;
    }

    /// Ensures at least `n` tokens are queued.
    fn fill(&mut self, n: usize) {
        while self.queue.len() < n {
            let token = self.fetch();
            let ended = token.is_end();
            self.queue.push_back(token);
            if ended {
                break;
            }
        }
        // Past the end the queue keeps yielding the sentinel.
        while self.queue.len() < n {
            let end = self.source.len();
            self.queue.push_back(TypeToken::end((end..end).into()));
        }
    }

    /// Scans the next token from the source text.
    fn fetch(&mut self) -> TypeToken {
        while self.char_at(self.scan).is_some_and(is_space) {
            self.scan += 1;
        }
        let start = self.scan;
        let Some(first) = self.char_at(start) else {
            return TypeToken::end((start..start).into());
        };

        if is_ident_start(first) {
            return self.fetch_identifier(start, first);
        }
        if first.is_ascii_digit()
            || (first == '-' && self.char_at(start + 1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.fetch_number(start, first);
        }
        if first == '\'' || first == '"' {
            return self.fetch_string(start, first);
        }
        if self.source[start..].starts_with("...") {
            self.scan = start + 3;
            return TypeToken::new("...", (start..self.scan).into());
        }
        if self.source[start..].starts_with("::") {
            self.scan = start + 2;
            return TypeToken::new("::", (start..self.scan).into());
        }

        self.scan = start + first.len_utf8();
        TypeToken::new(&self.source[start..self.scan], (start..self.scan).into())
    }

    fn fetch_identifier(&mut self, start: usize, first: char) -> TypeToken {
        let sigil = first == '$';
        let mut pos = start + first.len_utf8();
        while let Some(c) = self.char_at(pos) {
            let continues = c.is_ascii_alphanumeric()
                || c == '_'
                || !c.is_ascii()
                || (!sigil && (c == '-' || c == '\\'));
            if !continues {
                break;
            }
            pos += c.len_utf8();
        }
        self.scan = pos;
        TypeToken::new(&self.source[start..pos], (start..pos).into())
    }

    fn fetch_number(&mut self, start: usize, first: char) -> TypeToken {
        let mut pos = start + first.len_utf8();
        let mut seen_dot = false;
        while let Some(c) = self.char_at(pos) {
            let continues = c.is_ascii_digit() || c == '_' || (c == '.' && !seen_dot);
            if !continues {
                break;
            }
            seen_dot = seen_dot || c == '.';
            pos += c.len_utf8();
        }
        self.scan = pos;
        TypeToken::new(&self.source[start..pos], (start..pos).into())
    }

    fn fetch_string(&mut self, start: usize, quote: char) -> TypeToken {
        let mut pos = start + quote.len_utf8();
        loop {
            match self.char_at(pos) {
                None => {
                    // Unterminated string: the stream ends here.
                    self.scan = self.source.len();
                    return TypeToken::end((start..self.source.len()).into());
                }
                Some('\\') => {
                    pos += 1;
                    if let Some(escaped) = self.char_at(pos) {
                        pos += escaped.len_utf8();
                    }
                }
                Some(c) if c == quote => {
                    pos += c.len_utf8();
                    break;
                }
                Some(c) => pos += c.len_utf8(),
            }
        }
        self.scan = pos;
        TypeToken::new(&self.source[start..pos], (start..pos).into())
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.source.get(pos..).and_then(|s| s.chars().next())
    }
}

/// Whitespace between tokens, per the C locale's space class.
const fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || c == '\\' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<Option<EcoString>> {
        let mut lexer = TypeLexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            let end = token.is_end();
            out.push(token.as_str().map(EcoString::from));
            if end {
                break;
            }
        }
        out
    }

    fn text_list(source: &str) -> Vec<EcoString> {
        texts(source).into_iter().flatten().collect()
    }

    #[test]
    fn lex_empty_is_end() {
        assert_eq!(texts(""), vec![None]);
        assert_eq!(texts("   "), vec![None]);
    }

    #[test]
    fn lex_keywords_and_punctuation() {
        assert_eq!(text_list("int|string"), vec!["int", "|", "string"]);
        assert_eq!(text_list("?Foo"), vec!["?", "Foo"]);
        assert_eq!(text_list("A & B"), vec!["A", "&", "B"]);
    }

    #[test]
    fn lex_hyphenated_and_qualified_identifiers() {
        assert_eq!(text_list("class-string"), vec!["class-string"]);
        assert_eq!(text_list("\\Foo\\Bar"), vec!["\\Foo\\Bar"]);
        assert_eq!(text_list("int-mask-of"), vec!["int-mask-of"]);
    }

    #[test]
    fn lex_variable_stops_at_hyphen_and_backslash() {
        assert_eq!(text_list("$x-1"), vec!["$x", "-1"]);
        assert_eq!(text_list("$x\\y"), vec!["$x", "\\y"]);
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(text_list("-5"), vec!["-5"]);
        assert_eq!(text_list("1_000"), vec!["1_000"]);
        assert_eq!(text_list("3.14"), vec!["3.14"]);
        // Only one dot joins the number.
        assert_eq!(text_list("1.2.3"), vec!["1.2", ".", "3"]);
    }

    #[test]
    fn lex_minus_without_digit_is_single_char() {
        assert_eq!(text_list("- 5"), vec!["-", "5"]);
    }

    #[test]
    fn lex_strings() {
        assert_eq!(text_list("'foo'"), vec!["'foo'"]);
        assert_eq!(text_list(r#""a\"b""#), vec![r#""a\"b""#]);
    }

    #[test]
    fn lex_unterminated_string_ends_stream() {
        assert_eq!(texts("'abc"), vec![None]);
        let mut lexer = TypeLexer::new("int|'abc def");
        assert_eq!(lexer.peek(0).as_deref(), Some("int"));
        assert_eq!(lexer.peek(1).as_deref(), Some("|"));
        assert_eq!(lexer.peek(2), None);
        assert_eq!(lexer.peek(3), None);
    }

    #[test]
    fn lex_ellipsis_and_double_colon() {
        assert_eq!(text_list("...$args"), vec!["...", "$args"]);
        assert_eq!(text_list("Foo::BAR"), vec!["Foo", "::", "BAR"]);
        assert_eq!(text_list("Foo::*"), vec!["Foo", "::", "*"]);
    }

    #[test]
    fn peek_is_stable_and_next_consumes() {
        let mut lexer = TypeLexer::new("array<int, string>");
        assert_eq!(lexer.peek(0).as_deref(), Some("array"));
        assert_eq!(lexer.peek(1).as_deref(), Some("<"));
        assert_eq!(lexer.peek(0).as_deref(), Some("array"));
        assert_eq!(lexer.next_token().as_str(), Some("array"));
        assert_eq!(lexer.peek(0).as_deref(), Some("<"));
    }

    #[test]
    fn snapshot_restore_rewinds() {
        let mut lexer = TypeLexer::new("int|string");
        let snapshot = lexer.snapshot();
        assert_eq!(lexer.next_token().as_str(), Some("int"));
        assert_eq!(lexer.next_token().as_str(), Some("|"));
        lexer.restore(snapshot);
        assert_eq!(lexer.peek(0).as_deref(), Some("int"));
    }

    #[test]
    fn preceded_by_whitespace_probe() {
        let mut lexer = TypeLexer::new("int $x");
        let int = lexer.next_token();
        let var = lexer.next_token();
        assert!(!lexer.preceded_by_whitespace(&int));
        assert!(lexer.preceded_by_whitespace(&var));
    }

    #[test]
    fn rest_returns_unconsumed_text() {
        let mut lexer = TypeLexer::new("int $x the rest");
        lexer.next_token();
        assert_eq!(lexer.rest(), "$x the rest");
    }

    #[test]
    fn spans_index_the_source() {
        let mut lexer = TypeLexer::new("  integer ");
        let token = lexer.next_token();
        assert_eq!(token.span().as_range(), 2..9);
    }
}
