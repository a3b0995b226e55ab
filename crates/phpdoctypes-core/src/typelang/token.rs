// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Transient tokens for type-expression text.
//!
//! Unlike host tokens, these exist only for the lifetime of a single parser
//! invocation. A token is its text plus the span it came from; the
//! end-of-stream condition is a token whose `text` is `None`, which is also
//! how an unterminated string literal is reported (the lexer refuses to
//! guess where such a string was meant to end).

use ecow::EcoString;

use super::Span;

/// A single token of type-expression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeToken {
    span: Span,
    text: Option<EcoString>,
}

impl TypeToken {
    /// Creates a token carrying text.
    #[must_use]
    pub fn new(text: impl Into<EcoString>, span: Span) -> Self {
        Self {
            span,
            text: Some(text.into()),
        }
    }

    /// Creates the end-of-stream sentinel at the given position.
    #[must_use]
    pub const fn end(span: Span) -> Self {
        Self { span, text: None }
    }

    /// Returns the token text, or `None` at end of stream.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the source span of this token.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns `true` if this is the end-of-stream sentinel.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.text.is_none()
    }
}
