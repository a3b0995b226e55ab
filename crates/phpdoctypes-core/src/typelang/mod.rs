// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type-expression analysis: lexing, parsing, and normalization.
//!
//! This module contains everything that understands PHPDoc type syntax:
//!
//! - The [`TypeLexer`] streams a doc-comment payload as lookahead tokens.
//! - The parser ([`parse_type_and_name`], [`parse_template`]) turns that
//!   stream into a canonical type string, a proposed style fix, and a
//!   standard-conformance flag, packaged as a [`ParsedType`].
//! - The [`Scope`] record carries the namespace, imports, templates, and
//!   class identity the parser resolves names against.
//!
//! # Canonical types
//!
//! A canonical type is a nonempty string: a union of `|`-separated
//! intersections of `&`-separated atoms, lexicographically sorted and
//! deduplicated, with no parentheses. Atoms are the lowercase keyword set
//! (`int`, `string`, `array-key`, …), fully-qualified class names with a
//! leading separator, or `static(\Class)` for late static binding
//! resolved against a known class.

mod lexer;
mod parser;
mod scope;
mod span;
mod token;

#[cfg(test)]
mod parser_property_tests;

pub use lexer::{LexerSnapshot, TypeLexer};
pub use parser::{
    ParseError, ParseErrorKind, ParsedType, Want, parse_template, parse_type_and_name,
};
pub use scope::{Scope, ScopeKind};
pub use span::Span;
pub use token::TypeToken;
