// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser and normalizer for PHPDoc type expressions.
//!
//! The grammar is small but irregular: unions of intersections, generics,
//! array and object shapes, integer ranges and masks, class-strings,
//! callable signatures, conditional return types, template references, and
//! namespace-qualified names. Parsing and normalization happen in one walk;
//! the result is a canonical type string in disjunctive normal form.
//!
//! # Entry points
//!
//! - [`parse_type_and_name`] — parses a type and, depending on [`Want`],
//!   a pass-by-reference/splat marker, a `$variable` name, and an implicit
//!   `= null` default.
//! - [`parse_template`] — parses a template declaration,
//!   `NAME ('of'|'as' TYPE)?`, with the bound defaulting to `mixed`.
//!
//! # Failure and rollback
//!
//! Productions return `Result`; the entry points take a snapshot of the
//! lexer queue, the fix list, and the conformance flag before each
//! speculative section and restore all three when it fails. A failed type
//! or name is reported as `None` in the [`ParsedType`] — parse errors
//! never escape the entry points.
//!
//! # Style fixes and standard conformance
//!
//! Every recognized keyword is normalized to its canonical lowercase short
//! form (`integer` → `int`, `boolean` → `bool`, `double` → `float`,
//! `never-return`/`never-returns`/`no-return` → `never`). Any divergence
//! between the written token and the canonical rendering is recorded as a
//! replacement over the original text; applying the replacements
//! right-to-left yields the fixed rendering. Constructs beyond the
//! published documentation standard (generics, shapes, ranges, masks,
//! refined scalars, `array-key`, `scalar`, conditional types, templates,
//! the `?` nullable prefix, `parent`, …) clear the `phpfig` flag.

mod basic;

use std::fmt;

use ecow::{EcoString, eco_format};
use miette::Diagnostic;
use thiserror::Error;

use crate::hierarchy::HierarchyOracle;

use super::lexer::{LexerSnapshot, TypeLexer};
use super::{Scope, Span};

/// How much of a tag payload to parse beyond the type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Want {
    /// The type only.
    Type,
    /// The type and a `$variable` name.
    TypeAndName,
    /// Also the `&` / `...` markers before the name.
    TypeNamePassSplat,
    /// Also an `= null` default after the name.
    TypeNameDefault,
}

impl Want {
    const fn includes_name(self) -> bool {
        !matches!(self, Self::Type)
    }

    const fn includes_pass_splat(self) -> bool {
        matches!(self, Self::TypeNamePassSplat | Self::TypeNameDefault)
    }

    const fn includes_default(self) -> bool {
        matches!(self, Self::TypeNameDefault)
    }
}

/// The outcome of one parser invocation.
///
/// A `None` type or name means that section of the payload failed to
/// parse; the lexer was rewound so the remainder text is still coherent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    /// The canonical type, if one parsed.
    pub ty: Option<EcoString>,
    /// The `$variable` name, if requested and present.
    pub name: Option<EcoString>,
    /// The literal `&`, `...`, or `&...` markers found before the name.
    pub pass_splat: EcoString,
    /// Unconsumed payload text (typically the description).
    pub rem: EcoString,
    /// The style-corrected payload, when any fix applies.
    pub fixed: Option<EcoString>,
    /// `true` while the expression stays within the published standard.
    pub phpfig: bool,
}

impl Default for ParsedType {
    fn default() -> Self {
        Self {
            ty: None,
            name: None,
            pass_splat: EcoString::new(),
            rem: EcoString::new(),
            fixed: None,
            phpfig: true,
        }
    }
}

/// A recoverable failure inside the type parser.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct ParseError {
    /// What went wrong.
    #[source]
    pub kind: ParseErrorKind,
    /// Where in the payload text it went wrong.
    #[label("here")]
    pub span: Span,
}

/// The kind of parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The payload ended where a type was required.
    #[error("unexpected end of type expression")]
    UnexpectedEnd,
    /// A token that no production accepts.
    #[error("unexpected '{0}'")]
    UnexpectedToken(EcoString),
    /// A specific token was required.
    #[error("expected '{0}'")]
    Expected(EcoString),
    /// A non-object type appeared in an intersection.
    #[error("'{0}' cannot participate in an intersection")]
    BadIntersection(EcoString),
    /// A parenthesized union inside an intersection.
    #[error("parenthesized union inside an intersection")]
    NonDnf,
    /// Text followed the parsed section without a separator.
    #[error("trailing content after type")]
    TrailingContent,
    /// An array key type that is not an array-key.
    #[error("array key type '{0}' is not an array-key")]
    BadArrayKey(EcoString),
    /// `key-of`/`value-of` over a non-iterable, non-object type.
    #[error("'{0}' is not an iterable or object type")]
    NotIterable(EcoString),
    /// A class-string argument that is not an object type.
    #[error("class-string of non-object type '{0}'")]
    NotObject(EcoString),
    /// `::` with neither a constant name nor `*`.
    #[error("expected class constant name")]
    ExpectedConstName,
    /// A `$variable` was required.
    #[error("expected variable name")]
    ExpectedVariable,
}

/// A single style correction over the original payload text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fix {
    span: Span,
    replacement: EcoString,
}

/// Saved parser state for speculative parsing.
struct Snapshot {
    lexer: LexerSnapshot,
    fixes: usize,
    phpfig: bool,
}

type Attempt<T> = Result<T, ParseError>;

/// Parses a type and (per `want`) a name from one payload text.
///
/// `gowide` selects the fallback for constructs whose type cannot be known
/// (class constants, `key-of`/`value-of`): `mixed` when true (native
/// annotations), `never` when false (doc annotations).
#[must_use]
pub fn parse_type_and_name(
    oracle: &HierarchyOracle<'_>,
    scope: &Scope,
    text: &str,
    want: Want,
    gowide: bool,
) -> ParsedType {
    let mut parser = Parser::new(*oracle, scope, text, gowide);
    let mut out = ParsedType::default();

    let snapshot = parser.snapshot();
    match parser
        .parse_any_type()
        .and_then(|ty| parser.check_boundary().map(|()| ty))
    {
        Ok(ty) => out.ty = Some(ty),
        Err(error) => {
            tracing::debug!(%error, "type section rolled back");
            parser.restore(snapshot);
        }
    }

    if want.includes_name() {
        let snapshot = parser.snapshot();
        match parser.parse_name(want) {
            Ok((pass_splat, name)) => {
                out.pass_splat = pass_splat;
                out.name = Some(name);
            }
            Err(error) => {
                tracing::debug!(%error, "name section rolled back");
                parser.restore(snapshot);
            }
        }
    }

    if want.includes_default() && parser.peek_is(0, "=") {
        parser.next();
        if parser
            .peek(0)
            .is_some_and(|t| t.eq_ignore_ascii_case("null"))
        {
            parser.next();
            if let Some(ty) = out.ty.take() {
                // An `= null` default makes the parameter implicitly
                // nullable; the canonical form is patched by plain
                // concatenation and left for a later re-parse to tidy.
                out.ty = Some(eco_format!("{ty}|null"));
            }
        }
    }

    out.rem = parser.lexer.rest().trim().into();
    out.fixed = parser.fixed_text();
    out.phpfig = parser.phpfig;
    out
}

/// Parses a template declaration: `NAME ('of'|'as' TYPE)?`.
///
/// The bound defaults to `mixed` when absent. A missing or malformed name
/// leaves both `name` and `ty` unset.
#[must_use]
pub fn parse_template(oracle: &HierarchyOracle<'_>, scope: &Scope, text: &str) -> ParsedType {
    let mut parser = Parser::new(*oracle, scope, text, false);
    let mut out = ParsedType::default();

    let snapshot = parser.snapshot();
    match parser.parse_template_name() {
        Ok(name) => out.name = Some(name),
        Err(error) => {
            tracing::debug!(%error, "template name rolled back");
            parser.restore(snapshot);
        }
    }

    if out.name.is_some() {
        if parser
            .peek(0)
            .is_some_and(|t| t.eq_ignore_ascii_case("of") || t.eq_ignore_ascii_case("as"))
        {
            parser.consume_styled("of");
            let snapshot = parser.snapshot();
            match parser
                .parse_any_type()
                .and_then(|ty| parser.check_boundary().map(|()| ty))
            {
                Ok(ty) => out.ty = Some(ty),
                Err(error) => {
                    tracing::debug!(%error, "template bound rolled back");
                    parser.restore(snapshot);
                }
            }
        } else {
            out.ty = Some("mixed".into());
        }
    }

    out.rem = parser.lexer.rest().trim().into();
    out.fixed = parser.fixed_text();
    out.phpfig = parser.phpfig;
    out
}

/// One parser invocation's state. Constructed and discarded per entry
/// point; nothing survives between calls.
pub(super) struct Parser<'p, 'src> {
    pub(super) oracle: HierarchyOracle<'p>,
    pub(super) scope: &'p Scope,
    pub(super) lexer: TypeLexer<'src>,
    source: &'src str,
    pub(super) gowide: bool,
    pub(super) phpfig: bool,
    fixes: Vec<Fix>,
}

impl<'p, 'src> Parser<'p, 'src> {
    fn new(oracle: HierarchyOracle<'p>, scope: &'p Scope, source: &'src str, gowide: bool) -> Self {
        Self {
            oracle,
            scope,
            lexer: TypeLexer::new(source),
            source,
            gowide,
            phpfig: true,
            fixes: Vec::new(),
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    pub(super) fn peek(&mut self, k: usize) -> Option<EcoString> {
        self.lexer.peek(k)
    }

    pub(super) fn peek_is(&mut self, k: usize, text: &str) -> bool {
        self.lexer.peek(k).as_deref() == Some(text)
    }

    pub(super) fn next(&mut self) {
        self.lexer.next_token();
    }

    /// Consumes the current token, expecting exactly `text`.
    pub(super) fn expect(&mut self, text: &str) -> Attempt<()> {
        if self.peek_is(0, text) {
            self.next();
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::Expected(text.into())))
        }
    }

    /// Consumes the current token as the keyword whose canonical rendering
    /// is `styled`, recording a fix if the written form differs.
    pub(super) fn consume_styled(&mut self, styled: &str) {
        let token = self.lexer.next_token();
        if token.as_str() != Some(styled) {
            self.fixes.push(Fix {
                span: token.span(),
                replacement: styled.into(),
            });
        }
    }

    pub(super) fn error_here(&mut self, kind: ParseErrorKind) -> ParseError {
        let span = self.lexer.peek_token(0).span();
        ParseError { kind, span }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lexer: self.lexer.snapshot(),
            fixes: self.fixes.len(),
            phpfig: self.phpfig,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.lexer.restore(snapshot.lexer);
        self.fixes.truncate(snapshot.fixes);
        self.phpfig = snapshot.phpfig;
    }

    /// After a type or a name, the next token must be the end of the
    /// payload, a separator, or at least divided off by whitespace.
    fn check_boundary(&mut self) -> Attempt<()> {
        let token = self.lexer.peek_token(0);
        let ok = match token.as_str() {
            None => true,
            Some(text) => {
                self.lexer.preceded_by_whitespace(&token)
                    || matches!(text, "," | ";" | ":" | ".")
            }
        };
        if ok {
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::TrailingContent))
        }
    }

    /// Applies the accumulated fixes right-to-left over the original text.
    fn fixed_text(&self) -> Option<EcoString> {
        if self.fixes.is_empty() {
            return None;
        }
        let mut fixes = self.fixes.clone();
        fixes.sort_by_key(|fix| fix.span.start());
        let mut out = String::from(self.source);
        for fix in fixes.iter().rev() {
            out.replace_range(fix.span.as_range(), &fix.replacement);
        }
        Some(out.into())
    }

    // ========================================================================
    // Productions
    // ========================================================================

    /// `anyType := '?' singleType | conditional | intersection ('|' intersection)*`
    pub(super) fn parse_any_type(&mut self) -> Attempt<EcoString> {
        let members = if self.peek_is(0, "?") {
            self.phpfig = false;
            self.next();
            vec![self.parse_single_type()?, "null".into()]
        } else if self.at_conditional() {
            self.parse_conditional()?
        } else {
            self.parse_union()?
        };
        Ok(self.canonical_union(members))
    }

    fn at_conditional(&mut self) -> bool {
        self.peek(0).is_some_and(|t| t.starts_with('$'))
            && self.peek(1).is_some_and(|t| t.eq_ignore_ascii_case("is"))
    }

    /// `'$' IDENT 'is' TYPE '?' TYPE ':' TYPE` — the result is the union
    /// of the two branches.
    fn parse_conditional(&mut self) -> Attempt<Vec<EcoString>> {
        self.phpfig = false;
        self.next(); // $param
        self.next(); // is
        let _subject = self.parse_any_type()?;
        self.expect("?")?;
        let then_ty = self.parse_any_type()?;
        self.expect(":")?;
        let else_ty = self.parse_any_type()?;
        Ok(then_ty
            .split('|')
            .chain(else_ty.split('|'))
            .map(EcoString::from)
            .collect())
    }

    /// A union of intersections; returns the member list, one canonical
    /// intersection per element.
    fn parse_union(&mut self) -> Attempt<Vec<EcoString>> {
        let mut members = Vec::new();
        loop {
            let first = self.parse_single_type()?;
            if self.peek_is(0, "&") && self.amp_is_intersection() {
                let mut parts = vec![first];
                while self.peek_is(0, "&") && self.amp_is_intersection() {
                    self.next();
                    parts.push(self.parse_single_type()?);
                }
                members.push(self.canonical_intersection(parts)?);
            } else {
                members.push(first);
            }
            if self.peek_is(0, "|") {
                self.next();
            } else {
                break;
            }
        }
        Ok(members)
    }

    /// `&` doubles as pass-by-reference in parameter context: it only
    /// means intersection when what follows could start another type.
    fn amp_is_intersection(&mut self) -> bool {
        match self.peek(1) {
            None => false,
            Some(t) => !(t == "..." || t == "=" || t == "," || t == ")" || t.starts_with('$')),
        }
    }

    /// `singleType := '(' anyType ')' arraySuffix* | basicType arraySuffix*`
    pub(super) fn parse_single_type(&mut self) -> Attempt<EcoString> {
        let mut ty = if self.peek_is(0, "(") {
            self.next();
            let inner = self.parse_any_type()?;
            self.expect(")")?;
            inner
        } else {
            self.parse_basic_type()?
        };
        while self.peek_is(0, "[") && self.peek_is(1, "]") {
            self.next();
            self.next();
            ty = "array".into();
        }
        Ok(ty)
    }

    /// Validates and canonicalizes one intersection.
    fn canonical_intersection(&mut self, parts: Vec<EcoString>) -> Attempt<EcoString> {
        let oracle = self.oracle;
        for part in &parts {
            if part.contains('|') {
                return Err(self.error_here(ParseErrorKind::NonDnf));
            }
        }
        if parts.iter().any(|p| p == "never") {
            return Ok("never".into());
        }
        let mut list: Vec<EcoString> = Vec::new();
        for part in parts {
            if !list.contains(&part) {
                list.push(part);
            }
        }
        if list.len() > 1 {
            list.retain(|p| p != "mixed");
        }
        for part in &list {
            let allowed = part == "object"
                || part == "iterable"
                || part == "callable"
                || oracle.super_types(part).iter().any(|s| s == "object");
            if !allowed {
                return Err(self.error_here(ParseErrorKind::BadIntersection(part.clone())));
            }
        }
        // A component that is a supertype of another component adds nothing.
        let before = list.clone();
        list.retain(|p| {
            !before
                .iter()
                .any(|q| q != p && oracle.super_types(q).iter().any(|s| s == p))
        });
        list.sort();
        Ok(EcoString::from(list.join("&")))
    }

    /// Canonicalizes a union member list into the final type string.
    fn canonical_union(&mut self, members: Vec<EcoString>) -> EcoString {
        let oracle = self.oracle;

        // Flatten nested unions and drop duplicates.
        let mut list: Vec<EcoString> = Vec::new();
        for member in &members {
            for part in member.split('|') {
                if !list.iter().any(|x| x == part) {
                    list.push(part.into());
                }
            }
        }

        // A member assignable to a wider member adds nothing. For mutually
        // assignable pairs (possible with cyclic artifact hierarchies) the
        // first spelling wins.
        let mut kept: Vec<EcoString> = Vec::new();
        'members: for (b_pos, b) in list.iter().enumerate() {
            for (a_pos, a) in list.iter().enumerate() {
                if a_pos != b_pos && oracle.compare_types(Some(a.as_str()), Some(b.as_str())) {
                    if oracle.compare_types(Some(b.as_str()), Some(a.as_str())) && b_pos < a_pos {
                        continue;
                    }
                    continue 'members;
                }
            }
            kept.push(b.clone());
        }
        let mut list = kept;

        // Structural unions that are spellable as one keyword.
        let has = |list: &[EcoString], s: &str| list.iter().any(|x| x == s);
        if has(&list, "int") && has(&list, "string") && !has(&list, "array-key") {
            list.push("array-key".into());
        }
        if has(&list, "bool") && has(&list, "float") && has(&list, "array-key")
            && !has(&list, "scalar")
        {
            list.push("scalar".into());
        }
        if has(&list, "\\Traversable") && has(&list, "array") && !has(&list, "iterable") {
            list.push("iterable".into());
        }

        if list.iter().any(|x| x == "mixed") {
            return "mixed".into();
        }
        if list.len() > 1 {
            list.retain(|x| x != "never");
        }
        list.sort();
        list.dedup();
        EcoString::from(list.join("|"))
    }

    /// The `&`/`...` markers and the `$variable` name after a type.
    fn parse_name(&mut self, want: Want) -> Attempt<(EcoString, EcoString)> {
        let mut pass_splat = EcoString::new();
        if want.includes_pass_splat() {
            if self.peek_is(0, "&") {
                pass_splat.push('&');
                self.next();
            }
            if self.peek_is(0, "...") {
                pass_splat.push_str("...");
                self.next();
            }
        }
        let token = self.lexer.peek_token(0);
        let name = match token.as_str() {
            Some(text) if text.starts_with('$') && text.len() > 1 => EcoString::from(text),
            _ => return Err(self.error_here(ParseErrorKind::ExpectedVariable)),
        };
        self.next();
        self.check_boundary_after_name()?;
        Ok((pass_splat, name))
    }

    /// Like [`Parser::check_boundary`], but a default-value `=` and a
    /// closing parenthesis may also follow a name directly.
    fn check_boundary_after_name(&mut self) -> Attempt<()> {
        let token = self.lexer.peek_token(0);
        let ok = match token.as_str() {
            None => true,
            Some(text) => {
                self.lexer.preceded_by_whitespace(&token)
                    || matches!(text, "," | ";" | ":" | "." | "=" | ")")
            }
        };
        if ok {
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::TrailingContent))
        }
    }

    /// A template name: a plain identifier without sigil or separators.
    fn parse_template_name(&mut self) -> Attempt<EcoString> {
        let token = self.lexer.peek_token(0);
        let Some(text) = token.as_str() else {
            return Err(self.error_here(ParseErrorKind::UnexpectedEnd));
        };
        let mut chars = text.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !(head_ok && tail_ok) {
            return Err(self.error_here(ParseErrorKind::UnexpectedToken(text.into())));
        }
        let name = EcoString::from(text);
        self.next();
        self.check_boundary()?;
        Ok(name)
    }
}

impl fmt::Debug for Parser<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("gowide", &self.gowide)
            .field("phpfig", &self.phpfig)
            .field("fixes", &self.fixes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ArtifactTable;

    fn parse(text: &str) -> ParsedType {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        parse_type_and_name(&oracle, &Scope::root(), text, Want::Type, false)
    }

    fn parse_in(scope: &Scope, text: &str) -> ParsedType {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        parse_type_and_name(&oracle, scope, text, Want::Type, false)
    }

    fn canon(text: &str) -> Option<EcoString> {
        parse(text).ty
    }

    #[test]
    fn keywords_normalize_to_short_lowercase_forms() {
        let result = parse("integer|boolean");
        assert_eq!(result.ty.as_deref(), Some("bool|int"));
        assert_eq!(result.fixed.as_deref(), Some("int|bool"));
        assert!(result.phpfig);
    }

    #[test]
    fn union_members_sort_and_dedupe() {
        assert_eq!(canon("float|int|float"), Some("float|int".into()));
        assert_eq!(canon("B|A"), Some("\\A|\\B".into()));
        assert_eq!(canon("A|B"), Some("\\A|\\B".into()));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for text in [
            "integer|boolean",
            "?Foo",
            "array<int, string>",
            "iterable|array",
            "never",
            "static",
            "callable-string|float|bool",
        ] {
            let once = parse(text).ty.expect(text);
            let twice = parse(&once).ty.expect(text);
            assert_eq!(once, twice, "input {text}");
        }
    }

    #[test]
    fn nullable_prefix_adds_null_and_clears_phpfig() {
        let mut scope = Scope::root();
        scope.namespace = "\\Ns".into();
        let result = parse_in(&scope, "?Foo");
        assert_eq!(result.ty.as_deref(), Some("\\Ns\\Foo|null"));
        assert!(!result.phpfig);
    }

    #[test]
    fn typed_array_canonicalizes_to_array() {
        let result = parse("array<int, string>");
        assert_eq!(result.ty.as_deref(), Some("array"));
        assert!(!result.phpfig);
        assert_eq!(result.fixed, None);
    }

    #[test]
    fn bad_array_key_fails() {
        assert_eq!(canon("array<float, string>"), None);
    }

    #[test]
    fn traversable_plus_array_gains_iterable() {
        let mut scope = Scope::root();
        scope
            .uses
            .insert("Traversable".into(), "\\Traversable".into());
        let result = parse_in(&scope, "Traversable|array");
        assert_eq!(result.ty.as_deref(), Some("\\Traversable|array|iterable"));
    }

    #[test]
    fn int_and_string_gain_array_key() {
        assert_eq!(canon("int|string"), Some("array-key|int|string".into()));
    }

    #[test]
    fn full_scalar_set_gains_scalar() {
        let result = parse("int|string|bool|float");
        let ty = result.ty.unwrap();
        assert!(ty.split('|').any(|m| m == "scalar"), "{ty}");
    }

    #[test]
    fn mixed_absorbs_everything() {
        assert_eq!(canon("int|mixed|string"), Some("mixed".into()));
        assert_eq!(canon("mixed"), Some("mixed".into()));
    }

    #[test]
    fn never_is_elided_from_larger_unions() {
        assert_eq!(canon("int|never"), Some("int".into()));
        assert_eq!(canon("never"), Some("never".into()));
        assert_eq!(canon("never-return"), Some("never".into()));
    }

    #[test]
    fn wider_member_absorbs_narrower() {
        assert_eq!(canon("array-key|int"), Some("array-key".into()));
        assert_eq!(canon("iterable|array"), Some("iterable".into()));
        assert_eq!(canon("scalar|bool"), Some("scalar".into()));
    }

    #[test]
    fn intersection_elides_supertypes() {
        let result = parse("\\ArrayIterator&\\Iterator");
        assert_eq!(result.ty.as_deref(), Some("\\ArrayIterator"));
        let both = parse("\\Iterator&\\Countable");
        assert_eq!(both.ty.as_deref(), Some("\\Countable&\\Iterator"));
    }

    #[test]
    fn intersection_of_primitives_fails() {
        assert_eq!(canon("int&string"), None);
        assert_eq!(canon("\\Iterator&int"), None);
    }

    #[test]
    fn parenthesized_union_inside_intersection_is_rejected() {
        assert_eq!(canon("(\\A|\\B)&\\C"), None);
        // ...but a parenthesized union on its own flattens.
        assert_eq!(canon("(int|string)"), Some("array-key|int|string".into()));
    }

    #[test]
    fn array_suffix_flattens_to_array() {
        assert_eq!(canon("int[]"), Some("array".into()));
        assert_eq!(canon("\\Foo[][]"), Some("array".into()));
        assert_eq!(canon("(int|string)[]"), Some("array".into()));
        assert!(parse("int[]").phpfig, "the [] suffix is standard");
    }

    #[test]
    fn shapes_parse_and_flatten() {
        assert_eq!(canon("array{a: int, b?: string}"), Some("array".into()));
        assert_eq!(canon("array{int, string}"), Some("array".into()));
        assert_eq!(canon("array{}"), Some("array".into()));
        assert_eq!(canon("object{name: string}"), Some("object".into()));
        assert_eq!(canon("array{'quoted key': int}"), Some("array".into()));
        assert!(!parse("array{a: int}").phpfig);
    }

    #[test]
    fn int_ranges_and_masks() {
        assert_eq!(canon("int<0, 100>"), Some("int".into()));
        assert_eq!(canon("int<min, max>"), Some("int".into()));
        assert_eq!(canon("int<-5, 5>"), Some("int".into()));
        assert_eq!(canon("int-mask<1, 2, 4>"), Some("int".into()));
        assert_eq!(canon("positive-int"), Some("int".into()));
        assert_eq!(canon("int<0>"), None, "a range needs two bounds");
        assert!(!parse("int<0, 100>").phpfig);
    }

    #[test]
    fn string_refinements() {
        assert_eq!(canon("class-string"), Some("string".into()));
        assert_eq!(canon("class-string<\\Exception>"), Some("string".into()));
        assert_eq!(canon("class-string<int>"), None);
        assert_eq!(canon("non-empty-string"), Some("string".into()));
        assert_eq!(canon("callable-string"), Some("callable-string".into()));
    }

    #[test]
    fn callable_signatures() {
        assert_eq!(canon("callable"), Some("callable".into()));
        assert_eq!(canon("callable(): void"), Some("callable".into()));
        assert_eq!(
            canon("callable(int, string...): ?bool"),
            Some("callable".into())
        );
        assert_eq!(canon("callable(int &$x, bool=)"), Some("callable".into()));
        assert_eq!(canon("\\Closure(int): int"), Some("\\Closure".into()));
        assert!(parse("callable").phpfig);
        assert!(!parse("callable(): void").phpfig);
    }

    #[test]
    fn literal_scalars() {
        assert_eq!(canon("0|1"), Some("int".into()));
        assert_eq!(canon("1.5"), Some("float".into()));
        assert_eq!(canon("'up'|'down'"), Some("string".into()));
        assert!(!parse("0|1").phpfig);
    }

    #[test]
    fn key_of_and_value_of_yield_the_fallback() {
        let narrow = parse("value-of<\\ArrayIterator>");
        assert_eq!(narrow.ty.as_deref(), Some("never"));
        assert_eq!(canon("key-of<int>"), None, "int is not iterable");
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let wide = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "value-of<iterable>",
            Want::Type,
            true,
        );
        assert_eq!(wide.ty.as_deref(), Some("mixed"));
    }

    #[test]
    fn class_constants_yield_the_fallback() {
        assert_eq!(canon("\\Foo::BAR"), Some("never".into()));
        assert_eq!(canon("\\Foo::BAR_*"), Some("never".into()));
        assert_eq!(canon("\\Foo::*"), Some("never".into()));
        assert_eq!(canon("\\Foo::"), None);
        assert!(!parse("\\Foo::BAR").phpfig);
    }

    #[test]
    fn self_parent_static_resolve_against_scope() {
        let mut scope = Scope::root();
        scope.classname = Some("\\Ns\\C".into());
        scope.parentname = Some("\\Ns\\P".into());
        assert_eq!(parse_in(&scope, "self").ty.as_deref(), Some("\\Ns\\C"));
        assert_eq!(parse_in(&scope, "parent").ty.as_deref(), Some("\\Ns\\P"));
        assert_eq!(
            parse_in(&scope, "static").ty.as_deref(),
            Some("static(\\Ns\\C)")
        );
        assert_eq!(
            parse_in(&scope, "$this").ty.as_deref(),
            Some("static(\\Ns\\C)")
        );
        // Unresolved forms stay symbolic.
        assert_eq!(canon("self"), Some("self".into()));
        assert_eq!(canon("parent"), Some("parent".into()));
        assert_eq!(canon("static"), Some("static".into()));
        assert!(!parse_in(&scope, "parent").phpfig);
        assert!(parse_in(&scope, "self").phpfig);
    }

    #[test]
    fn names_resolve_through_uses_then_namespace() {
        let mut scope = Scope::root();
        scope.namespace = "\\Ns".into();
        scope.uses.insert("Alias".into(), "\\Lib\\Real".into());
        assert_eq!(parse_in(&scope, "Alias").ty.as_deref(), Some("\\Lib\\Real"));
        assert_eq!(
            parse_in(&scope, "Alias\\Sub").ty.as_deref(),
            Some("\\Lib\\Real\\Sub")
        );
        assert_eq!(parse_in(&scope, "Local").ty.as_deref(), Some("\\Ns\\Local"));
        assert_eq!(parse_in(&scope, "\\Abs").ty.as_deref(), Some("\\Abs"));
    }

    #[test]
    fn template_references_stand_for_their_bound() {
        let mut scope = Scope::root();
        scope.templates.insert("T".into(), "\\Countable".into());
        let result = parse_in(&scope, "T");
        assert_eq!(result.ty.as_deref(), Some("\\Countable"));
        assert!(!result.phpfig);
    }

    #[test]
    fn generic_class_arguments_are_discarded() {
        let mut scope = Scope::root();
        scope.uses.insert("Collection".into(), "\\Lib\\Collection".into());
        let result = parse_in(&scope, "Collection<int, \\Foo>");
        assert_eq!(result.ty.as_deref(), Some("\\Lib\\Collection"));
        assert!(!result.phpfig);
    }

    #[test]
    fn conditional_return_types_union_their_branches() {
        let result = parse("$size is int ? int : string");
        assert_eq!(result.ty.as_deref(), Some("int|string"));
        assert!(!result.phpfig);
    }

    #[test]
    fn trailing_content_without_separator_rolls_back() {
        let result = parse("int$");
        assert_eq!(result.ty, None);
        // A described type is fine: whitespace separates.
        assert_eq!(parse("int the count").ty.as_deref(), Some("int"));
        // So is a sentence-ending period.
        assert_eq!(parse("int.").ty.as_deref(), Some("int"));
    }

    #[test]
    fn rollback_resets_style_and_fig_flags() {
        let result = parse("integer$");
        assert_eq!(result.ty, None);
        assert_eq!(result.fixed, None, "fixes from the failed attempt are gone");
        assert!(result.phpfig);
    }

    #[test]
    fn name_parsing() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "int $count the count",
            Want::TypeAndName,
            false,
        );
        assert_eq!(result.ty.as_deref(), Some("int"));
        assert_eq!(result.name.as_deref(), Some("$count"));
        assert_eq!(result.rem, "the count");
    }

    #[test]
    fn pass_by_reference_and_splat_markers() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "int &...$rest",
            Want::TypeNamePassSplat,
            false,
        );
        assert_eq!(result.ty.as_deref(), Some("int"));
        assert_eq!(result.pass_splat, "&...");
        assert_eq!(result.name.as_deref(), Some("$rest"));
    }

    #[test]
    fn ampersand_before_variable_is_not_intersection() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "callable&\\Closure &$cb",
            Want::TypeNamePassSplat,
            false,
        );
        assert_eq!(result.ty.as_deref(), Some("\\Closure&callable"));
        assert_eq!(result.pass_splat, "&");
        assert_eq!(result.name.as_deref(), Some("$cb"));
    }

    #[test]
    fn implicit_null_default_appends_literally() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "int $x = null",
            Want::TypeNameDefault,
            true,
        );
        // Appended without re-canonicalization: a later re-parse tidies it.
        assert_eq!(result.ty.as_deref(), Some("int|null"));
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "?int $x = null",
            Want::TypeNameDefault,
            true,
        );
        assert_eq!(result.ty.as_deref(), Some("int|null|null"));
    }

    #[test]
    fn missing_name_rolls_back_name_only() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "int only a description",
            Want::TypeAndName,
            false,
        );
        assert_eq!(result.ty.as_deref(), Some("int"));
        assert_eq!(result.name, None);
        assert_eq!(result.rem, "only a description");
    }

    #[test]
    fn unparseable_type_still_finds_the_name() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            "&...$args description",
            Want::TypeNamePassSplat,
            false,
        );
        assert_eq!(result.ty, None);
        assert_eq!(result.pass_splat, "&...");
        assert_eq!(result.name.as_deref(), Some("$args"));
    }

    #[test]
    fn fix_round_trip_produces_clean_reparse() {
        let inputs = ["integer|boolean", "Double|NEVER-RETURN", "?Boolean"];
        for text in inputs {
            let first = parse(text);
            let fixed = first.fixed.clone().expect(text);
            let second = parse(&fixed);
            assert_eq!(second.ty, first.ty, "input {text}");
            assert_eq!(second.fixed, None, "fixed text reparses clean: {text}");
        }
    }

    #[test]
    fn template_declarations() {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let scope = Scope::root();

        let bare = parse_template(&oracle, &scope, "T");
        assert_eq!(bare.name.as_deref(), Some("T"));
        assert_eq!(bare.ty.as_deref(), Some("mixed"));

        let bounded = parse_template(&oracle, &scope, "T of \\Countable");
        assert_eq!(bounded.name.as_deref(), Some("T"));
        assert_eq!(bounded.ty.as_deref(), Some("\\Countable"));

        let psalm = parse_template(&oracle, &scope, "T as \\Countable");
        assert_eq!(psalm.ty.as_deref(), Some("\\Countable"));
        assert_eq!(psalm.fixed.as_deref(), Some("T of \\Countable"));

        let broken = parse_template(&oracle, &scope, "$nope");
        assert_eq!(broken.name, None);
        assert_eq!(broken.ty, None);

        let bad_bound = parse_template(&oracle, &scope, "T of |");
        assert_eq!(bad_bound.name.as_deref(), Some("T"));
        assert_eq!(bad_bound.ty, None);
    }

    #[test]
    fn unterminated_string_fails_cleanly() {
        let result = parse("'oops");
        assert_eq!(result.ty, None);
    }

    #[test]
    fn empty_text_parses_nothing() {
        let result = parse("");
        assert_eq!(result.ty, None);
        assert_eq!(result.rem, "");
    }
}
