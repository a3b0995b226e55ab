// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The `basicType` productions: keywords, refined scalars, generics,
//! shapes, callable signatures, late-static-binding forms, and qualified
//! class names.

use ecow::{EcoString, eco_format};

use super::{Attempt, ParseErrorKind, Parser};

impl Parser<'_, '_> {
    /// Parses one basic type and returns its canonical atom (or, for
    /// template references and parenthesized groups reached through other
    /// paths, a canonical type).
    pub(super) fn parse_basic_type(&mut self) -> Attempt<EcoString> {
        let token = self.lexer.peek_token(0);
        let Some(text) = token.as_str().map(EcoString::from) else {
            return Err(self.error_here(ParseErrorKind::UnexpectedEnd));
        };

        // Literal scalars name their own type.
        let first = text.chars().next().unwrap_or_default();
        if first.is_ascii_digit() || (first == '-' && text.len() > 1) {
            self.next();
            self.phpfig = false;
            let atom = if text.contains('.') { "float" } else { "int" };
            return Ok(atom.into());
        }
        if first == '\'' || first == '"' {
            self.next();
            self.phpfig = false;
            return Ok("string".into());
        }

        let lower = text.to_ascii_lowercase();
        match lower.as_str() {
            "bool" | "boolean" => {
                self.consume_styled("bool");
                Ok("bool".into())
            }
            "true" | "false" => {
                self.consume_styled(&lower);
                Ok("bool".into())
            }
            "int" | "integer" => {
                self.consume_styled("int");
                self.maybe_int_range()?;
                Ok("int".into())
            }
            "positive-int" | "negative-int" | "non-positive-int" | "non-negative-int"
            | "non-zero-int" => {
                self.phpfig = false;
                self.consume_styled(&lower);
                Ok("int".into())
            }
            "int-mask" => {
                self.phpfig = false;
                self.consume_styled("int-mask");
                self.parse_int_mask()?;
                Ok("int".into())
            }
            "int-mask-of" => {
                self.phpfig = false;
                self.consume_styled("int-mask-of");
                self.expect("<")?;
                self.parse_single_type()?;
                self.expect(">")?;
                Ok("int".into())
            }
            "float" | "double" => {
                self.consume_styled("float");
                Ok("float".into())
            }
            "string" => {
                self.consume_styled("string");
                Ok("string".into())
            }
            "class-string" => {
                self.phpfig = false;
                self.consume_styled("class-string");
                if self.peek_is(0, "<") {
                    self.next();
                    let argument = self.parse_any_type()?;
                    if !self
                        .oracle
                        .compare_types(Some("object"), Some(argument.as_str()))
                    {
                        return Err(self.error_here(ParseErrorKind::NotObject(argument)));
                    }
                    self.expect(">")?;
                }
                Ok("string".into())
            }
            "callable-string" => {
                self.phpfig = false;
                self.consume_styled("callable-string");
                Ok("callable-string".into())
            }
            "numeric-string" | "non-empty-string" | "non-falsy-string" | "truthy-string"
            | "literal-string" | "lowercase-string" | "uppercase-string" => {
                self.phpfig = false;
                self.consume_styled(&lower);
                Ok("string".into())
            }
            "array" | "non-empty-array" => {
                if lower != "array" {
                    self.phpfig = false;
                }
                self.consume_styled(&lower);
                self.maybe_array_args()?;
                Ok("array".into())
            }
            "list" | "non-empty-list" => {
                self.phpfig = false;
                self.consume_styled(&lower);
                if self.peek_is(0, "<") {
                    self.next();
                    self.parse_any_type()?;
                    self.expect(">")?;
                }
                Ok("array".into())
            }
            "iterable" => {
                self.consume_styled("iterable");
                self.maybe_iterable_args()?;
                Ok("iterable".into())
            }
            "object" => {
                self.consume_styled("object");
                if self.peek_is(0, "{") {
                    self.phpfig = false;
                    self.next();
                    self.parse_shape_entries()?;
                    self.expect("}")?;
                }
                Ok("object".into())
            }
            "callable" => {
                self.consume_styled("callable");
                self.maybe_callable_signature()?;
                Ok("callable".into())
            }
            "resource" => {
                self.consume_styled("resource");
                Ok("resource".into())
            }
            "mixed" => {
                self.consume_styled("mixed");
                Ok("mixed".into())
            }
            "null" => {
                self.consume_styled("null");
                Ok("null".into())
            }
            "void" => {
                self.consume_styled("void");
                Ok("void".into())
            }
            "never" | "never-return" | "never-returns" | "no-return" => {
                self.consume_styled("never");
                Ok("never".into())
            }
            "array-key" => {
                self.phpfig = false;
                self.consume_styled("array-key");
                Ok("array-key".into())
            }
            "scalar" => {
                self.phpfig = false;
                self.consume_styled("scalar");
                Ok("scalar".into())
            }
            "key-of" | "value-of" => {
                self.phpfig = false;
                self.consume_styled(&lower);
                self.expect("<")?;
                let inner = self.parse_any_type()?;
                if !self
                    .oracle
                    .compare_types(Some("iterable|object"), Some(inner.as_str()))
                {
                    return Err(self.error_here(ParseErrorKind::NotIterable(inner)));
                }
                self.expect(">")?;
                Ok(self.unknown_fallback())
            }
            "self" => {
                self.consume_styled("self");
                Ok(self
                    .scope
                    .classname
                    .clone()
                    .unwrap_or_else(|| "self".into()))
            }
            "parent" => {
                self.phpfig = false;
                self.consume_styled("parent");
                Ok(self
                    .scope
                    .parentname
                    .clone()
                    .unwrap_or_else(|| "parent".into()))
            }
            "static" => {
                self.consume_styled("static");
                Ok(self.static_type())
            }
            "$this" => {
                self.next();
                Ok(self.static_type())
            }
            _ => self.parse_class_type(&text),
        }
    }

    /// The unknowable-type fallback: wide for native annotations, narrow
    /// for doc annotations.
    fn unknown_fallback(&self) -> EcoString {
        let atom = if self.gowide { "mixed" } else { "never" };
        atom.into()
    }

    /// Late static binding resolves against the current class when known.
    fn static_type(&self) -> EcoString {
        match &self.scope.classname {
            Some(classname) => eco_format!("static({classname})"),
            None => "static".into(),
        }
    }

    /// `int<MIN,MAX>` — bounds are integer literals or `min`/`max`.
    fn maybe_int_range(&mut self) -> Attempt<()> {
        if !self.peek_is(0, "<") {
            return Ok(());
        }
        self.phpfig = false;
        self.next();
        self.expect_int_bound("min")?;
        self.expect(",")?;
        self.expect_int_bound("max")?;
        self.expect(">")
    }

    fn expect_int_bound(&mut self, open_end: &str) -> Attempt<()> {
        let Some(text) = self.peek(0) else {
            return Err(self.error_here(ParseErrorKind::UnexpectedEnd));
        };
        if text.eq_ignore_ascii_case(open_end) {
            self.consume_styled(open_end);
            Ok(())
        } else if is_int_literal(&text) {
            self.next();
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::UnexpectedToken(text)))
        }
    }

    /// `int-mask<1, 2, 4>` — a comma list of integer literals.
    fn parse_int_mask(&mut self) -> Attempt<()> {
        self.expect("<")?;
        loop {
            let Some(text) = self.peek(0) else {
                return Err(self.error_here(ParseErrorKind::UnexpectedEnd));
            };
            if !is_int_literal(&text) {
                return Err(self.error_here(ParseErrorKind::UnexpectedToken(text)));
            }
            self.next();
            if self.peek_is(0, ",") {
                self.next();
            } else {
                break;
            }
        }
        self.expect(">")
    }

    /// `array<V>`, `array<K,V>`, or an `array{…}` shape. With two generic
    /// arguments the first must be usable as an array key.
    fn maybe_array_args(&mut self) -> Attempt<()> {
        if self.peek_is(0, "<") {
            self.phpfig = false;
            self.next();
            let first = self.parse_any_type()?;
            if self.peek_is(0, ",") {
                self.next();
                self.parse_any_type()?;
                if !self
                    .oracle
                    .compare_types(Some("array-key"), Some(first.as_str()))
                {
                    return Err(self.error_here(ParseErrorKind::BadArrayKey(first)));
                }
            }
            self.expect(">")?;
        } else if self.peek_is(0, "{") {
            self.phpfig = false;
            self.next();
            self.parse_shape_entries()?;
            self.expect("}")?;
        }
        Ok(())
    }

    /// `iterable<V>` or `iterable<K,V>`; iteration keys are unrestricted.
    fn maybe_iterable_args(&mut self) -> Attempt<()> {
        if !self.peek_is(0, "<") {
            return Ok(());
        }
        self.phpfig = false;
        self.next();
        self.parse_any_type()?;
        if self.peek_is(0, ",") {
            self.next();
            self.parse_any_type()?;
        }
        self.expect(">")
    }

    /// Shape entries: `key: T`, `key?: T`, or bare `T`, comma separated.
    /// Keys may be identifiers, quoted strings, or integers.
    fn parse_shape_entries(&mut self) -> Attempt<()> {
        if self.peek_is(0, "}") {
            return Ok(());
        }
        loop {
            let keyed = self.peek(0).is_some_and(|t| is_shape_key(&t))
                && (self.peek_is(1, ":") || (self.peek_is(1, "?") && self.peek_is(2, ":")));
            if keyed {
                self.next();
                if self.peek_is(0, "?") {
                    self.next();
                }
                self.next();
            }
            self.parse_any_type()?;
            if self.peek_is(0, ",") {
                self.next();
            } else {
                break;
            }
        }
        Ok(())
    }

    /// `callable(PARAMS): RETURN` — parameters may carry `&`, `...`, a
    /// `$name`, and an optionality marker `=`. The signature is validated
    /// and discarded.
    fn maybe_callable_signature(&mut self) -> Attempt<()> {
        if !self.peek_is(0, "(") {
            return Ok(());
        }
        self.phpfig = false;
        self.next();
        if !self.peek_is(0, ")") {
            loop {
                self.parse_any_type()?;
                if self.peek_is(0, "&") {
                    self.next();
                }
                if self.peek_is(0, "...") {
                    self.next();
                }
                if self.peek(0).is_some_and(|t| t.starts_with('$')) {
                    self.next();
                }
                if self.peek_is(0, "=") {
                    self.next();
                }
                if self.peek_is(0, ",") {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect(")")?;
        if self.peek_is(0, ":") {
            self.next();
            // The return type binds tightly; unions need parentheses.
            if self.peek_is(0, "?") {
                self.phpfig = false;
                self.next();
            }
            self.parse_single_type()?;
        }
        Ok(())
    }

    /// A (possibly qualified) class name, with optional generic arguments,
    /// a `\Closure` signature, or a class-constant suffix.
    fn parse_class_type(&mut self, text: &str) -> Attempt<EcoString> {
        let first = text.chars().next().unwrap_or_default();
        let name_like = first.is_ascii_alphabetic() || first == '_' || first == '\\' || !first.is_ascii();
        if !name_like {
            return Err(self.error_here(ParseErrorKind::UnexpectedToken(text.into())));
        }
        self.next();

        let fq = if text.starts_with('\\') {
            EcoString::from(text)
        } else {
            let (seg, rest) = match text.find('\\') {
                Some(at) => (&text[..at], &text[at..]),
                None => (text, ""),
            };
            if let Some(mapped) = self.scope.uses.get(seg) {
                let mut fq = mapped.clone();
                fq.push_str(rest);
                fq
            } else if rest.is_empty() {
                if let Some(bound) = self.scope.templates.get(text) {
                    // A template reference stands for its upper bound.
                    self.phpfig = false;
                    return Ok(bound.clone());
                }
                self.scope.qualify(text)
            } else {
                self.scope.qualify(text)
            }
        };

        if self.peek_is(0, "<") {
            self.phpfig = false;
            self.next();
            loop {
                self.parse_any_type()?;
                if self.peek_is(0, ",") {
                    self.next();
                } else {
                    break;
                }
            }
            self.expect(">")?;
        }

        if fq == "\\Closure" && self.peek_is(0, "(") {
            self.maybe_callable_signature()?;
        }

        if self.peek_is(0, "::") {
            self.phpfig = false;
            self.next();
            let mut any = false;
            if self.peek(0).is_some_and(|t| is_const_name(&t)) {
                self.next();
                any = true;
            }
            // A trailing wildcard, with or without a name before it.
            if self.peek_is(0, "*") {
                self.next();
                any = true;
            }
            if !any {
                return Err(self.error_here(ParseErrorKind::ExpectedConstName));
            }
            return Ok(self.unknown_fallback());
        }

        Ok(fq)
    }
}

/// An integer literal: optional sign, digits and underscores, no dot.
fn is_int_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// A token usable as an array/object shape key.
fn is_shape_key(text: &str) -> bool {
    let first = text.chars().next().unwrap_or_default();
    first.is_ascii_alphanumeric()
        || first == '_'
        || first == '\''
        || first == '"'
        || (first == '-' && text.len() > 1)
}

/// A token usable as a class constant name.
fn is_const_name(text: &str) -> bool {
    let first = text.chars().next().unwrap_or_default();
    first.is_ascii_alphabetic() || first == '_'
}
