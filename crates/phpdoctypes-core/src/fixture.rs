// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Test support: an in-crate stand-in for the host framework.
//!
//! The real sniff runs against a host tokenizer and file API. Tests need
//! realistic token streams without that host, so [`FixtureFile`] tokenizes
//! a small subset of the target language — enough for declarations, doc
//! comments, imports, and type annotations — and implements the
//! [`SourceFile`] lookups over it. It is test scaffolding, not a product
//! tokenizer: expression-level code is passed through as opaque tokens.

use ecow::EcoString;

use crate::host::{
    HostToken, MemberProps, MethodProps, ParamInfo, SourceFile, TokenCode, Visibility,
};

/// A tokenized fixture file.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    tokens: Vec<HostToken>,
}

impl FixtureFile {
    /// Tokenizes fixture source and links scopes, parentheses, and
    /// attribute groups.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut tokens = tokenize(source);
        link(&mut tokens);
        Self { tokens }
    }

    fn non_trivia(&self, range: std::ops::Range<usize>) -> Vec<usize> {
        range
            .filter(|&i| !self.tokens[i].is_trivia())
            .collect()
    }

    /// Builds one parameter from the token pointers of its segment.
    fn param_from_segment(&self, segment: &[usize]) -> Option<ParamInfo> {
        let var_at = segment
            .iter()
            .position(|&i| self.tokens[i].code == TokenCode::Variable)?;
        let name = self.tokens[segment[var_at]].content.clone();

        let mut variable_length = false;
        let mut pass_by_reference = false;
        let mut before = segment[..var_at].iter().rev();
        if let Some(&i) = before.next() {
            if self.tokens[i].content == "..." {
                variable_length = true;
                if let Some(&j) = before.next() {
                    pass_by_reference = self.tokens[j].code == TokenCode::TypeIntersection;
                }
            } else {
                pass_by_reference = self.tokens[i].code == TokenCode::TypeIntersection;
            }
        }

        // Promoted-property modifiers are not part of the type text.
        let content: String = segment
            .iter()
            .filter(|&&i| {
                !matches!(
                    self.tokens[i].code,
                    TokenCode::Public
                        | TokenCode::Protected
                        | TokenCode::Private
                        | TokenCode::Readonly
                )
            })
            .map(|&i| self.tokens[i].content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Some(ParamInfo {
            name,
            content: content.into(),
            pass_by_reference,
            variable_length,
        })
    }

    /// Scans modifiers backward from a declaration token.
    fn visibility_before(&self, ptr: usize) -> (Visibility, bool) {
        let mut visibility = Visibility::Public;
        let mut is_abstract = false;
        let mut i = ptr;
        while i > 0 {
            i -= 1;
            let token = &self.tokens[i];
            if token.is_trivia() {
                continue;
            }
            match token.code {
                TokenCode::Public => visibility = Visibility::Public,
                TokenCode::Protected => visibility = Visibility::Protected,
                TokenCode::Private => visibility = Visibility::Private,
                TokenCode::Abstract => is_abstract = true,
                TokenCode::Static | TokenCode::Final | TokenCode::Readonly | TokenCode::Var => {}
                _ => break,
            }
        }
        (visibility, is_abstract)
    }
}

impl SourceFile for FixtureFile {
    fn tokens(&self) -> &[HostToken] {
        &self.tokens
    }

    fn declaration_name(&self, ptr: usize) -> Option<EcoString> {
        let mut i = ptr + 1;
        while let Some(token) = self.tokens.get(i) {
            match token.code {
                TokenCode::Whitespace | TokenCode::Comment | TokenCode::TypeIntersection => {
                    i += 1;
                }
                TokenCode::Identifier => return Some(token.content.clone()),
                _ => return None,
            }
        }
        None
    }

    fn extended_class_name(&self, ptr: usize) -> Option<EcoString> {
        let end = self.tokens[ptr].scope_opener.unwrap_or(self.tokens.len());
        let mut i = ptr;
        while i < end {
            if self.tokens[i].code == TokenCode::Extends {
                for j in i + 1..end {
                    match self.tokens[j].code {
                        TokenCode::Identifier
                        | TokenCode::NameQualified
                        | TokenCode::NameFullyQualified => {
                            return Some(self.tokens[j].content.clone());
                        }
                        TokenCode::Whitespace | TokenCode::Comment => {}
                        _ => return None,
                    }
                }
                return None;
            }
            i += 1;
        }
        None
    }

    fn implemented_interface_names(&self, ptr: usize) -> Vec<EcoString> {
        let end = self.tokens[ptr].scope_opener.unwrap_or(self.tokens.len());
        let mut names = Vec::new();
        let mut collecting = false;
        for i in ptr..end {
            match self.tokens[i].code {
                TokenCode::Implements => collecting = true,
                TokenCode::Identifier
                | TokenCode::NameQualified
                | TokenCode::NameFullyQualified
                    if collecting =>
                {
                    names.push(self.tokens[i].content.clone());
                }
                _ => {}
            }
        }
        names
    }

    fn method_parameters(&self, ptr: usize) -> Vec<ParamInfo> {
        let (Some(open), Some(close)) = (
            self.tokens[ptr].parenthesis_opener,
            self.tokens[ptr].parenthesis_closer,
        ) else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut depth = 0usize;
        let mut segment_start = open + 1;
        for i in open + 1..=close {
            match self.tokens[i].code {
                TokenCode::OpenParen | TokenCode::OpenBracket | TokenCode::OpenCurly => depth += 1,
                TokenCode::CloseBracket | TokenCode::CloseCurly => {
                    depth = depth.saturating_sub(1);
                }
                TokenCode::CloseParen if i < close => depth = depth.saturating_sub(1),
                TokenCode::Comma if depth == 0 => {
                    let segment = self.non_trivia(segment_start..i);
                    params.extend(self.param_from_segment(&segment));
                    segment_start = i + 1;
                }
                _ => {}
            }
        }
        let segment = self.non_trivia(segment_start..close);
        params.extend(self.param_from_segment(&segment));
        params
    }

    fn method_properties(&self, ptr: usize) -> MethodProps {
        let (visibility, is_abstract) = self.visibility_before(ptr);
        let mut return_type = EcoString::new();

        if let Some(close) = self.tokens[ptr].parenthesis_closer {
            let mut i = close + 1;
            let mut in_type = false;
            while let Some(token) = self.tokens.get(i) {
                if token.is_trivia() {
                    i += 1;
                    continue;
                }
                match token.code {
                    TokenCode::Use if !in_type => {
                        // Skip a closure capture list.
                        let mut j = i + 1;
                        while let Some(t) = self.tokens.get(j) {
                            if t.code == TokenCode::OpenParen {
                                i = t.parenthesis_closer.unwrap_or(j) + 1;
                                break;
                            }
                            j += 1;
                        }
                        if j >= self.tokens.len() {
                            break;
                        }
                    }
                    TokenCode::Colon if !in_type => {
                        in_type = true;
                        i += 1;
                    }
                    TokenCode::OpenCurly | TokenCode::Semicolon => break,
                    TokenCode::Static if in_type => {
                        return_type.push_str("static");
                        i += 1;
                    }
                    _ if in_type => {
                        if token.content == "=>" {
                            break;
                        }
                        return_type.push_str(&token.content);
                        i += 1;
                    }
                    _ => break,
                }
            }
        }

        MethodProps {
            return_type,
            visibility,
            is_abstract,
        }
    }

    fn member_properties(&self, ptr: usize) -> MemberProps {
        let mut type_text = EcoString::new();
        let mut i = ptr;
        let mut modifiers_end = 0;
        while i > 0 {
            i -= 1;
            let token = &self.tokens[i];
            if token.is_trivia() {
                continue;
            }
            match token.code {
                TokenCode::Identifier
                | TokenCode::NameQualified
                | TokenCode::NameFullyQualified
                | TokenCode::Nullable
                | TokenCode::TypeUnion
                | TokenCode::TypeIntersection
                | TokenCode::OpenParen
                | TokenCode::CloseParen => {
                    let mut joined = token.content.clone();
                    joined.push_str(&type_text);
                    type_text = joined;
                }
                _ => {
                    // The modifiers sit before the type.
                    modifiers_end = i + 1;
                    break;
                }
            }
        }
        let (visibility, _) = self.visibility_before(modifiers_end);
        MemberProps {
            type_text,
            visibility,
        }
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

struct Scanner<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn starts_with(&self, text: &str) -> bool {
        self.source[self.pos..].starts_with(text)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'s str {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        &self.source[start..self.pos]
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\\' || !c.is_ascii()
}

fn tokenize(source: &str) -> Vec<HostToken> {
    let mut tokens = Vec::new();
    let mut scanner = Scanner { source, pos: 0 };

    if scanner.starts_with("<?php") {
        scanner.pos += 5;
        tokens.push(HostToken::new(TokenCode::OpenTag, "<?php"));
    }

    while let Some(c) = scanner.peek() {
        if c.is_whitespace() {
            let text = scanner.take_while(char::is_whitespace);
            tokens.push(HostToken::new(TokenCode::Whitespace, text));
        } else if scanner.starts_with("/**") {
            lex_doc_comment(&mut scanner, &mut tokens);
        } else if scanner.starts_with("/*") {
            let start = scanner.pos;
            scanner.pos += 2;
            while scanner.peek().is_some() && !scanner.starts_with("*/") {
                scanner.bump();
            }
            scanner.pos = (scanner.pos + 2).min(source.len());
            tokens.push(HostToken::new(TokenCode::Comment, &source[start..scanner.pos]));
        } else if scanner.starts_with("//") || (c == '#' && scanner.peek_at(1) != Some('[')) {
            let text = scanner.take_while(|c| c != '\n');
            tokens.push(HostToken::new(TokenCode::Comment, text));
        } else if scanner.starts_with("#[") {
            scanner.pos += 2;
            tokens.push(HostToken::new(TokenCode::Attribute, "#["));
        } else if c == '\'' || c == '"' {
            let start = scanner.pos;
            scanner.bump();
            while let Some(inner) = scanner.peek() {
                scanner.bump();
                if inner == '\\' {
                    scanner.bump();
                } else if inner == c {
                    break;
                }
            }
            tokens.push(HostToken::new(
                TokenCode::ConstString,
                &source[start..scanner.pos],
            ));
        } else if c.is_ascii_digit() {
            let text = scanner.take_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
            tokens.push(HostToken::new(TokenCode::Number, text));
        } else if c == '$' {
            let start = scanner.pos;
            scanner.bump();
            scanner.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            tokens.push(HostToken::new(
                TokenCode::Variable,
                &source[start..scanner.pos],
            ));
        } else if c.is_ascii_alphabetic() || c == '_' || c == '\\' || !c.is_ascii() {
            let start = scanner.pos;
            scanner.take_while(is_name_char);
            let mut text = &source[start..scanner.pos];
            // A group use writes `Prefix\{…}`; keep the separator out of
            // the name token. The brace lexes normally on the next round.
            if text.ends_with('\\') && scanner.peek() == Some('{') {
                text = &text[..text.len() - 1];
            }
            tokens.push(classify_name(text, &scanner));
        } else if scanner.starts_with("...") {
            scanner.pos += 3;
            tokens.push(HostToken::new(TokenCode::Other, "..."));
        } else if scanner.starts_with("::") {
            scanner.pos += 2;
            tokens.push(HostToken::new(TokenCode::DoubleColon, "::"));
        } else if scanner.starts_with("===") {
            scanner.pos += 3;
            tokens.push(HostToken::new(TokenCode::Other, "==="));
        } else if scanner.starts_with("==") {
            scanner.pos += 2;
            tokens.push(HostToken::new(TokenCode::Other, "=="));
        } else if scanner.starts_with("=>") {
            scanner.pos += 2;
            tokens.push(HostToken::new(TokenCode::Other, "=>"));
        } else if scanner.starts_with("||") {
            scanner.pos += 2;
            tokens.push(HostToken::new(TokenCode::Other, "||"));
        } else if scanner.starts_with("&&") {
            scanner.pos += 2;
            tokens.push(HostToken::new(TokenCode::Other, "&&"));
        } else {
            scanner.bump();
            let code = match c {
                '=' => TokenCode::Equal,
                ',' => TokenCode::Comma,
                ';' => TokenCode::Semicolon,
                ':' => TokenCode::Colon,
                '?' => TokenCode::Nullable,
                '|' => TokenCode::TypeUnion,
                '&' => TokenCode::TypeIntersection,
                '{' => TokenCode::OpenCurly,
                '}' => TokenCode::CloseCurly,
                '(' => TokenCode::OpenParen,
                ')' => TokenCode::CloseParen,
                '[' => TokenCode::OpenBracket,
                ']' => TokenCode::CloseBracket,
                _ => TokenCode::Other,
            };
            tokens.push(HostToken::new(code, EcoString::from(c)));
        }
    }
    tokens
}

/// Classifies a bare name as keyword or identifier.
fn classify_name(text: &str, scanner: &Scanner<'_>) -> HostToken {
    let lower = text.to_ascii_lowercase();
    let code = match lower.as_str() {
        "namespace" => TokenCode::Namespace,
        "use" => TokenCode::Use,
        "as" => TokenCode::As,
        "class" => TokenCode::Class,
        "interface" => TokenCode::Interface,
        "trait" => TokenCode::Trait,
        "enum" => TokenCode::Enum,
        "extends" => TokenCode::Extends,
        "implements" => TokenCode::Implements,
        "function" => {
            if anonymous_function_follows(scanner) {
                TokenCode::Closure
            } else {
                TokenCode::Function
            }
        }
        "fn" => TokenCode::ArrowFunction,
        "static" => TokenCode::Static,
        "const" => TokenCode::Const,
        "var" => TokenCode::Var,
        "readonly" => TokenCode::Readonly,
        "abstract" => TokenCode::Abstract,
        "final" => TokenCode::Final,
        "public" => TokenCode::Public,
        "protected" => TokenCode::Protected,
        "private" => TokenCode::Private,
        "new" => TokenCode::New,
        _ => {
            if text.starts_with('\\') {
                TokenCode::NameFullyQualified
            } else if text.contains('\\') {
                TokenCode::NameQualified
            } else {
                TokenCode::Identifier
            }
        }
    };
    HostToken::new(code, text)
}

/// After `function`, an opening parenthesis (optionally behind `&`)
/// means an anonymous function.
fn anonymous_function_follows(scanner: &Scanner<'_>) -> bool {
    let mut seen_amp = false;
    for c in scanner.source[scanner.pos..].chars() {
        if c.is_whitespace() {
            continue;
        }
        if c == '&' && !seen_amp {
            seen_amp = true;
            continue;
        }
        return c == '(';
    }
    false
}

/// Splits a `/** … */` comment into the host's doc-comment tokens and
/// records tag pointers and the closer on the opener.
fn lex_doc_comment(scanner: &mut Scanner<'_>, tokens: &mut Vec<HostToken>) {
    let start = scanner.pos;
    scanner.pos += 3;
    while scanner.peek().is_some() && !scanner.starts_with("*/") {
        scanner.bump();
    }
    let inner_end = scanner.pos;
    let terminated = scanner.starts_with("*/");
    if terminated {
        scanner.pos += 2;
    }
    let inner = &scanner.source[start + 3..inner_end];

    let opener_at = tokens.len();
    tokens.push(HostToken::new(TokenCode::DocCommentOpen, "/**"));
    let mut tag_ptrs = Vec::new();

    for (index, line) in inner.split('\n').enumerate() {
        if index > 0 {
            tokens.push(HostToken::new(TokenCode::DocCommentWhitespace, "\n"));
        }
        let mut rest = line;

        let lead = rest.len() - rest.trim_start().len();
        if lead > 0 {
            tokens.push(HostToken::new(TokenCode::DocCommentWhitespace, &rest[..lead]));
            rest = &rest[lead..];
        }
        if let Some(after_star) = rest.strip_prefix('*') {
            tokens.push(HostToken::new(TokenCode::DocCommentStar, "*"));
            rest = after_star;
            let lead = rest.len() - rest.trim_start().len();
            if lead > 0 {
                tokens.push(HostToken::new(
                    TokenCode::DocCommentWhitespace,
                    &rest[..lead],
                ));
                rest = &rest[lead..];
            }
        }
        if rest.starts_with('@') {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '@' || c == '-' || c == '_'))
                .unwrap_or(rest.len());
            tag_ptrs.push(tokens.len());
            tokens.push(HostToken::new(TokenCode::DocCommentTag, &rest[..end]));
            rest = &rest[end..];
            let lead = rest.len() - rest.trim_start().len();
            if lead > 0 {
                tokens.push(HostToken::new(
                    TokenCode::DocCommentWhitespace,
                    &rest[..lead],
                ));
                rest = &rest[lead..];
            }
        }
        let text = rest.trim_end();
        if !text.is_empty() {
            tokens.push(HostToken::new(TokenCode::DocCommentString, text));
        }
    }

    let closer_at = tokens.len();
    if terminated {
        tokens.push(HostToken::new(TokenCode::DocCommentClose, "*/"));
    }
    tokens[opener_at].comment_tags = tag_ptrs;
    tokens[opener_at].comment_closer = terminated.then_some(closer_at);
}

/// Links curly scopes, parentheses, attribute groups, and declaration
/// tokens, the way the host tokenizer's bracket map does.
fn link(tokens: &mut [HostToken]) {
    let mut curlies: Vec<usize> = Vec::new();
    let mut parens: Vec<usize> = Vec::new();
    let mut brackets: Vec<usize> = Vec::new();

    for i in 0..tokens.len() {
        match tokens[i].code {
            TokenCode::OpenCurly => curlies.push(i),
            TokenCode::CloseCurly => {
                if let Some(open) = curlies.pop() {
                    tokens[open].scope_closer = Some(i);
                    tokens[i].scope_opener = Some(open);
                }
            }
            TokenCode::OpenParen => parens.push(i),
            TokenCode::CloseParen => {
                if let Some(open) = parens.pop() {
                    tokens[open].parenthesis_closer = Some(i);
                    tokens[i].parenthesis_opener = Some(open);
                }
            }
            TokenCode::Attribute | TokenCode::OpenBracket => brackets.push(i),
            TokenCode::CloseBracket => {
                if let Some(open) = brackets.pop() {
                    if tokens[open].code == TokenCode::Attribute {
                        tokens[open].attribute_closer = Some(i);
                    }
                }
            }
            _ => {}
        }
    }

    for i in 0..tokens.len() {
        match tokens[i].code {
            TokenCode::Function | TokenCode::Closure | TokenCode::ArrowFunction => {
                let mut j = i + 1;
                while j < tokens.len() {
                    match tokens[j].code {
                        TokenCode::OpenParen => break,
                        TokenCode::OpenCurly | TokenCode::Semicolon => {
                            j = tokens.len();
                        }
                        _ => j += 1,
                    }
                }
                if j >= tokens.len() {
                    continue;
                }
                tokens[i].parenthesis_opener = Some(j);
                tokens[i].parenthesis_closer = tokens[j].parenthesis_closer;
                if tokens[i].code == TokenCode::ArrowFunction {
                    continue;
                }
                let Some(close) = tokens[j].parenthesis_closer else {
                    continue;
                };
                let mut k = close + 1;
                while k < tokens.len() {
                    match tokens[k].code {
                        TokenCode::OpenCurly => {
                            tokens[i].scope_opener = Some(k);
                            tokens[i].scope_closer = tokens[k].scope_closer;
                            break;
                        }
                        TokenCode::Semicolon => break,
                        TokenCode::OpenParen => {
                            k = tokens[k].parenthesis_closer.unwrap_or(k) + 1;
                        }
                        _ => k += 1,
                    }
                }
            }
            TokenCode::Class | TokenCode::Interface | TokenCode::Trait | TokenCode::Enum => {
                let mut j = i + 1;
                while j < tokens.len() {
                    match tokens[j].code {
                        TokenCode::OpenCurly => {
                            tokens[i].scope_opener = Some(j);
                            tokens[i].scope_closer = tokens[j].scope_closer;
                            break;
                        }
                        TokenCode::Semicolon => break,
                        _ => j += 1,
                    }
                }
            }
            _ => {}
        }
    }
}
