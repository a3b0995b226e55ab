// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The declaration walker.
//!
//! Two passes over the host tokenizer's output drive the whole check:
//!
//! 1. **Collect** — classish declarations are recorded as [`Artifact`]s,
//!    with `extends`/`implements` names fully qualified against the
//!    imports in force at the declaration.
//! 2. **Check** — the file is walked again with the artifact table
//!    complete. A scope stack is maintained by clone-and-descend on
//!    namespaces, classish bodies, and function bodies; each doc comment
//!    is held as the single pending comment until the next declaration
//!    claims it, and the configured checks run over the pairing.
//!
//! A pending comment that no declaration claims before its scope ends is
//! an orphan: only its `@var` tags are validated, syntactically. This is
//! enforced on every scope exit and at end of file.
//!
//! Outside debug mode any failure inside a declaration handler is
//! swallowed: the walker logs it, advances past the offending token, and
//! resumes. In debug mode the failure terminates the pass and surfaces as
//! a single file-level error.

mod checks;
mod comment;

pub use comment::{Comment, TagOccurrence};

use ecow::EcoString;
use thiserror::Error;

use crate::config::CheckConfig;
use crate::hierarchy::{Artifact, ArtifactTable, HierarchyOracle};
use crate::host::{HostToken, SourceFile, TokenCode};
use crate::report::Reporter;
use crate::typelang::{ParsedType, Scope, ScopeKind, Want, parse_type_and_name};

/// A structural failure while walking: malformed host tokens or an
/// unexpected construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub(crate) struct WalkError {
    message: EcoString,
    ptr: usize,
}

impl WalkError {
    fn new(message: impl Into<EcoString>, ptr: usize) -> Self {
        Self {
            message: message.into(),
            ptr,
        }
    }
}

type WalkResult<T> = Result<T, WalkError>;

/// Which traversal is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Collect,
    Check,
}

/// What kind of function-like declaration is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    Named,
    Closure,
    Arrow,
}

/// The walker's state for one file.
pub(crate) struct Walker<'a> {
    file: &'a dyn SourceFile,
    tokens: &'a [HostToken],
    config: CheckConfig,
    reporter: &'a mut dyn Reporter,
    artifacts: ArtifactTable,
    scopes: Vec<Scope>,
    pending: Option<usize>,
    ptr: usize,
    pass: Pass,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        file: &'a dyn SourceFile,
        config: CheckConfig,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            file,
            tokens: file.tokens(),
            config,
            reporter,
            artifacts: ArtifactTable::new(),
            scopes: vec![Scope::root()],
            pending: None,
            ptr: 0,
            pass: Pass::Collect,
        }
    }

    /// Runs both passes, converting a debug-mode escape into the single
    /// file-level error.
    pub(crate) fn process(&mut self) {
        let outcome = self
            .run(Pass::Collect)
            .and_then(|()| self.run(Pass::Check));
        if let Err(error) = outcome {
            self.reporter.add_error(
                "PHPDoc type sniff failed to parse the file",
                error.ptr,
                "phpdoc_walk_failed",
            );
        }
    }

    fn run(&mut self, pass: Pass) -> WalkResult<()> {
        self.pass = pass;
        self.ptr = 0;
        self.pending = None;
        self.scopes = vec![Scope::root()];

        while self.ptr < self.tokens.len() {
            self.close_finished_scopes();
            let ptr = self.ptr;
            if let Err(error) = self.dispatch(ptr) {
                if self.config.debug_mode {
                    return Err(error);
                }
                tracing::debug!(ptr = error.ptr, message = %error.message, "recovered");
                self.ptr = ptr;
            }
            if self.ptr <= ptr {
                self.ptr = ptr + 1;
            }
        }
        self.flush_pending();
        Ok(())
    }

    fn dispatch(&mut self, ptr: usize) -> WalkResult<()> {
        match self.tokens[ptr].code {
            TokenCode::DocCommentOpen => {
                // A comment still pending is an orphan.
                self.flush_pending();
                self.pending = Some(ptr);
                let closer = self.tokens[ptr]
                    .comment_closer
                    .ok_or_else(|| WalkError::new("doc comment without closer", ptr))?;
                self.ptr = closer + 1;
                Ok(())
            }
            TokenCode::Attribute => {
                let closer = self.tokens[ptr]
                    .attribute_closer
                    .ok_or_else(|| WalkError::new("attribute without closer", ptr))?;
                self.ptr = closer + 1;
                Ok(())
            }
            TokenCode::Namespace => self.process_namespace(ptr),
            TokenCode::Use => self.process_use(ptr),
            TokenCode::Class | TokenCode::Interface | TokenCode::Trait | TokenCode::Enum => {
                self.process_classish(ptr)
            }
            TokenCode::Function => self.process_function(ptr, FunctionKind::Named),
            TokenCode::Closure => self.process_function(ptr, FunctionKind::Closure),
            TokenCode::ArrowFunction => self.process_function(ptr, FunctionKind::Arrow),
            TokenCode::Const => self.process_constant(ptr),
            TokenCode::Variable => self.process_variable(ptr),
            TokenCode::Static => {
                // `static::` is late static binding, not a modifier; either
                // way nothing declares here.
                if self.peek_code(ptr + 1) == Some(TokenCode::DoubleColon) {
                    self.ptr = ptr + 2;
                } else {
                    self.ptr = ptr + 1;
                }
                Ok(())
            }
            _ => {
                self.ptr = ptr + 1;
                Ok(())
            }
        }
    }

    // ========================================================================
    // Scope and comment bookkeeping
    // ========================================================================

    fn current(&self) -> &Scope {
        self.scopes.last().expect("the root scope is never popped")
    }

    fn current_mut(&mut self) -> &mut Scope {
        self.scopes
            .last_mut()
            .expect("the root scope is never popped")
    }

    fn close_finished_scopes(&mut self) {
        while let Some(closer) = self.current().closer {
            if self.ptr > closer {
                self.flush_pending();
                self.scopes.pop();
            } else {
                break;
            }
        }
    }

    /// Validates and discards an unclaimed pending comment.
    fn flush_pending(&mut self) {
        if let Some(ptr) = self.pending.take() {
            self.process_poss_var_comment(ptr);
        }
    }

    fn take_pending(&mut self) -> Option<Comment> {
        self.pending
            .take()
            .map(|ptr| Comment::fetch(self.tokens, ptr))
    }

    fn peek_code(&self, mut ptr: usize) -> Option<TokenCode> {
        while let Some(token) = self.tokens.get(ptr) {
            if token.is_trivia() {
                ptr += 1;
            } else {
                return Some(token.code);
            }
        }
        None
    }

    fn next_meaningful(&self, mut ptr: usize) -> Option<usize> {
        while let Some(token) = self.tokens.get(ptr) {
            if token.is_trivia() {
                ptr += 1;
            } else {
                return Some(ptr);
            }
        }
        None
    }

    /// Pointer one past the `;` ending the statement at `ptr`.
    fn past_statement(&self, mut ptr: usize) -> usize {
        while let Some(token) = self.tokens.get(ptr) {
            if token.code == TokenCode::Semicolon {
                return ptr + 1;
            }
            ptr += 1;
        }
        self.tokens.len()
    }

    // ========================================================================
    // Type parsing helpers
    // ========================================================================

    pub(crate) fn parse_doc(&self, scope: &Scope, text: &str, want: Want) -> ParsedType {
        let oracle = HierarchyOracle::new(&self.artifacts);
        parse_type_and_name(&oracle, scope, text, want, false)
    }

    pub(crate) fn parse_native(&self, scope: &Scope, text: &str, want: Want) -> ParsedType {
        let oracle = HierarchyOracle::new(&self.artifacts);
        parse_type_and_name(&oracle, scope, text, want, true)
    }

    pub(crate) fn compare(&self, wide: Option<&str>, narrow: Option<&str>) -> bool {
        HierarchyOracle::new(&self.artifacts).compare_types(wide, narrow)
    }

    // ========================================================================
    // Declaration handlers
    // ========================================================================

    /// `namespace Name;` extends the current scope; `namespace Name { … }`
    /// opens a nested one.
    fn process_namespace(&mut self, ptr: usize) -> WalkResult<()> {
        // A comment ahead of the namespace is a file comment.
        self.flush_pending();

        let mut name = EcoString::new();
        let mut p = ptr + 1;
        let terminator = loop {
            let Some(at) = self.next_meaningful(p) else {
                return Err(WalkError::new("unterminated namespace declaration", ptr));
            };
            match self.tokens[at].code {
                TokenCode::Identifier
                | TokenCode::NameQualified
                | TokenCode::NameFullyQualified => {
                    name.push_str(&self.tokens[at].content);
                    p = at + 1;
                }
                TokenCode::Semicolon | TokenCode::OpenCurly => break at,
                _ => {
                    return Err(WalkError::new("unexpected token in namespace name", at));
                }
            }
        };

        let namespace: EcoString = if name.is_empty() {
            EcoString::new()
        } else if name.starts_with('\\') {
            name
        } else {
            let mut fq = EcoString::from("\\");
            fq.push_str(&name);
            fq
        };

        if self.tokens[terminator].code == TokenCode::Semicolon {
            self.current_mut().namespace = namespace;
            self.ptr = terminator + 1;
        } else {
            let closer = self.tokens[terminator]
                .scope_closer
                .ok_or_else(|| WalkError::new("namespace block without closer", terminator))?;
            let mut scope = self.current().nested(ScopeKind::Namespace, Some(closer));
            scope.namespace = namespace;
            self.scopes.push(scope);
            self.ptr = terminator + 1;
        }
        Ok(())
    }

    /// Imports. `use` also appears as a closure capture list and as trait
    /// use inside a classish body; both are skipped.
    fn process_use(&mut self, ptr: usize) -> WalkResult<()> {
        self.flush_pending();

        // Closure capture: `function () use ($x) { … }`.
        if self.peek_code(ptr + 1) == Some(TokenCode::OpenParen) {
            let open = self
                .next_meaningful(ptr + 1)
                .ok_or_else(|| WalkError::new("dangling use", ptr))?;
            let close = self.tokens[open]
                .parenthesis_closer
                .ok_or_else(|| WalkError::new("unclosed capture list", open))?;
            self.ptr = close + 1;
            return Ok(());
        }

        // Trait use inside a classish body, adaptation block included.
        if self.current().kind == ScopeKind::Classish {
            let mut p = ptr + 1;
            while let Some(token) = self.tokens.get(p) {
                match token.code {
                    TokenCode::Semicolon => {
                        self.ptr = p + 1;
                        return Ok(());
                    }
                    TokenCode::OpenCurly => {
                        let closer = token
                            .scope_closer
                            .ok_or_else(|| WalkError::new("unclosed trait adaptation", p))?;
                        self.ptr = closer + 1;
                        return Ok(());
                    }
                    _ => p += 1,
                }
            }
            self.ptr = self.tokens.len();
            return Ok(());
        }

        // `use function …` / `use const …` do not alias types.
        if matches!(
            self.peek_code(ptr + 1),
            Some(TokenCode::Function | TokenCode::Const)
        ) {
            self.ptr = self.past_statement(ptr + 1);
            return Ok(());
        }

        let mut p = ptr + 1;
        loop {
            let (name, after) = self.read_name(p)?;
            let mut at = self
                .next_meaningful(after)
                .ok_or_else(|| WalkError::new("unterminated use statement", ptr))?;

            if self.tokens[at].code == TokenCode::OpenCurly {
                // Group use: `use A\{B, C as D};`
                at = self.process_group_use(&name, at)?;
            } else {
                let mut alias = last_segment(&name);
                if self.tokens[at].code == TokenCode::As {
                    let named = self
                        .next_meaningful(at + 1)
                        .ok_or_else(|| WalkError::new("use alias missing name", at))?;
                    alias = self.tokens[named].content.clone();
                    at = self
                        .next_meaningful(named + 1)
                        .ok_or_else(|| WalkError::new("unterminated use statement", named))?;
                }
                self.insert_use(alias, &name);
            }

            match self.tokens[at].code {
                TokenCode::Comma => p = at + 1,
                TokenCode::Semicolon => {
                    self.ptr = at + 1;
                    return Ok(());
                }
                _ => return Err(WalkError::new("unexpected token in use statement", at)),
            }
        }
    }

    /// The brace section of a group use; returns the pointer after `}`.
    fn process_group_use(&mut self, prefix: &EcoString, open: usize) -> WalkResult<usize> {
        let mut p = open + 1;
        loop {
            let at = self
                .next_meaningful(p)
                .ok_or_else(|| WalkError::new("unterminated group use", open))?;
            if self.tokens[at].code == TokenCode::CloseCurly {
                return self
                    .next_meaningful(at + 1)
                    .ok_or_else(|| WalkError::new("unterminated group use", at));
            }
            if matches!(
                self.tokens[at].code,
                TokenCode::Function | TokenCode::Const
            ) {
                // Skip this entry entirely.
                p = at + 1;
                while let Some(q) = self.next_meaningful(p) {
                    if matches!(
                        self.tokens[q].code,
                        TokenCode::Comma | TokenCode::CloseCurly
                    ) {
                        break;
                    }
                    p = q + 1;
                }
                if let Some(q) = self.next_meaningful(p) {
                    if self.tokens[q].code == TokenCode::Comma {
                        p = q + 1;
                    } else {
                        p = q;
                    }
                }
                continue;
            }
            let (inner, after) = self.read_name(at)?;
            let mut full = prefix.clone();
            full.push('\\');
            full.push_str(&inner);
            let mut alias = last_segment(&inner);
            let mut q = self
                .next_meaningful(after)
                .ok_or_else(|| WalkError::new("unterminated group use", at))?;
            if self.tokens[q].code == TokenCode::As {
                let named = self
                    .next_meaningful(q + 1)
                    .ok_or_else(|| WalkError::new("use alias missing name", q))?;
                alias = self.tokens[named].content.clone();
                q = self
                    .next_meaningful(named + 1)
                    .ok_or_else(|| WalkError::new("unterminated group use", named))?;
            }
            self.insert_use(alias, &full);
            if self.tokens[q].code == TokenCode::Comma {
                p = q + 1;
            } else {
                p = q;
            }
        }
    }

    fn read_name(&self, from: usize) -> WalkResult<(EcoString, usize)> {
        let at = self
            .next_meaningful(from)
            .ok_or_else(|| WalkError::new("expected name", from))?;
        match self.tokens[at].code {
            TokenCode::Identifier | TokenCode::NameQualified | TokenCode::NameFullyQualified => {
                Ok((self.tokens[at].content.clone(), at + 1))
            }
            _ => Err(WalkError::new("expected name", at)),
        }
    }

    fn insert_use(&mut self, alias: EcoString, name: &str) {
        let fq: EcoString = if name.starts_with('\\') {
            name.into()
        } else {
            let mut fq = EcoString::from("\\");
            fq.push_str(name);
            fq
        };
        self.current_mut().uses.insert(alias, fq);
    }

    /// Class, interface, trait, or enum.
    fn process_classish(&mut self, ptr: usize) -> WalkResult<()> {
        let comment = self.take_pending();
        let outer = self.current().clone();

        let name = self.file.declaration_name(ptr);
        let fq = name.map(|n| {
            let mut fq = outer.namespace.clone();
            fq.push('\\');
            fq.push_str(&n);
            fq
        });
        let parent = self
            .file
            .extended_class_name(ptr)
            .map(|n| outer.qualify(&n));
        let interfaces: Vec<EcoString> = self
            .file
            .implemented_interface_names(ptr)
            .iter()
            .map(|n| outer.qualify(n))
            .collect();

        if self.pass == Pass::Collect {
            if let Some(fq) = &fq {
                self.artifacts.insert(
                    fq.clone(),
                    Artifact {
                        extends: parent.clone(),
                        implements: interfaces,
                    },
                );
            }
        }

        let opener = self.tokens[ptr]
            .scope_opener
            .ok_or_else(|| WalkError::new("classish declaration without body", ptr))?;
        let closer = self.tokens[ptr]
            .scope_closer
            .ok_or_else(|| WalkError::new("classish declaration without body", ptr))?;

        let mut inner = outer.nested(ScopeKind::Classish, Some(closer));
        inner.classname = fq;
        inner.parentname = parent;

        if self.pass == Pass::Check {
            match &comment {
                Some(comment) => {
                    self.apply_templates(comment, &mut inner);
                    self.check_classish_comment(comment, &inner);
                }
                None => {
                    if self.config.check_has_doc_blocks
                        && self.classish_has_members(opener, closer)
                    {
                        self.reporter.add_warning(
                            "PHPDoc class is not documented",
                            ptr,
                            "phpdoc_class_doc_missing",
                        );
                    }
                }
            }
        }

        self.scopes.push(inner);
        self.ptr = opener + 1;
        Ok(())
    }

    /// Whether a classish body declares any member at its top level.
    fn classish_has_members(&self, opener: usize, closer: usize) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens[opener + 1..closer.min(self.tokens.len())] {
            match token.code {
                TokenCode::OpenCurly => depth += 1,
                TokenCode::CloseCurly => depth = depth.saturating_sub(1),
                TokenCode::Function | TokenCode::Variable | TokenCode::Const if depth == 0 => {
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Named function, closure, or arrow function.
    fn process_function(&mut self, ptr: usize, kind: FunctionKind) -> WalkResult<()> {
        let comment = self.take_pending();
        let outer = self.current().clone();

        let mut inner = outer.nested(ScopeKind::Function, self.tokens[ptr].scope_closer);
        if self.pass == Pass::Check {
            if let Some(comment) = &comment {
                self.apply_templates(comment, &mut inner);
            }
            self.check_function(ptr, kind, comment.as_ref(), &inner);
        }

        if let Some(opener) = self.tokens[ptr].scope_opener {
            // Descend into the body; nested declarations and `@var`
            // comments are walked in the function scope.
            self.scopes.push(inner);
            self.ptr = opener + 1;
        } else {
            // Abstract method, interface member, or arrow function.
            self.ptr = self.tokens[ptr]
                .parenthesis_closer
                .map_or(ptr + 1, |close| close + 1);
        }
        Ok(())
    }

    /// A class constant or a global constant.
    fn process_constant(&mut self, ptr: usize) -> WalkResult<()> {
        let comment = self.take_pending();
        let scope = self.current().clone();

        // The name is the last identifier before `=`; anything between
        // `const` and the name is the native type.
        let mut native = EcoString::new();
        let mut last_identifier: Option<usize> = None;
        let mut p = ptr + 1;
        loop {
            let Some(at) = self.next_meaningful(p) else {
                return Err(WalkError::new("unterminated constant declaration", ptr));
            };
            match self.tokens[at].code {
                TokenCode::Equal | TokenCode::Semicolon => break,
                TokenCode::Identifier
                | TokenCode::NameQualified
                | TokenCode::NameFullyQualified
                | TokenCode::TypeUnion
                | TokenCode::TypeIntersection
                | TokenCode::Nullable
                | TokenCode::OpenParen
                | TokenCode::CloseParen => {
                    if let Some(previous) = last_identifier.take() {
                        native.push_str(&self.tokens[previous].content);
                    }
                    if matches!(
                        self.tokens[at].code,
                        TokenCode::Identifier
                            | TokenCode::NameQualified
                            | TokenCode::NameFullyQualified
                    ) {
                        last_identifier = Some(at);
                    } else {
                        native.push_str(&self.tokens[at].content);
                    }
                    p = at + 1;
                }
                _ => return Err(WalkError::new("unexpected token in constant", at)),
            }
        }

        if self.pass == Pass::Check {
            self.check_variable(ptr, comment.as_ref(), &scope, &native, true);
        }
        self.ptr = self.past_statement(ptr + 1);
        Ok(())
    }

    /// A `$variable` token: a property when directly inside a classish
    /// body, otherwise an assignment that may carry an `@var` comment.
    fn process_variable(&mut self, ptr: usize) -> WalkResult<()> {
        if self.current().kind == ScopeKind::Classish {
            let comment = self.take_pending();
            let scope = self.current().clone();
            if self.pass == Pass::Check {
                let member = self.file.member_properties(ptr);
                self.check_variable(ptr, comment.as_ref(), &scope, &member.type_text, true);
            }
            self.ptr = self.past_statement(ptr);
            return Ok(());
        }

        if self.pending.is_some() {
            let comment = self.take_pending();
            let scope = self.current().clone();
            if self.pass == Pass::Check {
                // No native annotation to compare against on assignments.
                self.check_variable(ptr, comment.as_ref(), &scope, "", false);
            }
        }
        self.ptr = ptr + 1;
        Ok(())
    }

    /// An orphan comment: only its `@var` tags are validated, and only
    /// syntactically.
    fn process_poss_var_comment(&mut self, comment_ptr: usize) {
        if self.pass != Pass::Check {
            return;
        }
        let comment = Comment::fetch(self.tokens, comment_ptr);
        let scope = self.current().clone();
        for occurrence in comment.occurrences("@var") {
            let parsed = self.parse_doc(&scope, &occurrence.content, Want::TypeAndName);
            if parsed.ty.is_none() && self.config.check_type_match {
                self.reporter.add_error(
                    "PHPDoc variable type missing or malformed",
                    occurrence.ptr,
                    "phpdoc_var_type",
                );
            }
        }
    }
}

/// The last backslash-separated segment of a name.
fn last_segment(name: &str) -> EcoString {
    name.rsplit('\\').next().unwrap_or(name).into()
}
