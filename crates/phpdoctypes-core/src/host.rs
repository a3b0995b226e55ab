// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Contracts with the hosting sniff framework.
//!
//! The host owns tokenization, file I/O, and diagnostics; this module
//! defines the shapes the walker consumes. Token codes are symbolic — the
//! host's concrete numeric values never appear here.

use ecow::EcoString;

/// The symbolic code of a host token.
///
/// Only the codes the walker dispatches on are distinguished; everything
/// else arrives as [`TokenCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCode {
    /// The opening script tag.
    OpenTag,
    /// Plain whitespace between tokens.
    Whitespace,
    /// A non-documentation comment.
    Comment,
    /// The opener of a documentation comment (`/**`).
    DocCommentOpen,
    /// A leading `*` inside a documentation comment.
    DocCommentStar,
    /// Whitespace inside a documentation comment.
    DocCommentWhitespace,
    /// A tag inside a documentation comment (`@param`, …).
    DocCommentTag,
    /// Payload text inside a documentation comment.
    DocCommentString,
    /// The closer of a documentation comment (`*/`).
    DocCommentClose,
    /// The `namespace` keyword.
    Namespace,
    /// The `use` keyword (imports, trait use, closure captures).
    Use,
    /// The `as` keyword.
    As,
    /// The `class` keyword.
    Class,
    /// The `interface` keyword.
    Interface,
    /// The `trait` keyword.
    Trait,
    /// The `enum` keyword.
    Enum,
    /// The `extends` keyword.
    Extends,
    /// The `implements` keyword.
    Implements,
    /// The `function` keyword (named functions and closures alike; the
    /// host marks closures distinctly).
    Function,
    /// An anonymous `function (...)` expression.
    Closure,
    /// An arrow function (`fn`).
    ArrowFunction,
    /// The `static` keyword (modifier or late static binding).
    Static,
    /// The `const` keyword.
    Const,
    /// The legacy `var` property modifier.
    Var,
    /// The `readonly` modifier.
    Readonly,
    /// The `abstract` modifier.
    Abstract,
    /// The `final` modifier.
    Final,
    /// The `public` modifier.
    Public,
    /// The `protected` modifier.
    Protected,
    /// The `private` modifier.
    Private,
    /// A `$variable`.
    Variable,
    /// An unqualified identifier.
    Identifier,
    /// A qualified name (`Foo\Bar`).
    NameQualified,
    /// A fully-qualified name (`\Foo\Bar`).
    NameFullyQualified,
    /// A union separator in a native type (`|`).
    TypeUnion,
    /// An intersection separator in a native type (`&`).
    TypeIntersection,
    /// A nullable marker in a native type (`?`).
    Nullable,
    /// `=`.
    Equal,
    /// `,`.
    Comma,
    /// `;`.
    Semicolon,
    /// `:`.
    Colon,
    /// `::`.
    DoubleColon,
    /// `{`.
    OpenCurly,
    /// `}`.
    CloseCurly,
    /// `(`.
    OpenParen,
    /// `)`.
    CloseParen,
    /// `[`.
    OpenBracket,
    /// `]`.
    CloseBracket,
    /// The opener of an attribute group (`#[`).
    Attribute,
    /// The `new` keyword.
    New,
    /// A quoted string literal.
    ConstString,
    /// A numeric literal.
    Number,
    /// Anything the walker does not dispatch on.
    Other,
}

/// One token of the host tokenizer's output.
///
/// The opener/closer fields mirror the host's bracket map: a declaration
/// token points at the token pointers of its body braces and parameter
/// parentheses, a doc-comment opener lists its tag pointers and its
/// closer, an attribute opener knows where the group ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostToken {
    /// The symbolic token code.
    pub code: TokenCode,
    /// The raw token text.
    pub content: EcoString,
    /// Pointer to the `{` opening this declaration's body.
    pub scope_opener: Option<usize>,
    /// Pointer to the `}` closing this declaration's body.
    pub scope_closer: Option<usize>,
    /// Pointer to the `(` of this declaration's parameter list.
    pub parenthesis_opener: Option<usize>,
    /// Pointer to the `)` of this declaration's parameter list.
    pub parenthesis_closer: Option<usize>,
    /// Pointer to the matching `]` of an attribute opener.
    pub attribute_closer: Option<usize>,
    /// For a doc-comment opener: pointers of the tag tokens inside it.
    pub comment_tags: Vec<usize>,
    /// For a doc-comment opener: pointer of the `*/` token.
    pub comment_closer: Option<usize>,
}

impl HostToken {
    /// Creates a bare token with no structural links.
    #[must_use]
    pub fn new(code: TokenCode, content: impl Into<EcoString>) -> Self {
        Self {
            code,
            content: content.into(),
            scope_opener: None,
            scope_closer: None,
            parenthesis_opener: None,
            parenthesis_closer: None,
            attribute_closer: None,
            comment_tags: Vec::new(),
            comment_closer: None,
        }
    }

    /// Returns `true` for tokens that carry no syntax: whitespace and
    /// non-doc comments.
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        matches!(self.code, TokenCode::Whitespace | TokenCode::Comment)
    }
}

/// Visibility of a function or member, as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// `public`, or no modifier.
    #[default]
    Public,
    /// `protected`.
    Protected,
    /// `private`.
    Private,
}

/// One declared parameter, as the host's file API reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamInfo {
    /// The `$name`.
    pub name: EcoString,
    /// The full declaration text: type, markers, name, default.
    pub content: EcoString,
    /// `true` for `&$x`.
    pub pass_by_reference: bool,
    /// `true` for `...$x`.
    pub variable_length: bool,
}

/// Function-level facts from the host's file API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodProps {
    /// The native return type text, empty when unannotated.
    pub return_type: EcoString,
    /// Declared visibility.
    pub visibility: Visibility,
    /// `true` for abstract methods and interface members.
    pub is_abstract: bool,
}

/// Property-level facts from the host's file API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberProps {
    /// The native type text, empty when unannotated.
    pub type_text: EcoString,
    /// Declared visibility.
    pub visibility: Visibility,
}

/// The host's view of one tokenized file.
///
/// The walker never touches the filesystem; everything it knows about the
/// file under analysis comes through this trait.
pub trait SourceFile {
    /// The tokenizer's output, in source order.
    fn tokens(&self) -> &[HostToken];

    /// The declared name at a classish/function declaration pointer.
    fn declaration_name(&self, ptr: usize) -> Option<EcoString>;

    /// The name after `extends` at a classish pointer, as written.
    fn extended_class_name(&self, ptr: usize) -> Option<EcoString>;

    /// The names after `implements` at a classish pointer, as written.
    fn implemented_interface_names(&self, ptr: usize) -> Vec<EcoString>;

    /// The declared parameters of the function at `ptr`.
    fn method_parameters(&self, ptr: usize) -> Vec<ParamInfo>;

    /// Return type and modifiers of the function at `ptr`.
    fn method_properties(&self, ptr: usize) -> MethodProps;

    /// Type and modifiers of the property declared at `ptr` (a variable
    /// token inside a classish body).
    fn member_properties(&self, ptr: usize) -> MemberProps;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_token_has_no_links() {
        let token = HostToken::new(TokenCode::Identifier, "foo");
        assert_eq!(token.code, TokenCode::Identifier);
        assert_eq!(token.content, "foo");
        assert_eq!(token.scope_opener, None);
        assert!(token.comment_tags.is_empty());
    }

    #[test]
    fn trivia_classification() {
        assert!(HostToken::new(TokenCode::Whitespace, " ").is_trivia());
        assert!(HostToken::new(TokenCode::Comment, "// x").is_trivia());
        assert!(!HostToken::new(TokenCode::DocCommentOpen, "/**").is_trivia());
    }
}
