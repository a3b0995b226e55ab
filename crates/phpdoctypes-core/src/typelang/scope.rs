// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Per-declaration context for name resolution.
//!
//! Every declaration nesting level carries a [`Scope`]: the namespace
//! prefix, the import aliases in force, the template parameters declared by
//! surrounding doc blocks, and the current class identity used to resolve
//! `self`, `parent` and `static`. Nested scopes are created by cloning the
//! enclosing scope and adjusting fields; there is no back-pointer. Within
//! its own declaring level a scope only ever grows: `uses`, `templates`
//! and `namespace` are extended, never rewritten.

use std::collections::HashMap;

use ecow::EcoString;

/// What kind of declaration opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeKind {
    /// The file itself, before any declaration.
    #[default]
    Root,
    /// A `namespace { … }` block.
    Namespace,
    /// A class, interface, trait, or enum body.
    Classish,
    /// A function, closure, or arrow-function body.
    Function,
    /// A parameter list.
    Parameters,
}

/// Name-resolution context for one declaration nesting level.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Fully-qualified namespace prefix: leading separator, never trailing.
    /// Empty for the global namespace.
    pub namespace: EcoString,
    /// Import aliases: local alias → fully-qualified name.
    pub uses: HashMap<EcoString, EcoString>,
    /// Template parameters: name → canonical upper-bound type.
    pub templates: HashMap<EcoString, EcoString>,
    /// Fully-qualified current class, if inside one.
    pub classname: Option<EcoString>,
    /// Fully-qualified parent class, if the current class has one.
    pub parentname: Option<EcoString>,
    /// The declaration kind that opened this scope.
    pub kind: ScopeKind,
    /// Host token pointer at which this scope ends, if bounded.
    pub closer: Option<usize>,
}

impl Scope {
    /// Creates the root scope of a file.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a nested scope by cloning this one.
    ///
    /// The clone starts with the same namespace, imports, templates and
    /// class identity; the caller adjusts what the new level changes.
    #[must_use]
    pub fn nested(&self, kind: ScopeKind, closer: Option<usize>) -> Self {
        let mut scope = self.clone();
        scope.kind = kind;
        scope.closer = closer;
        scope
    }

    /// Fully qualifies a class-like name against this scope.
    ///
    /// A name with a leading separator is already fully qualified. Otherwise
    /// the first segment is looked up among the import aliases, and failing
    /// that the name is prefixed with the namespace. Template names are not
    /// consulted here; the type parser resolves those between the two steps.
    #[must_use]
    pub fn qualify(&self, name: &str) -> EcoString {
        if name.starts_with('\\') {
            return name.into();
        }
        let (first, rest) = match name.find('\\') {
            Some(at) => (&name[..at], &name[at..]),
            None => (name, ""),
        };
        if let Some(mapped) = self.uses.get(first) {
            let mut fq = mapped.clone();
            fq.push_str(rest);
            fq
        } else {
            let mut fq = self.namespace.clone();
            fq.push('\\');
            fq.push_str(name);
            fq
        }
    }
}
