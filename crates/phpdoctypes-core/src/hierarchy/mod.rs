// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Supertype knowledge for canonical types.
//!
//! The [`HierarchyOracle`] answers "what are the supertypes of X?" for the
//! atoms that appear in canonical types: primitive keywords with structural
//! supertypes, the `self`/`parent`/`static`/`static(\X)` forms, and
//! fully-qualified class names. Class names are looked up in the built-in
//! [`library`] table first and then in the per-file [`Artifact`] table the
//! declaration walker collects, walking `extends`/`implements` edges
//! transitively. User-supplied artifacts may be cyclic; the walk carries a
//! visited set and terminates regardless.
//!
//! The oracle is a pure function of two read-only tables and is cheap to
//! construct; assignability between whole canonical types lives in
//! [`compare`].

mod compare;
mod library;

use std::collections::{HashMap, HashSet};

use ecow::EcoString;

/// A classish declaration observed in the walker's first pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifact {
    /// Fully-qualified name of the extended class, if any.
    pub extends: Option<EcoString>,
    /// Fully-qualified names of implemented interfaces.
    pub implements: Vec<EcoString>,
}

/// The classish declarations of one file, keyed by fully-qualified name.
pub type ArtifactTable = HashMap<EcoString, Artifact>;

/// Answers supertype and assignability queries over the built-in library
/// and a file's collected artifacts.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyOracle<'a> {
    artifacts: &'a ArtifactTable,
}

impl<'a> HierarchyOracle<'a> {
    /// Creates an oracle over the given artifact table.
    #[must_use]
    pub fn new(artifacts: &'a ArtifactTable) -> Self {
        Self { artifacts }
    }

    /// Returns the supertypes of a canonical atom, deduplicated and
    /// unsorted. The atom itself is not included.
    #[must_use]
    pub fn super_types(&self, base: &str) -> Vec<EcoString> {
        match base {
            "int" | "string" => vec!["array-key".into(), "scalar".into()],
            "callable-string" => vec![
                "callable".into(),
                "string".into(),
                "array-key".into(),
                "scalar".into(),
            ],
            "float" | "bool" | "array-key" => vec!["scalar".into()],
            "array" => vec!["iterable".into()],
            "self" => vec!["parent".into(), "object".into()],
            "parent" => vec!["object".into()],
            "static" => vec!["self".into(), "parent".into(), "object".into()],
            _ => {
                if let Some(class) = base
                    .strip_prefix("static(")
                    .and_then(|rest| rest.strip_suffix(')'))
                {
                    let mut supers: Vec<EcoString> = vec![
                        "static".into(),
                        "self".into(),
                        "parent".into(),
                        "object".into(),
                        class.into(),
                    ];
                    self.walk_class(class, &mut supers);
                    dedup(supers)
                } else if base.starts_with('\\') {
                    let mut supers: Vec<EcoString> = vec!["object".into()];
                    self.walk_class(base, &mut supers);
                    dedup(supers)
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Walks `extends`/`implements` edges transitively from `class`,
    /// appending every reachable name except `class` itself.
    fn walk_class(&self, class: &str, out: &mut Vec<EcoString>) {
        let mut visited: HashSet<EcoString> = HashSet::new();
        visited.insert(class.into());
        let mut work: Vec<EcoString> = self.direct_supers(class);
        while let Some(name) = work.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            work.extend(self.direct_supers(&name));
            out.push(name);
        }
    }

    /// Direct supertypes of one class name: the library first, then the
    /// file's artifacts.
    fn direct_supers(&self, class: &str) -> Vec<EcoString> {
        if let Some(supers) = library::direct_supers(class) {
            return supers.iter().copied().map(EcoString::from).collect();
        }
        if let Some(artifact) = self.artifacts.get(class) {
            return artifact
                .extends
                .iter()
                .chain(artifact.implements.iter())
                .cloned()
                .collect();
        }
        Vec::new()
    }
}

/// Removes duplicates, keeping first occurrences.
fn dedup(names: Vec<EcoString>) -> Vec<EcoString> {
    let mut seen = HashSet::new();
    names.into_iter().filter(|n| seen.insert(n.clone())).collect()
}
