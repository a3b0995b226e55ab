// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Assignability between canonical types.
//!
//! A canonical type is a union of intersections in disjunctive normal
//! form. `narrow` is assignable to `wide` when every intersection of
//! `narrow`, once expanded with the supertypes of each of its components,
//! covers at least one intersection of `wide` as a component subset.

use std::collections::HashSet;

use ecow::EcoString;

use super::HierarchyOracle;

impl HierarchyOracle<'_> {
    /// Decides whether every value of `narrow` is a value of `wide`.
    ///
    /// A missing `narrow` (a failed parse) is never assignable; a missing
    /// `wide` accepts anything, as do `mixed` on the wide side and `never`
    /// on the narrow side.
    #[must_use]
    pub fn compare_types(&self, wide: Option<&str>, narrow: Option<&str>) -> bool {
        let Some(narrow) = narrow else {
            return false;
        };
        let Some(wide) = wide else {
            return true;
        };
        if wide == "mixed" || narrow == "never" {
            return true;
        }

        narrow.split('|').all(|narrow_intersection| {
            let mut expanded: HashSet<EcoString> = HashSet::new();
            for component in narrow_intersection.split('&') {
                expanded.insert(component.into());
                expanded.extend(self.super_types(component));
            }
            wide.split('|').any(|wide_intersection| {
                wide_intersection
                    .split('&')
                    .all(|component| expanded.contains(component))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::hierarchy::{Artifact, ArtifactTable, HierarchyOracle};

    fn oracle_tests(table: &ArtifactTable) -> HierarchyOracle<'_> {
        HierarchyOracle::new(table)
    }

    #[test]
    fn reflexive_for_canonical_types() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        for ty in ["int", "bool|int", "\\Iterator&\\Countable", "never", "mixed"] {
            assert!(oracle.compare_types(Some(ty), Some(ty)), "{ty}");
        }
    }

    #[test]
    fn null_narrow_is_undefined() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(!oracle.compare_types(Some("mixed"), None));
        assert!(!oracle.compare_types(None, None));
    }

    #[test]
    fn null_wide_and_mixed_accept_anything() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(None, Some("int")));
        assert!(oracle.compare_types(Some("mixed"), Some("int")));
        assert!(oracle.compare_types(Some("mixed"), Some("\\Foo")));
    }

    #[test]
    fn never_is_assignable_everywhere() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(Some("int"), Some("never")));
        assert!(oracle.compare_types(Some("\\Foo"), Some("never")));
    }

    #[test]
    fn primitive_widening() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(Some("array-key"), Some("int")));
        assert!(oracle.compare_types(Some("scalar"), Some("int")));
        assert!(oracle.compare_types(Some("scalar"), Some("bool")));
        assert!(oracle.compare_types(Some("iterable"), Some("array")));
        assert!(!oracle.compare_types(Some("int"), Some("array-key")));
        assert!(!oracle.compare_types(Some("int"), Some("string")));
    }

    #[test]
    fn union_narrow_requires_every_branch() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(Some("array-key"), Some("int|string")));
        assert!(!oracle.compare_types(Some("int"), Some("int|string")));
        assert!(oracle.compare_types(Some("bool|int|string"), Some("int|string")));
    }

    #[test]
    fn intersection_narrow_expands_all_components() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        // \Iterator&\Countable provides both interfaces.
        assert!(oracle.compare_types(Some("\\Iterator"), Some("\\Iterator&\\Countable")));
        assert!(oracle.compare_types(Some("\\Countable"), Some("\\Iterator&\\Countable")));
        assert!(oracle.compare_types(Some("\\Traversable"), Some("\\Iterator&\\Countable")));
        // The wide intersection must be fully covered.
        assert!(!oracle.compare_types(Some("\\Iterator&\\Countable"), Some("\\Iterator")));
    }

    #[test]
    fn library_class_assignability() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(Some("\\Iterator"), Some("\\ArrayIterator")));
        assert!(oracle.compare_types(Some("\\Traversable"), Some("\\Generator")));
        assert!(oracle.compare_types(Some("\\Throwable"), Some("\\RuntimeException")));
        assert!(oracle.compare_types(Some("object"), Some("\\ArrayIterator")));
        assert!(!oracle.compare_types(Some("\\ArrayIterator"), Some("\\Iterator")));
    }

    #[test]
    fn artifact_class_assignability() {
        let mut table = ArtifactTable::new();
        table.insert(
            "\\App\\Collection".into(),
            Artifact {
                extends: None,
                implements: vec!["\\IteratorAggregate".into(), "\\Countable".into()],
            },
        );
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(Some("\\Traversable"), Some("\\App\\Collection")));
        assert!(oracle.compare_types(Some("\\Countable"), Some("\\App\\Collection")));
        assert!(!oracle.compare_types(Some("\\Iterator"), Some("\\App\\Collection")));
    }

    #[test]
    fn late_static_binding_is_instance_of_its_class() {
        let table = ArtifactTable::new();
        let oracle = oracle_tests(&table);
        assert!(oracle.compare_types(Some("\\ArrayIterator"), Some("static(\\ArrayIterator)")));
        assert!(oracle.compare_types(Some("\\Iterator"), Some("static(\\ArrayIterator)")));
        assert!(oracle.compare_types(Some("object"), Some("static(\\ArrayIterator)")));
        assert!(!oracle.compare_types(Some("static(\\ArrayIterator)"), Some("\\ArrayIterator")));
    }
}
