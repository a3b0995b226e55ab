// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the type-expression parser.
//!
//! These use `proptest` to verify normalization invariants over generated
//! inputs:
//!
//! 1. **Parser never panics** — arbitrary payload text always returns
//! 2. **Canonicalization is idempotent** — re-parsing a canonical type
//!    reproduces it
//! 3. **Union commutativity** — member order never changes the canonical
//!    form
//! 4. **Mixed absorbs** — any union containing `mixed` collapses
//! 5. **Never elided** — `never` survives only alone
//! 6. **Fix round-trip** — applying the fixed rendering reparses to the
//!    same canonical type with no further fixes
//! 7. **Comparator reflexivity** — every canonical type is assignable to
//!    itself

use proptest::prelude::*;

use crate::hierarchy::{ArtifactTable, HierarchyOracle};

use super::{ParsedType, Scope, Want, parse_type_and_name};

fn parse(text: &str) -> ParsedType {
    let table = ArtifactTable::new();
    let oracle = HierarchyOracle::new(&table);
    parse_type_and_name(&oracle, &Scope::root(), text, Want::Type, false)
}

/// Atoms whose canonical form does not depend on scope.
const ATOMS: &[&str] = &[
    "int",
    "integer",
    "float",
    "double",
    "bool",
    "boolean",
    "string",
    "array",
    "iterable",
    "object",
    "callable",
    "resource",
    "mixed",
    "never",
    "null",
    "void",
    "array-key",
    "scalar",
    "callable-string",
    "\\Traversable",
    "\\Iterator",
    "\\ArrayIterator",
    "\\Countable",
    "int[]",
    "array<int, string>",
    "class-string",
    "positive-int",
];

/// Atoms that cannot trigger the structural union additions (`array-key`,
/// `scalar`, `iterable`). Those additions run after absorption, so a type
/// that gains one is canonical only up to a further parse; idempotence is
/// exercised on this pool.
const ADDITION_FREE_ATOMS: &[&str] = &[
    "int",
    "integer",
    "float",
    "bool",
    "callable",
    "callable-string",
    "object",
    "iterable",
    "array",
    "null",
    "void",
    "mixed",
    "never",
    "resource",
    "\\Iterator",
    "\\ArrayIterator",
    "\\Countable",
    "int[]",
    "positive-int",
];

fn atom() -> impl Strategy<Value = String> {
    prop::sample::select(ATOMS).prop_map(str::to_owned)
}

fn union(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(atom(), 1..=max)
}

fn addition_free_union(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(ADDITION_FREE_ATOMS).prop_map(str::to_owned),
        1..=max,
    )
}

/// Default is 256 cases; override via `PROPTEST_CASES` for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: the parser never panics on arbitrary input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,120}") {
        let _result = parse(&input);
    }

    /// Property 1b: nor on arbitrary input in name-parsing mode.
    #[test]
    fn name_parser_never_panics(input in "\\PC{0,120}") {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        let _result = parse_type_and_name(
            &oracle,
            &Scope::root(),
            &input,
            Want::TypeNameDefault,
            true,
        );
    }

    /// Property 2: canonicalization is idempotent.
    #[test]
    fn canonicalization_idempotent(members in addition_free_union(4)) {
        let text = members.join("|");
        if let Some(once) = parse(&text).ty {
            let twice = parse(&once).ty;
            prop_assert_eq!(Some(once), twice, "input {}", text);
        }
    }

    /// Property 3: union member order is irrelevant.
    #[test]
    fn union_commutative(mut members in union(4), seed in 0usize..1024) {
        let forward = parse(&members.join("|")).ty;
        // A deterministic shuffle driven by the seed.
        let len = members.len();
        for i in (1..len).rev() {
            let j = seed.wrapping_mul(i.wrapping_add(7)) % (i + 1);
            members.swap(i, j);
        }
        let backward = parse(&members.join("|")).ty;
        prop_assert_eq!(forward, backward);
    }

    /// Property 4: mixed absorbs every union it appears in.
    #[test]
    fn mixed_absorbs(members in union(3)) {
        let text = format!("{}|mixed", members.join("|"));
        let result = parse(&text).ty;
        prop_assert_eq!(result, Some("mixed".into()));
    }

    /// Property 5: never is elided from any non-trivial union.
    #[test]
    fn never_elided(members in union(3)) {
        let text = format!("{}|never", members.join("|"));
        if let Some(ty) = parse(&text).ty {
            if ty != "never" {
                prop_assert!(
                    ty.split('|').all(|m| m != "never"),
                    "never survived in {}", ty
                );
            }
        }
    }

    /// Property 6: the fixed rendering reparses to the same canonical type
    /// and needs no further fixes.
    #[test]
    fn fix_round_trip(members in union(4)) {
        let text = members.join("|");
        let first = parse(&text);
        if let (Some(ty), Some(fixed)) = (first.ty, first.fixed) {
            let second = parse(&fixed);
            prop_assert_eq!(second.ty, Some(ty));
            prop_assert_eq!(second.fixed, None);
        }
    }

    /// Property 7: every canonical type is assignable to itself.
    #[test]
    fn comparator_reflexive(members in union(4)) {
        let table = ArtifactTable::new();
        let oracle = HierarchyOracle::new(&table);
        if let Some(ty) = parse(&members.join("|")).ty {
            prop_assert!(oracle.compare_types(Some(ty.as_str()), Some(ty.as_str())), "{}", ty);
            prop_assert!(oracle.compare_types(Some("mixed"), Some(ty.as_str())));
            prop_assert!(oracle.compare_types(Some(ty.as_str()), Some("never")));
        }
    }
}
