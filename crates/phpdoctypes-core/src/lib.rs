// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Core analysis for the PHPDoc type annotation checker.
//!
//! This crate verifies that the type annotations written in documentation
//! comments match the native type annotations on the same declarations,
//! and that they are internally well formed. It contains:
//!
//! - Type-expression lexing, parsing, and normalization (`typelang`)
//! - The built-in and per-file class hierarchy with assignability
//!   (`hierarchy`)
//! - The two-pass declaration walker that pairs doc comments with
//!   declarations and applies the configured checks (`walker`)
//! - The contracts with the hosting sniff framework (`host`, `report`)
//!
//! The host owns tokenization, file I/O, and diagnostics presentation;
//! nothing in this crate touches the filesystem. A file is checked by
//! handing its token stream to [`PhpdocTypesSniff::process_file`]:
//!
//! ```
//! use phpdoctypes_core::fixture::FixtureFile;
//! use phpdoctypes_core::prelude::*;
//!
//! let file = FixtureFile::parse("<?php function f(int $x): void {}");
//! let mut reporter = CollectingReporter::new();
//! PhpdocTypesSniff::new(CheckConfig::minimal()).process_file(&file, &mut reporter);
//! assert!(reporter.violations.is_empty());
//! ```

pub mod config;
pub mod fixture;
pub mod hierarchy;
pub mod host;
pub mod report;
pub mod sniff;
pub mod typelang;
mod walker;

pub use walker::{Comment, TagOccurrence};

/// Re-export of commonly used types.
pub mod prelude {
    pub use crate::config::CheckConfig;
    pub use crate::hierarchy::{Artifact, ArtifactTable, HierarchyOracle};
    pub use crate::host::{HostToken, SourceFile, TokenCode};
    pub use crate::report::{CollectingReporter, Reporter, Severity, Violation};
    pub use crate::sniff::PhpdocTypesSniff;
    pub use crate::typelang::{ParsedType, Scope, ScopeKind, Want};
}
