// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Check configuration.
//!
//! Which checks run is decided at construction of the sniff. The default
//! preset keeps the high-signal correctness checks; the strict preset
//! turns everything on. `debug_mode` changes error handling only: walker
//! failures are rethrown instead of swallowed.

/// Boolean switches for each check family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckConfig {
    /// Rethrow walker failures instead of recovering past them.
    pub debug_mode: bool,
    /// Warn about declarations that need a doc block and have none.
    pub check_has_doc_blocks: bool,
    /// Warn about doc blocks missing `@param`/`@return`/`@var` tags.
    pub check_has_tags: bool,
    /// Flag misplaced, duplicate, out-of-order, and repeated tags.
    pub check_no_misplaced: bool,
    /// Compare documented types against native annotations.
    pub check_type_match: bool,
    /// Offer style fixes for non-canonical type spellings.
    pub check_style: bool,
    /// Warn about constructs outside the published standard.
    pub check_php_fig: bool,
    /// Compare documented `&`/`...` markers against the declaration.
    pub check_pass_splat: bool,
}

impl CheckConfig {
    /// Everything on (except debug mode).
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            debug_mode: false,
            check_has_doc_blocks: true,
            check_has_tags: true,
            check_no_misplaced: true,
            check_type_match: true,
            check_style: true,
            check_php_fig: true,
            check_pass_splat: true,
        }
    }

    /// The correctness-only preset.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            debug_mode: false,
            check_has_doc_blocks: false,
            check_has_tags: false,
            check_no_misplaced: true,
            check_type_match: true,
            check_style: false,
            check_php_fig: false,
            check_pass_splat: true,
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self::minimal()
    }
}
