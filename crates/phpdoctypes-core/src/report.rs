// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The bridge to the host framework's diagnostics.
//!
//! Findings never unwind: every error and warning flows through a
//! [`Reporter`], and proposed fixes travel as changesets of token
//! replacements. The host decides whether a fixable warning should
//! actually be fixed; [`Reporter::add_fixable_warning`] returns its
//! answer.

use ecow::EcoString;

/// Severity of a reported violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A definite problem in the documentation.
    Error,
    /// A problem the configured checks consider advisory.
    Warning,
}

/// One reported violation, as collected by [`CollectingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Severity of the finding.
    pub severity: Severity,
    /// Human-readable message.
    pub message: EcoString,
    /// Host token pointer the finding is anchored to.
    pub ptr: usize,
    /// Stable machine-readable code (`phpdoc_fun_param_type_mismatch`, …).
    pub code: EcoString,
    /// `true` when the finding was offered with an automatic fix.
    pub fixable: bool,
}

/// The sole bridge between the checker and the host framework.
pub trait Reporter {
    /// Reports an error.
    fn add_error(&mut self, message: &str, ptr: usize, code: &str);

    /// Reports a warning.
    fn add_warning(&mut self, message: &str, ptr: usize, code: &str);

    /// Reports a fixable warning; returns `true` when the host wants the
    /// fix applied, in which case the caller follows up with a changeset.
    fn add_fixable_warning(&mut self, message: &str, ptr: usize, code: &str) -> bool;

    /// Opens a fix changeset.
    fn begin_changeset(&mut self);

    /// Replaces the content of the token at `ptr` within the open changeset.
    fn replace_token(&mut self, ptr: usize, content: &str);

    /// Commits the open changeset.
    fn end_changeset(&mut self);
}

/// A [`Reporter`] that collects everything in memory.
///
/// Used by tests and by hosts that batch their output. `apply_fixes`
/// controls the answer given to fixable warnings.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    /// Collected violations, in report order.
    pub violations: Vec<Violation>,
    /// Committed token replacements, in commit order.
    pub replacements: Vec<(usize, EcoString)>,
    /// Whether fixable warnings should request their fix.
    pub apply_fixes: bool,
    pending: Vec<(usize, EcoString)>,
}

impl CollectingReporter {
    /// Creates a reporter that declines fixes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reporter that accepts fixes.
    #[must_use]
    pub fn fixing() -> Self {
        Self {
            apply_fixes: true,
            ..Self::default()
        }
    }

    /// The collected codes, for compact assertions.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.code.as_str()).collect()
    }
}

impl Reporter for CollectingReporter {
    fn add_error(&mut self, message: &str, ptr: usize, code: &str) {
        self.violations.push(Violation {
            severity: Severity::Error,
            message: message.into(),
            ptr,
            code: code.into(),
            fixable: false,
        });
    }

    fn add_warning(&mut self, message: &str, ptr: usize, code: &str) {
        self.violations.push(Violation {
            severity: Severity::Warning,
            message: message.into(),
            ptr,
            code: code.into(),
            fixable: false,
        });
    }

    fn add_fixable_warning(&mut self, message: &str, ptr: usize, code: &str) -> bool {
        self.violations.push(Violation {
            severity: Severity::Warning,
            message: message.into(),
            ptr,
            code: code.into(),
            fixable: true,
        });
        self.apply_fixes
    }

    fn begin_changeset(&mut self) {
        self.pending.clear();
    }

    fn replace_token(&mut self, ptr: usize, content: &str) {
        self.pending.push((ptr, content.into()));
    }

    fn end_changeset(&mut self) {
        self.replacements.append(&mut self.pending);
    }
}
