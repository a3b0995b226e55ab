// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The sniff: configuration plus the per-file entry point.
//!
//! One [`PhpdocTypesSniff`] may be shared across files and threads — it
//! holds only the immutable [`CheckConfig`]. All per-file state lives in
//! the walker created inside [`PhpdocTypesSniff::process_file`].

use crate::config::CheckConfig;
use crate::host::SourceFile;
use crate::report::Reporter;
use crate::walker::Walker;

/// Verifies that documentation-comment type annotations match native
/// annotations and are internally well formed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpdocTypesSniff {
    config: CheckConfig,
}

impl PhpdocTypesSniff {
    /// Creates a sniff with the given check configuration.
    #[must_use]
    pub const fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Creates a sniff with every check enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self::new(CheckConfig::strict())
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Runs both walker passes over one tokenized file, reporting every
    /// finding through `reporter`.
    pub fn process_file(&self, file: &dyn SourceFile, reporter: &mut dyn Reporter) {
        let mut walker = Walker::new(file, self.config, reporter);
        walker.process();
    }
}
