// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Application of the configured checks to one declaration/comment pair.
//!
//! Every check is gated by its [`CheckConfig`](crate::config::CheckConfig)
//! switch and reports through the walker's [`Reporter`] with a stable
//! machine-readable code. Nothing here unwinds: a type that fails to parse
//! is itself a finding, not a failure.

use ecow::EcoString;

use crate::hierarchy::HierarchyOracle;
use crate::host::Visibility;
use crate::typelang::{ParsedType, Scope, ScopeKind, Want, parse_template};

use super::{Comment, FunctionKind, TagOccurrence, Walker};

/// Tags that have no business on a function-like declaration.
const MISPLACED_ON_FUNCTIONS: &[&str] =
    &["@var", "@property", "@property-read", "@property-write"];

/// Tags that have no business on a property, constant, or assignment.
const MISPLACED_ON_VARIABLES: &[&str] = &[
    "@param",
    "@return",
    "@template",
    "@property",
    "@property-read",
    "@property-write",
];

/// The property tags a classish doc block may declare.
const PROPERTY_TAGS: &[&str] = &["@property", "@property-read", "@property-write"];

impl Walker<'_> {
    /// Extends `scope` with the `@template` declarations of a comment.
    pub(crate) fn apply_templates(&mut self, comment: &Comment, scope: &mut Scope) {
        for occurrence in comment.occurrences("@template") {
            let parsed = {
                let oracle = HierarchyOracle::new(&self.artifacts);
                parse_template(&oracle, scope, &occurrence.content)
            };
            match (&parsed.name, &parsed.ty) {
                (Some(name), Some(bound)) => {
                    scope.templates.insert(name.clone(), bound.clone());
                }
                (Some(_), None) => {
                    if self.config.check_type_match {
                        self.reporter.add_error(
                            "PHPDoc template bound missing or malformed",
                            occurrence.ptr,
                            "phpdoc_template_type",
                        );
                    }
                }
                (None, _) => {
                    if self.config.check_no_misplaced {
                        self.reporter.add_error(
                            "PHPDoc template name missing or malformed",
                            occurrence.ptr,
                            "phpdoc_template_name",
                        );
                    }
                }
            }
            self.check_style_and_fig(
                &parsed,
                occurrence,
                "template",
                "phpdoc_template_type_style",
                "phpdoc_template_type_phpfig",
            );
        }
    }

    /// Checks the doc block of a classish declaration.
    pub(crate) fn check_classish_comment(&mut self, comment: &Comment, scope: &Scope) {
        if self.config.check_no_misplaced {
            for tag in ["@param", "@return", "@var"] {
                for occurrence in comment.occurrences(tag) {
                    self.report_misplaced(tag, occurrence.ptr);
                }
            }
        }
        for tag in PROPERTY_TAGS {
            for occurrence in comment.occurrences(tag) {
                let parsed = self.parse_doc(scope, &occurrence.content, Want::TypeAndName);
                if parsed.ty.is_none() && self.config.check_type_match {
                    self.reporter.add_error(
                        "PHPDoc class property type missing or malformed",
                        occurrence.ptr,
                        "phpdoc_class_prop_type",
                    );
                }
                self.check_style_and_fig(
                    &parsed,
                    occurrence,
                    "class property",
                    "phpdoc_class_prop_type_style",
                    "phpdoc_class_prop_type_phpfig",
                );
            }
        }
    }

    /// Checks a function-like declaration against its doc block.
    pub(crate) fn check_function(
        &mut self,
        ptr: usize,
        kind: FunctionKind,
        comment: Option<&Comment>,
        scope: &Scope,
    ) {
        let params = self.file.method_parameters(ptr);
        let props = self.file.method_properties(ptr);
        let param_scope = scope.nested(ScopeKind::Parameters, None);

        let Some(comment) = comment else {
            if self.config.check_has_doc_blocks
                && kind == FunctionKind::Named
                && props.visibility == Visibility::Public
                && (!params.is_empty() || props.return_type != "void")
            {
                self.reporter.add_warning(
                    "PHPDoc function is not documented",
                    ptr,
                    "phpdoc_fun_doc_missing",
                );
            }
            return;
        };

        if self.config.check_no_misplaced {
            for tag in MISPLACED_ON_FUNCTIONS {
                for occurrence in comment.occurrences(tag) {
                    self.report_misplaced(tag, occurrence.ptr);
                }
            }
        }

        if self.config.check_has_tags && kind == FunctionKind::Named {
            if !params.is_empty() && !comment.has("@param") {
                self.reporter.add_warning(
                    "PHPDoc function parameters not documented",
                    ptr,
                    "phpdoc_fun_param_missing",
                );
            }
            if !props.return_type.is_empty()
                && props.return_type != "void"
                && !comment.has("@return")
            {
                self.reporter.add_warning(
                    "PHPDoc function return type not documented",
                    ptr,
                    "phpdoc_fun_ret_missing",
                );
            }
        }

        let doc_params: Vec<(TagOccurrence, ParsedType)> = comment
            .occurrences("@param")
            .iter()
            .map(|occurrence| {
                let parsed =
                    self.parse_doc(&param_scope, &occurrence.content, Want::TypeNamePassSplat);
                (occurrence.clone(), parsed)
            })
            .collect();

        let mut seen: Vec<EcoString> = Vec::new();
        for (occurrence, parsed) in &doc_params {
            if parsed.ty.is_none() && self.config.check_type_match {
                self.reporter.add_error(
                    "PHPDoc function parameter type missing or malformed",
                    occurrence.ptr,
                    "phpdoc_fun_param_type",
                );
            }
            match &parsed.name {
                None => {
                    if self.config.check_no_misplaced {
                        self.reporter.add_error(
                            "PHPDoc function parameter name missing or malformed",
                            occurrence.ptr,
                            "phpdoc_fun_param_name",
                        );
                    }
                }
                Some(name) => {
                    if self.config.check_no_misplaced {
                        if seen.contains(name) {
                            self.reporter.add_error(
                                &format!("PHPDoc function parameter {name} repeated"),
                                occurrence.ptr,
                                "phpdoc_fun_param_duplicate",
                            );
                        } else if !params.iter().any(|p| &p.name == name) {
                            self.reporter.add_error(
                                &format!("PHPDoc function parameter {name} not in declaration"),
                                occurrence.ptr,
                                "phpdoc_fun_param_name",
                            );
                        }
                    }
                    seen.push(name.clone());
                }
            }
            self.check_style_and_fig(
                parsed,
                occurrence,
                "function parameter",
                "phpdoc_fun_param_type_style",
                "phpdoc_fun_param_type_phpfig",
            );
        }

        if self.config.check_no_misplaced {
            self.check_param_order(ptr, &params, &doc_params);
        }

        for param in &params {
            let native = self.parse_native(&param_scope, &param.content, Want::TypeNameDefault);
            let Some((occurrence, doc)) = doc_params
                .iter()
                .find(|(_, doc)| doc.name.as_ref() == Some(&param.name))
            else {
                continue;
            };
            if self.config.check_type_match
                && doc.ty.is_some()
                && !self.compare(native.ty.as_deref(), doc.ty.as_deref())
            {
                self.reporter.add_error(
                    &format!("PHPDoc function parameter {} type mismatch", param.name),
                    occurrence.ptr,
                    "phpdoc_fun_param_type_mismatch",
                );
            }
            if self.config.check_pass_splat {
                let mut native_marks = EcoString::new();
                if param.pass_by_reference {
                    native_marks.push('&');
                }
                if param.variable_length {
                    native_marks.push_str("...");
                }
                if doc.pass_splat != native_marks {
                    self.reporter.add_error(
                        &format!(
                            "PHPDoc function parameter {} pass by reference or splat mismatch",
                            param.name
                        ),
                        occurrence.ptr,
                        "phpdoc_fun_param_pass_splat_mismatch",
                    );
                }
            }
        }

        let returns = comment.occurrences("@return");
        if self.config.check_no_misplaced && returns.len() > 1 {
            for occurrence in &returns[1..] {
                self.reporter.add_error(
                    "PHPDoc multiple function return types",
                    occurrence.ptr,
                    "phpdoc_fun_ret_multiple",
                );
            }
        }
        if let Some(occurrence) = returns.first() {
            let doc = self.parse_doc(scope, &occurrence.content, Want::Type);
            if doc.ty.is_none() {
                if self.config.check_type_match {
                    self.reporter.add_error(
                        "PHPDoc function return type missing or malformed",
                        occurrence.ptr,
                        "phpdoc_fun_ret_type",
                    );
                }
            } else if self.config.check_type_match {
                let native = self.parse_native(scope, &props.return_type, Want::Type);
                if !self.compare(native.ty.as_deref(), doc.ty.as_deref()) {
                    self.reporter.add_error(
                        "PHPDoc function return type mismatch",
                        occurrence.ptr,
                        "phpdoc_fun_ret_type_mismatch",
                    );
                }
            }
            self.check_style_and_fig(
                &doc,
                occurrence,
                "function return",
                "phpdoc_fun_ret_type_style",
                "phpdoc_fun_ret_type_phpfig",
            );
        }
    }

    /// Checks a property, constant, or `@var`-annotated assignment.
    pub(crate) fn check_variable(
        &mut self,
        ptr: usize,
        comment: Option<&Comment>,
        scope: &Scope,
        native_text: &str,
        is_declaration: bool,
    ) {
        let Some(comment) = comment else {
            if self.config.check_has_doc_blocks && is_declaration {
                self.reporter.add_warning(
                    "PHPDoc variable or constant is not documented",
                    ptr,
                    "phpdoc_var_doc_missing",
                );
            }
            return;
        };

        if self.config.check_no_misplaced {
            for tag in MISPLACED_ON_VARIABLES {
                for occurrence in comment.occurrences(tag) {
                    self.report_misplaced(tag, occurrence.ptr);
                }
            }
        }

        let vars = comment.occurrences("@var");
        if vars.is_empty() {
            if self.config.check_has_tags && is_declaration {
                self.reporter.add_warning(
                    "PHPDoc variable missing @var tag",
                    ptr,
                    "phpdoc_var_missing",
                );
            }
            return;
        }

        for occurrence in vars {
            let doc = self.parse_doc(scope, &occurrence.content, Want::TypeAndName);
            if doc.ty.is_none() {
                if self.config.check_type_match {
                    self.reporter.add_error(
                        "PHPDoc variable type missing or malformed",
                        occurrence.ptr,
                        "phpdoc_var_type",
                    );
                }
            } else if self.config.check_type_match && !native_text.trim().is_empty() {
                let native = self.parse_native(scope, native_text, Want::Type);
                if !self.compare(native.ty.as_deref(), doc.ty.as_deref()) {
                    self.reporter.add_error(
                        "PHPDoc variable type mismatch",
                        occurrence.ptr,
                        "phpdoc_var_type_mismatch",
                    );
                }
            }
            self.check_style_and_fig(
                &doc,
                occurrence,
                "variable",
                "phpdoc_var_type_style",
                "phpdoc_var_type_phpfig",
            );
        }
    }

    /// Flags documented parameters that are all present but ordered
    /// differently from the declaration.
    fn check_param_order(
        &mut self,
        ptr: usize,
        params: &[crate::host::ParamInfo],
        doc_params: &[(TagOccurrence, ParsedType)],
    ) {
        let doc_names: Vec<&EcoString> = doc_params
            .iter()
            .filter_map(|(_, parsed)| parsed.name.as_ref())
            .collect();
        let native_names: Vec<&EcoString> = params.iter().map(|p| &p.name).collect();
        if doc_names.len() != native_names.len() {
            return;
        }
        let mut doc_sorted = doc_names.clone();
        let mut native_sorted = native_names.clone();
        doc_sorted.sort();
        native_sorted.sort();
        if doc_sorted == native_sorted && doc_names != native_names {
            self.reporter.add_warning(
                "PHPDoc function parameter order different from declaration",
                ptr,
                "phpdoc_fun_param_order_mismatch",
            );
        }
    }

    fn report_misplaced(&mut self, tag: &str, ptr: usize) {
        self.reporter.add_error(
            &format!("PHPDoc tag {tag} misplaced"),
            ptr,
            "phpdoc_tag_misplaced",
        );
    }

    /// The style (fixable) and standard-conformance warnings shared by
    /// every tag kind.
    fn check_style_and_fig(
        &mut self,
        parsed: &ParsedType,
        occurrence: &TagOccurrence,
        what: &str,
        style_code: &str,
        fig_code: &str,
    ) {
        if self.config.check_style {
            if let Some(fixed) = &parsed.fixed {
                let wants_fix = self.reporter.add_fixable_warning(
                    &format!("PHPDoc {what} type doesn't conform to recommended style"),
                    occurrence.ptr,
                    style_code,
                );
                if wants_fix {
                    self.apply_fix(occurrence, fixed);
                }
            }
        }
        if self.config.check_php_fig && !parsed.phpfig {
            self.reporter.add_warning(
                &format!("PHPDoc {what} type doesn't conform to PHP-FIG PSR-5"),
                occurrence.ptr,
                fig_code,
            );
        }
    }

    /// Replaces the tag payload with its fixed rendering.
    ///
    /// Continuation lines live in separate host tokens, so only fixes
    /// confined to the first payload line are applied; the warning stands
    /// either way.
    fn apply_fix(&mut self, occurrence: &TagOccurrence, fixed: &str) {
        let Some(start) = occurrence.c_start else {
            return;
        };
        let (_, original_rest) = split_first_line(&occurrence.content);
        let (fixed_first, fixed_rest) = split_first_line(fixed);
        if original_rest != fixed_rest {
            return;
        }
        self.reporter.begin_changeset();
        self.reporter.replace_token(start, fixed_first);
        self.reporter.end_changeset();
    }
}

fn split_first_line(text: &str) -> (&str, &str) {
    match text.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (text, ""),
    }
}
