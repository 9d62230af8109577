//! `::` path rendering and matching.

use patvet_core::PatternError;

/// Converts a syn path to its `::` separated form, without a leading `::`.
#[must_use]
pub fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// A compiled `::` path pattern.
///
/// `*` matches exactly one segment and `**` matches any number of segments,
/// so `std::fs::*` matches `std::fs::read` and `std::**` matches everything
/// under `std`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<String>,
}

impl PathPattern {
    /// Compiles a path pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if any segment is empty.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let pattern = pattern.trim().trim_start_matches("::");
        let segments: Vec<String> = pattern.split("::").map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PatternError::new(format!(
                "invalid path pattern `{pattern}`: empty segment"
            )));
        }
        Ok(Self { segments })
    }

    /// Tests a `::` separated path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path_parts: Vec<&str> = path.split("::").collect();
        let pattern_parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match_parts(&path_parts, &pattern_parts)
    }
}

fn match_parts(path: &[&str], pattern: &[&str]) -> bool {
    let Some((&first, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    match first {
        "**" => (0..=path.len()).any(|i| match_parts(&path[i..], rest)),
        "*" => !path.is_empty() && match_parts(&path[1..], rest),
        literal => path.first() == Some(&literal) && match_parts(&path[1..], rest),
    }
}

/// A flattened `use` path with the span of its leaf.
pub(crate) struct ResolvedUse {
    pub(crate) path: String,
    pub(crate) span: proc_macro2::Span,
}

/// Expands a [`syn::UseTree`] into flat paths.
///
/// `use std::collections::{HashMap, BTreeMap};` yields
/// `std::collections::HashMap` and `std::collections::BTreeMap`.
pub(crate) fn expand_use_tree(tree: &syn::UseTree, prefix: &str) -> Vec<ResolvedUse> {
    let join = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}::{name}")
        }
    };

    match tree {
        syn::UseTree::Path(p) => expand_use_tree(&p.tree, &join(&p.ident.to_string())),
        syn::UseTree::Name(n) => vec![ResolvedUse {
            path: join(&n.ident.to_string()),
            span: n.ident.span(),
        }],
        syn::UseTree::Rename(r) => vec![ResolvedUse {
            path: join(&r.ident.to_string()),
            span: r.ident.span(),
        }],
        syn::UseTree::Glob(g) => vec![ResolvedUse {
            path: join("*"),
            span: g.star_token.spans[0],
        }],
        syn::UseTree::Group(g) => g
            .items
            .iter()
            .flat_map(|item| expand_use_tree(item, prefix))
            .collect(),
    }
}
