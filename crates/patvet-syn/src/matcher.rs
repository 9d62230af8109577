//! Evaluation of [`NodePattern`]s over parsed units.

use patvet_core::{Bindings, MatchError, PatternCompiler, PatternError, PatternMatcher, Position};
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{
    Expr, ExprCall, ExprMethodCall, ExprUnsafe, ImplItemFn, ItemEnum, ItemFn, ItemStruct,
    ItemTrait, ItemUse, Macro, Token, TraitItemFn,
};

use crate::frontend::{ParsedFile, SynUnit};
use crate::paths::{expand_use_tree, path_to_string};
use crate::pattern::{NodeKind, NodePattern};

/// Compiles and evaluates structural patterns against `syn` syntax trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynEngine;

impl SynEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Matches `pattern` against a single parsed file.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] if a matched node carries no line information.
    pub fn find_in_file(
        &self,
        file: &ParsedFile,
        pattern: &NodePattern,
    ) -> Result<Vec<Position>, MatchError> {
        let mut finder = NodeFinder {
            file,
            pattern,
            found: Vec::new(),
            error: None,
        };
        finder.visit_file(&file.ast);
        if let Some(err) = finder.error {
            return Err(err);
        }
        let mut found = finder.found;
        found.sort_by_key(|p| (p.line, p.column));
        Ok(found)
    }
}

impl PatternCompiler for SynEngine {
    type Pattern = NodePattern;

    fn compile(&self, source: &str) -> Result<NodePattern, PatternError> {
        NodePattern::parse(source)
    }
}

impl<'a> PatternMatcher<SynUnit<'a>> for SynEngine {
    fn find(&self, unit: &SynUnit<'a>, pattern: &NodePattern) -> Result<Bindings, MatchError> {
        let mut bindings = Bindings::new();
        for file in unit.files() {
            let found = self.find_in_file(file, pattern)?;
            tracing::trace!(
                file = %file.path.display(),
                pattern = pattern.as_str(),
                matches = found.len(),
                "evaluated"
            );
            bindings.extend(found.into_iter().map(|position| vec![position]));
        }
        Ok(bindings)
    }
}

struct NodeFinder<'a> {
    file: &'a ParsedFile,
    pattern: &'a NodePattern,
    found: Vec<Position>,
    error: Option<MatchError>,
}

impl NodeFinder<'_> {
    fn check(&mut self, kind: NodeKind, subject: &str, span: proc_macro2::Span) {
        if self.error.is_some() || !self.pattern.accepts(kind, subject) {
            return;
        }
        let start = span.start();
        if start.line == 0 {
            self.error = Some(MatchError::new(format!(
                "no location for {kind} `{subject}` in {}",
                self.file.path.display()
            )));
            return;
        }
        self.found
            .push(Position::new(&self.file.path, start.line, start.column + 1));
    }

    /// Searches macro bodies that parse as comma-separated expressions, as in
    /// `println!`, `assert!` and `vec!`. Other bodies stay opaque.
    fn visit_macro_args(&mut self, node: &Macro) {
        let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
        else {
            return;
        };
        for arg in &args {
            self.visit_expr(arg);
        }
    }
}

impl<'ast> Visit<'ast> for NodeFinder<'_> {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let name = node.sig.ident.to_string();
        self.check(NodeKind::Fn, &name, node.sig.ident.span());
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        let name = node.sig.ident.to_string();
        self.check(NodeKind::Fn, &name, node.sig.ident.span());
        syn::visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast TraitItemFn) {
        let name = node.sig.ident.to_string();
        self.check(NodeKind::Fn, &name, node.sig.ident.span());
        syn::visit::visit_trait_item_fn(self, node);
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        self.check(NodeKind::Struct, &node.ident.to_string(), node.ident.span());
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast ItemEnum) {
        self.check(NodeKind::Enum, &node.ident.to_string(), node.ident.span());
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_trait(&mut self, node: &'ast ItemTrait) {
        self.check(NodeKind::Trait, &node.ident.to_string(), node.ident.span());
        syn::visit::visit_item_trait(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        self.check(
            NodeKind::MethodCall,
            &node.method.to_string(),
            node.method.span(),
        );
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        if self.pattern.wants(NodeKind::Call) {
            if let Expr::Path(func) = node.func.as_ref() {
                if let Some(first) = func.path.segments.first() {
                    let path = path_to_string(&func.path);
                    self.check(NodeKind::Call, &path, first.ident.span());
                }
            }
        }
        syn::visit::visit_expr_call(self, node);
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        if let Some(first) = node.path.segments.first() {
            let path = path_to_string(&node.path);
            self.check(NodeKind::Macro, &path, first.ident.span());
        }
        syn::visit::visit_macro(self, node);
        self.visit_macro_args(node);
    }

    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        if self.pattern.wants(NodeKind::Use) {
            for resolved in expand_use_tree(&node.tree, "") {
                self.check(NodeKind::Use, &resolved.path, resolved.span);
            }
        }
        syn::visit::visit_item_use(self, node);
    }

    fn visit_expr_unsafe(&mut self, node: &'ast ExprUnsafe) {
        self.check(NodeKind::Unsafe, "", node.unsafe_token.span);
        syn::visit::visit_expr_unsafe(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(source: &str) -> ParsedFile {
        ParsedFile {
            path: PathBuf::from("/p/lib.rs"),
            ast: syn::parse_file(source).unwrap(),
        }
    }

    fn lines(source: &str, pattern: &str) -> Vec<(usize, usize)> {
        let pattern = SynEngine.compile(pattern).unwrap();
        SynEngine
            .find_in_file(&file(source), &pattern)
            .unwrap()
            .into_iter()
            .map(|p| (p.line, p.column))
            .collect()
    }

    const SOURCE: &str = r#"use std::fs::{read, write};
use std::collections::HashMap;

struct Config;

enum Mode { A }

trait Load {
    fn load(&self);
}

impl Load for Config {
    fn load(&self) {
        let v = read("x").unwrap();
        let m: HashMap<u8, u8> = HashMap::new();
        println!("{v:?} {m:?}");
    }
}

fn test_helper() {
    let x = Some(1).expect("one");
    unsafe { core::hint::unreachable_unchecked() }
}
"#;

    #[test]
    fn test_fn_matches_free_fns_methods_and_trait_decls() {
        assert_eq!(lines(SOURCE, "fn"), vec![(9, 8), (13, 8), (20, 4)]);
        assert_eq!(lines(SOURCE, "fn(test_*)"), vec![(20, 4)]);
    }

    #[test]
    fn test_type_definitions() {
        assert_eq!(lines(SOURCE, "struct"), vec![(4, 8)]);
        assert_eq!(lines(SOURCE, "enum(Mode)"), vec![(6, 6)]);
        assert_eq!(lines(SOURCE, "trait(L*)"), vec![(8, 7)]);
    }

    #[test]
    fn test_method_calls() {
        assert_eq!(
            lines(SOURCE, "method-call(unwrap) | method-call(expect)"),
            vec![(14, 27), (21, 21)]
        );
    }

    #[test]
    fn test_calls_and_macros_by_path() {
        assert_eq!(lines(SOURCE, "call(**::new)"), vec![(15, 34)]);
        assert_eq!(lines(SOURCE, "call(read)"), vec![(14, 17)]);
        assert_eq!(lines(SOURCE, "macro(println)"), vec![(16, 9)]);
    }

    #[test]
    fn test_use_imports_are_flattened() {
        assert_eq!(lines(SOURCE, "use(std::fs::*)"), vec![(1, 15), (1, 21)]);
        assert_eq!(lines(SOURCE, "use(std::**)").len(), 3);
    }

    #[test]
    fn test_unsafe_blocks() {
        assert_eq!(lines(SOURCE, "unsafe"), vec![(22, 5)]);
    }

    #[test]
    fn test_macro_arguments_are_searched() {
        let source = r#"fn run(a: Option<u8>, b: Option<u8>) {
    println!("{}", a.unwrap());
    assert!(b.unwrap() > 0, "b was {}", b.unwrap());
    let v = vec![format!("{}", a.unwrap())];
    macro_rules! noop { ($x:expr) => { $x.unwrap() }; }
}
"#;
        assert_eq!(
            lines(source, "method-call(unwrap)"),
            vec![(2, 22), (3, 15), (3, 43), (4, 34)]
        );
        assert_eq!(lines(source, "macro(format)"), vec![(4, 18)]);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(lines(SOURCE, "struct(Missing)").is_empty());
    }
}
