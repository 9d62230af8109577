//! Structural node patterns.
//!
//! A pattern is one or more terms separated by `|`. Each term names a node
//! kind and optionally narrows it with an argument:
//!
//! ```text
//! fn(test_*)            functions and methods named test_*
//! method-call(unwrap)   .unwrap() calls
//! macro(println)        println!(...)
//! use(std::fs::**)      imports from std::fs
//! call(**::new)         Foo::new(...), Vec::new(...), ...
//! unsafe                unsafe blocks
//! ```
//!
//! Name arguments are globs; path arguments are `::` patterns where `*` is
//! one segment and `**` is any number of segments.

use std::fmt;

use patvet_core::PatternError;

use crate::paths::PathPattern;

/// Node kinds a term can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Free functions, methods and trait method declarations.
    Fn,
    /// Struct definitions.
    Struct,
    /// Enum definitions.
    Enum,
    /// Trait definitions.
    Trait,
    /// Method call expressions.
    MethodCall,
    /// Call expressions through a path.
    Call,
    /// Macro invocations.
    Macro,
    /// Flattened `use` imports.
    Use,
    /// Unsafe blocks.
    Unsafe,
}

impl NodeKind {
    const ALL: [Self; 9] = [
        Self::Fn,
        Self::Struct,
        Self::Enum,
        Self::Trait,
        Self::MethodCall,
        Self::Call,
        Self::Macro,
        Self::Use,
        Self::Unsafe,
    ];

    /// Keyword used in pattern text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Fn => "fn",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Trait => "trait",
            Self::MethodCall => "method-call",
            Self::Call => "call",
            Self::Macro => "macro",
            Self::Use => "use",
            Self::Unsafe => "unsafe",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    fn argument(self) -> ArgumentKind {
        match self {
            Self::Fn | Self::Struct | Self::Enum | Self::Trait | Self::MethodCall => {
                ArgumentKind::Name
            }
            Self::Call | Self::Macro | Self::Use => ArgumentKind::Path,
            Self::Unsafe => ArgumentKind::None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentKind {
    Name,
    Path,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Argument {
    Any,
    Name(glob::Pattern),
    Path(PathPattern),
}

/// One `kind(argument)` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    kind: NodeKind,
    argument: Argument,
}

impl Term {
    /// The node kind this term selects.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    fn parse(text: &str) -> Result<Self, PatternError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PatternError::new("empty term"));
        }

        let (keyword, raw_argument) = match text.find('(') {
            Some(open) => {
                let Some(inner) = text[open + 1..].strip_suffix(')') else {
                    return Err(PatternError::new(format!("unbalanced parentheses in `{text}`")));
                };
                (text[..open].trim(), Some(inner.trim()))
            }
            None => (text, None),
        };
        if keyword.contains(')') || raw_argument.is_some_and(|a| a.contains(['(', ')'])) {
            return Err(PatternError::new(format!("unbalanced parentheses in `{text}`")));
        }

        let kind = NodeKind::from_keyword(keyword)
            .ok_or_else(|| PatternError::new(format!("unknown node kind `{keyword}`")))?;

        let argument = match (kind.argument(), raw_argument) {
            (_, None) => Argument::Any,
            (_, Some("")) => {
                return Err(PatternError::new(format!("empty argument to `{kind}`")));
            }
            (ArgumentKind::None, Some(_)) => {
                return Err(PatternError::new(format!("`{kind}` takes no argument")));
            }
            (ArgumentKind::Name, Some(glob)) => {
                Argument::Name(glob::Pattern::new(glob).map_err(|e| {
                    PatternError::new(format!("invalid glob `{glob}`: {e}"))
                })?)
            }
            (ArgumentKind::Path, Some(path)) => Argument::Path(PathPattern::new(path)?),
        };

        Ok(Self { kind, argument })
    }

    fn accepts(&self, kind: NodeKind, subject: &str) -> bool {
        if self.kind != kind {
            return false;
        }
        match &self.argument {
            Argument::Any => true,
            Argument::Name(glob) => glob.matches(subject),
            Argument::Path(path) => path.matches(subject),
        }
    }
}

/// A compiled pattern: any matching term selects the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePattern {
    source: String,
    terms: Vec<Term>,
}

impl NodePattern {
    /// Compiles pattern text.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for empty patterns, unknown kinds, unbalanced
    /// parentheses, bad arguments and invalid globs or paths.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        if source.trim().is_empty() {
            return Err(PatternError::new("empty pattern"));
        }
        let terms = source
            .split('|')
            .map(Term::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: source.to_string(),
            terms,
        })
    }

    /// The text this pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compiled terms in source order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Returns `true` if any term selects this kind at all.
    #[must_use]
    pub fn wants(&self, kind: NodeKind) -> bool {
        self.terms.iter().any(|t| t.kind == kind)
    }

    /// Returns `true` if a node of `kind` named or pathed `subject` matches.
    #[must_use]
    pub fn accepts(&self, kind: NodeKind, subject: &str) -> bool {
        self.terms.iter().any(|t| t.accepts(kind, subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> NodePattern {
        NodePattern::parse(source).unwrap()
    }

    fn error(source: &str) -> String {
        NodePattern::parse(source).unwrap_err().to_string()
    }

    #[test]
    fn bare_kind_matches_everything_of_that_kind() {
        let pattern = parse("fn");
        assert!(pattern.accepts(NodeKind::Fn, "anything"));
        assert!(!pattern.accepts(NodeKind::Struct, "anything"));
    }

    #[test]
    fn name_argument_is_a_glob() {
        let pattern = parse("fn(test_*)");
        assert!(pattern.accepts(NodeKind::Fn, "test_parse"));
        assert!(!pattern.accepts(NodeKind::Fn, "parse"));
    }

    #[test]
    fn path_argument_is_segment_aware() {
        let pattern = parse("use(std::fs::*)");
        assert!(pattern.accepts(NodeKind::Use, "std::fs::read"));
        assert!(!pattern.accepts(NodeKind::Use, "std::fs::a::b"));
    }

    #[test]
    fn alternatives_combine() {
        let pattern = parse("method-call(unwrap) | method-call(expect) | macro(panic)");
        assert_eq!(pattern.terms().len(), 3);
        assert!(pattern.accepts(NodeKind::MethodCall, "expect"));
        assert!(pattern.accepts(NodeKind::Macro, "panic"));
        assert!(!pattern.accepts(NodeKind::Macro, "println"));
        assert!(pattern.wants(NodeKind::Macro));
        assert!(!pattern.wants(NodeKind::Fn));
        assert_eq!(pattern.as_str(), "method-call(unwrap) | method-call(expect) | macro(panic)");
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert_eq!(error(""), "empty pattern");
        assert_eq!(error("fn |"), "empty term");
        assert_eq!(error("func"), "unknown node kind `func`");
        assert_eq!(error("fn(main"), "unbalanced parentheses in `fn(main`");
        assert_eq!(error("fn(a(b))"), "unbalanced parentheses in `fn(a(b))`");
        assert_eq!(error("fn()"), "empty argument to `fn`");
        assert_eq!(error("unsafe(x)"), "`unsafe` takes no argument");
        assert!(error("fn([)").starts_with("invalid glob `[`"));
        assert!(error("use(a::::b)").starts_with("invalid path pattern"));
    }
}
