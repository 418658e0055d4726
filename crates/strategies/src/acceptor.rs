//! Strategy acceptors
//!
//! An acceptor decides whether a strategy is responsible for an object.
//! Acceptors are consulted by the store for every object presented, so they
//! must be fast, side-effect free and idempotent.

use std::fmt;
use tessera_core::Marshallable;
use thiserror::Error;

/// Predicate deciding whether a strategy handles an object.
pub trait StrategyAcceptor: Send + Sync + fmt::Debug {
    /// True if the owning strategy should marshal `object`.
    fn accept(&self, object: &dyn Marshallable) -> bool;
}

/// Accepts every object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl StrategyAcceptor for AcceptAll {
    fn accept(&self, _object: &dyn Marshallable) -> bool {
        true
    }
}

/// Adapts a closure into an acceptor.
pub struct FnAcceptor<F> {
    label: &'static str,
    predicate: F,
}

impl<F> FnAcceptor<F>
where
    F: Fn(&dyn Marshallable) -> bool + Send + Sync,
{
    /// Wrap `predicate`; `label` shows up in debug output.
    pub fn new(label: &'static str, predicate: F) -> Self {
        FnAcceptor { label, predicate }
    }
}

impl<F> StrategyAcceptor for FnAcceptor<F>
where
    F: Fn(&dyn Marshallable) -> bool + Send + Sync,
{
    fn accept(&self, object: &dyn Marshallable) -> bool {
        (self.predicate)(object)
    }
}

impl<F> fmt::Debug for FnAcceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAcceptor")
            .field("label", &self.label)
            .finish()
    }
}

/// Invalid type pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid type pattern '{pattern}': {reason}")]
pub struct PatternError {
    /// The rejected pattern
    pub pattern: String,
    /// Why it was rejected
    pub reason: &'static str,
}

/// One type-name pattern.
///
/// - `*` matches every type
/// - `app::facts::*` matches every type whose path starts with `app::facts::`
/// - anything else matches that exact type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypePattern {
    /// Matches every type
    Any,
    /// Matches type names starting with the prefix (which ends in `::`)
    Prefix(String),
    /// Matches one type name
    Exact(String),
}

impl TypePattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let invalid = |reason| PatternError {
            pattern: pattern.to_string(),
            reason,
        };

        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if trimmed == "*" {
            return Ok(TypePattern::Any);
        }
        match trimmed.strip_suffix('*') {
            Some(prefix) if prefix.contains('*') => Err(invalid("only a trailing '*' is supported")),
            Some(prefix) if prefix.ends_with("::") => Ok(TypePattern::Prefix(prefix.to_string())),
            Some(_) => Err(invalid("wildcard must follow '::'")),
            None if trimmed.contains('*') => Err(invalid("only a trailing '*' is supported")),
            None => Ok(TypePattern::Exact(trimmed.to_string())),
        }
    }

    /// True if `type_name` matches.
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            TypePattern::Any => true,
            TypePattern::Prefix(prefix) => type_name.starts_with(prefix.as_str()),
            TypePattern::Exact(name) => type_name == name,
        }
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypePattern::Any => f.write_str("*"),
            TypePattern::Prefix(prefix) => write!(f, "{prefix}*"),
            TypePattern::Exact(name) => f.write_str(name),
        }
    }
}

/// Accepts objects whose type name matches any of a set of patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePatternAcceptor {
    patterns: Vec<TypePattern>,
}

impl TypePatternAcceptor {
    /// Build from pattern strings. An empty list accepts everything.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = patterns
            .into_iter()
            .map(|p| TypePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            parsed.push(TypePattern::Any);
        }
        Ok(TypePatternAcceptor { patterns: parsed })
    }

    /// Accept exactly the type `T`.
    pub fn for_type<T: ?Sized>() -> Self {
        TypePatternAcceptor {
            patterns: vec![TypePattern::Exact(std::any::type_name::<T>().to_string())],
        }
    }

    /// The parsed patterns.
    pub fn patterns(&self) -> &[TypePattern] {
        &self.patterns
    }
}

impl StrategyAcceptor for TypePatternAcceptor {
    fn accept(&self, object: &dyn Marshallable) -> bool {
        let type_name = object.type_name();
        self.patterns.iter().any(|p| p.matches(type_name))
    }
}
