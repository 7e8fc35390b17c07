//! Tagged expressions
//!
//! Operation configurations describe targets, filters and values as
//! storage-agnostic expressions. Backends rewrite them into their own
//! constructs through the resolver registry, dispatching on the
//! (source kind, target kind) tag pair.

use serde::{Deserialize, Serialize};

use crate::datastore::{DataTarget, QueryFilter};
use crate::property::{Value, ValueKind};

use super::errors::{ExpressionError, ExpressionResult};

/// A storage-agnostic expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expression {
    /// An operation target
    Target(DataTarget),
    /// A predicate restricting the affected rows
    Filter(QueryFilter),
    /// A value to write
    Value(ValueExpression),
    /// A data path
    Path(PathExpression),
}

impl Expression {
    /// The kind tag of this expression
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Target(_) => ExpressionKind::Target,
            Expression::Filter(_) => ExpressionKind::Filter,
            Expression::Value(_) => ExpressionKind::Value,
            Expression::Path(_) => ExpressionKind::Path,
        }
    }

    /// Check structural invariants
    pub fn validate(&self) -> ExpressionResult<()> {
        match self {
            Expression::Target(t) => {
                if t.name().is_empty() {
                    return Err(ExpressionError::invalid("target name must not be empty"));
                }
                Ok(())
            }
            Expression::Filter(f) => f.validate(),
            Expression::Value(_) => Ok(()),
            Expression::Path(p) => {
                if p.path().is_empty() {
                    return Err(ExpressionError::invalid("path must not be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Kind tag for [`Expression`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    Target,
    Filter,
    Value,
    Path,
}

impl std::fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExpressionKind::Target => "target",
            ExpressionKind::Filter => "filter",
            ExpressionKind::Value => "value",
            ExpressionKind::Path => "path",
        };
        f.write_str(name)
    }
}

/// A value to write, distinguishing "set to null" from "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "value_expr", content = "value", rename_all = "snake_case")]
pub enum ValueExpression {
    /// A concrete value
    Constant(Value),
    /// An explicit null of the given kind
    Null(ValueKind),
}

impl ValueExpression {
    /// The kind the expression evaluates to
    pub fn kind(&self) -> ValueKind {
        match self {
            ValueExpression::Constant(v) => v.kind(),
            ValueExpression::Null(k) => *k,
        }
    }

    /// The constant payload, if any
    pub fn constant(&self) -> Option<&Value> {
        match self {
            ValueExpression::Constant(v) => Some(v),
            ValueExpression::Null(_) => None,
        }
    }

    /// Whether this is an explicit null
    pub fn is_null(&self) -> bool {
        matches!(self, ValueExpression::Null(_))
    }
}

/// A dotted data path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathExpression {
    path: String,
}

impl PathExpression {
    /// Create a path expression
    pub fn of(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The dotted path
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        let e = Expression::Target(DataTarget::named("users"));
        assert_eq!(e.kind(), ExpressionKind::Target);

        let e = Expression::Value(ValueExpression::Constant(Value::Int(1)));
        assert_eq!(e.kind(), ExpressionKind::Value);
    }

    #[test]
    fn test_empty_target_is_invalid() {
        let e = Expression::Target(DataTarget::named(""));
        assert!(e.validate().is_err());

        let e = Expression::Target(DataTarget::named("users"));
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_null_expression_keeps_kind() {
        let e = ValueExpression::Null(ValueKind::String);
        assert!(e.is_null());
        assert_eq!(e.kind(), ValueKind::String);
        assert_eq!(e.constant(), None);
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let e = Expression::Path(PathExpression::of(""));
        assert!(e.validate().is_err());
    }
}
