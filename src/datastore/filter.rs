//! Query filters
//!
//! A composable predicate AST over dotted data paths. Evaluation is exact:
//! no type coercion beyond int/float numeric comparison, missing paths never
//! match (except for `IsNull`).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expression::{ExpressionError, ExpressionResult};
use crate::property::Value;

/// Predicate restricting the rows an operation applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum QueryFilter {
    /// Exact equality
    Eq { path: String, value: Value },
    /// Exact inequality; missing paths do not match
    NotEq { path: String, value: Value },
    /// Greater than
    Gt { path: String, value: Value },
    /// Greater than or equal
    Gte { path: String, value: Value },
    /// Less than
    Lt { path: String, value: Value },
    /// Less than or equal
    Lte { path: String, value: Value },
    /// Membership in a non-empty value list
    In { path: String, values: Vec<Value> },
    /// Path has no value
    IsNull { path: String },
    /// Every sub-filter matches
    And(Vec<QueryFilter>),
    /// At least one sub-filter matches
    Or(Vec<QueryFilter>),
    /// Sub-filter does not match
    Not(Box<QueryFilter>),
}

impl QueryFilter {
    /// Equality filter
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Inequality filter
    pub fn neq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEq {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Greater-than filter
    pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Greater-or-equal filter
    pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Less-than filter
    pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Less-or-equal filter
    pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Membership filter
    pub fn in_values(path: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self::In {
            path: path.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Null-check filter
    pub fn is_null(path: impl Into<String>) -> Self {
        Self::IsNull { path: path.into() }
    }

    /// Conjoin this filter with another
    pub fn and(self, other: QueryFilter) -> Self {
        match self {
            QueryFilter::And(mut filters) => {
                filters.push(other);
                QueryFilter::And(filters)
            }
            first => QueryFilter::And(vec![first, other]),
        }
    }

    /// Disjoin this filter with another
    pub fn or(self, other: QueryFilter) -> Self {
        match self {
            QueryFilter::Or(mut filters) => {
                filters.push(other);
                QueryFilter::Or(filters)
            }
            first => QueryFilter::Or(vec![first, other]),
        }
    }

    /// Negate this filter
    pub fn negate(self) -> Self {
        QueryFilter::Not(Box::new(self))
    }

    /// Check structural invariants
    pub fn validate(&self) -> ExpressionResult<()> {
        match self {
            QueryFilter::In { values, .. } => {
                if values.is_empty() {
                    return Err(ExpressionError::invalid("IN filter requires at least one value"));
                }
                Ok(())
            }
            QueryFilter::And(filters) | QueryFilter::Or(filters) => {
                if filters.is_empty() {
                    return Err(ExpressionError::invalid(
                        "composite filter requires at least one sub-filter",
                    ));
                }
                for f in filters {
                    f.validate()?;
                }
                Ok(())
            }
            QueryFilter::Not(inner) => inner.validate(),
            _ => Ok(()),
        }
    }

    /// Evaluate this filter against a row of path-keyed values.
    pub fn matches(&self, row: &BTreeMap<String, Value>) -> bool {
        match self {
            QueryFilter::Eq { path, value } => row.get(path).map(|v| v == value).unwrap_or(false),
            QueryFilter::NotEq { path, value } => row.get(path).map(|v| v != value).unwrap_or(false),
            QueryFilter::Gt { path, value } => compare(row.get(path), value, |o| o == Ordering::Greater),
            QueryFilter::Gte { path, value } => compare(row.get(path), value, |o| o != Ordering::Less),
            QueryFilter::Lt { path, value } => compare(row.get(path), value, |o| o == Ordering::Less),
            QueryFilter::Lte { path, value } => compare(row.get(path), value, |o| o != Ordering::Greater),
            QueryFilter::In { path, values } => row.get(path).map(|v| values.contains(v)).unwrap_or(false),
            QueryFilter::IsNull { path } => !row.contains_key(path),
            QueryFilter::And(filters) => filters.iter().all(|f| f.matches(row)),
            QueryFilter::Or(filters) => filters.iter().any(|f| f.matches(row)),
            QueryFilter::Not(inner) => !inner.matches(row),
        }
    }
}

/// Ordered comparison of an actual row value against a bound.
///
/// Int and float compare numerically with each other; strings and
/// timestamps compare within their own kind. Everything else is unordered
/// and never matches.
fn compare(actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    let actual = match actual {
        Some(v) => v,
        None => return false,
    };
    let ordering = match (actual, bound) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.partial_cmp(b),
        _ => None,
    };
    ordering.map(accept).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_eq_exact_match() {
        let f = QueryFilter::eq("name", "alice");
        assert!(f.matches(&row(&[("name", Value::String("alice".into()))])));
        assert!(!f.matches(&row(&[("name", Value::String("bob".into()))])));
    }

    #[test]
    fn test_missing_path_never_matches() {
        let f = QueryFilter::eq("name", "alice");
        assert!(!f.matches(&row(&[])));

        let f = QueryFilter::neq("name", "alice");
        assert!(!f.matches(&row(&[])));
    }

    #[test]
    fn test_is_null_matches_absent() {
        let f = QueryFilter::is_null("name");
        assert!(f.matches(&row(&[])));
        assert!(!f.matches(&row(&[("name", Value::String("x".into()))])));
    }

    #[test]
    fn test_ordered_comparisons() {
        let f = QueryFilter::gte("age", 18i64);
        assert!(f.matches(&row(&[("age", Value::Int(18))])));
        assert!(f.matches(&row(&[("age", Value::Int(30))])));
        assert!(!f.matches(&row(&[("age", Value::Int(17))])));
    }

    #[test]
    fn test_int_float_comparison() {
        let f = QueryFilter::gt("score", 1.5);
        assert!(f.matches(&row(&[("score", Value::Int(2))])));
        assert!(!f.matches(&row(&[("score", Value::Int(1))])));
    }

    #[test]
    fn test_no_coercion_across_kinds() {
        let f = QueryFilter::gt("age", 18i64);
        assert!(!f.matches(&row(&[("age", Value::String("30".into()))])));
    }

    #[test]
    fn test_in_values() {
        let f = QueryFilter::in_values("status", vec![Value::from("draft"), Value::from("sent")]);
        assert!(f.matches(&row(&[("status", Value::String("sent".into()))])));
        assert!(!f.matches(&row(&[("status", Value::String("done".into()))])));
    }

    #[test]
    fn test_composite_filters() {
        let f = QueryFilter::eq("a", 1i64).and(QueryFilter::gt("b", 5i64));
        assert!(f.matches(&row(&[("a", Value::Int(1)), ("b", Value::Int(6))])));
        assert!(!f.matches(&row(&[("a", Value::Int(1)), ("b", Value::Int(5))])));

        let f = QueryFilter::eq("a", 1i64).or(QueryFilter::eq("a", 2i64));
        assert!(f.matches(&row(&[("a", Value::Int(2))])));

        let f = QueryFilter::eq("a", 1i64).negate();
        assert!(f.matches(&row(&[("a", Value::Int(9))])));
    }

    #[test]
    fn test_and_flattens_on_chain() {
        let f = QueryFilter::eq("a", 1i64)
            .and(QueryFilter::eq("b", 2i64))
            .and(QueryFilter::eq("c", 3i64));
        match f {
            QueryFilter::And(filters) => assert_eq!(filters.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_composites_invalid() {
        assert!(QueryFilter::And(vec![]).validate().is_err());
        assert!(QueryFilter::Or(vec![]).validate().is_err());
        assert!(QueryFilter::In {
            path: "a".into(),
            values: vec![]
        }
        .validate()
        .is_err());
    }
}
