//! Expression model and resolution
//!
//! The generic hook backends use to translate storage-agnostic targets,
//! filters and values into their own constructs. Resolution is a pure,
//! deterministic transform layer with no I/O.

mod errors;
mod expression;
mod resolver;

pub use errors::{ExpressionError, ExpressionResult};
pub use expression::{Expression, ExpressionKind, PathExpression, ValueExpression};
pub use resolver::{ExpressionResolver, ResolutionContext, ResolverRegistry};
