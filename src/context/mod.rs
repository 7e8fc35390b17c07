//! Context scope registry
//!
//! Pluggable named providers of contextual values, grouped by realm and
//! listed in declared priority order. Realms carry an explicit lifecycle:
//! initialize from providers, register and unregister programmatically,
//! drop when done.

mod errors;
mod realm;
mod registry;
mod scope;

pub use errors::{ContextError, ContextResult};
pub use realm::Realm;
pub use registry::ScopeRegistry;
pub use scope::{ContextScope, MapScope, ScopeProvider};
