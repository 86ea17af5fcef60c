//! Declarative builder for HTTP service descriptions.
//!
//! A [`DesignSession`] tracks which service or operation is currently being
//! defined on one scope stack per entity kind, so declarative statements
//! can attach attributes to the innermost open scope without threading the
//! entity through every call. Operations register under a unique name in
//! the service that is open when they are constructed. Closing a service
//! renders it into handler source exactly once.
//!
//! Sessions are plain owned values: every definition flow gets its own
//! session, and nothing here is global, shared, or locked.

pub mod context;
pub mod error;
pub mod model;
pub mod render;
pub mod session;

pub use context::{EntityKind, ScopeStack};
pub use error::DesignError;
pub use model::{
    EntityState, HttpTrigger, HttpVerb, Operation, OperationId, OperationSpec, ResultType,
    ScopeRef, Service, ServiceId, ServiceSpec,
};
pub use render::{render_service, RenderedService};
pub use session::DesignSession;
