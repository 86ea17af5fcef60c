use crate::context::EntityKind;

/// Errors raised while building or rendering a service description.
///
/// All variants are fatal to the definition session that raised them: the
/// declarative script is malformed (or the host mismatched open/close
/// pairing) and there is no safe recovery. Callers propagate to the session
/// boundary and discard the partially built description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    /// An attribute setter or a nested constructor ran with no matching
    /// scope open. The expected user-facing error for statements outside
    /// any enclosing block.
    #[error("no active {0} scope")]
    NoActiveScope(EntityKind),

    /// An operation name collided with one already registered in the same
    /// service. The colliding operation is never created.
    #[error("operation '{name}' already exists in service '{service}'")]
    DuplicateName { service: String, name: String },

    /// A scope close ran with no matching open. Mismatched pairing in the
    /// host loop, not user error.
    #[error("{0} scope closed with no matching open")]
    ScopeUnderflow(EntityKind),

    /// A closed operation was missing a field the renderer requires.
    #[error("cannot render operation '{operation}': {missing} not set")]
    Render {
        operation: String,
        missing: &'static str,
    },
}
