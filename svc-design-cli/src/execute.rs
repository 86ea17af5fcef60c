//! Host loop: replay a parsed statement list against one fresh session.

use svc_design_core::{DesignError, DesignSession, RenderedService, ServiceSpec};

use crate::script::Statement;

/// A statement failed during replay. Carries the 1-based statement index
/// so the caller can point at the offending line of the script.
#[derive(Debug, thiserror::Error)]
#[error("statement {index}: {source}")]
pub struct ExecuteError {
    pub index: usize,
    #[source]
    pub source: DesignError,
}

/// Replay `statements` in order against a fresh, isolated session.
///
/// Any failure aborts the run and the partially built description is
/// discarded with the session; callers never see partial output.
pub fn execute(statements: &[Statement]) -> Result<DesignSession, ExecuteError> {
    let mut session = DesignSession::new();
    for (i, statement) in statements.iter().enumerate() {
        apply(&mut session, statement).map_err(|source| ExecuteError {
            index: i + 1,
            source,
        })?;
    }
    Ok(session)
}

/// Rendered sources of a successful run, in close order.
pub fn generate(statements: &[Statement]) -> Result<Vec<RenderedService>, ExecuteError> {
    execute(statements).map(DesignSession::into_outputs)
}

/// Resolved specs of the services closed by a successful run.
pub fn describe(statements: &[Statement]) -> Result<Vec<ServiceSpec>, ExecuteError> {
    let session = execute(statements)?;
    Ok(session
        .closed_services()
        .iter()
        .map(|id| session.service_spec(*id))
        .collect())
}

fn apply(session: &mut DesignSession, statement: &Statement) -> Result<(), DesignError> {
    match statement {
        Statement::ServiceOpen { name } => {
            session.open_service(name.clone());
            Ok(())
        }
        Statement::ServiceTitle { text } => session.set_title(text.clone()),
        Statement::ServiceClose => session.close_service().map(|_| ()),
        Statement::OperationOpen { name } => session.open_operation(name.clone()).map(|_| ()),
        Statement::OperationDescribe { text } => session.set_description(text.clone()),
        Statement::OperationResult { result } => session.set_result_type(*result),
        Statement::OperationHttp { verb, path } => session.set_trigger(*verb, path.clone()),
        Statement::OperationClose => session.close_operation().map(|_| ()),
    }
}
