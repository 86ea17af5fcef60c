//! The definition session: entity arenas, scope stacks, and the
//! statement-level definition API.

use tracing::debug;
use uuid::Uuid;

use crate::context::{EntityKind, ScopeStack};
use crate::error::DesignError;
use crate::model::{
    EntityState, HttpTrigger, HttpVerb, Operation, OperationId, OperationSpec, ResultType,
    ScopeRef, Service, ServiceId, ServiceSpec,
};
use crate::render::{render_service, RenderedService};

/// One isolated run of the definition API, from first open to final close.
///
/// The session owns the entity arenas and one scope stack per entity kind,
/// so independent definition flows each hold their own session value and
/// never share state. Attribute setters resolve the innermost open scope of
/// the matching kind; whichever entity was opened most recently is the
/// target, regardless of where the statement sits in source text.
///
/// Closing a service renders it exactly once. Dropping a session
/// mid-definition simply discards its state.
///
/// ```
/// use svc_design_core::{DesignSession, HttpVerb, ResultType};
///
/// let mut session = DesignSession::new();
/// session.open_service("http_service");
/// session.set_title("This is a http service")?;
/// session.open_operation("liveness")?;
/// session.set_description("liveness probe")?;
/// session.set_result_type(ResultType::String)?;
/// session.set_trigger(HttpVerb::Get, "/liveness")?;
/// session.close_operation()?;
/// let rendered = session.close_service()?;
/// assert!(rendered.source().contains("def liveness"));
/// # Ok::<(), svc_design_core::DesignError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DesignSession {
    session_id: Uuid,
    services: Vec<Service>,
    operations: Vec<Operation>,
    service_scopes: ScopeStack<ServiceId>,
    operation_scopes: ScopeStack<OperationId>,
    closed_services: Vec<ServiceId>,
    outputs: Vec<RenderedService>,
}

impl DesignSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    pub fn with_id(session_id: Uuid) -> Self {
        Self {
            session_id,
            services: Vec::new(),
            operations: Vec::new(),
            service_scopes: ScopeStack::new(EntityKind::Service),
            operation_scopes: ScopeStack::new(EntityKind::Operation),
            closed_services: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // ── Service scope ──

    /// Open a service scope. The new service becomes the target of
    /// service-level setters (and the owner of newly opened operations)
    /// until it is closed.
    pub fn open_service(&mut self, name: impl Into<String>) -> ServiceId {
        let name = name.into();
        let parent = self.service_scopes.current().ok().map(ScopeRef::Service);
        let id = ServiceId(self.services.len());
        debug!(session = %self.session_id, service = %name, "open service scope");
        self.services.push(Service::new(name, parent));
        self.service_scopes.push(id);
        id
    }

    /// Close the innermost service scope and render it. Rendering happens
    /// here, exactly once per service.
    pub fn close_service(&mut self) -> Result<RenderedService, DesignError> {
        let id = self.service_scopes.pop()?;
        self.services[id.0].state = EntityState::Closed;
        let ops = self.resolve_operations(id);
        let rendered = render_service(&self.services[id.0], &ops)?;
        debug!(
            session = %self.session_id,
            service = %self.services[id.0].name,
            blocks = rendered.blocks.len(),
            "closed and rendered service"
        );
        self.closed_services.push(id);
        self.outputs.push(rendered.clone());
        Ok(rendered)
    }

    /// Set the title of the innermost open service. Last write wins.
    pub fn set_title(&mut self, text: impl Into<String>) -> Result<(), DesignError> {
        let id = self.service_scopes.current()?;
        self.services[id.0].title = Some(text.into());
        Ok(())
    }

    // ── Operation scope ──

    /// Open an operation scope inside the innermost open service.
    ///
    /// Fails with `NoActiveScope` when no service is open and with
    /// `DuplicateName` when the name is already registered in the owning
    /// service; on failure no operation is created at all.
    pub fn open_operation(&mut self, name: impl Into<String>) -> Result<OperationId, DesignError> {
        let name = name.into();
        let service_id = self.service_scopes.current()?;
        let id = OperationId(self.operations.len());
        // registration is checked first so a duplicate leaves no trace
        self.services[service_id.0].register(&name, id)?;
        let parent = self
            .operation_scopes
            .current()
            .ok()
            .map(ScopeRef::Operation);
        debug!(
            session = %self.session_id,
            service = %self.services[service_id.0].name,
            operation = %name,
            "open operation scope"
        );
        self.operations.push(Operation::new(name, service_id, parent));
        self.operation_scopes.push(id);
        Ok(id)
    }

    /// Close the innermost operation scope.
    pub fn close_operation(&mut self) -> Result<OperationId, DesignError> {
        let id = self.operation_scopes.pop()?;
        self.operations[id.0].state = EntityState::Closed;
        Ok(id)
    }

    /// Set the description of the innermost open operation. Last write
    /// wins.
    pub fn set_description(&mut self, text: impl Into<String>) -> Result<(), DesignError> {
        let id = self.operation_scopes.current()?;
        self.operations[id.0].description = Some(text.into());
        Ok(())
    }

    /// Declare the result type of the innermost open operation.
    pub fn set_result_type(&mut self, result: ResultType) -> Result<(), DesignError> {
        let id = self.operation_scopes.current()?;
        self.operations[id.0].result = Some(result);
        Ok(())
    }

    /// Bind the HTTP trigger of the innermost open operation.
    pub fn set_trigger(
        &mut self,
        verb: HttpVerb,
        path: impl Into<String>,
    ) -> Result<(), DesignError> {
        let id = self.operation_scopes.current()?;
        self.operations[id.0].trigger = Some(HttpTrigger {
            verb,
            path: path.into(),
        });
        Ok(())
    }

    // ── Lookup & resolved views ──

    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.0]
    }

    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.0]
    }

    /// The innermost open service, if any.
    pub fn current_service(&self) -> Result<ServiceId, DesignError> {
        self.service_scopes.current()
    }

    /// The innermost open operation, if any.
    pub fn current_operation(&self) -> Result<OperationId, DesignError> {
        self.operation_scopes.current()
    }

    /// Services closed so far, in close order.
    pub fn closed_services(&self) -> &[ServiceId] {
        &self.closed_services
    }

    /// Rendered units collected so far, in close order.
    pub fn outputs(&self) -> &[RenderedService] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<RenderedService> {
        self.outputs
    }

    /// Flattened snapshot of a service with its operations resolved in
    /// declaration order.
    pub fn service_spec(&self, id: ServiceId) -> ServiceSpec {
        let service = &self.services[id.0];
        let operations = service
            .operations()
            .iter()
            .map(|op_id| {
                let op = &self.operations[op_id.0];
                OperationSpec {
                    name: op.name.clone(),
                    description: op.description.clone(),
                    result: op.result,
                    trigger: op.trigger.clone(),
                }
            })
            .collect();
        ServiceSpec {
            name: service.name.clone(),
            title: service.title.clone(),
            operations,
        }
    }

    fn resolve_operations(&self, id: ServiceId) -> Vec<&Operation> {
        self.services[id.0]
            .operations()
            .iter()
            .map(|op_id| &self.operations[op_id.0])
            .collect()
    }
}

impl Default for DesignSession {
    fn default() -> Self {
        Self::new()
    }
}
