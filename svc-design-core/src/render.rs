//! Text rendering for closed services.
//!
//! Pure functions from a populated service (plus its operations in
//! declaration order) to source text: one block declaring the service,
//! then one handler stub per operation carrying its trigger verb/path and
//! declared result type. Identical input yields byte-identical output.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::DesignError;
use crate::model::{Operation, ResultType, Service};

/// Rendered output for one closed service: the service block followed by
/// one block per operation, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedService {
    pub name: String,
    pub blocks: Vec<String>,
}

impl RenderedService {
    /// All blocks joined into one source unit.
    pub fn source(&self) -> String {
        self.blocks.join("\n")
    }
}

/// Render a service and its operations into nameko-style handler source.
///
/// Fails with [`DesignError::Render`] if any operation is missing its
/// trigger or result type; nothing is silently defaulted. Performs no
/// mutation of the input.
pub fn render_service(
    service: &Service,
    operations: &[&Operation],
) -> Result<RenderedService, DesignError> {
    let mut blocks = Vec::with_capacity(operations.len() + 1);
    blocks.push(service_block(service));
    for op in operations {
        blocks.push(operation_block(op)?);
    }
    Ok(RenderedService {
        name: service.name.clone(),
        blocks,
    })
}

/// Python annotation for a declared result type.
fn python_type(result: ResultType) -> &'static str {
    match result {
        ResultType::String => "str",
        ResultType::Integer => "int",
        ResultType::Boolean => "bool",
        ResultType::Float => "float",
    }
}

fn service_block(service: &Service) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "from nameko.web.handlers import http");
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(out, "class HttpService:");
    if let Some(title) = &service.title {
        let _ = writeln!(out, "    \"\"\"{}\"\"\"", title);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "    name = \"{}\"", service.name);
    out
}

fn operation_block(op: &Operation) -> Result<String, DesignError> {
    let trigger = op.trigger.as_ref().ok_or(DesignError::Render {
        operation: op.name.clone(),
        missing: "trigger",
    })?;
    let result = op.result.ok_or(DesignError::Render {
        operation: op.name.clone(),
        missing: "result type",
    })?;

    let mut out = String::new();
    let _ = writeln!(out, "    @http('{}', '{}')", trigger.verb, trigger.path);
    let _ = writeln!(
        out,
        "    def {}(self, request) -> {}:",
        op.name,
        python_type(result)
    );
    if let Some(desc) = &op.description {
        let _ = writeln!(out, "        \"\"\"{}\"\"\"", desc);
    }
    let _ = writeln!(out, "        pass");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpTrigger, HttpVerb, OperationId, ServiceId};

    fn liveness() -> Operation {
        let mut op = Operation::new("liveness".to_string(), ServiceId(0), None);
        op.description = Some("liveness probe".to_string());
        op.result = Some(ResultType::String);
        op.trigger = Some(HttpTrigger {
            verb: HttpVerb::Get,
            path: "/liveness".to_string(),
        });
        op
    }

    #[test]
    fn test_service_block_carries_name_and_title() {
        let mut svc = Service::new("http_service".to_string(), None);
        svc.title = Some("This is a http service".to_string());
        let block = service_block(&svc);
        assert!(block.contains("name = \"http_service\""));
        assert!(block.contains("This is a http service"));
    }

    #[test]
    fn test_operation_block_substitutes_all_slots() {
        let block = operation_block(&liveness()).unwrap();
        assert!(block.contains("@http('GET', '/liveness')"));
        assert!(block.contains("def liveness(self, request) -> str:"));
        assert!(block.contains("liveness probe"));
    }

    #[test]
    fn test_rendering_is_pure() {
        let mut svc = Service::new("http_service".to_string(), None);
        svc.register("liveness", OperationId(0)).unwrap();
        let op = liveness();
        let first = render_service(&svc, &[&op]).unwrap();
        let second = render_service(&svc, &[&op]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.source(), second.source());
    }

    #[test]
    fn test_missing_trigger_fails_render() {
        let svc = Service::new("s".to_string(), None);
        let mut op = liveness();
        op.trigger = None;
        let err = render_service(&svc, &[&op]).unwrap_err();
        assert_eq!(
            err,
            DesignError::Render {
                operation: "liveness".to_string(),
                missing: "trigger",
            }
        );
    }

    #[test]
    fn test_missing_result_fails_render() {
        let mut op = liveness();
        op.result = None;
        let err = operation_block(&op).unwrap_err();
        assert_eq!(
            err,
            DesignError::Render {
                operation: "liveness".to_string(),
                missing: "result type",
            }
        );
    }
}
