//! Entity types for a service description under construction.
//!
//! Entities live in arenas owned by their session; every cross-reference is
//! an arena index, so parent backrefs stay weak and nothing forms an
//! ownership cycle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DesignError;

/// Index of a service in its session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub(crate) usize);

/// Index of an operation in its session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub(crate) usize);

/// Weak backref to the scope that was innermost when an entity was built.
/// Diagnostic only; never used to extend a lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeRef {
    Service(ServiceId),
    Operation(OperationId),
}

/// Lifecycle state. Only `Open` entities accept attribute mutation; an
/// entity becomes `Closed` when its scope closes and is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    Open,
    Closed,
}

/// HTTP verb of an operation trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            other => Err(format!("unknown HTTP verb '{}'", other)),
        }
    }
}

/// Semantic tag for an operation's declared result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    String,
    Integer,
    Boolean,
    Float,
}

impl ResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultType::String => "string",
            ResultType::Integer => "integer",
            ResultType::Boolean => "boolean",
            ResultType::Float => "float",
        }
    }
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ResultType::String),
            "integer" => Ok(ResultType::Integer),
            "boolean" => Ok(ResultType::Boolean),
            "float" => Ok(ResultType::Float),
            other => Err(format!("unknown result type '{}'", other)),
        }
    }
}

/// How an operation is invoked from outside: verb plus URL path pattern.
/// The path is opaque here; its syntax belongs to the target framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTrigger {
    pub verb: HttpVerb,
    pub path: String,
}

/// A named service being defined. Operations register here by name as they
/// are opened; declaration order is preserved for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub title: Option<String>,
    operations: Vec<OperationId>,
    operation_names: HashMap<String, OperationId>,
    pub parent: Option<ScopeRef>,
    pub state: EntityState,
}

impl Service {
    pub(crate) fn new(name: String, parent: Option<ScopeRef>) -> Self {
        Self {
            name,
            title: None,
            operations: Vec::new(),
            operation_names: HashMap::new(),
            parent,
            state: EntityState::Open,
        }
    }

    /// Register an operation under a unique name. Checked before any state
    /// changes, so a duplicate leaves the service untouched.
    pub(crate) fn register(&mut self, name: &str, id: OperationId) -> Result<(), DesignError> {
        if self.operation_names.contains_key(name) {
            return Err(DesignError::DuplicateName {
                service: self.name.clone(),
                name: name.to_string(),
            });
        }
        self.operation_names.insert(name.to_string(), id);
        self.operations.push(id);
        Ok(())
    }

    /// Operation ids in declaration order.
    pub fn operations(&self) -> &[OperationId] {
        &self.operations
    }

    pub fn operation_by_name(&self, name: &str) -> Option<OperationId> {
        self.operation_names.get(name).copied()
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operation_names.contains_key(name)
    }
}

/// A named operation, fixed to the service it registered into at
/// construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub service: ServiceId,
    pub description: Option<String>,
    pub result: Option<ResultType>,
    pub trigger: Option<HttpTrigger>,
    pub parent: Option<ScopeRef>,
    pub state: EntityState,
}

impl Operation {
    pub(crate) fn new(name: String, service: ServiceId, parent: Option<ScopeRef>) -> Self {
        Self {
            name,
            service,
            description: None,
            result: None,
            trigger: None,
            parent,
            state: EntityState::Open,
        }
    }
}

// ── Resolved snapshot view ──

/// Flattened, serializable snapshot of a resolved service description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub operations: Vec<OperationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<HttpTrigger>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_verb_roundtrip() {
        assert_eq!(HttpVerb::from_str("GET").unwrap(), HttpVerb::Get);
        assert_eq!(HttpVerb::from_str("delete").unwrap(), HttpVerb::Delete);
        assert_eq!(HttpVerb::Put.to_string(), "PUT");
        assert!(HttpVerb::from_str("PATCH").is_err());
    }

    #[test]
    fn test_result_type_tags() {
        assert_eq!(ResultType::from_str("string").unwrap(), ResultType::String);
        assert_eq!(ResultType::Integer.to_string(), "integer");
        assert!(ResultType::from_str("str").is_err());
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut svc = Service::new("http_service".to_string(), None);
        svc.register("liveness", OperationId(0)).unwrap();
        let err = svc.register("liveness", OperationId(1)).unwrap_err();
        assert_eq!(
            err,
            DesignError::DuplicateName {
                service: "http_service".to_string(),
                name: "liveness".to_string(),
            }
        );
        // the failed registration left nothing behind
        assert_eq!(svc.operations(), &[OperationId(0)]);
    }

    #[test]
    fn test_register_preserves_declaration_order() {
        let mut svc = Service::new("s".to_string(), None);
        svc.register("c", OperationId(0)).unwrap();
        svc.register("a", OperationId(1)).unwrap();
        svc.register("b", OperationId(2)).unwrap();
        assert_eq!(
            svc.operations(),
            &[OperationId(0), OperationId(1), OperationId(2)]
        );
        assert_eq!(svc.operation_by_name("a"), Some(OperationId(1)));
    }

    #[test]
    fn test_verb_serde_uppercase() {
        let json = serde_json::to_string(&HttpVerb::Get).unwrap();
        assert_eq!(json, "\"GET\"");
        let back: HttpVerb = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(back, HttpVerb::Post);
    }
}
