//! YAML front-end.
//!
//! A declarative YAML document describing one service is lowered to the
//! same flat statement sequence the script grammar produces, then replayed
//! through a session like any other script. No validation happens here;
//! the session enforces structure during replay.

use serde::Deserialize;
use svc_design_core::{HttpVerb, ResultType};

use crate::script::Statement;

/// Declarative document for one service.
///
/// ```yaml
/// name: http_service
/// title: This is a http service
/// operations:
///   - name: liveness
///     description: liveness probe
///     result: string
///     http: { verb: GET, path: /liveness }
/// ```
#[derive(Debug, Deserialize)]
pub struct ServiceDoc {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub operations: Vec<OperationDoc>,
}

#[derive(Debug, Deserialize)]
pub struct OperationDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub result: Option<ResultType>,
    #[serde(default)]
    pub http: Option<HttpDoc>,
}

#[derive(Debug, Deserialize)]
pub struct HttpDoc {
    pub verb: HttpVerb,
    pub path: String,
}

/// Parse a YAML service document and lower it to definition statements.
pub fn parse_service_yaml(input: &str) -> Result<Vec<Statement>, serde_yaml::Error> {
    let doc: ServiceDoc = serde_yaml::from_str(input)?;
    Ok(lower(doc))
}

fn lower(doc: ServiceDoc) -> Vec<Statement> {
    let mut statements = vec![Statement::ServiceOpen { name: doc.name }];
    if let Some(text) = doc.title {
        statements.push(Statement::ServiceTitle { text });
    }
    for op in doc.operations {
        statements.push(Statement::OperationOpen { name: op.name });
        if let Some(text) = op.description {
            statements.push(Statement::OperationDescribe { text });
        }
        if let Some(result) = op.result {
            statements.push(Statement::OperationResult { result });
        }
        if let Some(http) = op.http {
            statements.push(Statement::OperationHttp {
                verb: http.verb,
                path: http.path,
            });
        }
        statements.push(Statement::OperationClose);
    }
    statements.push(Statement::ServiceClose);
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_lowers_to_statements() {
        let yaml = r#"
name: http_service
title: This is a http service
operations:
  - name: liveness
    description: liveness probe
    result: string
    http: { verb: GET, path: /liveness }
"#;
        let statements = parse_service_yaml(yaml).unwrap();
        assert_eq!(
            statements,
            vec![
                Statement::ServiceOpen {
                    name: "http_service".to_string()
                },
                Statement::ServiceTitle {
                    text: "This is a http service".to_string()
                },
                Statement::OperationOpen {
                    name: "liveness".to_string()
                },
                Statement::OperationDescribe {
                    text: "liveness probe".to_string()
                },
                Statement::OperationResult {
                    result: ResultType::String
                },
                Statement::OperationHttp {
                    verb: HttpVerb::Get,
                    path: "/liveness".to_string()
                },
                Statement::OperationClose,
                Statement::ServiceClose,
            ]
        );
    }

    #[test]
    fn test_sparse_operation_lowers_without_optionals() {
        let yaml = r#"
name: s
operations:
  - name: bare
"#;
        let statements = parse_service_yaml(yaml).unwrap();
        assert_eq!(
            statements,
            vec![
                Statement::ServiceOpen {
                    name: "s".to_string()
                },
                Statement::OperationOpen {
                    name: "bare".to_string()
                },
                Statement::OperationClose,
                Statement::ServiceClose,
            ]
        );
    }

    #[test]
    fn test_bad_verb_is_a_parse_error() {
        let yaml = r#"
name: s
operations:
  - name: x
    http: { verb: PATCH, path: /x }
"#;
        assert!(parse_service_yaml(yaml).is_err());
    }
}
