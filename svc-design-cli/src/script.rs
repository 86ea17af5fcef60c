//! Nom-based parser for the service-design script language.
//!
//! A script is a flat sequence of verb calls, one definition-API call per
//! statement, executed in call order:
//!
//! ```text
//! ;; http_service definition
//! (service.open :name "http_service")
//! (service.title :text "This is a http service")
//! (operation.open :name "liveness")
//! (operation.describe :text "liveness probe")
//! (operation.result :type string)
//! (operation.http :verb GET :path "/liveness")
//! (operation.close)
//! (service.close)
//! ```
//!
//! The grammar is deliberately flat: nesting is established by the order
//! of open/close calls at run time, not by the shape of the source text.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1, none_of},
    combinator::{all_consuming, cut, map, opt, recognize, value},
    error::{context, convert_error, ContextError, ParseError as NomParseError, VerboseError},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use svc_design_core::{HttpVerb, ResultType};

/// One definition statement, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    ServiceOpen { name: String },
    ServiceTitle { text: String },
    ServiceClose,
    OperationOpen { name: String },
    OperationDescribe { text: String },
    OperationResult { result: ResultType },
    OperationHttp { verb: HttpVerb, path: String },
    OperationClose,
}

/// Parse a complete script into its statement list.
///
/// Comments (`;;` to end of line) are trivia and do not appear in the
/// result. Errors come back as human-readable text with source context.
pub fn parse_script(input: &str) -> Result<Vec<Statement>, String> {
    let items = match all_consuming(script::<VerboseError<&str>>)(input) {
        Ok((_, items)) => items,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(convert_error(input, e))
        }
        Err(nom::Err::Incomplete(_)) => return Err("Incomplete input".to_string()),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            ScriptItem::Comment => None,
            ScriptItem::Call(call) => Some(call),
        })
        .enumerate()
        .map(|(i, call)| lower(call).map_err(|e| format!("statement {}: {}", i + 1, e)))
        .collect()
}

// ── Generic verb calls ──

#[derive(Debug)]
enum ScriptItem {
    Comment,
    Call(VerbCall),
}

#[derive(Debug)]
struct VerbCall {
    domain: String,
    verb: String,
    arguments: Vec<Argument>,
}

#[derive(Debug)]
struct Argument {
    key: String,
    value: ArgValue,
}

#[derive(Debug)]
enum ArgValue {
    Str(String),
    Symbol(String),
}

fn script<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Vec<ScriptItem>, E> {
    let (input, items) = many0(preceded(
        multispace0,
        alt((
            map(comment, |_| ScriptItem::Comment),
            map(verb_call, ScriptItem::Call),
        )),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, items))
}

fn comment<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    preceded(tag(";;"), take_while(|c| c != '\n'))(input)
}

fn verb_call<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, VerbCall, E> {
    let (input, _) = char('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, (domain, verb)) = word(input)?;
    let (input, arguments) = many0(argument)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = cut(context("closing parenthesis", char(')')))(input)?;
    Ok((
        input,
        VerbCall {
            domain,
            verb,
            arguments,
        },
    ))
}

fn word<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (String, String), E> {
    let (input, domain) = identifier(input)?;
    let (input, _) = char('.')(input)?;
    let (input, verb) = identifier(input)?;
    Ok((input, (domain.to_string(), verb.to_string())))
}

fn argument<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, Argument, E> {
    let (input, _) = multispace0(input)?;
    let (input, key) = keyword(input)?;
    let (input, _) = multispace1(input)?;
    let (input, val) = context("value", arg_value)(input)?;
    Ok((input, Argument { key, value: val }))
}

fn keyword<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, String, E> {
    let (input, _) = char(':')(input)?;
    let (input, name) = identifier(input)?;
    Ok((input, name.to_string()))
}

fn identifier<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_"), tag("-")))),
    ))(input)
}

fn arg_value<'a, E: NomParseError<&'a str> + ContextError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, ArgValue, E> {
    alt((
        map(string_literal, ArgValue::Str),
        map(identifier, |s| ArgValue::Symbol(s.to_string())),
    ))(input)
}

// String literals with escape sequences
fn string_literal<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, String, E> {
    delimited(
        char('"'),
        map(
            opt(nom::bytes::complete::escaped_transform(
                none_of("\"\\"),
                '\\',
                alt((
                    value('\n', char('n')),
                    value('\r', char('r')),
                    value('\t', char('t')),
                    value('\\', char('\\')),
                    value('"', char('"')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

// ── Lowering to typed statements ──

fn lower(call: VerbCall) -> Result<Statement, String> {
    let name = format!("{}.{}", call.domain, call.verb);
    let args = &call.arguments;
    match name.as_str() {
        "service.open" => {
            expect_keys(args, &["name"], &name)?;
            Ok(Statement::ServiceOpen {
                name: take_string(args, "name", &name)?,
            })
        }
        "service.title" => {
            expect_keys(args, &["text"], &name)?;
            Ok(Statement::ServiceTitle {
                text: take_string(args, "text", &name)?,
            })
        }
        "service.close" => {
            expect_keys(args, &[], &name)?;
            Ok(Statement::ServiceClose)
        }
        "operation.open" => {
            expect_keys(args, &["name"], &name)?;
            Ok(Statement::OperationOpen {
                name: take_string(args, "name", &name)?,
            })
        }
        "operation.describe" => {
            expect_keys(args, &["text"], &name)?;
            Ok(Statement::OperationDescribe {
                text: take_string(args, "text", &name)?,
            })
        }
        "operation.result" => {
            expect_keys(args, &["type"], &name)?;
            let tag = take_symbol(args, "type", &name)?;
            let result = ResultType::from_str(&tag).map_err(|e| format!("{}: {}", name, e))?;
            Ok(Statement::OperationResult { result })
        }
        "operation.http" => {
            expect_keys(args, &["verb", "path"], &name)?;
            let verb_tag = take_symbol(args, "verb", &name)?;
            let verb = HttpVerb::from_str(&verb_tag).map_err(|e| format!("{}: {}", name, e))?;
            Ok(Statement::OperationHttp {
                verb,
                path: take_string(args, "path", &name)?,
            })
        }
        "operation.close" => {
            expect_keys(args, &[], &name)?;
            Ok(Statement::OperationClose)
        }
        other => Err(format!("unknown verb '{}'", other)),
    }
}

fn expect_keys(args: &[Argument], allowed: &[&str], verb: &str) -> Result<(), String> {
    for arg in args {
        if !allowed.contains(&arg.key.as_str()) {
            return Err(format!("{}: unexpected argument :{}", verb, arg.key));
        }
    }
    Ok(())
}

fn take_string(args: &[Argument], key: &str, verb: &str) -> Result<String, String> {
    match args.iter().find(|a| a.key == key) {
        Some(Argument {
            value: ArgValue::Str(s),
            ..
        }) => Ok(s.clone()),
        Some(_) => Err(format!("{}: :{} expects a quoted string", verb, key)),
        None => Err(format!("{}: missing :{}", verb, key)),
    }
}

fn take_symbol(args: &[Argument], key: &str, verb: &str) -> Result<String, String> {
    match args.iter().find(|a| a.key == key) {
        Some(Argument {
            value: ArgValue::Symbol(s),
            ..
        }) => Ok(s.clone()),
        Some(_) => Err(format!("{}: :{} expects a bare symbol", verb, key)),
        None => Err(format!("{}: missing :{}", verb, key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let script = r#"
;; http_service definition
(service.open :name "http_service")
(service.title :text "This is a http service")
(operation.open :name "liveness")
(operation.describe :text "liveness probe")
(operation.result :type string)
(operation.http :verb GET :path "/liveness")
(operation.close)
(service.close)
"#;
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 8);
        assert_eq!(
            statements[0],
            Statement::ServiceOpen {
                name: "http_service".to_string()
            }
        );
        assert_eq!(
            statements[5],
            Statement::OperationHttp {
                verb: HttpVerb::Get,
                path: "/liveness".to_string()
            }
        );
        assert_eq!(statements[7], Statement::ServiceClose);
    }

    #[test]
    fn test_comments_are_trivia() {
        let statements = parse_script(";; nothing but comments\n;; here\n").unwrap();
        assert!(statements.is_empty());
    }

    #[test]
    fn test_string_escapes() {
        let statements =
            parse_script(r#"(service.open :name "a \"quoted\" name")"#).unwrap();
        assert_eq!(
            statements[0],
            Statement::ServiceOpen {
                name: "a \"quoted\" name".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_verb_is_rejected() {
        let err = parse_script("(service.destroy :name \"x\")").unwrap_err();
        assert!(err.contains("unknown verb 'service.destroy'"));
    }

    #[test]
    fn test_unknown_result_type_is_rejected() {
        let err = parse_script("(operation.result :type text)").unwrap_err();
        assert!(err.contains("unknown result type"));
    }

    #[test]
    fn test_unexpected_argument_is_rejected() {
        let err = parse_script("(service.close :name \"x\")").unwrap_err();
        assert!(err.contains("unexpected argument :name"));
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        let err = parse_script("(operation.http :verb GET)").unwrap_err();
        assert!(err.contains("missing :path"));
    }

    #[test]
    fn test_unclosed_call_reports_context() {
        let err = parse_script("(service.open :name \"x\"").unwrap_err();
        assert!(err.contains("closing parenthesis"));
    }

    #[test]
    fn test_statement_json_shape() {
        let json = serde_json::to_string(&Statement::OperationHttp {
            verb: HttpVerb::Get,
            path: "/liveness".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"stmt\":\"operation_http\""));
        assert!(json.contains("\"verb\":\"GET\""));
        assert!(json.contains("\"path\":\"/liveness\""));
    }
}
