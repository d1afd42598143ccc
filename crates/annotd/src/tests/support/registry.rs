//! Registry of canned handlers used across dispatch tests.

use serde_json::{Map, Value, json};

use crate::dispatch::{
    ActionDescriptor, ActionRegistry, Capabilities, HandlerBinding, HandlerError, HandlerResult,
    ParamSpec, RequestArgs,
};

/// Custom expand action that is audit-logged.
pub const LOGGED_EXPAND_ACTION: &str = "exportCollection";

/// Custom logged action whose handler panics.
pub const PANICKING_ACTION: &str = "crashingAction";

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn get_document(args: &[Value]) -> HandlerResult {
    Ok(object(json!({
        "document": args[1],
        "text": "Protein kinase binds",
        "comments": [["T1", "AnnotatorNotes", "check"]],
        "annotations": {
            "entities": [["T1", "Protein", [[0, 7]]]],
            "comments": [["T1", "AnnotatorNotes", "check"]],
            "sentence_offsets": [[0, 20]],
        },
    })))
}

fn create_span(args: &[Value]) -> HandlerResult {
    Ok(object(json!({
        "arguments": args,
        "annotations": {
            "entities": [["T2", args[3], args[2]]],
            "comments": [["T2", "AnnotatorNotes", "new"]],
            "sentence_offsets": [[0, 20]],
        },
    })))
}

fn delete_span(args: &[Value]) -> HandlerResult {
    Err(HandlerError::new("spanNotFound", "no such span").with_field("id", args[2].clone()))
}

fn whoami(_args: &[Value]) -> HandlerResult {
    Ok(object(json!({ "user": "guest" })))
}

fn search_collection(_args: &[Value]) -> HandlerResult {
    Ok(object(json!({ "items": [] })))
}

fn create_folder(args: &RequestArgs) -> HandlerResult {
    Ok(object(json!({ "request": args.as_map() })))
}

fn export_collection(_args: &RequestArgs) -> HandlerResult {
    Ok(object(json!({ "exported": true })))
}

fn crash(_args: &[Value]) -> HandlerResult {
    panic!("handler crashed");
}

/// Builds the registry shared by dispatcher tests.
#[must_use]
pub fn sample_registry() -> ActionRegistry {
    let mut builder = ActionRegistry::builder();
    builder
        .with_builtins()
        .and_then(|builder| {
            builder.register_standard(
                "getDocument",
                HandlerBinding::positional(
                    vec![ParamSpec::required("collection"), ParamSpec::required("document")],
                    get_document,
                ),
            )
        })
        .and_then(|builder| {
            builder.register_standard(
                "createSpan",
                HandlerBinding::positional(
                    vec![
                        ParamSpec::required("collection"),
                        ParamSpec::required("document"),
                        ParamSpec::required("offsets"),
                        ParamSpec::required("type"),
                        ParamSpec::optional("attributes", "{}"),
                        ParamSpec::optional("comment", Value::Null),
                    ],
                    create_span,
                ),
            )
        })
        .and_then(|builder| {
            builder.register_standard(
                "deleteSpan",
                HandlerBinding::positional(
                    vec![
                        ParamSpec::required("collection"),
                        ParamSpec::required("document"),
                        ParamSpec::required("id"),
                    ],
                    delete_span,
                ),
            )
        })
        .and_then(|builder| {
            builder.register_standard("whoami", HandlerBinding::positional(Vec::new(), whoami))
        })
        .and_then(|builder| {
            builder.register_standard(
                "searchTextInCollection",
                HandlerBinding::positional(
                    vec![ParamSpec::required("collection"), ParamSpec::required("text")],
                    search_collection,
                ),
            )
        })
        .and_then(|builder| {
            builder.register_standard("createFolder", HandlerBinding::expand(create_folder))
        })
        .and_then(|builder| {
            builder.register(
                ActionDescriptor::new(
                    LOGGED_EXPAND_ACTION,
                    HandlerBinding::expand(export_collection),
                )
                .with_capabilities(Capabilities::NONE.logged()),
            )
        })
        .and_then(|builder| {
            builder.register(
                ActionDescriptor::new(PANICKING_ACTION, HandlerBinding::positional(Vec::new(), crash))
                    .with_capabilities(Capabilities::NONE.logged()),
            )
        })
        .expect("sample registry should build");
    builder.build()
}
