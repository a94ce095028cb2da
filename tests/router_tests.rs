mod common;

use common::fixtures;
use helmsman::controller::ReplyBody;
use helmsman::router::{Resolution, Router};
use helmsman::server::{RawRequestParts, Request};
use helmsman::ApiError;
use http::Method;
use serde_json::json;

fn resolve(raw: &RawRequestParts) -> anyhow::Result<Resolution> {
    let request = Request::from_raw(raw);
    Router::new().resolve(&request, fixtures::root(), request.request_chain())
}

#[test]
fn test_get_information() {
    let resolution = resolve(&RawRequestParts::new(Method::GET, "/information")).unwrap();
    match resolution {
        Resolution::Invoked(reply) => {
            assert_eq!(reply.into_body(), ReplyBody::Data(json!("information")));
        }
        Resolution::Documented(_) => panic!("expected an invocation"),
    }
}

#[test]
fn test_post_complex_data_to_child() {
    let raw = RawRequestParts::new(Method::POST, "/child/complex-data")
        .json(&json!({ "param1": "x", "param2": 1 }));
    match resolve(&raw).unwrap() {
        Resolution::Invoked(reply) => {
            assert_eq!(
                reply.into_body(),
                ReplyBody::Data(json!({ "param1": "x", "param2": 1 }))
            );
        }
        Resolution::Documented(_) => panic!("expected an invocation"),
    }
}

#[test]
fn test_undefined_path_is_route_not_found() {
    let err = resolve(&RawRequestParts::new(Method::GET, "/not-a-real-endpoint")).unwrap_err();
    let api_error = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(
        api_error,
        &ApiError::RouteNotFound {
            segment: "not-a-real-endpoint".to_string()
        }
    );
    assert_eq!(api_error.status().code(), 404);
}

#[test]
fn test_root_documents_itself() {
    match resolve(&RawRequestParts::new(Method::GET, "/")).unwrap() {
        Resolution::Documented(docs) => {
            assert_eq!(docs.controllers, vec!["child"]);
            let get = &docs.endpoints["get"];
            let listed: Vec<&String> = get.keys().collect();
            assert_eq!(
                listed,
                vec!["information", "teapot", "explode", "forbidden", "echo"]
            );
            assert_eq!(get["information"].summary, "Returns some information.");
            assert_eq!(get["information"].return_type, vec!["string"]);
        }
        Resolution::Invoked(_) => panic!("expected documentation"),
    }
}

#[test]
fn test_resolution_is_deterministic() {
    let outcome = || match resolve(&RawRequestParts::new(Method::GET, "/child")).unwrap() {
        Resolution::Documented(docs) => docs,
        Resolution::Invoked(_) => panic!("expected documentation"),
    };
    let first = outcome();
    for _ in 0..5 {
        assert_eq!(outcome(), first);
    }
}

#[test]
fn test_hidden_endpoint_is_reachable() {
    match resolve(&RawRequestParts::new(Method::GET, "/secret")).unwrap() {
        Resolution::Invoked(reply) => {
            assert_eq!(reply.into_body(), ReplyBody::Data(json!("hidden but here")));
        }
        Resolution::Documented(_) => panic!("expected an invocation"),
    }
}
