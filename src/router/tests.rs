use super::{Resolution, Router};
use crate::controller::{Controller, Endpoint, Reply, ReplyBody};
use crate::error::ApiError;
use crate::server::{RawRequestParts, Request};
use crate::status::Status;
use http::Method;
use serde_json::{json, Value};

fn value(reply: &Reply) -> &Value {
    match reply.body() {
        ReplyBody::Data(value) => value,
        ReplyBody::Entries(_) => panic!("expected a data reply"),
    }
}

fn constant(value: &'static str) -> Endpoint {
    Endpoint::new(move || -> anyhow::Result<&'static str> { Ok(value) })
}

fn resolve(root: Controller, method: Method, uri: &str) -> (Router, anyhow::Result<Resolution>) {
    let request = Request::from_raw(&RawRequestParts::new(method, uri));
    let mut router = Router::new();
    let resolution = router.resolve(&request, root, request.request_chain());
    (router, resolution)
}

fn invoked(resolution: anyhow::Result<Resolution>) -> Reply {
    match resolution {
        Ok(Resolution::Invoked(reply)) => reply,
        Ok(Resolution::Documented(docs)) => panic!("expected an invocation, got {docs:?}"),
        Err(err) => panic!("expected an invocation, got {err:#}"),
    }
}

#[test]
fn test_endpoint_at_root() {
    let root = Controller::builder()
        .endpoint(Method::GET, "information", constant("information"))
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/information");
    assert_eq!(value(&invoked(resolution)), &json!("information"));
}

#[test]
fn test_descends_into_children() {
    let leaf = || {
        Controller::builder()
            .endpoint(Method::GET, "leaf", constant("deep"))
            .build()
    };
    let middle = move || Controller::builder().child("b", leaf).build();
    let root = Controller::builder().child("a", middle).build();

    let (_, resolution) = resolve(root, Method::GET, "/a/b/leaf");
    assert_eq!(value(&invoked(resolution)), &json!("deep"));
}

#[test]
fn test_child_controller_shadows_endpoint() {
    let child = || {
        Controller::builder()
            .index(Method::GET, constant("from child"))
            .build()
    };
    let root = || {
        Controller::builder()
            .endpoint(Method::GET, "foo", constant("from endpoint"))
            .child("foo", child)
            .build()
    };

    for _ in 0..3 {
        let (_, resolution) = resolve(root(), Method::GET, "/foo");
        assert_eq!(value(&invoked(resolution)), &json!("from child"));
    }
}

#[test]
fn test_verb_must_match() {
    let root = Controller::builder()
        .endpoint(Method::POST, "submit", constant("ok"))
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/submit");
    let err = resolution.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ApiError>(),
        Some(&ApiError::RouteNotFound {
            segment: "submit".to_string()
        })
    );
}

#[test]
fn test_unmatched_segment_names_the_segment() {
    let root = Controller::builder()
        .child("child", || Controller::builder().build())
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/child/not-a-real-endpoint");
    let err = resolution.unwrap_err();
    let api_error = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.status(), Status::NOT_FOUND);
    assert!(api_error.public_message().contains("not-a-real-endpoint"));
}

#[test]
fn test_empty_path_invokes_index() {
    let root = Controller::builder()
        .index(Method::GET, constant("index"))
        .endpoint(Method::GET, "other", constant("other"))
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/");
    assert_eq!(value(&invoked(resolution)), &json!("index"));
}

#[test]
fn test_empty_path_without_index_documents() {
    let root = Controller::builder()
        .index(Method::POST, constant("post index"))
        .endpoint(Method::GET, "information", constant("information"))
        .child("child", || Controller::builder().build())
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/");
    match resolution.unwrap() {
        Resolution::Documented(docs) => {
            assert_eq!(docs.controllers, vec!["child"]);
            assert!(docs.endpoint("get", "information").is_some());
            assert!(docs.endpoint("post", "index").is_none());
        }
        Resolution::Invoked(reply) => panic!("expected documentation, got {reply:?}"),
    }
}

#[test]
fn test_path_ending_at_child_documents_the_child() {
    let child = || {
        Controller::builder()
            .endpoint(Method::POST, "complex-data", constant("x"))
            .build()
    };
    let root = Controller::builder().child("child", child).build();
    let (_, resolution) = resolve(root, Method::GET, "/child/");
    match resolution.unwrap() {
        Resolution::Documented(docs) => {
            assert!(docs.controllers.is_empty());
            assert!(docs.endpoint("post", "complex-data").is_some());
        }
        Resolution::Invoked(reply) => panic!("expected documentation, got {reply:?}"),
    }
}

#[test]
fn test_endpoint_errors_propagate() {
    let root = Controller::builder()
        .endpoint(
            Method::GET,
            "boom",
            Endpoint::new(|| -> anyhow::Result<()> { anyhow::bail!("disk on fire") }),
        )
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/boom");
    let err = resolution.unwrap_err();
    assert!(err.downcast_ref::<ApiError>().is_none());
    assert_eq!(err.to_string(), "disk on fire");
}

#[test]
fn test_failing_child_factory() {
    let root = Controller::builder()
        .try_child("broken", || anyhow::bail!("not today"))
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/broken/anything");
    let err = resolution.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::ChildControllerInvalid { .. })
    ));
}

#[test]
fn test_status_reaches_router() {
    let root = Controller::builder()
        .child("child", || {
            Controller::builder()
                .status(Status::CREATED)
                .endpoint(Method::POST, "create", constant("made"))
                .build()
        })
        .build();
    let (router, resolution) = resolve(root, Method::POST, "/child/create");
    invoked(resolution);
    assert_eq!(router.status(), Some(Status::CREATED));
}

#[test]
fn test_no_status_by_default() {
    let root = Controller::builder()
        .endpoint(Method::GET, "plain", constant("plain"))
        .build();
    let (router, resolution) = resolve(root, Method::GET, "/plain");
    invoked(resolution);
    assert_eq!(router.status(), None);
}

#[test]
fn test_hidden_endpoint_still_resolves() {
    let root = Controller::builder()
        .endpoint(Method::GET, "secret", constant("psst"))
        .hide("getSecretEndpoint")
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/secret");
    assert_eq!(value(&invoked(resolution)), &json!("psst"));
}

#[test]
fn test_parameters_from_folded_url_pairs() {
    let root = Controller::builder()
        .child("users", || {
            Controller::builder()
                .child("42", || {
                    Controller::builder()
                        .index(
                            Method::GET,
                            Endpoint::new(|users: String| -> anyhow::Result<String> {
                                Ok(users)
                            })
                            .param("users"),
                        )
                        .build()
                })
                .build()
        })
        .build();
    let (_, resolution) = resolve(root, Method::GET, "/users/42");
    assert_eq!(value(&invoked(resolution)), &json!("42"));
}
