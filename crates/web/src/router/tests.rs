use std::sync::Arc;

use http::{HeaderMap, HeaderValue, Method, StatusCode};
use indoc::indoc;
use tokio::io::AsyncWriteExt;
use twig_http::handler::{Handler, handler_fn};

use super::{MethodHandlers, RouteMatch, Router, any, delete, get, on, post};
use crate::RouteError;
use crate::test_io::serve;

// Answers with `x-route: <tag>` and a body listing the params it received.
fn echo(tag: &'static str) -> impl Handler {
    handler_fn(move |req| {
        Box::pin(async move {
            let mut params = req.params().iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>();
            params.sort();
            let text = format!("{tag} {}", params.join("&"));

            let mut headers = HeaderMap::new();
            headers.insert("x-route", HeaderValue::from_static(tag));
            if let Some(mut body) = req.respond(StatusCode::OK, headers).await {
                body.write_all(text.as_bytes()).await.unwrap();
            }
        })
    })
}

fn router() -> Router {
    Router::builder()
        .route("/user/<id:[0-9]+>", get(echo("user")))
        .route("/files/", any(echo("files")))
        .route("/doc/<name>", get(echo("doc-get")).post(echo("doc-post")))
        .route("/item/<id>", get(echo("item-get")).any(echo("item-any")))
        .route("/<section>/<page>", get(echo("page")))
        .build()
        .unwrap()
}

#[test]
fn find_outcomes() {
    let router = router();
    assert_eq!(router.len(), 5);

    match router.find("/user/42", &Method::GET) {
        RouteMatch::Found { params, .. } => assert_eq!(params, vec![("id", "42".to_string())]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(router.find("/files", &Method::GET), RouteMatch::AddSlash));
    assert!(matches!(router.find("/files/", &Method::PUT), RouteMatch::Found { .. }));
    assert!(matches!(router.find("/doc/a", &Method::PUT), RouteMatch::MethodNotAllowed));
    assert!(matches!(router.find("/a/b/c", &Method::GET), RouteMatch::NotFound));
}

#[test]
fn first_registered_route_wins() {
    let router = router();
    // `/user/abc` skips the numeric route and lands on the generic one
    match router.find("/user/abc", &Method::GET) {
        RouteMatch::Found { params, .. } => {
            assert_eq!(params, vec![("section", "user".to_string()), ("page", "abc".to_string())]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn method_not_allowed_stops_the_search() {
    let router = Router::builder()
        .route("/a", get(echo("first")))
        .route("/a", post(echo("second")))
        .build()
        .unwrap();
    assert!(matches!(router.find("/a", &Method::POST), RouteMatch::MethodNotAllowed));
}

#[test]
fn params_are_unescaped() {
    let router = router();
    match router.find("/doc/hello%20world", &Method::GET) {
        RouteMatch::Found { params, .. } => assert_eq!(params, vec![("name", "hello world".to_string())]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(router.find("/doc/bad%zz", &Method::GET), RouteMatch::NotFound));
}

#[test]
fn invalid_registrations() {
    let err = Router::builder().route("user", get(echo("x"))).build().unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { pattern } if pattern == "user"));

    let err = Router::builder().route("/user", MethodHandlers::new()).build().unwrap_err();
    assert!(matches!(err, RouteError::NoHandlers { .. }));

    let err = Router::builder().route("/user/<id:(>", get(echo("x"))).build().unwrap_err();
    assert!(matches!(err, RouteError::InvalidRegex { .. }));
}

#[test]
fn handler_table_debug_lists_methods() {
    let handlers = on(Method::PUT, echo("x")).get(echo("y")).any(echo("z"));
    assert_eq!(format!("{handlers:?}"), r#"MethodHandlers { methods: ["GET", "PUT", "*"] }"#);
}

#[tokio::test]
async fn path_parameter_reaches_handler() {
    let output = serve(router(), "GET /user/42 HTTP/1.1\nHost: localhost\n\n").await;

    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("x-route: user\r\n"));
    assert!(output.contains("user id=42"));
}

#[tokio::test]
async fn unmatched_path_is_not_found() {
    let router = Router::builder().route("/user/<id:[0-9]+>", get(echo("user"))).build().unwrap();
    let output = serve(router, "GET /user/abc HTTP/1.1\n\n").await;

    assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(!output.contains("x-route"));
}

#[tokio::test]
async fn missing_trailing_slash_redirects() {
    let output = serve(router(), "GET /files?q=1 HTTP/1.1\n\n").await;

    assert!(output.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
    assert!(output.contains("location: /files/?q=1\r\n"));
    assert!(!output.contains("x-route"));
}

#[tokio::test]
async fn redirect_without_query() {
    // the redirect wins even when no handler exists for the method
    let router = Router::builder().route("/files/", get(echo("files"))).build().unwrap();
    let output = serve(router, "DELETE /files HTTP/1.1\n\n").await;

    assert!(output.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
    assert!(output.contains("location: /files/\r\n"));
}

#[tokio::test]
async fn unregistered_method_is_rejected() {
    let output = serve(router(), "PUT /doc/readme HTTP/1.1\n\n").await;
    assert!(output.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
}

#[tokio::test]
async fn wildcard_handles_other_methods() {
    let router = Router::builder()
        .route("/item/<id>", get(echo("item-get")).any(echo("item-any")))
        .route("/remove/<id>", delete(echo("remove")))
        .build()
        .unwrap();
    let input = indoc! {"
        DELETE /item/7 HTTP/1.1

        DELETE /remove/7 HTTP/1.1

    "};
    let output = serve(router, input).await;

    assert!(output.contains("item-any id=7"));
    assert!(output.contains("remove id=7"));
}

#[tokio::test]
async fn head_falls_back_to_get() {
    let output = serve(router(), "HEAD /doc/readme HTTP/1.1\n\n").await;

    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("x-route: doc-get\r\n"));
    assert!(!output.contains("doc-get name=readme"));
}

#[tokio::test]
async fn bad_escape_is_not_found() {
    let output = serve(router(), "GET /doc/%zz HTTP/1.1\n\n").await;
    assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn captured_params_overwrite_existing_ones() {
    let inner = Arc::new(Router::builder().route("/<id>", get(echo("inner"))).build().unwrap());
    let outer = handler_fn(move |req| {
        let inner = inner.clone();
        Box::pin(async move {
            req.params_mut().insert("id", "outer");
            req.params_mut().insert("keep", "yes");
            inner.call(req).await;
        })
    });
    let output = serve(outer, "GET /9 HTTP/1.1\n\n").await;

    assert!(output.contains("inner id=9&keep=yes"));
}
