use http::{HeaderMap, HeaderValue, StatusCode, header};
use tokio::io::AsyncWriteExt;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;
use twig_http::handler::handler_fn;
use twig_web::router::{any, get};
use twig_web::{HostRouter, Router, Server};

fn text_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    let router = Router::builder()
        .route(
            "/",
            get(handler_fn(|req| {
                Box::pin(async move {
                    if let Some(mut body) = req.respond(StatusCode::OK, text_headers()).await {
                        let _ = body.write_all(b"hello world\r\n").await;
                    }
                })
            })),
        )
        // curl -v http://127.0.0.1:8080/hello/twig
        .route(
            "/hello/<name>",
            get(handler_fn(|req| {
                Box::pin(async move {
                    let text = format!("hello {}\r\n", req.params().get("name").unwrap_or_default());
                    if let Some(mut body) = req.respond(StatusCode::OK, text_headers()).await {
                        let _ = body.write_all(text.as_bytes()).await;
                    }
                })
            })),
        )
        // curl -v -d 'ping' http://127.0.0.1:8080/echo/
        .route(
            "/echo/",
            any(handler_fn(|req| {
                Box::pin(async move {
                    let payload = match req.read_body(64 * 1024).await {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!(cause = %e, "can't read request body");
                            req.error(StatusCode::BAD_REQUEST).await;
                            return;
                        }
                    };
                    if let Some(mut body) = req.respond(StatusCode::OK, text_headers()).await {
                        let _ = body.write_all(&payload).await;
                    }
                })
            })),
        )
        .route("/old", get(handler_fn(|req| Box::pin(async move { req.redirect("hello/again", true).await }))))
        .build();

    let router = match router {
        Ok(router) => router,
        Err(e) => {
            error!(cause = %e, "invalid routes");
            return;
        }
    };

    // curl -v http://localhost:8080/hello/twig
    let host_router = HostRouter::builder().route("<host:localhost|127\\.0\\.0\\.1>:8080", router).build();
    let host_router = match host_router {
        Ok(host_router) => host_router,
        Err(e) => {
            error!(cause = %e, "invalid host routes");
            return;
        }
    };

    let server = match Server::builder().address("127.0.0.1:8080").handler(host_router).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "can't build server");
            return;
        }
    };

    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped");
    }
}
