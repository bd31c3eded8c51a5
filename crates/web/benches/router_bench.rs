use criterion::{Criterion, criterion_group, criterion_main};
use http::Method;
use std::hint::black_box;
use twig_http::handler::StatusHandler;
use twig_web::router::{Router, get, post};

fn router() -> Router {
    let ok = || StatusHandler(http::StatusCode::OK);
    Router::builder()
        .route("/", get(ok()))
        .route("/login", get(ok()).post(ok()))
        .route("/static/<path:.*>", get(ok()))
        .route("/user/<id:[0-9]+>", get(ok()))
        .route("/user/<id:[0-9]+>/posts/", get(ok()))
        .route("/user/<id:[0-9]+>/posts/<post>", get(ok()).post(ok()))
        .route("/search", post(ok()))
        .build()
        .unwrap()
}

fn bench_router_find(c: &mut Criterion) {
    let router = router();

    c.bench_function("find_first_route", |b| {
        b.iter(|| black_box(router.find(black_box("/"), &Method::GET)));
    });

    c.bench_function("find_nested_params", |b| {
        b.iter(|| black_box(router.find(black_box("/user/42/posts/hello%20world"), &Method::POST)));
    });

    c.bench_function("find_not_found", |b| {
        b.iter(|| black_box(router.find(black_box("/missing/page"), &Method::GET)));
    });
}

criterion_group!(benches, bench_router_find);
criterion_main!(benches);
