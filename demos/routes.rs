//! Route dispatch behind the timing wrapper.
//!
//! Run with:
//!   cargo run --example routes
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/home
//!   curl http://localhost:3000/404        ← a registered route, 200
//!   curl -i http://localhost:3000/nope    ← the router's own 404
//!   curl -I http://localhost:3000/home           ← HEAD, served by the GET route
//!   curl -i -X POST http://localhost:3000/home   ← 405, Allow: GET, HEAD

use onion::middleware::Timing;
use onion::{Html, Pipeline, Request, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let routes = Router::new()
        .get("/",     index)
        .get("/home", home)
        .get("/404",  not_found_page);

    let app = Pipeline::builder()
        .wrap(Timing::new())
        .endpoint(routes);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_owned());

    Server::bind(&format!("0.0.0.0:{port}"))
        .serve(app)
        .await
        .expect("server error");
}

async fn index(_req: Request) -> Html<&'static str> {
    Html("<h1>index page</h1>")
}

async fn home(_req: Request) -> Html<&'static str> {
    Html("<h1>HOME page</h1>")
}

async fn not_found_page(_req: Request) -> Html<&'static str> {
    Html("<h1>404 page</h1>")
}
