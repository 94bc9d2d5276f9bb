//! A timing wrapper, three logging markers and a one-line endpoint.
//!
//! Run with:
//!   cargo run --example app
//!
//! Then `curl http://localhost:3000/` and watch the log nest:
//!
//! ```text
//! 中间件1 doSoming
//! 中间件2 doSoming
//! 中间件3 doSoming
//! 中间件3 end
//! 中间件2 end
//! 中间件1 end
//! / start: 1700000000000 end: 1700000000001 loading: 1
//! ```

use onion::middleware::{Marker, Timing};
use onion::{Pipeline, Server, endpoint_fn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Pipeline::builder()
        .wrap(Timing::new())
        .wrap(Marker::new("中间件1 doSoming", "中间件1 end"))
        .wrap(Marker::new("中间件2 doSoming", "中间件2 end"))
        .wrap(Marker::new("中间件3 doSoming", "中间件3 end"))
        .endpoint(endpoint_fn(|ctx| Box::pin(async move {
            ctx.text("hello wordl!");
            Ok(())
        })));

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_owned());

    Server::bind(&format!("0.0.0.0:{port}"))
        .serve(app)
        .await
        .expect("server error");
}
