mod health;
mod upload;

use crate::server::SharedState;
use axum::{routing::get, Router};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(upload::upload_form).post(upload::submit_upload))
        .route("/health", get(health::healthcheck))
}
