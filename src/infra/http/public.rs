//! Public query endpoint.
//!
//! The single integration point between front-end traffic and the
//! interceptor: `POST /query` takes a JSON query descriptor and returns
//! the (possibly cached) result set.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;

use crate::application::error::HttpError;
use crate::cache::QueryInterceptor;
use crate::domain::query::QueryDescriptor;

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub interceptor: Arc<QueryInterceptor>,
}

#[derive(Serialize)]
struct QueryResponse {
    outcome: &'static str,
    found: usize,
    records: Vec<serde_json::Value>,
}

pub fn build_public_router(state: HttpState) -> Router {
    Router::new()
        .route("/query", post(run_query))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn run_query(
    State(state): State<HttpState>,
    Json(descriptor): Json<QueryDescriptor>,
) -> Response {
    match state.interceptor.run(&descriptor).await {
        Ok(interception) => Json(QueryResponse {
            outcome: interception.outcome.as_str(),
            found: interception.records.len(),
            records: interception.records,
        })
        .into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
