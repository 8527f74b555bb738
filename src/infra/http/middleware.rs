use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        if status.is_server_error() {
            error!(
                %method,
                %uri,
                status = status.as_u16(),
                elapsed_ms,
                request_id,
                source,
                detail = messages.join("; "),
                "request failed"
            );
        } else {
            warn!(
                %method,
                %uri,
                status = status.as_u16(),
                elapsed_ms,
                request_id,
                source,
                detail = messages.join("; "),
                "request rejected"
            );
        }
    } else {
        info!(
            %method,
            %uri,
            status = status.as_u16(),
            elapsed_ms,
            request_id,
            "request served"
        );
    }

    response
}
