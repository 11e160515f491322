use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ProxyError;
use crate::identity::resolve_identifier;
use crate::metrics::{QUOTA_DENIED, QUOTA_RECORDS, REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_FAILURES};
use crate::models::{PromptRequest, ProxyResponse};
use crate::rate_limit::Admission;
use crate::state::AppState;

pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

// Body must be JSON with a non-empty string `prompt`
fn parse_prompt(body: &[u8]) -> Result<PromptRequest, ProxyError> {
    let missing = || ProxyError::Validation("Missing prompt parameter".to_string());

    let request: PromptRequest = serde_json::from_slice(body).map_err(|_| missing())?;
    match request.prompt.as_deref() {
        Some(p) if !p.is_empty() => Ok(request),
        _ => Err(missing()),
    }
}

fn apply_quota_headers(response: &mut Response, limit: u32, remaining: u32) {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
}

// Denied requests become QuotaExceeded; admitted ones are validated, then sent upstream
async fn admit_and_forward(
    state: &AppState,
    identifier: &str,
    admission: Admission,
    body: Result<Bytes, BytesRejection>,
) -> Result<ProxyResponse, ProxyError> {
    let limit = state.ledger.limit();

    if !admission.allowed {
        QUOTA_DENIED.inc();
        info!(identifier, limit, "Quota exhausted, request denied");
        return Err(ProxyError::QuotaExceeded {
            limit,
            reset_time: admission.reset_time.unwrap_or_else(chrono::Utc::now),
        });
    }

    let body = body.map_err(|rejection| {
        debug!(identifier, error = %rejection, "Request body rejected");
        ProxyError::Body(rejection.status())
    })?;
    let request = parse_prompt(&body).inspect_err(|_| {
        debug!(identifier, "Rejected request without prompt");
    })?;
    if request.include_history {
        debug!(identifier, "includeHistory set; history is assembled by the client");
    }
    let prompt = request.prompt.as_deref().unwrap_or_default();

    let text = state.gateway.forward(prompt).await.map_err(|e| {
        UPSTREAM_FAILURES.inc();
        warn!(identifier, error = %e, "Upstream call failed");
        ProxyError::from(e)
    })?;

    Ok(ProxyResponse::new(text, admission.remaining, limit))
}

// post handler
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let identifier = resolve_identifier(&headers);

    let admission = state.ledger.check_and_admit(&identifier);
    QUOTA_RECORDS.set(state.ledger.len() as f64);

    let mut response = match admit_and_forward(&state, &identifier, admission, body).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    };
    apply_quota_headers(&mut response, state.ledger.limit(), admission.remaining);

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    response
}

// plain OPTIONS; CORS preflights are answered by the cors layer
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}
