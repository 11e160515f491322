use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tracing::warn;

use crate::models::ErrorBody;
use crate::upstream::GatewayError;

/// Every way a generate request can fail; rendered once at the handler boundary.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("request body rejected with {0}")]
    Body(StatusCode),

    #[error("quota of {limit} requests exhausted until {reset_time}")]
    QuotaExceeded {
        limit: u32,
        reset_time: DateTime<Utc>,
    },

    #[error("server is missing its provider credential")]
    Configuration,

    #[error("upstream returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream response could not be read")]
    Extraction,

    #[error("upstream unreachable: {0}")]
    Transport(String),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl From<GatewayError> for ProxyError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingCredential => ProxyError::Configuration,
            GatewayError::Status { status, message } => ProxyError::Upstream { status, message },
            GatewayError::Extraction => ProxyError::Extraction,
            GatewayError::Transport(e) => {
                if e.is_timeout() {
                    warn!("Upstream call timed out");
                }
                ProxyError::Transport(e.to_string())
            }
        }
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Body(status) if status.is_client_error() => *status,
            ProxyError::Body(_) => StatusCode::BAD_REQUEST,
            ProxyError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Upstream { status, .. }
                if status.is_client_error() || status.is_server_error() =>
            {
                *status
            }
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ProxyError::Validation(reason) => ErrorBody::new(reason.clone()),
            ProxyError::Body(status) if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                ErrorBody::new("Request body too large")
            }
            ProxyError::Body(_) => ErrorBody::new("Request body could not be read"),
            ProxyError::QuotaExceeded { limit, reset_time } => ErrorBody {
                reset_time: Some(reset_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ..ErrorBody::new("Usage limit exceeded")
                    .with_message(format!("Daily limit of {limit} requests reached"))
            },
            ProxyError::Configuration => ErrorBody::new("Server configuration error"),
            ProxyError::Upstream { message, .. } => ErrorBody {
                details: Some(message.clone()),
                ..ErrorBody::new("AI service temporarily unavailable")
            },
            ProxyError::Extraction => ErrorBody::new("Unexpected AI response")
                .with_message("The AI service returned no usable text"),
            ProxyError::Transport(_) => ErrorBody::new("Server error")
                .with_message("Could not reach the AI service"),
            ProxyError::MethodNotAllowed => ErrorBody::new("Method not allowed"),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ProxyError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::Configuration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ProxyError::Extraction.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ProxyError::Transport("refused".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ProxyError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn body_rejection_keeps_client_status() {
        let too_large = ProxyError::Body(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.body().error, "Request body too large");

        let broken = ProxyError::Body(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(broken.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_status_forwarded_only_when_an_error_code() {
        let overloaded = ProxyError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "overloaded".into(),
        };
        assert_eq!(overloaded.status(), StatusCode::SERVICE_UNAVAILABLE);

        let redirect = ProxyError::Upstream {
            status: StatusCode::FOUND,
            message: "moved".into(),
        };
        assert_eq!(redirect.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn quota_body_carries_iso_reset_time() {
        let reset_time = DateTime::from_timestamp(1_700_086_400, 0).unwrap();
        let body = ProxyError::QuotaExceeded { limit: 50, reset_time }.body();

        assert_eq!(body.reset_time.as_deref(), Some("2023-11-15T22:13:20.000Z"));
        assert!(body.message.unwrap().contains("50"));
    }

    #[test]
    fn transport_detail_stays_in_logs() {
        let body = ProxyError::Transport("tcp connect error 10.1.2.3:443".into()).body();
        let rendered = serde_json::to_string(&body).unwrap();
        assert!(!rendered.contains("10.1.2.3"));
    }

    #[test]
    fn extraction_is_distinct_from_other_500s() {
        let extraction = ProxyError::Extraction.body().error;
        assert_ne!(extraction, ProxyError::Configuration.body().error);
        assert_ne!(extraction, ProxyError::Transport(String::new()).body().error);
    }
}
