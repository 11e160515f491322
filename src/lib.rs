//! Quota-gated proxy in front of the Gemini `generateContent` API.
//!
//! A request is resolved to a client identifier, admitted or denied by the
//! in-memory [`rate_limit::QuotaLedger`], and, when admitted, forwarded to
//! the provider by [`upstream::GeminiClient`] with the server-held key.

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod upstream;
