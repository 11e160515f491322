use std::sync::Arc;
use crate::rate_limit::QuotaLedger;
use crate::upstream::GeminiClient;
// app's shared state

pub struct AppState {
    pub ledger: Arc<QuotaLedger>, // shared with the background sweeper
    pub gateway: GeminiClient,
}

impl AppState {
    pub fn new(ledger: Arc<QuotaLedger>, gateway: GeminiClient) -> Arc<Self> {
        Arc::new(Self { ledger, gateway })
    }
}
