use std::sync::Arc;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::config::Config;
use crate::quota::UsageLedger;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable analyzer. Production: `GroqAnalyzer`; tests substitute a stub.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub ledger: UsageLedger,
    pub config: Config,
}
