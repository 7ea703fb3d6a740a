use std::sync::Arc;

use crate::config::Config;
use crate::conversion::Converter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Provider, template and attachment mode, fixed at startup.
    pub converter: Arc<Converter>,
}
