//! Runtime configuration, resolved from the file and command line.

use paystable_core::config::FlowConfig;
use paystable_sdk::fiat::NumberLocale;
use url::Url;

/// Everything the commands need, validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: Url,
    pub locale: NumberLocale,
    pub flow: FlowConfig,
}
