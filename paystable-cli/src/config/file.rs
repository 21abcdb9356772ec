//! TOML file configuration structures.
//!
//! These structs directly map to the `paystable.toml` file format. Every
//! section and key is optional.

use serde::Deserialize;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: BackendConfig,
    pub display: DisplayConfig,
    pub polling: PollingConfig,
}

/// Merchant backend section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Root URL of the merchant backend API.
    pub url: String,
    /// Upper bound for each backend call, in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000/api/".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Display section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Locale tag for number formatting (`en-US`, `de_CH.UTF-8`, ...). The
    /// system locale is used when absent.
    pub locale: Option<String>,
    pub demo_mode: bool,
}

/// Status polling section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub enabled: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
