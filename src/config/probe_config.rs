use serde::Deserialize;

use super::model::ProtoMode;

/// Defaults read from the file named by `PURL_CONFIG`.
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Protocol selection, one of `auto`, `http` or `https`.
    pub proto: Option<ProtoMode>,

    /// Overall request timeout, e.g. `10s` or `500ms`.
    pub timeout: Option<String>,

    /// Connect timeout, same format as `timeout`.
    pub connect_timeout: Option<String>,

    /// User-Agent sent with the real request.
    pub user_agent: Option<String>,

    /// Enforce certificate validation for IP targets.
    pub strict_ssl: Option<bool>,

    /// Extra CA bundle to trust.
    pub cacert: Option<String>,

    /// Headers sent before any `-H` given on the command line.
    pub headers: Vec<String>,
}
