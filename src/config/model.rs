use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::target::Scheme;

/// Budget for the plain HTTP attempt in auto mode.
pub const AUTO_HTTP_TIMEOUT: Duration = Duration::from_secs(3);
/// Budget for the HTTPS attempt in auto mode.
pub const AUTO_HTTPS_TIMEOUT: Duration = Duration::from_secs(7);
/// Request and connect timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the scheme of a target is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProtoMode {
    /// Try HTTP first and fall back to HTTPS
    #[default]
    Auto,
    /// Use plain HTTP only
    Http,
    /// Use HTTPS only
    Https,
}

impl ProtoMode {
    /// The scheme forced by manual mode, `None` in auto mode.
    pub fn forced_scheme(self) -> Option<Scheme> {
        match self {
            ProtoMode::Auto => None,
            ProtoMode::Http => Some(Scheme::Http),
            ProtoMode::Https => Some(Scheme::Https),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityFlags {
    pub insecure: bool,
    pub strict_ssl: bool,
    pub ca_cert_path: Option<PathBuf>,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

/// Everything the prober needs to know about an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFlags {
    pub proto: ProtoMode,
    pub security: SecurityFlags,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub http_probe_timeout: Duration,
    pub https_probe_timeout: Duration,
    pub user_agent: String,
}

impl Default for ProbeFlags {
    fn default() -> Self {
        Self {
            proto: ProtoMode::Auto,
            security: SecurityFlags::default(),
            connect_timeout: DEFAULT_TIMEOUT,
            request_timeout: DEFAULT_TIMEOUT,
            http_probe_timeout: AUTO_HTTP_TIMEOUT,
            https_probe_timeout: AUTO_HTTPS_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

/// The real request issued once the scheme is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<String>,
    pub data: Option<String>,
    pub data_raw: Option<String>,
    pub user: Option<String>,
    pub cookie: Option<String>,
    pub referer: Option<String>,
    pub head: bool,
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub verbose: bool,
    pub verbose_tls: bool,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub target: String,
    pub probe: ProbeFlags,
    pub request: RequestOptions,
    pub output: OutputOptions,
}

pub fn default_user_agent() -> String {
    format!("purl/{}", env!("CARGO_PKG_VERSION"))
}

/// Parses `500ms`, `10s`, `1.5m`, `1h`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration format: {input}"))?;
    let seconds = match unit {
        "" | "s" => value,
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(format!("invalid duration unit in: {input}")),
    };

    Duration::try_from_secs_f64(seconds).map_err(|_| format!("invalid duration: {input}"))
}
