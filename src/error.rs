use std::time::Duration;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_UNRECOGNIZED_CONFIGURATION: i32 = 2;
pub const EXIT_MALFORMED_TARGET: i32 = 3;
pub const EXIT_NO_ROUTE: i32 = 6;
pub const EXIT_CONNECT_FAILED: i32 = 7;
pub const EXIT_TIMEOUT: i32 = 28;
pub const EXIT_TLS: i32 = 35;

/// The user-facing failure categories. Each maps onto one curl-compatible
/// process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedTarget,
    TlsConfiguration,
    Timeout,
    ConnectionRefused,
    NoRoute,
    TlsFailure,
    UnrecognizedConfiguration,
    Output,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::MalformedTarget => EXIT_MALFORMED_TARGET,
            ErrorKind::TlsConfiguration | ErrorKind::TlsFailure => EXIT_TLS,
            ErrorKind::Timeout => EXIT_TIMEOUT,
            ErrorKind::ConnectionRefused => EXIT_CONNECT_FAILED,
            ErrorKind::NoRoute => EXIT_NO_ROUTE,
            ErrorKind::UnrecognizedConfiguration => EXIT_UNRECOGNIZED_CONFIGURATION,
            // write failures share the generic connect-failure code
            ErrorKind::Output => EXIT_CONNECT_FAILED,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("URL parse error: {message} (input: {input})")]
    MalformedTarget { input: String, message: String },

    #[error("TLS configuration error: {0}")]
    TlsConfiguration(String),

    #[error("timeout during {phase} phase after {}", humanize(.budget))]
    Timeout { phase: &'static str, budget: Duration },

    #[error("connection error to {host}:{port}: {cause}")]
    ConnectionRefused {
        host: String,
        port: String,
        cause: String,
    },

    #[error("no route to host {host}: {cause}")]
    NoRoute { host: String, cause: String },

    #[error("TLS error for {host}: {cause}")]
    TlsFailure { host: String, cause: String },

    #[error("unrecognized configuration: {0}")]
    UnrecognizedConfiguration(String),

    #[error("failed to write response: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    pub fn malformed_target(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedTarget {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn tls_config(msg: impl Into<String>) -> Self {
        Self::TlsConfiguration(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::UnrecognizedConfiguration(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedTarget { .. } => ErrorKind::MalformedTarget,
            Error::TlsConfiguration(_) => ErrorKind::TlsConfiguration,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::ConnectionRefused { .. } => ErrorKind::ConnectionRefused,
            Error::NoRoute { .. } => ErrorKind::NoRoute,
            Error::TlsFailure { .. } => ErrorKind::TlsFailure,
            Error::UnrecognizedConfiguration(_) => ErrorKind::UnrecognizedConfiguration,
            Error::Output(_) => ErrorKind::Output,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

fn humanize(d: &Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}
