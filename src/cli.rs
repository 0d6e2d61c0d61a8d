use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::model::{ProtoMode, parse_duration};

#[derive(Debug, Parser)]
#[command(name = "purl")]
#[command(version)]
#[command(about = "curl-compatible HTTP probe with automatic protocol detection.")]
pub struct CommandLine {
    /// Target: URL, host[:port][/path] or ip[:port][/path]
    pub target: String,

    /// Request method (GET, POST, ...)
    #[arg(short = 'X', long = "request")]
    pub method: Option<String>,

    /// Extra header, "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body; implies POST
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Request body sent without interpretation; implies POST
    #[arg(long = "data-raw")]
    pub data_raw: Option<String>,

    /// Basic auth credentials, user:password
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Cookie header value
    #[arg(short = 'b', long)]
    pub cookie: Option<String>,

    /// User-Agent header value
    #[arg(short = 'A', long = "user-agent")]
    pub user_agent: Option<String>,

    /// Referer header value
    #[arg(short = 'e', long)]
    pub referer: Option<String>,

    /// Print request and response headers to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print TLS peer certificate details to stderr
    #[arg(long = "verbose-tls")]
    pub verbose_tls: bool,

    /// Write the body to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Send a HEAD request
    #[arg(short = 'I', long)]
    pub head: bool,

    /// Send and accept JSON
    #[arg(long)]
    pub json: bool,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// CA bundle (PEM) to verify the peer against
    #[arg(long, value_name = "FILE")]
    pub cacert: Option<PathBuf>,

    /// Client certificate (PEM)
    #[arg(long, value_name = "FILE")]
    pub cert: Option<PathBuf>,

    /// Client private key (PEM)
    #[arg(long, value_name = "FILE")]
    pub key: Option<PathBuf>,

    /// Verify certificates even for IP targets
    #[arg(long = "strict-ssl")]
    pub strict_ssl: bool,

    /// Protocol selection
    #[arg(long, value_enum)]
    pub proto: Option<ProtoMode>,

    /// Maximum time for the whole operation (10s, 500ms, 1m)
    #[arg(long, visible_alias = "max-time", short = 'm', value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Maximum time for connection establishment
    #[arg(long = "connect-timeout", value_parser = parse_duration)]
    pub connect_timeout: Option<Duration>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    fn parse(args: &[&str]) -> CommandLine {
        CommandLine::try_parse_from(std::iter::once("purl").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn test_target_only() {
        let cli = parse(&["192.168.1.1:8080/api"]);
        assert_eq!(cli.target, "192.168.1.1:8080/api");
        assert_eq!(cli.proto, None);
        assert!(cli.headers.is_empty());
    }

    #[test]
    fn test_short_and_long_flags() {
        let cli = parse(&[
            "-X",
            "put",
            "-H",
            "Accept: text/plain",
            "--header",
            "X-Trace: 1",
            "-d",
            "a=1",
            "-k",
            "--proto",
            "https",
            "--timeout",
            "5s",
            "--connect-timeout=250ms",
            "example.com",
        ]);
        assert_eq!(cli.method.as_deref(), Some("put"));
        assert_eq!(cli.headers, vec!["Accept: text/plain", "X-Trace: 1"]);
        assert_eq!(cli.data.as_deref(), Some("a=1"));
        assert!(cli.insecure);
        assert_eq!(cli.proto, Some(ProtoMode::Https));
        assert_eq!(cli.timeout, Some(Duration::from_secs(5)));
        assert_eq!(cli.connect_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_max_time_alias() {
        let cli = parse(&["--max-time", "2", "example.com"]);
        assert_eq!(cli.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = CommandLine::try_parse_from(["purl", "--frobnicate", "example.com"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_invalid_proto_is_rejected() {
        assert!(CommandLine::try_parse_from(["purl", "--proto", "ftp", "example.com"]).is_err());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        assert!(CommandLine::try_parse_from(["purl", "--timeout", "soon", "example.com"]).is_err());
    }
}
