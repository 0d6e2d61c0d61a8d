use std::env;
use std::path::{Path, PathBuf};

use crate::cli::CommandLine;
use crate::error::Error;

use super::model::{
    DEFAULT_TIMEOUT, Options, OutputOptions, ProbeFlags, RequestOptions, SecurityFlags,
    default_user_agent, parse_duration,
};
use super::probe_config::FileConfig;

pub const CONFIG_FILE_ENV: &str = "PURL_CONFIG";

/// Load the invocation options from the command line and the optional
/// defaults file.
/// The defaults file is read from the path in `PURL_CONFIG` (a `.env` file is
/// honoured, see `main`). Command-line values win over file values, which win
/// over the built-in defaults.
pub fn load_config(cli: CommandLine) -> Result<Options, Error> {
    let file = match env::var_os(CONFIG_FILE_ENV) {
        Some(path) => read_config_file(Path::new(&path))?,
        None => FileConfig::default(),
    };
    merge(cli, file)
}

pub fn read_config_file(path: &Path) -> Result<FileConfig, Error> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
    let config: FileConfig = serde_yaml::from_str(&config_str)
        .map_err(|e| Error::config(format!("invalid config {}: {e}", path.display())))?;
    log::debug!("Loaded defaults from {}", path.display());
    Ok(config)
}

pub fn merge(cli: CommandLine, file: FileConfig) -> Result<Options, Error> {
    let file_timeout = file
        .timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| Error::config(format!("timeout: {e}")))?;
    let file_connect_timeout = file
        .connect_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| Error::config(format!("connect_timeout: {e}")))?;

    let request_timeout = cli.timeout.or(file_timeout).unwrap_or(DEFAULT_TIMEOUT);
    let connect_timeout = cli
        .connect_timeout
        .or(file_connect_timeout)
        .unwrap_or(DEFAULT_TIMEOUT);

    let security = SecurityFlags {
        insecure: cli.insecure,
        strict_ssl: cli.strict_ssl || file.strict_ssl.unwrap_or(false),
        ca_cert_path: cli.cacert.or(file.cacert.map(PathBuf::from)),
        cert_path: cli.cert,
        key_path: cli.key,
    };

    let probe = ProbeFlags {
        proto: cli.proto.or(file.proto).unwrap_or_default(),
        security,
        connect_timeout,
        request_timeout,
        user_agent: cli
            .user_agent
            .or(file.user_agent)
            .unwrap_or_else(default_user_agent),
        ..ProbeFlags::default()
    };

    let mut headers = file.headers;
    headers.extend(cli.headers);

    let request = RequestOptions {
        method: cli.method,
        headers,
        data: cli.data,
        data_raw: cli.data_raw,
        user: cli.user,
        cookie: cli.cookie,
        referer: cli.referer,
        head: cli.head,
        json: cli.json,
    };

    let output = OutputOptions {
        verbose: cli.verbose,
        verbose_tls: cli.verbose_tls,
        output: cli.output,
    };

    Ok(Options {
        target: cli.target,
        probe,
        request,
        output,
    })
}
