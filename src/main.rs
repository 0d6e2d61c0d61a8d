use std::process;

use cli::CommandLine;
use config::app_config::load_config;
use config::model::Options;
use error::{EXIT_SUCCESS, Error};
use http_probe::prelude::*;
use output::Handler;

pub mod cli;
pub mod config;
pub mod error;
pub mod http_probe;
pub mod output;
pub mod request;
pub mod target;

#[cfg(test)]
mod test_support;

fn init_logging() {
    let _ = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .try_init();
}

/// Parse the target, detect the scheme, then perform and print the real
/// request on that scheme.
async fn run(options: &Options) -> Result<(), Error> {
    let endpoint = target::normalize(&options.target)?;

    let dispatcher = HttpDispatcher::new(&options.probe.user_agent);
    let mut result = detect(&dispatcher, &endpoint, &options.probe).await;
    if let Some(err) = result.error.take() {
        return Err(err);
    }
    // the probe exchange is never shown to the user
    result.response = None;
    log::info!(
        "Detected {} for {}",
        result.protocol.label(),
        endpoint.authority()
    );

    let client = request::client(&endpoint, &options.probe, options.output.verbose_tls)?;
    let url = endpoint.url(result.protocol)?;
    let real = request::build_request(&client, url, &options.request)?;

    let handler = Handler::new(&options.output);
    handler.print_request(&real)?;

    let response = request::send(&client, real, &endpoint, &options.probe).await?;
    result.status_code = response.status().as_u16();
    result.response = Some(response);

    handler.write_response(&mut result).await
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_logging();

    let commands = CommandLine::parse_args();
    let exit_code = match load_config(commands) {
        Ok(options) => match run(&options).await {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                eprintln!("purl: {e}");
                e.exit_code()
            }
        },
        Err(e) => {
            eprintln!("purl: {e}");
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
