pub mod tls;

use std::fs::File;
use std::io::{self, Write};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Request, Response};

use crate::config::model::OutputOptions;
use crate::error::Error;
use crate::http_probe::result::ProbeResult;

/// `[HTTPS] Status: 200 Time: 35ms`
pub fn status_line(result: &ProbeResult) -> String {
    format!(
        "[{}] Status: {} Time: {}",
        result.protocol.label(),
        result.status_code,
        format_duration(result.duration)
    )
}

pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    if d < Duration::from_millis(1) {
        return format!("{}µs", d.as_micros());
    }
    if d < Duration::from_secs(1) {
        return format!("{}ms", d.as_millis());
    }
    if d.subsec_nanos() == 0 {
        return format!("{}s", d.as_secs());
    }
    format!("{:.2}s", d.as_secs_f64())
}

fn header_lines(prefix: &str, headers: &HeaderMap, redact: bool) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if redact && name == AUTHORIZATION {
                "[REDACTED]".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            format!("{prefix} {name}: {value}")
        })
        .collect()
}

pub fn request_lines(request: &Request) -> Vec<String> {
    let url = request.url();
    let target = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let mut lines = vec![format!(
        "> {} {} {:?}",
        request.method(),
        target,
        request.version()
    )];
    lines.push(format!("> host: {}", url.authority()));
    lines.extend(header_lines(">", request.headers(), true));
    lines.push(">".to_string());
    lines
}

pub fn response_lines(response: &Response) -> Vec<String> {
    let status = response.status();
    let mut lines = vec![format!(
        "< {:?} {} {}",
        response.version(),
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )];
    lines.extend(header_lines("<", response.headers(), false));
    lines.push("<".to_string());
    lines
}

/// Writes the outcome of an invocation: the status line on stdout,
/// diagnostics on stderr and the body to stdout or the output file.
pub struct Handler<'a> {
    options: &'a OutputOptions,
}

impl<'a> Handler<'a> {
    pub fn new(options: &'a OutputOptions) -> Self {
        Self { options }
    }

    pub fn print_request(&self, request: &Request) -> io::Result<()> {
        if !self.options.verbose {
            return Ok(());
        }
        write_lines(&mut io::stderr().lock(), &request_lines(request))
    }

    pub async fn write_response(&self, result: &mut ProbeResult) -> Result<(), Error> {
        writeln!(io::stdout().lock(), "{}", status_line(result))?;

        let Some(mut response) = result.response.take() else {
            return Ok(());
        };

        if self.options.verbose {
            write_lines(&mut io::stderr().lock(), &response_lines(&response))?;
        }
        if self.options.verbose_tls {
            let peer = response
                .extensions()
                .get::<reqwest::tls::TlsInfo>()
                .and_then(|info| info.peer_certificate());
            write_lines(
                &mut io::stderr().lock(),
                &tls::certificate_lines(peer, chrono::Utc::now()),
            )?;
        }

        let mut sink: Box<dyn Write> = match &self.options.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout().lock()),
        };
        while let Some(chunk) = response.chunk().await.map_err(io::Error::other)? {
            sink.write_all(&chunk)?;
        }
        sink.flush()?;
        Ok(())
    }
}

fn write_lines<W: Write>(w: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(w, "{line}")?;
    }
    Ok(())
}
