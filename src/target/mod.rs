use std::fmt;
use std::net::IpAddr;

use url::Url;

use crate::error::Error;

/// The two schemes a probe can be attempted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scheme::Http => "HTTP",
            Scheme::Https => "HTTPS",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized probe target.
///
/// `scheme` is only a starting point unless `scheme_explicit` is set; the
/// prober decides which scheme is actually used. `path` always starts with
/// `/` and carries the query string, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme_explicit: bool,
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub is_ip_literal: bool,
    username: String,
    password: Option<String>,
}

impl Endpoint {
    /// `host[:port]`, with IPv6 literals bracketed.
    pub fn authority(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        }
    }

    /// Port rendered for error messages, `"unknown"` when none was given.
    pub fn port_label(&self) -> String {
        self.port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Builds the request URL for `scheme`, replacing whatever scheme the
    /// target was written with.
    pub fn url(&self, scheme: Scheme) -> Result<Url, Error> {
        let raw = format!("{}://{}{}", scheme, self.authority(), self.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::malformed_target(&raw, format!("invalid target format: {e}")))?;
        if !self.username.is_empty() {
            // http(s) URLs with a host always accept credentials
            let _ = url.set_username(&self.username);
            let _ = url.set_password(self.password.as_deref());
        }
        Ok(url)
    }
}

/// Parses a target given as a full URL, `host[:port][/path]` or
/// `ip[:port][/path]`.
pub fn normalize(raw: &str) -> Result<Endpoint, Error> {
    if raw.is_empty() {
        return Err(Error::malformed_target(raw, "target cannot be empty"));
    }

    match raw.find("://") {
        Some(idx) => normalize_url(raw, idx),
        None => normalize_bare(raw),
    }
}

fn normalize_url(raw: &str, scheme_end: usize) -> Result<Endpoint, Error> {
    let parsed = Url::parse(raw)
        .map_err(|e| Error::malformed_target(raw, format!("invalid URL: {e}")))?;

    let rest = &raw[scheme_end + 3..];
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map(|(_, hp)| hp)
        .unwrap_or(authority);

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() && !host_port.is_empty() => strip_brackets(h).to_string(),
        _ => return Err(Error::malformed_target(raw, "URL must contain a host")),
    };

    // `Url` drops ports equal to the scheme default; keep what was typed so
    // the port survives a scheme change.
    let port = split_host_port(host_port)
        .and_then(|(_, port)| port)
        .or(parsed.port());

    let mut path = parsed.path().to_string();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }

    Ok(Endpoint {
        scheme_explicit: true,
        scheme: raw[..scheme_end].to_string(),
        is_ip_literal: is_ip_literal(&host),
        host,
        port,
        path,
        username: parsed.username().to_string(),
        password: parsed.password().map(str::to_string),
    })
}

fn normalize_bare(raw: &str) -> Result<Endpoint, Error> {
    let (host_port, path) = match raw.find(['/', '?', '#']) {
        Some(idx) if raw[idx..].starts_with('/') => (&raw[..idx], raw[idx..].to_string()),
        Some(idx) => (&raw[..idx], format!("/{}", &raw[idx..])),
        None => (raw, "/".to_string()),
    };

    let (host, port) = match split_host_port(host_port) {
        Some((host, port)) => (host, port),
        None => (host_port.to_string(), None),
    };

    if host.is_empty() {
        return Err(Error::malformed_target(raw, "target must contain a host"));
    }

    let endpoint = Endpoint {
        scheme_explicit: false,
        scheme: Scheme::Http.to_string(),
        is_ip_literal: is_ip_literal(&host),
        host: strip_brackets(&host).to_string(),
        port,
        path,
        username: String::new(),
        password: None,
    };

    // The placeholder URL has to be valid for any later scheme as well.
    endpoint.url(Scheme::Http).map_err(|e| match e {
        Error::MalformedTarget { message, .. } => Error::malformed_target(raw, message),
        other => other,
    })?;

    Ok(endpoint)
}

/// Splits `host:port` on the last colon outside an IPv6 literal. Returns
/// `None` when the segment does not have that shape; an empty port yields
/// `Some((host, None))`.
fn split_host_port(segment: &str) -> Option<(String, Option<u16>)> {
    let (host, port) = if let Some(inner) = segment.strip_prefix('[') {
        let (host, after) = inner.split_once(']')?;
        (host, after.strip_prefix(':')?)
    } else {
        let (host, port) = segment.rsplit_once(':')?;
        if host.contains(':') {
            return None;
        }
        (host, port)
    };

    if port.is_empty() {
        return Some((host.to_string(), None));
    }
    let port = port.parse::<u16>().ok()?;
    Some((host.to_string(), Some(port)))
}

fn strip_brackets(host: &str) -> &str {
    let host = host.strip_prefix('[').unwrap_or(host);
    host.strip_suffix(']').unwrap_or(host)
}

pub fn is_ip_literal(host: &str) -> bool {
    strip_brackets(host).parse::<IpAddr>().is_ok()
}
