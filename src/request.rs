use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Client, Method, Request, Response};
use url::Url;

use crate::config::model::{ProbeFlags, RequestOptions};
use crate::error::Error;
use crate::http_probe::classify::classify;
use crate::http_probe::dispatch::{build_client, transport_failure};
use crate::http_probe::trust::resolve;
use crate::target::Endpoint;

/// Client for the real exchange, with the same trust rules as the probes
/// but the configured timeouts.
pub fn client(endpoint: &Endpoint, flags: &ProbeFlags, tls_info: bool) -> Result<Client, Error> {
    let trust = resolve(endpoint, &flags.security)?;
    build_client(
        trust,
        &flags.user_agent,
        flags.connect_timeout,
        flags.request_timeout,
        tls_info,
    )
    .map_err(|e| {
        let failure = transport_failure(e, flags.connect_timeout, flags.request_timeout);
        classify(&failure, endpoint)
    })
}

pub fn method(options: &RequestOptions) -> Result<Method, Error> {
    match &options.method {
        Some(name) => Method::from_bytes(name.to_uppercase().as_bytes())
            .map_err(|_| Error::config(format!("invalid request method: {name}"))),
        None if options.data.is_some() || options.data_raw.is_some() => Ok(Method::POST),
        None if options.head => Ok(Method::HEAD),
        None => Ok(Method::GET),
    }
}

/// Collects `Name: Value` headers, later values replacing earlier ones.
pub fn headers(options: &RequestOptions) -> HeaderMap {
    let mut map = HeaderMap::new();
    for raw in &options.headers {
        let Some((name, value)) = raw.split_once(':') else {
            log::warn!("Ignoring malformed header {raw:?}");
            continue;
        };
        match (
            HeaderName::from_bytes(name.trim().as_bytes()),
            HeaderValue::from_str(value.trim()),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => log::warn!("Ignoring invalid header {raw:?}"),
        }
    }

    let mut set = |name: HeaderName, value: &str| match HeaderValue::from_str(value) {
        Ok(value) => {
            map.insert(name, value);
        }
        Err(_) => log::warn!("Ignoring invalid {name} value {value:?}"),
    };
    if let Some(cookie) = &options.cookie {
        set(COOKIE, cookie);
    }
    if let Some(referer) = &options.referer {
        set(REFERER, referer);
    }
    if options.json {
        set(CONTENT_TYPE, "application/json");
        set(ACCEPT, "application/json");
    }
    map
}

pub fn build_request(client: &Client, url: Url, options: &RequestOptions) -> Result<Request, Error> {
    let mut builder = client
        .request(method(options)?, url)
        .headers(headers(options));

    if let Some(body) = options.data_raw.as_ref().or(options.data.as_ref()) {
        builder = builder.body(body.clone());
    }
    if let Some(user) = &options.user {
        builder = match user.split_once(':') {
            Some((name, password)) => builder.basic_auth(name, Some(password)),
            None => builder.basic_auth(user, None::<&str>),
        };
    }

    builder
        .build()
        .map_err(|e| Error::config(format!("failed to build request: {e}")))
}

pub async fn send(
    client: &Client,
    request: Request,
    endpoint: &Endpoint,
    flags: &ProbeFlags,
) -> Result<Response, Error> {
    client
        .execute(request)
        .await
        .map_err(|e| {
            let failure = transport_failure(e, flags.connect_timeout, flags.request_timeout);
            classify(&failure, endpoint)
        })
}
