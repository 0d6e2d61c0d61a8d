use std::time::Duration;

use crate::config::model::ProbeFlags;
use crate::error::Error;
use crate::target::{Endpoint, Scheme};

use super::prelude::*;
use super::trust::resolve;

enum State {
    ManualScheme(Scheme),
    TryingPrimary,
    TryingFallback,
    Done(ProbeResult),
}

/// Works out which scheme the target speaks.
///
/// With a forced `--proto` exactly one attempt is made with the request
/// timeout. Otherwise plain HTTP is tried first and accepted only with a
/// 2xx/3xx status; anything else moves on to HTTPS, whose outcome is final
/// even when it is worse than the HTTP one.
pub async fn detect<D: Dispatcher>(
    dispatcher: &D,
    endpoint: &Endpoint,
    flags: &ProbeFlags,
) -> ProbeResult {
    let mut state = match flags.proto.forced_scheme() {
        Some(scheme) => State::ManualScheme(scheme),
        None => {
            if endpoint.scheme_explicit {
                log::debug!(
                    "Auto mode probes both schemes despite explicit {}://",
                    endpoint.scheme
                );
            }
            State::TryingPrimary
        }
    };

    loop {
        state = match state {
            State::ManualScheme(scheme) => {
                let attempt = attempt(dispatcher, endpoint, flags, scheme, flags.request_timeout);
                State::Done(finish(attempt.await, scheme, endpoint))
            }
            State::TryingPrimary => {
                match attempt(dispatcher, endpoint, flags, Scheme::Http, flags.http_probe_timeout)
                    .await
                {
                    Ok(attempt) if attempt.is_accepted() => State::Done(attempt.into_result(endpoint)),
                    Ok(attempt) => {
                        log::debug!(
                            "HTTP probe not accepted (status {:?}), falling back to HTTPS",
                            attempt.status()
                        );
                        // releases the connection before the next attempt
                        drop(attempt);
                        State::TryingFallback
                    }
                    Err(e) => State::Done(ProbeResult::aborted(Scheme::Http, e)),
                }
            }
            State::TryingFallback => {
                let attempt = attempt(
                    dispatcher,
                    endpoint,
                    flags,
                    Scheme::Https,
                    flags.https_probe_timeout,
                );
                State::Done(finish(attempt.await, Scheme::Https, endpoint))
            }
            State::Done(result) => return result,
        };
    }
}

async fn attempt<D: Dispatcher>(
    dispatcher: &D,
    endpoint: &Endpoint,
    flags: &ProbeFlags,
    scheme: Scheme,
    timeout: Duration,
) -> Result<ProbeAttempt, Error> {
    let trust = resolve(endpoint, &flags.security)?;
    log::debug!(
        "Probing {}://{}{} (timeout {:?}, verify certificates: {})",
        scheme,
        endpoint.authority(),
        endpoint.path,
        timeout,
        !trust.skip_verification
    );

    let attempt = dispatcher.dispatch(endpoint, scheme, trust, timeout).await;
    match &attempt.outcome {
        Outcome::Success { status, .. } => {
            log::debug!("{} probe answered {} in {:?}", scheme.label(), status, attempt.elapsed)
        }
        Outcome::Failure(failure) => log::debug!(
            "{} probe failed after {:?} of {:?} (started {:?} ago): {}",
            attempt.scheme.label(),
            attempt.elapsed,
            attempt.timeout,
            attempt.started_at.elapsed(),
            failure.description
        ),
    }
    Ok(attempt)
}

fn finish(attempt: Result<ProbeAttempt, Error>, scheme: Scheme, endpoint: &Endpoint) -> ProbeResult {
    match attempt {
        Ok(attempt) => attempt.into_result(endpoint),
        Err(e) => ProbeResult::aborted(scheme, e),
    }
}
