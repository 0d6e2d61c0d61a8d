use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;

use crate::target::{Endpoint, Scheme};

use super::report;
use super::result::{Outcome, ProbeAttempt, TransportFailure};
use super::trust::TrustPolicy;

/// Executes a single probe attempt.
pub trait Dispatcher {
    fn dispatch(
        &self,
        endpoint: &Endpoint,
        scheme: Scheme,
        trust: TrustPolicy,
        timeout: Duration,
    ) -> impl Future<Output = ProbeAttempt>;
}

/// Builds a client for one exchange. Nothing is pooled across calls.
pub fn build_client(
    trust: TrustPolicy,
    user_agent: &str,
    connect_timeout: Duration,
    timeout: Duration,
    tls_info: bool,
) -> Result<Client, reqwest::Error> {
    trust
        .apply(Client::builder())
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .pool_max_idle_per_host(0)
        .tls_info(tls_info)
        .user_agent(user_agent)
        .build()
}

/// Picks the budget a timed-out exchange ran into. A connect error only
/// counts against the connect budget when that one is the tighter of the two.
pub fn timeout_budget(
    connect: bool,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> (&'static str, Duration) {
    if connect && connect_timeout < request_timeout {
        ("connect", connect_timeout)
    } else {
        ("request", request_timeout)
    }
}

/// Flattens a reqwest error, dropping the URL so that hostnames do not
/// leak into classification.
pub fn transport_failure(
    err: reqwest::Error,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> TransportFailure {
    let timed_out = err.is_timeout();
    let (phase, budget) = timeout_budget(err.is_connect(), connect_timeout, request_timeout);
    let err = err.without_url();
    TransportFailure {
        description: report(&err),
        timed_out,
        phase,
        budget,
    }
}

/// Sends a HEAD request over reqwest.
pub struct HttpDispatcher {
    user_agent: String,
}

impl HttpDispatcher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    async fn head(
        &self,
        endpoint: &Endpoint,
        scheme: Scheme,
        trust: TrustPolicy,
        timeout: Duration,
    ) -> Outcome {
        let url = match endpoint.url(scheme) {
            Ok(url) => url,
            Err(e) => {
                return Outcome::Failure(TransportFailure {
                    description: e.to_string(),
                    timed_out: false,
                    phase: "request",
                    budget: timeout,
                });
            }
        };

        let client = match build_client(trust, &self.user_agent, timeout, timeout, false) {
            Ok(client) => client,
            Err(e) => return Outcome::Failure(transport_failure(e, timeout, timeout)),
        };

        match tokio::time::timeout(timeout, client.head(url).send()).await {
            Ok(Ok(response)) => Outcome::Success {
                status: response.status().as_u16(),
                response,
            },
            Ok(Err(e)) => Outcome::Failure(transport_failure(e, timeout, timeout)),
            Err(_) => Outcome::Failure(TransportFailure {
                description: "operation timed out".to_string(),
                timed_out: true,
                phase: "request",
                budget: timeout,
            }),
        }
    }
}

impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        endpoint: &Endpoint,
        scheme: Scheme,
        trust: TrustPolicy,
        timeout: Duration,
    ) -> ProbeAttempt {
        let started_at = Instant::now();
        let outcome = self.head(endpoint, scheme, trust, timeout).await;
        ProbeAttempt {
            scheme,
            timeout,
            started_at,
            elapsed: started_at.elapsed(),
            outcome,
        }
    }
}
