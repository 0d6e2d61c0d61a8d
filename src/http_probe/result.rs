use std::time::{Duration, Instant};

use crate::error::Error;
use crate::target::{Endpoint, Scheme};

use super::classify::classify;

/// A transport-level failure, flattened with its full cause chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub description: String,
    pub timed_out: bool,
    /// `"connect"` or `"request"`, whichever step the budget bounded.
    pub phase: &'static str,
    pub budget: Duration,
}

pub enum Outcome {
    Success {
        status: u16,
        response: reqwest::Response,
    },
    Failure(TransportFailure),
}

/// One try of one scheme.
pub struct ProbeAttempt {
    pub scheme: Scheme,
    pub timeout: Duration,
    pub started_at: Instant,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl ProbeAttempt {
    pub fn status(&self) -> Option<u16> {
        match &self.outcome {
            Outcome::Success { status, .. } => Some(*status),
            Outcome::Failure(_) => None,
        }
    }

    /// A response without transport error and with a 2xx or 3xx status.
    pub fn is_accepted(&self) -> bool {
        matches!(self.status(), Some(status) if (200..400).contains(&status))
    }

    pub fn into_result(self, endpoint: &Endpoint) -> ProbeResult {
        match self.outcome {
            Outcome::Success { status, response } => ProbeResult {
                protocol: self.scheme,
                status_code: status,
                duration: self.elapsed,
                response: Some(response),
                error: None,
            },
            Outcome::Failure(failure) => ProbeResult {
                protocol: self.scheme,
                status_code: 0,
                duration: self.elapsed,
                response: None,
                error: Some(classify(&failure, endpoint)),
            },
        }
    }
}

pub struct ProbeResult {
    pub protocol: Scheme,
    pub status_code: u16,
    pub duration: Duration,
    pub response: Option<reqwest::Response>,
    pub error: Option<Error>,
}

impl ProbeResult {
    /// A result for an invocation that ended before any request was sent.
    pub fn aborted(protocol: Scheme, error: Error) -> Self {
        Self {
            protocol,
            status_code: 0,
            duration: Duration::ZERO,
            response: None,
            error: Some(error),
        }
    }
}
