use crate::error::Error;
use crate::target::Endpoint;

use super::result::TransportFailure;

const REFUSED_MARKERS: &[&str] = &["connection refused", "actively refused"];

const NO_ROUTE_MARKERS: &[&str] = &[
    "no such host",
    "name resolution",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no address associated",
    "no route to host",
    "network is unreachable",
];

const TLS_MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake", "corrupt message"];

/// Maps a transport failure onto the user-facing taxonomy.
///
/// Matching is done on the lower-cased cause chain, so it depends on how the
/// underlying transport words its errors. Unknown failures fall through to a
/// generic connection error.
pub fn classify(failure: &TransportFailure, endpoint: &Endpoint) -> Error {
    if failure.timed_out {
        return Error::Timeout {
            phase: failure.phase,
            budget: failure.budget,
        };
    }

    let text = failure.description.to_lowercase();
    let matches = |markers: &[&str]| markers.iter().any(|m| text.contains(m));
    let cause = failure.description.clone();

    if matches(REFUSED_MARKERS) {
        return Error::ConnectionRefused {
            host: endpoint.host.clone(),
            port: endpoint.port_label(),
            cause,
        };
    }
    if matches(NO_ROUTE_MARKERS) {
        return Error::NoRoute {
            host: endpoint.host.clone(),
            cause,
        };
    }
    if matches(TLS_MARKERS) {
        return Error::TlsFailure {
            host: endpoint.host.clone(),
            cause,
        };
    }

    Error::ConnectionRefused {
        host: endpoint.host.clone(),
        port: endpoint.port_label(),
        cause,
    }
}

#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use super::*;
    use crate::error::ErrorKind;
    use crate::target::normalize;

    fn failure(description: &str) -> TransportFailure {
        TransportFailure {
            description: description.to_string(),
            timed_out: false,
            phase: "request",
            budget: Duration::from_secs(3),
        }
    }

    fn endpoint() -> Endpoint {
        normalize("example.com:8443/").expect("valid target")
    }

    #[test]
    fn test_timeout_wins_over_text() {
        let mut f = failure("connection refused");
        f.timed_out = true;
        let err = classify(&f, &endpoint());
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "timeout during request phase after 3s");
    }

    #[test]
    fn test_connect_timeout_keeps_its_own_budget() {
        let f = TransportFailure {
            timed_out: true,
            phase: "connect",
            budget: Duration::from_secs(1),
            ..failure("client error (Connect): operation timed out")
        };
        let err = classify(&f, &endpoint());
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "timeout during connect phase after 1s");
    }

    #[test]
    fn test_connection_refused() {
        let err = classify(
            &failure("client error (Connect): tcp connect error: Connection refused (os error 111)"),
            &endpoint(),
        );
        assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
        match err {
            Error::ConnectionRefused { host, port, .. } => {
                assert_eq!(host, "example.com");
                assert_eq!(port, "8443");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_name_resolution() {
        for text in [
            "dns error: failed to lookup address information: Name or service not known",
            "lookup nowhere.invalid: no such host",
            "connect: No route to host (os error 113)",
        ] {
            assert_eq!(classify(&failure(text), &endpoint()).kind(), ErrorKind::NoRoute, "{text}");
        }
    }

    #[test]
    fn test_tls_failures() {
        for text in [
            "invalid peer certificate: UnknownIssuer",
            "received corrupt message of type InvalidContentType",
            "TLS handshake eof",
            "SSL routines::wrong version number",
        ] {
            assert_eq!(
                classify(&failure(text), &endpoint()).kind(),
                ErrorKind::TlsFailure,
                "{text}"
            );
        }
    }

    #[test]
    fn test_unknown_failure_is_generic_connection_error() {
        let target = normalize("example.com").expect("valid target");
        let err = classify(&failure("connection reset by peer"), &target);
        match err {
            Error::ConnectionRefused { host, port, .. } => {
                assert_eq!(host, "example.com");
                assert_eq!(port, "unknown");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
