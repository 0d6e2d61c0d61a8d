pub mod classify;
pub mod dispatch;
pub mod probe;
pub mod result;
pub mod trust;

pub mod prelude {
    pub use super::dispatch::{Dispatcher, HttpDispatcher};
    pub use super::probe::detect;
    pub use super::result::{Outcome, ProbeAttempt, ProbeResult, TransportFailure};
    pub use super::trust::TrustPolicy;
}

use std::fmt::Write;

/// Renders an error and its sources on one line.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1
                .as_deref()
                .map(|l| l as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_report_joins_causes() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("Connection refused (os error 111)", None))),
            ))),
        );
        assert_eq!(
            report(&err),
            "error sending request: client error (Connect): Connection refused (os error 111)"
        );
    }
}
