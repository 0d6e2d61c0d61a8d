use chrono::{DateTime, Utc};
use x509_parser::parse_x509_certificate;

fn timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Describes the peer certificate of a TLS connection, one `* ` line per
/// field. `None` means the exchange was not over TLS.
pub fn certificate_lines(peer_certificate: Option<&[u8]>, now: DateTime<Utc>) -> Vec<String> {
    let Some(der) = peer_certificate else {
        return vec!["* No TLS connection".to_string()];
    };

    let parsed = match parse_x509_certificate(der) {
        Ok((_, parsed)) => parsed,
        Err(e) => return vec![format!("* Unparseable peer certificate: {e}")],
    };

    let not_before = parsed.validity().not_before.timestamp();
    let not_after = parsed.validity().not_after.timestamp();
    let days_left = (not_after - now.timestamp()) / 86400;

    vec![
        format!("* Subject: {}", parsed.subject()),
        format!("* Issuer: {}", parsed.issuer()),
        format!("* Valid From: {}", timestamp(not_before)),
        format!("* Valid Until: {}", timestamp(not_after)),
        format!("* Expires In: {days_left}d"),
    ]
}
