use cpm_common::CpmError;
use std::error::Error as StdError;

const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];
// hyper-util's HttpConnector prefixes failures of the plain TCP leg with these.
const TCP_MARKERS: &[&str] = &["tcp connect error", "tcp open error", "tcp set_nodelay"];
const TLS_MARKERS: &[&str] = &["certificate", "ssl", "tls", "handshake"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectFailure {
    Lookup,
    Tls,
    Connection,
}

/// Renders an error and all of its sources as `outer: inner: root`.
pub(crate) fn error_chain_text(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Decides which phase of connection setup failed.
///
/// Only the sources are inspected; the outermost error usually embeds the
/// request URL, whose host name must not influence the outcome. A connect
/// failure on an https URL that is neither DNS nor TCP happened in the TLS
/// handshake.
pub(crate) fn classify_connect(err: &(dyn StdError + 'static), https: bool) -> ConnectFailure {
    let causes: Vec<String> = std::iter::successors(err.source(), |&e| e.source())
        .map(|e| e.to_string().to_ascii_lowercase())
        .collect();
    let mentions = |markers: &[&str]| causes.iter().any(|c| markers.iter().any(|m| c.contains(m)));

    if mentions(DNS_MARKERS) {
        ConnectFailure::Lookup
    } else if mentions(TCP_MARKERS) {
        ConnectFailure::Connection
    } else if mentions(TLS_MARKERS) || https {
        ConnectFailure::Tls
    } else {
        ConnectFailure::Connection
    }
}

/// Maps a transport failure onto the module's error taxonomy.
pub(crate) fn classify_request_error(url: &str, err: reqwest::Error) -> CpmError {
    let url = url.to_string();
    let message = error_chain_text(&err);

    if err.is_builder() {
        return CpmError::Lookup { url, message };
    }
    if err.is_timeout() {
        return CpmError::Connection { url, message };
    }
    let tls_leg = err.is_connect() && url.starts_with("https://");
    match classify_connect(&err, tls_leg) {
        ConnectFailure::Lookup => CpmError::Lookup { url, message },
        ConnectFailure::Tls => CpmError::Tls { url, message },
        ConnectFailure::Connection => CpmError::Connection { url, message },
    }
}

/// The HTTP client itself could not be set up, e.g. the TLS backend failed
/// to initialise. No request was attempted.
pub(crate) fn client_build_error(url: &str, err: reqwest::Error) -> CpmError {
    CpmError::Connection {
        url: url.to_string(),
        message: error_chain_text(&err),
    }
}
