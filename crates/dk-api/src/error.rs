use std::fmt;

use dk_schemas::RegistryError;

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Failures fetching the weekly forecast feed. Any of these aborts the
/// reconciliation run; a missing override for one cell is not an error.
#[derive(Debug)]
pub enum FeedError {
    /// Connection, DNS, TLS or timeout failure.
    Transport { url: String, message: String },
    /// Non-2xx response.
    Http { url: String, status: u16, body: String },
    /// The body is not the expected JSON array.
    Decode { url: String, message: String },
    /// A record names a submarket the registry does not know.
    Registry { record_index: usize, source: RegistryError },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Transport { url, message } => {
                write!(f, "feed transport error url={url}: {message}")
            }
            FeedError::Http { url, status, body } => {
                write!(f, "feed http error url={url} status={status}: {body}")
            }
            FeedError::Decode { url, message } => {
                write!(f, "feed decode error url={url}: {message}")
            }
            FeedError::Registry {
                record_index,
                source,
            } => write!(f, "feed record {record_index}: {source}"),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Registry { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Failure posting one table to the persistence API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    Transport { endpoint: String, message: String },
    Http { endpoint: String, status: u16, body: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Transport { endpoint, message } => {
                write!(f, "sink transport error endpoint={endpoint}: {message}")
            }
            SinkError::Http {
                endpoint,
                status,
                body,
            } => write!(f, "sink http error endpoint={endpoint} status={status}: {body}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Error bodies are echoed into messages; keep them short.
pub(crate) fn clip_body(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &body[..i]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_is_the_source() {
        let e = FeedError::Registry {
            record_index: 3,
            source: RegistryError::UnknownMnemonic("XX".into()),
        };
        assert!(e.to_string().contains("record 3"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn long_bodies_are_clipped() {
        let long = "x".repeat(500);
        let clipped = clip_body(&long);
        assert_eq!(clipped.len(), 203);
        assert_eq!(clip_body(" short "), "short");
    }
}
