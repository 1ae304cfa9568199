//! Shared HTTP plumbing for the online clients

use super::error::LlmError;

/// Map a transport error from reqwest onto [`LlmError`]
pub(crate) fn map_reqwest_error(err: reqwest::Error, service: &str, timeout_seconds: u64) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(timeout_seconds)
    } else if err.is_connect() {
        LlmError::ConnectionError(format!("Failed to connect to {service}: {err}"))
    } else if err.is_decode() {
        LlmError::ParseError(err.to_string())
    } else {
        LlmError::ConnectionError(err.to_string())
    }
}

/// Map a non-success HTTP status onto [`LlmError`]
pub(crate) fn map_status(status: u16, body: String, retry_after: Option<u64>) -> LlmError {
    match status {
        429 => LlmError::RateLimited(retry_after.unwrap_or(60)),
        401 | 403 => LlmError::ConfigError(format!("request rejected (HTTP {status}): {body}")),
        _ => LlmError::ApiError {
            status,
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status() {
        assert!(matches!(map_status(429, String::new(), None), LlmError::RateLimited(60)));
        assert!(matches!(map_status(429, String::new(), Some(7)), LlmError::RateLimited(7)));
        assert!(matches!(map_status(401, "bad key".to_string(), None), LlmError::ConfigError(_)));
        assert!(matches!(
            map_status(503, "busy".to_string(), None),
            LlmError::ApiError { status: 503, .. }
        ));
    }
}
