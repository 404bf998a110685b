use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrtShError {
    #[error("Invalid domain name: {0:?}")]
    InvalidDomain(String),

    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("crt.sh returned HTTP {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("Failed to decode crt.sh response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CrtShError {
    /// Display text with the innermost cause appended when it adds detail
    ///
    /// reqwest hides the underlying I/O error (e.g. "Connection refused")
    /// behind a generic "error sending request" message.
    pub fn detailed_message(&self) -> String {
        let message = self.to_string();

        let mut source = std::error::Error::source(self);
        let mut innermost = None;
        while let Some(cause) = source {
            innermost = Some(cause);
            source = cause.source();
        }

        match innermost.map(|cause| cause.to_string()) {
            Some(cause) if !cause.is_empty() && !message.contains(&cause) => {
                format!("{}: {}", message, cause)
            }
            _ => message,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrtShError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_message_without_source() {
        let err = CrtShError::InvalidDomain("a b".to_string());
        assert_eq!(err.detailed_message(), err.to_string());
    }

    #[test]
    fn test_detailed_message_does_not_repeat_cause() {
        let json_err = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        let err = CrtShError::from(json_err);
        assert_eq!(err.detailed_message(), err.to_string());
        assert!(err.detailed_message().starts_with("Failed to decode crt.sh response: "));
    }
}
