use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Stale element: {0}")]
    StaleElement(String),

    #[error("Browser window vanished: {0}")]
    WindowClosed(String),

    #[error("Wait timed out: {0}")]
    Timeout(String),

    #[error("Network request timed out: {0}")]
    NetworkTimeout(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Server returned {code}: {message}")]
    ServerError { code: u16, message: String },

    #[error("Incorrect email address: {0}")]
    InvalidEmail(String),

    #[error("Incorrect password: {0}")]
    InvalidPassword(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How a failure is treated by the deletion loop.
///
/// Structural failures are absorbed at the slot level (the row simply is not
/// there this sweep), transient failures are retried at the sweep level with
/// a refresh and backoff, everything else aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Structural,
    Fatal,
}

impl FailureClass {
    pub fn of(err: &SweepError) -> Self {
        match err {
            SweepError::NetworkTimeout(_) | SweepError::ConnectionFailed(_) => {
                FailureClass::Transient
            }
            SweepError::ServerError { code, .. } => match code {
                400 | 404 | 500..=599 => FailureClass::Transient,
                _ => FailureClass::Fatal,
            },
            SweepError::ElementNotFound(_)
            | SweepError::StaleElement(_)
            | SweepError::WindowClosed(_)
            | SweepError::Timeout(_) => FailureClass::Structural,
            _ => FailureClass::Fatal,
        }
    }
}
