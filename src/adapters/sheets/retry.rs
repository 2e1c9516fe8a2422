use std::future::Future;
use std::time::Duration;

use google_sheets4::hyper::StatusCode;

#[derive(Debug)]
pub enum CallFailure<E> {
    TimedOut(Duration),
    Failed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CallFailure<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallFailure::TimedOut(timeout) => write!(f, "timed out after {:?}", timeout),
            CallFailure::Failed(error) => write!(f, "{}", error),
        }
    }
}

/// Runs `call` with a timeout, retrying it once when the first attempt times out or fails
/// with an error `is_transient` accepts.
pub async fn with_single_retry<T, E, F, Fut>(
    operation: &str,
    timeout: Duration,
    is_transient: impl Fn(&E) -> bool,
    mut call: F,
) -> Result<T, CallFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retried = false;
    loop {
        let failure = match tokio::time::timeout(timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) if !is_transient(&error) => return Err(CallFailure::Failed(error)),
            Ok(Err(error)) => CallFailure::Failed(error),
            Err(_) => CallFailure::TimedOut(timeout),
        };

        if retried {
            return Err(failure);
        }
        tracing::warn!(operation, %failure, "Backend call failed, retrying once");
        retried = true;
    }
}

/// Transport-level failures, throttling and server errors are worth a second attempt; malformed
/// requests and auth problems are not.
pub fn is_transient(error: &google_sheets4::Error) -> bool {
    match error {
        google_sheets4::Error::HttpError(_) | google_sheets4::Error::Io(_) => true,
        google_sheets4::Error::Failure(response) => {
            response.status().is_server_error()
                || response.status() == StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}
