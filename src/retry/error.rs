use std::time::Duration;

use thiserror::Error;

/// Last failure observed by [`retry_with_timeout`](super::retry_with_timeout) once every
/// attempt has been spent.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("{0}")]
    Failed(E),
    #[error("operation timed out after {} ms", timeout.as_millis())]
    TimedOut { timeout: Duration },
}

impl<E> RetryError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(err) => Some(err),
            Self::TimedOut { .. } => None,
        }
    }
}
