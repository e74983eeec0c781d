//! Cancellation and deadline handle threaded through every stage.
//!
//! A [`CallContext`] is the only way a stage can be suspended or aborted.
//! Cancelling it, or letting its deadline pass, makes the next stage fail
//! before issuing any request and aborts a request already in flight.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::VagrantCloudError;

/// Ambient cancellation context for one pipeline invocation.
///
/// Clones share the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context from an existing cancellation token, e.g. the
    /// driver's shutdown token.
    pub fn from_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Same cancellation state, with a deadline `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Same cancellation state, with an absolute deadline. An earlier
    /// existing deadline is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token, for wiring into other tasks.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast if the context is already cancelled or past its deadline.
    pub fn ensure_active(&self, what: &str) -> Result<(), VagrantCloudError> {
        if self.cancel.is_cancelled() {
            return Err(VagrantCloudError::Cancelled { what: what.to_string() });
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(VagrantCloudError::DeadlineExceeded { what: what.to_string() });
            }
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first, in which case `fut` is dropped (aborting any
    /// in-flight request).
    pub async fn run<F, T>(&self, what: &str, fut: F) -> Result<T, VagrantCloudError>
    where
        F: Future<Output = Result<T, VagrantCloudError>>,
    {
        self.ensure_active(what)?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(VagrantCloudError::Cancelled { what: what.to_string() }),
            _ = deadline => Err(VagrantCloudError::DeadlineExceeded { what: what.to_string() }),
            result = fut => result,
        }
    }
}
