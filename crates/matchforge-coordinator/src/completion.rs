//! `Completion`: the asynchronous outcome of an accepted operation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::CoordinatorError;

/// Sending half of a completion, held by the coordinator until the
/// collaborator answers.
pub(crate) type Responder<T> = oneshot::Sender<Result<T, CoordinatorError>>;

/// Resolves once, when the collaborator request behind an operation
/// finishes and the coordinator has applied the resulting transition.
///
/// Awaiting it is optional: dropping a `Completion` does not cancel the
/// request, the state machine still moves on.
///
/// If the coordinator stops before answering, the completion resolves to
/// [`CoordinatorError::Unavailable`].
pub struct Completion<T> {
    rx: oneshot::Receiver<Result<T, CoordinatorError>>,
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (Responder<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A completion that is already resolved.
    pub(crate) fn ready(outcome: Result<T, CoordinatorError>) -> Self {
        let (tx, completion) = Self::channel();
        let _ = tx.send(outcome);
        completion
    }

    /// Returns the outcome if it has arrived, without waiting.
    ///
    /// Once this has returned `Some`, the completion is spent; awaiting it
    /// afterwards yields `Unavailable`.
    pub fn try_outcome(&mut self) -> Option<Result<T, CoordinatorError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(CoordinatorError::Unavailable)),
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T, CoordinatorError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(CoordinatorError::Unavailable)))
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}
