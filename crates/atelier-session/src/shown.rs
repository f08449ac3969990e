//! The "shown" deferred awaited by activations

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

use crate::error::{SessionError, TabMismatch};

#[derive(Debug, Clone)]
pub(crate) enum ShownError {
    Mismatch(TabMismatch),
    Aborted(String),
}

impl From<ShownError> for SessionError {
    fn from(err: ShownError) -> Self {
        match err {
            ShownError::Mismatch(mismatch) => SessionError::TabMismatch(mismatch),
            ShownError::Aborted(document_id) => SessionError::ShowAborted(document_id),
        }
    }
}

/// Outcome shared by every caller waiting on the same activation
pub(crate) type ShownOutcome = Shared<BoxFuture<'static, Result<(), ShownError>>>;

pub(crate) struct ShownSignal {
    document_id: String,
    sender: Option<oneshot::Sender<Result<(), TabMismatch>>>,
    outcome: ShownOutcome,
}

impl ShownSignal {
    pub(crate) fn new(document_id: impl Into<String>) -> Self {
        let document_id = document_id.into();
        let (sender, receiver) = oneshot::channel::<Result<(), TabMismatch>>();

        let aborted_id = document_id.clone();
        let outcome = async move {
            match receiver.await {
                Ok(result) => result.map_err(ShownError::Mismatch),
                Err(_) => Err(ShownError::Aborted(aborted_id)),
            }
        }
        .boxed()
        .shared();

        Self {
            document_id,
            sender: Some(sender),
            outcome,
        }
    }

    pub(crate) fn document_id(&self) -> &str {
        &self.document_id
    }

    pub(crate) fn outcome(&self) -> ShownOutcome {
        self.outcome.clone()
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.sender.is_none()
    }

    pub(crate) fn resolve(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Ok(()));
        }
    }

    /// Reject with a mismatch naming the document that was signalled instead
    pub(crate) fn reject(&mut self, actual: impl Into<String>) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(TabMismatch {
                expected: self.document_id.clone(),
                actual: actual.into(),
            }));
        }
    }

    /// Give up without an answer, waiters see `ShowAborted`
    pub(crate) fn abort(&mut self) {
        self.sender.take();
    }
}
