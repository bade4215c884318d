//! Lifetime scope for a view's asynchronous work.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Ties in-flight calls to the lifetime of the view that issued them
///
/// Once torn down, [`ViewScope::run`] yields `None` for any call still in
/// flight, so a late response can never update a discarded view.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that tears the scope down when cancelled from elsewhere
    pub fn handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    /// Drive `fut` unless the scope is torn down first
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = fut => self.is_active().then_some(output),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
