//! Handler invoked by the polling loop, once per wrapped update.

use std::future::Future;

use async_trait::async_trait;

use crate::update::Update;

/// Receives every wrapped update. Responses are sent by the handler itself through the
/// teloxide client; the loop waits for `handle` to return before taking the next update.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: Update);
}

#[async_trait]
impl<F, Fut> UpdateHandler for F
where
    F: Fn(Update) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, update: Update) {
        (self)(update).await
    }
}
