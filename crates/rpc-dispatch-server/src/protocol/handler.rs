//! Protocol handler. Runs inbound payloads through the dispatcher, fanning
//! batch elements out to the blocking pool when configured to.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use rpc_dispatch::batch;
use rpc_dispatch::{split, Dispatcher, ErrorObject, Frame, Reply, RequestId, Response};

/// Entry point used by the HTTP and stdio transports.
#[derive(Debug, Clone)]
pub struct ProtocolHandler {
    dispatcher: Dispatcher,
    batch_concurrency: usize,
}

impl ProtocolHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            batch_concurrency: 1,
        }
    }

    /// Allow up to `limit` batch elements in flight at once. `1` keeps
    /// batches sequential on the calling task.
    pub fn with_batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = limit.max(1);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    pub async fn handle_payload(&self, payload: &[u8]) -> Reply {
        match split(payload) {
            Err(rejection) => {
                tracing::debug!("payload rejected before dispatch");
                Reply::Rejected(rejection)
            }
            Ok(Frame::Batch(elements)) if self.batch_concurrency > 1 && elements.len() > 1 => self
                .run_batch(&elements)
                .await
                .map_or(Reply::NoContent, Reply::Batch),
            Ok(frame) => self.dispatcher.handle_frame(frame),
        }
    }

    async fn run_batch(&self, elements: &[&str]) -> Option<Vec<Response>> {
        let permits = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut tasks = JoinSet::new();

        for (index, element) in elements.iter().enumerate() {
            let permit = permits.clone().acquire_owned().await.ok();
            let dispatcher = self.dispatcher.clone();
            let element = element.to_string();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, batch::run_element(&dispatcher, &element))
            });
        }

        let mut finished = vec![false; elements.len()];
        let mut results = Vec::with_capacity(elements.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, response)) => {
                    finished[index] = true;
                    results.push((index, response));
                }
                Err(e) => tracing::error!("batch element task failed: {e}"),
            }
        }

        // A lost task still owes its slot a response.
        for (index, done) in finished.into_iter().enumerate() {
            if !done {
                results.push((
                    index,
                    Some(Response::error(RequestId::Null, ErrorObject::internal_error())),
                ));
            }
        }

        batch::collect(results)
    }
}
