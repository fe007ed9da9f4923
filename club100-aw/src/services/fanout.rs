//! Index-keyed fan-out/fan-in
//!
//! Runs independent per-item tasks over a bounded pool and collects results
//! keyed by original timeline index. Completion order is irrelevant by
//! construction: whatever order tasks finish in, assembly later walks the
//! indices. A task that fails or panics simply leaves no entry; it can never
//! abort the round.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use tracing::error;

/// Run `tasks` with at most `concurrency` in flight, collecting successful
/// outputs by index.
pub async fn collect_indexed<T, Fut>(
    tasks: Vec<(usize, Fut)>,
    concurrency: usize,
) -> HashMap<usize, T>
where
    T: Send + 'static,
    Fut: Future<Output = Option<T>> + Send + 'static,
{
    stream::iter(tasks)
        .map(|(index, task)| async move {
            // Spawned so a panicking task is isolated to its own index
            match tokio::spawn(task).await {
                Ok(output) => (index, output),
                Err(e) => {
                    error!(item_index = index, error = %e, "Fan-out task aborted");
                    (index, None)
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|(index, output)| async move { output.map(|value| (index, value)) })
        .collect()
        .await
}
