use std::fmt::Display;
use std::future::Future;

/// Run `task` on the runtime without awaiting it. A failure is logged and dropped.
pub fn spawn_detached<F, E>(name: &'static str, task: F)
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = task.await {
            tracing::warn!(task = name, error = %err, "background task failed");
        }
    });
}
