use std::sync::Arc;
use tokio::sync::Semaphore;
use std::future::Future;
use futures::future::join_all;
use crate::error::{InsightError, Result};

/// Runs I/O-bound tasks with a bounded number in flight
///
/// Results come back index-aligned with the submitted tasks, whatever order
/// the tasks finish in.
#[derive(Clone)]
pub struct ParallelProcessor {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
}

impl ParallelProcessor {
    /// Creates a processor allowing `max_concurrent` tasks at once (at least one)
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Number of tasks allowed in flight
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Processes a collection of futures concurrently and returns their results in input order
    pub async fn process<F, T>(&self, tasks: Vec<F>) -> Vec<Result<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let semaphore = self.semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| InsightError::Message(format!("worker pool closed: {}", e)))?;
                task.await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(result) => result,
                Err(e) => Err(InsightError::Message(format!("worker task failed: {}", e))),
            })
            .collect()
    }

    /// Applies `f` to every item through the pool, keeping input order
    pub async fn map<I, F, Fut, T>(&self, items: Vec<I>, f: F) -> Vec<Result<T>>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let tasks: Vec<Fut> = items.into_iter().map(f).collect();
        self.process(tasks).await
    }
}
