// src/crawl/executor.rs
// =============================================================================
// A rate-limited task runner.
//
// How it works:
// 1. submit() pushes a task onto an unbounded FIFO channel and returns
// 2. start() spawns a drain loop on the current tokio runtime
// 3. Every cycle the loop pops at most one task and runs it inline,
//    then sleeps for 1 / max_rate seconds
// 4. stop() makes the loop exit after its current cycle. Whatever is still
//    queued at that point is dropped without running.
//
// The sleep starts after the task returns, so a slow task stretches the
// cycle and the real rate falls below the ceiling. Tasks here only spawn
// work, so this costs next to nothing in practice.
//
// The queue is unbounded: producers are never blocked or rejected.
//
// The executor knows nothing about crawling and never looks at what a task
// does. A task that needs to report failure does so itself.
// =============================================================================

use crate::config::interval_for_rate;
use crate::error::{ConfigError, ExecutorError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

// Cloning gives another handle to the same queue and loop
#[derive(Clone)]
pub struct RateLimitedExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    interval: Duration,
    sender: mpsc::UnboundedSender<Task>,
    // Handed to the drain loop by start(); None once started
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Task>>>,
    stop_requested: AtomicBool,
    drain_loop: Mutex<Option<JoinHandle<()>>>,
}

impl RateLimitedExecutor {
    pub fn new(interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                interval,
                sender,
                receiver: Mutex::new(Some(receiver)),
                stop_requested: AtomicBool::new(false),
                drain_loop: Mutex::new(None),
            }),
        }
    }

    pub fn with_max_rate(max_per_second: f64) -> Result<Self, ConfigError> {
        Ok(Self::new(interval_for_rate(max_per_second)?))
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    // Queues a task. Never runs it here, never blocks.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.sender.send(Box::new(task)).is_err() {
            // Loop already exited and dropped the queue
            tracing::debug!("executor stopped, task dropped");
        }
    }

    pub fn start(&self) -> Result<(), ExecutorError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ExecutorError::NoRuntime)?;

        let mut receiver = lock(&self.inner.receiver)
            .take()
            .ok_or(ExecutorError::AlreadyStarted)?;

        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            loop {
                if let Ok(task) = receiver.try_recv() {
                    task();
                }

                if inner.stop_requested.load(Ordering::SeqCst) {
                    break;
                }

                tokio::time::sleep(inner.interval).await;
            }

            let mut abandoned = 0usize;
            while receiver.try_recv().is_ok() {
                abandoned += 1;
            }
            if abandoned > 0 {
                tracing::debug!(abandoned, "executor stopped with tasks still queued");
            }
        });

        *lock(&self.inner.drain_loop) = Some(handle);
        Ok(())
    }

    pub fn stop(&self) {
        self.inner.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stop_requested.load(Ordering::SeqCst)
    }

    // Waits until the drain loop has exited. Returns at once if it was never
    // started.
    pub async fn join(&self) {
        let handle = lock(&self.inner.drain_loop).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "executor drain loop ended abnormally");
            }
        }
    }
}

// A panicking task poisons nothing we care about, so keep going with the data
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
