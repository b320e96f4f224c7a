//! Embedding worker pool
//!
//! Workers pull batches from a shared bounded queue and answer each job on
//! its own oneshot channel, so callers can await replies in submission order
//! regardless of which worker finished first.
//!
//! Two execution strategies are available:
//! - [`PoolStrategy::Tasks`]: workers are tokio tasks on the caller's runtime
//! - [`PoolStrategy::Threads`]: each worker is an OS thread driving its own
//!   current-thread runtime, isolating CPU-heavy providers from the caller

use notegraph_config::PoolStrategy;
use notegraph_core::{EmbeddingError, EmbeddingProvider, EmbeddingResult};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

type Reply = EmbeddingResult<Vec<Vec<f32>>>;

struct Job {
    batch: Vec<String>,
    reply: oneshot::Sender<Reply>,
}

enum WorkerHandle {
    Task(tokio::task::JoinHandle<()>),
    Thread(std::thread::JoinHandle<()>),
}

/// Fixed-size pool of embedding workers sharing one provider
pub struct EmbeddingWorkerPool {
    sender: Mutex<Option<flume::Sender<Job>>>,
    workers: Mutex<Vec<WorkerHandle>>,
    strategy: PoolStrategy,
    size: usize,
}

impl std::fmt::Debug for EmbeddingWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingWorkerPool")
            .field("strategy", &self.strategy)
            .field("size", &self.size)
            .field("running", &self.is_running())
            .finish()
    }
}

impl EmbeddingWorkerPool {
    /// Spawn `size` workers.
    ///
    /// With [`PoolStrategy::Tasks`] this must be called from within a tokio
    /// runtime.
    pub fn start(
        provider: Arc<dyn EmbeddingProvider>,
        size: usize,
        strategy: PoolStrategy,
    ) -> EmbeddingResult<Self> {
        let size = size.max(1);
        let (sender, receiver) = flume::bounded::<Job>(size * 2);

        let mut workers = Vec::with_capacity(size);
        for worker_id in 0..size {
            let receiver = receiver.clone();
            let provider = provider.clone();
            let handle = match strategy {
                PoolStrategy::Tasks => WorkerHandle::Task(tokio::spawn(async move {
                    run_worker(worker_id, receiver, provider).await;
                })),
                PoolStrategy::Threads => {
                    let handle = std::thread::Builder::new()
                        .name(format!("embed-worker-{worker_id}"))
                        .spawn(move || {
                            match tokio::runtime::Builder::new_current_thread()
                                .enable_all()
                                .build()
                            {
                                Ok(runtime) => {
                                    runtime.block_on(run_worker(worker_id, receiver, provider))
                                }
                                Err(e) => error!("Worker {} failed to build runtime: {}", worker_id, e),
                            }
                        })
                        .map_err(|e| {
                            EmbeddingError::WorkerFailed(format!(
                                "failed to spawn worker thread {worker_id}: {e}"
                            ))
                        })?;
                    WorkerHandle::Thread(handle)
                }
            };
            workers.push(handle);
        }

        info!(
            "Started embedding pool: {} workers ({:?}), model {}",
            size,
            strategy,
            provider.model_name()
        );

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            strategy,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn strategy(&self) -> PoolStrategy {
        self.strategy
    }

    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Queue a batch; the returned receiver yields that batch's vectors
    pub async fn submit(&self, batch: Vec<String>) -> EmbeddingResult<oneshot::Receiver<Reply>> {
        let sender = self
            .sender
            .lock()
            .clone()
            .ok_or(EmbeddingError::PoolClosed)?;

        let (reply, receiver) = oneshot::channel();
        sender
            .send_async(Job { batch, reply })
            .await
            .map_err(|_| EmbeddingError::PoolClosed)?;
        Ok(receiver)
    }

    /// Close the queue and join every worker. Idempotent.
    pub async fn shutdown(&self) -> EmbeddingResult<()> {
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return Ok(());
        }
        drop(sender);

        let workers: Vec<WorkerHandle> = std::mem::take(&mut *self.workers.lock());
        let mut failures = 0;
        for worker in workers {
            let joined = match worker {
                WorkerHandle::Task(handle) => handle.await.map_err(|e| e.to_string()),
                WorkerHandle::Thread(handle) => tokio::task::spawn_blocking(move || handle.join())
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.map_err(|_| "worker thread panicked".to_string())),
            };
            if let Err(e) = joined {
                warn!("Embedding worker join error: {}", e);
                failures += 1;
            }
        }

        info!("Embedding pool shut down");
        if failures > 0 {
            return Err(EmbeddingError::WorkerFailed(format!(
                "{failures} worker(s) did not exit cleanly"
            )));
        }
        Ok(())
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: flume::Receiver<Job>,
    provider: Arc<dyn EmbeddingProvider>,
) {
    debug!("Embedding worker {} started", worker_id);
    while let Ok(job) = receiver.recv_async().await {
        let result = provider.encode(&job.batch).await;
        if let Err(ref e) = result {
            warn!("Worker {} batch of {} failed: {}", worker_id, job.batch.len(), e);
        }
        // caller may have given up on this batch
        let _ = job.reply.send(result);
    }
    debug!("Embedding worker {} stopped", worker_id);
}
