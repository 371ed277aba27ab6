//! Fixed-size worker pool that runs handlers off the publisher's thread.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use thiserror::Error;
use tracing::{debug, error, info};

thread_local! {
    /// Set on pool worker threads for their whole life.
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// A unit of work queued on the pool.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PoolError {
    /// Every worker has exited; nothing can run the job.
    #[error("worker pool is closed")]
    Closed,
}

/// Bounded pool of named worker threads.
///
/// - Jobs are handed over through a bounded channel; `submit` from outside
///   the pool blocks while the queue is full
/// - A worker never blocks on the queue: when a handler publishes and the
///   queue is full, the job runs inline on that worker
/// - A panicking job is caught and logged; the worker keeps running
/// - Dropping the pool lets queued jobs finish, then joins the workers
#[derive(Debug)]
pub(crate) struct WorkerPool {
    sender: Option<SyncSender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers sharing a queue of `capacity` jobs.
    ///
    /// Both sizes must be non-zero; [`BusConfig::validate`](crate::BusConfig::validate)
    /// checks them before a bus is built.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn a worker thread.
    pub(crate) fn new(size: usize, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::sync_channel::<Job>(capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|n| {
                let name = format!("cyberbus-worker-{n}");
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || worker_loop(&name, &receiver))
                    .expect("failed to spawn bus worker thread")
            })
            .collect();

        info!(workers = size, capacity, "worker pool started");

        Self {
            sender: Some(sender),
            workers,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job.
    ///
    /// Callers outside the pool block while the queue is full. On a worker
    /// thread a full queue runs the job inline instead, since blocking there
    /// could leave nobody to drain the queue.
    pub(crate) fn submit(&self, job: Job) -> Result<(), PoolError> {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;

        if !ON_WORKER.with(Cell::get) {
            return sender.send(job).map_err(|_| PoolError::Closed);
        }

        match sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                debug!("queue full, running job inline on worker");
                run(job);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(PoolError::Closed),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends each worker once the queue is drained.
        drop(self.sender.take());

        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // The last owner of the bus can be a handler running on a worker.
            if worker.thread().id() == current {
                continue;
            }
            let name = worker.thread().name().unwrap_or("unnamed").to_owned();
            if let Err(panic) = worker.join() {
                error!(worker = %name, panic = %panic_message(&*panic), "worker thread panicked");
            }
        }
        info!("worker pool stopped");
    }
}

fn worker_loop(name: &str, receiver: &Mutex<Receiver<Job>>) {
    ON_WORKER.with(|flag| flag.set(true));
    debug!(worker = %name, "worker started");

    loop {
        // Hold the lock only while waiting, never while running the job.
        let job = {
            let receiver = receiver.lock().unwrap_or_else(PoisonError::into_inner);
            receiver.recv()
        };

        let Ok(job) = job else {
            break;
        };

        run(job);
    }

    debug!(worker = %name, "worker stopped");
}

/// Run a job, containing any panic it raises.
fn run(job: Job) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
        let worker = thread::current().name().map(str::to_owned);
        error!(worker = ?worker, panic = %panic_message(&*panic), "handler panicked");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}
