//! Bounded worker pool for non-blocking communications.
//!
//! A fixed set of threads pulls jobs off a shared queue, so the number of
//! HTTP round trips in flight never exceeds the pool size. Jobs carry no
//! ordering guarantee relative to each other.
//!
//! # Shutdown
//!
//! On shutdown the workers drain the queue: keep-alive jobs still run,
//! every other queued job is abandoned (resolved without issuing its
//! request). Jobs already running always finish.

// Rust guideline compliant 2025-01

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::constants;

/// Work the pool can run.
pub(crate) trait Dispatchable: Send + Sync {
    /// Performs the job on the current (worker) thread.
    fn run(&self);
    /// Resolves the job without performing it.
    fn abandon(&self);
    /// Whether the job survives shutdown.
    fn keep_alive(&self) -> bool;
}

type Job = Arc<dyn Dispatchable>;

/// Fixed-size pool of background worker threads.
pub struct Dispatcher {
    /// Queue sender; `None` once shut down.
    job_tx: Mutex<Option<mpsc::Sender<Job>>>,
    /// Shutdown flag shared with worker threads.
    shutdown: Arc<AtomicBool>,
    /// Worker thread handles.
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.worker_count())
            .field("shutdown", &self.shutdown.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates and starts a pool of `size` workers (at least one).
    pub fn new(size: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(size.max(1));
        for index in 0..size.max(1) {
            let rx = Arc::clone(&job_rx);
            let flag = Arc::clone(&shutdown);
            match thread::Builder::new()
                .name(format!("comm-worker-{index}"))
                .spawn(move || Self::worker_loop(&rx, &flag))
            {
                Ok(handle) => workers.push(handle),
                Err(e) => log::error!("Failed to spawn communication worker {index}: {e}"),
            }
        }
        log::debug!("Dispatcher started with {} workers", workers.len());

        Self {
            job_tx: Mutex::new(Some(job_tx)),
            shutdown,
            workers: Mutex::new(workers),
        }
    }

    /// Worker loop - runs on each pool thread.
    fn worker_loop(job_rx: &Mutex<mpsc::Receiver<Job>>, shutdown: &AtomicBool) {
        loop {
            if shutdown.load(Ordering::SeqCst) {
                Self::drain(job_rx);
                break;
            }

            // Only one worker waits on the receiver at a time; the rest queue
            // on the mutex
            let next = job_rx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv_timeout(constants::WORKER_POLL_INTERVAL);

            match next {
                Ok(job) => {
                    if shutdown.load(Ordering::SeqCst) && !job.keep_alive() {
                        job.abandon();
                    } else {
                        job.run();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    Self::drain(job_rx);
                    break;
                }
            }
        }
    }

    /// Empties the queue during shutdown.
    fn drain(job_rx: &Mutex<mpsc::Receiver<Job>>) {
        loop {
            let next = job_rx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .try_recv();
            let Ok(job) = next else { break };
            if job.keep_alive() {
                job.run();
            } else {
                job.abandon();
            }
        }
    }

    /// Queues a job for the next free worker.
    pub(crate) fn submit(&self, job: Job) {
        let guard = self.job_tx.lock().unwrap_or_else(PoisonError::into_inner);
        let rejected = match guard.as_ref() {
            Some(tx) if self.worker_count() > 0 => match tx.send(job) {
                Ok(()) => return,
                Err(mpsc::SendError(job)) => job,
            },
            _ => job,
        };
        drop(guard);
        Self::run_outside_pool(rejected);
    }

    /// Fallback for jobs that cannot be queued: keep-alive jobs get their own
    /// thread, the rest are abandoned.
    fn run_outside_pool(job: Job) {
        if !job.keep_alive() {
            log::warn!("Dispatcher unavailable, abandoning communication");
            job.abandon();
            return;
        }
        let fallback = Arc::clone(&job);
        if let Err(e) = thread::Builder::new()
            .name("comm-keepalive".to_string())
            .spawn(move || fallback.run())
        {
            log::error!("Failed to spawn keep-alive communication thread: {e}");
            job.abandon();
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether shutdown has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Stops accepting jobs, drains the queue and joins the workers.
    pub fn shutdown(&self) {
        // The queue closes before workers are told to stop: every send that
        // succeeded is seen by some worker's final drain
        let sender = self
            .job_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_none() {
            return;
        }
        drop(sender);
        self.shutdown.store(true, Ordering::SeqCst);

        let workers: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let current = thread::current().id();
        for handle in workers {
            // A job that drops the last handle to its own pool cannot join itself
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                log::error!("Communication worker panicked");
            }
        }
        log::debug!("Dispatcher shut down");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingJob {
        keep_alive: bool,
        delay: Duration,
        ran: AtomicUsize,
        abandoned: AtomicUsize,
    }

    impl Dispatchable for CountingJob {
        fn run(&self) {
            thread::sleep(self.delay);
            self.ran.fetch_add(1, Ordering::SeqCst);
        }

        fn abandon(&self) {
            self.abandoned.fetch_add(1, Ordering::SeqCst);
        }

        fn keep_alive(&self) -> bool {
            self.keep_alive
        }
    }

    fn wait_for(condition: impl Fn() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached in time");
    }

    #[test]
    fn test_pool_runs_submitted_jobs() {
        let dispatcher = Dispatcher::new(2);
        assert_eq!(dispatcher.worker_count(), 2);

        let jobs: Vec<Arc<CountingJob>> = (0..5).map(|_| Arc::new(CountingJob::default())).collect();
        for job in &jobs {
            dispatcher.submit(Arc::clone(job) as Job);
        }

        wait_for(|| jobs.iter().all(|job| job.ran.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn test_zero_size_pool_still_has_a_worker() {
        let dispatcher = Dispatcher::new(0);
        assert_eq!(dispatcher.worker_count(), 1);
    }

    #[test]
    fn test_shutdown_drains_keep_alive_and_abandons_the_rest() {
        let dispatcher = Dispatcher::new(1);

        // Occupy the only worker so the next jobs stay queued
        let blocker = Arc::new(CountingJob {
            delay: Duration::from_millis(200),
            ..CountingJob::default()
        });
        dispatcher.submit(Arc::clone(&blocker) as Job);
        thread::sleep(Duration::from_millis(50));

        let kept = Arc::new(CountingJob {
            keep_alive: true,
            ..CountingJob::default()
        });
        let dropped = Arc::new(CountingJob::default());
        dispatcher.submit(Arc::clone(&kept) as Job);
        dispatcher.submit(Arc::clone(&dropped) as Job);

        dispatcher.shutdown();

        assert_eq!(blocker.ran.load(Ordering::SeqCst), 1);
        assert_eq!(kept.ran.load(Ordering::SeqCst), 1);
        assert_eq!(dropped.ran.load(Ordering::SeqCst), 0);
        assert_eq!(dropped.abandoned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jobs_racing_shutdown_are_always_resolved() {
        for _ in 0..50 {
            let dispatcher = Arc::new(Dispatcher::new(2));
            let jobs: Vec<Arc<CountingJob>> =
                (0..20).map(|_| Arc::new(CountingJob::default())).collect();

            let submitter = {
                let dispatcher = Arc::clone(&dispatcher);
                let jobs = jobs.clone();
                thread::spawn(move || {
                    for job in jobs {
                        dispatcher.submit(job as Job);
                    }
                })
            };
            dispatcher.shutdown();
            submitter.join().unwrap();

            for job in &jobs {
                let resolved = job.ran.load(Ordering::SeqCst) + job.abandoned.load(Ordering::SeqCst);
                assert_eq!(resolved, 1, "job lost or resolved twice");
            }
        }
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let dispatcher = Dispatcher::new(1);
        dispatcher.shutdown();
        dispatcher.shutdown();
        assert!(dispatcher.is_shut_down());
        assert_eq!(dispatcher.worker_count(), 0);
    }

    #[test]
    fn test_submit_after_shutdown() {
        let dispatcher = Dispatcher::new(1);
        dispatcher.shutdown();
        assert!(dispatcher.is_shut_down());

        let dropped = Arc::new(CountingJob::default());
        dispatcher.submit(Arc::clone(&dropped) as Job);
        assert_eq!(dropped.abandoned.load(Ordering::SeqCst), 1);

        let kept = Arc::new(CountingJob {
            keep_alive: true,
            ..CountingJob::default()
        });
        dispatcher.submit(Arc::clone(&kept) as Job);
        wait_for(|| kept.ran.load(Ordering::SeqCst) == 1);
    }
}
