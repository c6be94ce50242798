//! Timer queue for deferred, fire-and-forget work
//!
//! A single background thread owns a min-heap of deadlines and is fed through
//! a crossbeam channel. Jobs run on the timer thread once their deadline has
//! passed. There is no cancellation: a scheduled job either runs or is
//! discarded when the queue shuts down.

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A unit of deferred work
pub type TimerJob = Box<dyn FnOnce() + Send + 'static>;

enum TimerCommand {
    Schedule { deadline: Instant, job: TimerJob },
    Shutdown,
}

/// Heap entry ordered so the earliest deadline is popped first
struct PendingJob {
    deadline: Instant,
    sequence: u64,
    job: TimerJob,
}

impl PartialEq for PendingJob {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.sequence == other.sequence
    }
}

impl Eq for PendingJob {}

impl PartialOrd for PendingJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct Worker {
    sender: Sender<TimerCommand>,
    handle: JoinHandle<()>,
}

/// Background timer executing jobs after a delay
///
/// The worker thread is started lazily on the first [`TimerQueue::schedule`]
/// call, so queues that never defer anything cost nothing.
pub struct TimerQueue {
    name: String,
    worker: Mutex<Option<Worker>>,
}

impl TimerQueue {
    /// Create a timer queue; `name` becomes the worker thread name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worker: Mutex::new(None),
        }
    }

    /// Schedule `job` to run once `delay` has elapsed
    ///
    /// Returns `false` if the worker thread could not be started; the job is
    /// dropped in that case.
    pub fn schedule<F>(&self, delay: Duration, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        if worker.is_none() {
            match self.start_worker() {
                Ok(started) => *worker = Some(started),
                Err(e) => {
                    log::error!("Failed to start timer thread '{}': {}", self.name, e);
                    return false;
                }
            }
        }

        let Some(active) = worker.as_ref() else {
            return false;
        };

        let command = TimerCommand::Schedule {
            deadline,
            job: Box::new(job),
        };
        if active.sender.send(command).is_err() {
            log::error!("Timer thread '{}' is gone, dropping scheduled job", self.name);
            return false;
        }

        log::trace!("Scheduled job on '{}' in {:?}", self.name, delay);
        true
    }

    /// Whether the worker thread has been started and not shut down
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop the worker thread, discarding jobs that have not fired yet
    pub fn shutdown(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(worker) = worker {
            let _ = worker.sender.send(TimerCommand::Shutdown);
            // A job that drops the last owner would otherwise join itself
            if worker.handle.thread().id() != thread::current().id() {
                let _ = worker.handle.join();
            }
        }
    }

    fn start_worker(&self) -> std::io::Result<Worker> {
        let (sender, receiver) = unbounded();
        let name = self.name.clone();
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_worker(&name, &receiver))?;
        Ok(Worker { sender, handle })
    }
}

impl Drop for TimerQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(name: &str, receiver: &Receiver<TimerCommand>) {
    let mut pending: BinaryHeap<PendingJob> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    loop {
        let command = match pending.peek() {
            None => match receiver.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
            Some(next) => {
                let now = Instant::now();
                if next.deadline <= now {
                    if let Some(due) = pending.pop() {
                        run_job(name, due.job);
                    }
                    continue;
                }
                match receiver.recv_timeout(next.deadline - now) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        };

        match command {
            TimerCommand::Schedule { deadline, job } => {
                sequence = sequence.wrapping_add(1);
                pending.push(PendingJob { deadline, sequence, job });
            }
            TimerCommand::Shutdown => break,
        }
    }

    if !pending.is_empty() {
        log::debug!("Timer '{}' shutting down with {} pending job(s)", name, pending.len());
    }
}

fn run_job(name: &str, job: TimerJob) {
    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
        log::error!("Timer job on '{}' panicked", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_worker_starts_lazily() {
        let queue = TimerQueue::new("test-timer");
        assert!(!queue.is_running());

        assert!(queue.schedule(Duration::from_millis(1), || {}));
        assert!(queue.is_running());

        queue.shutdown();
        assert!(!queue.is_running());
    }

    #[test]
    fn test_jobs_fire_after_delay() {
        let queue = TimerQueue::new("test-timer");
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        queue.schedule(Duration::from_millis(20), move || {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });

        assert_eq!(fired.load(AtomicOrdering::SeqCst), 0);
        thread::sleep(Duration::from_millis(300));
        assert_eq!(fired.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_jobs_fire_in_deadline_order() {
        let queue = TimerQueue::new("test-timer");
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, delay) in [("late", 120), ("early", 10), ("middle", 60)] {
            let order = Arc::clone(&order);
            queue.schedule(Duration::from_millis(delay), move || {
                order.lock().unwrap().push(label);
            });
        }

        thread::sleep(Duration::from_millis(500));
        assert_eq!(*order.lock().unwrap(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_shutdown_discards_pending_jobs() {
        let queue = TimerQueue::new("test-timer");
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        queue.schedule(Duration::from_secs(60), move || {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });
        queue.shutdown();

        assert_eq!(fired.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let queue = TimerQueue::new("test-timer");
        let fired = Arc::new(AtomicUsize::new(0));

        queue.schedule(Duration::from_millis(5), || panic!("boom"));
        let counter = Arc::clone(&fired);
        queue.schedule(Duration::from_millis(30), move || {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });

        thread::sleep(Duration::from_millis(300));
        assert_eq!(fired.load(AtomicOrdering::SeqCst), 1);
    }
}
