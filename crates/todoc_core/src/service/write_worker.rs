//! Single-thread sequential executor for store writes.
//!
//! # Responsibility
//! - Run submitted write jobs off the caller's thread.
//! - Hand each job's outcome back through a `PendingWrite`.
//!
//! # Invariants
//! - At most one job runs at a time; jobs run in submission order.
//! - Submitted jobs always run to completion; dropping the worker drains
//!   the queue before the thread exits.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Returned when the worker thread is gone and can no longer accept or
/// complete jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStopped;

impl Display for WorkerStopped {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "write worker stopped")
    }
}

impl Error for WorkerStopped {}

/// Background writer owning one dedicated thread.
pub struct WriteWorker {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl WriteWorker {
    /// Spawns the worker thread under `name`.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                info!("event=write_worker module=service status=start thread={thread_name}");
                let mut completed: u64 = 0;
                for job in receiver {
                    job();
                    completed += 1;
                }
                info!(
                    "event=write_worker module=service status=stopped thread={thread_name} jobs={completed}"
                );
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queues `job` and returns a handle to its result.
    pub fn submit<T, F>(&self, job: F) -> Result<PendingWrite<T>, WorkerStopped>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(WorkerStopped)?;
        let (result_tx, result_rx) = mpsc::sync_channel(1);
        sender
            .send(Box::new(move || {
                // The caller may have dropped its PendingWrite; the job still ran.
                let _ = result_tx.send(job());
            }))
            .map_err(|_| WorkerStopped)?;
        Ok(PendingWrite {
            receiver: result_rx,
        })
    }
}

impl Drop for WriteWorker {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=write_worker module=service status=error error_code=worker_panicked");
            }
        }
    }
}

/// Outcome of a queued write. Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite<T> {
    receiver: Receiver<T>,
}

impl<T> PendingWrite<T> {
    /// Blocks until the job has run.
    pub fn wait(self) -> Result<T, WorkerStopped> {
        self.receiver.recv().map_err(|_| WorkerStopped)
    }

    /// Blocks up to `timeout`; `Ok(None)` means the job has not finished yet.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<T>, WorkerStopped> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Ok(Some(value)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerStopped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WriteWorker;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn jobs_run_in_submission_order_on_one_thread() {
        let worker = WriteWorker::spawn("test-writer").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let pending: Vec<_> = (0..20)
            .map(|index| {
                let seen = Arc::clone(&seen);
                worker
                    .submit(move || {
                        seen.lock().unwrap().push(index);
                        thread::current().name().map(str::to_string)
                    })
                    .unwrap()
            })
            .collect();

        for write in pending {
            assert_eq!(write.wait().unwrap().as_deref(), Some("test-writer"));
        }
        assert_eq!(*seen.lock().unwrap(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn drop_drains_queued_jobs() {
        let seen = Arc::new(Mutex::new(0));
        {
            let worker = WriteWorker::spawn("drain-writer").unwrap();
            for _ in 0..10 {
                let seen = Arc::clone(&seen);
                let _ = worker.submit(move || *seen.lock().unwrap() += 1).unwrap();
            }
        }
        assert_eq!(*seen.lock().unwrap(), 10);
    }
}
