use crossbeam_channel::{Receiver, bounded};

use crate::error::JobError;
use crate::graph::JobHandle;

trait PendingJob: Send {
    fn is_finished(&self) -> bool;
    fn finalize(self: Box<Self>);
}

struct Continuation<T, F> {
    handle: JobHandle<T>,
    then: F,
}

impl<T, F> PendingJob for Continuation<T, F>
where
    T: Send + 'static,
    F: FnOnce(Result<T, JobError>) + Send + 'static,
{
    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    fn finalize(self: Box<Self>) {
        let Continuation { handle, then } = *self;
        // Known finished, so this never blocks.
        then(handle.complete());
    }
}

/// Holds (handle, continuation) pairs and drains the finished ones once per tick.
///
/// `tick` never waits: unfinished handles are skipped until a later tick.
#[derive(Default)]
pub struct JobScheduler {
    pending: Vec<Box<dyn PendingJob>>,
    finalized: u64,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<T, F>(&mut self, handle: JobHandle<T>, then: F)
    where
        T: Send + 'static,
        F: FnOnce(Result<T, JobError>) + Send + 'static,
    {
        self.pending.push(Box::new(Continuation { handle, then }));
    }

    /// Resolves into the returned receiver on the tick that finalizes `handle`.
    pub fn schedule_future<T>(&mut self, handle: JobHandle<T>) -> Receiver<Result<T, JobError>>
    where
        T: Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.schedule(handle, move |res| {
            let _ = tx.send(res);
        });
        rx
    }

    /// Finalizes every finished job and returns how many ran.
    pub fn tick(&mut self) -> usize {
        let mut done = 0;
        let mut waiting = Vec::with_capacity(self.pending.len());
        // submission order
        for job in std::mem::take(&mut self.pending) {
            if job.is_finished() {
                job.finalize();
                done += 1;
            } else {
                waiting.push(job);
            }
        }
        self.pending = waiting;
        self.finalized += done as u64;
        if done > 0 {
            log::trace!(
                target: "scheduler",
                "finalized {} jobs, {} pending",
                done,
                self.pending.len()
            );
        }
        done
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total continuations run since creation.
    pub fn finalized(&self) -> u64 {
        self.finalized
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("pending", &self.pending.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}
