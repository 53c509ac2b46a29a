use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::JobError;

type Task = Box<dyn FnOnce() + Send + 'static>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Default)]
struct NodeState {
    finished: bool,
    dependents: Vec<Arc<Node>>,
}

/// One vertex of the DAG. `pending` counts unfinished dependencies plus one guard that is
/// released once all edges are wired; the node is handed to the pool when it reaches zero.
struct Node {
    pending: AtomicUsize,
    task: Mutex<Option<Task>>,
    state: Mutex<NodeState>,
    done: Condvar,
    pool: Option<Arc<ThreadPool>>,
}

impl Node {
    fn new(pool: Option<Arc<ThreadPool>>, deps: usize, task: Option<Task>) -> Arc<Node> {
        Arc::new(Node {
            pending: AtomicUsize::new(deps + 1),
            task: Mutex::new(task),
            state: Mutex::new(NodeState::default()),
            done: Condvar::new(),
            pool,
        })
    }

    fn finished() -> Arc<Node> {
        let node = Node::new(None, 0, None);
        lock(&node.state).finished = true;
        node
    }

    fn release(self: &Arc<Self>) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            let node = Arc::clone(self);
            match &self.pool {
                Some(pool) => pool.spawn(move || node.run()),
                None => node.run(),
            }
        }
    }

    fn run(self: Arc<Self>) {
        let task = lock(&self.task).take();
        if let Some(task) = task {
            task();
        }
        let dependents = {
            let mut st = lock(&self.state);
            st.finished = true;
            std::mem::take(&mut st.dependents)
        };
        self.done.notify_all();
        for d in dependents {
            d.release();
        }
    }

    /// Registers `dependent` to be released when this node finishes. Returns false if this
    /// node already finished, in which case the caller releases it directly.
    fn add_dependent(&self, dependent: &Arc<Node>) -> bool {
        let mut st = lock(&self.state);
        if st.finished {
            return false;
        }
        st.dependents.push(Arc::clone(dependent));
        true
    }

    fn is_finished(&self) -> bool {
        lock(&self.state).finished
    }

    fn wait(&self) {
        let mut st = lock(&self.state);
        while !st.finished {
            st = self.done.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Type-erased reference to a job, used to declare dependency edges.
#[derive(Clone)]
pub struct JobToken(Arc<Node>);

type Slot<T> = Arc<Mutex<Option<Result<T, JobError>>>>;

/// Handle to a job's eventual result. Cloning shares the same job and result slot.
pub struct JobHandle<T> {
    node: Arc<Node>,
    slot: Slot<T>,
}

impl<T> Clone for JobHandle<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> JobHandle<T> {
    pub fn token(&self) -> JobToken {
        JobToken(Arc::clone(&self.node))
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.node.is_finished()
    }

    /// Blocks the caller until the job has run.
    pub fn wait(&self) {
        self.node.wait();
    }

    /// Moves the result out without blocking.
    pub fn take(&self) -> Result<T, JobError> {
        if !self.is_finished() {
            return Err(JobError::NotFinished);
        }
        lock(&self.slot).take().unwrap_or(Err(JobError::AlreadyTaken))
    }

    /// Blocking variant of [`take`](Self::take).
    pub fn complete(self) -> Result<T, JobError> {
        self.wait();
        self.take()
    }

    /// Borrows the result in place without blocking.
    pub fn peek<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, JobError> {
        if !self.is_finished() {
            return Err(JobError::NotFinished);
        }
        match lock(&self.slot).as_ref() {
            Some(Ok(v)) => Ok(f(v)),
            Some(Err(e)) => Err(e.clone()),
            None => Err(JobError::AlreadyTaken),
        }
    }

    /// Reads this handle's value from inside a dependent stage; any failure upstream turns
    /// into [`JobError::DependencyFailed`].
    pub fn input(&self) -> Result<T, JobError>
    where
        T: Clone,
    {
        self.peek(T::clone).map_err(|_| JobError::DependencyFailed)
    }

    /// Like [`input`](Self::input) for a single consumer that takes ownership.
    pub fn take_input(&self) -> Result<T, JobError> {
        self.take().map_err(|_| JobError::DependencyFailed)
    }
}

/// Builds DAGs of jobs on a dedicated rayon pool. A job runs once every dependency has
/// finished, successfully or not; panics are caught and stored as [`JobError::Panicked`].
pub struct JobGraph {
    pool: Arc<ThreadPool>,
}

impl JobGraph {
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("bitvox-worker-{i}"))
            .build()?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn spawn<T, F>(&self, f: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.spawn_after(&[], move || Ok(f()))
    }

    pub fn spawn_after<T, F>(&self, deps: &[JobToken], f: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, JobError> + Send + 'static,
    {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        let task: Task = Box::new(move || {
            let res = match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(r) => r,
                Err(payload) => {
                    let msg = panic_message(payload.as_ref());
                    log::error!(target: "scheduler", "job panicked: {msg}");
                    Err(JobError::Panicked(msg))
                }
            };
            *lock(&out) = Some(res);
        });

        let node = Node::new(Some(Arc::clone(&self.pool)), deps.len(), Some(task));
        for JobToken(dep) in deps {
            if !dep.add_dependent(&node) {
                node.release();
            }
        }
        node.release();
        JobHandle { node, slot }
    }

    /// A handle that is already finished with `value`; dependents see it immediately.
    pub fn completed<T>(&self, value: T) -> JobHandle<T> {
        JobHandle {
            node: Node::finished(),
            slot: Arc::new(Mutex::new(Some(Ok(value)))),
        }
    }
}

impl std::fmt::Debug for JobGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobGraph").field("threads", &self.threads()).finish()
    }
}
