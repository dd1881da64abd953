use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    jobs: VecDeque<Job>,
    stop: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    jobs_available: Condvar,
    space_available: Condvar,
    max_queue_size: usize,
}

/// Fixed-size worker pool over one bounded job queue.
///
/// One mutex guards the queue; two condvars signal "a job arrived" to
/// workers and "a slot freed" to blocked producers. [`ThreadPool::try_execute`]
/// never blocks and is what the accept loop uses, so overload sheds new
/// connections instead of stalling accept. [`ThreadPool::execute`] blocks
/// until there is room.
///
/// Shutdown wakes every waiter on both condvars; workers finish the job in
/// hand, drain what is already queued and exit. Dropping the pool joins all
/// worker threads.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Zero `thread_count` or `max_queue_size` are clamped to 1.
    pub fn new(thread_count: usize, max_queue_size: usize) -> ThreadPool {
        let thread_count = thread_count.max(1);
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                jobs: VecDeque::new(),
                stop: false,
            }),
            jobs_available: Condvar::new(),
            space_available: Condvar::new(),
            max_queue_size: max_queue_size.max(1),
        });

        let workers = (0..thread_count)
            .map(|index| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("pool-worker-{index}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn pool worker")
            })
            .collect();

        debug!(thread_count, max_queue_size, "thread pool started");
        ThreadPool { shared, workers }
    }

    /// Enqueue without blocking. Returns false when the queue is full or
    /// the pool is stopping; the job is dropped in that case.
    pub fn try_execute<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().unwrap();
        if state.stop || state.jobs.len() >= self.shared.max_queue_size {
            return false;
        }
        state.jobs.push_back(Box::new(job));
        drop(state);
        self.shared.jobs_available.notify_one();
        true
    }

    /// Enqueue, blocking until a slot frees. A no-op when the pool is
    /// stopping.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().unwrap();
        while !state.stop && state.jobs.len() >= self.shared.max_queue_size {
            state = self.shared.space_available.wait(state).unwrap();
        }
        if state.stop {
            return;
        }
        state.jobs.push_back(Box::new(job));
        drop(state);
        self.shared.jobs_available.notify_one();
    }

    /// Stop accepting work, wake all waiters and join the workers.
    /// Already-queued jobs are drained before the workers exit.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stop {
                return;
            }
            state.stop = true;
        }
        self.shared.jobs_available.notify_all();
        self.shared.space_available.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        let job = {
            let mut state = shared.state.lock().unwrap();
            while !state.stop && state.jobs.is_empty() {
                state = shared.jobs_available.wait(state).unwrap();
            }
            if state.stop && state.jobs.is_empty() {
                return;
            }
            let job = state.jobs.pop_front().expect("job queue cannot be empty");
            drop(state);
            shared.space_available.notify_one();
            job
        };

        // A panicking job must not take the worker down with it.
        if let Err(panic) = catch_unwind(AssertUnwindSafe(job)) {
            error!(?panic, "worker job panicked");
        }
    }
}
