use super::models::DbTask;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, error};

struct QueueState {
    tasks: VecDeque<DbTask>,
    stop: bool,
}

struct QueueShared {
    state: Mutex<QueueState>,
    task_available: Condvar,
}

/// Single-consumer background queue in front of the persistent store.
///
/// Same discipline as the thread pool, with one consumer and one condvar:
/// producers push under the mutex, the writer thread drains in FIFO order,
/// so writes attributable to one user keep their submission order. Sink
/// failures are logged and swallowed; they never propagate to the
/// submitting request.
///
/// Dropping the queue stops intake, drains what is already queued and
/// joins the writer thread.
pub struct WriteQueue {
    shared: Arc<QueueShared>,
    worker: Option<JoinHandle<()>>,
}

impl WriteQueue {
    /// Spawn the writer thread around `sink`, the actual persistence call.
    pub fn new<F>(sink: F) -> WriteQueue
    where
        F: Fn(DbTask) + Send + 'static,
    {
        let shared = Arc::new(QueueShared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                stop: false,
            }),
            task_available: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("db-writer".to_string())
            .spawn(move || writer_loop(&worker_shared, sink))
            .expect("failed to spawn db writer");

        WriteQueue {
            shared,
            worker: Some(worker),
        }
    }

    /// Queue one task. Returns false once the queue is shutting down.
    pub fn push(&self, task: DbTask) -> bool {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stop {
                return false;
            }
            state.tasks.push_back(task);
        }
        self.shared.task_available.notify_one();
        true
    }

    /// Stop intake, drain the backlog and join the writer.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stop {
                return;
            }
            state.stop = true;
        }
        self.shared.task_available.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn writer_loop<F>(shared: &QueueShared, sink: F)
where
    F: Fn(DbTask),
{
    loop {
        let task = {
            let mut state = shared.state.lock().unwrap();
            while !state.stop && state.tasks.is_empty() {
                state = shared.task_available.wait(state).unwrap();
            }
            if state.stop && state.tasks.is_empty() {
                return;
            }
            state.tasks.pop_front().expect("task queue cannot be empty")
        };

        let login = task.login.clone();
        debug!(%login, "persisting dot");
        if let Err(panic) =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink(task)))
        {
            error!(%login, ?panic, "async persist failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Dot;
    use std::sync::Mutex as StdMutex;

    fn task(login: &str, x: &str) -> DbTask {
        DbTask {
            login: login.to_string(),
            dot: Dot {
                x: x.to_string(),
                y: "0".to_string(),
                r: "1".to_string(),
                hit: false,
                exec_time_ms: 0,
                timestamp: String::new(),
            },
        }
    }

    #[test]
    fn test_fifo_order_preserved() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let mut queue = WriteQueue::new(move |t: DbTask| {
            sink_seen.lock().unwrap().push(t.dot.x.clone());
        });

        for i in 0..20 {
            assert!(queue.push(task("u", &i.to_string())));
        }
        queue.shutdown();

        let seen = seen.lock().unwrap();
        let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        assert_eq!(*seen, expected);
    }

    #[test]
    fn test_push_after_shutdown_is_rejected() {
        let mut queue = WriteQueue::new(|_| {});
        queue.shutdown();
        assert!(!queue.push(task("u", "1")));
    }

    #[test]
    fn test_panicking_sink_keeps_writer_alive() {
        let seen = Arc::new(StdMutex::new(0usize));
        let sink_seen = Arc::clone(&seen);
        let mut queue = WriteQueue::new(move |t: DbTask| {
            if t.dot.x == "boom" {
                panic!("sink failure");
            }
            *sink_seen.lock().unwrap() += 1;
        });

        queue.push(task("u", "boom"));
        queue.push(task("u", "ok"));
        queue.shutdown();
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
