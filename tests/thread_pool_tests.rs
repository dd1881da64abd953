use quadrant::server::ThreadPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Park one worker on a job until the returned sender is dropped or sent.
fn block_worker(pool: &ThreadPool) -> (mpsc::Sender<()>, mpsc::Receiver<()>) {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    assert!(pool.try_execute(move || {
        started_tx.send(()).unwrap();
        let _ = release_rx.recv();
    }));
    (release_tx, started_rx)
}

#[test]
fn test_try_execute_full_queue_returns_false() {
    let pool = ThreadPool::new(1, 2);
    let (release, started) = block_worker(&pool);
    started
        .recv_timeout(Duration::from_secs(2))
        .expect("worker never started");

    // The single worker is parked, so these two fill the queue exactly.
    assert!(pool.try_execute(|| {}));
    assert!(pool.try_execute(|| {}));
    assert!(!pool.try_execute(|| {}));
    assert!(!pool.try_execute(|| {}));

    // Releasing the worker drains the queue; a slot frees up.
    release.send(()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if pool.try_execute(|| {}) {
            break;
        }
        assert!(Instant::now() < deadline, "queue never drained");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_execute_blocks_until_space() {
    let pool = Arc::new(ThreadPool::new(1, 1));
    let (release, started) = block_worker(&pool);
    started
        .recv_timeout(Duration::from_secs(2))
        .expect("worker never started");
    assert!(pool.try_execute(|| {})); // queue now full

    let ran = Arc::new(AtomicUsize::new(0));
    let producer = {
        let pool = Arc::clone(&pool);
        let ran = Arc::clone(&ran);
        std::thread::spawn(move || {
            // Blocks here until the parked worker drains the queue.
            pool.execute(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            });
        })
    };

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(ran.load(Ordering::SeqCst), 0, "job ran before space freed");

    release.send(()).unwrap();
    producer.join().unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while ran.load(Ordering::SeqCst) == 0 {
        assert!(Instant::now() < deadline, "blocked job never ran");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_shutdown_drains_queued_jobs_and_rejects_new_ones() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut pool = ThreadPool::new(2, 64);
    for _ in 0..32 {
        let counter = Arc::clone(&counter);
        assert!(pool.try_execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    }

    pool.shutdown();
    // Everything submitted before the stop flag ran to completion.
    assert_eq!(counter.load(Ordering::SeqCst), 32);

    // Nothing submitted after stop runs.
    let late = Arc::new(AtomicUsize::new(0));
    let l = Arc::clone(&late);
    assert!(!pool.try_execute(move || {
        l.fetch_add(1, Ordering::SeqCst);
    }));
    let l = Arc::clone(&late);
    pool.execute(move || {
        l.fetch_add(1, Ordering::SeqCst);
    });
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(late.load(Ordering::SeqCst), 0);
}

#[test]
fn test_many_jobs_across_workers() {
    let counter = Arc::new(AtomicUsize::new(0));
    let pool = ThreadPool::new(4, 1024);
    for _ in 0..500 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    drop(pool);
    assert_eq!(counter.load(Ordering::SeqCst), 500);
}
