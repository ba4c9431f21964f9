use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Spawns one OS thread per accepted connection. There is no cap on the
/// number of live threads; the counters only feed logging.
#[derive(Default)]
pub struct ConnectionTasks {
    spawned: AtomicUsize,
    live: Arc<AtomicUsize>,
}

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConnectionTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn spawn<F>(&self, f: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.spawned.fetch_add(1, Ordering::SeqCst);

        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(Arc::clone(&self.live));

        // The guard moves into the thread, so the counter drops even when the
        // job panics. If spawning fails the closure is dropped here instead.
        thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let _guard = guard;
                f()
            })
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn live_count_drops_after_job_finishes() {
        let tasks = ConnectionTasks::new();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        tasks
            .spawn(move || {
                started_tx.send(thread::current().name().map(String::from)).unwrap();
                release_rx.recv().unwrap();
                done_tx.send(()).unwrap();
            })
            .unwrap();

        let name = started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("conn-0"));
        assert_eq!(tasks.live(), 1);

        release_tx.send(()).unwrap();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let mut waited = 0;
        while tasks.live() != 0 && waited < 100 {
            thread::sleep(Duration::from_millis(10));
            waited += 1;
        }
        assert_eq!(tasks.live(), 0);
    }

    #[test]
    fn panicking_job_is_isolated() {
        let tasks = ConnectionTasks::new();
        let (tx, rx) = mpsc::channel();

        tasks.spawn(|| panic!("boom")).unwrap();
        tasks.spawn(move || tx.send(42).unwrap()).unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
    }
}
