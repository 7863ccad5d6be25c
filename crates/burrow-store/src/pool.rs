//! Bounded pool of read-only file handles.
//!
//! Blob streaming happens outside the store lock, so every reader needs its
//! own handle. The pool caps how many exist; `acquire` blocks until one is
//! returned. This is the only place the read path can block besides I/O.

use std::fs::File;

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub(crate) struct FdPool {
    handles: Mutex<Vec<File>>,
    available: Condvar,
}

impl FdPool {
    pub(crate) fn new(handles: Vec<File>) -> Self {
        Self {
            handles: Mutex::new(handles),
            available: Condvar::new(),
        }
    }

    /// Takes a handle, blocking until one is free.
    pub(crate) fn acquire(&self) -> File {
        let mut guard = self.handles.lock();
        while guard.is_empty() {
            self.available.wait(&mut guard);
        }
        guard.pop().expect("non-empty after wait")
    }

    /// Returns a handle to the pool.
    pub(crate) fn release(&self, file: File) {
        self.handles.lock().push(file);
        self.available.notify_one();
    }

    /// Closes every pooled handle. Handles still leased stay valid and are
    /// dropped when released afterwards.
    pub(crate) fn drain(&self) {
        self.handles.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn pool_of(n: usize) -> (Arc<FdPool>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"contents").unwrap();
        let handles = (0..n).map(|_| File::open(&path).unwrap()).collect();
        (Arc::new(FdPool::new(handles)), dir)
    }

    #[test]
    fn test_acquire_release() {
        let (pool, _dir) = pool_of(2);
        let a = pool.acquire();
        let _b = pool.acquire();
        pool.release(a);
        let _c = pool.acquire();
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let (pool, _dir) = pool_of(1);
        let held = pool.acquire();

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let f = pool.acquire();
                pool.release(f);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        pool.release(held);
        waiter.join().unwrap();
    }

    #[test]
    fn test_contention_many_threads() {
        let (pool, _dir) = pool_of(2);
        let threads: Vec<_> = (0..16)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let f = pool.acquire();
                        pool.release(f);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
    }
}
