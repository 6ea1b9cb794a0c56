//! Context pool: explicit acquire/release reuse of per-request contexts.
//!
//! A context handed out is owned by exactly one task until released; the
//! mandatory reset between acquire and dispatch clears all state from the
//! previous request. The pool is unbounded: under load it grows to the
//! peak number of concurrent requests and then serves from the free list.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::context::Context;

/// Thread-safe pool of reusable [`Context`] objects.
pub struct ContextPool {
    idle: Mutex<Vec<Box<Context>>>,
    created: AtomicUsize,
    reused: AtomicUsize,
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Contexts allocated over the pool's lifetime.
    pub created: usize,
    /// Acquisitions served from the free list.
    pub reused: usize,
    /// Contexts currently idle.
    pub idle: usize,
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextPool {
    pub fn new() -> Self {
        ContextPool {
            idle: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }

    /// Pre-warm the pool with `reserve` idle contexts.
    pub fn with_reserve(reserve: usize) -> Self {
        let pool = Self::new();
        {
            let mut idle = pool.idle.lock().unwrap();
            for _ in 0..reserve {
                idle.push(Box::new(Context::idle()));
            }
        }
        pool.created.store(reserve, Ordering::Relaxed);
        pool
    }

    /// Check a context out of the pool, allocating when the free list is
    /// empty. The caller must reset it before dispatching.
    pub fn acquire(&self) -> Box<Context> {
        if let Some(ctx) = self.idle.lock().unwrap().pop() {
            self.reused.fetch_add(1, Ordering::Relaxed);
            return ctx;
        }
        self.created.fetch_add(1, Ordering::Relaxed);
        Box::new(Context::idle())
    }

    /// Return a context to the pool. The transport sink is dropped here so
    /// no handle outlives the request.
    pub fn release(&self, mut ctx: Box<Context>) {
        ctx.detach();
        self.idle.lock().unwrap().push(ctx);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            idle: self.idle.lock().unwrap().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_reuses_contexts() {
        let pool = ContextPool::new();
        let ctx = pool.acquire();
        pool.release(ctx);
        let _ctx = pool.acquire();

        let stats = pool.stats();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.idle, 0);
    }

    #[test]
    fn test_reserve_prewarms_the_free_list() {
        let pool = ContextPool::with_reserve(4);
        assert_eq!(pool.stats().idle, 4);
        let _ctx = pool.acquire();
        let stats = pool.stats();
        assert_eq!(stats.created, 4);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.idle, 3);
    }
}
