//! # Runtime configuration.
//!
//! [`Config`] sizes the command dispatcher owned by the application.
//!
//! ## Sentinel values
//! - `dispatch_workers = 0` → clamped to one worker
//! - `dispatch_queue_capacity = 0` → clamped to a queue of one
//!
//! # Example
//! ```
//! use tracevisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.dispatch_workers = 4;
//!
//! assert_eq!(cfg.workers_clamped(), 4);
//! assert_eq!(cfg.queue_capacity_clamped(), 1024);
//! ```

/// Configuration for the command dispatch worker pool.
///
/// ## Field semantics
/// - `dispatch_workers`: number of worker tasks. A session is always routed to
///   the same worker, so per-session delivery order holds for any value; `1`
///   additionally orders commands across sessions.
/// - `dispatch_queue_capacity`: bounded queue size per worker. Posting into a
///   full queue fails with [`DispatchError::Full`](crate::DispatchError::Full).
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of dispatcher workers.
    pub dispatch_workers: usize,

    /// Capacity of each worker queue.
    pub dispatch_queue_capacity: usize,
}

impl Config {
    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.dispatch_workers.max(1)
    }

    /// Returns the per-worker queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.dispatch_queue_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `dispatch_workers = 1` (single ordered queue)
    /// - `dispatch_queue_capacity = 1024`
    fn default() -> Self {
        Self {
            dispatch_workers: 1,
            dispatch_queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_clamped() {
        let cfg = Config {
            dispatch_workers: 0,
            dispatch_queue_capacity: 0,
        };
        assert_eq!(cfg.workers_clamped(), 1);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
    }
}
