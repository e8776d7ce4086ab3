//! Connection identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for one socket.
///
/// A player who reconnects arrives on a new `ConnectionId`; mapping it back
/// to their identity is the registry's job, not the transport's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw id. Tests use this to fabricate connections.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next id from the process-wide counter, starting at 1.
    pub fn next() -> Self {
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_next_is_increasing_and_nonzero() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert!(a.get() > 0);
        assert!(b > a);
    }
}
