//! Screen identifiers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of one screen instance, unique per [`IdGenerator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(u64);

impl ScreenId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen-{}", self.0)
    }
}

/// Monotonic id source.
///
/// Owned by the application root and shared through `NavigationContext`;
/// two generators never share state.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `first`
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_screen_id(&self) -> ScreenId {
        ScreenId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_independent() {
        let a = IdGenerator::new();
        let b = IdGenerator::starting_at(10);

        assert_eq!(a.next_screen_id().get(), 0);
        assert_eq!(a.next_screen_id().get(), 1);
        assert_eq!(b.next_screen_id().get(), 10);
        assert_eq!(a.next_screen_id().to_string(), "screen-2");
    }
}
