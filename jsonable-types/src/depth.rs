//! Recursion guard for nested encode, decode and zero synthesis.

use crate::{Error, Result};

/// Default nesting limit, matching `serde_json`'s own parser limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Current nesting level and the limit it may not pass.
///
/// `Depth` is `Copy`: each recursive call receives the value returned by
/// [`descend`](Self::descend) while its caller keeps its own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    level: usize,
    limit: usize,
}

impl Depth {
    /// Creates a guard at level zero with the given limit.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { level: 0, limit }
    }

    /// Returns the current level.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Enters one more level of nesting.
    pub fn descend(self) -> Result<Self> {
        if self.level >= self.limit {
            return Err(Error::DepthExceeded { limit: self.limit });
        }
        Ok(Self {
            level: self.level + 1,
            limit: self.limit,
        })
    }
}

impl Default for Depth {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descend_counts_levels() {
        let depth = Depth::new(2);
        let one = depth.descend().unwrap();
        let two = one.descend().unwrap();
        assert_eq!(one.level(), 1);
        assert_eq!(two.level(), 2);
        assert!(matches!(
            two.descend(),
            Err(Error::DepthExceeded { limit: 2 })
        ));
    }

    #[test]
    fn zero_limit_rejects_any_nesting() {
        assert!(Depth::new(0).descend().is_err());
    }
}
