use super::{Labels, Script, Stack, Var};
use crate::config::Config;
use crate::error;
use crate::lang::Error;
use std::mem::size_of;

type Result<T> = std::result::Result<T, Error>;

/// Bookkeeping cost of one hash map entry or vector slot beyond its payload.
const ENTRY_OVERHEAD: usize = 16;

/// Estimated bytes of working memory held by a value.
pub trait Footprint {
    fn footprint(&self) -> usize;
}

impl Footprint for Script {
    fn footprint(&self) -> usize {
        self.lines()
            .map(|line| line.len() + size_of::<usize>() * 2 + ENTRY_OVERHEAD)
            .sum()
    }
}

impl Footprint for Var {
    fn footprint(&self) -> usize {
        self.iter()
            .map(|(name, _)| name.len() + size_of::<f64>() + size_of::<usize>() * 2 + ENTRY_OVERHEAD)
            .sum()
    }
}

impl Footprint for Labels {
    fn footprint(&self) -> usize {
        self.iter()
            .map(|(name, _)| name.len() + size_of::<usize>() * 4 + ENTRY_OVERHEAD)
            .sum()
    }
}

impl<T> Footprint for Stack<T> {
    fn footprint(&self) -> usize {
        self.len() * size_of::<T>()
    }
}

/// ## Resource guard
///
/// Halts a run whose estimated footprint leaves less than `threshold` bytes
/// of the budget free.

#[derive(Debug, Clone, Copy)]
pub struct Guard {
    budget: usize,
    threshold: usize,
}

impl Guard {
    pub fn new(config: &Config) -> Guard {
        Guard {
            budget: config.memory_budget,
            threshold: config.memory_threshold,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn free(&self, used: usize) -> usize {
        self.budget.saturating_sub(used)
    }

    pub fn check(&self, used: usize) -> Result<()> {
        let free = self.free(used);
        if free < self.threshold {
            tracing::warn!("memory low: {} bytes free of {}", free, self.budget);
            return Err(error!(MemoryLow; format!("{} BYTES FREE", free)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_check() {
        let config = Config {
            memory_budget: 10_000,
            memory_threshold: 3_000,
            ..Config::default()
        };
        let guard = Guard::new(&config);
        assert!(guard.check(0).is_ok());
        assert!(guard.check(7_000).is_ok());
        assert_eq!(guard.check(7_001).unwrap_err().code(), ErrorCode::MemoryLow);
        assert_eq!(guard.check(50_000).unwrap_err().code(), ErrorCode::MemoryLow);
    }

    #[test]
    fn test_footprint_grows() {
        let mut var = Var::new();
        let empty = var.footprint();
        var.store("counter", 1.0);
        assert!(var.footprint() > empty);
        let script = Script::from_str("t", "SET a = 1\nEND");
        assert!(script.footprint() >= "SET a = 1END".len());
    }
}
