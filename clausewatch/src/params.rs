use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// 0: implied literals get the current level, 1: they get the highest
    /// level of their reason, 2: additionally move watches to keep the two
    /// watched literals on the two highest levels of the clause.
    pub chrono: u8,
    /// Run the warmup pass before local search.
    pub warmup: bool,
    /// Redundant clauses larger than this with glue above `keep_glue` get an
    /// `analyzed` time stamp.
    pub keep_size: usize,
    pub keep_glue: u32,
    /// Redundant clauses with glue up to this are always considered kept.
    pub tier1_glue: u32,
    pub kept_size: usize,
    pub kept_glue: u32,
    /// Move surviving clauses into a fresh bulk arena after collection.
    pub arena: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            chrono: 1,
            warmup: true,
            keep_size: 3,
            keep_glue: 2,
            tier1_glue: 2,
            kept_size: 40,
            kept_glue: 8,
            arena: true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WarmupStatistics {
    pub runs: u64,
    pub assigned: u64,
    pub time: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Statistics {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub warmup: WarmupStatistics,
}
