//! 辩论轮数选择

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RoundPicker: Send {
    /// 在 [min, max] 闭区间内选一个轮数
    fn pick(&mut self, min: usize, max: usize) -> usize;
}

pub struct RandomRounds {
    rng: StdRng,
}

impl RandomRounds {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomRounds {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundPicker for RandomRounds {
    fn pick(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// 按给定序列循环返回（测试用）
#[derive(Debug, Clone)]
pub struct FixedRounds {
    values: Vec<usize>,
    next: usize,
}

impl FixedRounds {
    pub fn new(rounds: usize) -> Self {
        Self::cycle(vec![rounds])
    }

    pub fn cycle(values: Vec<usize>) -> Self {
        Self { values, next: 0 }
    }
}

impl RoundPicker for FixedRounds {
    fn pick(&mut self, min: usize, _max: usize) -> usize {
        if self.values.is_empty() {
            return min;
        }
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}
