use std::num::NonZeroU64;
use std::time::Duration;

/// 限速策略：每个分块至少占用 `chunk_len / limit` 秒
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Throttle {
    limit: Option<NonZeroU64>, // 字节/秒，None 表示不限速
}

impl Throttle {
    pub fn new(limit: Option<NonZeroU64>) -> Self {
        Self { limit }
    }

    pub fn unlimited() -> Self {
        Self { limit: None }
    }

    pub fn limit(&self) -> Option<NonZeroU64> {
        self.limit
    }

    /// `chunk_len` 字节已经用了 `elapsed`，还需要等待多久；最少为 0
    pub fn delay_for(&self, chunk_len: usize, elapsed: Duration) -> Duration {
        let Some(limit) = self.limit else {
            return Duration::ZERO;
        };
        let expected =
            Duration::from_secs_f64(chunk_len as f64 / limit.get() as f64);
        expected.saturating_sub(elapsed)
    }
}
