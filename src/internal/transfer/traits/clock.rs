use std::time::{Duration, Instant};

use async_trait::async_trait;

/// 可替换的时钟，限速等待通过它进行
///
/// 测试中换成虚拟时钟，就不需要真的等待
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// 基于 tokio 定时器的真实时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
