use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 取消信号，可以在任意任务中触发
///
/// 只在分块之间检查，已经开始写入的分块会完整写完
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
