use std::sync::Arc;

use tokio::sync::watch;

/// 传输进度：已传输字节数只增不减
///
/// 续传时 `bytes_done` 从续传偏移开始计算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// 已传输的字节数
    pub bytes_done: u64,
    /// 总大小（字节），未知时为 `None`
    pub total: Option<u64>,
}

impl TransferProgress {
    /// 进度百分比（0～100）；总大小为 0 或未知时返回 `f64::NAN`。
    pub fn pct(&self) -> f64 {
        self.total
            .filter(|&t| t > 0)
            .map(|t| (self.bytes_done as f64 / t as f64) * 100.0)
            .unwrap_or(f64::NAN)
    }
}

/// 进度的发布端，clone 后共享同一份状态
///
/// 通过 [`ProgressHandle::subscribe`] 监听每次更新
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    sender: Arc<watch::Sender<TransferProgress>>,
}

impl Default for ProgressHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(TransferProgress::default());
        Self { sender: Arc::new(sender) }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransferProgress> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> TransferProgress {
        *self.sender.borrow()
    }

    /// 没有监听者时也会更新当前值
    pub(crate) fn update(&self, progress: TransferProgress) {
        self.sender.send_replace(progress);
    }
}
