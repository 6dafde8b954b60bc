use super::cancel_handle::CancelHandle;
use super::transfer_progress::ProgressHandle;

/// 单次传输的可选参数
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// 下载续传的起始偏移，0 表示从头开始
    pub resume_from: u64,
    pub cancel: Option<CancelHandle>,
    pub progress: Option<ProgressHandle>,
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume_from(mut self, offset: u64) -> Self {
        self.resume_from = offset;
        self
    }

    pub fn cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn progress(mut self, progress: ProgressHandle) -> Self {
        self.progress = Some(progress);
        self
    }
}
