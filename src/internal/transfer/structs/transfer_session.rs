use std::time::Instant;

use tracing::debug;

use crate::internal::error::{Result, WebDavError};
use crate::internal::transfer::traits::Clock;
use crate::internal::urn::structs::RemotePath;

use super::{
    CancelHandle, ProgressHandle, Throttle, TransferOptions, TransferProgress,
};

/// 单次上传或下载的状态，每次调用新建，不在传输之间共享
#[derive(Debug)]
pub struct TransferSession {
    path: RemotePath,
    chunk_size: usize,
    throttle: Throttle,
    cancel: CancelHandle,
    progress: ProgressHandle,
    bytes_done: u64,
    total: Option<u64>,
    /// 上一个分块的长度和放行时间，用于计算限速等待
    last_chunk: Option<(usize, Instant)>,
}

impl TransferSession {
    pub fn new(
        path: RemotePath,
        chunk_size: usize,
        throttle: Throttle,
        options: TransferOptions,
    ) -> Self {
        Self {
            path,
            chunk_size,
            throttle,
            cancel: options.cancel.unwrap_or_default(),
            progress: options.progress.unwrap_or_default(),
            bytes_done: options.resume_from,
            total: None,
            last_chunk: None,
        }
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn bytes_done(&self) -> u64 {
        self.bytes_done
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    pub fn progress_handle(&self) -> &ProgressHandle {
        &self.progress
    }

    pub fn set_total(&mut self, total: Option<u64>) {
        self.total = total;
        self.publish();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 已取消时返回 `TransferCancelled`
    pub fn ensure_not_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(WebDavError::TransferCancelled {
                path: self.path.to_string(),
                bytes_transferred: self.bytes_done,
            });
        }
        Ok(())
    }

    /// 放行下一个分块前调用：上一个分块不足限速时长的部分在这里补足
    pub async fn pace(&mut self, clock: &dyn Clock) {
        let Some((len, released)) = self.last_chunk else {
            return;
        };
        let elapsed = clock.now().saturating_duration_since(released);
        let delay = self.throttle.delay_for(len, elapsed);
        if !delay.is_zero() {
            debug!("限速等待 {:?}: {}", delay, self.path);
            clock.sleep(delay).await;
        }
    }

    /// 记录一个已放行的分块并发布进度
    pub fn advance(&mut self, len: usize, released: Instant) {
        self.bytes_done += len as u64;
        self.last_chunk = Some((len, released));
        self.publish();
    }

    fn publish(&self) {
        self.progress.update(TransferProgress {
            bytes_done: self.bytes_done,
            total: self.total,
        });
    }
}
