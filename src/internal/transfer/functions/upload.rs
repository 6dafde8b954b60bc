//! 上传请求体：把数据源包装成按分块放行的流。

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::sync::watch;

use crate::internal::transfer::enums::UploadEnd;
use crate::internal::transfer::structs::TransferSession;
use crate::internal::transfer::traits::{Clock, TransferSource};
use crate::internal::transport::traits::transport::{BodyStream, TransportError};

struct UploadState<S> {
    source: S,
    session: TransferSession,
    clock: Arc<dyn Clock>,
    ended: watch::Sender<UploadEnd>,
}

impl<S: TransferSource> UploadState<S> {
    /// 读取 → 限速等待 → 取消检查 → 交给传输层
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        let chunk = self
            .source
            .read_chunk(self.session.chunk_size())
            .await
            .map_err(|e| TransportError::Source(e.to_string()))?;
        let Some(chunk) = chunk else {
            return Ok(None);
        };

        self.session.pace(self.clock.as_ref()).await;
        if self.session.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let released = self.clock.now();
        self.session.advance(chunk.len(), released);
        Ok(Some(chunk))
    }
}

/// 构造 PUT 请求体流。
///
/// 进度通过 session 的 [`ProgressHandle`](crate::internal::transfer::structs::ProgressHandle)
/// 对外发布；出错或取消后流立即结束。返回的接收端报告流的结束方式。
pub fn upload_body<S>(
    source: S,
    session: TransferSession,
    clock: Arc<dyn Clock>,
) -> (BodyStream, watch::Receiver<UploadEnd>)
where
    S: TransferSource + 'static,
{
    let (ended, receiver) = watch::channel(UploadEnd::Pending);
    let state = UploadState { source, session, clock, ended };
    let body = stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        match state.next_chunk().await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(state))),
            Ok(None) => {
                state.ended.send_replace(UploadEnd::Finished);
                None
            }
            Err(e) => {
                let end = match e {
                    TransportError::Cancelled => UploadEnd::Cancelled,
                    _ => UploadEnd::Failed,
                };
                state.ended.send_replace(end);
                Some((Err(e), None))
            }
        }
    })
    .boxed();
    (body, receiver)
}
