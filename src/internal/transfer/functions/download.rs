//! 下载分块循环。

use tracing::debug;

use crate::internal::error::{Result, WebDavError};
use crate::internal::transfer::structs::{ChunkReader, TransferSession};
use crate::internal::transfer::traits::{Clock, TransferSink};

/// 逐块读取响应体并写入 `sink`，返回传输结束时的 `bytes_done`。
///
/// 每个分块依次经过：读取 → 限速等待 → 取消检查 → 写入 → 更新进度。
/// 取消时响应体流随 `reader` 一起释放，已写入的数据保留。
pub async fn download_body<S>(
    mut reader: ChunkReader,
    sink: &mut S,
    session: &mut TransferSession,
    clock: &dyn Clock,
) -> Result<u64>
where
    S: TransferSink + ?Sized,
{
    let mut chunks = 0usize;

    loop {
        let chunk = reader.next_chunk().await.map_err(|e| {
            WebDavError::TransferFailed {
                path: session.path().to_string(),
                message: e.to_string(),
            }
        })?;
        let Some(chunk) = chunk else {
            break;
        };

        session.pace(clock).await;
        session.ensure_not_cancelled()?;

        let released = clock.now();
        sink.write_chunk(&chunk).await.map_err(|e| {
            WebDavError::TransferFailed {
                path: session.path().to_string(),
                message: format!("写入下载目标失败: {e}"),
            }
        })?;
        session.advance(chunk.len(), released);
        chunks += 1;
    }

    sink.finish().await.map_err(|e| WebDavError::TransferFailed {
        path: session.path().to_string(),
        message: format!("写入下载目标失败: {e}"),
    })?;

    debug!(
        "下载完成 {}: {} 字节，{} 个分块",
        session.path(),
        session.bytes_done(),
        chunks
    );
    Ok(session.bytes_done())
}
