use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// 下载数据的去处，按顺序接收每个分块
#[async_trait]
pub trait TransferSink: Send {
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// 全部分块写完后调用一次
    async fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// tokio 的 `File`、`Vec<u8>` 等都可以直接作为下载目标
#[async_trait]
impl<W> TransferSink for W
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.write_all(chunk).await
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.flush().await
    }
}
