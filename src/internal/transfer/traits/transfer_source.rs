use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

/// 上传数据的来源
#[async_trait]
pub trait TransferSource: Send {
    /// 读取最多 `max` 字节；读到末尾返回 `None`
    async fn read_chunk(&mut self, max: usize) -> io::Result<Option<Bytes>>;
}

#[async_trait]
impl<R> TransferSource for R
where
    R: AsyncRead + Unpin + Send,
{
    async fn read_chunk(&mut self, max: usize) -> io::Result<Option<Bytes>> {
        // 尽量填满一个分块，只有末尾的分块会更短
        let mut buf = vec![0u8; max];
        let mut filled = 0;
        while filled < max {
            let n = self.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}
