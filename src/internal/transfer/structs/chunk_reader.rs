use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use futures_util::StreamExt;

use crate::internal::transport::traits::transport::{BodyStream, TransportError};

/// 把响应体流重新切成固定大小的分块，只有最后一块可能更短
///
/// 每次读取单独计时，慢但持续有数据的传输不会因为总时长超时
pub struct ChunkReader {
    stream: BodyStream,
    buffer: BytesMut,
    chunk_size: usize,
    read_timeout: Option<Duration>,
    /// 还需要丢弃的前导字节数
    skip: u64,
    finished: bool,
}

impl ChunkReader {
    pub fn new(stream: BodyStream, chunk_size: usize) -> Self {
        Self {
            stream,
            buffer: BytesMut::new(),
            chunk_size: chunk_size.max(1),
            read_timeout: None,
            skip: 0,
            finished: false,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// 丢弃响应体开头的 `bytes` 个字节
    pub fn skip(mut self, bytes: u64) -> Self {
        self.skip = bytes;
        self
    }

    async fn read_once(&mut self) -> Result<Option<Bytes>, TransportError> {
        let next = match self.read_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.stream.next())
                .await
                .map_err(|_| TransportError::Timeout(timeout))?,
            None => self.stream.next().await,
        };
        next.transpose()
    }

    /// 下一个分块；流结束且缓冲为空时返回 `None`
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        while self.buffer.len() < self.chunk_size && !self.finished {
            match self.read_once().await? {
                Some(mut data) => {
                    if self.skip > 0 {
                        let dropped = self.skip.min(data.len() as u64);
                        data.advance(dropped as usize);
                        self.skip -= dropped;
                    }
                    self.buffer.extend_from_slice(&data);
                }
                None => self.finished = true,
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }
        let take = self.buffer.len().min(self.chunk_size);
        Ok(Some(self.buffer.split_to(take).freeze()))
    }
}
