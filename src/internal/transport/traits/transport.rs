//! 传输层能力：发送一个请求，拿到状态码、响应头和响应体流。
//!
//! 连接池、TLS、代理都由实现方负责；核心只依赖这一个方法，
//! 因此 reqwest 客户端、原生 socket 或测试替身都可以接入。

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{stream, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

use crate::internal::webdav::request::WebDavRequest;

/// 响应体 / 流式请求体
pub type BodyStream =
    Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("请求超时（{0:?}）")]
    Timeout(Duration),

    #[error("读取响应体失败: {0}")]
    Body(String),

    #[error("读取上传数据失败: {0}")]
    Source(String),

    #[error("传输被取消")]
    Cancelled,
}

/// 传输层返回的响应
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self { status, headers, body }
    }

    /// 用一段完整字节构造响应（响应体只有一块）
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        let stream: BodyStream = if body.is_empty() {
            Box::pin(stream::empty::<Result<Bytes, TransportError>>())
        } else {
            Box::pin(stream::once(async move { Ok::<_, TransportError>(body) }))
        };
        Self::new(status, HeaderMap::new(), stream)
    }

    /// 读取完整响应体
    pub async fn bytes(mut self) -> Result<Bytes, TransportError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// 响应头的字符串值
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// 传输层接口，只有一个方法
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: WebDavRequest,
    ) -> Result<TransportResponse, TransportError>;
}
