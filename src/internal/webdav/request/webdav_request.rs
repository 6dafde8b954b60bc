use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::internal::transport::traits::transport::BodyStream;

/// 请求体
pub enum RequestBody {
    Empty,
    Bytes(Bytes),
    /// 流式请求体；`length` 已知时带 Content-Length，未知时走分块传输
    Stream {
        stream: BodyStream,
        length: Option<u64>,
    },
}

impl RequestBody {
    /// 一次性请求体的内容；流式请求体返回 `None`
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            RequestBody::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, RequestBody::Stream { .. })
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(bytes) => {
                write!(f, "Bytes({} bytes)", bytes.len())
            }
            RequestBody::Stream { length, .. } => f
                .debug_struct("Stream")
                .field("length", length)
                .finish_non_exhaustive(),
        }
    }
}

/// 组装好的线上请求：方法、绝对 URL、请求头、请求体
#[derive(Debug)]
pub struct WebDavRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl WebDavRequest {
    /// 请求头的字符串值
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
