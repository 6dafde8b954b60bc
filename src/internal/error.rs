//! 库级错误类型：所有公开操作统一返回 [`WebDavError`]。

use reqwest::StatusCode;
use thiserror::Error;

use crate::internal::transport::traits::transport::TransportError;

pub type Result<T, E = WebDavError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum WebDavError {
    /// 配置项校验失败，`name` 为出错的配置项名
    #[error("配置项无效 {name}: {value:?}")]
    OptionNotValid { name: &'static str, value: String },

    #[error("路径无效 {path}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// XML 解析失败，保留原始响应体便于排查
    #[error("响应解析失败: {message}")]
    ParseError { message: String, body: String },

    #[error("远程资源不存在: {path}")]
    NotFound { path: String },

    #[error("没有访问权限 ({status}): {path}")]
    Unauthorized { path: String, status: StatusCode },

    #[error("远程资源已被锁定: {path}")]
    Locked { path: String },

    /// 通常是父目录不存在
    #[error("远程资源冲突: {path}")]
    Conflict { path: String },

    #[error("服务器返回异常状态 {status}: {path}")]
    ServerError { path: String, status: StatusCode },

    #[error("传输失败 {path}: {message}")]
    TransferFailed { path: String, message: String },

    #[error("传输被取消 {path}，已传输 {bytes_transferred} 字节")]
    TransferCancelled { path: String, bytes_transferred: u64 },

    /// 例如目标已存在且不允许覆盖
    #[error("远程资源错误 {path}: {message}")]
    RemoteResourceError { path: String, message: String },

    /// 传输层错误原样保留，附带操作名和路径
    #[error("{operation} 请求失败 {path}: {source}")]
    Transport {
        operation: &'static str,
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("本地文件操作失败 {path}: {source}")]
    LocalIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WebDavError {
    pub(crate) fn option_not_valid(
        name: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::OptionNotValid { name, value: value.into() }
    }

    pub(crate) fn local_io(
        path: &std::path::Path,
        source: std::io::Error,
    ) -> Self {
        Self::LocalIo { path: path.display().to_string(), source }
    }

    /// 是否为“资源不存在”
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
