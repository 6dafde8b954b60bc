//! # WebDavClient：客户端门面
//!
//! 把请求构造、传输、状态码分类、响应解析串成对外的操作：
//!
//! - 资源查询：`list` / `info` / `exists` / `check` / `is_dir` / 属性读写 / `free`
//! - 集合操作：`mkdir` / `mkdir_all` / `copy` / `move_to` / `delete`
//! - 内容传输：`download` / `download_to` / `upload` / `upload_from`
//!
//! 所有路径参数都会先规范化；客户端本身只读，clone 后可以在多个任务中并发使用。

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::internal::error::{Result, WebDavError};
use crate::internal::settings::structs::{WebDavOptions, WebDavSettings};
use crate::internal::transfer::traits::{Clock, TokioClock};
use crate::internal::transport::structs::ReqwestTransport;
use crate::internal::transport::traits::transport::{
    Transport, TransportError, TransportResponse,
};
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::request::{RequestBuilder, WebDavRequest};

mod collections;
mod resources;
mod transfers;

/// 读取完整响应体后的响应
#[derive(Debug)]
pub(crate) struct FullResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// WebDAV 客户端
///
/// 配置、传输层、时钟都放在 `Arc` 里，clone 只是增加引用计数
#[derive(Clone)]
pub struct WebDavClient {
    settings: Arc<WebDavSettings>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl WebDavClient {
    /// 校验配置并使用默认的 reqwest 传输层；不会发出探测请求
    pub fn new(options: WebDavOptions) -> Result<Self> {
        let settings = WebDavSettings::new(options)?;
        let transport = ReqwestTransport::new(&settings)?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    /// 使用自定义传输层
    pub fn with_transport(
        settings: WebDavSettings,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            transport,
            clock: Arc::new(TokioClock),
        }
    }

    /// 替换限速使用的时钟
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 创建客户端，并在未设置 `disable_check` 时探测根目录是否可访问
    pub async fn connect(
        settings: WebDavSettings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let client = Self::with_transport(settings, transport);
        client.verify().await?;
        Ok(client)
    }

    /// 探测根目录；`disable_check` 时直接返回
    pub async fn verify(&self) -> Result<()> {
        let root = RemotePath::root();
        if self.check(&root).await? {
            Ok(())
        } else {
            Err(WebDavError::NotFound {
                path: self.settings.hostname().to_string(),
            })
        }
    }

    pub fn settings(&self) -> &WebDavSettings {
        &self.settings
    }

    pub(crate) fn builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.settings)
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// href 中的服务端路径前缀
    pub(crate) fn server_root(&self) -> RemotePath {
        self.settings.server_root()
    }

    fn log_request(&self, request: &WebDavRequest) {
        if self.settings.verbose() {
            info!("{} {}", request.method, request.url);
        } else {
            debug!("{} {}", request.method, request.url);
        }
    }

    fn log_response(&self, label: &str, response: &TransportResponse) {
        if self.settings.verbose() {
            info!("{label} -> {} {:?}", response.status, response.headers);
        } else {
            debug!("{label} -> {}", response.status);
        }
    }

    /// 发送请求，只等待响应头；传输层错误附带操作名和路径
    pub(crate) async fn execute(
        &self,
        operation: &'static str,
        path: &RemotePath,
        request: WebDavRequest,
    ) -> Result<TransportResponse> {
        self.log_request(&request);
        let label = format!("{} {}", request.method, request.url);

        let response = self.transport.send(request).await.map_err(|source| {
            WebDavError::Transport {
                operation,
                path: path.to_string(),
                source,
            }
        })?;

        self.log_response(&label, &response);
        Ok(response)
    }

    /// 在配置的超时内完成 `future`
    pub(crate) async fn with_timeout<T>(
        &self,
        operation: &'static str,
        path: &RemotePath,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.settings.timeout();
        tokio::time::timeout(timeout, future)
            .await
            .map_err(|_| WebDavError::Transport {
                operation,
                path: path.to_string(),
                source: TransportError::Timeout(timeout),
            })?
    }

    /// 发送请求并读取完整响应体，整个过程受单次请求超时约束
    pub(crate) async fn execute_full(
        &self,
        operation: &'static str,
        path: &RemotePath,
        request: WebDavRequest,
    ) -> Result<FullResponse> {
        self.with_timeout(operation, path, async {
            let response = self.execute(operation, path, request).await?;
            let status = response.status;
            let headers = response.headers.clone();
            let body = response.bytes().await.map_err(|source| {
                WebDavError::Transport {
                    operation,
                    path: path.to_string(),
                    source,
                }
            })?;
            Ok(FullResponse { status, headers, body })
        })
        .await
    }
}

/// 防止debug泄漏账号
impl fmt::Debug for WebDavClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavClient")
            .field("settings", &self.settings)
            .field("transport", &"<dyn Transport>")
            .finish()
    }
}
