//! 内容传输：下载、上传，以及目录的逐文件递归。

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_LENGTH;
use reqwest::StatusCode;
use tokio::fs::{self, File, OpenOptions};
use tracing::debug;

use crate::internal::error::{Result, WebDavError};
use crate::internal::transfer::enums::UploadEnd;
use crate::internal::transfer::functions::{download_body, upload_body};
use crate::internal::transfer::structs::{
    ChunkReader, Throttle, TransferOptions, TransferSession,
};
use crate::internal::transfer::traits::{TransferSink, TransferSource};
use crate::internal::transport::traits::transport::TransportResponse;
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::{Depth, WebDavAction};
use crate::internal::webdav::functions::status_error;
use crate::internal::webdav::request::RequestBody;

use super::WebDavClient;

fn content_length(response: &TransportResponse) -> Option<u64> {
    response
        .header(CONTENT_LENGTH.as_str())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// 目录递归时每个文件单独传输：共享取消信号，不共享进度和续传偏移
fn per_file_options(options: &TransferOptions) -> TransferOptions {
    TransferOptions {
        resume_from: 0,
        cancel: options.cancel.clone(),
        progress: None,
    }
}

impl WebDavClient {
    /// 下载到任意 [`TransferSink`]，返回传输结束时的字节偏移（含续传偏移）
    ///
    /// - `resume_from` 大于 0 时带 Range 续传
    /// - 服务端忽略 Range 返回 200 时，跳过开头已有的部分
    /// - 续传时返回 416 表示没有剩余内容
    pub async fn download_to<S>(
        &self,
        remote: impl Into<RemotePath>,
        sink: &mut S,
        options: TransferOptions,
    ) -> Result<u64>
    where
        S: TransferSink + ?Sized,
    {
        let path = remote.into();
        let offset = options.resume_from;
        let settings = self.settings();
        let request = self.builder().get(&path, offset)?;

        // 超时只约束发送和拿到响应头，读取响应体时按单次读取计时
        let operation = WebDavAction::Download.as_str();
        let response = self
            .with_timeout(operation, &path, self.execute(operation, &path, request))
            .await?;

        let (skip, total) = match response.status {
            StatusCode::PARTIAL_CONTENT => {
                (0, content_length(&response).map(|len| offset + len))
            }
            StatusCode::RANGE_NOT_SATISFIABLE if offset > 0 => {
                debug!("续传偏移 {offset} 之后没有剩余内容: {path}");
                return Ok(offset);
            }
            status if status.is_success() => {
                if offset > 0 {
                    debug!("服务端忽略了 Range，跳过前 {offset} 字节: {path}");
                }
                (offset, content_length(&response))
            }
            status => return Err(status_error(&path, status)),
        };

        let mut session = TransferSession::new(
            path,
            settings.chunk_size(),
            Throttle::new(settings.recv_speed()),
            options,
        );
        session.set_total(total);

        let reader = ChunkReader::new(response.body, settings.chunk_size())
            .with_read_timeout(settings.timeout())
            .skip(skip);

        download_body(reader, sink, &mut session, self.clock().as_ref()).await
    }

    /// 从任意 [`TransferSource`] 上传，返回上传的字节数
    ///
    /// `length` 已知时带 Content-Length，否则使用分块传输编码。
    /// 上传不支持续传，`resume_from` 会被忽略；中途失败不重试。
    /// 发送请求体不设总期限，请求体发完后等待响应受单次请求超时约束。
    pub async fn upload_from<S>(
        &self,
        source: S,
        remote: impl Into<RemotePath>,
        length: Option<u64>,
        options: TransferOptions,
    ) -> Result<u64>
    where
        S: TransferSource + 'static,
    {
        let path = remote.into();
        let settings = self.settings();
        let options = TransferOptions { resume_from: 0, ..options };

        let mut session = TransferSession::new(
            path.clone(),
            settings.chunk_size(),
            Throttle::new(settings.send_speed()),
            options,
        );
        session.set_total(length);
        let progress = session.progress_handle().clone();

        let (body, mut ended) = upload_body(source, session, self.clock().clone());
        let request = self
            .builder()
            .put(&path, RequestBody::Stream { stream: body, length })?;

        let operation = WebDavAction::Upload.as_str();
        let send = self.execute(operation, &path, request);
        tokio::pin!(send);

        let early = tokio::select! {
            biased;
            result = &mut send => Some(result),
            _ = ended.wait_for(UploadEnd::is_ended) => None,
        };
        let result = match early {
            Some(result) => result,
            None => self.with_timeout(operation, &path, send).await,
        };

        let bytes_transferred = progress.current().bytes_done;
        let cancelled = *ended.borrow() == UploadEnd::Cancelled;

        let response = match result {
            Ok(response) => response,
            Err(WebDavError::Transport { source, .. }) => {
                return Err(if cancelled {
                    WebDavError::TransferCancelled {
                        path: path.to_string(),
                        bytes_transferred,
                    }
                } else {
                    WebDavError::TransferFailed {
                        path: path.to_string(),
                        message: source.to_string(),
                    }
                });
            }
            Err(e) => return Err(e),
        };

        if cancelled {
            return Err(WebDavError::TransferCancelled {
                path: path.to_string(),
                bytes_transferred,
            });
        }
        if !response.status.is_success() {
            return Err(status_error(&path, response.status));
        }
        Ok(bytes_transferred)
    }

    async fn download_file(
        &self,
        remote: &RemotePath,
        local: &Path,
        options: TransferOptions,
    ) -> Result<u64> {
        let file = if options.resume_from > 0 {
            OpenOptions::new().create(true).append(true).open(local).await
        } else {
            File::create(local).await
        };
        let mut file = file.map_err(|e| WebDavError::local_io(local, e))?;
        self.download_to(remote, &mut file, options).await
    }

    /// 下载文件或整个集合到本地路径
    ///
    /// 单个文件返回值同 [`download_to`](Self::download_to)：传输结束时的字节偏移，含续传偏移。
    /// 集合会在本地建立同名目录树，每个文件单独请求且不续传，返回各文件字节数之和。
    pub async fn download(
        &self,
        remote: impl Into<RemotePath>,
        local: impl AsRef<Path>,
        options: TransferOptions,
    ) -> Result<u64> {
        let remote = remote.into();
        let local = local.as_ref();

        if !self.info(&remote).await?.is_dir {
            return self.download_file(&remote, local, options).await;
        }

        let mut total = 0u64;
        let mut pending: Vec<(RemotePath, PathBuf)> =
            vec![(remote, local.to_path_buf())];

        while let Some((dir, local_dir)) = pending.pop() {
            fs::create_dir_all(&local_dir)
                .await
                .map_err(|e| WebDavError::local_io(&local_dir, e))?;

            for entry in self.list(&dir, Depth::One).await? {
                let target = local_dir.join(entry.path.name());
                if entry.is_dir {
                    pending.push((entry.path, target));
                } else {
                    total += self
                        .download_file(&entry.path, &target, per_file_options(&options))
                        .await?;
                }
            }
        }
        Ok(total)
    }

    async fn upload_file(
        &self,
        local: &Path,
        remote: &RemotePath,
        options: TransferOptions,
    ) -> Result<u64> {
        let file = File::open(local)
            .await
            .map_err(|e| WebDavError::local_io(local, e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| WebDavError::local_io(local, e))?
            .len();
        self.upload_from(file, remote, Some(length), options).await
    }

    /// 上传本地文件或目录，返回上传的字节数
    ///
    /// 目录会在远端逐级创建集合，已存在的集合直接复用
    pub async fn upload(
        &self,
        local: impl AsRef<Path>,
        remote: impl Into<RemotePath>,
        options: TransferOptions,
    ) -> Result<u64> {
        let local = local.as_ref();
        let remote = remote.into();

        let metadata = fs::metadata(local)
            .await
            .map_err(|e| WebDavError::local_io(local, e))?;
        if !metadata.is_dir() {
            return self.upload_file(local, &remote, options).await;
        }

        self.mkdir_all(&remote).await?;

        let mut total = 0u64;
        let mut pending: Vec<(PathBuf, RemotePath)> =
            vec![(local.to_path_buf(), remote)];

        while let Some((local_dir, remote_dir)) = pending.pop() {
            let mut entries = fs::read_dir(&local_dir)
                .await
                .map_err(|e| WebDavError::local_io(&local_dir, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| WebDavError::local_io(&local_dir, e))?
            {
                let local_path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                let remote_path = remote_dir.join(&name)?;
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| WebDavError::local_io(&local_path, e))?;

                if file_type.is_dir() {
                    match self.mkdir(&remote_path).await {
                        Ok(()) => {}
                        Err(WebDavError::RemoteResourceError { .. }) => {
                            debug!("集合已存在: {remote_path}");
                        }
                        Err(e) => return Err(e),
                    }
                    pending.push((local_path, remote_path));
                } else {
                    total += self
                        .upload_file(&local_path, &remote_path, per_file_options(&options))
                        .await?;
                }
            }
        }
        Ok(total)
    }
}
