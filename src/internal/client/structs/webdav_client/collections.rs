//! 集合操作：创建、复制、移动、删除。

use reqwest::StatusCode;
use tracing::debug;

use crate::internal::error::{Result, WebDavError};
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::{OutcomeKind, WebDavAction};
use crate::internal::webdav::functions::{classify_status, status_error};
use crate::internal::webdav::raw_xml::parse_status_multistatus;
use crate::internal::webdav::structs::OperationOutcome;

use super::{FullResponse, WebDavClient};

impl WebDavClient {
    async fn mkcol(&self, path: &RemotePath) -> Result<StatusCode> {
        let request = self.builder().mkcol(path)?;
        let response = self
            .execute_full(WebDavAction::Mkdir.as_str(), path, request)
            .await?;
        Ok(response.status)
    }

    /// 创建集合
    ///
    /// - 父集合不存在 => `Conflict`
    /// - 同名资源已存在 => `RemoteResourceError`
    pub async fn mkdir(&self, path: impl Into<RemotePath>) -> Result<()> {
        let path = path.into();
        match self.mkcol(&path).await? {
            StatusCode::METHOD_NOT_ALLOWED => Err(WebDavError::RemoteResourceError {
                path: path.to_string(),
                message: "资源已存在".to_string(),
            }),
            status if status.is_success() => Ok(()),
            status => Err(status_error(&path, status)),
        }
    }

    /// 逐级创建集合，已存在的层级直接跳过
    pub async fn mkdir_all(&self, path: impl Into<RemotePath>) -> Result<()> {
        let path = path.into();
        for ancestor in path.ancestors() {
            match self.mkcol(&ancestor).await? {
                StatusCode::METHOD_NOT_ALLOWED => {
                    debug!("集合已存在: {ancestor}");
                }
                status if status.is_success() => {}
                status => return Err(status_error(&ancestor, status)),
            }
        }
        Ok(())
    }

    /// 207 按逐资源状态汇总，其余 2xx 为整体成功
    fn outcome(
        &self,
        target: &RemotePath,
        response: FullResponse,
    ) -> Result<OperationOutcome> {
        match classify_status(response.status) {
            OutcomeKind::MultiStatus => {
                let statuses =
                    parse_status_multistatus(&response.body, &self.server_root())?;
                Ok(OperationOutcome::from_statuses(target.clone(), statuses))
            }
            OutcomeKind::Success => {
                Ok(OperationOutcome::succeeded(target.clone(), response.status))
            }
            _ => Err(status_error(target, response.status)),
        }
    }

    async fn relocate(
        &self,
        action: WebDavAction,
        source: RemotePath,
        destination: RemotePath,
        overwrite: bool,
    ) -> Result<OperationOutcome> {
        let request =
            self.builder().relocate(action, &source, &destination, overwrite)?;
        let response = self.execute_full(action.as_str(), &source, request).await?;

        match classify_status(response.status) {
            OutcomeKind::NotFound => Err(status_error(&source, response.status)),
            _ => self.outcome(&destination, response),
        }
    }

    /// 复制资源；`overwrite` 为 false 且目标已存在时返回 `RemoteResourceError`
    pub async fn copy(
        &self,
        source: impl Into<RemotePath>,
        destination: impl Into<RemotePath>,
        overwrite: bool,
    ) -> Result<OperationOutcome> {
        self.relocate(
            WebDavAction::Copy,
            source.into(),
            destination.into(),
            overwrite,
        )
        .await
    }

    /// 移动资源，语义同 [`copy`](Self::copy)
    pub async fn move_to(
        &self,
        source: impl Into<RemotePath>,
        destination: impl Into<RemotePath>,
        overwrite: bool,
    ) -> Result<OperationOutcome> {
        self.relocate(
            WebDavAction::Move,
            source.into(),
            destination.into(),
            overwrite,
        )
        .await
    }

    /// 删除资源；集合中部分成员删除失败时返回 `PartiallySucceeded`
    pub async fn delete(
        &self,
        path: impl Into<RemotePath>,
    ) -> Result<OperationOutcome> {
        let path = path.into();
        let request = self.builder().delete(&path)?;
        let response = self
            .execute_full(WebDavAction::Delete.as_str(), &path, request)
            .await?;
        self.outcome(&path, response)
    }
}
