//! 资源查询与属性读写。

use reqwest::StatusCode;
use tracing::debug;

use crate::internal::error::{Result, WebDavError};
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::{Depth, OutcomeKind, WebDavAction};
use crate::internal::webdav::functions::{classify_status, status_error};
use crate::internal::webdav::raw_xml::{parse_multistatus, parse_status_multistatus};
use crate::internal::webdav::structs::{PropertyName, ResourceInfo};

use super::WebDavClient;

impl WebDavClient {
    /// PROPFIND 并解析为资源列表
    async fn propfind(
        &self,
        action: WebDavAction,
        path: &RemotePath,
        depth: Depth,
        props: &[PropertyName],
    ) -> Result<Vec<ResourceInfo>> {
        let request = self.builder().propfind(action, path, depth, props)?;
        let response = self.execute_full(action.as_str(), path, request).await?;

        match classify_status(response.status) {
            // 个别服务端用 200 返回 multistatus 文档
            OutcomeKind::MultiStatus | OutcomeKind::Success => {
                parse_multistatus(&response.body, &self.server_root())
            }
            _ => Err(status_error(path, response.status)),
        }
    }

    /// 列出集合的成员，不包含集合本身；顺序与服务端返回一致
    pub async fn list(
        &self,
        path: impl Into<RemotePath>,
        depth: Depth,
    ) -> Result<Vec<ResourceInfo>> {
        let path = path.into();
        let resources = self.propfind(WebDavAction::List, &path, depth, &[]).await?;
        Ok(resources.into_iter().filter(|r| r.path != path).collect())
    }

    /// 单个资源的元数据
    pub async fn info(&self, path: impl Into<RemotePath>) -> Result<ResourceInfo> {
        let path = path.into();
        let mut resources = self
            .propfind(WebDavAction::Info, &path, Depth::Zero, &[])
            .await?;

        if resources.is_empty() {
            return Err(WebDavError::NotFound { path: path.to_string() });
        }
        let index = resources
            .iter()
            .position(|r| r.path == path)
            .unwrap_or_default();
        Ok(resources.swap_remove(index))
    }

    /// 资源是否存在：HEAD，服务端不支持 HEAD 时改用 PROPFIND
    pub async fn exists(&self, path: impl Into<RemotePath>) -> Result<bool> {
        let path = path.into();
        let request = self.builder().head(&path)?;
        let response = self.execute_full("exists", &path, request).await?;

        match response.status {
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
                debug!("HEAD 不可用，改用 PROPFIND 检查: {path}");
                match self.info(&path).await {
                    Ok(_) => Ok(true),
                    Err(e) if e.is_not_found() => Ok(false),
                    Err(e) => Err(e),
                }
            }
            status if status.is_success() => Ok(true),
            status => Err(status_error(&path, status)),
        }
    }

    /// 与 [`exists`](Self::exists) 相同，但设置了 `disable_check` 时不发请求，直接返回 true
    pub async fn check(&self, path: impl Into<RemotePath>) -> Result<bool> {
        if self.settings().disable_check() {
            return Ok(true);
        }
        self.exists(path).await
    }

    pub async fn is_dir(&self, path: impl Into<RemotePath>) -> Result<bool> {
        Ok(self.info(path).await?.is_dir)
    }

    /// 读取单个属性；资源没有该属性时返回 `None`
    pub async fn get_property(
        &self,
        path: impl Into<RemotePath>,
        name: &PropertyName,
    ) -> Result<Option<String>> {
        let path = path.into();
        let resources = self
            .propfind(
                WebDavAction::GetProperty,
                &path,
                Depth::Zero,
                std::slice::from_ref(name),
            )
            .await?;

        Ok(resources
            .iter()
            .find(|r| r.path == path)
            .or(resources.first())
            .and_then(|r| r.property(name))
            .map(str::to_string))
    }

    /// 设置单个属性；207 中任何一个属性失败都视为整体失败
    pub async fn set_property(
        &self,
        path: impl Into<RemotePath>,
        name: &PropertyName,
        value: &str,
    ) -> Result<()> {
        let path = path.into();
        let request = self.builder().proppatch(&path, name, value)?;
        let response = self
            .execute_full(WebDavAction::SetProperty.as_str(), &path, request)
            .await?;

        match classify_status(response.status) {
            OutcomeKind::MultiStatus => {
                let statuses =
                    parse_status_multistatus(&response.body, &self.server_root())?;
                match statuses.iter().find(|(_, s)| !s.is_success()) {
                    Some((_, status)) => Err(WebDavError::RemoteResourceError {
                        path: path.to_string(),
                        message: format!("属性 {} 设置失败: {status}", name.name),
                    }),
                    None => Ok(()),
                }
            }
            OutcomeKind::Success => Ok(()),
            _ => Err(status_error(&path, response.status)),
        }
    }

    /// 根目录的剩余空间（字节）；服务端不提供配额信息时返回 `None`
    pub async fn free(&self) -> Result<Option<u64>> {
        let root = RemotePath::root();
        let props = [
            PropertyName::dav("quota-available-bytes"),
            PropertyName::dav("quota-used-bytes"),
        ];
        let resources = self
            .propfind(WebDavAction::Free, &root, Depth::Zero, &props)
            .await?;

        Ok(resources
            .first()
            .and_then(|r| r.property(&props[0]))
            .and_then(|v| v.parse::<u64>().ok()))
    }
}
