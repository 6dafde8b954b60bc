use reqwest::StatusCode;

use crate::internal::urn::structs::RemotePath;

/// 多资源操作的总体结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// 全部成功
    Succeeded,
    /// 部分子资源失败，其余成功
    PartiallySucceeded,
    /// 目标本身失败，没有任何资源被处理
    Failed,
}

/// COPY / MOVE / DELETE 作用于集合时的逐资源状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub target: RemotePath,
    pub status: OutcomeStatus,
    /// 按服务端返回顺序排列
    pub statuses: Vec<(RemotePath, StatusCode)>,
}

impl OperationOutcome {
    /// 单一状态码的成功结果（201 / 204 等）
    pub fn succeeded(target: RemotePath, status: StatusCode) -> Self {
        Self {
            statuses: vec![(target.clone(), status)],
            target,
            status: OutcomeStatus::Succeeded,
        }
    }

    /// 由 207 响应里逐资源的状态推断总体结果。
    ///
    /// 服务端通常只列出失败的资源：
    /// - 没有失败项 => Succeeded
    /// - 只有目标本身失败且没有任何成功项 => Failed
    /// - 其余情况 => PartiallySucceeded
    pub fn from_statuses(
        target: RemotePath,
        statuses: Vec<(RemotePath, StatusCode)>,
    ) -> Self {
        let failed: Vec<&RemotePath> = statuses
            .iter()
            .filter(|(_, status)| !status.is_success())
            .map(|(path, _)| path)
            .collect();
        let any_success = statuses.iter().any(|(_, s)| s.is_success());

        let status = if failed.is_empty() {
            OutcomeStatus::Succeeded
        } else if !any_success && failed.iter().all(|p| **p == target) {
            OutcomeStatus::Failed
        } else {
            OutcomeStatus::PartiallySucceeded
        };

        Self { target, status, statuses }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    /// 失败的资源及其状态码
    pub fn failures(&self) -> impl Iterator<Item = &(RemotePath, StatusCode)> {
        self.statuses.iter().filter(|(_, status)| !status.is_success())
    }

    pub fn status_of(&self, path: &RemotePath) -> Option<StatusCode> {
        self.statuses
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, status)| *status)
    }
}
