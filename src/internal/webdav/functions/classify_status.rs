use reqwest::StatusCode;

use crate::internal::error::WebDavError;
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::OutcomeKind;

/// 把状态码归类，207 要优先于其他 2xx 判断
pub fn classify_status(status: StatusCode) -> OutcomeKind {
    match status.as_u16() {
        207 => OutcomeKind::MultiStatus,
        200..=299 => OutcomeKind::Success,
        401 | 403 => OutcomeKind::Unauthorized,
        404 => OutcomeKind::NotFound,
        409 => OutcomeKind::Conflict,
        412 => OutcomeKind::PreconditionFailed,
        423 => OutcomeKind::Locked,
        _ => OutcomeKind::ServerError,
    }
}

/// 调用方没有单独处理的状态码转为错误；意外的 2xx 也算作 `ServerError`
pub(crate) fn status_error(path: &RemotePath, status: StatusCode) -> WebDavError {
    let path = path.to_string();
    match classify_status(status) {
        OutcomeKind::MultiStatus | OutcomeKind::Success => {
            WebDavError::ServerError { path, status }
        }
        OutcomeKind::Unauthorized => WebDavError::Unauthorized { path, status },
        OutcomeKind::NotFound => WebDavError::NotFound { path },
        OutcomeKind::Conflict => WebDavError::Conflict { path },
        OutcomeKind::PreconditionFailed => WebDavError::RemoteResourceError {
            path,
            message: "前置条件不满足，目标可能已存在".to_string(),
        },
        OutcomeKind::Locked => WebDavError::Locked { path },
        OutcomeKind::ServerError => WebDavError::ServerError { path, status },
    }
}
