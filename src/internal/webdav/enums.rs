use reqwest::Method;

use crate::internal::error::{Result, WebDavError};

/// WebDAV 及基础 HTTP 动词
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebDavMethod {
    PROPFIND,
    PROPPATCH,
    MKCOL,
    COPY,
    MOVE,
    DELETE,
    GET,
    PUT,
    HEAD,
}

impl WebDavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebDavMethod::PROPFIND => "PROPFIND",
            WebDavMethod::PROPPATCH => "PROPPATCH",
            WebDavMethod::MKCOL => "MKCOL",
            WebDavMethod::COPY => "COPY",
            WebDavMethod::MOVE => "MOVE",
            WebDavMethod::DELETE => "DELETE",
            WebDavMethod::GET => "GET",
            WebDavMethod::PUT => "PUT",
            WebDavMethod::HEAD => "HEAD",
        }
    }
}

/// 将方法名转换为 reqwest 的 `Method`，扩展方法（如 PROPFIND）也走这里
pub(crate) fn parse_method(name: &str) -> Result<Method> {
    Method::from_bytes(name.as_bytes())
        .map_err(|_| WebDavError::option_not_valid("override_methods", name))
}

/// 客户端逻辑操作。
///
/// 每个操作有默认动词，配置项 `override_methods` 以操作名为键替换动词字符串，
/// 请求头和请求体的构造逻辑不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebDavAction {
    List,
    Info,
    Check,
    Download,
    Upload,
    Mkdir,
    Copy,
    Move,
    Delete,
    GetProperty,
    SetProperty,
    Free,
}

impl WebDavAction {
    pub const ALL: [WebDavAction; 12] = [
        WebDavAction::List,
        WebDavAction::Info,
        WebDavAction::Check,
        WebDavAction::Download,
        WebDavAction::Upload,
        WebDavAction::Mkdir,
        WebDavAction::Copy,
        WebDavAction::Move,
        WebDavAction::Delete,
        WebDavAction::GetProperty,
        WebDavAction::SetProperty,
        WebDavAction::Free,
    ];

    /// 配置中使用的操作名
    pub fn as_str(&self) -> &'static str {
        match self {
            WebDavAction::List => "list",
            WebDavAction::Info => "info",
            WebDavAction::Check => "check",
            WebDavAction::Download => "download",
            WebDavAction::Upload => "upload",
            WebDavAction::Mkdir => "mkdir",
            WebDavAction::Copy => "copy",
            WebDavAction::Move => "move",
            WebDavAction::Delete => "delete",
            WebDavAction::GetProperty => "get_property",
            WebDavAction::SetProperty => "set_property",
            WebDavAction::Free => "free",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    pub fn default_method(&self) -> WebDavMethod {
        match self {
            WebDavAction::List
            | WebDavAction::Info
            | WebDavAction::GetProperty
            | WebDavAction::Free => WebDavMethod::PROPFIND,
            WebDavAction::SetProperty => WebDavMethod::PROPPATCH,
            WebDavAction::Check => WebDavMethod::HEAD,
            WebDavAction::Download => WebDavMethod::GET,
            WebDavAction::Upload => WebDavMethod::PUT,
            WebDavAction::Mkdir => WebDavMethod::MKCOL,
            WebDavAction::Copy => WebDavMethod::COPY,
            WebDavAction::Move => WebDavMethod::MOVE,
            WebDavAction::Delete => WebDavMethod::DELETE,
        }
    }
}

/// PROPFIND 的 Depth 请求头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// 仅返回当前资源
    Zero,
    /// 返回当前资源及直接子资源
    One,
    /// 返回当前资源及所有子资源（谨慎使用）
    Infinity,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// 响应状态码的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// 207，需要解析响应体
    MultiStatus,
    /// 其余 2xx
    Success,
    /// 401 / 403
    Unauthorized,
    NotFound,
    /// 409，通常是父集合不存在
    Conflict,
    /// 412，例如 Overwrite: F 而目标已存在
    PreconditionFailed,
    Locked,
    /// 其余状态码
    ServerError,
}
