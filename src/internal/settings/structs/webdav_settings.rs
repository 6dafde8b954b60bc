use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::internal::error::{Result, WebDavError};
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::{parse_method, WebDavAction};

use super::webdav_options::{ProxyAuth, WebDavOptions};

/// 默认单次请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 默认传输分块大小：64KB
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// 校验后的连接配置，构造后只读。
///
/// 只能通过 [`WebDavSettings::new`] 获得，不存在“部分有效”的实例。
#[derive(Clone)]
pub struct WebDavSettings {
    hostname: Url,
    base: String,
    login: Option<String>,
    password: Option<String>,
    token: Option<String>,
    root: RemotePath,
    cert_path: Option<PathBuf>,
    key_path: Option<PathBuf>,
    recv_speed: Option<NonZeroU64>,
    send_speed: Option<NonZeroU64>,
    verbose: bool,
    disable_check: bool,
    override_methods: HashMap<WebDavAction, String>,
    timeout: Duration,
    chunk_size: usize,
    proxy: Option<Url>,
    proxy_auth: Option<ProxyAuth>,
}

/// 空白字符串视为未提供
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

fn check_file_exists(
    name: &'static str,
    path: Option<&Path>,
) -> Result<()> {
    match path {
        Some(p) if !p.exists() => {
            Err(WebDavError::option_not_valid(name, p.display().to_string()))
        }
        _ => Ok(()),
    }
}

impl WebDavSettings {
    /// 校验原始配置并构造只读配置。
    ///
    /// 提供的值只有非空时才覆盖默认值：空字符串、0 秒超时、0 分块大小、
    /// 空的方法映射都保持默认。
    ///
    /// 依次检查：
    /// - `hostname` 必填且是合法 URL
    /// - `cert_path` / `key_path` 指向的文件必须存在
    /// - 提供了 `key_path` 就必须提供 `cert_path`
    /// - 提供了 `password` 就必须提供 `login`
    /// - `override_methods` 的键必须是已知操作名，值必须是合法方法名
    /// - `proxy` 必须是合法 URL，`proxy_auth` 需要 `proxy`
    pub fn new(options: WebDavOptions) -> Result<Self> {
        let hostname_raw = non_empty(options.hostname)
            .ok_or_else(|| WebDavError::option_not_valid("hostname", ""))?;
        let base = hostname_raw.trim().trim_end_matches('/').to_string();
        let hostname = Url::parse(&base).map_err(|_| {
            WebDavError::option_not_valid("hostname", hostname_raw.clone())
        })?;
        if hostname.cannot_be_a_base() {
            return Err(WebDavError::option_not_valid("hostname", hostname_raw));
        }

        let cert_path = non_empty_path(options.cert_path);
        let key_path = non_empty_path(options.key_path);
        check_file_exists("cert_path", cert_path.as_deref())?;
        check_file_exists("key_path", key_path.as_deref())?;
        if key_path.is_some() && cert_path.is_none() {
            return Err(WebDavError::option_not_valid("cert_path", ""));
        }

        let login = non_empty(options.login);
        let password = non_empty(options.password);
        if password.is_some() && login.is_none() {
            return Err(WebDavError::option_not_valid("login", ""));
        }

        let mut override_methods = HashMap::new();
        for (name, method) in options.override_methods.unwrap_or_default() {
            let action = WebDavAction::from_name(&name).ok_or_else(|| {
                WebDavError::option_not_valid("override_methods", name.clone())
            })?;
            let method = method.trim().to_string();
            if method.is_empty() {
                continue;
            }
            parse_method(&method)?;
            override_methods.insert(action, method);
        }

        let proxy = match non_empty(options.proxy) {
            Some(raw) => Some(Url::parse(raw.trim()).map_err(|_| {
                WebDavError::option_not_valid("proxy", raw.clone())
            })?),
            None => None,
        };
        let proxy_auth = options.proxy_auth.filter(|auth| !auth.login.is_empty());
        if proxy_auth.is_some() && proxy.is_none() {
            return Err(WebDavError::option_not_valid("proxy", ""));
        }

        let root = non_empty(options.root)
            .map(|r| RemotePath::normalize(&r))
            .unwrap_or_default();

        let timeout = options
            .timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let chunk_size = options
            .chunk_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        Ok(Self {
            hostname,
            base,
            login,
            password,
            token: non_empty(options.token),
            root,
            cert_path,
            key_path,
            recv_speed: options.recv_speed.and_then(NonZeroU64::new),
            send_speed: options.send_speed.and_then(NonZeroU64::new),
            verbose: options.verbose.unwrap_or(false),
            disable_check: options.disable_check.unwrap_or(false),
            override_methods,
            timeout,
            chunk_size,
            proxy,
            proxy_auth,
        })
    }

    /// 资源的绝对 URL：hostname + root + 编码后的路径。
    ///
    /// `collection` 为 true 时补上尾部 `/`。
    pub fn resource_url(
        &self,
        path: &RemotePath,
        collection: bool,
    ) -> Result<Url> {
        let root = if self.root.is_root() {
            String::new()
        } else {
            self.root.quote()
        };
        let quoted = if collection {
            path.quote_collection()
        } else {
            path.quote()
        };
        let raw = format!("{}{}{}", self.base, root, quoted);
        Url::parse(&raw).map_err(|_| WebDavError::InvalidPath {
            path: path.to_string(),
            reason: "无法拼接为合法 URL",
        })
    }

    /// 操作实际使用的方法名（已应用 override_methods）
    pub fn method_name(&self, action: WebDavAction) -> &str {
        self.override_methods
            .get(&action)
            .map(String::as_str)
            .unwrap_or_else(|| action.default_method().as_str())
    }

    pub fn hostname(&self) -> &Url {
        &self.hostname
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn root(&self) -> &RemotePath {
        &self.root
    }

    /// 服务器返回的 href 是绝对路径，根目录前缀为 hostname 的路径部分加上 root
    pub fn server_root(&self) -> RemotePath {
        let prefix = RemotePath::from_encoded(self.hostname.path());
        match prefix.join(self.root.as_str()) {
            Ok(path) => path,
            Err(_) => self.root.clone(),
        }
    }

    pub fn cert_path(&self) -> Option<&Path> {
        self.cert_path.as_deref()
    }

    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    pub fn recv_speed(&self) -> Option<NonZeroU64> {
        self.recv_speed
    }

    pub fn send_speed(&self) -> Option<NonZeroU64> {
        self.send_speed
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn disable_check(&self) -> bool {
        self.disable_check
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn proxy(&self) -> Option<&Url> {
        self.proxy.as_ref()
    }

    pub fn proxy_auth(&self) -> Option<&ProxyAuth> {
        self.proxy_auth.as_ref()
    }
}

/// 防止 debug 泄漏账号
impl fmt::Debug for WebDavSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavSettings")
            .field("hostname", &self.hostname.as_str())
            .field("login", &self.login)
            .field("root", &self.root)
            .field("timeout", &self.timeout)
            .field("chunk_size", &self.chunk_size)
            .field("recv_speed", &self.recv_speed)
            .field("send_speed", &self.send_speed)
            .field("disable_check", &self.disable_check)
            .finish_non_exhaustive()
    }
}
