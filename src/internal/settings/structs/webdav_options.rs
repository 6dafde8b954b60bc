use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// 代理认证信息
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ProxyAuth {
    pub login: String,
    pub password: String,
}

/// 防止 debug 泄漏代理密码
impl std::fmt::Debug for ProxyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyAuth")
            .field("login", &self.login)
            .field("password", &"<hidden>")
            .finish()
    }
}

/// 原始连接配置，未经校验。
///
/// 可以直接用 serde 从任意配置格式反序列化，也可以链式构造：
///
/// ```rust,no_run
/// use webdav_client::settings::WebDavOptions;
///
/// let options = WebDavOptions::new("https://dav.example.com")
///     .login("alice")
///     .password("secret")
///     .root("/remote.php/dav/files/alice")
///     .chunk_size(8192);
/// ```
///
/// 经 [`WebDavSettings::new`](super::webdav_settings::WebDavSettings::new) 校验后才能使用。
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebDavOptions {
    pub hostname: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    /// Bearer token，设置后优先于 login/password
    pub token: Option<String>,
    pub root: Option<String>,
    /// 客户端证书（PEM）
    pub cert_path: Option<PathBuf>,
    /// 客户端私钥（PEM），必须与 cert_path 一起使用
    pub key_path: Option<PathBuf>,
    /// 下载限速（字节/秒）
    pub recv_speed: Option<u64>,
    /// 上传限速（字节/秒）
    pub send_speed: Option<u64>,
    pub verbose: Option<bool>,
    pub disable_check: Option<bool>,
    /// 操作名 -> HTTP 方法名
    pub override_methods: Option<HashMap<String, String>>,
    /// 单次请求超时（秒）
    pub timeout: Option<u64>,
    pub chunk_size: Option<usize>,
    pub proxy: Option<String>,
    pub proxy_auth: Option<ProxyAuth>,
}

impl WebDavOptions {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self { hostname: Some(hostname.into()), ..Default::default() }
    }

    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn client_cert(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.cert_path = Some(cert_path.into());
        self.key_path = Some(key_path.into());
        self
    }

    pub fn recv_speed(mut self, bytes_per_sec: u64) -> Self {
        self.recv_speed = Some(bytes_per_sec);
        self
    }

    pub fn send_speed(mut self, bytes_per_sec: u64) -> Self {
        self.send_speed = Some(bytes_per_sec);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn disable_check(mut self, disable_check: bool) -> Self {
        self.disable_check = Some(disable_check);
        self
    }

    /// 替换某个操作使用的 HTTP 方法，例如 `("mkdir", "MKDIR")`
    pub fn override_method(
        mut self,
        action: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.override_methods
            .get_or_insert_with(HashMap::new)
            .insert(action.into(), method.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn proxy_auth(
        mut self,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.proxy_auth =
            Some(ProxyAuth { login: login.into(), password: password.into() });
        self
    }
}

/// 防止 debug 泄漏密码和 token
impl std::fmt::Debug for WebDavOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDavOptions")
            .field("hostname", &self.hostname)
            .field("login", &self.login)
            .field("root", &self.root)
            .field("chunk_size", &self.chunk_size)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
