use core::fmt;

use async_trait::async_trait;
use base64::Engine;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Body, Client, Identity, Proxy,
};
use sha2::{Digest, Sha256};

use crate::internal::error::{Result, WebDavError};
use crate::internal::settings::structs::WebDavSettings;
use crate::internal::transport::traits::transport::{
    BodyStream, Transport, TransportError, TransportResponse,
};
use crate::internal::webdav::request::{RequestBody, WebDavRequest};

/// 基于 reqwest 的默认传输层
///
/// - Authorization 作为默认请求头：有 token 用 Bearer，否则用 Basic
/// - 只走 HTTP/1.1，与大多数 WebDAV 服务端保持一致
/// - 连接和单次读取按配置的超时；整个请求的期限由上层控制
///
/// 默认Eq时会匹配凭据指纹，凭据本身不保存
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client, // 内部是Arc，clone 成本很低
    credential_fingerprint: Option<String>,
}

impl ReqwestTransport {
    /// 按配置创建传输层
    pub fn new(settings: &WebDavSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let credential = _authorization(settings)?;
        let credential_fingerprint = credential.as_ref().map(|(raw, value)| {
            headers.insert(AUTHORIZATION, value.clone());
            _encrypt_str(raw)
        });

        let mut builder = Client::builder()
            .http1_only()
            .default_headers(headers)
            .connect_timeout(settings.timeout())
            .read_timeout(settings.timeout());

        if let Some(proxy_url) = settings.proxy() {
            let mut proxy = Proxy::all(proxy_url.as_str())
                .map_err(|e| _build_error(settings, e))?;
            if let Some(auth) = settings.proxy_auth() {
                proxy = proxy.basic_auth(&auth.login, &auth.password);
            }
            builder = builder.proxy(proxy);
        }

        if let Some(cert_path) = settings.cert_path() {
            // PEM 格式：证书和私钥拼接在一起交给 rustls
            let mut pem = std::fs::read(cert_path)
                .map_err(|e| WebDavError::local_io(cert_path, e))?;
            if let Some(key_path) = settings.key_path() {
                let key = std::fs::read(key_path)
                    .map_err(|e| WebDavError::local_io(key_path, e))?;
                pem.push(b'\n');
                pem.extend_from_slice(&key);
            }
            let identity =
                Identity::from_pem(&pem).map_err(|e| _build_error(settings, e))?;
            builder = builder.identity(identity);
        }

        let client = builder.build().map_err(|e| _build_error(settings, e))?;

        Ok(Self { client, credential_fingerprint })
    }

    /// 仅比较凭据是否相同
    pub fn eq_only_credential(&self, other: &Self) -> bool {
        self.credential_fingerprint == other.credential_fingerprint
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: WebDavRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let WebDavRequest { method, url, headers, body } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::Stream { stream, .. } => {
                builder.body(Body::wrap_stream(stream))
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body: BodyStream = response
            .bytes_stream()
            .map_err(TransportError::from)
            .boxed();

        Ok(TransportResponse::new(status, headers, body))
    }
}

/// 防止debug泄漏账号
impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("client", &"<Client with hidden authorization>")
            .finish()
    }
}

fn _encrypt_str(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 返回 (原始凭据, Authorization 头)；没有配置凭据时为 None
fn _authorization(
    settings: &WebDavSettings,
) -> Result<Option<(String, HeaderValue)>> {
    let (raw, value) = if let Some(token) = settings.token() {
        (token.to_string(), format!("Bearer {token}"))
    } else if let Some(login) = settings.login() {
        let password = settings.password().unwrap_or_default();
        let raw = base64::engine::general_purpose::STANDARD
            .encode(format!("{login}:{password}"));
        let value = format!("Basic {raw}");
        (raw, value)
    } else {
        return Ok(None);
    };

    let mut header = HeaderValue::from_str(&value)
        .map_err(|_| WebDavError::option_not_valid("token", "<hidden>"))?;
    header.set_sensitive(true);
    Ok(Some((raw, header)))
}

fn _build_error(settings: &WebDavSettings, e: reqwest::Error) -> WebDavError {
    WebDavError::Transport {
        operation: "connect",
        path: settings.hostname().to_string(),
        source: TransportError::Request(e),
    }
}
