use bytes::Bytes;
use quick_xml::escape::escape;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE,
    RANGE,
};
use url::Url;

use crate::internal::error::{Result, WebDavError};
use crate::internal::settings::structs::WebDavSettings;
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::enums::{parse_method, Depth, WebDavAction};
use crate::internal::webdav::structs::{PropertyName, DAV_NAMESPACE};

use super::webdav_request::{RequestBody, WebDavRequest};

/// 查询全部属性的 PROPFIND 请求体
const ALLPROP_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
  <D:allprop/>
</D:propfind>"#;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

const HEADER_DEPTH: HeaderName = HeaderName::from_static("depth");
const HEADER_DESTINATION: HeaderName = HeaderName::from_static("destination");
const HEADER_OVERWRITE: HeaderName = HeaderName::from_static("overwrite");

/// 请求构造器，借用只读配置拼接 URL 并解析方法覆盖
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    settings: &'a WebDavSettings,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(settings: &'a WebDavSettings) -> Self {
        Self { settings }
    }

    fn request(
        &self,
        action: WebDavAction,
        url: Url,
        headers: HeaderMap,
        body: RequestBody,
    ) -> Result<WebDavRequest> {
        let method = parse_method(self.settings.method_name(action))?;
        Ok(WebDavRequest { method, url, headers, body })
    }

    /// PROPFIND：`props` 为空时查询全部属性，否则只查询指定属性
    pub fn propfind(
        &self,
        action: WebDavAction,
        path: &RemotePath,
        depth: Depth,
        props: &[PropertyName],
    ) -> Result<WebDavRequest> {
        // 列目录时用带尾部斜杠的 URL，避免部分服务端重定向
        let collection = depth != Depth::Zero;
        let url = self.settings.resource_url(path, collection)?;

        let mut headers = HeaderMap::new();
        headers.insert(HEADER_DEPTH, HeaderValue::from_static(depth.as_str()));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));

        let body = if props.is_empty() {
            Bytes::from_static(ALLPROP_BODY.as_bytes())
        } else {
            Bytes::from(propfind_body(props))
        };

        self.request(action, url, headers, RequestBody::Bytes(body))
    }

    /// PROPPATCH：设置单个属性
    pub fn proppatch(
        &self,
        path: &RemotePath,
        name: &PropertyName,
        value: &str,
    ) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(path, false)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));

        let body = Bytes::from(proppatch_body(name, value));
        self.request(
            WebDavAction::SetProperty,
            url,
            headers,
            RequestBody::Bytes(body),
        )
    }

    pub fn mkcol(&self, path: &RemotePath) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(path, true)?;
        self.request(WebDavAction::Mkdir, url, HeaderMap::new(), RequestBody::Empty)
    }

    /// COPY / MOVE：Destination 为目标绝对 URL，Overwrite 为 T 或 F
    pub fn relocate(
        &self,
        action: WebDavAction,
        source: &RemotePath,
        destination: &RemotePath,
        overwrite: bool,
    ) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(source, false)?;
        let target = self.settings.resource_url(destination, false)?;

        let mut headers = HeaderMap::new();
        let target_value = HeaderValue::from_str(target.as_str()).map_err(|_| {
            WebDavError::InvalidPath {
                path: destination.to_string(),
                reason: "无法作为 Destination 请求头",
            }
        })?;
        headers.insert(HEADER_DESTINATION, target_value);
        headers.insert(
            HEADER_OVERWRITE,
            HeaderValue::from_static(if overwrite { "T" } else { "F" }),
        );

        self.request(action, url, headers, RequestBody::Empty)
    }

    pub fn copy(
        &self,
        source: &RemotePath,
        destination: &RemotePath,
        overwrite: bool,
    ) -> Result<WebDavRequest> {
        self.relocate(WebDavAction::Copy, source, destination, overwrite)
    }

    pub fn move_to(
        &self,
        source: &RemotePath,
        destination: &RemotePath,
        overwrite: bool,
    ) -> Result<WebDavRequest> {
        self.relocate(WebDavAction::Move, source, destination, overwrite)
    }

    pub fn delete(&self, path: &RemotePath) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(path, false)?;
        self.request(WebDavAction::Delete, url, HeaderMap::new(), RequestBody::Empty)
    }

    pub fn head(&self, path: &RemotePath) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(path, false)?;
        self.request(WebDavAction::Check, url, HeaderMap::new(), RequestBody::Empty)
    }

    /// GET：`offset` 大于 0 时带 `Range: bytes=offset-` 续传
    pub fn get(&self, path: &RemotePath, offset: u64) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(path, false)?;
        let mut headers = HeaderMap::new();
        if offset > 0 {
            let range = HeaderValue::from_str(&range_header(offset))
                .map_err(|e| WebDavError::TransferFailed {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
            headers.insert(RANGE, range);
        }
        self.request(WebDavAction::Download, url, headers, RequestBody::Empty)
    }

    /// PUT：长度已知的流式请求体带 Content-Length，未知时不带（分块传输）
    pub fn put(&self, path: &RemotePath, body: RequestBody) -> Result<WebDavRequest> {
        let url = self.settings.resource_url(path, false)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        if let RequestBody::Stream { length: Some(length), .. } = &body {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(*length));
        }
        self.request(WebDavAction::Upload, url, headers, body)
    }
}

/// 续传用的 Range 请求头：`bytes=start-`
pub(crate) fn range_header(offset: u64) -> String {
    format!("bytes={offset}-")
}

/// 元素开始标签；DAV: 用固定前缀 D，其他命名空间就地声明
fn open_tag(name: &PropertyName, index: usize) -> (String, String) {
    let local = escape(name.name.as_str());
    if name.namespace == DAV_NAMESPACE {
        let qualified = format!("D:{local}");
        (qualified.clone(), qualified)
    } else if name.namespace.is_empty() {
        (format!("{local} xmlns=\"\""), local.to_string())
    } else {
        let prefix = format!("ns{index}");
        (
            format!(
                "{prefix}:{local} xmlns:{prefix}=\"{}\"",
                escape(name.namespace.as_str())
            ),
            format!("{prefix}:{local}"),
        )
    }
}

fn propfind_body(props: &[PropertyName]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<D:propfind xmlns:D=\"DAV:\"><D:prop>",
    );
    for (index, name) in props.iter().enumerate() {
        let (open, _) = open_tag(name, index);
        body.push_str(&format!("<{open}/>"));
    }
    body.push_str("</D:prop></D:propfind>");
    body
}

fn proppatch_body(name: &PropertyName, value: &str) -> String {
    let (open, close) = open_tag(name, 0);
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<D:propertyupdate xmlns:D=\"DAV:\"><D:set><D:prop><{open}>{}</{close}></D:prop></D:set></D:propertyupdate>",
        escape(value)
    )
}
