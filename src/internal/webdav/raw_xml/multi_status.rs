//! `<D:multistatus>` 响应解析。
//!
//! 按“命名空间 URI + 本地名”匹配元素，不依赖服务端使用的前缀（`D:`、`d:`、`lp1:` 等）。
//! 未声明命名空间的元素和未声明的前缀都按 `DAV:` 处理，兼容部分不规范的服务端。
//!
//! 解析是全有或全无的：文档出错时返回 `ParseError`，不会返回部分结果。

use chrono::{DateTime, FixedOffset};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use reqwest::StatusCode;
use url::Url;
use tracing::debug;

use crate::internal::error::{Result, WebDavError};
use crate::internal::urn::structs::RemotePath;
use crate::internal::webdav::structs::{
    Property, PropertyName, ResourceInfo, DAV_NAMESPACE,
};

/// 当前所在的元素层级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    MultiStatus,
    Response,
    Href,
    Status,
    PropStat,
    Prop,
    /// `<D:prop>` 的直接子元素，即一个属性
    Property,
    /// 属性内部的嵌套元素
    Nested,
    Other,
}

/// 单个 `<D:propstat>`：一组属性 + 共同的状态
#[derive(Debug, Default)]
pub(crate) struct RawPropStat {
    pub status: Option<StatusCode>,
    pub properties: Vec<Property>,
    pub is_collection: bool,
}

/// 单个 `<D:response>`
#[derive(Debug, Default)]
pub(crate) struct RawResponse {
    pub href: String,
    /// 响应级 `<D:status>`，DELETE / COPY / MOVE 的 207 响应使用
    pub status: Option<StatusCode>,
    pub propstats: Vec<RawPropStat>,
}

impl RawResponse {
    /// 状态码最小的 2xx propstat；同为最小时取文档中靠前的
    fn take_ok_propstat(&mut self) -> Option<RawPropStat> {
        let index = self
            .propstats
            .iter()
            .enumerate()
            .filter(|(_, ps)| ps.status.is_some_and(|s| s.is_success()))
            .min_by_key(|(_, ps)| ps.status.map(|s| s.as_u16()))
            .map(|(index, _)| index)?;
        Some(self.propstats.swap_remove(index))
    }

    /// 资源整体状态：响应级状态优先，其次第一个失败的 propstat，最后第一个 propstat
    fn overall_status(&self) -> Option<StatusCode> {
        self.status.or_else(|| {
            let statuses = self.propstats.iter().filter_map(|ps| ps.status);
            statuses
                .clone()
                .find(|s| !s.is_success())
                .or_else(|| statuses.clone().next())
        })
    }
}

#[derive(Debug, Default)]
struct MultiStatusParser {
    stack: Vec<Frame>,
    seen_root: bool,
    text: String,
    response: Option<RawResponse>,
    propstat: Option<RawPropStat>,
    property: Option<Property>,
    responses: Vec<RawResponse>,
}

impl MultiStatusParser {
    fn open(&mut self, namespace: Option<&str>, local: &str) {
        let is_dav = namespace.is_none_or(|ns| ns == DAV_NAMESPACE);
        let parent = self.stack.last().copied();

        let frame = match (parent, is_dav, local) {
            (None, true, "multistatus") => {
                self.seen_root = true;
                Frame::MultiStatus
            }
            (Some(Frame::MultiStatus), true, "response") => {
                self.response = Some(RawResponse::default());
                Frame::Response
            }
            (Some(Frame::Response), true, "href") => Frame::Href,
            (Some(Frame::Response | Frame::PropStat), true, "status") => {
                Frame::Status
            }
            (Some(Frame::Response), true, "propstat") => {
                self.propstat = Some(RawPropStat::default());
                Frame::PropStat
            }
            (Some(Frame::PropStat), true, "prop") => Frame::Prop,
            (Some(Frame::Prop), _, _) => {
                let namespace = namespace.unwrap_or(DAV_NAMESPACE);
                self.property = Some(Property {
                    name: PropertyName::new(namespace, local),
                    value: None,
                });
                Frame::Property
            }
            (Some(Frame::Property | Frame::Nested), _, _) => {
                let in_resource_type = self
                    .property
                    .as_ref()
                    .is_some_and(|p| p.name == PropertyName::dav("resourcetype"));
                if is_dav && local == "collection" && in_resource_type {
                    if let Some(propstat) = self.propstat.as_mut() {
                        propstat.is_collection = true;
                    }
                }
                Frame::Nested
            }
            _ => Frame::Other,
        };

        if matches!(frame, Frame::Href | Frame::Status) {
            self.text.clear();
        }
        self.stack.push(frame);
    }

    fn text(&mut self, text: &str) {
        match self.stack.last() {
            Some(Frame::Href | Frame::Status) => self.text.push_str(text),
            Some(Frame::Property | Frame::Nested) => {
                if let Some(property) = self.property.as_mut() {
                    property.value.get_or_insert_with(String::new).push_str(text);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self) -> std::result::Result<(), String> {
        let frame = self.stack.pop().ok_or("多余的结束标签")?;
        match frame {
            Frame::Href => {
                if let Some(response) = self.response.as_mut() {
                    response.href = self.text.trim().to_string();
                }
            }
            Frame::Status => {
                let status = parse_status_line(&self.text);
                match self.stack.last() {
                    Some(Frame::PropStat) => {
                        if let Some(propstat) = self.propstat.as_mut() {
                            propstat.status = status;
                        }
                    }
                    Some(Frame::Response) => {
                        if let Some(response) = self.response.as_mut() {
                            response.status = status;
                        }
                    }
                    _ => {}
                }
            }
            Frame::Property => {
                if let (Some(mut property), Some(propstat)) =
                    (self.property.take(), self.propstat.as_mut())
                {
                    property.value = property
                        .value
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty());
                    propstat.properties.push(property);
                }
            }
            Frame::PropStat => {
                if let (Some(propstat), Some(response)) =
                    (self.propstat.take(), self.response.as_mut())
                {
                    response.propstats.push(propstat);
                }
            }
            Frame::Response => {
                if let Some(response) = self.response.take() {
                    self.responses.push(response);
                }
            }
            Frame::MultiStatus | Frame::Prop | Frame::Nested | Frame::Other => {}
        }
        Ok(())
    }
}

fn parse_error(message: impl Into<String>, body: &[u8]) -> WebDavError {
    WebDavError::ParseError {
        message: message.into(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

/// 未绑定命名空间和未声明的前缀都返回 `None`，按 `DAV:` 处理
fn namespace_of(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => {
            Some(String::from_utf8_lossy(uri).into_owned())
        }
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

/// 实体引用：字符引用和 XML 预定义实体
fn resolve_entity(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(resolved.to_string())
}

/// 从 "HTTP/1.1 200 OK" 中取出状态码
pub(crate) fn parse_status_line(line: &str) -> Option<StatusCode> {
    line.split_whitespace()
        .find_map(|token| token.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
}

/// 把 multistatus 文档解析为原始响应列表
pub(crate) fn parse_raw_responses(body: &[u8]) -> Result<Vec<RawResponse>> {
    let mut reader = NsReader::from_reader(body);
    let decoder = reader.decoder();
    let mut buf = Vec::new();
    let mut parser = MultiStatusParser::default();

    loop {
        let (resolved, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| parse_error(e.to_string(), body))?;
        let namespace = namespace_of(&resolved);

        match event {
            Event::Start(e) => {
                let local_name = e.local_name();
                let local = decoder
                    .decode(local_name.as_ref())
                    .map_err(|err| parse_error(err.to_string(), body))?;
                parser.open(namespace.as_deref(), &local);
            }
            Event::Empty(e) => {
                let local_name = e.local_name();
                let local = decoder
                    .decode(local_name.as_ref())
                    .map_err(|err| parse_error(err.to_string(), body))?;
                parser.open(namespace.as_deref(), &local);
                parser.close().map_err(|msg| parse_error(msg, body))?;
            }
            Event::End(_) => {
                parser.close().map_err(|msg| parse_error(msg, body))?;
            }
            Event::Text(e) => {
                let text = decoder
                    .decode(&e)
                    .map_err(|err| parse_error(err.to_string(), body))?;
                parser.text(&text);
            }
            Event::CData(e) => {
                let text = decoder
                    .decode(&e)
                    .map_err(|err| parse_error(err.to_string(), body))?;
                parser.text(&text);
            }
            Event::GeneralRef(e) => {
                let name = decoder
                    .decode(&e)
                    .map_err(|err| parse_error(err.to_string(), body))?;
                let resolved = resolve_entity(&name).ok_or_else(|| {
                    parse_error(format!("未知的实体引用 &{name};"), body)
                })?;
                parser.text(&resolved);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !parser.stack.is_empty() {
        return Err(parse_error("文档不完整，存在未闭合的元素", body));
    }
    if !parser.seen_root {
        return Err(parse_error("缺少 DAV:multistatus 根元素", body));
    }

    Ok(parser.responses)
}

/// href 可能是绝对 URL 也可能是绝对路径，统一转成相对根目录的路径
fn href_to_path(href: &str, server_root: &RemotePath) -> RemotePath {
    let raw_path = if href.starts_with("http://") || href.starts_with("https://") {
        Url::parse(href)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| href.to_string())
    } else {
        href.split(['?', '#']).next().unwrap_or(href).to_string()
    };
    RemotePath::from_encoded(&raw_path).strip_root(server_root)
}

fn clean_etag(raw: Option<&str>) -> Option<String> {
    // 去掉 ETag 的首尾引号以及多余空格
    raw.map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}

fn find<'a>(properties: &'a [Property], name: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|p| p.name.is_dav() && p.name.name == name)
        .and_then(|p| p.value.as_deref())
}

fn parse_http_date(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let raw = raw?;
    match DateTime::parse_from_rfc2822(raw) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("无法解析 getlastmodified {raw:?}: {e}");
            None
        }
    }
}

fn parse_creation_date(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let raw = raw?;
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
}

fn into_resource_info(
    mut raw: RawResponse,
    server_root: &RemotePath,
) -> Option<ResourceInfo> {
    let Some(RawPropStat { properties, is_collection, .. }) = raw.take_ok_propstat()
    else {
        debug!("跳过没有 2xx propstat 的资源: {}", raw.href);
        return None;
    };

    let path = href_to_path(&raw.href, server_root);
    let name = find(&properties, "displayname")
        .map(str::to_string)
        .unwrap_or_else(|| path.name().to_string());
    let size = find(&properties, "getcontentlength")
        .and_then(|v| v.parse::<u64>().ok());

    Some(ResourceInfo {
        href: raw.href,
        name,
        is_dir: is_collection,
        size,
        last_modified: parse_http_date(find(&properties, "getlastmodified")),
        creation_date: parse_creation_date(find(&properties, "creationdate")),
        etag: clean_etag(find(&properties, "getetag")),
        content_type: find(&properties, "getcontenttype").map(str::to_string),
        path,
        properties,
    })
}

/// 解析 PROPFIND 的 multistatus 响应。
///
/// - 每个带 2xx propstat 的 `<D:response>` 产生一条 [`ResourceInfo`]，保持文档顺序
/// - 只有非 2xx propstat 的资源被跳过，不报错
/// - `server_root` 为服务端路径中的根前缀，会从 href 中去掉
pub fn parse_multistatus(
    body: &[u8],
    server_root: &RemotePath,
) -> Result<Vec<ResourceInfo>> {
    let responses = parse_raw_responses(body)?;
    for response in &responses {
        if response.href.is_empty() {
            return Err(parse_error("response 缺少 href", body));
        }
    }

    Ok(responses
        .into_iter()
        .filter_map(|raw| into_resource_info(raw, server_root))
        .collect())
}

/// 解析 DELETE / COPY / MOVE / PROPPATCH 的 207 响应，得到逐资源状态
pub fn parse_status_multistatus(
    body: &[u8],
    server_root: &RemotePath,
) -> Result<Vec<(RemotePath, StatusCode)>> {
    let responses = parse_raw_responses(body)?;
    let mut statuses = Vec::with_capacity(responses.len());

    for response in responses {
        if response.href.is_empty() {
            return Err(parse_error("response 缺少 href", body));
        }
        let Some(status) = response.overall_status() else {
            return Err(parse_error(
                format!("response 缺少 status: {}", response.href),
                body,
            ));
        };
        statuses.push((href_to_path(&response.href, server_root), status));
    }

    Ok(statuses)
}
