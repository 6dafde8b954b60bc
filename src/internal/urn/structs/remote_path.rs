use std::fmt;
use std::str::FromStr;

use percent_encoding::{
    percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC,
};

use crate::internal::error::{Result, WebDavError};

/// 路径分隔符
pub const SEPARATOR: char = '/';

/// 路径段编码集合：除字母数字和 `-._~` 外全部编码
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 远程资源路径（相对于配置的根目录）
///
/// 内部保存解码后的规范形式：
/// - 有且只有一个前导 `/`
/// - 除根目录外没有尾部 `/`
/// - 不含空段、`.` 段和 `..` 段
///
/// 两个路径相等当且仅当规范形式相等。构造后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemotePath {
    path: String,
}

impl RemotePath {
    /// 根目录 `/`
    pub fn root() -> Self {
        Self { path: SEPARATOR.to_string() }
    }

    /// 规范化未编码的路径字符串，`\` 视为分隔符。
    ///
    /// 输入按字面处理，`%` 不会被解码；编码过的 href 请使用 [`RemotePath::from_encoded`]。
    /// `..` 在根目录处截断；需要越界报错请使用 [`RemotePath::join`]。
    pub fn normalize(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");
        let mut segments: Vec<&str> = Vec::new();

        for segment in unified.split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }

        Self::from_segments(segments)
    }

    /// 解码一次百分号编码的路径（服务端返回的 href、URL 路径）后规范化。
    ///
    /// 对 [`RemotePath::quote`] 的输出解码得到的仍是同一路径。
    pub fn from_encoded(encoded: &str) -> Self {
        let decoded = percent_decode_str(encoded).decode_utf8_lossy();
        Self::normalize(&decoded)
    }

    /// 在当前路径下追加未编码的子路径；子路径中的 `..` 越过根目录时返回 `InvalidPath`。
    pub fn join(&self, child: &str) -> Result<Self> {
        let unified = child.replace('\\', "/");
        let mut segments: Vec<&str> = self.segments().collect();

        for segment in unified.split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(WebDavError::InvalidPath {
                            path: child.to_string(),
                            reason: "上级目录越过了根目录",
                        });
                    }
                }
                s => segments.push(s),
            }
        }

        Ok(Self::from_segments(segments))
    }

    /// 去掉根目录前缀后的路径；不以根目录开头时原样返回。
    pub fn relative_to(&self, root: &RemotePath) -> String {
        if root.is_root() {
            return self.path.clone();
        }

        let mut own = self.segments();
        for root_segment in root.segments() {
            match own.next() {
                Some(segment) if segment == root_segment => {}
                _ => return self.path.clone(),
            }
        }

        let rest: Vec<&str> = own.collect();
        format!("{SEPARATOR}{}", rest.join("/"))
    }

    /// 与 [`RemotePath::relative_to`] 相同，结果重新构造成路径
    pub fn strip_root(&self, root: &RemotePath) -> RemotePath {
        Self::normalize(&self.relative_to(root))
    }

    /// 解码后的规范路径
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// 百分号编码后的路径，每段只编码一次，用于拼接 URL
    pub fn quote(&self) -> String {
        self.path
            .split(SEPARATOR)
            .map(|segment| {
                utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string()
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// 带尾部 `/` 的编码路径，集合（目录）请求使用
    pub fn quote_collection(&self) -> String {
        let quoted = self.quote();
        if quoted.ends_with(SEPARATOR) {
            quoted
        } else {
            format!("{quoted}{SEPARATOR}")
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.len() == 1
    }

    /// 最后一段名称，根目录为空串
    pub fn name(&self) -> &str {
        self.path.rsplit(SEPARATOR).next().unwrap_or("")
    }

    /// 父目录；根目录的父目录仍是根目录
    pub fn parent(&self) -> Self {
        match self.path.rfind(SEPARATOR) {
            Some(0) | None => Self::root(),
            Some(index) => Self { path: self.path[..index].to_string() },
        }
    }

    /// 从根到自身（不含根）的所有祖先路径，包含自身
    pub fn ancestors(&self) -> Vec<Self> {
        let mut current = Self::root();
        let mut ancestors = Vec::new();
        for segment in self.segments() {
            current = Self::from_segments(
                current.segments().chain(std::iter::once(segment)),
            );
            ancestors.push(current.clone());
        }
        ancestors
    }

    /// 非空路径段
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut path = String::new();
        for segment in segments {
            path.push(SEPARATOR);
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push(SEPARATOR);
        }
        Self { path }
    }
}

impl Default for RemotePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for RemotePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<&str> for RemotePath {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl From<&RemotePath> for RemotePath {
    fn from(path: &RemotePath) -> Self {
        path.clone()
    }
}

impl From<String> for RemotePath {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl AsRef<RemotePath> for RemotePath {
    fn as_ref(&self) -> &RemotePath {
        self
    }
}
