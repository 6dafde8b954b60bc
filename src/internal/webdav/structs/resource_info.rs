use chrono::{DateTime, FixedOffset};

use crate::internal::urn::structs::RemotePath;

use super::property::{Property, PropertyName};

/// 远程资源元数据，每个 `<D:response>` 对应一条
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInfo {
    pub path: RemotePath,      // 相对根目录的规范路径
    pub href: String,          // 服务端原始 href
    pub name: String,          // displayname 优先，否则取路径末段
    pub is_dir: bool,          // 是否集合（目录）
    pub size: Option<u64>,     // 文件大小，集合一般没有
    pub last_modified: Option<DateTime<FixedOffset>>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub etag: Option<String>,  // 去掉引号后的 ETag
    pub content_type: Option<String>,
    pub properties: Vec<Property>, // 2xx propstat 中的全部属性
}

impl ResourceInfo {
    /// 按属性名查找属性值
    pub fn property(&self, name: &PropertyName) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.matches(name))
            .and_then(|p| p.value.as_deref())
    }

    pub fn has_property(&self, name: &PropertyName) -> bool {
        self.properties.iter().any(|p| p.matches(name))
    }
}
