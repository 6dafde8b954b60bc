/// WebDAV 核心命名空间
pub const DAV_NAMESPACE: &str = "DAV:";

/// 属性名：命名空间 URI + 本地名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName {
    pub namespace: String,
    pub name: String,
}

impl PropertyName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }

    /// `DAV:` 命名空间下的属性
    pub fn dav(name: impl Into<String>) -> Self {
        Self::new(DAV_NAMESPACE, name)
    }

    pub fn is_dav(&self) -> bool {
        self.namespace == DAV_NAMESPACE
    }
}

/// 服务端返回的单个属性；嵌套元素的文本会拼接进 `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: PropertyName,
    /// 空元素（如 `<D:resourcetype/>`）为 `None`
    pub value: Option<String>,
}

impl Property {
    pub fn matches(&self, name: &PropertyName) -> bool {
        &self.name == name
    }
}
